use serde::{Deserialize, Serialize};

use crate::{form::image::ImageArtifact, master::table::AccountRecord};

use super::column::{Column, COLUMNS, IMAGE_SEPARATOR};

/// A completed form, still holding image payloads. Produced by the form
/// session, consumed by the sink.
#[derive(Debug, Clone)]
pub struct Submission {
    pub account: AccountRecord,
    pub remark: String,
    pub follow_up_action: Option<String>,
    pub mobile_no: String,
    pub texts: Vec<(Column, String)>,
    pub images: Vec<(Column, ImageArtifact)>,
}

impl Submission {
    /// Builds the persisted record, with `references[i]` standing in for
    /// `self.images[i]`.
    pub fn to_record(&self, references: &[String]) -> SubmissionRecord {
        let text = |column: Column| {
            self.texts
                .iter()
                .find(|(target, _)| target.eq(&column))
                .map(|(_, value)| value.clone())
                .unwrap_or_default()
        };
        let references_for = |column: Column| {
            self.images
                .iter()
                .zip(references.iter())
                .filter(|((target, _), _)| target.eq(&column))
                .map(|(_, reference)| reference.clone())
                .collect::<Vec<String>>()
        };
        SubmissionRecord {
            account_id: self.account.account_id.clone(),
            remark: self.remark.clone(),
            zone: self.account.zone.clone(),
            circle: self.account.circle.clone(),
            division: self.account.division.clone(),
            sub_division: self.account.sub_division.clone(),
            mobile_no: self.mobile_no.clone(),
            follow_up_action: self.follow_up_action.clone().unwrap_or_default(),
            meter_serial_number: text(Column::MeterSerialNumber),
            reading: text(Column::Reading),
            demand: text(Column::Demand),
            meter_images: references_for(Column::MeterImageAll),
            premises_images: references_for(Column::PremisesImageAll),
            document_image: references_for(Column::DocumentImage).pop(),
        }
    }
}

/// One persisted survey row. Images are referenced by path or link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub account_id: String,
    pub remark: String,
    pub zone: String,
    pub circle: String,
    pub division: String,
    pub sub_division: String,
    pub mobile_no: String,
    pub follow_up_action: String,
    pub meter_serial_number: String,
    pub reading: String,
    pub demand: String,
    pub meter_images: Vec<String>,
    pub premises_images: Vec<String>,
    pub document_image: Option<String>,
}

impl SubmissionRecord {
    fn cell(&self, column: Column, include_follow_up: bool) -> String {
        match column {
            Column::AcctId => self.account_id.clone(),
            Column::Remark => self.remark.clone(),
            Column::Zone => self.zone.clone(),
            Column::Circle => self.circle.clone(),
            Column::Division => self.division.clone(),
            Column::SubDivision => self.sub_division.clone(),
            Column::MobileNo => self.mobile_no.clone(),
            Column::RequiredRemark if include_follow_up => self.follow_up_action.clone(),
            Column::RequiredRemark => String::new(),
            Column::MeterSerialNumber => self.meter_serial_number.clone(),
            Column::Reading => self.reading.clone(),
            Column::Demand => self.demand.clone(),
            Column::MeterImageAll => self.meter_images.join(IMAGE_SEPARATOR),
            Column::PremisesImageAll => self.premises_images.join(IMAGE_SEPARATOR),
            Column::DocumentImage => self.document_image.clone().unwrap_or_default(),
        }
    }

    /// Cells in the fixed column order. Without `include_follow_up` the
    /// REQUIRED_REMARK cell is left empty.
    pub fn to_row(&self, include_follow_up: bool) -> Vec<String> {
        COLUMNS
            .iter()
            .map(|column| self.cell(*column, include_follow_up))
            .collect()
    }
}
