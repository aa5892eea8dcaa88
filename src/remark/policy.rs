use std::collections::HashSet;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::{
    error::{SurveyError, SurveyResult},
    sink::column::Column,
};

use super::{
    field::{FieldKind, FieldSpec},
    symbol::{
        DEMAND, DOCUMENT_RELATED_TO_PDC, METER_IMAGE, METER_READING, METER_SERIAL_NUMBER,
        PREMISES_IMAGE, READING,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemarkDefinition {
    pub name: String,
    pub required_fields: Vec<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_action: Option<String>,
    /// Remarks where nobody is on site to give a mobile number.
    #[serde(default)]
    pub mobile_exempt: bool,
}

impl RemarkDefinition {
    pub fn field(&self, label: &str) -> Option<&FieldSpec> {
        self.required_fields
            .iter()
            .find(|field| field.label.eq(label))
    }
}

/// Ordered, immutable table of remark definitions.
#[derive(Debug, Clone)]
pub struct RemarkPolicy {
    definitions: Vec<RemarkDefinition>,
}

impl RemarkPolicy {
    pub fn from_definitions(definitions: Vec<RemarkDefinition>) -> anyhow::Result<RemarkPolicy> {
        if definitions.is_empty() {
            bail!("remark table is empty");
        }
        let mut names = HashSet::with_capacity(definitions.len());
        for definition in definitions.iter() {
            let name = definition.name.trim();
            if name.is_empty() {
                bail!("remark name must not be blank");
            }
            if !names.insert(name) {
                bail!("duplicate remark {:?}", name);
            }
            let mut labels = HashSet::with_capacity(definition.required_fields.len());
            let mut text_columns = HashSet::new();
            for field in definition.required_fields.iter() {
                if field.label.trim().is_empty() {
                    bail!("remark {:?} has a field with a blank label", name);
                }
                if !labels.insert(field.label.as_str()) {
                    bail!("remark {:?} lists {:?} twice", name, field.label);
                }
                if field.kind == FieldKind::Text && !text_columns.insert(field.column) {
                    bail!(
                        "remark {:?} fills column {} from two text fields",
                        name,
                        field.column.header()
                    );
                }
                if !field.column_accepts_kind() {
                    bail!(
                        "remark {:?}: {} field {:?} cannot fill column {}",
                        name,
                        field.kind.describe(),
                        field.label,
                        field.column.header()
                    );
                }
            }
        }
        Ok(RemarkPolicy { definitions })
    }

    pub fn builtin() -> RemarkPolicy {
        let meter_serial = FieldSpec::text(METER_SERIAL_NUMBER, Column::MeterSerialNumber);
        let meter_image = FieldSpec::image(METER_IMAGE, Column::MeterImageAll);
        let reading = FieldSpec::text(READING, Column::Reading);
        let meter_reading = FieldSpec::text(METER_READING, Column::Reading);
        let demand = FieldSpec::text(DEMAND, Column::Demand);
        let premises_image = FieldSpec::image(PREMISES_IMAGE, Column::PremisesImageAll);
        let pdc_document = FieldSpec::document(DOCUMENT_RELATED_TO_PDC, Column::DocumentImage);

        let remark = |name: &str, fields: &[&FieldSpec], follow_up: Option<&str>| {
            RemarkDefinition {
                name: name.to_owned(),
                required_fields: fields.iter().map(|field| (*field).clone()).collect(),
                follow_up_action: follow_up.map(str::to_owned),
                mobile_exempt: false,
            }
        };

        let definitions = vec![
            remark(
                "OK",
                &[&meter_serial, &meter_image, &reading, &demand],
                Some("BILL REVISION REQUIRED"),
            ),
            remark(
                "DEFECTIVE METER",
                &[&meter_serial, &meter_image],
                Some("METER REPLACEMENT REQUIRED"),
            ),
            remark(
                "LINE DISCONNECTED",
                &[&meter_serial, &meter_image],
                Some("NEED RECONNECTION AFTER PAYMENT"),
            ),
            remark(
                "NO METER AT SITE",
                &[&premises_image],
                Some("PD/METER INSTALLATION"),
            ),
            remark(
                "METER MIS MATCH",
                &[&meter_serial, &meter_image, &meter_reading, &demand],
                Some("NEED METER NUMBER UPDATION"),
            ),
            RemarkDefinition {
                mobile_exempt: true,
                ..remark("HOUSE LOCK", &[&premises_image], None)
            },
            remark(
                "METER CHANGE NOT ADVISE",
                &[&meter_serial, &meter_image, &meter_reading, &demand],
                None,
            ),
            remark(
                "PDC",
                &[&meter_image, &premises_image, &pdc_document],
                Some("MASTER UPDATION REQUIRED"),
            ),
        ];
        RemarkPolicy { definitions }
    }

    pub fn get(&self, name: &str) -> Option<&RemarkDefinition> {
        let name = name.trim();
        self.definitions
            .iter()
            .find(|definition| definition.name.trim().eq(name))
    }

    pub fn require(&self, name: &str) -> SurveyResult<&RemarkDefinition> {
        self.get(name)
            .ok_or_else(|| SurveyError::UnknownRemark(name.to_owned()))
    }

    /// Remark names in table order, as offered to the surveyor.
    pub fn names(&self) -> Vec<&str> {
        self.definitions
            .iter()
            .map(|definition| definition.name.as_str())
            .collect()
    }

    pub fn definitions(&self) -> &[RemarkDefinition] {
        &self.definitions
    }
}

impl Default for RemarkPolicy {
    fn default() -> Self {
        RemarkPolicy::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(definition: &RemarkDefinition) -> Vec<&str> {
        definition
            .required_fields
            .iter()
            .map(|field| field.label.as_str())
            .collect()
    }

    #[test]
    fn builtin_table() {
        let policy = RemarkPolicy::builtin();
        assert_eq!(
            policy.names(),
            vec![
                "OK",
                "DEFECTIVE METER",
                "LINE DISCONNECTED",
                "NO METER AT SITE",
                "METER MIS MATCH",
                "HOUSE LOCK",
                "METER CHANGE NOT ADVISE",
                "PDC",
            ]
        );
        let ok = policy.get("OK").unwrap();
        assert_eq!(
            labels(ok),
            vec!["METER SERIAL NUMBER", "METER IMAGE", "READING", "DEMAND"]
        );
        assert_eq!(ok.follow_up_action.as_deref(), Some("BILL REVISION REQUIRED"));
        assert!(!ok.mobile_exempt);

        let house_lock = policy.get("HOUSE LOCK").unwrap();
        assert!(house_lock.mobile_exempt);
        assert_eq!(house_lock.follow_up_action, None);
        assert_eq!(
            policy
                .definitions()
                .iter()
                .filter(|definition| definition.mobile_exempt)
                .count(),
            1
        );

        let pdc = policy.get("PDC").unwrap();
        assert_eq!(pdc.field(DOCUMENT_RELATED_TO_PDC).unwrap().kind, FieldKind::Document);
        assert_eq!(pdc.field(METER_IMAGE).unwrap().kind, FieldKind::Image);

        let mismatch = policy.get("METER MIS MATCH").unwrap();
        assert_eq!(mismatch.field(METER_READING).unwrap().column, Column::Reading);
    }

    #[test]
    fn builtin_passes_validation() {
        let definitions = RemarkPolicy::builtin().definitions().to_vec();
        assert!(RemarkPolicy::from_definitions(definitions).is_ok());
    }

    #[test]
    fn unknown_remark() {
        let policy = RemarkPolicy::builtin();
        assert!(policy.get("METER BURNT").is_none());
        assert!(matches!(
            policy.require("METER BURNT"),
            Err(SurveyError::UnknownRemark(_))
        ));
        assert_eq!(policy.require(" OK ").unwrap().name, "OK");
    }

    #[test]
    fn invalid_tables_are_rejected() {
        let ok = RemarkPolicy::builtin().get("OK").unwrap().clone();
        assert!(RemarkPolicy::from_definitions(vec![]).is_err());
        assert!(RemarkPolicy::from_definitions(vec![ok.clone(), ok.clone()]).is_err());

        let blank = RemarkDefinition {
            name: "  ".into(),
            ..ok.clone()
        };
        assert!(RemarkPolicy::from_definitions(vec![blank]).is_err());

        let mut twice = ok.clone();
        twice.required_fields.push(FieldSpec::text(READING, Column::Reading));
        assert!(RemarkPolicy::from_definitions(vec![twice]).is_err());

        let mut two_readings = ok.clone();
        two_readings
            .required_fields
            .push(FieldSpec::text(METER_READING, Column::Reading));
        let err = RemarkPolicy::from_definitions(vec![two_readings]).unwrap_err();
        assert!(err.to_string().contains("from two text fields"));

        let mut mismatched = ok;
        mismatched.required_fields[0] = FieldSpec::text("SERIAL", Column::MeterImageAll);
        let err = RemarkPolicy::from_definitions(vec![mismatched]).unwrap_err();
        assert!(err.to_string().contains("cannot fill column METER_IMAGE_ALL"));
    }

    #[test]
    fn deserialize_definition() -> anyhow::Result<()> {
        let definition: RemarkDefinition = serde_json::from_str(
            r#"{
                "name": "HOUSE LOCK",
                "required_fields": [
                    {"label": "PREMISES IMAGE", "kind": "image", "column": "PREMISES_IMAGE_ALL"}
                ],
                "mobile_exempt": true
            }"#,
        )?;
        assert_eq!(&definition, RemarkPolicy::builtin().get("HOUSE LOCK").unwrap());
        Ok(())
    }
}
