use serde::{Deserialize, Serialize};

/// Output columns, in the fixed order every store writes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "ACCT_ID")]
    AcctId,
    #[serde(rename = "REMARK")]
    Remark,
    #[serde(rename = "ZONE")]
    Zone,
    #[serde(rename = "CIRCLE")]
    Circle,
    #[serde(rename = "DIVISION")]
    Division,
    #[serde(rename = "SUB-DIVISION")]
    SubDivision,
    #[serde(rename = "MOBILE_NO")]
    MobileNo,
    #[serde(rename = "REQUIRED_REMARK")]
    RequiredRemark,
    #[serde(rename = "METER_SERIAL_NUMBER")]
    MeterSerialNumber,
    #[serde(rename = "READING")]
    Reading,
    #[serde(rename = "DEMAND")]
    Demand,
    #[serde(rename = "METER_IMAGE_ALL")]
    MeterImageAll,
    #[serde(rename = "PREMISES_IMAGE_ALL")]
    PremisesImageAll,
    #[serde(rename = "DOCUMENT_IMAGE")]
    DocumentImage,
}

pub const COLUMNS: [Column; 14] = [
    Column::AcctId,
    Column::Remark,
    Column::Zone,
    Column::Circle,
    Column::Division,
    Column::SubDivision,
    Column::MobileNo,
    Column::RequiredRemark,
    Column::MeterSerialNumber,
    Column::Reading,
    Column::Demand,
    Column::MeterImageAll,
    Column::PremisesImageAll,
    Column::DocumentImage,
];

/// Separator between several image references in one cell.
pub const IMAGE_SEPARATOR: &str = "; ";

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Column::AcctId => "ACCT_ID",
            Column::Remark => "REMARK",
            Column::Zone => "ZONE",
            Column::Circle => "CIRCLE",
            Column::Division => "DIVISION",
            Column::SubDivision => "SUB-DIVISION",
            Column::MobileNo => "MOBILE_NO",
            Column::RequiredRemark => "REQUIRED_REMARK",
            Column::MeterSerialNumber => "METER_SERIAL_NUMBER",
            Column::Reading => "READING",
            Column::Demand => "DEMAND",
            Column::MeterImageAll => "METER_IMAGE_ALL",
            Column::PremisesImageAll => "PREMISES_IMAGE_ALL",
            Column::DocumentImage => "DOCUMENT_IMAGE",
        }
    }

    pub fn index(&self) -> usize {
        COLUMNS
            .iter()
            .position(|column| column == self)
            .unwrap_or_default()
    }
}

pub fn header() -> Vec<String> {
    COLUMNS.iter().map(|column| column.header().to_string()).collect()
}
