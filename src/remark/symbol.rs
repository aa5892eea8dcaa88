pub const METER_SERIAL_NUMBER: &str = "METER SERIAL NUMBER";
pub const METER_IMAGE: &str = "METER IMAGE";
pub const READING: &str = "READING";
pub const METER_READING: &str = "METER READING";
pub const DEMAND: &str = "DEMAND";
pub const PREMISES_IMAGE: &str = "PREMISES IMAGE";
pub const DOCUMENT_RELATED_TO_PDC: &str = "DOCUMENT RELATED TO PDC";
pub const MOBILE_NO: &str = "MOBILE_NO";
