use std::sync::LazyLock;

use regex::Regex;

use crate::error::{SurveyError, SurveyResult};

static MOBILE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{10}$").unwrap());

pub fn is_valid_mobile(raw: &str) -> bool {
    MOBILE_PATTERN.is_match(raw)
}

pub fn check_mobile(raw: &str) -> SurveyResult<&str> {
    if is_valid_mobile(raw) {
        Ok(raw)
    } else {
        Err(SurveyError::InvalidMobile(raw.to_owned()))
    }
}
