use thiserror::Error;

/// Coarse grouping of [`SurveyError`] used by front-ends to decide how to
/// react: input errors are fixed by re-entry, a lookup miss ends the current
/// form, an incomplete form blocks submission, a persistence failure leaves
/// the form resubmittable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InputFormat,
    LookupMiss,
    IncompleteForm,
    Persistence,
    Usage,
}

#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("ACCT_ID should be numeric and 1 to 10 digits only, got {0:?}")]
    InvalidAccountId(String),
    #[error("mobile number should be exactly 10 digits, got {0:?}")]
    InvalidMobile(String),
    #[error("ACCT_ID {0} not found")]
    AccountNotFound(String),
    #[error("please fill required fields: {}", .0.join(", "))]
    IncompleteForm(Vec<String>),
    #[error("failed to persist submission: {0:#}")]
    PersistenceFailure(anyhow::Error),
    #[error("no ACCT_ID matched yet")]
    NoAccount,
    #[error("no remark selected yet")]
    NoRemark,
    #[error("unknown remark {0:?}")]
    UnknownRemark(String),
    #[error("{field} is not required for remark {remark}")]
    FieldNotRequired { field: String, remark: String },
    #[error("{field} expects {expected} input")]
    FieldKindMismatch { field: String, expected: &'static str },
    #[error("captured image for {0} is empty")]
    EmptyImage(String),
    #[error("form already submitted")]
    AlreadySubmitted,
}

impl SurveyError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SurveyError::InvalidAccountId(_) | SurveyError::InvalidMobile(_) => {
                ErrorCategory::InputFormat
            }
            SurveyError::AccountNotFound(_) => ErrorCategory::LookupMiss,
            SurveyError::IncompleteForm(_) => ErrorCategory::IncompleteForm,
            SurveyError::PersistenceFailure(_) => ErrorCategory::Persistence,
            _ => ErrorCategory::Usage,
        }
    }
}

pub type SurveyResult<T> = Result<T, SurveyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_form_lists_fields() {
        let err = SurveyError::IncompleteForm(vec!["METER IMAGE".into(), "MOBILE_NO".into()]);
        assert_eq!(
            err.to_string(),
            "please fill required fields: METER IMAGE, MOBILE_NO"
        );
        assert_eq!(err.category(), ErrorCategory::IncompleteForm);
    }

    #[test]
    fn persistence_keeps_cause_chain() {
        let cause = anyhow::anyhow!("disk full").context("append load_data.csv");
        let err = SurveyError::PersistenceFailure(cause);
        assert_eq!(
            err.to_string(),
            "failed to persist submission: append load_data.csv: disk full"
        );
        assert_eq!(err.category(), ErrorCategory::Persistence);
    }
}
