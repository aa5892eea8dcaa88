use std::collections::HashMap;

use chrono::{Local, NaiveDateTime};

use crate::{
    error::{SurveyError, SurveyResult},
    master::{
        account::AccountId,
        table::{AccountRecord, MasterTable},
    },
    remark::{
        field::{FieldKind, FieldSpec},
        policy::{RemarkDefinition, RemarkPolicy},
        symbol::MOBILE_NO,
    },
    sink::{
        record::{Submission, SubmissionRecord},
        ImageStore, RecordStore, SubmissionSink,
    },
};

use super::{image::ImageArtifact, mobile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    NoAccount,
    AccountMatched,
    RemarkSelected,
    FieldsIncomplete,
    FieldsComplete,
    Submitted,
}

/// In-progress input of one survey form.
///
/// The session only accumulates values and decides what is still missing;
/// the single side effect is [`FormSession::submit`], which hands the
/// finished form to a [`SubmissionSink`].
pub struct FormSession<'a> {
    master: &'a MasterTable,
    policy: &'a RemarkPolicy,
    account: Option<(AccountId, &'a AccountRecord)>,
    remark: Option<&'a RemarkDefinition>,
    mobile: String,
    texts: HashMap<String, String>,
    images: HashMap<String, Vec<ImageArtifact>>,
    touched: bool,
    submitted: bool,
}

impl<'a> FormSession<'a> {
    pub fn new(master: &'a MasterTable, policy: &'a RemarkPolicy) -> FormSession<'a> {
        FormSession {
            master,
            policy,
            account: None,
            remark: None,
            mobile: String::new(),
            texts: HashMap::new(),
            images: HashMap::new(),
            touched: false,
            submitted: false,
        }
    }

    /// Drops everything entered so far, including a finished submission.
    pub fn reset(&mut self) {
        self.account = None;
        self.remark = None;
        self.mobile.clear();
        self.texts.clear();
        self.images.clear();
        self.touched = false;
        self.submitted = false;
    }

    /// Starts a fresh form for `raw`. The master table is only consulted
    /// when `raw` is a well-formed account id.
    pub fn enter_account(&mut self, raw: &str) -> SurveyResult<&'a AccountRecord> {
        self.reset();
        let id = AccountId::parse(raw)?;
        let record = self
            .master
            .lookup(&id)
            .ok_or_else(|| SurveyError::AccountNotFound(id.to_string()))?;
        self.account = Some((id, record));
        Ok(record)
    }

    /// Values already entered for labels the new remark also requires are
    /// kept and count as input; anything else is ignored by this remark.
    pub fn select_remark(&mut self, name: &str) -> SurveyResult<&'a RemarkDefinition> {
        self.ensure_open()?;
        self.matched_account()?;
        let definition = self.policy.require(name)?;
        if !self.remark.is_some_and(|current| current.name == definition.name) {
            self.touched = self.has_input_for(definition);
        }
        self.remark = Some(definition);
        Ok(definition)
    }

    /// Stores the number as typed. Returns `InvalidMobile` when the selected
    /// remark needs a mobile number and this one is not 10 digits, so the
    /// caller can warn inline; the value is kept either way.
    pub fn set_mobile(&mut self, raw: &str) -> SurveyResult<()> {
        self.ensure_open()?;
        let remark = self.selected_remark()?;
        self.mobile = raw.to_owned();
        self.touched = true;
        if remark.mobile_exempt {
            return Ok(());
        }
        mobile::check_mobile(raw).map(|_| ())
    }

    pub fn set_text(&mut self, label: &str, value: &str) -> SurveyResult<()> {
        self.ensure_open()?;
        let field = self.required_field(label)?;
        if field.kind != FieldKind::Text {
            return Err(SurveyError::FieldKindMismatch {
                field: field.label.clone(),
                expected: field.kind.describe(),
            });
        }
        self.texts.insert(field.label.clone(), value.to_owned());
        self.touched = true;
        Ok(())
    }

    pub fn attach_image(&mut self, label: &str, payload: Vec<u8>) -> SurveyResult<&ImageArtifact> {
        self.attach_image_at(label, payload, Local::now().naive_local())
    }

    /// Image fields collect every capture; a document field keeps only the
    /// latest one.
    pub fn attach_image_at(
        &mut self,
        label: &str,
        payload: Vec<u8>,
        captured_at: NaiveDateTime,
    ) -> SurveyResult<&ImageArtifact> {
        self.ensure_open()?;
        let field = self.required_field(label)?;
        if !field.kind.is_capture() {
            return Err(SurveyError::FieldKindMismatch {
                field: field.label.clone(),
                expected: field.kind.describe(),
            });
        }
        if payload.is_empty() {
            return Err(SurveyError::EmptyImage(field.label.clone()));
        }
        let (id, _) = self.matched_account()?;
        let mut artifact = ImageArtifact::new(id, &field.slug(), payload, captured_at);

        if field.kind == FieldKind::Document {
            self.images.remove(&field.label);
        }
        let base = artifact.stem.clone();
        let mut suffix = 1;
        while self
            .images
            .values()
            .flatten()
            .any(|image| image.stem.eq(&artifact.stem))
        {
            suffix += 1;
            artifact.stem = format!("{}_{}", base, suffix);
        }

        self.touched = true;
        let images = self.images.entry(field.label.clone()).or_default();
        images.push(artifact);
        // just pushed, never empty
        Ok(&images[images.len() - 1])
    }

    pub fn remove_images(&mut self, label: &str) -> SurveyResult<()> {
        self.ensure_open()?;
        let field = self.required_field(label)?;
        self.images.remove(&field.label);
        Ok(())
    }

    pub fn account(&self) -> Option<&'a AccountRecord> {
        self.account.as_ref().map(|(_, record)| *record)
    }

    pub fn remark(&self) -> Option<&'a RemarkDefinition> {
        self.remark
    }

    pub fn follow_up_action(&self) -> Option<&'a str> {
        self.remark
            .and_then(|remark| remark.follow_up_action.as_deref())
    }

    /// Whether a mobile number is asked for at all.
    pub fn needs_mobile(&self) -> bool {
        self.remark.is_some_and(|remark| !remark.mobile_exempt)
    }

    pub fn text(&self, label: &str) -> Option<&str> {
        self.texts.get(label).map(String::as_str)
    }

    pub fn images(&self, label: &str) -> &[ImageArtifact] {
        self.images.get(label).map(Vec::as_slice).unwrap_or_default()
    }

    /// Required fields still unsatisfied, in table order, followed by
    /// MOBILE_NO when a valid mobile number is needed but absent.
    pub fn missing_fields(&self) -> Vec<String> {
        let Some(remark) = self.remark else {
            return vec![];
        };
        let mut missing = remark
            .required_fields
            .iter()
            .filter(|field| !self.is_satisfied(field))
            .map(|field| field.label.clone())
            .collect::<Vec<String>>();
        if !remark.mobile_exempt && !mobile::is_valid_mobile(&self.mobile) {
            missing.push(MOBILE_NO.to_owned());
        }
        missing
    }

    pub fn state(&self) -> FormState {
        if self.submitted {
            return FormState::Submitted;
        }
        if self.account.is_none() {
            return FormState::NoAccount;
        }
        if self.remark.is_none() {
            return FormState::AccountMatched;
        }
        if self.missing_fields().is_empty() {
            FormState::FieldsComplete
        } else if self.touched {
            FormState::FieldsIncomplete
        } else {
            FormState::RemarkSelected
        }
    }

    /// Assembles the finished form without touching any store.
    pub fn finalize(&self) -> SurveyResult<Submission> {
        self.ensure_open()?;
        let (_, account) = self.matched_account()?;
        let remark = self.selected_remark()?;
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(SurveyError::IncompleteForm(missing));
        }

        let mut texts = vec![];
        let mut images = vec![];
        for field in remark.required_fields.iter() {
            match field.kind {
                FieldKind::Text => {
                    let value = self.text(&field.label).unwrap_or_default().trim();
                    texts.push((field.column, value.to_owned()));
                }
                FieldKind::Image | FieldKind::Document => {
                    self.images(&field.label)
                        .iter()
                        .for_each(|image| images.push((field.column, image.clone())));
                }
            }
        }
        Ok(Submission {
            account: account.clone(),
            remark: remark.name.clone(),
            follow_up_action: remark.follow_up_action.clone(),
            mobile_no: if remark.mobile_exempt {
                String::new()
            } else {
                self.mobile.clone()
            },
            texts,
            images,
        })
    }

    /// Commits the form once. A later call fails with `AlreadySubmitted`
    /// and writes nothing; a failed commit leaves the form resubmittable.
    pub fn submit<R: RecordStore, I: ImageStore>(
        &mut self,
        sink: &SubmissionSink<R, I>,
    ) -> SurveyResult<SubmissionRecord> {
        let submission = self.finalize()?;
        let record = sink
            .commit(&submission)
            .map_err(SurveyError::PersistenceFailure)?;
        self.submitted = true;
        Ok(record)
    }

    fn ensure_open(&self) -> SurveyResult<()> {
        if self.submitted {
            Err(SurveyError::AlreadySubmitted)
        } else {
            Ok(())
        }
    }

    fn matched_account(&self) -> SurveyResult<(&AccountId, &'a AccountRecord)> {
        self.account
            .as_ref()
            .map(|(id, record)| (id, *record))
            .ok_or(SurveyError::NoAccount)
    }

    fn selected_remark(&self) -> SurveyResult<&'a RemarkDefinition> {
        self.remark.ok_or(SurveyError::NoRemark)
    }

    fn required_field(&self, label: &str) -> SurveyResult<&'a FieldSpec> {
        let remark = self.selected_remark()?;
        remark
            .field(label)
            .ok_or_else(|| SurveyError::FieldNotRequired {
                field: label.to_owned(),
                remark: remark.name.clone(),
            })
    }

    fn has_input_for(&self, remark: &RemarkDefinition) -> bool {
        (!remark.mobile_exempt && !self.mobile.is_empty())
            || remark
                .required_fields
                .iter()
                .any(|field| self.is_satisfied(field))
    }

    fn is_satisfied(&self, field: &FieldSpec) -> bool {
        match field.kind {
            FieldKind::Text => self
                .texts
                .get(&field.label)
                .is_some_and(|value| !value.trim().is_empty()),
            FieldKind::Image | FieldKind::Document => self
                .images
                .get(&field.label)
                .is_some_and(|images| images.iter().any(|image| !image.payload.is_empty())),
        }
    }
}
