mod config;
mod error;
mod form;
mod master;
mod remark;
mod sink;
mod survey;

pub use config::Config;
pub use error::{ErrorCategory, SurveyError, SurveyResult};
pub use form::image::ImageArtifact;
pub use form::mobile::is_valid_mobile;
pub use form::session::{FormSession, FormState};
pub use master::account::AccountId;
pub use master::table::{AccountRecord, MasterTable};
pub use remark::field::{FieldKind, FieldSpec};
pub use remark::policy::{RemarkDefinition, RemarkPolicy};
pub use remark::symbol::MOBILE_NO;
pub use sink::column::{Column, COLUMNS};
pub use sink::csv_file::CsvRecordStore;
pub use sink::image_folder::LocalImageStore;
pub use sink::memory::{MemoryImageStore, MemoryRecordStore};
pub use sink::record::{Submission, SubmissionRecord};
pub use sink::workbook::{export_ledger, WorkbookExporter};
pub use sink::{ImageStore, RecordStore, SubmissionSink};
pub use survey::Survey;
