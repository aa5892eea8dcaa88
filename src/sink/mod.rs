pub mod column;
pub mod csv_file;
pub mod image_folder;
pub mod memory;
pub mod record;
pub mod workbook;

use std::sync::Mutex;

use anyhow::{anyhow, Context};

use crate::form::image::ImageArtifact;

use record::{Submission, SubmissionRecord};

/// Append-only row store (local CSV, remote spreadsheet, ...).
pub trait RecordStore {
    fn append(&self, row: &[String]) -> anyhow::Result<()>;
}

/// Image store; returns the reference written into the row (a path or a
/// link).
pub trait ImageStore {
    fn store(&self, image: &ImageArtifact) -> anyhow::Result<String>;
}

/// Commits finished forms: images first, then exactly one row.
pub struct SubmissionSink<R, I> {
    records: R,
    images: I,
    include_follow_up: bool,
    writer: Mutex<()>,
}

impl<R: RecordStore, I: ImageStore> SubmissionSink<R, I> {
    pub fn new(records: R, images: I) -> SubmissionSink<R, I> {
        SubmissionSink {
            records,
            images,
            include_follow_up: true,
            writer: Mutex::new(()),
        }
    }

    /// Without the follow-up column, REQUIRED_REMARK is written empty.
    pub fn with_follow_up(mut self, include_follow_up: bool) -> SubmissionSink<R, I> {
        self.include_follow_up = include_follow_up;
        self
    }

    pub fn commit(&self, submission: &Submission) -> anyhow::Result<SubmissionRecord> {
        // one writer at a time
        let _guard = self
            .writer
            .lock()
            .map_err(|_| anyhow!("submission writer poisoned"))?;

        let mut references = Vec::with_capacity(submission.images.len());
        for (_, image) in submission.images.iter() {
            let reference = self
                .images
                .store(image)
                .with_context(|| format!("failed to store image {}", image.file_name()))?;
            log::debug!("stored {} as {}", image.file_name(), reference);
            references.push(reference);
        }

        let record = submission.to_record(&references);
        self.records
            .append(&record.to_row(self.include_follow_up))
            .with_context(|| format!("failed to append record for ACCT_ID {}", record.account_id))?;
        log::info!(
            "submitted ACCT_ID {} with remark {} ({} images)",
            record.account_id,
            record.remark,
            references.len()
        );
        Ok(record)
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    pub fn images(&self) -> &I {
        &self.images
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        master::table::AccountRecord,
        sink::{
            column::Column,
            memory::{MemoryImageStore, MemoryRecordStore},
        },
    };

    struct BrokenStore;

    impl RecordStore for BrokenStore {
        fn append(&self, _row: &[String]) -> anyhow::Result<()> {
            Err(anyhow!("spreadsheet unavailable"))
        }
    }

    fn submission() -> Submission {
        Submission {
            account: AccountRecord {
                account_id: "12345".into(),
                zone: "Z1".into(),
                circle: "C1".into(),
                division: "D1".into(),
                sub_division: "S1".into(),
            },
            remark: "OK".into(),
            follow_up_action: Some("BILL REVISION REQUIRED".into()),
            mobile_no: "9876543210".into(),
            texts: vec![
                (Column::MeterSerialNumber, "SN-1".into()),
                (Column::Reading, "1200".into()),
                (Column::Demand, "5".into()),
            ],
            images: vec![(
                Column::MeterImageAll,
                ImageArtifact {
                    stem: "12345_METER_IMAGE_20250101000000".into(),
                    extension: "png".into(),
                    payload: vec![1, 2, 3],
                },
            )],
        }
    }

    #[test]
    fn commit_writes_one_row() -> anyhow::Result<()> {
        let sink = SubmissionSink::new(MemoryRecordStore::new(), MemoryImageStore::new());
        let record = sink.commit(&submission())?;
        assert_eq!(
            record.meter_images,
            vec!["memory://12345_METER_IMAGE_20250101000000.png"]
        );
        let rows = sink.records().rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][Column::RequiredRemark.index()], "BILL REVISION REQUIRED");
        assert_eq!(rows[0][Column::MeterSerialNumber.index()], "SN-1");
        assert_eq!(sink.images().len(), 1);
        Ok(())
    }

    #[test]
    fn commit_without_follow_up_column() -> anyhow::Result<()> {
        let sink = SubmissionSink::new(MemoryRecordStore::new(), MemoryImageStore::new())
            .with_follow_up(false);
        sink.commit(&submission())?;
        assert_eq!(sink.records().rows()[0][Column::RequiredRemark.index()], "");
        Ok(())
    }

    #[test]
    fn append_failure_is_reported() {
        let sink = SubmissionSink::new(BrokenStore, MemoryImageStore::new());
        let err = sink.commit(&submission()).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("failed to append record for ACCT_ID 12345"));
        assert!(message.contains("spreadsheet unavailable"));
    }
}
