use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use anyhow::Context;

use super::{column::header, RecordStore};

/// Local CSV ledger. The header is written once, when the file is new or
/// empty; every submission appends one line.
#[derive(Debug, Clone)]
pub struct CsvRecordStore {
    path: PathBuf,
}

impl CsvRecordStore {
    pub fn new(path: &Path) -> CsvRecordStore {
        CsvRecordStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows already in the ledger, without the header. A ledger that
    /// does not exist yet has no rows.
    pub fn rows(&self) -> anyhow::Result<Vec<Vec<String>>> {
        if !self.path.exists() {
            return Ok(vec![]);
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        let mut rows = vec![];
        for record in reader.records() {
            let record = record.with_context(|| format!("failed to read {}", self.path.display()))?;
            rows.push(record.iter().map(|cell| cell.to_string()).collect());
        }
        Ok(rows)
    }
}

impl RecordStore for CsvRecordStore {
    fn append(&self, row: &[String]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        let write_header = file.metadata()?.len() == 0;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if write_header {
            writer.write_record(header())?;
        }
        writer.write_record(row)?;
        writer
            .flush()
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str) -> Vec<String> {
        let mut row = vec![String::new(); 14];
        row[0] = id.to_string();
        row[1] = "NO METER AT SITE".to_string();
        row[12] = "idf_images/a.png; idf_images/b.png".to_string();
        row
    }

    #[test]
    fn header_written_once() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = CsvRecordStore::new(&dir.path().join("load_data.csv"));
        assert!(store.rows()?.is_empty());
        store.append(&row("1"))?;
        store.append(&row("2"))?;

        let content = fs::read_to_string(store.path())?;
        let lines = content.lines().collect::<Vec<&str>>();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ACCT_ID,REMARK,ZONE,CIRCLE,DIVISION,SUB-DIVISION,MOBILE_NO"));
        assert!(lines[0].ends_with("METER_IMAGE_ALL,PREMISES_IMAGE_ALL,DOCUMENT_IMAGE"));
        assert_eq!(
            lines[1],
            "1,NO METER AT SITE,,,,,,,,,,,idf_images/a.png; idf_images/b.png,"
        );

        let rows = store.rows()?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "2");
        Ok(())
    }

    #[test]
    fn existing_ledger_keeps_its_header() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("load_data.csv");
        fs::write(&path, format!("{}\n", header().join(",")))?;
        let store = CsvRecordStore::new(&path);
        store.append(&row("3"))?;
        let content = fs::read_to_string(&path)?;
        assert_eq!(content.matches("ACCT_ID").count(), 1);
        assert_eq!(store.rows()?.len(), 1);
        Ok(())
    }

    #[test]
    fn creates_missing_parent() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = CsvRecordStore::new(&dir.path().join("out").join("load_data.csv"));
        store.append(&row("4"))?;
        assert_eq!(store.rows()?.len(), 1);
        Ok(())
    }
}
