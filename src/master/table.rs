use std::{
    collections::{hash_map::Entry, HashMap},
    fs,
    io::Read,
    path::Path,
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::{account::AccountId, decoder::decode_master};

/// One row of the master table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    #[serde(rename = "ACCT_ID")]
    pub account_id: String,
    #[serde(rename = "ZONE")]
    pub zone: String,
    #[serde(rename = "CIRCLE")]
    pub circle: String,
    #[serde(rename = "DIVISION")]
    pub division: String,
    #[serde(rename = "SUB-DIVISION")]
    pub sub_division: String,
}

impl AccountRecord {
    /// Label/value pairs in display order.
    pub fn details(&self) -> [(&'static str, &str); 4] {
        [
            ("ZONE", self.zone.as_str()),
            ("CIRCLE", self.circle.as_str()),
            ("DIVISION", self.division.as_str()),
            ("SUB-DIVISION", self.sub_division.as_str()),
        ]
    }
}

/// Read-only account table, loaded once at startup.
#[derive(Debug, Default)]
pub struct MasterTable {
    records: HashMap<AccountId, AccountRecord>,
}

impl MasterTable {
    pub fn load(path: &Path) -> anyhow::Result<MasterTable> {
        let raw = fs::read(path)
            .with_context(|| format!("failed to read master table {}", path.display()))?;
        let table = MasterTable::from_reader(decode_master(&raw).as_bytes())
            .with_context(|| format!("failed to parse master table {}", path.display()))?;
        log::info!(
            "loaded {} accounts from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parses UTF-8 CSV with a header row. Only ACCT_ID, ZONE, CIRCLE,
    /// DIVISION and SUB-DIVISION are read; other columns are ignored. Rows
    /// shorter than the header get blank trailing cells.
    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<MasterTable> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let headers = reader
            .headers()
            .context("failed to read master header")?
            .clone();
        let mut records = vec![];
        for (index, row) in reader.records().enumerate() {
            // header is line 1
            let line = index + 2;
            let mut row = row.with_context(|| format!("invalid master row at line {}", line))?;
            if row.len() < headers.len() {
                log::warn!(
                    "master row at line {} has {} of {} cells, leaving the rest blank",
                    line,
                    row.len(),
                    headers.len()
                );
                while row.len() < headers.len() {
                    row.push_field("");
                }
            }
            let record = row
                .deserialize::<AccountRecord>(Some(&headers))
                .with_context(|| format!("invalid master row at line {}", line))?;
            records.push(record);
        }
        Ok(MasterTable::from_records(records))
    }

    /// First occurrence of an account id wins.
    pub fn from_records(records: Vec<AccountRecord>) -> MasterTable {
        let mut table = HashMap::with_capacity(records.len());
        for record in records {
            let id = match AccountId::parse(&record.account_id) {
                Ok(id) => id,
                Err(_) => {
                    log::warn!("skipping master row with invalid ACCT_ID {:?}", record.account_id);
                    continue;
                }
            };
            match table.entry(id) {
                Entry::Occupied(entry) => {
                    log::warn!("duplicate ACCT_ID {} in master table, keeping first", entry.key());
                }
                Entry::Vacant(entry) => {
                    let mut record = record;
                    record.account_id = entry.key().to_string();
                    entry.insert(record);
                }
            }
        }
        MasterTable { records: table }
    }

    pub fn lookup(&self, id: &AccountId) -> Option<&AccountRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const MASTER: &str = "\
ACCT_ID,NAME,ZONE,CIRCLE,DIVISION,SUB-DIVISION
12345,A,Z1,C1,D1,S1
67890, B ,Z2 , C2,D2,S2
12345,dup,Z9,C9,D9,S9
not-a-number,x,Z,C,D,S
";

    fn id(raw: &str) -> AccountId {
        AccountId::parse(raw).unwrap()
    }

    #[test]
    fn lookup_test() -> anyhow::Result<()> {
        let table = MasterTable::from_reader(MASTER.as_bytes())?;
        assert_eq!(table.len(), 2);
        let record = table.lookup(&id("12345")).unwrap();
        assert_eq!(record.zone, "Z1");
        assert_eq!(record.sub_division, "S1");
        let record = table.lookup(&id("67890")).unwrap();
        assert_eq!(record.zone, "Z2");
        assert_eq!(record.circle, "C2");
        assert!(table.lookup(&id("11111")).is_none());
        Ok(())
    }

    #[test]
    fn short_row_is_padded() -> anyhow::Result<()> {
        let raw = "ACCT_ID,ZONE,CIRCLE,DIVISION,SUB-DIVISION\n12345,Z1,C1,D1,S1\n67890,Z2,C2\n";
        let table = MasterTable::from_reader(raw.as_bytes())?;
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup(&id("12345")).unwrap().sub_division, "S1");
        let record = table.lookup(&id("67890")).unwrap();
        assert_eq!(record.circle, "C2");
        assert_eq!(record.division, "");
        assert_eq!(record.sub_division, "");
        Ok(())
    }

    #[test]
    fn missing_column_fails() {
        let raw = "ACCT_ID,ZONE,CIRCLE,DIVISION\n1,Z,C,D\n";
        assert!(MasterTable::from_reader(raw.as_bytes()).is_err());
    }

    #[test]
    fn load_legacy_encoded_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"ACCT_ID,ZONE,CIRCLE,DIVISION,SUB-DIVISION\n42,Z\xE9,C,D,S\n")?;
        let table = MasterTable::load(file.path())?;
        assert_eq!(table.lookup(&id("42")).unwrap().zone, "Zé");
        Ok(())
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = MasterTable::load(&dir.path().join("IDF_ACCT_ID.csv")).unwrap_err();
        assert!(err.to_string().contains("failed to read master table"));
    }
}
