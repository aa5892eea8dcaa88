use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use rust_xlsxwriter::{Color, Format, Workbook};

use super::{
    column::{header, Column},
    csv_file::CsvRecordStore,
};

const DEFAULT_FILE_NAME: &str = "survey_report.xlsx";
const TIMES_NEW_ROMAN: &str = "Times New Roman";
const SUBMISSION_SHEET_NAME: &str = "Submissions";
const SUMMARY_SHEET_NAME: &str = "RemarkSummary";
const SUMMARY_HEADERS: &[&str] = &["REMARK", "REQUIRED_REMARK", "COUNT"];

#[derive(Debug, Clone, Default)]
struct RemarkCount {
    follow_up: String,
    count: usize,
}

/// Back-office report of submitted surveys: every row, plus a count per
/// remark.
pub struct WorkbookExporter {
    workbook: Workbook,
    rows: Vec<Vec<String>>,
    remarks: HashMap<String, RemarkCount>,
}

impl WorkbookExporter {
    pub fn new() -> WorkbookExporter {
        WorkbookExporter {
            workbook: Workbook::new(),
            rows: vec![],
            remarks: HashMap::new(),
        }
    }

    pub fn add_rows(&mut self, rows: &[Vec<String>]) {
        rows.iter().for_each(|row| {
            let cell = |column: Column| row.get(column.index()).cloned().unwrap_or_default();
            let count = self.remarks.entry(cell(Column::Remark)).or_default();
            count.count += 1;
            // the ledger may mix rows written with and without the column
            if count.follow_up.is_empty() {
                count.follow_up = cell(Column::RequiredRemark);
            }
            self.rows.push(row.clone());
        });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// REMARK, REQUIRED_REMARK, COUNT, sorted by remark.
    pub fn summary(&self) -> Vec<Vec<String>> {
        let mut data = self
            .remarks
            .iter()
            .map(|(remark, count)| {
                vec![
                    remark.clone(),
                    count.follow_up.clone(),
                    format!("{}", count.count),
                ]
            })
            .collect::<Vec<Vec<String>>>();
        data.sort_by_key(|item| item[0].clone());
        data
    }

    /// Writes the workbook to `dest`, or to `dest/survey_report.xlsx` when
    /// `dest` is a directory. Returns the written path.
    pub fn save(mut self, dest: &Path) -> anyhow::Result<PathBuf> {
        let mut submissions = Vec::with_capacity(self.rows.len() + 1);
        submissions.push(header());
        submissions.extend(self.rows.iter().cloned());
        write_sheet(&mut self.workbook, SUBMISSION_SHEET_NAME, &submissions)?;

        let mut summary = self.summary();
        summary.insert(0, summary_header());
        write_sheet(&mut self.workbook, SUMMARY_SHEET_NAME, &summary)?;

        let path = if dest.is_dir() {
            dest.join(DEFAULT_FILE_NAME)
        } else {
            dest.into()
        };
        self.workbook.save(&path)?;
        log::info!("exported {} submissions to {}", self.rows.len(), path.display());
        Ok(path)
    }
}

impl Default for WorkbookExporter {
    fn default() -> Self {
        WorkbookExporter::new()
    }
}

/// Report of everything in a CSV ledger.
pub fn export_ledger(ledger: &CsvRecordStore, dest: &Path) -> anyhow::Result<PathBuf> {
    let mut exporter = WorkbookExporter::new();
    exporter.add_rows(&ledger.rows()?);
    exporter.save(dest)
}

fn write_sheet(workbook: &mut Workbook, name: &str, rows: &[Vec<String>]) -> anyhow::Result<()> {
    let header_format = Format::new()
        .set_background_color(Color::Orange)
        .set_bold()
        .set_font_name(TIMES_NEW_ROMAN);
    let item_format = Format::new().set_font_name(TIMES_NEW_ROMAN);
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(name)?;
    for (index, item) in rows.iter().enumerate() {
        let format = if index.eq(&0) {
            &header_format
        } else {
            &item_format
        };
        worksheet.write_row_with_format(index as u32, 0, item.to_vec(), format)?;
    }
    worksheet.autofit();
    Ok(())
}

fn summary_header() -> Vec<String> {
    SUMMARY_HEADERS.iter().map(|header| header.to_string()).collect()
}
