use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::remark::policy::{RemarkDefinition, RemarkPolicy};

const DEFAULT_MASTER_TABLE: &str = "IDF_ACCT_ID.csv";
const DEFAULT_OUTPUT_FILE: &str = "load_data.csv";
const DEFAULT_IMAGE_FOLDER: &str = "idf_images";

/// Paths and remark table. Every field has a default, so an empty JSON
/// object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub master_table: PathBuf,
    pub output_file: PathBuf,
    pub image_folder: PathBuf,
    /// Write the follow-up action into REQUIRED_REMARK; when false the
    /// column is kept but left empty.
    pub include_follow_up: bool,
    /// Replaces the built-in remark table.
    pub remarks: Option<Vec<RemarkDefinition>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            master_table: DEFAULT_MASTER_TABLE.into(),
            output_file: DEFAULT_OUTPUT_FILE.into(),
            image_folder: DEFAULT_IMAGE_FOLDER.into(),
            include_follow_up: true,
            remarks: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Relative paths are taken relative to `base`.
    pub fn relative_to(mut self, base: &Path) -> Config {
        let rebase = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        rebase(&mut self.master_table);
        rebase(&mut self.output_file);
        rebase(&mut self.image_folder);
        self
    }

    pub fn policy(&self) -> anyhow::Result<RemarkPolicy> {
        match &self.remarks {
            Some(remarks) => RemarkPolicy::from_definitions(remarks.clone())
                .context("invalid remark table in config"),
            None => Ok(RemarkPolicy::builtin()),
        }
    }
}
