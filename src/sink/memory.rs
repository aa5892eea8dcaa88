use std::sync::Mutex;

use anyhow::anyhow;

use crate::form::image::ImageArtifact;

use super::{ImageStore, RecordStore};

const MEMORY_SCHEME: &str = "memory://";

/// Keeps rows in process; for dry runs and for driving the form without a
/// backing file.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    rows: Mutex<Vec<Vec<String>>>,
}

impl MemoryRecordStore {
    pub fn new() -> MemoryRecordStore {
        MemoryRecordStore::default()
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows
            .lock()
            .map(|rows| rows.clone())
            .unwrap_or_default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn append(&self, row: &[String]) -> anyhow::Result<()> {
        self.rows
            .lock()
            .map_err(|_| anyhow!("memory record store poisoned"))?
            .push(row.to_vec());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryImageStore {
    images: Mutex<Vec<ImageArtifact>>,
}

impl MemoryImageStore {
    pub fn new() -> MemoryImageStore {
        MemoryImageStore::default()
    }

    pub fn len(&self) -> usize {
        self.images.lock().map(|images| images.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn file_names(&self) -> Vec<String> {
        self.images
            .lock()
            .map(|images| images.iter().map(ImageArtifact::file_name).collect())
            .unwrap_or_default()
    }
}

impl ImageStore for MemoryImageStore {
    /// Re-storing a file name replaces the earlier payload.
    fn store(&self, image: &ImageArtifact) -> anyhow::Result<String> {
        let mut images = self
            .images
            .lock()
            .map_err(|_| anyhow!("memory image store poisoned"))?;
        images.retain(|stored| stored.file_name() != image.file_name());
        images.push(image.clone());
        Ok(format!("{}{}", MEMORY_SCHEME, image.file_name()))
    }
}
