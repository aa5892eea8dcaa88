use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::form::image::ImageArtifact;

use super::ImageStore;

/// Saves photos as `{folder}/{stem}.{extension}` and references them by
/// that path. An existing file is never replaced: identical bytes reuse it,
/// anything else is saved as `{stem}_2`, `{stem}_3`, ...
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    folder: PathBuf,
}

impl LocalImageStore {
    pub fn new(folder: &Path) -> anyhow::Result<LocalImageStore> {
        fs::create_dir_all(folder)
            .with_context(|| format!("failed to create image folder {}", folder.display()))?;
        Ok(LocalImageStore {
            folder: folder.into(),
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }
}

impl ImageStore for LocalImageStore {
    fn store(&self, image: &ImageArtifact) -> anyhow::Result<String> {
        let mut suffix = 1;
        loop {
            let name = match suffix {
                1 => image.file_name(),
                _ => format!("{}_{}.{}", image.stem, suffix, image.extension),
            };
            let path = self.folder.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(&image.payload)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    return Ok(path.display().to_string());
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    // a retried commit stores the same bytes again
                    if fs::read(&path).is_ok_and(|existing| existing == image.payload) {
                        return Ok(path.display().to_string());
                    }
                    suffix += 1;
                }
                Err(err) => {
                    return Err(err).with_context(|| format!("failed to create {}", path.display()))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_test() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let folder = dir.path().join("idf_images");
        let store = LocalImageStore::new(&folder)?;
        assert!(folder.is_dir());

        let image = ImageArtifact {
            stem: "12345_PREMISES_IMAGE_20250101120000".into(),
            extension: "jpg".into(),
            payload: vec![0xFF, 0xD8, 0xFF],
        };
        let reference = store.store(&image)?;
        let expected = folder.join("12345_PREMISES_IMAGE_20250101120000.jpg");
        assert_eq!(reference, expected.display().to_string());
        assert_eq!(fs::read(&expected)?, vec![0xFF, 0xD8, 0xFF]);

        // storing the same bytes again reuses the file
        assert_eq!(store.store(&image)?, reference);
        assert_eq!(fs::read_dir(&folder)?.count(), 1);
        Ok(())
    }

    #[test]
    fn same_name_never_replaces_a_stored_photo() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = LocalImageStore::new(dir.path())?;
        let first = ImageArtifact {
            stem: "12345_PREMISES_IMAGE_20250101120000".into(),
            extension: "png".into(),
            payload: vec![1],
        };
        // another submission for the same account and field in the same second
        let second = ImageArtifact {
            payload: vec![2],
            ..first.clone()
        };
        let third = ImageArtifact {
            payload: vec![3],
            ..first.clone()
        };

        let first_ref = store.store(&first)?;
        let second_ref = store.store(&second)?;
        let third_ref = store.store(&third)?;
        assert!(first_ref.ends_with("12345_PREMISES_IMAGE_20250101120000.png"));
        assert!(second_ref.ends_with("12345_PREMISES_IMAGE_20250101120000_2.png"));
        assert!(third_ref.ends_with("12345_PREMISES_IMAGE_20250101120000_3.png"));
        assert_eq!(fs::read(&first_ref)?, vec![1]);
        assert_eq!(fs::read(&second_ref)?, vec![2]);
        assert_eq!(fs::read(&third_ref)?, vec![3]);
        Ok(())
    }
}
