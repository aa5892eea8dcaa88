use chrono::NaiveDateTime;

use crate::master::account::AccountId;

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const DEFAULT_EXTENSION: &str = "png";

/// A captured or uploaded photo, held by the form until the sink stores it.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    pub stem: String,
    pub extension: String,
    pub payload: Vec<u8>,
}

impl ImageArtifact {
    /// Name is `{account_id}_{field_slug}_{timestamp}`; the extension follows
    /// the payload's actual format.
    pub fn new(
        account_id: &AccountId,
        field_slug: &str,
        payload: Vec<u8>,
        captured_at: NaiveDateTime,
    ) -> ImageArtifact {
        let stem = format!(
            "{}_{}_{}",
            account_id,
            field_slug,
            captured_at.format(TIMESTAMP_FORMAT)
        );
        let extension = sniff_extension(&payload);
        ImageArtifact {
            stem,
            extension,
            payload,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.stem, self.extension)
    }
}

impl std::fmt::Debug for ImageArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageArtifact")
            .field("stem", &self.stem)
            .field("extension", &self.extension)
            .field("bytes", &self.payload.len())
            .finish()
    }
}

fn sniff_extension(payload: &[u8]) -> String {
    image::guess_format(payload)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or(DEFAULT_EXTENSION)
        .to_owned()
}
