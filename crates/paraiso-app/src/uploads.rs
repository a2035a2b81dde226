//! Photo uploads for stray reports.
//!
//! Photos go up one at a time. A failed upload is logged and skipped; the
//! caller gets the public URLs of the ones that made it.

use std::path::{Path, PathBuf};

use paraiso_store::ObjectStorage;
use tracing::{info, warn};

/// A photo picked by the user, already read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// MIME type guessed from the extension.
    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .to_string()
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Public URLs, in upload order.
    pub urls: Vec<String>,
    /// File names that could not be uploaded.
    pub failed: Vec<String>,
}

/// `<folder>/<index>-<file name>`, with the file name reduced to characters
/// that are safe in a storage key.
pub fn object_path(folder: &str, index: usize, file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name);
    let safe: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = if safe.trim_matches(['.', '_']).is_empty() {
        "photo".to_string()
    } else {
        safe
    };
    format!("{}/{index}-{safe}", folder.trim_end_matches('/'))
}

pub async fn upload_photos(
    storage: &dyn ObjectStorage,
    folder: &str,
    photos: Vec<PhotoUpload>,
) -> UploadOutcome {
    let mut outcome = UploadOutcome::default();
    for (index, photo) in photos.into_iter().enumerate() {
        let path = object_path(folder, index, &photo.file_name);
        let content_type = photo.content_type();
        let size = photo.bytes.len();
        match storage.upload(&path, photo.bytes, &content_type).await {
            Ok(()) => {
                info!(path = %path, size, "uploaded photo");
                outcome.urls.push(storage.public_url(&path));
            }
            Err(e) => {
                warn!(path = %path, error = %e, "photo upload failed, skipping");
                outcome.failed.push(photo.file_name);
            }
        }
    }
    outcome
}

/// Read photos from disk. Unreadable files are logged and left out.
pub async fn load_photos(paths: &[PathBuf]) -> Vec<PhotoUpload> {
    let mut photos = Vec::with_capacity(paths.len());
    for path in paths {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "photo".to_string());
                photos.push(PhotoUpload::new(name, bytes));
            }
            Err(e) => warn!(path = %path.display(), error = %e, "could not read photo"),
        }
    }
    photos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FlakyStorage, PUBLIC_BASE};
    use paraiso_store::MemoryStorage;

    #[test]
    fn content_types() {
        assert_eq!(PhotoUpload::new("a.JPG", vec![]).content_type(), "image/jpeg");
        assert_eq!(PhotoUpload::new("b.png", vec![]).content_type(), "image/png");
        assert_eq!(
            PhotoUpload::new("notes", vec![]).content_type(),
            "application/octet-stream"
        );
        assert_eq!(PhotoUpload::new("c.webp", vec![]).content_type(), "image/webp");
    }

    #[test]
    fn object_paths() {
        assert_eq!(object_path("reports/x", 0, "cat.jpg"), "reports/x/0-cat.jpg");
        assert_eq!(
            object_path("reports/x/", 2, "my dog (1).png"),
            "reports/x/2-my_dog__1_.png"
        );
        assert_eq!(object_path("r", 1, "/tmp/evil/../up.jpg"), "r/1-up.jpg");
        assert_eq!(object_path("r", 0, "çãõ"), "r/0-photo");
    }

    #[tokio::test]
    async fn uploads_in_order() {
        let storage = MemoryStorage::new(PUBLIC_BASE);
        let photos = vec![
            PhotoUpload::new("a.jpg", vec![1, 2, 3]),
            PhotoUpload::new("b.png", vec![4]),
        ];
        let outcome = upload_photos(&storage, "reports/r1", photos).await;
        assert_eq!(
            outcome.urls,
            vec![
                format!("{PUBLIC_BASE}/reports/r1/0-a.jpg"),
                format!("{PUBLIC_BASE}/reports/r1/1-b.png"),
            ]
        );
        assert!(outcome.failed.is_empty());
        assert_eq!(
            storage.object_info("reports/r1/0-a.jpg"),
            Some(("image/jpeg".to_string(), 3))
        );
    }

    #[tokio::test]
    async fn failed_upload_is_skipped() {
        let storage = FlakyStorage {
            inner: MemoryStorage::new(PUBLIC_BASE),
            reject: "huge".into(),
        };
        let photos = vec![
            PhotoUpload::new("one.jpg", vec![1]),
            PhotoUpload::new("huge.jpg", vec![2]),
            PhotoUpload::new("three.jpg", vec![3]),
        ];
        let outcome = upload_photos(&storage, "reports/r2", photos).await;
        assert_eq!(outcome.urls.len(), 2);
        assert!(outcome.urls[1].ends_with("2-three.jpg"));
        assert_eq!(outcome.failed, vec!["huge.jpg"]);
        assert_eq!(storage.inner.paths().len(), 2);
    }

    #[tokio::test]
    async fn load_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("cat.jpg");
        std::fs::write(&present, b"jpeg").unwrap();
        let missing = dir.path().join("gone.jpg");

        let photos = load_photos(&[present, missing]).await;
        assert_eq!(photos, vec![PhotoUpload::new("cat.jpg", b"jpeg".to_vec())]);
    }
}
