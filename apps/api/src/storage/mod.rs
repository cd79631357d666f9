//! Image upload and deletion.
//!
//! `PhotoUploader` enforces the upload contract (image content type, at most
//! 5 MiB, non-empty) and names the stored object; the bytes themselves go to
//! whichever `ImageStore` backend is configured.

pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::Photo;

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No file was provided")]
    Empty,

    #[error("File must be an image (got '{0}')")]
    NotAnImage(String),

    #[error("File size must be less than 5MB (got {size} bytes)")]
    TooLarge { size: usize },

    #[error("{0}")]
    Backend(String),
}

/// A single file as received from the client.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Blob storage backend for photos.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores `data` under `key` and returns the object's public URL.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<String, StorageError>;

    /// Deletes the object behind `url`. Returns whether the photo may be
    /// dropped from its record.
    async fn delete(&self, url: &str) -> Result<bool, StorageError>;
}

#[derive(Clone)]
pub struct PhotoUploader {
    store: Arc<dyn ImageStore>,
}

impl PhotoUploader {
    pub fn new(store: Arc<dyn ImageStore>) -> Self {
        Self { store }
    }

    /// Validates and stores an upload. The returned photo is never primary;
    /// the owning photo set decides that.
    pub async fn upload(&self, request: UploadRequest) -> Result<Photo, StorageError> {
        check_upload(&request)?;

        let key = object_key(&request.file_name);
        let url = self
            .store
            .put(&key, request.data, &request.content_type)
            .await?;

        info!("Stored photo '{}' as {key}", request.file_name);
        Ok(Photo::new(url, request.file_name))
    }

    pub async fn delete(&self, url: &str) -> Result<bool, StorageError> {
        self.store.delete(url).await
    }
}

fn check_upload(request: &UploadRequest) -> Result<(), StorageError> {
    if request.data.is_empty() {
        return Err(StorageError::Empty);
    }
    if !request.content_type.starts_with("image/") {
        return Err(StorageError::NotAnImage(request.content_type.clone()));
    }
    if request.data.len() > MAX_UPLOAD_BYTES {
        return Err(StorageError::TooLarge {
            size: request.data.len(),
        });
    }
    Ok(())
}

fn object_key(file_name: &str) -> String {
    format!(
        "photos/{}-{}",
        Uuid::new_v4(),
        file_name.replace(char::is_whitespace, "_")
    )
}

#[cfg(test)]
pub mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Keeps objects in memory; can be told to fail every call.
    #[derive(Default)]
    pub struct MemoryImageStore {
        pub objects: Mutex<HashMap<String, Bytes>>,
        pub fail: bool,
    }

    impl MemoryImageStore {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn object_count(&self) -> usize {
            self.objects.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ImageStore for MemoryImageStore {
        async fn put(
            &self,
            key: &str,
            data: Bytes,
            _content_type: &str,
        ) -> Result<String, StorageError> {
            if self.fail {
                return Err(StorageError::Backend("bucket unavailable".into()));
            }
            self.objects.lock().unwrap().insert(key.to_string(), data);
            Ok(format!("memory://{key}"))
        }

        async fn delete(&self, url: &str) -> Result<bool, StorageError> {
            if self.fail {
                return Ok(false);
            }
            if let Some(key) = url.strip_prefix("memory://") {
                self.objects.lock().unwrap().remove(key);
            }
            Ok(true)
        }
    }

    pub fn image(file_name: &str, size: usize) -> UploadRequest {
        UploadRequest {
            file_name: file_name.to_string(),
            content_type: "image/jpeg".to_string(),
            data: Bytes::from(vec![0u8; size]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{image, MemoryImageStore};
    use super::*;

    fn uploader() -> (PhotoUploader, Arc<MemoryImageStore>) {
        let store = Arc::new(MemoryImageStore::default());
        (PhotoUploader::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_upload_returns_non_primary_photo() {
        let (uploader, store) = uploader();
        let photo = uploader.upload(image("beach day.jpg", 1024)).await.unwrap();
        assert!(!photo.is_primary);
        assert_eq!(photo.alt, "beach day.jpg");
        assert!(photo.url.starts_with("memory://photos/"));
        assert!(photo.url.ends_with("-beach_day.jpg"));
        assert_eq!(store.object_count(), 1);
    }

    #[tokio::test]
    async fn test_upload_rejects_6mb_file() {
        let (uploader, store) = uploader();
        let err = uploader
            .upload(image("big.jpg", 6 * 1024 * 1024))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::TooLarge { .. }));
        assert_eq!(store.object_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_accepts_exactly_5mb() {
        let (uploader, _) = uploader();
        assert!(uploader.upload(image("max.jpg", MAX_UPLOAD_BYTES)).await.is_ok());
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image() {
        let (uploader, _) = uploader();
        let mut request = image("notes.pdf", 10);
        request.content_type = "application/pdf".into();
        let err = uploader.upload(request).await.unwrap_err();
        assert!(matches!(err, StorageError::NotAnImage(_)));
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_file() {
        let (uploader, _) = uploader();
        let err = uploader.upload(image("empty.jpg", 0)).await.unwrap_err();
        assert!(matches!(err, StorageError::Empty));
    }

    #[tokio::test]
    async fn test_backend_failure_is_reported() {
        let uploader = PhotoUploader::new(Arc::new(MemoryImageStore::failing()));
        let err = uploader.upload(image("a.jpg", 10)).await.unwrap_err();
        assert!(matches!(err, StorageError::Backend(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_object() {
        let (uploader, store) = uploader();
        let photo = uploader.upload(image("a.jpg", 10)).await.unwrap();
        assert!(uploader.delete(&photo.url).await.unwrap());
        assert_eq!(store.object_count(), 0);
    }
}
