//! # Image Uploads
//!
//! Admin image upload with type and size checks, forwarded to a blob store.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tracing::info;

use crate::{
    errors::CommerceError,
    types::{context::RequestContext, StoreConfig},
};

/// Blob storage backend for uploaded images.
pub trait BlobStore: Send + Sync {
    /// Stores the bytes and returns their public URL.
    fn put(&self, file_name: &str, content_type: &str, bytes: &[u8])
        -> Result<String, CommerceError>;

    /// Deletes the blob behind a URL.
    fn delete(&self, url: &str) -> Result<(), CommerceError>;
}

/// Stored blob.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlob {
    /// MIME type.
    pub content_type: String,
    /// Raw bytes.
    pub bytes:        Vec<u8>,
}

/// Process-local blob store.
#[derive(Debug)]
pub struct InMemoryBlobStore {
    base_url: String,
    blobs:    Mutex<HashMap<String, StoredBlob>>,
}

impl InMemoryBlobStore {
    /// Creates an empty store serving from `memory://blobs`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url("memory://blobs")
    }

    /// Creates an empty store serving from the given base URL.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), blobs: Mutex::new(HashMap::new()) }
    }

    /// Whether a URL is currently stored.
    pub fn contains(&self, url: &str) -> Result<bool, CommerceError> {
        let blobs = self.blobs.lock().map_err(|_| CommerceError::LockError)?;
        Ok(blobs.contains_key(url))
    }

    /// Number of stored blobs.
    pub fn len(&self) -> Result<usize, CommerceError> {
        let blobs = self.blobs.lock().map_err(|_| CommerceError::LockError)?;
        Ok(blobs.len())
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> Result<bool, CommerceError> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn put(
        &self, file_name: &str, content_type: &str, bytes: &[u8],
    ) -> Result<String, CommerceError> {
        let url = format!("{}/{}-{}", self.base_url, uuid::Uuid::new_v4(), file_name);
        let mut blobs = self.blobs.lock().map_err(|_| CommerceError::LockError)?;
        blobs.insert(url.clone(), StoredBlob {
            content_type: content_type.to_string(),
            bytes:        bytes.to_vec(),
        });
        Ok(url)
    }

    fn delete(&self, url: &str) -> Result<(), CommerceError> {
        let mut blobs = self.blobs.lock().map_err(|_| CommerceError::LockError)?;
        blobs
            .remove(url)
            .map(|_| ())
            .ok_or_else(|| CommerceError::StorageError(format!("no blob at {}", url)))
    }
}

/// Validates uploads and forwards them to the blob store.
pub struct ImageUploader {
    blobs:         Arc<dyn BlobStore>,
    max_bytes:     u64,
    allowed_types: Vec<String>,
}

impl std::fmt::Debug for ImageUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUploader")
            .field("max_bytes", &self.max_bytes)
            .field("allowed_types", &self.allowed_types)
            .finish_non_exhaustive()
    }
}

impl ImageUploader {
    /// Creates an uploader using the limits from `config`.
    #[must_use]
    pub fn new(blobs: Arc<dyn BlobStore>, config: &StoreConfig) -> Self {
        Self {
            blobs,
            max_bytes: config.max_upload_bytes,
            allowed_types: config.allowed_image_types.clone(),
        }
    }

    /// Uploads one image and returns its URL.
    ///
    /// # Errors
    /// `NotAuthenticated`/`NotAuthorized` for non-admins, `UploadRejected`
    /// for empty files, disallowed types or oversize files.
    pub fn upload(
        &self, ctx: &RequestContext, file_name: &str, content_type: &str, bytes: &[u8],
    ) -> Result<String, CommerceError> {
        let admin = ctx.require_admin()?;

        if bytes.is_empty() {
            return Err(CommerceError::UploadRejected("no file provided".to_string()));
        }
        if !self.allowed_types.iter().any(|t| t.eq_ignore_ascii_case(content_type)) {
            return Err(CommerceError::UploadRejected(format!(
                "unsupported file type: {}",
                content_type
            )));
        }
        if bytes.len() as u64 > self.max_bytes {
            return Err(CommerceError::UploadRejected(format!(
                "file exceeds {} bytes",
                self.max_bytes
            )));
        }

        let url = self.blobs.put(&sanitize_file_name(file_name), content_type, bytes)?;
        info!(user = %admin.id, url = %url, size = bytes.len(), "image uploaded");
        Ok(url)
    }
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "upload".to_string() } else { cleaned }
}
