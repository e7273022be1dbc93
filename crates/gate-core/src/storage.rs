//! # Object Storage
//!
//! Uploads are delegated to an [`ObjectStorage`] implementation. The gateway
//! only checks the file extension against an [`UploadPolicy`] first.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// A file received from a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Lowercased extension including the leading dot, e.g. `.png`
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.file_name)
    }
}

/// Public location of a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub key: String,
    pub url: String,
}

/// Destination folder and the extensions accepted for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    pub folder: &'static str,
    pub allowed_extensions: &'static [&'static str],
}

impl UploadPolicy {
    pub const PRODUCT_IMAGES: UploadPolicy = UploadPolicy {
        folder: "product-images",
        allowed_extensions: &[".jpg", ".jpeg", ".png", ".pdf"],
    };

    pub const PRESCRIPTIONS: UploadPolicy = UploadPolicy {
        folder: "prescriptions",
        allowed_extensions: &[".jpg", ".jpeg", ".png"],
    };

    /// Case-insensitive extension check; files without one are rejected
    pub fn permits(&self, file_name: &str) -> bool {
        extension_of(file_name)
            .map(|ext| self.allowed_extensions.contains(&ext.as_str()))
            .unwrap_or(false)
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match base.rfind('.') {
        Some(idx) if idx + 1 < base.len() => Some(base[idx..].to_ascii_lowercase()),
        _ => None,
    }
}

/// Errors raised by storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Request(String),
}

/// Blob store used for product images and prescriptions
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `file` under `folder` and return its public URL
    async fn upload(&self, folder: &str, file: &FileUpload) -> Result<UploadedAsset, StorageError>;
}

/// Type alias for shared storage (dynamic dispatch)
pub type BoxedStorage = Arc<dyn ObjectStorage>;
