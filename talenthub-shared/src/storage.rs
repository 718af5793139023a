/// Resume blob storage
///
/// Uploaded resumes live outside the database; the application record keeps
/// only the returned URL. [`ResumeStore`] is the seam between handlers and
/// the backing store: production uses S3-compatible object storage, tests
/// use an in-memory store.
///
/// Validation happens before any store is touched, so an oversized or
/// mistyped file never consumes upload bandwidth.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use uuid::Uuid;

/// Maximum accepted resume size: 5 MiB
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

/// Accepted resume content types: PDF, DOC, DOCX
pub const ALLOWED_RESUME_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Error type for resume storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// File exceeds [`MAX_RESUME_BYTES`]
    #[error("Resume exceeds the {} byte size limit", MAX_RESUME_BYTES)]
    TooLarge,

    /// Content type is not a PDF or Word document
    #[error("Unsupported resume content type: {0}")]
    UnsupportedType(String),

    /// The backing store rejected or failed the upload
    #[error("Resume upload failed: {0}")]
    Upload(String),
}

/// Checks a resume against the size and content-type limits
///
/// # Errors
///
/// Returns `StorageError::TooLarge` or `StorageError::UnsupportedType`.
pub fn validate_resume(bytes: &Bytes, content_type: &str) -> Result<(), StorageError> {
    if bytes.len() > MAX_RESUME_BYTES {
        return Err(StorageError::TooLarge);
    }

    if !ALLOWED_RESUME_TYPES.contains(&content_type) {
        return Err(StorageError::UnsupportedType(content_type.to_string()));
    }

    Ok(())
}

/// Blob store for uploaded resumes
///
/// Implementations receive pre-validated bytes and return a URL suitable
/// for storing on the user or application record.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Stores the resume and returns its public URL
    async fn upload(&self, bytes: Bytes, content_type: &str) -> Result<String, StorageError>;
}

/// S3-backed resume store
///
/// Objects are written under `resumes/` with a random key, so upload URLs
/// are unguessable and two uploads never collide.
pub struct S3ResumeStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3ResumeStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn extension_for(content_type: &str) -> &'static str {
        match content_type {
            "application/pdf" => "pdf",
            "application/msword" => "doc",
            _ => "docx",
        }
    }
}

#[async_trait]
impl ResumeStore for S3ResumeStore {
    async fn upload(&self, bytes: Bytes, content_type: &str) -> Result<String, StorageError> {
        let key = format!(
            "resumes/{}.{}",
            Uuid::new_v4(),
            Self::extension_for(content_type)
        );

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        Ok(format!("{}/{}", self.public_base_url, key))
    }
}

/// In-memory resume store for tests
///
/// Keeps uploads in a map keyed by their generated URL and can be flipped
/// into a failing mode to exercise upload-error paths.
#[derive(Default)]
pub struct MemoryResumeStore {
    uploads: Mutex<HashMap<String, (Bytes, String)>>,
    fail_uploads: bool,
}

impl MemoryResumeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every upload fails
    pub fn failing() -> Self {
        Self {
            uploads: Mutex::new(HashMap::new()),
            fail_uploads: true,
        }
    }

    pub fn upload_count(&self) -> usize {
        match self.uploads.lock() {
            Ok(uploads) => uploads.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

#[async_trait]
impl ResumeStore for MemoryResumeStore {
    async fn upload(&self, bytes: Bytes, content_type: &str) -> Result<String, StorageError> {
        if self.fail_uploads {
            return Err(StorageError::Upload("simulated upload failure".to_string()));
        }

        let url = format!("memory://resumes/{}", Uuid::new_v4());
        let mut uploads = match self.uploads.lock() {
            Ok(uploads) => uploads,
            Err(poisoned) => poisoned.into_inner(),
        };
        uploads.insert(url.clone(), (bytes, content_type.to_string()));

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_allowed_types() {
        let bytes = Bytes::from_static(b"%PDF-1.7");
        for content_type in ALLOWED_RESUME_TYPES {
            assert!(validate_resume(&bytes, content_type).is_ok());
        }
    }

    #[test]
    fn test_validate_rejects_unsupported_type() {
        let bytes = Bytes::from_static(b"GIF89a");
        let result = validate_resume(&bytes, "image/gif");
        assert!(matches!(result, Err(StorageError::UnsupportedType(_))));
    }

    #[test]
    fn test_validate_rejects_oversized_file() {
        let bytes = Bytes::from(vec![0u8; MAX_RESUME_BYTES + 1]);
        let result = validate_resume(&bytes, "application/pdf");
        assert!(matches!(result, Err(StorageError::TooLarge)));
    }

    #[test]
    fn test_validate_accepts_exactly_max_size() {
        let bytes = Bytes::from(vec![0u8; MAX_RESUME_BYTES]);
        assert!(validate_resume(&bytes, "application/pdf").is_ok());
    }

    #[tokio::test]
    async fn test_memory_store_upload() {
        let store = MemoryResumeStore::new();
        let url = store
            .upload(Bytes::from_static(b"%PDF-1.7"), "application/pdf")
            .await
            .expect("Upload should succeed");

        assert!(url.starts_with("memory://resumes/"));
        assert_eq!(store.upload_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_failing_mode() {
        let store = MemoryResumeStore::failing();
        let result = store
            .upload(Bytes::from_static(b"%PDF-1.7"), "application/pdf")
            .await;

        assert!(matches!(result, Err(StorageError::Upload(_))));
        assert_eq!(store.upload_count(), 0);
    }

    #[test]
    fn test_extension_mapping() {
        assert_eq!(S3ResumeStore::extension_for("application/pdf"), "pdf");
        assert_eq!(S3ResumeStore::extension_for("application/msword"), "doc");
        assert_eq!(
            S3ResumeStore::extension_for(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            "docx"
        );
    }
}
