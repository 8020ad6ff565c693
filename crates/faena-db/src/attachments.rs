//! Attachment storage with a filesystem backend and signed read URLs.
//!
//! Blobs live in one directory per bucket and are addressed by a
//! generated path (a random UUID plus the original file extension), so a
//! path can never be guessed from user input and is never reused after
//! deletion. The persisted work record keeps only `{name, path}`; read
//! access goes through short-lived signed URLs minted on demand.
//!
//! ## Example
//!
//! ```rust,ignore
//! use faena_db::attachments::{FsAttachmentStore, StoreConfig};
//! use faena_core::{AttachmentStore, Bucket, DEFAULT_SIGNED_URL_TTL_SECS};
//!
//! let store = FsAttachmentStore::new(StoreConfig::new("/var/lib/faena/files"));
//!
//! let stored = store.store(Bucket::WorkPdfs, "quote.pdf", &data).await?;
//! let url = store
//!     .signed_url(Bucket::WorkPdfs, &stored.path, DEFAULT_SIGNED_URL_TTL_SECS)
//!     .await?;
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use faena_core::{AttachmentRef, AttachmentStore, Bucket, Error, Result};

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Storage backend trait for different storage implementations.
///
/// Allows abstracting over filesystem, S3, or other storage providers.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write data to the specified object key.
    async fn write(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Read data from the specified object key.
    async fn read(&self, key: &str) -> Result<Vec<u8>>;

    /// Delete data at the specified object key. Missing keys are a no-op.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if data exists at the specified object key.
    async fn exists(&self, key: &str) -> Result<bool>;
}

/// Filesystem storage backend.
///
/// Object keys map directly to paths under the base directory.
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    /// Create a new filesystem backend with the given base directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn full_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(key);
        debug!(
            subsystem = "storage",
            op = "write",
            storage_path = %key,
            size = data.len(),
            "attachments: write"
        );

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Atomic write: temp file + rename
        let temp_path = full_path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &full_path).await?;
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let full_path = self.full_path(key);
        Ok(fs::read(full_path).await?)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let full_path = self.full_path(key);
        if fs::try_exists(&full_path).await? {
            fs::remove_file(full_path).await?;
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let full_path = self.full_path(key);
        Ok(fs::try_exists(full_path).await?)
    }
}

// =============================================================================
// PATH GENERATION & URL SIGNING
// =============================================================================

/// Generate a fresh storage path for an uploaded file.
///
/// Format: `{uuid-v4}.{ext}`, keeping the original extension when it is a
/// plain alphanumeric one. The UUID guarantees non-collision; the original
/// filename itself never reaches the storage layer.
pub fn generate_attachment_path(filename: &str) -> String {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, e)| e)
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()));

    let id = Uuid::new_v4();
    match ext {
        Some(e) => format!("{}.{}", id, e.to_lowercase()),
        None => id.to_string(),
    }
}

/// Compute the MAC token for a signed URL.
///
/// Keyed BLAKE3 over `{bucket}/{path}:{expires}`, URL-safe base64.
pub fn sign_token(key: &[u8; 32], bucket: Bucket, path: &str, expires_unix: i64) -> String {
    let message = format!("{}/{}:{}", bucket.as_str(), path, expires_unix);
    let mac = blake3::keyed_hash(key, message.as_bytes());
    URL_SAFE_NO_PAD.encode(mac.as_bytes())
}

/// Verify a signed-URL token against the signing key and current time.
pub fn verify_token(
    key: &[u8; 32],
    bucket: Bucket,
    path: &str,
    expires_unix: i64,
    token: &str,
    now_unix: i64,
) -> bool {
    if expires_unix < now_unix {
        return false;
    }
    let decoded: [u8; 32] = match URL_SAFE_NO_PAD
        .decode(token)
        .ok()
        .and_then(|bytes| bytes.try_into().ok())
    {
        Some(bytes) => bytes,
        None => return false,
    };

    let message = format!("{}/{}:{}", bucket.as_str(), path, expires_unix);
    let expected = blake3::keyed_hash(key, message.as_bytes());
    // blake3::Hash comparison is constant-time
    expected == blake3::Hash::from(decoded)
}

// =============================================================================
// ATTACHMENT STORE
// =============================================================================

/// Configuration for the attachment store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base directory holding one subdirectory per bucket.
    pub root: PathBuf,
    /// Key for signing URLs. Freshly generated keys invalidate previously
    /// minted URLs on restart, which is acceptable for ephemeral grants.
    pub signing_key: [u8; 32],
}

impl StoreConfig {
    /// Configuration with a random signing key.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            signing_key: rand::random(),
        }
    }

    /// Use a fixed signing key so URLs stay valid across restarts.
    pub fn with_signing_key(mut self, key: [u8; 32]) -> Self {
        self.signing_key = key;
        self
    }

    /// Read configuration from the environment.
    ///
    /// `FILE_STORAGE_PATH` names the base directory (default
    /// `/var/lib/faena/files`); `SIGNING_KEY`, when set, must be 64 hex
    /// characters.
    pub fn from_env() -> Result<Self> {
        let root = std::env::var("FILE_STORAGE_PATH")
            .unwrap_or_else(|_| "/var/lib/faena/files".to_string());
        let mut config = Self::new(root);

        if let Ok(hex_key) = std::env::var("SIGNING_KEY") {
            let bytes = hex::decode(&hex_key)
                .map_err(|e| Error::Config(format!("SIGNING_KEY is not valid hex: {}", e)))?;
            let key: [u8; 32] = bytes
                .try_into()
                .map_err(|_| Error::Config("SIGNING_KEY must be 32 bytes (64 hex chars)".into()))?;
            config = config.with_signing_key(key);
        }
        Ok(config)
    }
}

/// Filesystem-backed [`AttachmentStore`].
pub struct FsAttachmentStore {
    backend: FilesystemBackend,
    signing_key: [u8; 32],
}

impl FsAttachmentStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            backend: FilesystemBackend::new(config.root),
            signing_key: config.signing_key,
        }
    }

    fn object_key(bucket: Bucket, path: &str) -> String {
        format!("{}/{}", bucket.as_str(), path)
    }

    /// Check a presented URL token. Exposed for whatever serves the files.
    pub fn verify_signed_url(
        &self,
        bucket: Bucket,
        path: &str,
        expires_unix: i64,
        token: &str,
    ) -> bool {
        let now = chrono::Utc::now().timestamp();
        verify_token(&self.signing_key, bucket, path, expires_unix, token, now)
    }
}

#[async_trait]
impl AttachmentStore for FsAttachmentStore {
    async fn store(&self, bucket: Bucket, filename: &str, data: &[u8]) -> Result<AttachmentRef> {
        let path = generate_attachment_path(filename);

        self.backend
            .write(&Self::object_key(bucket, &path), data)
            .await
            .map_err(|e| Error::Upload(e.to_string()))?;

        debug!(
            subsystem = "storage",
            component = "attachments",
            op = "store",
            bucket = %bucket,
            storage_path = %path,
            size = data.len(),
            "Stored attachment"
        );

        Ok(AttachmentRef {
            name: filename.to_string(),
            path,
        })
    }

    async fn signed_url(&self, bucket: Bucket, path: &str, ttl_secs: u64) -> Result<String> {
        if !self.backend.exists(&Self::object_key(bucket, path)).await? {
            return Err(Error::AttachmentNotFound(path.to_string()));
        }

        let expires = chrono::Utc::now().timestamp() + ttl_secs as i64;
        let token = sign_token(&self.signing_key, bucket, path, expires);

        Ok(format!(
            "/files/{}/{}?expires={}&token={}",
            bucket.as_str(),
            path,
            expires,
            token
        ))
    }

    async fn remove(&self, bucket: Bucket, path: &str) -> Result<()> {
        self.backend.delete(&Self::object_key(bucket, path)).await?;
        debug!(
            subsystem = "storage",
            component = "attachments",
            op = "remove",
            bucket = %bucket,
            storage_path = %path,
            "Removed attachment"
        );
        Ok(())
    }
}
