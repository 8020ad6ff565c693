//! Core traits for faena abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// ATTACHMENT STORE
// =============================================================================

/// Default lifetime of a signed URL, in seconds.
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 3600;

/// Storage bucket for one kind of attachment.
///
/// Blobs are addressed purely by generated path inside their bucket,
/// never by original filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Photos of completed works.
    WorkImages,
    /// Uploaded PDF quotes.
    WorkPdfs,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::WorkImages => "work-images",
            Bucket::WorkPdfs => "work-pdfs",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Blob storage for work attachments.
///
/// `store` is durable and returns the path used for addressing; signed
/// URLs are ephemeral capabilities minted on demand, so persisted records
/// never carry a URL that can expire.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Upload a payload under a freshly generated, collision-free path in
    /// `bucket`. Returns the original filename unchanged plus the new path.
    async fn store(&self, bucket: Bucket, filename: &str, data: &[u8]) -> Result<AttachmentRef>;

    /// Mint a time-limited read URL for the blob at `path`.
    ///
    /// Fails with `Error::AttachmentNotFound` if no object exists there.
    async fn signed_url(&self, bucket: Bucket, path: &str, ttl_secs: u64) -> Result<String>;

    /// Idempotent delete: a missing path is a no-op, not an error.
    async fn remove(&self, bucket: Bucket, path: &str) -> Result<()>;
}

// =============================================================================
// CLIENT REPOSITORY
// =============================================================================

/// Repository for client CRUD operations.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// All clients, newest first (`created_at` descending).
    async fn list(&self) -> Result<Vec<Client>>;

    /// Fetch a client by id.
    async fn get(&self, id: Uuid) -> Result<Client>;

    /// Insert a new client; the backend assigns `created_at`.
    async fn create(&self, req: CreateClientRequest) -> Result<Uuid>;

    /// Merge the supplied fields into an existing client. Omitted fields
    /// are left untouched, never nulled.
    async fn update(&self, id: Uuid, req: UpdateClientRequest) -> Result<()>;

    /// Remove the client row. Works referencing it are left in place.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

// =============================================================================
// WORK REPOSITORY
// =============================================================================

/// Repository for work CRUD operations.
///
/// Owns the attachment replace-and-clean-up policy: on `update`, a blob
/// whose path is being replaced is removed from its bucket before the new
/// row state is written; on `delete`, both attachment blobs are removed
/// before the row. Cleanup is best-effort: a failed blob delete is logged
/// and never aborts the row operation, at the documented cost of possible
/// orphaned blobs.
#[async_trait]
pub trait WorkRepository: Send + Sync {
    /// All works, newest first (`created_at` descending).
    async fn list(&self) -> Result<Vec<Work>>;

    /// Works for one client, same ordering as [`list`](Self::list).
    async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<Work>>;

    /// Fetch a work by id.
    async fn get(&self, id: Uuid) -> Result<Work>;

    /// Insert a new work carrying whatever attachment references were
    /// already produced by a prior upload. Never uploads itself.
    async fn create(&self, req: CreateWorkRequest) -> Result<Uuid>;

    /// Merge the supplied fields, replacing and cleaning up attachments
    /// whose path changed.
    async fn update(&self, id: Uuid, req: UpdateWorkRequest) -> Result<()>;

    /// Remove the row and best-effort delete its attachment blobs.
    async fn delete(&self, id: Uuid) -> Result<()>;
}
