//! # faena-db
//!
//! PostgreSQL row store and attachment storage layer for faena.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for clients and works
//! - Filesystem-backed attachment storage with signed read URLs
//!
//! ## Example
//!
//! ```rust,ignore
//! use faena_db::{Database, FsAttachmentStore, StoreConfig};
//! use faena_core::{ClientRepository, CreateClientRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = FsAttachmentStore::new(StoreConfig::new("/var/lib/faena/files"));
//!     let db = Database::connect("postgres://localhost/faena", store).await?;
//!
//!     let client_id = db.clients.create(CreateClientRequest {
//!         name: "Acme Corp".to_string(),
//!         phone: "611 555 001".to_string(),
//!         company: None,
//!         address: None,
//!     }).await?;
//!
//!     println!("Created client: {}", client_id);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

pub mod attachments;
pub mod clients;
pub mod pool;
pub mod works;

#[cfg(test)]
mod tests;

// Re-export core types
pub use faena_core::*;

// Re-export repository and storage implementations
pub use attachments::{
    generate_attachment_path, sign_token, verify_token, FilesystemBackend, FsAttachmentStore,
    StorageBackend, StoreConfig,
};
pub use clients::PgClientRepository;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use works::{attachment_cleanup, delete_cleanup, PgWorkRepository};

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::PgPool,
    /// Client repository for CRUD operations.
    pub clients: PgClientRepository,
    /// Work repository for CRUD and attachment cleanup.
    pub works: PgWorkRepository,
    /// Attachment store shared with the work repository.
    pub attachments: Arc<FsAttachmentStore>,
}

impl Database {
    /// Create a new Database instance from a connection pool and an
    /// attachment store.
    pub fn new(pool: sqlx::PgPool, store: FsAttachmentStore) -> Self {
        let attachments = Arc::new(store);
        let cleanup: Arc<dyn AttachmentStore> = attachments.clone();
        Self {
            clients: PgClientRepository::new(pool.clone()),
            works: PgWorkRepository::new(pool.clone(), cleanup),
            attachments,
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str, store: FsAttachmentStore) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool, store))
    }

    /// Connect with custom pool configuration.
    pub async fn connect_with_config(
        url: &str,
        config: PoolConfig,
        store: FsAttachmentStore,
    ) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool, store))
    }

    /// Connect using `DATABASE_URL` and the `FILE_STORAGE_PATH` /
    /// `SIGNING_KEY` environment variables.
    pub async fn from_env() -> Result<Self> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| Error::Config("DATABASE_URL is not set".into()))?;
        let store = FsAttachmentStore::new(StoreConfig::from_env()?);
        Self::connect(&url, store).await
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }
}
