//! # faena-core
//!
//! Core types, traits, and derived-view logic for faena, a small-business
//! record keeper for clients and the billable works performed for them.
//!
//! This crate provides the domain models, the repository and attachment
//! store trait definitions, and the pure dashboard computations (filter,
//! sort, metrics) over already-loaded record sets.

pub mod cache;
pub mod dashboard;
pub mod dates;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use cache::Workspace;
pub use dashboard::{
    client_name, filter_clients, filter_works, format_currency, sort_works, total_earnings,
    works_in_month, works_this_month, SortDirection, SortKey, WorkSort,
};
pub use dates::WorkDate;
pub use error::{Error, Result};
pub use models::*;
pub use traits::{
    AttachmentStore, Bucket, ClientRepository, WorkRepository, DEFAULT_SIGNED_URL_TTL_SECS,
};
