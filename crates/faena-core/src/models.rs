//! Core data models for faena.
//!
//! These types are shared across the faena crates and represent the two
//! domain entities (clients and the billable works performed for them)
//! plus the request shapes the repositories accept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dates::WorkDate;
use crate::error::{Error, Result};

// =============================================================================
// CLIENT TYPES
// =============================================================================

/// A client the business performs works for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Assigned at insert, immutable. Serialized as integer milliseconds
    /// since epoch.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// Request for creating a new client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl CreateClientRequest {
    /// Reject missing required fields before any backend call.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("client name is required".into()));
        }
        if self.phone.trim().is_empty() {
            return Err(Error::Validation("client phone is required".into()));
        }
        Ok(())
    }
}

/// Partial update for a client. `None` means "leave the stored value
/// untouched"; there is no way to clear a field to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClientRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl UpdateClientRequest {
    /// Supplied required fields must still be non-empty.
    pub fn validate(&self) -> Result<()> {
        if matches!(&self.name, Some(n) if n.trim().is_empty()) {
            return Err(Error::Validation("client name cannot be empty".into()));
        }
        if matches!(&self.phone, Some(p) if p.trim().is_empty()) {
            return Err(Error::Validation("client phone cannot be empty".into()));
        }
        Ok(())
    }

    /// Merge the supplied fields over an existing record. `id` and
    /// `created_at` never change.
    pub fn merge_into(&self, existing: &Client) -> Client {
        Client {
            id: existing.id,
            name: self.name.clone().unwrap_or_else(|| existing.name.clone()),
            phone: self.phone.clone().unwrap_or_else(|| existing.phone.clone()),
            company: self.company.clone().or_else(|| existing.company.clone()),
            address: self.address.clone().or_else(|| existing.address.clone()),
            created_at: existing.created_at,
        }
    }
}

// =============================================================================
// WORK TYPES
// =============================================================================

/// Reference to an uploaded attachment.
///
/// `path` is the generated storage key addressing the physical blob;
/// `name` is the user-facing original filename carried through for
/// display and download. The two always travel together: an attachment
/// is either wholly present or wholly absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub name: String,
    pub path: String,
}

/// The quoted/charged amount for a work, with an optional PDF quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf: Option<AttachmentRef>,
}

/// A billable job performed for a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Work {
    pub id: Uuid,
    /// References a [`Client`]. Deleting a client does not cascade here;
    /// a work can outlive its client with a dangling reference.
    pub client_id: Uuid,
    pub description: String,
    pub date: WorkDate,
    pub budget: Budget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<AttachmentRef>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// Request for creating a new work.
///
/// Attachment references are produced by a prior [`AttachmentStore::store`]
/// call; the repository only persists them.
///
/// [`AttachmentStore::store`]: crate::traits::AttachmentStore::store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkRequest {
    pub client_id: Uuid,
    pub description: String,
    pub date: WorkDate,
    pub amount: f64,
    #[serde(default)]
    pub pdf: Option<AttachmentRef>,
    #[serde(default)]
    pub image: Option<AttachmentRef>,
}

impl CreateWorkRequest {
    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(Error::Validation("work description is required".into()));
        }
        validate_amount(self.amount)
    }
}

/// Partial update for a work.
///
/// `None` on an attachment field preserves the stored pair; `Some`
/// replaces it (and schedules the old blob for cleanup when the path
/// actually changed). There is no way to detach an attachment through an
/// update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWorkRequest {
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<WorkDate>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub pdf: Option<AttachmentRef>,
    #[serde(default)]
    pub image: Option<AttachmentRef>,
}

impl UpdateWorkRequest {
    pub fn validate(&self) -> Result<()> {
        if matches!(&self.description, Some(d) if d.trim().is_empty()) {
            return Err(Error::Validation("work description cannot be empty".into()));
        }
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        Ok(())
    }

    /// Merge the supplied fields over an existing record, falling back to
    /// stored values for everything omitted. `id` and `created_at` never
    /// change.
    pub fn merge_into(&self, existing: &Work) -> Work {
        Work {
            id: existing.id,
            client_id: self.client_id.unwrap_or(existing.client_id),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| existing.description.clone()),
            date: self.date.clone().unwrap_or_else(|| existing.date.clone()),
            budget: Budget {
                amount: self.amount.unwrap_or(existing.budget.amount),
                pdf: self.pdf.clone().or_else(|| existing.budget.pdf.clone()),
            },
            image: self.image.clone().or_else(|| existing.image.clone()),
            created_at: existing.created_at,
        }
    }
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::Validation(format!(
            "budget amount must be a non-negative number, got {}",
            amount
        )));
    }
    Ok(())
}
