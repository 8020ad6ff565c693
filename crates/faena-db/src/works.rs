//! Work repository implementation.
//!
//! Owns the attachment replace-and-clean-up policy. An update that swaps
//! in a new attachment path deletes the old blob first (the caller already
//! uploaded the new one before calling `update`); a delete removes both
//! blobs before the row. There is no transaction spanning the row store
//! and the blob store. The ordering here (fetch old state, remove old
//! blob, write new state) is the whole guarantee, and blob removal is
//! best-effort: a failure is logged and the row operation still completes.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, info, warn};
use uuid::Uuid;

use faena_core::{
    AttachmentRef, AttachmentStore, Bucket, Budget, CreateWorkRequest, Error, Result,
    UpdateWorkRequest, Work, WorkDate, WorkRepository,
};

/// PostgreSQL implementation of WorkRepository.
pub struct PgWorkRepository {
    pool: PgPool,
    attachments: Arc<dyn AttachmentStore>,
}

impl PgWorkRepository {
    /// Create a new PgWorkRepository with the given connection pool and
    /// the attachment store used for blob cleanup.
    pub fn new(pool: PgPool, attachments: Arc<dyn AttachmentStore>) -> Self {
        Self { pool, attachments }
    }

    /// Best-effort blob removal. Failures never abort the row operation.
    async fn discard_blob(&self, bucket: Bucket, path: &str) {
        if let Err(e) = self.attachments.remove(bucket, path).await {
            let err = Error::AttachmentCleanup(e.to_string());
            warn!(
                subsystem = "db",
                component = "works",
                op = "cleanup",
                bucket = %bucket,
                storage_path = %path,
                error = %err,
                "Failed to remove stale attachment blob; continuing"
            );
        }
    }
}

/// Blobs orphaned by an update: for each attachment pair the update
/// supplies, the stored path is stale once it differs from the incoming
/// one. Re-sending the same path schedules nothing.
pub fn attachment_cleanup(existing: &Work, update: &UpdateWorkRequest) -> Vec<(Bucket, String)> {
    let mut stale = Vec::new();
    if let (Some(new), Some(old)) = (&update.image, &existing.image) {
        if new.path != old.path {
            stale.push((Bucket::WorkImages, old.path.clone()));
        }
    }
    if let (Some(new), Some(old)) = (&update.pdf, &existing.budget.pdf) {
        if new.path != old.path {
            stale.push((Bucket::WorkPdfs, old.path.clone()));
        }
    }
    stale
}

/// Blobs to remove before deleting a work's row: one per present
/// attachment.
pub fn delete_cleanup(work: &Work) -> Vec<(Bucket, String)> {
    let mut stale = Vec::new();
    if let Some(image) = &work.image {
        stale.push((Bucket::WorkImages, image.path.clone()));
    }
    if let Some(pdf) = &work.budget.pdf {
        stale.push((Bucket::WorkPdfs, pdf.path.clone()));
    }
    stale
}

fn attachment_pair(name: Option<String>, path: Option<String>) -> Option<AttachmentRef> {
    match (name, path) {
        (Some(name), Some(path)) => Some(AttachmentRef { name, path }),
        _ => None,
    }
}

fn work_from_row(row: &PgRow) -> Result<Work> {
    let date: String = row.try_get("date")?;
    Ok(Work {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        description: row.try_get("description")?,
        date: WorkDate::parse(&date)?,
        budget: Budget {
            amount: row.try_get("budget_amount")?,
            pdf: attachment_pair(row.try_get("pdf_name")?, row.try_get("pdf_path")?),
        },
        image: attachment_pair(row.try_get("image_name")?, row.try_get("image_path")?),
        created_at: row.try_get("created_at")?,
    })
}

const WORK_COLUMNS: &str = "id, client_id, description, date, budget_amount, \
     pdf_name, pdf_path, image_name, image_path, created_at";

#[async_trait]
impl WorkRepository for PgWorkRepository {
    async fn list(&self) -> Result<Vec<Work>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM works ORDER BY created_at DESC",
            WORK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let works = rows.iter().map(work_from_row).collect::<Result<Vec<_>>>()?;

        debug!(
            subsystem = "db",
            component = "works",
            op = "list",
            result_count = works.len(),
            "Listed works"
        );
        Ok(works)
    }

    async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<Work>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM works WHERE client_id = $1 ORDER BY created_at DESC",
            WORK_COLUMNS
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(work_from_row).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Work> {
        let row = sqlx::query(&format!("SELECT {} FROM works WHERE id = $1", WORK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::WorkNotFound(id))?;

        work_from_row(&row)
    }

    async fn create(&self, req: CreateWorkRequest) -> Result<Uuid> {
        req.validate()?;

        let id = Uuid::now_v7();
        sqlx::query(
            r#"INSERT INTO works
               (id, client_id, description, date, budget_amount,
                pdf_name, pdf_path, image_name, image_path)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(id)
        .bind(req.client_id)
        .bind(&req.description)
        .bind(req.date.as_str())
        .bind(req.amount)
        .bind(req.pdf.as_ref().map(|a| a.name.as_str()))
        .bind(req.pdf.as_ref().map(|a| a.path.as_str()))
        .bind(req.image.as_ref().map(|a| a.name.as_str()))
        .bind(req.image.as_ref().map(|a| a.path.as_str()))
        .execute(&self.pool)
        .await?;

        info!(
            subsystem = "db",
            component = "works",
            op = "create",
            work_id = %id,
            client_id = %req.client_id,
            "Created work"
        );
        Ok(id)
    }

    async fn update(&self, id: Uuid, req: UpdateWorkRequest) -> Result<()> {
        req.validate()?;

        // Fetch the stored attachment paths before anything changes.
        let existing = self.get(id).await?;

        // The caller uploaded any replacement blob before calling update,
        // so the stored path is already stale; remove it now to avoid
        // orphaned storage objects.
        for (bucket, path) in attachment_cleanup(&existing, &req) {
            self.discard_blob(bucket, &path).await;
        }

        // Write the merged field set as the new row state.
        let merged = req.merge_into(&existing);
        sqlx::query(
            r#"UPDATE works
               SET client_id = $2, description = $3, date = $4, budget_amount = $5,
                   pdf_name = $6, pdf_path = $7, image_name = $8, image_path = $9
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(merged.client_id)
        .bind(&merged.description)
        .bind(merged.date.as_str())
        .bind(merged.budget.amount)
        .bind(merged.budget.pdf.as_ref().map(|a| a.name.as_str()))
        .bind(merged.budget.pdf.as_ref().map(|a| a.path.as_str()))
        .bind(merged.image.as_ref().map(|a| a.name.as_str()))
        .bind(merged.image.as_ref().map(|a| a.path.as_str()))
        .execute(&self.pool)
        .await?;

        info!(
            subsystem = "db",
            component = "works",
            op = "update",
            work_id = %id,
            "Updated work"
        );
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let existing = self.get(id).await?;

        // Blob removal failures must not leave the row undeletable.
        for (bucket, path) in delete_cleanup(&existing) {
            self.discard_blob(bucket, &path).await;
        }

        sqlx::query("DELETE FROM works WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(
            subsystem = "db",
            component = "works",
            op = "delete",
            work_id = %id,
            "Deleted work"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn attachment(name: &str, path: &str) -> AttachmentRef {
        AttachmentRef {
            name: name.to_string(),
            path: path.to_string(),
        }
    }

    fn work_with(image: Option<AttachmentRef>, pdf: Option<AttachmentRef>) -> Work {
        Work {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            description: "Deck repair".to_string(),
            date: WorkDate::parse("2024-06-01").unwrap(),
            budget: Budget {
                amount: 800.0,
                pdf,
            },
            image,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn replacing_an_image_schedules_exactly_the_old_path() {
        let existing = work_with(Some(attachment("before.jpg", "a")), None);
        let update = UpdateWorkRequest {
            image: Some(attachment("after.jpg", "b")),
            ..Default::default()
        };

        let plan = attachment_cleanup(&existing, &update);
        assert_eq!(plan, vec![(Bucket::WorkImages, "a".to_string())]);
        assert!(!plan.iter().any(|(_, p)| p == "b"));
    }

    #[test]
    fn resending_the_same_path_schedules_nothing() {
        let existing = work_with(Some(attachment("photo.jpg", "a")), None);
        let update = UpdateWorkRequest {
            image: Some(attachment("photo.jpg", "a")),
            ..Default::default()
        };
        assert!(attachment_cleanup(&existing, &update).is_empty());
    }

    #[test]
    fn updates_without_attachment_fields_schedule_nothing() {
        let existing = work_with(
            Some(attachment("photo.jpg", "a")),
            Some(attachment("quote.pdf", "q")),
        );
        let update = UpdateWorkRequest {
            description: Some("Deck rebuild".to_string()),
            ..Default::default()
        };
        assert!(attachment_cleanup(&existing, &update).is_empty());
    }

    #[test]
    fn first_time_attachment_has_nothing_to_clean() {
        let existing = work_with(None, None);
        let update = UpdateWorkRequest {
            image: Some(attachment("photo.jpg", "a")),
            pdf: Some(attachment("quote.pdf", "q")),
            ..Default::default()
        };
        assert!(attachment_cleanup(&existing, &update).is_empty());
    }

    #[test]
    fn pdf_replacement_targets_the_pdf_bucket() {
        let existing = work_with(None, Some(attachment("quote.pdf", "old.pdf")));
        let update = UpdateWorkRequest {
            pdf: Some(attachment("quote-v2.pdf", "new.pdf")),
            ..Default::default()
        };
        assert_eq!(
            attachment_cleanup(&existing, &update),
            vec![(Bucket::WorkPdfs, "old.pdf".to_string())]
        );
    }

    #[test]
    fn replacing_both_attachments_schedules_one_per_bucket() {
        let existing = work_with(
            Some(attachment("photo.jpg", "img-old")),
            Some(attachment("quote.pdf", "pdf-old")),
        );
        let update = UpdateWorkRequest {
            image: Some(attachment("photo2.jpg", "img-new")),
            pdf: Some(attachment("quote2.pdf", "pdf-new")),
            ..Default::default()
        };

        let plan = attachment_cleanup(&existing, &update);
        assert_eq!(plan.len(), 2);
        assert!(plan.contains(&(Bucket::WorkImages, "img-old".to_string())));
        assert!(plan.contains(&(Bucket::WorkPdfs, "pdf-old".to_string())));
    }

    #[test]
    fn delete_cleanup_covers_every_present_attachment() {
        let both = work_with(
            Some(attachment("photo.jpg", "img")),
            Some(attachment("quote.pdf", "doc")),
        );
        let plan = delete_cleanup(&both);
        assert_eq!(plan.len(), 2);
        assert!(plan.contains(&(Bucket::WorkImages, "img".to_string())));
        assert!(plan.contains(&(Bucket::WorkPdfs, "doc".to_string())));

        assert!(delete_cleanup(&work_with(None, None)).is_empty());
    }

    #[test]
    fn bare_attachment_columns_map_to_none() {
        assert_eq!(attachment_pair(None, None), None);
        // Half a pair is meaningless; treat it as absent.
        assert_eq!(attachment_pair(Some("n".to_string()), None), None);
        assert_eq!(attachment_pair(None, Some("p".to_string())), None);
    }
}
