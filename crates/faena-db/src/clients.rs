//! Client repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use faena_core::{
    Client, ClientRepository, CreateClientRequest, Error, Result, UpdateClientRequest,
};

/// PostgreSQL implementation of ClientRepository.
pub struct PgClientRepository {
    pool: PgPool,
}

impl PgClientRepository {
    /// Create a new PgClientRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn client_from_row(row: &PgRow) -> Result<Client> {
    Ok(Client {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        company: row.try_get("company")?,
        address: row.try_get("address")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl ClientRepository for PgClientRepository {
    async fn list(&self) -> Result<Vec<Client>> {
        let rows = sqlx::query(
            r#"SELECT id, name, phone, company, address, created_at
               FROM clients
               ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        let clients = rows.iter().map(client_from_row).collect::<Result<Vec<_>>>()?;

        debug!(
            subsystem = "db",
            component = "clients",
            op = "list",
            result_count = clients.len(),
            "Listed clients"
        );
        Ok(clients)
    }

    async fn get(&self, id: Uuid) -> Result<Client> {
        let row = sqlx::query(
            r#"SELECT id, name, phone, company, address, created_at
               FROM clients
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::ClientNotFound(id))?;

        client_from_row(&row)
    }

    async fn create(&self, req: CreateClientRequest) -> Result<Uuid> {
        req.validate()?;

        let id = Uuid::now_v7();
        sqlx::query(
            r#"INSERT INTO clients (id, name, phone, company, address)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.phone)
        .bind(&req.company)
        .bind(&req.address)
        .execute(&self.pool)
        .await?;

        info!(
            subsystem = "db",
            component = "clients",
            op = "create",
            client_id = %id,
            "Created client"
        );
        Ok(id)
    }

    async fn update(&self, id: Uuid, req: UpdateClientRequest) -> Result<()> {
        req.validate()?;

        // Merge-only semantics: omitted fields keep their stored value.
        let result = sqlx::query(
            r#"UPDATE clients
               SET name = COALESCE($2, name),
                   phone = COALESCE($3, phone),
                   company = COALESCE($4, company),
                   address = COALESCE($5, address)
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.phone)
        .bind(&req.company)
        .bind(&req.address)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::ClientNotFound(id));
        }

        info!(
            subsystem = "db",
            component = "clients",
            op = "update",
            client_id = %id,
            "Updated client"
        );
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        // Works referencing this client are left untouched; the reference
        // dangles by design.
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::ClientNotFound(id));
        }

        info!(
            subsystem = "db",
            component = "clients",
            op = "delete",
            client_id = %id,
            "Deleted client"
        );
        Ok(())
    }
}
