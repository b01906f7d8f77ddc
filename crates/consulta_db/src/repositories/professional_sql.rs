//! SQL implementation of the professional repository

use crate::error::DbError;
use crate::repositories::professional::ProfessionalRepository;
use crate::repositories::row::{professional_from_row, text_or_empty};
use crate::DbClient;
use consulta_common::models::{NewProfessional, Professional};
use sqlx::Row;
use tracing::{debug, error, info};

const SELECT_PROFESSIONAL: &str = r#"
    SELECT id, name, bio, duration_minutes, work_start, work_end
    FROM professionals
"#;

/// SQL implementation of the professional repository
#[derive(Debug, Clone)]
pub struct SqlProfessionalRepository {
    db_client: DbClient,
}

impl SqlProfessionalRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ProfessionalRepository for SqlProfessionalRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing professional schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS professionals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                bio TEXT NOT NULL DEFAULT '',
                duration_minutes INTEGER NOT NULL DEFAULT 30,
                work_start TEXT NOT NULL DEFAULT '',
                work_end TEXT NOT NULL DEFAULT ''
            )
        "#;

        self.db_client.execute(query).await?;

        info!("Professional schema initialized successfully");
        Ok(())
    }

    async fn create(
        &self,
        professional: NewProfessional,
        default_duration: i64,
    ) -> Result<Professional, DbError> {
        let name = professional.name.trim().to_string();
        let duration = professional.duration_minutes.unwrap_or(default_duration);
        let bio = trimmed(professional.bio);
        let work_start = trimmed(professional.work_start);
        let work_end = trimmed(professional.work_end);
        debug!("Creating professional: {}", name);

        let query = r#"
            INSERT INTO professionals (name, bio, duration_minutes, work_start, work_end)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
        "#;

        let _write = self.db_client.lock_writes().await;
        let row = sqlx::query(query)
            .bind(&name)
            .bind(text_or_empty(&bio))
            .bind(duration)
            .bind(text_or_empty(&work_start))
            .bind(text_or_empty(&work_end))
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert professional: {}", e);
                DbError::from_query(e)
            })?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| DbError::DecodeError(e.to_string()))?;

        info!("Professional {} created with id {}", name, id);
        Ok(Professional {
            id,
            name,
            bio,
            duration_minutes: duration,
            work_start,
            work_end,
        })
    }

    async fn update(
        &self,
        id: i64,
        professional: NewProfessional,
        default_duration: i64,
    ) -> Result<Option<Professional>, DbError> {
        debug!("Updating professional {}", id);

        let name = professional.name.trim().to_string();
        let duration = professional.duration_minutes.unwrap_or(default_duration);
        let bio = trimmed(professional.bio);
        let work_start = trimmed(professional.work_start);
        let work_end = trimmed(professional.work_end);

        let query = r#"
            UPDATE professionals
            SET name = $1, bio = $2, duration_minutes = $3, work_start = $4, work_end = $5
            WHERE id = $6
        "#;

        let _write = self.db_client.lock_writes().await;
        let result = sqlx::query(query)
            .bind(&name)
            .bind(text_or_empty(&bio))
            .bind(duration)
            .bind(text_or_empty(&work_start))
            .bind(text_or_empty(&work_end))
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to update professional {}: {}", id, e);
                DbError::from_query(e)
            })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(Professional {
            id,
            name,
            bio,
            duration_minutes: duration,
            work_start,
            work_end,
        }))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Professional>, DbError> {
        let query = format!("{} WHERE id = $1", SELECT_PROFESSIONAL);

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find professional {}: {}", id, e);
                DbError::QueryError(e.to_string())
            })?;

        row.as_ref().map(professional_from_row).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Professional>, DbError> {
        let query = format!(
            "{} WHERE lower(trim(name)) = lower($1) ORDER BY id LIMIT 1",
            SELECT_PROFESSIONAL
        );

        let row = sqlx::query(&query)
            .bind(name.trim())
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find professional by name {}: {}", name, e);
                DbError::QueryError(e.to_string())
            })?;

        row.as_ref().map(professional_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<Professional>, DbError> {
        let query = format!("{} ORDER BY name, id", SELECT_PROFESSIONAL);

        let rows = sqlx::query(&query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list professionals: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter().map(professional_from_row).collect()
    }

    async fn count(&self) -> Result<i64, DbError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM professionals")
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        row.try_get("total")
            .map_err(|e| DbError::DecodeError(e.to_string()))
    }

    async fn delete_cascade(&self, id: i64) -> Result<bool, DbError> {
        debug!("Deleting professional {} with availability and bookings", id);

        let mut tx = self.db_client.begin_write().await?;

        let availability = sqlx::query("DELETE FROM availability_entries WHERE professional_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        let bookings = sqlx::query("DELETE FROM bookings WHERE professional_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        let professional = sqlx::query("DELETE FROM professionals WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        tx.commit().await?;

        info!(
            "Deleted professional {} ({} availability entries, {} bookings)",
            id,
            availability.rows_affected(),
            bookings.rows_affected()
        );
        Ok(professional.rows_affected() > 0)
    }
}
