//! SQL implementation of the availability repository

use crate::error::DbError;
use crate::repositories::availability::{normalize_hour_labels, AvailabilityRepository};
use crate::repositories::row::{availability_from_row, format_date};
use crate::DbClient;
use chrono::NaiveDate;
use consulta_common::models::AvailabilityEntry;
use tracing::{debug, error, info};

/// SQL implementation of the availability repository
#[derive(Debug, Clone)]
pub struct SqlAvailabilityRepository {
    db_client: DbClient,
}

impl SqlAvailabilityRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

impl AvailabilityRepository for SqlAvailabilityRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing availability schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS availability_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                professional_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                hour TEXT NOT NULL,
                UNIQUE(professional_id, date, hour)
            )
        "#;

        self.db_client.execute(query).await?;

        info!("Availability schema initialized successfully");
        Ok(())
    }

    async fn set_day_hours(
        &self,
        professional_id: i64,
        date: NaiveDate,
        hours: &[String],
    ) -> Result<Vec<AvailabilityEntry>, DbError> {
        let labels = normalize_hour_labels(hours);
        let date_text = format_date(&date);
        debug!(
            "Replacing availability of professional {} on {} with {:?}",
            professional_id, date_text, labels
        );

        let mut tx = self.db_client.begin_write().await?;

        let exists = sqlx::query("SELECT id FROM professionals WHERE id = $1")
            .bind(professional_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;
        if exists.is_none() {
            return Err(DbError::NotFound(format!(
                "professional {}",
                professional_id
            )));
        }

        sqlx::query("DELETE FROM availability_entries WHERE professional_id = $1 AND date = $2")
            .bind(professional_id)
            .bind(&date_text)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to clear availability: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        for label in &labels {
            sqlx::query(
                "INSERT INTO availability_entries (professional_id, date, hour) VALUES ($1, $2, $3)",
            )
            .bind(professional_id)
            .bind(&date_text)
            .bind(label)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to insert availability entry: {}", e);
                DbError::from_query(e)
            })?;
        }

        tx.commit().await?;

        info!(
            "Availability of professional {} on {} set to {} hours",
            professional_id,
            date_text,
            labels.len()
        );
        Ok(labels
            .into_iter()
            .map(|hour| AvailabilityEntry {
                professional_id,
                date,
                hour,
            })
            .collect())
    }

    async fn find(
        &self,
        professional_id: Option<i64>,
        date: Option<NaiveDate>,
    ) -> Result<Vec<AvailabilityEntry>, DbError> {
        let mut clauses = Vec::new();
        if professional_id.is_some() {
            clauses.push(format!("professional_id = ${}", clauses.len() + 1));
        }
        if date.is_some() {
            clauses.push(format!("date = ${}", clauses.len() + 1));
        }
        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let query = format!(
            "SELECT professional_id, date, hour FROM availability_entries {} ORDER BY professional_id, date, hour",
            where_clause
        );

        let mut statement = sqlx::query(&query);
        if let Some(id) = professional_id {
            statement = statement.bind(id);
        }
        if let Some(date) = date {
            statement = statement.bind(format_date(&date));
        }

        let rows = statement
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to query availability: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter().map(availability_from_row).collect()
    }

    async fn remove_professional(&self, professional_id: i64) -> Result<u64, DbError> {
        let _write = self.db_client.lock_writes().await;
        let result = sqlx::query("DELETE FROM availability_entries WHERE professional_id = $1")
            .bind(professional_id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to remove availability: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        debug!(
            "Removed {} availability entries of professional {}",
            result.rows_affected(),
            professional_id
        );
        Ok(result.rows_affected())
    }
}
