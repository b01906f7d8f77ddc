//! SQL implementation of the booking repository

use crate::error::DbError;
use crate::repositories::booking::{BookingRepository, InsertOutcome};
use crate::repositories::row::{booking_from_row, format_timestamp};
use crate::DbClient;
use chrono::{NaiveDateTime, Utc};
use consulta_common::models::{Booking, BookingFilter, NewBooking, DATE_FORMAT};
use sqlx::{AnyConnection, Row};
use tracing::{debug, error, info, warn};

const SELECT_BOOKING: &str = r#"
    SELECT b.id, b.professional_id, COALESCE(p.name, '') AS professional_name,
           b.client_name, b.client_rut, b.client_phone, b.client_email,
           b.start_at, b.end_at, b.meeting_link, b.created_at
    FROM bookings b
    LEFT JOIN professionals p ON p.id = b.professional_id
"#;

/// SQL implementation of the booking repository
#[derive(Debug, Clone)]
pub struct SqlBookingRepository {
    db_client: DbClient,
}

impl SqlBookingRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

async fn overlapping_on(
    conn: &mut AnyConnection,
    professional_id: i64,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> Result<Vec<Booking>, DbError> {
    let query = format!(
        "{} WHERE b.professional_id = $1 AND NOT (b.end_at <= $2 OR b.start_at >= $3) ORDER BY b.start_at",
        SELECT_BOOKING
    );

    let rows = sqlx::query(&query)
        .bind(professional_id)
        .bind(format_timestamp(start))
        .bind(format_timestamp(end))
        .fetch_all(conn)
        .await
        .map_err(|e| {
            error!("Failed to query overlapping bookings: {}", e);
            DbError::QueryError(e.to_string())
        })?;

    rows.iter().map(booking_from_row).collect()
}

async fn insert_on(conn: &mut AnyConnection, booking: &NewBooking) -> Result<Booking, DbError> {
    let created_at = Utc::now();

    let query = r#"
        INSERT INTO bookings (professional_id, client_name, client_rut, client_phone,
                              client_email, start_at, end_at, meeting_link, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, '', $8)
        RETURNING id
    "#;

    let row = sqlx::query(query)
        .bind(booking.professional_id)
        .bind(&booking.client_name)
        .bind(&booking.client_rut)
        .bind(&booking.client_phone)
        .bind(&booking.client_email)
        .bind(format_timestamp(&booking.start_at))
        .bind(format_timestamp(&booking.end_at))
        .bind(created_at.to_rfc3339())
        .fetch_one(conn)
        .await
        .map_err(|e| {
            error!("Failed to insert booking: {}", e);
            DbError::from_query(e)
        })?;

    let id: i64 = row
        .try_get("id")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;

    Ok(Booking {
        id,
        professional_id: booking.professional_id,
        professional_name: None,
        client_name: booking.client_name.clone(),
        client_rut: booking.client_rut.clone(),
        client_phone: booking.client_phone.clone(),
        client_email: booking.client_email.clone(),
        start_at: booking.start_at,
        end_at: booking.end_at,
        meeting_link: None,
        created_at: Some(created_at),
    })
}

impl BookingRepository for SqlBookingRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing booking schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS bookings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                professional_id INTEGER NOT NULL,
                client_name TEXT NOT NULL,
                client_rut TEXT NOT NULL,
                client_phone TEXT NOT NULL,
                client_email TEXT NOT NULL,
                start_at TEXT NOT NULL,
                end_at TEXT NOT NULL,
                meeting_link TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL DEFAULT ''
            )
        "#;
        self.db_client.execute(query).await?;

        self.db_client
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_bookings_professional_start ON bookings (professional_id, start_at)",
            )
            .await?;

        info!("Booking schema initialized successfully");
        Ok(())
    }

    async fn list_all(&self, filter: BookingFilter) -> Result<Vec<Booking>, DbError> {
        debug!("Listing bookings with filter: {:?}", filter);

        let from = filter
            .from
            .map(|date| format!("{}T00:00:00", date.format(DATE_FORMAT)));
        // `to` is inclusive: compare against the start of the following day
        let until = filter
            .to
            .and_then(|date| date.succ_opt())
            .map(|date| format!("{}T00:00:00", date.format(DATE_FORMAT)));

        let mut clauses = Vec::new();
        if filter.professional_id.is_some() {
            clauses.push(format!("b.professional_id = ${}", clauses.len() + 1));
        }
        if from.is_some() {
            clauses.push(format!("b.start_at >= ${}", clauses.len() + 1));
        }
        if until.is_some() {
            clauses.push(format!("b.start_at < ${}", clauses.len() + 1));
        }
        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let query = format!(
            "{} {} ORDER BY b.start_at ASC, b.id ASC",
            SELECT_BOOKING, where_clause
        );

        let mut statement = sqlx::query(&query);
        if let Some(id) = filter.professional_id {
            statement = statement.bind(id);
        }
        if let Some(from) = from {
            statement = statement.bind(from);
        }
        if let Some(until) = until {
            statement = statement.bind(until);
        }

        let rows = statement
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list bookings: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter().map(booking_from_row).collect()
    }

    async fn insert(&self, booking: NewBooking) -> Result<Booking, DbError> {
        let _write = self.db_client.lock_writes().await;
        let mut conn = self
            .db_client
            .pool()
            .acquire()
            .await
            .map_err(|e| DbError::PoolError(e.to_string()))?;

        let inserted = insert_on(&mut conn, &booking).await?;
        info!("Booking {} inserted", inserted.id);
        Ok(inserted)
    }

    async fn insert_if_free(&self, booking: NewBooking) -> Result<InsertOutcome, DbError> {
        let mut tx = self.db_client.begin_write().await?;

        // The professional may have been deleted since the caller resolved it
        let professional = sqlx::query("SELECT id FROM professionals WHERE id = $1")
            .bind(booking.professional_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;
        if professional.is_none() {
            tx.rollback().await?;
            return Err(DbError::NotFound(format!(
                "professional {}",
                booking.professional_id
            )));
        }

        let overlapping = overlapping_on(
            &mut tx,
            booking.professional_id,
            &booking.start_at,
            &booking.end_at,
        )
        .await?;

        if !overlapping.is_empty() {
            warn!(
                "Slot {} - {} of professional {} overlaps {} booking(s)",
                booking.start_at,
                booking.end_at,
                booking.professional_id,
                overlapping.len()
            );
            tx.rollback().await?;
            return Ok(InsertOutcome::Occupied(overlapping));
        }

        let inserted = insert_on(&mut tx, &booking).await?;

        tx.commit().await?;

        info!(
            "Booking {} inserted for professional {} at {}",
            inserted.id, inserted.professional_id, inserted.start_at
        );
        Ok(InsertOutcome::Inserted(inserted))
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64, DbError> {
        let _write = self.db_client.lock_writes().await;
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to delete booking {}: {}", id, e);
                DbError::QueryError(e.to_string())
            })?;

        debug!("Deleted {} row(s) for booking {}", result.rows_affected(), id);
        Ok(result.rows_affected())
    }

    async fn find_overlapping(
        &self,
        professional_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Booking>, DbError> {
        let mut conn = self
            .db_client
            .pool()
            .acquire()
            .await
            .map_err(|e| DbError::PoolError(e.to_string()))?;

        overlapping_on(&mut conn, professional_id, &start, &end).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Booking>, DbError> {
        let query = format!("{} WHERE b.id = $1", SELECT_BOOKING);

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find booking {}: {}", id, e);
                DbError::QueryError(e.to_string())
            })?;

        row.as_ref().map(booking_from_row).transpose()
    }

    async fn attach_meeting_link(&self, id: i64, link: &str) -> Result<bool, DbError> {
        let _write = self.db_client.lock_writes().await;
        let result = sqlx::query("UPDATE bookings SET meeting_link = $1 WHERE id = $2")
            .bind(link)
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to attach meeting link to booking {}: {}", id, e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }
}
