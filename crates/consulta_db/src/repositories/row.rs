//! Manual row mapping shared by the SQL repositories.

use crate::error::DbError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use consulta_common::models::{
    AvailabilityEntry, Booking, Professional, DATE_FORMAT, TIMESTAMP_FORMAT,
};
use sqlx::any::AnyRow;
use sqlx::Row;

pub(crate) fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn format_date(value: &NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

fn column<T>(row: &AnyRow, name: &str) -> Result<T, DbError>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Any> + sqlx::Type<sqlx::Any>,
{
    row.try_get(name)
        .map_err(|e| DbError::DecodeError(format!("column {}: {}", name, e)))
}

/// Optional text columns are stored as `''` instead of NULL.
pub(crate) fn text_or_empty(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn optional_text(row: &AnyRow, name: &str) -> Result<Option<String>, DbError> {
    let value: String = column(row, name)?;
    Ok(Some(value).filter(|v| !v.is_empty()))
}

fn parse_timestamp(raw: &str, name: &str) -> Result<NaiveDateTime, DbError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|e| DbError::DecodeError(format!("column {}: {} ({})", name, e, raw)))
}

pub(crate) fn professional_from_row(row: &AnyRow) -> Result<Professional, DbError> {
    Ok(Professional {
        id: column(row, "id")?,
        name: column(row, "name")?,
        bio: optional_text(row, "bio")?,
        duration_minutes: column(row, "duration_minutes")?,
        work_start: optional_text(row, "work_start")?,
        work_end: optional_text(row, "work_end")?,
    })
}

pub(crate) fn availability_from_row(row: &AnyRow) -> Result<AvailabilityEntry, DbError> {
    let raw_date: String = column(row, "date")?;
    let date = NaiveDate::parse_from_str(&raw_date, DATE_FORMAT)
        .map_err(|e| DbError::DecodeError(format!("column date: {} ({})", e, raw_date)))?;

    Ok(AvailabilityEntry {
        professional_id: column(row, "professional_id")?,
        date,
        hour: column(row, "hour")?,
    })
}

pub(crate) fn booking_from_row(row: &AnyRow) -> Result<Booking, DbError> {
    let start_raw: String = column(row, "start_at")?;
    let end_raw: String = column(row, "end_at")?;
    let created_raw = optional_text(row, "created_at")?;

    Ok(Booking {
        id: column(row, "id")?,
        professional_id: column(row, "professional_id")?,
        professional_name: optional_text(row, "professional_name")?,
        client_name: column(row, "client_name")?,
        client_rut: column(row, "client_rut")?,
        client_phone: column(row, "client_phone")?,
        client_email: column(row, "client_email")?,
        start_at: parse_timestamp(&start_raw, "start_at")?,
        end_at: parse_timestamp(&end_raw, "end_at")?,
        meeting_link: optional_text(row, "meeting_link")?,
        created_at: created_raw
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    })
}
