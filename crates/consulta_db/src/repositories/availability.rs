//! Repository for availability entries
//!
//! For each professional and calendar date the store keeps the set of hour
//! labels offered to clients, independent of whether they are booked.

use crate::error::DbError;
use chrono::NaiveDate;
use consulta_common::models::{normalize_hour_label, AvailabilityEntry};
use std::collections::HashSet;
use std::future::Future;

pub trait AvailabilityRepository {
    /// Creates the `availability_entries` table if it doesn't exist
    fn init_schema(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Replaces the whole hour set of `professional_id` on `date`.
    ///
    /// Labels are normalised to `HH:MM`, empty ones dropped and duplicates
    /// removed (first occurrence wins). An empty `hours` leaves the day without availability.
    /// Fails with `DbError::NotFound` when the professional does not exist.
    fn set_day_hours(
        &self,
        professional_id: i64,
        date: NaiveDate,
        hours: &[String],
    ) -> impl Future<Output = Result<Vec<AvailabilityEntry>, DbError>> + Send;

    /// Entries matching the optional filters, ordered by professional, date, hour.
    fn find(
        &self,
        professional_id: Option<i64>,
        date: Option<NaiveDate>,
    ) -> impl Future<Output = Result<Vec<AvailabilityEntry>, DbError>> + Send;

    /// Deletes every entry of a professional. Idempotent.
    fn remove_professional(
        &self,
        professional_id: i64,
    ) -> impl Future<Output = Result<u64, DbError>> + Send;
}

/// Normalises labels to `HH:MM`, drops empty ones and removes duplicates
/// keeping the first occurrence.
///
/// `9:00` and `09:00` are the same slot and collapse into `09:00`.
pub fn normalize_hour_labels(hours: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    hours
        .iter()
        .map(|hour| normalize_hour_label(hour))
        .filter(|hour| !hour.is_empty())
        .filter(|hour| seen.insert(hour.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::normalize_hour_labels;

    #[test]
    fn test_normalize_hour_labels() {
        let hours = vec![
            " 09:00".to_string(),
            "".to_string(),
            "09:30".to_string(),
            "09:00 ".to_string(),
            "   ".to_string(),
            "10:00".to_string(),
        ];
        assert_eq!(normalize_hour_labels(&hours), vec!["09:00", "09:30", "10:00"]);
    }

    #[test]
    fn test_equivalent_times_collapse_into_one_label() {
        let hours = vec![
            "09:00".to_string(),
            "9:00".to_string(),
            "09:00:00".to_string(),
            "9:30".to_string(),
        ];
        assert_eq!(normalize_hour_labels(&hours), vec!["09:00", "09:30"]);
    }

    #[test]
    fn test_normalize_empty_input() {
        assert!(normalize_hour_labels(&[]).is_empty());
    }
}
