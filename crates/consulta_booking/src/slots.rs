//! Free-slot resolution: offered hour labels minus booked start times.

use chrono::{NaiveDate, NaiveDateTime};
use consulta_common::models::{normalize_hour_label, BookingFilter};
use consulta_db::{AvailabilityRepository, BookingRepository, DbError};
use std::collections::HashSet;
use tracing::debug;

/// Offered labels of `date` that no booking starts at, in offered order.
///
/// Bookings on other dates are ignored. Start times are compared at minute
/// precision.
pub fn free_slots(hours: &[String], booked_starts: &[NaiveDateTime], date: NaiveDate) -> Vec<String> {
    let booked: HashSet<String> = booked_starts
        .iter()
        .filter(|start| start.date() == date)
        .map(|start| start.format("%H:%M").to_string())
        .collect();

    hours
        .iter()
        .filter(|hour| !booked.contains(&normalize_hour_label(hour)))
        .cloned()
        .collect()
}

/// Free slots of a professional on a date, read from the stores.
pub async fn free_slots_for<A, B>(
    availability: &A,
    bookings: &B,
    professional_id: i64,
    date: NaiveDate,
) -> Result<Vec<String>, DbError>
where
    A: AvailabilityRepository,
    B: BookingRepository,
{
    let hours: Vec<String> = availability
        .find(Some(professional_id), Some(date))
        .await?
        .into_iter()
        .map(|entry| entry.hour)
        .collect();

    let booked: Vec<NaiveDateTime> = bookings
        .list_all(BookingFilter {
            professional_id: Some(professional_id),
            from: Some(date),
            to: Some(date),
        })
        .await?
        .into_iter()
        .map(|booking| booking.start_at)
        .collect();

    let free = free_slots(&hours, &booked, date);
    debug!(
        "Professional {} on {}: {} offered, {} booked, {} free",
        professional_id,
        date,
        hours.len(),
        booked.len(),
        free.len()
    );
    Ok(free)
}
