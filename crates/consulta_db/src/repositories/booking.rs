//! Repository for bookings

use crate::error::DbError;
use chrono::NaiveDateTime;
use consulta_common::models::{Booking, BookingFilter, NewBooking};
use std::future::Future;

/// Result of [`BookingRepository::insert_if_free`].
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(Booking),
    /// Nothing was written; these bookings overlap the requested interval.
    Occupied(Vec<Booking>),
}

pub trait BookingRepository {
    /// Creates the `bookings` table and its index if they don't exist
    fn init_schema(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Bookings matching the filter, ordered by start time ascending.
    fn list_all(
        &self,
        filter: BookingFilter,
    ) -> impl Future<Output = Result<Vec<Booking>, DbError>> + Send;

    /// Appends a booking with a fresh id. No conflict check.
    fn insert(&self, booking: NewBooking) -> impl Future<Output = Result<Booking, DbError>> + Send;

    /// Overlap check and insert in one transaction.
    ///
    /// Fails with `DbError::NotFound` when the professional no longer exists.
    fn insert_if_free(
        &self,
        booking: NewBooking,
    ) -> impl Future<Output = Result<InsertOutcome, DbError>> + Send;

    /// Removes a booking and returns the number of rows removed (0 if absent).
    fn delete_by_id(&self, id: i64) -> impl Future<Output = Result<u64, DbError>> + Send;

    /// Bookings of `professional_id` whose interval intersects `[start, end)`.
    fn find_overlapping(
        &self,
        professional_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> impl Future<Output = Result<Vec<Booking>, DbError>> + Send;

    fn find_by_id(&self, id: i64) -> impl Future<Output = Result<Option<Booking>, DbError>> + Send;

    /// Stores the external meeting link. Returns `false` if the booking is gone.
    fn attach_meeting_link(
        &self,
        id: i64,
        link: &str,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;
}
