//! Repository for professionals
//!
//! Professionals are referenced everywhere by their integer id; the unique
//! name is kept for display and for lookups coming from older clients.

use crate::error::DbError;
use consulta_common::models::{NewProfessional, Professional};
use std::future::Future;

pub trait ProfessionalRepository {
    /// Creates the `professionals` table if it doesn't exist
    fn init_schema(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Inserts a professional. `default_duration` applies when the input has none.
    ///
    /// Fails with `DbError::UniqueViolation` when the name is taken.
    fn create(
        &self,
        professional: NewProfessional,
        default_duration: i64,
    ) -> impl Future<Output = Result<Professional, DbError>> + Send;

    /// Replaces the fields of an existing professional.
    ///
    /// Returns `None` if no professional has this id.
    fn update(
        &self,
        id: i64,
        professional: NewProfessional,
        default_duration: i64,
    ) -> impl Future<Output = Result<Option<Professional>, DbError>> + Send;

    fn find_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<Professional>, DbError>> + Send;

    /// Case-insensitive lookup on the trimmed name
    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Professional>, DbError>> + Send;

    /// All professionals ordered by name
    fn list(&self) -> impl Future<Output = Result<Vec<Professional>, DbError>> + Send;

    fn count(&self) -> impl Future<Output = Result<i64, DbError>> + Send;

    /// Deletes the professional together with its availability and bookings,
    /// in one transaction. Returns `false` if it did not exist.
    fn delete_cascade(&self, id: i64) -> impl Future<Output = Result<bool, DbError>> + Send;
}
