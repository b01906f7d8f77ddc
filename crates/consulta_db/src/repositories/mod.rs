//! Repository traits and their SQL implementations.
//!
//! Each store has a trait (`*Repository`) and a SQL implementation
//! (`Sql*Repository`) running on SQLite through the `Any` driver.
//! Timestamps and dates are stored as text because the `Any`
//! driver cannot decode chrono types.

pub mod availability;
pub mod availability_sql;
pub mod booking;
pub mod booking_sql;
pub mod professional;
pub mod professional_sql;
mod row;

pub use availability::{normalize_hour_labels, AvailabilityRepository};
pub use availability_sql::SqlAvailabilityRepository;
pub use booking::{BookingRepository, InsertOutcome};
pub use booking_sql::SqlBookingRepository;
pub use professional::ProfessionalRepository;
pub use professional_sql::SqlProfessionalRepository;

use crate::{DbClient, DbError};

/// Creates all tables of the booking core if they do not exist yet.
pub async fn init_schema(db_client: &DbClient) -> Result<(), DbError> {
    SqlProfessionalRepository::new(db_client.clone())
        .init_schema()
        .await?;
    SqlAvailabilityRepository::new(db_client.clone())
        .init_schema()
        .await?;
    SqlBookingRepository::new(db_client.clone())
        .init_schema()
        .await
}
