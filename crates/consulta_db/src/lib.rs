//! Database integration for Consulta
//!
//! A database agnostic client on top of SQLx's `Any` driver plus the three
//! stores of the booking core: professionals, availability entries and
//! bookings. The schema targets SQLite; the connection URL picks the file.
//!
//! # Example
//!
//! ```rust,no_run
//! use consulta_db::{BookingRepository, DbClient, SqlBookingRepository};
//!
//! async fn setup_db() -> Result<(), Box<dyn std::error::Error>> {
//!     let db_client = DbClient::from_url("sqlite://data/consulta.db").await?;
//!     let bookings = SqlBookingRepository::new(db_client);
//!     bookings.init_schema().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;

// Re-export the client and the repositories for ease of use
pub use client::DbClient;
pub use error::DbError;
pub use repositories::{
    init_schema, normalize_hour_labels, AvailabilityRepository, BookingRepository, InsertOutcome,
    ProfessionalRepository, SqlAvailabilityRepository, SqlBookingRepository,
    SqlProfessionalRepository,
};
