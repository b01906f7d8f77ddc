// --- File: crates/consulta_booking/src/state.rs ---
use crate::admission::Admission;
use crate::error::BookingError;
use crate::outbox::FollowUpQueue;
use consulta_config::AppConfig;
use consulta_db::{DbClient, SqlAvailabilityRepository, SqlBookingRepository, SqlProfessionalRepository};
use std::sync::Arc;

pub type SqlAdmission = Admission<SqlProfessionalRepository, SqlBookingRepository>;

/// Shared state of the booking routes.
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub db_client: DbClient,
    pub professionals: SqlProfessionalRepository,
    pub availability: SqlAvailabilityRepository,
    pub bookings: SqlBookingRepository,
    pub admission: SqlAdmission,
}

impl BookingState {
    /// Builds the repositories over `db_client`. Fails on an unknown clinic time zone.
    pub fn new(
        config: Arc<AppConfig>,
        db_client: DbClient,
        follow_ups: FollowUpQueue,
    ) -> Result<Self, BookingError> {
        let professionals = SqlProfessionalRepository::new(db_client.clone());
        let bookings = SqlBookingRepository::new(db_client.clone());
        let admission = Admission::new(
            professionals.clone(),
            bookings.clone(),
            follow_ups,
            &config.booking,
        )?;

        Ok(Self {
            availability: SqlAvailabilityRepository::new(db_client.clone()),
            professionals,
            bookings,
            admission,
            db_client,
            config,
        })
    }

    pub fn follow_ups(&self) -> &FollowUpQueue {
        self.admission.follow_ups()
    }
}
