//! Booking admission.
//!
//! A request moves through validation, professional resolution, the overlap
//! check and persistence. Persistence is the commit point: once the booking
//! is stored it is returned to the client and its follow-up is queued, and
//! nothing that happens afterwards can undo it.

use crate::error::BookingError;
use crate::outbox::FollowUpQueue;
use crate::validation::{validate_booking_request, BookingRequest, ProfessionalRef};
use chrono::Duration;
use chrono_tz::Tz;
use consulta_common::models::{Booking, NewBooking, Professional};
use consulta_config::BookingConfig;
use consulta_db::{BookingRepository, DbError, InsertOutcome, ProfessionalRepository};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// One async mutex per professional id.
///
/// Admissions for the same professional run their check-and-insert one at a
/// time; different professionals never wait on each other.
#[derive(Debug, Default)]
pub struct ProfessionalLocks {
    locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl ProfessionalLocks {
    pub fn lock_for(&self, professional_id: i64) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(professional_id).or_default().clone()
    }
}

/// Parses the configured clinic time zone.
pub fn parse_time_zone(name: &str) -> Result<Tz, BookingError> {
    name.parse::<Tz>()
        .map_err(|_| BookingError::Configuration(format!("Unknown time zone '{}'", name)))
}

/// Looks a professional up by id, or by display name (case-insensitive).
pub async fn resolve_professional<P>(
    professionals: &P,
    reference: &ProfessionalRef,
) -> Result<Professional, BookingError>
where
    P: ProfessionalRepository,
{
    let found = match reference.normalized() {
        ProfessionalRef::Id(id) => professionals.find_by_id(id).await?,
        ProfessionalRef::Name(name) => professionals.find_by_name(&name).await?,
    };

    found.ok_or_else(|| BookingError::ProfessionalNotFound(reference.to_string()))
}

pub struct Admission<P, B> {
    professionals: P,
    bookings: B,
    locks: ProfessionalLocks,
    follow_ups: FollowUpQueue,
    default_session_minutes: i64,
    time_zone: Tz,
}

impl<P, B> Admission<P, B>
where
    P: ProfessionalRepository + Send + Sync,
    B: BookingRepository + Send + Sync,
{
    pub fn new(
        professionals: P,
        bookings: B,
        follow_ups: FollowUpQueue,
        config: &BookingConfig,
    ) -> Result<Self, BookingError> {
        Ok(Self {
            professionals,
            bookings,
            locks: ProfessionalLocks::default(),
            follow_ups,
            default_session_minutes: config.default_session_minutes,
            time_zone: parse_time_zone(&config.time_zone)?,
        })
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    pub fn follow_ups(&self) -> &FollowUpQueue {
        &self.follow_ups
    }

    /// The professional's own duration, or the configured default when it is not positive.
    pub fn session_minutes(&self, professional: &Professional) -> i64 {
        if professional.duration_minutes > 0 {
            professional.duration_minutes
        } else {
            self.default_session_minutes
        }
    }

    /// Validates, conflict-checks and persists a booking request.
    ///
    /// Fails with `Validation` (listing every bad field), `ProfessionalNotFound`
    /// or `SlotOccupied`; in each case nothing is stored.
    pub async fn admit(&self, request: &BookingRequest) -> Result<Booking, BookingError> {
        let valid = validate_booking_request(request, self.time_zone)?;
        let professional = resolve_professional(&self.professionals, &valid.professional).await?;

        let minutes = self.session_minutes(&professional);
        let new_booking = NewBooking {
            professional_id: professional.id,
            client_name: valid.client_name,
            client_rut: valid.client_rut,
            client_phone: valid.client_phone,
            client_email: valid.client_email,
            start_at: valid.start_at,
            end_at: valid.start_at + Duration::minutes(minutes),
        };
        debug!(
            "Admitting booking with {} from {} to {}",
            professional.name, new_booking.start_at, new_booking.end_at
        );

        let lock = self.locks.lock_for(professional.id);
        let outcome = {
            let _guard = lock.lock().await;
            self.bookings
                .insert_if_free(new_booking)
                .await
                .map_err(|err| match err {
                    DbError::NotFound(_) => {
                        BookingError::ProfessionalNotFound(valid.professional.to_string())
                    }
                    other => BookingError::Storage(other),
                })?
        };

        let mut booking = match outcome {
            InsertOutcome::Inserted(booking) => booking,
            InsertOutcome::Occupied(existing) => {
                warn!(
                    "Rejected booking with {} at {}: overlaps booking {:?}",
                    professional.name,
                    valid.start_at,
                    existing.iter().map(|b| b.id).collect::<Vec<_>>()
                );
                return Err(BookingError::SlotOccupied {
                    professional_id: professional.id,
                    start_at: valid.start_at,
                });
            }
        };
        booking.professional_name = Some(professional.name.clone());

        info!(
            "Booking {} admitted: {} with {} at {}",
            booking.id, booking.client_name, professional.name, booking.start_at
        );
        self.follow_ups.enqueue(booking.id);
        Ok(booking)
    }
}
