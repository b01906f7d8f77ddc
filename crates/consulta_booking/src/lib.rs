// --- File: crates/consulta_booking/src/lib.rs ---
//! Booking core of Consulta.
//!
//! Client requests are validated, checked against existing bookings and
//! persisted under a per-professional lock. Meeting creation and the
//! confirmation email happen afterwards on the follow-up worker, so a slow
//! or failing provider never delays or undoes an admitted booking.

pub mod admission;
pub mod auth;
pub mod confirmation;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod outbox;
pub mod routes;
pub mod rut;
#[cfg(test)]
mod rut_proptest;
pub mod seed;
pub mod slots;
#[cfg(test)]
mod slots_proptest;
#[cfg(test)]
mod slots_test;
pub mod state;
pub mod validation;

pub use admission::{Admission, ProfessionalLocks};
pub use error::BookingError;
pub use outbox::{FollowUpLog, FollowUpQueue, FollowUpRecord, FollowUpWorker, StepStatus};
pub use routes::routes;
pub use state::BookingState;
pub use validation::{BookingRequest, ProfessionalRef};
