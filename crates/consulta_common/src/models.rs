// --- File: crates/consulta_common/src/models.rs ---
//! Domain records shared by storage, the booking core and the HTTP layer.
//!
//! Booking times are clinic-local wall-clock times (`NaiveDateTime`). They are
//! persisted as fixed-width `YYYY-MM-DDTHH:MM:SS` text so that lexical and
//! chronological order coincide.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage and wire format of booking timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
/// Storage and wire format of calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const HOUR_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// A bookable professional. `id` is the canonical reference; `name` is for display.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professional {
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
    /// Session length used for every booking with this professional.
    pub duration_minutes: i64,
    /// Default work window as `HH:MM`, informational for administrators.
    pub work_start: Option<String>,
    pub work_end: Option<String>,
}

/// Admin input for creating or updating a professional.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProfessional {
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub work_start: Option<String>,
    #[serde(default)]
    pub work_end: Option<String>,
}

/// One offerable start label for a professional on a date.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityEntry {
    pub professional_id: i64,
    pub date: NaiveDate,
    pub hour: String,
}

/// A confirmed booking.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub professional_id: i64,
    /// Display name, joined in on reads.
    pub professional_name: Option<String>,
    pub client_name: String,
    pub client_rut: String,
    pub client_phone: String,
    pub client_email: String,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    pub meeting_link: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A booking that has passed validation but is not persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub professional_id: i64,
    pub client_name: String,
    pub client_rut: String,
    pub client_phone: String,
    pub client_email: String,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
}

/// Filter for listing bookings. Date bounds are inclusive calendar days.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilter {
    pub professional_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Half-open interval overlap: `[a_start, a_end)` intersects `[b_start, b_end)`.
///
/// Back-to-back intervals do not overlap. The SQL stores use the same
/// predicate, `NOT (end <= ? OR start >= ?)`.
pub fn intervals_overlap<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    !(a_end <= b_start || a_start >= b_end)
}

/// Renders `9:00`, `09:00` and `09:00:00` as `09:00`.
///
/// Labels that are not times are compared trimmed and verbatim.
pub fn normalize_hour_label(label: &str) -> String {
    let label = label.trim();
    HOUR_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(label, format).ok())
        .map(|time| time.format("%H:%M").to_string())
        .unwrap_or_else(|| label.to_string())
}
