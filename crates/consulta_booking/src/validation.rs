//! Validation of client booking requests and admin professional input.

use crate::error::BookingError;
use crate::rut::{format_rut, is_valid_rut};
use chrono::{DateTime, NaiveDateTime, NaiveTime, Timelike};
use chrono_tz::Tz;
use consulta_common::models::NewProfessional;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accepted local formats for the requested start time, tried in order.
const LOCAL_DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Longest session a professional can be configured with.
pub const MAX_SESSION_MINUTES: i64 = 480;

/// A professional named by id or, for older front-ends, by display name.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfessionalRef {
    Id(i64),
    Name(String),
}

impl ProfessionalRef {
    /// Reads a query-string value: all digits is an id, anything else a name.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        match value.parse::<i64>() {
            Ok(id) => ProfessionalRef::Id(id),
            Err(_) => ProfessionalRef::Name(value.to_string()),
        }
    }

    /// Numeric strings sent as JSON strings are ids too.
    pub fn normalized(&self) -> Self {
        match self {
            ProfessionalRef::Id(id) => ProfessionalRef::Id(*id),
            ProfessionalRef::Name(name) => ProfessionalRef::parse(name),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, ProfessionalRef::Name(name) if name.trim().is_empty())
    }
}

impl fmt::Display for ProfessionalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfessionalRef::Id(id) => write!(f, "#{}", id),
            ProfessionalRef::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Booking request as submitted by the client form.
///
/// Every field is optional on the wire so that missing fields are reported
/// together with malformed ones.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub rut: Option<String>,
    pub phone: Option<String>,
    pub professional: Option<ProfessionalRef>,
    /// Local start time, e.g. `2024-06-10T09:00`.
    pub datetime: Option<String>,
}

/// A request that passed validation. The professional is not resolved yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBooking {
    pub professional: ProfessionalRef,
    pub client_name: String,
    pub client_rut: String,
    pub client_phone: String,
    pub client_email: String,
    pub start_at: NaiveDateTime,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `local@domain.tld` shape: no whitespace, a non-empty local part and a dot
/// inside the domain part.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }

    email.char_indices().any(|(at, c)| {
        if c != '@' || at == 0 {
            return false;
        }
        let domain = &email[at + 1..];
        domain
            .char_indices()
            .any(|(dot, d)| d == '.' && dot > 0 && dot + 1 < domain.len())
    })
}

/// 8 to 15 digits with an optional leading `+`.
pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

/// Parses the requested start as a clinic-local time, truncated to the minute.
///
/// Offset-qualified RFC 3339 values are converted into `time_zone` first.
pub fn parse_start_time(value: &str, time_zone: Tz) -> Option<NaiveDateTime> {
    let value = value.trim();
    let parsed = LOCAL_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.with_timezone(&time_zone).naive_local())
        })?;

    parsed
        .date()
        .and_hms_opt(parsed.hour(), parsed.minute(), 0)
}

/// Checks presence and format of every field, reporting all failures at once.
pub fn validate_booking_request(
    request: &BookingRequest,
    time_zone: Tz,
) -> Result<ValidBooking, BookingError> {
    let mut fields = Vec::new();

    let name = present(&request.name);
    if name.is_none() {
        fields.push("name");
    }

    let email = present(&request.email).filter(|email| is_valid_email(email));
    if email.is_none() {
        fields.push("email");
    }

    let rut = present(&request.rut)
        .filter(|rut| is_valid_rut(rut))
        .and_then(format_rut);
    if rut.is_none() {
        fields.push("rut");
    }

    let phone = present(&request.phone).filter(|phone| is_valid_phone(phone));
    if phone.is_none() {
        fields.push("phone");
    }

    let professional = request
        .professional
        .as_ref()
        .filter(|p| !p.is_blank())
        .map(ProfessionalRef::normalized);
    if professional.is_none() {
        fields.push("professional");
    }

    let start_at = present(&request.datetime).and_then(|dt| parse_start_time(dt, time_zone));
    if start_at.is_none() {
        fields.push("datetime");
    }

    match (name, email, rut, phone, professional, start_at) {
        (Some(name), Some(email), Some(rut), Some(phone), Some(professional), Some(start_at)) => {
            Ok(ValidBooking {
                professional,
                client_name: name.to_string(),
                client_rut: rut,
                client_phone: phone.to_string(),
                client_email: email.to_string(),
                start_at,
            })
        }
        _ => Err(BookingError::Validation {
            fields: fields.into_iter().map(str::to_string).collect(),
        }),
    }
}

fn parse_hh_mm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trims admin input and checks name, session length and work window.
pub fn validate_professional(input: NewProfessional) -> Result<NewProfessional, BookingError> {
    let mut fields = Vec::new();

    let name = input.name.trim().to_string();
    if name.is_empty() {
        fields.push("name");
    }

    if let Some(minutes) = input.duration_minutes {
        if !(1..=MAX_SESSION_MINUTES).contains(&minutes) {
            fields.push("duration_minutes");
        }
    }

    let work_start = non_empty(input.work_start);
    let work_end = non_empty(input.work_end);
    let start_time = work_start.as_deref().map(parse_hh_mm);
    let end_time = work_end.as_deref().map(parse_hh_mm);
    if matches!(start_time, Some(None)) {
        fields.push("work_start");
    }
    if matches!(end_time, Some(None)) {
        fields.push("work_end");
    }
    if let (Some(Some(start)), Some(Some(end))) = (start_time, end_time) {
        if start >= end {
            fields.push("work_end");
        }
    }

    if !fields.is_empty() {
        return Err(BookingError::Validation {
            fields: fields.into_iter().map(str::to_string).collect(),
        });
    }

    Ok(NewProfessional {
        name,
        bio: non_empty(input.bio),
        duration_minutes: input.duration_minutes,
        work_start,
        work_end,
    })
}
