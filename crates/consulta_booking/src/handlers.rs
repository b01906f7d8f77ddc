// File: crates/consulta_booking/src/handlers.rs
use crate::admission::resolve_professional;
use crate::auth::{authenticate, LoginRequest, LoginResponse};
use crate::error::BookingError;
use crate::outbox::FollowUpRecord;
use crate::slots::free_slots_for;
use crate::state::BookingState;
use crate::validation::{validate_professional, BookingRequest, ProfessionalRef};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use consulta_common::models::{
    AvailabilityEntry, Booking, BookingFilter, NewProfessional, Professional, DATE_FORMAT,
};
use consulta_db::{
    AvailabilityRepository, BookingRepository, DbError, ProfessionalRepository,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

// --- Request / response types ---

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[derive(Debug, Default, Deserialize)]
pub struct BookingsQuery {
    pub professional_id: Option<String>,
    /// First day, `YYYY-MM-DD`, inclusive.
    pub from: Option<String>,
    /// Last day, `YYYY-MM-DD`, inclusive.
    pub to: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct CreateBookingResponse {
    pub success: bool,
    pub booking: Booking,
    #[serde(rename = "meetingLink", skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    /// Rows removed; 0 when nothing matched.
    pub deleted: u64,
}

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityQuery {
    /// Professional id or display name.
    pub professional: Option<String>,
    pub date: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize)]
pub struct SetAvailabilityRequest {
    pub professional: ProfessionalRef,
    pub date: String,
    #[serde(default)]
    pub hours: Vec<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct SetAvailabilityResponse {
    pub success: bool,
    pub professional_id: i64,
    pub date: NaiveDate,
    pub hours: Vec<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
pub struct FreeSlotsResponse {
    pub professional_id: i64,
    pub date: NaiveDate,
    pub hours: Vec<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

// --- Helpers ---

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, BookingError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| BookingError::BadRequest(format!("Invalid {} '{}', expected YYYY-MM-DD", field, value)))
}

fn optional_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, BookingError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| parse_date(field, v))
        .transpose()
}

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, BookingError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BookingError::Validation {
            fields: vec![field.to_string()],
        })
}

/// Maps a unique-name violation to a 409 naming the professional.
fn duplicate_name(name: &str) -> impl FnOnce(DbError) -> BookingError + '_ {
    move |err| match err {
        DbError::UniqueViolation(_) => BookingError::DuplicateProfessional(name.to_string()),
        other => BookingError::Storage(other),
    }
}

// --- Bookings ---

/// Lists bookings ordered by start time.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/bookings",
    params(BookingsQuery),
    responses(
        (status = 200, description = "Bookings, start ascending", body = [Booking]),
        (status = 400, description = "Malformed filter")
    ),
    tag = "Bookings"
))]
pub async fn list_bookings_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, BookingError> {
    let professional_id = query
        .professional_id
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<i64>()
                .map_err(|_| BookingError::BadRequest(format!("Invalid professional_id '{}'", v)))
        })
        .transpose()?;

    let filter = BookingFilter {
        professional_id,
        from: optional_date("from", query.from.as_deref())?,
        to: optional_date("to", query.to.as_deref())?,
    };

    Ok(Json(state.bookings.list_all(filter).await?))
}

/// Admits a client booking.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/bookings",
    request_body = BookingRequest,
    responses(
        (status = 201, description = "Booking stored", body = CreateBookingResponse),
        (status = 400, description = "Invalid or missing fields"),
        (status = 404, description = "Unknown professional"),
        (status = 409, description = "Slot occupied")
    ),
    tag = "Bookings"
))]
pub async fn create_booking_handler(
    State(state): State<Arc<BookingState>>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), BookingError> {
    let booking = state.admission.admit(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            success: true,
            meeting_link: booking.meeting_link.clone(),
            booking,
        }),
    ))
}

/// Deletes a booking. Deleting an unknown id succeeds.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/bookings/{id}",
    params(("id" = i64, Path, description = "Booking id")),
    responses((status = 200, description = "Deleted or already absent", body = DeleteResponse)),
    tag = "Bookings"
))]
pub async fn delete_booking_handler(
    State(state): State<Arc<BookingState>>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, BookingError> {
    let deleted = state.bookings.delete_by_id(id).await?;
    state.follow_ups().log().remove(id);
    info!("Delete booking {}: {} row(s)", id, deleted);
    Ok(Json(DeleteResponse {
        success: true,
        deleted,
    }))
}

// --- Availability ---

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Entries ordered by professional, date and hour", body = [AvailabilityEntry]),
        (status = 404, description = "Unknown professional")
    ),
    tag = "Availability"
))]
pub async fn get_availability_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<AvailabilityEntry>>, BookingError> {
    let professional_id = match query.professional.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Some(
            resolve_professional(&state.professionals, &ProfessionalRef::parse(value))
                .await?
                .id,
        ),
        _ => None,
    };
    let date = optional_date("date", query.date.as_deref())?;

    Ok(Json(state.availability.find(professional_id, date).await?))
}

/// Replaces a professional's hours for one date.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/availability",
    request_body = SetAvailabilityRequest,
    responses(
        (status = 200, description = "Hours replaced", body = SetAvailabilityResponse),
        (status = 404, description = "Unknown professional")
    ),
    tag = "Availability"
))]
pub async fn set_availability_handler(
    State(state): State<Arc<BookingState>>,
    Json(request): Json<SetAvailabilityRequest>,
) -> Result<Json<SetAvailabilityResponse>, BookingError> {
    let date = parse_date("date", &request.date)?;
    let professional = resolve_professional(&state.professionals, &request.professional).await?;

    let entries = state
        .availability
        .set_day_hours(professional.id, date, &request.hours)
        .await
        .map_err(|err| match err {
            DbError::NotFound(_) => BookingError::ProfessionalNotFound(professional.name.clone()),
            other => BookingError::Storage(other),
        })?;

    Ok(Json(SetAvailabilityResponse {
        success: true,
        professional_id: professional.id,
        date,
        hours: entries.into_iter().map(|entry| entry.hour).collect(),
    }))
}

/// Offered hours of a date that are not booked yet.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/availability/free",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Free slots", body = FreeSlotsResponse),
        (status = 400, description = "Missing professional or date"),
        (status = 404, description = "Unknown professional")
    ),
    tag = "Availability"
))]
pub async fn free_slots_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<FreeSlotsResponse>, BookingError> {
    let reference = ProfessionalRef::parse(required("professional", query.professional.as_deref())?);
    let date = parse_date("date", required("date", query.date.as_deref())?)?;
    let professional = resolve_professional(&state.professionals, &reference).await?;

    let hours = free_slots_for(&state.availability, &state.bookings, professional.id, date).await?;

    Ok(Json(FreeSlotsResponse {
        professional_id: professional.id,
        date,
        hours,
    }))
}

// --- Professionals ---

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/professionals",
    responses((status = 200, description = "Professionals by name", body = [Professional])),
    tag = "Professionals"
))]
pub async fn list_professionals_handler(
    State(state): State<Arc<BookingState>>,
) -> Result<Json<Vec<Professional>>, BookingError> {
    Ok(Json(state.professionals.list().await?))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/professionals",
    request_body = NewProfessional,
    responses(
        (status = 201, description = "Professional created", body = Professional),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Name already taken")
    ),
    tag = "Professionals"
))]
pub async fn create_professional_handler(
    State(state): State<Arc<BookingState>>,
    Json(input): Json<NewProfessional>,
) -> Result<(StatusCode, Json<Professional>), BookingError> {
    let input = validate_professional(input)?;
    let name = input.name.clone();

    let professional = state
        .professionals
        .create(input, state.config.booking.default_session_minutes)
        .await
        .map_err(duplicate_name(&name))?;

    info!("Professional {} created as #{}", professional.name, professional.id);
    Ok((StatusCode::CREATED, Json(professional)))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/professionals/{id}",
    params(("id" = i64, Path, description = "Professional id")),
    request_body = NewProfessional,
    responses(
        (status = 200, description = "Professional updated", body = Professional),
        (status = 404, description = "Unknown professional"),
        (status = 409, description = "Name already taken")
    ),
    tag = "Professionals"
))]
pub async fn update_professional_handler(
    State(state): State<Arc<BookingState>>,
    Path(id): Path<i64>,
    Json(input): Json<NewProfessional>,
) -> Result<Json<Professional>, BookingError> {
    let input = validate_professional(input)?;
    let name = input.name.clone();

    state
        .professionals
        .update(id, input, state.config.booking.default_session_minutes)
        .await
        .map_err(duplicate_name(&name))?
        .map(Json)
        .ok_or_else(|| BookingError::ProfessionalNotFound(format!("#{}", id)))
}

/// Deletes a professional with its availability and bookings.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/professionals/{id}",
    params(("id" = i64, Path, description = "Professional id")),
    responses((status = 200, description = "Deleted or already absent", body = DeleteResponse)),
    tag = "Professionals"
))]
pub async fn delete_professional_handler(
    State(state): State<Arc<BookingState>>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, BookingError> {
    let bookings = state
        .bookings
        .list_all(BookingFilter {
            professional_id: Some(id),
            ..Default::default()
        })
        .await?;
    let existed = state.professionals.delete_cascade(id).await?;
    for booking in &bookings {
        state.follow_ups().log().remove(booking.id);
    }
    info!(
        "Delete professional {}: existed={}, {} booking(s) removed",
        id,
        existed,
        bookings.len()
    );
    Ok(Json(DeleteResponse {
        success: true,
        deleted: u64::from(existed),
    }))
}

// --- Staff ---

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 401, description = "Credentials rejected", body = LoginResponse)
    ),
    tag = "Staff"
))]
pub async fn login_handler(
    State(state): State<Arc<BookingState>>,
    Json(request): Json<LoginRequest>,
) -> (StatusCode, Json<LoginResponse>) {
    match authenticate(&state.config.staff, &request.name, &request.password) {
        Some(role) => {
            info!("Staff login: {} as {}", request.name.trim(), role.as_str());
            (
                StatusCode::OK,
                Json(LoginResponse {
                    success: true,
                    role: Some(role.as_str().to_string()),
                }),
            )
        }
        None => {
            info!("Rejected staff login for '{}'", request.name.trim());
            (
                StatusCode::UNAUTHORIZED,
                Json(LoginResponse {
                    success: false,
                    role: None,
                }),
            )
        }
    }
}

/// Follow-up status board.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/admin/follow-ups",
    responses((status = 200, description = "Follow-ups by booking id", body = [FollowUpRecord])),
    tag = "Staff"
))]
pub async fn list_follow_ups_handler(
    State(state): State<Arc<BookingState>>,
) -> Json<Vec<FollowUpRecord>> {
    Json(state.follow_ups().log().snapshot())
}

/// Queues the follow-up of a booking again.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/follow-ups/{id}/retry",
    params(("id" = i64, Path, description = "Booking id")),
    responses(
        (status = 202, description = "Follow-up queued", body = FollowUpRecord),
        (status = 404, description = "Booking no longer exists")
    ),
    tag = "Staff"
))]
pub async fn retry_follow_up_handler(
    State(state): State<Arc<BookingState>>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<FollowUpRecord>), BookingError> {
    if state.bookings.find_by_id(id).await?.is_none() {
        return Err(BookingError::BookingNotFound(id));
    }

    info!("Retrying follow-up of booking {}", id);
    Ok((StatusCode::ACCEPTED, Json(state.follow_ups().enqueue(id))))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database reachable", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    ),
    tag = "Health"
))]
pub async fn health_handler(
    State(state): State<Arc<BookingState>>,
) -> (StatusCode, Json<HealthResponse>) {
    if state.db_client.is_healthy().await {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                database: "up".to_string(),
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "degraded".to_string(),
                database: "down".to_string(),
            }),
        )
    }
}
