// File: crates/consulta_booking/src/doc.rs
#![cfg(feature = "openapi")]

use crate::auth::{LoginRequest, LoginResponse};
use crate::handlers::{
    CreateBookingResponse, DeleteResponse, FreeSlotsResponse, HealthResponse,
    SetAvailabilityRequest, SetAvailabilityResponse,
};
use crate::outbox::{FollowUpRecord, StepStatus};
use crate::validation::{BookingRequest, ProfessionalRef};
use consulta_common::models::{AvailabilityEntry, Booking, NewProfessional, Professional};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::list_bookings_handler,
        crate::handlers::create_booking_handler,
        crate::handlers::delete_booking_handler,
        crate::handlers::get_availability_handler,
        crate::handlers::set_availability_handler,
        crate::handlers::free_slots_handler,
        crate::handlers::list_professionals_handler,
        crate::handlers::create_professional_handler,
        crate::handlers::update_professional_handler,
        crate::handlers::delete_professional_handler,
        crate::handlers::login_handler,
        crate::handlers::list_follow_ups_handler,
        crate::handlers::retry_follow_up_handler,
        crate::handlers::health_handler,
    ),
    components(schemas(
        Booking,
        BookingRequest,
        ProfessionalRef,
        CreateBookingResponse,
        DeleteResponse,
        AvailabilityEntry,
        SetAvailabilityRequest,
        SetAvailabilityResponse,
        FreeSlotsResponse,
        Professional,
        NewProfessional,
        LoginRequest,
        LoginResponse,
        FollowUpRecord,
        StepStatus,
        HealthResponse,
    )),
    tags(
        (name = "Bookings", description = "Client bookings"),
        (name = "Availability", description = "Offered hours and free slots"),
        (name = "Professionals", description = "Professional administration"),
        (name = "Staff", description = "Staff login and follow-up board"),
        (name = "Health", description = "Service health")
    )
)]
pub struct BookingApiDoc;
