// --- File: crates/consulta_booking/src/routes.rs ---

use crate::handlers::{
    create_booking_handler, create_professional_handler, delete_booking_handler,
    delete_professional_handler, free_slots_handler, get_availability_handler, health_handler,
    list_bookings_handler, list_follow_ups_handler, list_professionals_handler, login_handler,
    retry_follow_up_handler, set_availability_handler, update_professional_handler,
};
use crate::state::BookingState;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

/// All booking routes, meant to be nested under `/api`.
pub fn routes(state: BookingState) -> Router {
    Router::new()
        .route(
            "/bookings",
            get(list_bookings_handler).post(create_booking_handler),
        )
        .route("/bookings/{id}", axum::routing::delete(delete_booking_handler))
        .route(
            "/availability",
            get(get_availability_handler).post(set_availability_handler),
        )
        .route("/availability/free", get(free_slots_handler))
        .route(
            "/professionals",
            get(list_professionals_handler).post(create_professional_handler),
        )
        .route(
            "/professionals/{id}",
            put(update_professional_handler).delete(delete_professional_handler),
        )
        .route("/login", post(login_handler))
        .route("/admin/follow-ups", get(list_follow_ups_handler))
        .route("/admin/follow-ups/{id}/retry", post(retry_follow_up_handler))
        .route("/health", get(health_handler))
        .with_state(Arc::new(state))
}
