// File: services/consulta_backend/src/main.rs
mod service_factory;

use axum::{routing::get, Router};
use consulta_booking::seed::seed_professionals;
use consulta_booking::{routes as booking_routes, BookingState, FollowUpQueue, FollowUpWorker};
use consulta_common::services::ServiceFactory;
use consulta_config::load_config;
use consulta_db::{init_schema, DbClient, SqlBookingRepository, SqlProfessionalRepository};
use service_factory::ConsultaServiceFactory;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// How long pending follow-ups may run after the server stopped accepting requests.
const FOLLOW_UP_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Arc::new(load_config()?);
    let _log_guard = consulta_common::init_from_config(&config.logging);

    // 1. Storage
    let db_client = DbClient::new(&config).await?;
    init_schema(&db_client).await?;

    let professionals = SqlProfessionalRepository::new(db_client.clone());
    let bookings = SqlBookingRepository::new(db_client.clone());

    let seeded = seed_professionals(&professionals, &config.booking).await?;
    if seeded > 0 {
        info!("Inserted {} professionals from configuration", seeded);
    }

    // 2. Providers and the follow-up worker
    let services = ConsultaServiceFactory::new(config.clone()).await;
    let (follow_ups, receiver) = FollowUpQueue::channel(config.booking.follow_up_queue_capacity);
    let worker = FollowUpWorker::new(
        receiver,
        bookings,
        follow_ups.log().clone(),
        config.booking.time_zone.clone(),
    )
    .with_meeting_service(services.meeting_service())
    .with_notification_service(services.notification_service())
    .with_retention(chrono::Duration::minutes(config.booking.follow_up_retention_minutes))
    .spawn();

    // 3. Routes
    let booking_state = BookingState::new(config.clone(), db_client, follow_ups)?;
    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the Consulta API!" }))
        .merge(booking_routes(booking_state));

    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use consulta_booking::doc::BookingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Consulta API",
                version = "0.1.0",
                description = "Booking API of the Consulta clinic"
            ),
            components(),
            tags( (name = "Consulta", description = "Core service endpoints")),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(BookingApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    // Booking front-end
    if let Some(static_dir) = config.server.static_dir.as_deref() {
        if Path::new(static_dir).is_dir() {
            info!("Serving static files from {}", static_dir);
            app = app.fallback_service(ServeDir::new(static_dir));
        } else {
            warn!("Static directory {} does not exist, not serving it", static_dir);
        }
    }

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // 4. Bind and serve
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router and every queue handle are gone now, so the worker stops
    // once the jobs already queued are processed.
    match tokio::time::timeout(FOLLOW_UP_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => info!("Follow-up worker finished"),
        Ok(Err(e)) => warn!("Follow-up worker panicked: {}", e),
        Err(_) => warn!("Follow-up worker still busy after shutdown, abandoning pending jobs"),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
