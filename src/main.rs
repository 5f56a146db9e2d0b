use std::sync::{Arc, Mutex};

use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use acbook::config::AppConfig;
use acbook::db;
use acbook::handlers;
use acbook::services::mail::http::HttpMailProvider;
use acbook::services::mail::{MailProvider, NoopMailer};
use acbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let mail: Box<dyn MailProvider> = if config.mail_api_key.is_empty() {
        tracing::info!("MAIL_API_KEY not set, email notifications disabled");
        Box::new(NoopMailer)
    } else {
        tracing::info!("using HTTP mail provider (url: {})", config.mail_api_url);
        Box::new(HttpMailProvider::new(
            config.mail_api_url.clone(),
            config.mail_api_key.clone(),
            config.mail_from.clone(),
        ))
    };

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        mail,
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/bookings/available-dates",
            get(handlers::bookings::available_dates),
        )
        .route(
            "/bookings/check-date-availability",
            post(handlers::bookings::check_date_availability),
        )
        .route("/bookings/by-date", get(handlers::bookings::bookings_by_date))
        .route(
            "/bookings",
            get(handlers::bookings::list_bookings).post(handlers::bookings::create_booking),
        )
        .route("/bookings/:id", get(handlers::bookings::show_booking))
        .route(
            "/bookings/:id/status",
            patch(handlers::bookings::update_booking_status),
        )
        .route(
            "/bookings/:id/cancel",
            patch(handlers::bookings::cancel_booking),
        )
        .route(
            "/appointments",
            get(handlers::appointments::list_appointments),
        )
        .route(
            "/appointments/technicians",
            get(handlers::appointments::list_technicians),
        )
        .route(
            "/appointments/:id",
            delete(handlers::appointments::reject_appointment),
        )
        .route(
            "/appointments/:id/accept",
            post(handlers::appointments::accept_appointment),
        )
        .route(
            "/appointments/:id/complete",
            post(handlers::appointments::complete_appointment),
        )
        .route(
            "/appointments/:id/reschedule",
            post(handlers::appointments::reschedule_appointment),
        )
        .route(
            "/appointments/:id/assign-technicians",
            post(handlers::appointments::assign_technicians),
        )
        .route(
            "/revenues",
            get(handlers::revenue::revenue_history).post(handlers::revenue::store_revenue),
        )
        .route(
            "/revenues/statistics",
            get(handlers::revenue::statistics),
        )
        .route(
            "/revenues/service-summary",
            get(handlers::revenue::service_summary),
        )
        .route(
            "/revenues/summary",
            get(handlers::revenue::summary_by_date_range),
        )
        .route(
            "/revenues/:id",
            get(handlers::revenue::show_revenue)
                .put(handlers::revenue::update_revenue)
                .delete(handlers::revenue::delete_revenue),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
