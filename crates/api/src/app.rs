use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use domain::services::{ContentGenerator, PushService};
use persistence::EventStore;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, request_span};
use crate::routes::{
    answers, dispatch, events, health, notifications, participants, reports, slots,
};
use crate::services::access::PasswordRateLimiter;
use crate::services::MediaStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn EventStore>,
    pub generator: Arc<dyn ContentGenerator>,
    pub push: Arc<dyn PushService>,
    pub media: Arc<MediaStore>,
    pub password_limiter: Option<Arc<PasswordRateLimiter>>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn EventStore>,
        generator: Arc<dyn ContentGenerator>,
        push: Arc<dyn PushService>,
    ) -> Self {
        // Password limiter is disabled when password_attempts_per_minute is 0
        let password_limiter = PasswordRateLimiter::new(config.security.password_attempts_per_minute)
            .map(Arc::new);
        let media = Arc::new(MediaStore::new(
            config.media.dir.clone(),
            config.media.max_upload_bytes,
        ));

        Self {
            config: Arc::new(config),
            store,
            generator,
            push,
            media,
            password_limiter,
            http: reqwest::Client::new(),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Versioned API routes. Organizer operations are gated by the event
    // password inside the handlers, not by middleware.
    let api_routes = Router::new()
        // Events
        .route(
            "/api/v1/events",
            post(events::create_event).get(events::list_events),
        )
        .route("/api/v1/events/:code", get(events::get_event))
        .route("/api/v1/events/:code/publish", post(events::publish_event))
        .route("/api/v1/events/:code/slots", put(events::replace_slots))
        .route(
            "/api/v1/events/:code/reports/generate",
            post(reports::generate_event_reports),
        )
        .route("/api/v1/slots/:slot_id", get(slots::get_slot))
        // Participants and answers
        .route("/api/v1/join", post(participants::join))
        .route(
            "/api/v1/answers",
            post(answers::submit_answers).get(answers::list_answers),
        )
        // Reports
        .route("/api/v1/reports/generate", post(reports::generate_report))
        .route("/api/v1/reports/:participant_id", get(reports::get_report))
        .route(
            "/api/v1/reports/:participant_id/view",
            get(reports::view_report),
        )
        // Dispatch and notifications
        .route(
            "/api/v1/cron/dispatch",
            get(dispatch::run_dispatch).post(dispatch::run_dispatch),
        )
        .route(
            "/api/v1/notifications/send",
            post(notifications::send_notification),
        )
        .route(
            "/api/v1/notifications",
            get(notifications::list_notifications),
        )
        // route_layer so MatchedPath is available for metric labels
        .route_layer(middleware::from_fn(metrics_middleware));

    // Public routes (health checks, metrics, uploaded media)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::ready))
        .route("/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .nest_service("/media", ServeDir::new(state.media.dir()));

    Router::new()
        .merge(api_routes)
        .merge(public_routes)
        .with_state(state)
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(RequestBodyLimitLayer::new(config.server.max_body_size))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
}
