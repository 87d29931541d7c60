use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use shared::jwt::JwtConfig;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_user_auth,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    appointments, attendance, auth, goals, health, notes, patients, payments, professionals,
    reports, seo, subscription, todos, webhooks,
};
use crate::services::{CookieHelper, DisabledPaymentProvider, PaymentProvider, StripeClient};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub cookies: CookieHelper,
    pub payments: Arc<dyn PaymentProvider>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    /// Builds shared state. Stripe is used when enabled, otherwise billing
    /// calls answer 503.
    pub fn new(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        let payments: Arc<dyn PaymentProvider> = if config.stripe.enabled {
            Arc::new(StripeClient::new(&config.stripe)?)
        } else {
            tracing::warn!("Stripe is disabled; billing endpoints will return 503");
            Arc::new(DisabledPaymentProvider)
        };
        Self::with_payment_provider(config, pool, payments)
    }

    pub fn with_payment_provider(
        config: Config,
        pool: PgPool,
        payments: Arc<dyn PaymentProvider>,
    ) -> anyhow::Result<Self> {
        let jwt = Arc::new(config.jwt.build()?);
        let cookies = CookieHelper::new(
            config.cookies.clone(),
            config.jwt.access_token_expiry_secs,
            config.jwt.refresh_token_expiry_secs,
        );
        let rate_limiter =
            RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new);

        Ok(Self {
            pool,
            config: Arc::new(config),
            jwt,
            cookies,
            payments,
            rate_limiter,
        })
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<_> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    // Cookie sessions need credentials, which rule out wildcard headers.
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderName::from_static("x-request-id"),
        ])
        .allow_credentials(true)
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Tenant routes. Auth runs first and stores the caller for the limiter.
    let tenant_routes = Router::new()
        .route("/api/v1/auth/me", get(auth::me))
        .route(
            "/api/v1/patients",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            "/api/v1/patients/:id",
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route(
            "/api/v1/professionals",
            get(professionals::list_professionals).post(professionals::create_professional),
        )
        .route(
            "/api/v1/professionals/:id",
            get(professionals::get_professional)
                .put(professionals::update_professional)
                .delete(professionals::delete_professional),
        )
        .route(
            "/api/v1/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/api/v1/appointments/:id",
            get(appointments::get_appointment)
                .put(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
        .route(
            "/api/v1/appointments/:id/status",
            patch(appointments::update_appointment_status),
        )
        .route(
            "/api/v1/attendance",
            get(attendance::list_attendance).put(attendance::upsert_attendance),
        )
        .route(
            "/api/v1/attendance/:id",
            get(attendance::get_attendance).delete(attendance::delete_attendance),
        )
        .route(
            "/api/v1/payments",
            get(payments::list_payments).post(payments::create_payment),
        )
        .route(
            "/api/v1/payments/:id",
            get(payments::get_payment)
                .put(payments::update_payment)
                .delete(payments::delete_payment),
        )
        .route("/api/v1/payments/:id/pay", post(payments::mark_paid))
        .route(
            "/api/v1/goals",
            get(goals::list_goals).post(goals::create_goal),
        )
        .route(
            "/api/v1/goals/:id",
            get(goals::get_goal)
                .put(goals::update_goal)
                .delete(goals::delete_goal),
        )
        .route(
            "/api/v1/todos",
            get(todos::list_todos).post(todos::create_todo),
        )
        .route(
            "/api/v1/todos/:id",
            put(todos::update_todo).delete(todos::delete_todo),
        )
        .route("/api/v1/todos/:id/toggle", patch(todos::toggle_todo))
        .route(
            "/api/v1/notes",
            get(notes::list_notes).post(notes::create_note),
        )
        .route(
            "/api/v1/notes/:id",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route("/api/v1/subscription", get(subscription::get_subscription))
        .route("/api/v1/subscription/usage", get(subscription::get_usage))
        .route(
            "/api/v1/subscription/checkout",
            post(subscription::create_checkout),
        )
        .route(
            "/api/v1/subscription/checkout/confirm",
            get(subscription::confirm_checkout),
        )
        .route(
            "/api/v1/subscription/cancel",
            post(subscription::cancel_subscription),
        )
        .route("/api/v1/reports/summary", get(reports::get_summary))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Session bootstrap routes authenticate by credentials or refresh token.
    let auth_routes = Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout));

    // Authenticated by signature, not session.
    let webhook_routes =
        Router::new().route("/api/webhooks/stripe", post(webhooks::stripe_webhook));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/robots.txt", get(seo::robots_txt))
        .route("/sitemap.xml", get(seo::sitemap_xml));

    Router::new()
        .merge(public_routes)
        .merge(webhook_routes)
        .merge(auth_routes)
        .merge(tenant_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config))
        .with_state(state)
}
