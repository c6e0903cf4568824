// backend/src/lib.rs

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use sqlx::{Pool, Postgres};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod extract;
pub mod models;
pub mod routes;

use chrono_tz::Tz;
use config::FeedbackLimits;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool<Postgres>,
    pub feedback: FeedbackLimits,
    /// Zone whose calendar decides "today".
    pub tz: Tz,
}

fn cors_layer(allow_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match allow_origin {
        "*" => cors.allow_origin(Any),
        origin => match HeaderValue::from_str(origin) {
            Ok(v) => cors.allow_origin(v),
            Err(_) => {
                tracing::warn!(origin, "invalid CORS_ALLOW_ORIGIN, falling back to any origin");
                cors.allow_origin(Any)
            }
        },
    }
}

pub fn build_router(state: AppState, cors_allow_origin: &str) -> Router {
    Router::new()
        // health
        .route("/health", get(routes::health::health))
        // branches
        .route("/api/v1/branches", get(routes::branches::list_branches))
        .route(
            "/api/v1/branches/unassigned",
            get(routes::branches::list_unassigned_branches),
        )
        .route("/api/v1/branches/:id", get(routes::branches::get_branch))
        .route("/api/v1/me/branches", get(routes::branches::my_branches))
        // profiles
        .route("/api/v1/profiles", get(routes::profiles::list_profiles))
        // assignments
        .route(
            "/api/v1/assignments",
            post(routes::assignments::assign_branch).get(routes::assignments::list_assignments),
        )
        .route(
            "/api/v1/assignments/:id",
            axum::routing::delete(routes::assignments::unassign_branch),
        )
        // visits
        .route(
            "/api/v1/visits",
            post(routes::visits::create_visit).get(routes::visits::list_visits),
        )
        .route(
            "/api/v1/visits/:id",
            get(routes::visits::get_visit)
                .patch(routes::visits::save_visit)
                .delete(routes::visits::delete_visit),
        )
        .route("/api/v1/visits/:id/submit", post(routes::visits::submit_visit))
        .route("/api/v1/visits/:id/approve", post(routes::visits::approve_visit))
        .route("/api/v1/visits/:id/reject", post(routes::visits::reject_visit))
        // analytics
        .route("/api/v1/analytics/summary", get(routes::analytics::summary))
        .route(
            "/api/v1/analytics/category-breakdown",
            get(routes::analytics::category_breakdown),
        )
        .route(
            "/api/v1/analytics/category-month",
            get(routes::analytics::category_month),
        )
        .route("/api/v1/analytics/trend", get(routes::analytics::trend))
        .route("/api/v1/analytics/qualitative", get(routes::analytics::qualitative))
        .route(
            "/api/v1/analytics/top-performers",
            get(routes::analytics::top_performers),
        )
        .route("/api/v1/analytics/performance", get(routes::analytics::performance))
        // exports
        .route("/api/v1/exports/visits", get(routes::exports::export_visits))
        .route(
            "/api/v1/exports/assignments",
            get(routes::exports::export_assignments),
        )
        .route(
            "/api/v1/exports/performance",
            get(routes::exports::export_performance),
        )
        // state & middleware
        .with_state(state)
        .layer(cors_layer(cors_allow_origin))
        .layer(TraceLayer::new_for_http())
}
