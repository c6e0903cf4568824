// backend/tests/api_routes.rs
//
// Router-level checks for every path that answers before touching the database.
// The pool is lazy and never connects.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use branchvisit_api::{build_router, config::FeedbackLimits, AppState};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

fn app() -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://postgres@127.0.0.1:1/branchvisit_unused")
        .expect("lazy pool");
    build_router(
        AppState { pool, feedback: FeedbackLimits::default(), tz: chrono_tz::UTC },
        "*",
    )
}

fn get(uri: &str, role: Option<&str>) -> Request<Body> {
    let mut req = Request::builder().method("GET").uri(uri);
    if let Some(role) = role {
        req = req
            .header("x-user-id", Uuid::new_v4().to_string())
            .header("x-user-role", role);
    }
    req.body(Body::empty()).expect("request")
}

fn post_json(uri: &str, role: Option<&str>, body: Value) -> Request<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(role) = role {
        req = req
            .header("x-user-id", Uuid::new_v4().to_string())
            .header("x-user-role", role);
    }
    req.body(Body::from(body.to_string())).expect("request")
}

async fn send(req: Request<Body>) -> (StatusCode, Value) {
    let resp = app().oneshot(req).await.expect("response");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = send(get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_identity_is_unauthenticated() {
    let (status, body) = send(post_json("/api/v1/visits", None, json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("x-user-id"));
}

#[tokio::test]
async fn malformed_identity_is_unauthenticated() {
    let req = Request::builder()
        .uri("/api/v1/analytics/summary")
        .header("x-user-id", "not-a-uuid")
        .header("x-user-role", "zh")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(get("/api/v1/analytics/summary", Some("superuser"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn only_representatives_create_visits() {
    let body = json!({ "branch_id": Uuid::new_v4(), "visit_date": "2024-01-05" });
    let (status, _) = send(post_json("/api/v1/visits", Some("zh"), body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invalid_visit_is_rejected_field_by_field() {
    let body = json!({
        "branch_id": Uuid::new_v4(),
        "visit_date": "2999-01-01",
        "manning_percentage": 120,
        "cwt_cases": -1,
        "employees_feel_safe": "maybe",
        "inclusive_culture": true,
    });
    let (status, body) = send(post_json("/api/v1/visits", Some("bhr"), body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation failed");

    let fields: Vec<(String, String)> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| {
            (
                f["field"].as_str().unwrap().to_string(),
                f["kind"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    let has = |field: &str, kind: &str| fields.iter().any(|(f, k)| f == field && k == kind);
    assert!(has("visit_date", "future_date"));
    assert!(has("manning_percentage", "range_error"));
    assert!(has("cwt_cases", "range_error"));
    assert!(has("employees_feel_safe", "invalid_enum_error"));
    assert_eq!(fields.len(), 4);
}

#[tokio::test]
async fn missing_branch_is_required() {
    let body = json!({ "visit_date": "2024-01-05" });
    let (status, body) = send(post_json("/api/v1/visits", Some("bhr"), body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"][0]["field"], "branch_id");
    assert_eq!(body["fields"][0]["kind"], "required");
}

#[tokio::test]
async fn wrongly_typed_values_are_field_errors() {
    for (field, value) in [
        ("manning_percentage", json!("abc")),
        ("visit_date", json!("2024-02-30")),
        ("cwt_cases", json!(1.5)),
    ] {
        let mut body = json!({ "branch_id": Uuid::new_v4(), "visit_date": "2024-01-05" });
        body[field] = value;
        let (status, body) = send(post_json("/api/v1/visits", Some("bhr"), body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{field}");
        assert_eq!(body["error"], "validation failed", "{field}");
        assert_eq!(body["fields"][0]["field"], field);
        assert_eq!(body["fields"][0]["kind"], "invalid_type");
    }
}

#[tokio::test]
async fn unparseable_body_is_a_json_bad_request() {
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/visits")
        .header("content-type", "application/json")
        .header("x-user-id", Uuid::new_v4().to_string())
        .header("x-user-role", "bhr")
        .body(Body::from("{\"branch_id\": "))
        .unwrap();
    let (status, body) = send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn malformed_query_and_path_answer_with_json() {
    let (status, body) =
        send(get("/api/v1/analytics/category-month?month=march", Some("zh"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("query string"));

    let (status, body) = send(get("/api/v1/visits/not-a-uuid", Some("zh"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unknown_trend_period_is_bad_request() {
    let (status, body) =
        send(get("/api/v1/analytics/trend?period=lastDecade", Some("ch"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("lastDecade"));

    let (status, _) =
        send(get("/api/v1/analytics/trend?period=lastMonth&hide=headcount", Some("ch"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_month_is_bad_request() {
    let (status, _) =
        send(get("/api/v1/analytics/category-month?year=2026&month=13", Some("zh"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn inverted_heatmap_range_is_bad_request() {
    let (status, _) = send(get(
        "/api/v1/analytics/qualitative?from=2026-03-01&to=2026-02-01",
        Some("ch"),
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn representatives_cannot_export() {
    for path in [
        "/api/v1/exports/visits",
        "/api/v1/exports/assignments",
        "/api/v1/exports/performance",
    ] {
        let (status, _) = send(get(path, Some("bhr"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{path}");
    }
}

#[tokio::test]
async fn assignment_management_needs_a_zonal_head() {
    let body = json!({ "user_id": Uuid::new_v4(), "branch_id": Uuid::new_v4() });
    for role in ["bhr", "ch"] {
        let (status, _) = send(post_json("/api/v1/assignments", Some(role), body.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{role}");
    }

    let (status, _) = send(get("/api/v1/branches/unassigned", Some("ch"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/api/v1/assignments/{}", Uuid::new_v4()))
        .header("x-user-id", Uuid::new_v4().to_string())
        .header("x-user-role", "bhr")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
