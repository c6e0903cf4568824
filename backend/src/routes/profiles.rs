// backend/src/routes/profiles.rs

use axum::{
    extract::State,
    Json,
};
use serde::Deserialize;
use sqlx::query_as;

use super::{limit, offset};
use crate::auth::Actor;
use crate::error::AppResult;
use crate::extract::ApiQuery;
use crate::models::{Profile, Role};
use crate::AppState;

#[derive(Deserialize)]
pub struct ListProfilesQ {
    pub role: Option<Role>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/profiles
pub async fn list_profiles(
    State(state): State<AppState>,
    _actor: Actor,
    ApiQuery(q): ApiQuery<ListProfilesQ>,
) -> AppResult<Json<Vec<Profile>>> {
    let rows = query_as::<_, Profile>(
        r#"
        SELECT id, full_name, employee_code, location, role
        FROM public.profiles
        WHERE ($1::user_role IS NULL OR role = $1)
        ORDER BY full_name
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(q.role)
    .bind(limit(q.limit))
    .bind(offset(q.offset))
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(rows))
}
