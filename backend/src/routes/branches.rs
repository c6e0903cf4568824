// backend/src/routes/branches.rs

use axum::{
    extract::State,
    Json,
};
use serde::Deserialize;
use sqlx::query_as;
use uuid::Uuid;

use super::{limit, offset};
use crate::auth::Actor;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiPath, ApiQuery};
use crate::models::{Branch, BranchCategory};
use crate::AppState;

#[derive(Deserialize)]
pub struct ListBranchesQ {
    pub category: Option<BranchCategory>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/branches
pub async fn list_branches(
    State(state): State<AppState>,
    _actor: Actor,
    ApiQuery(q): ApiQuery<ListBranchesQ>,
) -> AppResult<Json<Vec<Branch>>> {
    let search = q
        .search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{s}%"));

    let rows = query_as::<_, Branch>(
        r#"
        SELECT id, name, location, category, branch_code
        FROM public.branches
        WHERE ($1::branch_category IS NULL OR category = $1)
          AND ($2::text IS NULL OR name ILIKE $2 OR branch_code ILIKE $2 OR location ILIKE $2)
        ORDER BY name
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(q.category)
    .bind(search)
    .bind(limit(q.limit))
    .bind(offset(q.offset))
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(rows))
}

/// GET /api/v1/branches/:id
pub async fn get_branch(
    State(state): State<AppState>,
    _actor: Actor,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<Branch>> {
    let row = query_as::<_, Branch>(
        r#"SELECT id, name, location, category, branch_code FROM public.branches WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("branch {id} not found")))?;
    Ok(Json(row))
}

/// GET /api/v1/branches/unassigned — branches no representative covers yet.
pub async fn list_unassigned_branches(
    State(state): State<AppState>,
    actor: Actor,
) -> AppResult<Json<Vec<Branch>>> {
    actor.require(actor.role.can_manage_assignments(), "manage branch assignments")?;

    let rows = query_as::<_, Branch>(
        r#"
        SELECT b.id, b.name, b.location, b.category, b.branch_code
        FROM public.branches b
        WHERE NOT EXISTS (
            SELECT 1 FROM public.branch_assignments a WHERE a.branch_id = b.id
        )
        ORDER BY b.name
        "#,
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(rows))
}

/// GET /api/v1/me/branches
pub async fn my_branches(
    State(state): State<AppState>,
    actor: Actor,
) -> AppResult<Json<Vec<Branch>>> {
    let rows = query_as::<_, Branch>(
        r#"
        SELECT b.id, b.name, b.location, b.category, b.branch_code
        FROM public.branches b
        JOIN public.branch_assignments a ON a.branch_id = b.id
        WHERE a.user_id = $1
        ORDER BY b.name
        "#,
    )
    .bind(actor.user_id)
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(rows))
}
