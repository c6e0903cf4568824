// backend/src/routes/assignments.rs

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::{query, query_as, query_scalar};
use uuid::Uuid;

use crate::auth::Actor;
use crate::db::queries::load_assignment_details;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{AssignmentDetail, BranchAssignment, Role};
use crate::AppState;

#[derive(Deserialize)]
pub struct ListQ {
    pub user_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct AssignBody {
    pub user_id: Uuid,
    pub branch_id: Uuid,
}

/// GET /api/v1/assignments
pub async fn list_assignments(
    State(state): State<AppState>,
    _actor: Actor,
    ApiQuery(q): ApiQuery<ListQ>,
) -> AppResult<Json<Vec<AssignmentDetail>>> {
    let rows = load_assignment_details(&state.pool, q.user_id, q.branch_id).await?;
    Ok(Json(rows))
}

/// POST /api/v1/assignments
pub async fn assign_branch(
    State(state): State<AppState>,
    actor: Actor,
    ApiJson(b): ApiJson<AssignBody>,
) -> AppResult<(StatusCode, Json<BranchAssignment>)> {
    actor.require(actor.role.can_manage_assignments(), "assign branches")?;

    let role = query_scalar::<_, Role>(r#"SELECT role FROM public.profiles WHERE id = $1"#)
        .bind(b.user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile {} not found", b.user_id)))?;
    if role != Role::Bhr {
        return Err(AppError::BadRequest(
            "branches can only be assigned to representatives".into(),
        ));
    }

    let row = query_as::<_, BranchAssignment>(
        r#"
        INSERT INTO public.branch_assignments (user_id, branch_id)
        VALUES ($1, $2)
        RETURNING id, user_id, branch_id, assigned_date
        "#,
    )
    .bind(b.user_id)
    .bind(b.branch_id)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(assignment_id = %row.id, user_id = %row.user_id, branch_id = %row.branch_id, by = %actor.user_id, "branch assigned");
    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /api/v1/assignments/:id
pub async fn unassign_branch(
    State(state): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    actor.require(actor.role.can_manage_assignments(), "unassign branches")?;

    let res = query(r#"DELETE FROM public.branch_assignments WHERE id = $1"#)
        .bind(id)
        .execute(&state.pool)
        .await?;
    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("assignment {id} not found")));
    }

    tracing::info!(assignment_id = %id, by = %actor.user_id, "branch unassigned");
    Ok(Json(serde_json::json!({ "deleted": true })))
}
