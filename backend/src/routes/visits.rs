// backend/src/routes/visits.rs

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{query, query_as, query_scalar};
use uuid::Uuid;

use super::{limit, offset, today};
use crate::auth::Actor;
use crate::db::queries::fetch_visit;
use crate::domain::lifecycle::{self, Action, Outcome};
use crate::domain::validation::{self, VisitInput};
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{BranchCategory, BranchVisit, Role, VisitDetail, VisitStatus};
use crate::AppState;

#[derive(Deserialize)]
pub struct ListVisitsQ {
    pub status: Option<VisitStatus>,
    pub branch_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/visits
pub async fn create_visit(
    State(state): State<AppState>,
    actor: Actor,
    ApiJson(input): ApiJson<VisitInput>,
) -> AppResult<(StatusCode, Json<VisitDetail>)> {
    let status = lifecycle::authorize_create(&actor)?;
    let new = validation::validate_new(&input, today(state.tz), &state.feedback)?;

    // The visit keeps the category the branch had on the day it was reported.
    let category = query_scalar::<_, BranchCategory>(
        r#"
        SELECT b.category
        FROM public.branches b
        JOIN public.branch_assignments a ON a.branch_id = b.id AND a.user_id = $2
        WHERE b.id = $1
        "#,
    )
    .bind(new.branch_id)
    .bind(actor.user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| {
        AppError::Forbidden(format!("branch {} is not assigned to you", new.branch_id))
    })?;

    let f = new.fields;
    let row = query_as::<_, BranchVisit>(
        r#"
        INSERT INTO public.branch_visits (
            branch_id, user_id, visit_date, status, branch_category, hr_connect_session,
            total_employees_invited, total_participants,
            manning_percentage, attrition_percentage, non_vendor_percentage, er_percentage,
            cwt_cases, new_employees_total, new_employees_covered,
            star_employees_total, star_employees_covered, performance_level,
            leaders_aligned_with_code, employees_feel_safe, employees_feel_motivated,
            leaders_abusive_language, employees_comfort_escalation, inclusive_culture,
            feedback
        )
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19,$20,$21,$22,$23,$24,$25)
        RETURNING *
        "#,
    )
    .bind(new.branch_id)
    .bind(actor.user_id)
    .bind(new.visit_date)
    .bind(status)
    .bind(category)
    .bind(f.hr_connect_session.unwrap_or(false))
    .bind(f.total_employees_invited)
    .bind(f.total_participants)
    .bind(f.manning_percentage)
    .bind(f.attrition_percentage)
    .bind(f.non_vendor_percentage)
    .bind(f.er_percentage)
    .bind(f.cwt_cases)
    .bind(f.new_employees_total)
    .bind(f.new_employees_covered)
    .bind(f.star_employees_total)
    .bind(f.star_employees_covered)
    .bind(f.performance_level)
    .bind(f.leaders_aligned_with_code)
    .bind(f.employees_feel_safe)
    .bind(f.employees_feel_motivated)
    .bind(f.leaders_abusive_language)
    .bind(f.employees_comfort_escalation)
    .bind(f.inclusive_culture)
    .bind(f.feedback)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(visit_id = %row.id, branch_id = %row.branch_id, user_id = %actor.user_id, "visit draft created");
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// GET /api/v1/visits
pub async fn list_visits(
    State(state): State<AppState>,
    actor: Actor,
    ApiQuery(q): ApiQuery<ListVisitsQ>,
) -> AppResult<Json<Vec<VisitDetail>>> {
    // representatives only ever see their own reports
    let user_id = match actor.role {
        Role::Bhr => Some(actor.user_id),
        _ => q.user_id,
    };

    let rows = query_as::<_, BranchVisit>(
        r#"
        SELECT * FROM public.branch_visits
        WHERE ($1::visit_status IS NULL OR status = $1)
          AND ($2::uuid IS NULL OR branch_id = $2)
          AND ($3::uuid IS NULL OR user_id = $3)
          AND ($4::date IS NULL OR visit_date >= $4)
          AND ($5::date IS NULL OR visit_date <= $5)
        ORDER BY visit_date DESC, created_at DESC
        LIMIT $6 OFFSET $7
        "#,
    )
    .bind(q.status)
    .bind(q.branch_id)
    .bind(user_id)
    .bind(q.from)
    .bind(q.to)
    .bind(limit(q.limit))
    .bind(offset(q.offset))
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(rows.into_iter().map(VisitDetail::from).collect()))
}

/// GET /api/v1/visits/:id
pub async fn get_visit(
    State(state): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<VisitDetail>> {
    let visit = fetch_visit(&state.pool, id).await?;
    actor.require(lifecycle::can_read(&actor, visit.user_id), "read this visit")?;
    Ok(Json(visit.into()))
}

/// PATCH /api/v1/visits/:id — save a draft; only provided fields change.
pub async fn save_visit(
    State(state): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<VisitInput>,
) -> AppResult<Json<VisitDetail>> {
    let visit = fetch_visit(&state.pool, id).await?;
    lifecycle::authorize(&actor, visit.user_id, visit.status, Action::Save)?;
    let (visit_date, f) = validation::validate_patch(&input, today(state.tz), &state.feedback)?;

    let row = query_as::<_, BranchVisit>(
        r#"
        UPDATE public.branch_visits SET
          visit_date                   = COALESCE($2, visit_date),
          hr_connect_session           = COALESCE($3, hr_connect_session),
          total_employees_invited      = COALESCE($4, total_employees_invited),
          total_participants           = COALESCE($5, total_participants),
          manning_percentage           = COALESCE($6, manning_percentage),
          attrition_percentage         = COALESCE($7, attrition_percentage),
          non_vendor_percentage        = COALESCE($8, non_vendor_percentage),
          er_percentage                = COALESCE($9, er_percentage),
          cwt_cases                    = COALESCE($10, cwt_cases),
          new_employees_total          = COALESCE($11, new_employees_total),
          new_employees_covered        = COALESCE($12, new_employees_covered),
          star_employees_total         = COALESCE($13, star_employees_total),
          star_employees_covered       = COALESCE($14, star_employees_covered),
          performance_level            = COALESCE($15, performance_level),
          leaders_aligned_with_code    = COALESCE($16, leaders_aligned_with_code),
          employees_feel_safe          = COALESCE($17, employees_feel_safe),
          employees_feel_motivated     = COALESCE($18, employees_feel_motivated),
          leaders_abusive_language     = COALESCE($19, leaders_abusive_language),
          employees_comfort_escalation = COALESCE($20, employees_comfort_escalation),
          inclusive_culture            = COALESCE($21, inclusive_culture),
          feedback                     = COALESCE($22, feedback),
          updated_at = now()
        WHERE id = $1 AND status = 'draft'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(visit_date)
    .bind(f.hr_connect_session)
    .bind(f.total_employees_invited)
    .bind(f.total_participants)
    .bind(f.manning_percentage)
    .bind(f.attrition_percentage)
    .bind(f.non_vendor_percentage)
    .bind(f.er_percentage)
    .bind(f.cwt_cases)
    .bind(f.new_employees_total)
    .bind(f.new_employees_covered)
    .bind(f.star_employees_total)
    .bind(f.star_employees_covered)
    .bind(f.performance_level)
    .bind(f.leaders_aligned_with_code)
    .bind(f.employees_feel_safe)
    .bind(f.employees_feel_motivated)
    .bind(f.leaders_abusive_language)
    .bind(f.employees_comfort_escalation)
    .bind(f.inclusive_culture)
    .bind(f.feedback)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::Conflict(format!("visit {id} is no longer a draft")))?;

    Ok(Json(row.into()))
}

/// Applies a status transition after the lifecycle check; the UPDATE only
/// lands if nobody else moved the visit in between.
async fn transition(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
    action: Action,
) -> AppResult<BranchVisit> {
    let visit = fetch_visit(&state.pool, id).await?;
    let next = match lifecycle::authorize(actor, visit.user_id, visit.status, action)? {
        Outcome::Status(next) => next,
        Outcome::Removed => {
            return Err(AppError::Internal(format!("{action} does not produce a status")))
        }
    };
    if action == Action::Submit {
        validation::validate_for_submit(&visit, today(state.tz), &state.feedback)?;
    }

    let row = query_as::<_, BranchVisit>(
        r#"
        UPDATE public.branch_visits
           SET status = $2, updated_at = now()
         WHERE id = $1 AND status = $3
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(next)
    .bind(visit.status)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::Conflict(format!("visit {id} changed while processing {action}")))?;

    tracing::info!(
        visit_id = %id,
        actor = %actor.user_id,
        from = %visit.status,
        to = %row.status,
        "visit status changed"
    );
    Ok(row)
}

/// POST /api/v1/visits/:id/submit
pub async fn submit_visit(
    State(state): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<VisitDetail>> {
    Ok(Json(transition(&state, &actor, id, Action::Submit).await?.into()))
}

/// POST /api/v1/visits/:id/approve
pub async fn approve_visit(
    State(state): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<VisitDetail>> {
    Ok(Json(transition(&state, &actor, id, Action::Approve).await?.into()))
}

/// POST /api/v1/visits/:id/reject
pub async fn reject_visit(
    State(state): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<VisitDetail>> {
    Ok(Json(transition(&state, &actor, id, Action::Reject).await?.into()))
}

/// DELETE /api/v1/visits/:id — drafts only.
pub async fn delete_visit(
    State(state): State<AppState>,
    actor: Actor,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let visit = fetch_visit(&state.pool, id).await?;
    lifecycle::authorize(&actor, visit.user_id, visit.status, Action::Delete)?;

    let res = query(r#"DELETE FROM public.branch_visits WHERE id = $1 AND status = 'draft'"#)
        .bind(id)
        .execute(&state.pool)
        .await?;
    if res.rows_affected() == 0 {
        return Err(AppError::Conflict(format!("visit {id} is no longer a draft")));
    }

    tracing::info!(visit_id = %id, actor = %actor.user_id, "draft visit deleted");
    Ok(Json(serde_json::json!({ "deleted": true })))
}
