// backend/src/db/queries.rs
//
// Shared reads behind the analytics and export handlers.

use chrono::NaiveDate;
use sqlx::{query_as, Pool, Postgres};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{AssignmentDetail, Branch, BranchAssignment, BranchVisit, Profile};

/// Which visits a read covers.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisitScope {
    pub user_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub async fn fetch_visit(pool: &Pool<Postgres>, id: Uuid) -> AppResult<BranchVisit> {
    query_as::<_, BranchVisit>(r#"SELECT * FROM public.branch_visits WHERE id = $1"#)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("visit {id} not found")))
}

pub async fn load_visits(pool: &Pool<Postgres>, scope: VisitScope) -> AppResult<Vec<BranchVisit>> {
    let rows = query_as::<_, BranchVisit>(
        r#"
        SELECT * FROM public.branch_visits
        WHERE ($1::uuid IS NULL OR user_id = $1)
          AND ($2::date IS NULL OR visit_date >= $2)
          AND ($3::date IS NULL OR visit_date <= $3)
        ORDER BY visit_date, created_at
        "#,
    )
    .bind(scope.user_id)
    .bind(scope.from)
    .bind(scope.to)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn load_branches(pool: &Pool<Postgres>) -> AppResult<Vec<Branch>> {
    let rows = query_as::<_, Branch>(
        r#"SELECT id, name, location, category, branch_code FROM public.branches ORDER BY name"#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn load_profiles(pool: &Pool<Postgres>) -> AppResult<Vec<Profile>> {
    let rows = query_as::<_, Profile>(
        r#"SELECT id, full_name, employee_code, location, role FROM public.profiles ORDER BY full_name"#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn load_assignments(pool: &Pool<Postgres>) -> AppResult<Vec<BranchAssignment>> {
    let rows = query_as::<_, BranchAssignment>(
        r#"SELECT id, user_id, branch_id, assigned_date FROM public.branch_assignments"#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn load_assignment_details(
    pool: &Pool<Postgres>,
    user_id: Option<Uuid>,
    branch_id: Option<Uuid>,
) -> AppResult<Vec<AssignmentDetail>> {
    let rows = query_as::<_, AssignmentDetail>(
        r#"
        SELECT a.id, a.assigned_date,
               p.id AS user_id, p.full_name, p.employee_code,
               b.id AS branch_id, b.name AS branch_name, b.branch_code,
               b.category AS branch_category, b.location
        FROM public.branch_assignments a
        JOIN public.profiles p ON p.id = a.user_id
        JOIN public.branches b ON b.id = a.branch_id
        WHERE ($1::uuid IS NULL OR a.user_id = $1)
          AND ($2::uuid IS NULL OR a.branch_id = $2)
        ORDER BY p.full_name, b.name
        "#,
    )
    .bind(user_id)
    .bind(branch_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
