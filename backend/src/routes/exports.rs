// backend/src/routes/exports.rs

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::query_as;

use super::analytics::{performance_rows, MonthQ};
use super::today;
use crate::auth::Actor;
use crate::db::queries::load_assignment_details;
use crate::domain::export::{self, ExportError, ExportFile, EMPTY_EXPORT_NOTICE};
use crate::error::{AppError, AppResult};
use crate::extract::ApiQuery;
use crate::models::VisitExportRow;
use crate::AppState;

/// Either a downloadable file or a notice that there was nothing to write.
pub enum ExportResponse {
    File(ExportFile),
    Empty,
}

impl IntoResponse for ExportResponse {
    fn into_response(self) -> Response {
        match self {
            ExportResponse::File(file) => (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", file.filename),
                    ),
                ],
                file.body,
            )
                .into_response(),
            ExportResponse::Empty => Json(serde_json::json!({
                "exported": false,
                "notice": EMPTY_EXPORT_NOTICE,
            }))
            .into_response(),
        }
    }
}

fn finish(result: Result<ExportFile, ExportError>) -> AppResult<ExportResponse> {
    match result {
        Ok(file) => {
            tracing::info!(filename = %file.filename, bytes = file.body.len(), "export generated");
            Ok(ExportResponse::File(file))
        }
        Err(ExportError::Empty) => {
            tracing::info!("export skipped, no rows");
            Ok(ExportResponse::Empty)
        }
        Err(e) => Err(AppError::Internal(e.to_string())),
    }
}

/// GET /api/v1/exports/visits?year=&month=
pub async fn export_visits(
    State(state): State<AppState>,
    actor: Actor,
    ApiQuery(q): ApiQuery<MonthQ>,
) -> AppResult<ExportResponse> {
    actor.require(actor.role.can_export(), "export reports")?;
    let (year, month) = q.resolve(today(state.tz))?;
    let (from, to) = MonthQ::bounds(year, month);

    let rows = query_as::<_, VisitExportRow>(
        r#"
        SELECT v.visit_date, b.name AS branch_name, b.branch_code, v.branch_category,
               p.full_name AS representative, p.employee_code, v.status,
               v.hr_connect_session, v.total_employees_invited, v.total_participants,
               v.manning_percentage, v.attrition_percentage, v.non_vendor_percentage,
               v.er_percentage, v.cwt_cases, v.performance_level,
               v.leaders_aligned_with_code, v.employees_feel_safe, v.employees_feel_motivated,
               v.leaders_abusive_language, v.employees_comfort_escalation, v.inclusive_culture,
               v.feedback
        FROM public.branch_visits v
        JOIN public.branches b ON b.id = v.branch_id
        JOIN public.profiles p ON p.id = v.user_id
        WHERE v.status <> 'draft'
          AND v.visit_date >= $1 AND v.visit_date <= $2
        ORDER BY v.visit_date, b.name
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(&state.pool)
    .await?;

    finish(export::build(export::period_filename("branch_visits", year, month), &rows))
}

/// GET /api/v1/exports/assignments
pub async fn export_assignments(
    State(state): State<AppState>,
    actor: Actor,
) -> AppResult<ExportResponse> {
    actor.require(actor.role.can_export(), "export reports")?;
    let rows = load_assignment_details(&state.pool, None, None).await?;
    finish(export::build("branch_assignments.csv".into(), &rows))
}

/// GET /api/v1/exports/performance
pub async fn export_performance(
    State(state): State<AppState>,
    actor: Actor,
) -> AppResult<ExportResponse> {
    actor.require(actor.role.can_export(), "export reports")?;
    let rows = performance_rows(&state, &actor).await?;
    finish(export::build("bh_performance.csv".into(), &rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn empty_export_is_a_notice_not_an_error() {
        let resp = finish(Err(ExportError::Empty)).unwrap().into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(header::CONTENT_DISPOSITION).is_none());
    }

    #[test]
    fn file_export_is_an_attachment() {
        let file = ExportFile { filename: "x_march_2026.csv".into(), body: "a\n1".into() };
        let resp = finish(Ok(file)).unwrap().into_response();
        assert_eq!(
            resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"x_march_2026.csv\""
        );
    }
}
