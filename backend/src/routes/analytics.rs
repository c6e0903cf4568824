// backend/src/routes/analytics.rs

use axum::{
    extract::State,
    Json,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::today;
use crate::auth::Actor;
use crate::db::queries::{self, VisitScope};
use crate::domain::aggregation::{
    self, CategoryCount, CategoryMonthStat, DashboardSummary, HeatmapFilter, HeatmapRow,
    PerformanceRow, Performer, Period, TrendPoint,
};
use crate::domain::view_prefs::{Series, ViewPrefs};
use crate::error::{AppError, AppResult};
use crate::extract::ApiQuery;
use crate::models::{BranchVisit, Role};
use crate::AppState;

/// Representatives get their own numbers; every other role sees everyone.
fn scope_for(actor: &Actor) -> VisitScope {
    VisitScope {
        user_id: (actor.role == Role::Bhr).then_some(actor.user_id),
        ..VisitScope::default()
    }
}

#[derive(Deserialize)]
pub struct MonthQ {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl MonthQ {
    /// Defaults to the current month; rejects months outside 1..=12.
    pub fn resolve(&self, today: NaiveDate) -> AppResult<(i32, u32)> {
        let year = self.year.unwrap_or(today.year());
        let month = self.month.unwrap_or(today.month());
        match NaiveDate::from_ymd_opt(year, month, 1) {
            Some(first) => Ok((first.year(), first.month())),
            None => Err(AppError::BadRequest(format!("invalid month {year}-{month}"))),
        }
    }

    pub fn bounds(year: i32, month: u32) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let first = NaiveDate::from_ymd_opt(year, month, 1);
        let last = first
            .and_then(|d| d.checked_add_months(chrono::Months::new(1)))
            .and_then(|d| d.pred_opt());
        (first, last)
    }
}

/// GET /api/v1/analytics/summary
///
/// Representatives are measured against the branches assigned to them.
pub async fn summary(
    State(state): State<AppState>,
    actor: Actor,
) -> AppResult<Json<DashboardSummary>> {
    let visits = queries::load_visits(&state.pool, scope_for(&actor)).await?;
    let mut branches = queries::load_branches(&state.pool).await?;
    if actor.role == Role::Bhr {
        let assigned: HashSet<Uuid> = queries::load_assignments(&state.pool)
            .await?
            .into_iter()
            .filter(|a| a.user_id == actor.user_id)
            .map(|a| a.branch_id)
            .collect();
        branches.retain(|b| assigned.contains(&b.id));
    }
    Ok(Json(aggregation::dashboard_summary(&visits, &branches)))
}

/// GET /api/v1/analytics/category-breakdown
pub async fn category_breakdown(
    State(state): State<AppState>,
    _actor: Actor,
) -> AppResult<Json<Vec<CategoryCount>>> {
    let branches = queries::load_branches(&state.pool).await?;
    Ok(Json(aggregation::category_breakdown(&branches)))
}

/// GET /api/v1/analytics/category-month?year=&month=
pub async fn category_month(
    State(state): State<AppState>,
    actor: Actor,
    ApiQuery(q): ApiQuery<MonthQ>,
) -> AppResult<Json<Vec<CategoryMonthStat>>> {
    let (year, month) = q.resolve(today(state.tz))?;
    let (from, to) = MonthQ::bounds(year, month);

    let visits =
        queries::load_visits(&state.pool, VisitScope { from, to, ..scope_for(&actor) }).await?;
    let branches = queries::load_branches(&state.pool).await?;
    Ok(Json(aggregation::category_month_stats(&visits, &branches, year, month)))
}

#[derive(Deserialize)]
pub struct TrendQ {
    pub period: Option<String>,
    pub hide: Option<String>,
}

#[derive(Serialize)]
pub struct TrendResp {
    pub period: Period,
    pub series: Vec<Series>,
    pub points: Vec<TrendPoint>,
}

/// GET /api/v1/analytics/trend?period=lastQuarter&hide=er,non_vendor
pub async fn trend(
    State(state): State<AppState>,
    actor: Actor,
    ApiQuery(q): ApiQuery<TrendQ>,
) -> AppResult<Json<TrendResp>> {
    let period: Period = match q.period.as_deref() {
        None | Some("") => Period::LastSixMonths,
        Some(raw) => raw.parse().map_err(AppError::BadRequest)?,
    };
    let prefs = ViewPrefs::from_hidden(q.hide.as_deref().unwrap_or(""))
        .map_err(AppError::BadRequest)?;

    let today = today(state.tz);
    let scope = VisitScope { from: Some(period.start(today)), to: Some(today), ..scope_for(&actor) };
    let visits = queries::load_visits(&state.pool, scope).await?;

    let mut points = aggregation::period_trend(&visits, period, today);
    for p in &mut points {
        p.values.retain(|series, _| prefs.is_visible(*series));
    }
    let series = Series::ALL.into_iter().filter(|s| prefs.is_visible(*s)).collect();
    Ok(Json(TrendResp { period, series, points }))
}

/// GET /api/v1/analytics/qualitative?from=&to=&category=
pub async fn qualitative(
    State(state): State<AppState>,
    actor: Actor,
    ApiQuery(filter): ApiQuery<HeatmapFilter>,
) -> AppResult<Json<Vec<HeatmapRow>>> {
    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if from > to {
            return Err(AppError::BadRequest(format!("from {from} is after to {to}")));
        }
    }
    let scope = VisitScope { from: filter.from, to: filter.to, ..scope_for(&actor) };
    let visits = queries::load_visits(&state.pool, scope).await?;
    Ok(Json(aggregation::qualitative_heatmap(&visits, &filter)))
}

#[derive(Deserialize)]
pub struct TopQ {
    pub limit: Option<usize>,
}

/// GET /api/v1/analytics/top-performers?limit=5
pub async fn top_performers(
    State(state): State<AppState>,
    _actor: Actor,
    ApiQuery(q): ApiQuery<TopQ>,
) -> AppResult<Json<Vec<Performer>>> {
    let limit = q.limit.unwrap_or(5).clamp(1, 50);
    let visits: Vec<BranchVisit> = queries::load_visits(&state.pool, VisitScope::default())
        .await?
        .into_iter()
        .filter(|v| v.status.is_reported())
        .collect();
    let profiles = queries::load_profiles(&state.pool).await?;
    Ok(Json(aggregation::top_performers(&visits, &profiles, limit)))
}

/// GET /api/v1/analytics/performance
pub async fn performance(
    State(state): State<AppState>,
    actor: Actor,
) -> AppResult<Json<Vec<PerformanceRow>>> {
    Ok(Json(performance_rows(&state, &actor).await?))
}

pub(crate) async fn performance_rows(state: &AppState, actor: &Actor) -> AppResult<Vec<PerformanceRow>> {
    let mut profiles = queries::load_profiles(&state.pool).await?;
    if actor.role == Role::Bhr {
        profiles.retain(|p| p.id == actor.user_id);
    }
    let assignments = queries::load_assignments(&state.pool).await?;
    let visits = queries::load_visits(&state.pool, scope_for(actor)).await?;
    Ok(aggregation::performance_report(&profiles, &assignments, &visits))
}
