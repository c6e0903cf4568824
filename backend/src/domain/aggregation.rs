// backend/src/domain/aggregation.rs
//
// Dashboard and report statistics over visits that are already in memory.
// Inputs are never mutated; empty inputs yield zero-valued output.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::view_prefs::Series;
use crate::models::{
    Answer, Branch, BranchAssignment, BranchCategory, BranchVisit, Profile, QualitativeField,
    Role, VisitStatus,
};

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Mean of the values present, 0 when there are none.
fn mean<I: IntoIterator<Item = Option<f64>>>(values: I) -> f64 {
    let (sum, n) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        round2(sum / n as f64)
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 / whole as f64 * 100.0)
    }
}

// ───────────────────────────────────────
// Category breakdown (live branch categories)
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: BranchCategory,
    pub count: usize,
}

pub fn category_breakdown(branches: &[Branch]) -> Vec<CategoryCount> {
    let mut counts: HashMap<BranchCategory, usize> = HashMap::new();
    for b in branches {
        *counts.entry(b.category).or_default() += 1;
    }
    BranchCategory::ALL
        .iter()
        .map(|c| CategoryCount { category: *c, count: counts.get(c).copied().unwrap_or(0) })
        .collect()
}

// ───────────────────────────────────────
// Category-month stats (snapshot categories)
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMonthStat {
    pub name: BranchCategory,
    pub visits: usize,
    pub avg_manning: f64,
    pub avg_attrition: f64,
    pub branch_count: usize,
}

/// Groups the month's reported visits by the category recorded on the visit,
/// while `branch_count` comes from the branches' current category.
pub fn category_month_stats(
    visits: &[BranchVisit],
    branches: &[Branch],
    year: i32,
    month: u32,
) -> Vec<CategoryMonthStat> {
    let live = category_breakdown(branches);
    let mut grouped: HashMap<BranchCategory, Vec<&BranchVisit>> = HashMap::new();
    for v in visits.iter().filter(|v| {
        v.status.is_reported() && v.visit_date.year() == year && v.visit_date.month() == month
    }) {
        grouped.entry(v.branch_category).or_default().push(v);
    }

    live.into_iter()
        .map(|CategoryCount { category, count }| {
            let in_cat = grouped.get(&category).map(Vec::as_slice).unwrap_or(&[]);
            CategoryMonthStat {
                name: category,
                visits: in_cat.len(),
                avg_manning: mean(in_cat.iter().map(|v| v.manning_percentage)),
                avg_attrition: mean(in_cat.iter().map(|v| v.attrition_percentage)),
                branch_count: count,
            }
        })
        .collect()
}

// ───────────────────────────────────────
// Period trend
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Period {
    LastWeek,
    LastMonth,
    LastQuarter,
    LastSixMonths,
    LastYear,
}

impl Period {
    pub fn start(self, today: NaiveDate) -> NaiveDate {
        let start = match self {
            Period::LastWeek => today.checked_sub_days(Days::new(7)),
            Period::LastMonth => today.checked_sub_months(Months::new(1)),
            Period::LastQuarter => today.checked_sub_months(Months::new(3)),
            Period::LastSixMonths => today.checked_sub_months(Months::new(6)),
            Period::LastYear => today.checked_sub_months(Months::new(12)),
        };
        start.unwrap_or(today)
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lastWeek" => Ok(Period::LastWeek),
            "lastMonth" => Ok(Period::LastMonth),
            "lastQuarter" => Ok(Period::LastQuarter),
            "lastSixMonths" => Ok(Period::LastSixMonths),
            "lastYear" => Ok(Period::LastYear),
            other => Err(format!(
                "unknown period '{other}' (expected lastWeek, lastMonth, lastQuarter, lastSixMonths or lastYear)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub month: String,
    pub visits: usize,
    #[serde(flatten)]
    pub values: BTreeMap<Series, f64>,
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{year}-{month:02}"))
}

/// Month buckets from the period start through `today`, contiguous even when empty.
pub fn period_trend(visits: &[BranchVisit], period: Period, today: NaiveDate) -> Vec<TrendPoint> {
    let start = period.start(today);
    let mut buckets: Vec<(i32, u32)> = Vec::new();
    let (mut y, mut m) = (start.year(), start.month());
    while (y, m) <= (today.year(), today.month()) {
        buckets.push((y, m));
        if m == 12 {
            y += 1;
            m = 1;
        } else {
            m += 1;
        }
    }

    let mut by_month: HashMap<(i32, u32), Vec<&BranchVisit>> = HashMap::new();
    for v in visits
        .iter()
        .filter(|v| v.status.is_reported() && v.visit_date >= start && v.visit_date <= today)
    {
        by_month.entry((v.visit_date.year(), v.visit_date.month())).or_default().push(v);
    }

    buckets
        .into_iter()
        .map(|key| {
            let in_month = by_month.get(&key).map(Vec::as_slice).unwrap_or(&[]);
            let values = Series::ALL
                .iter()
                .map(|s| {
                    let avg = mean(in_month.iter().map(|v| match s {
                        Series::Manning => v.manning_percentage,
                        Series::Attrition => v.attrition_percentage,
                        Series::Er => v.er_percentage,
                        Series::NonVendor => v.non_vendor_percentage,
                    }));
                    (*s, avg)
                })
                .collect();
            TrendPoint { month: month_label(key.0, key.1), visits: in_month.len(), values }
        })
        .collect()
}

// ───────────────────────────────────────
// Qualitative heatmap
// ───────────────────────────────────────
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeatmapFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category: Option<BranchCategory>,
}

impl HeatmapFilter {
    fn admits(&self, v: &BranchVisit) -> bool {
        v.status == VisitStatus::Approved
            && self.from.map_or(true, |from| v.visit_date >= from)
            && self.to.map_or(true, |to| v.visit_date <= to)
            && self.category.map_or(true, |c| v.branch_category == c)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapRow {
    pub field: QualitativeField,
    pub label: &'static str,
    pub inverted: bool,
    pub yes: usize,
    pub no: usize,
    pub total: usize,
    pub yes_percentage: f64,
    pub no_percentage: f64,
    /// Share of healthy answers: "yes", or "no" for inverted questions.
    pub positive_percentage: f64,
}

pub fn qualitative_heatmap(visits: &[BranchVisit], filter: &HeatmapFilter) -> Vec<HeatmapRow> {
    let admitted: Vec<&BranchVisit> = visits.iter().filter(|v| filter.admits(v)).collect();

    QualitativeField::ALL
        .iter()
        .map(|&field| {
            let (yes, no) = admitted.iter().fold((0, 0), |(yes, no), v| match v.answer(field) {
                Some(Answer::Yes) => (yes + 1, no),
                Some(Answer::No) => (yes, no + 1),
                None => (yes, no),
            });
            let total = yes + no;
            let positive = if field.inverted() { no } else { yes };
            HeatmapRow {
                field,
                label: field.label(),
                inverted: field.inverted(),
                yes,
                no,
                total,
                yes_percentage: percent(yes, total),
                no_percentage: percent(no, total),
                positive_percentage: percent(positive, total),
            }
        })
        .collect()
}

// ───────────────────────────────────────
// Rankings & coverage
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Performer {
    pub user_id: Uuid,
    pub full_name: String,
    pub employee_code: Option<String>,
    pub visits: usize,
    pub branches_visited: usize,
}

/// Ranks representatives by visit count, highest first. Ties are broken by
/// full name ascending, then by user id.
pub fn top_performers(visits: &[BranchVisit], profiles: &[Profile], limit: usize) -> Vec<Performer> {
    let names: HashMap<Uuid, &Profile> = profiles.iter().map(|p| (p.id, p)).collect();
    let mut per_user: HashMap<Uuid, (usize, HashSet<Uuid>)> = HashMap::new();
    for v in visits {
        let entry = per_user.entry(v.user_id).or_default();
        entry.0 += 1;
        entry.1.insert(v.branch_id);
    }

    let mut ranked: Vec<Performer> = per_user
        .into_iter()
        .map(|(user_id, (count, branches))| {
            let profile = names.get(&user_id);
            Performer {
                user_id,
                full_name: profile.map(|p| p.full_name.clone()).unwrap_or_else(|| "Unknown".into()),
                employee_code: profile.and_then(|p| p.employee_code.clone()),
                visits: count,
                branches_visited: branches.len(),
            }
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.visits
            .cmp(&a.visits)
            .then_with(|| a.full_name.cmp(&b.full_name))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    ranked.truncate(limit);
    ranked
}

/// `round(distinct branches visited / total branches * 100)`.
pub fn branch_coverage<'a>(
    visits: impl IntoIterator<Item = &'a BranchVisit>,
    total_branches: usize,
) -> i64 {
    if total_branches == 0 {
        return 0;
    }
    let visited: HashSet<Uuid> = visits.into_iter().map(|v| v.branch_id).collect();
    (visited.len() as f64 / total_branches as f64 * 100.0).round() as i64
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_branches: usize,
    pub total_visits: usize,
    pub drafts: usize,
    pub pending_review: usize,
    pub approved: usize,
    pub rejected: usize,
    pub branches_visited: usize,
    pub coverage_percentage: i64,
    pub categories: Vec<CategoryCount>,
}

/// `branches` is the caller's universe: every branch for reviewers, the
/// assigned ones for a representative. Visits to branches outside it are
/// counted by status but never toward coverage.
pub fn dashboard_summary(visits: &[BranchVisit], branches: &[Branch]) -> DashboardSummary {
    let count = |s: VisitStatus| visits.iter().filter(|v| v.status == s).count();
    let universe: HashSet<Uuid> = branches.iter().map(|b| b.id).collect();
    let reported: Vec<&BranchVisit> = visits
        .iter()
        .filter(|v| v.status.is_reported() && universe.contains(&v.branch_id))
        .collect();
    let branches_visited = reported.iter().map(|v| v.branch_id).collect::<HashSet<_>>().len();

    DashboardSummary {
        total_branches: branches.len(),
        total_visits: visits.len(),
        drafts: count(VisitStatus::Draft),
        pending_review: count(VisitStatus::Submitted),
        approved: count(VisitStatus::Approved),
        rejected: count(VisitStatus::Rejected),
        branches_visited,
        coverage_percentage: branch_coverage(reported.iter().copied(), branches.len()),
        categories: category_breakdown(branches),
    }
}

// ───────────────────────────────────────
// Per-representative performance report
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRow {
    pub user_id: Uuid,
    pub full_name: String,
    pub employee_code: Option<String>,
    pub location: Option<String>,
    pub assigned_branches: usize,
    pub visits: usize,
    pub assigned_branches_visited: usize,
    pub coverage_percentage: f64,
    pub last_visit_date: Option<NaiveDate>,
}

/// One row per representative, sorted by name. Counts only reported visits.
pub fn performance_report(
    profiles: &[Profile],
    assignments: &[BranchAssignment],
    visits: &[BranchVisit],
) -> Vec<PerformanceRow> {
    let mut assigned: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
    for a in assignments {
        assigned.entry(a.user_id).or_default().insert(a.branch_id);
    }
    let mut visited: HashMap<Uuid, Vec<&BranchVisit>> = HashMap::new();
    for v in visits.iter().filter(|v| v.status.is_reported()) {
        visited.entry(v.user_id).or_default().push(v);
    }

    let empty = HashSet::new();
    let mut rows: Vec<PerformanceRow> = profiles
        .iter()
        .filter(|p| p.role == Role::Bhr)
        .map(|p| {
            let mine = assigned.get(&p.id).unwrap_or(&empty);
            let own_visits = visited.get(&p.id).map(Vec::as_slice).unwrap_or(&[]);
            let covered = own_visits
                .iter()
                .map(|v| v.branch_id)
                .filter(|b| mine.contains(b))
                .collect::<HashSet<_>>()
                .len();
            PerformanceRow {
                user_id: p.id,
                full_name: p.full_name.clone(),
                employee_code: p.employee_code.clone(),
                location: p.location.clone(),
                assigned_branches: mine.len(),
                visits: own_visits.len(),
                assigned_branches_visited: covered,
                coverage_percentage: percent(covered, mine.len()),
                last_visit_date: own_visits.iter().map(|v| v.visit_date).max(),
            }
        })
        .collect();
    rows.sort_by(|a, b| a.full_name.cmp(&b.full_name).then_with(|| a.user_id.cmp(&b.user_id)));
    rows
}
