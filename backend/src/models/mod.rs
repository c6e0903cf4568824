// backend/src/models/mod.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ───────────────────────────────────────
// People & roles
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Branch (head) representative, writes visit reports.
    Bhr,
    /// Zonal head, reviews visits and manages assignments.
    Zh,
    /// Channel/cluster head, cross-zone analytics.
    Ch,
    Admin,
}

impl Role {
    pub fn is_reviewer(self) -> bool {
        matches!(self, Role::Zh | Role::Admin)
    }

    pub fn can_manage_assignments(self) -> bool {
        matches!(self, Role::Zh | Role::Admin)
    }

    pub fn can_export(self) -> bool {
        !matches!(self, Role::Bhr)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bhr" | "bh" => Ok(Role::Bhr),
            "zh" => Ok(Role::Zh),
            "ch" => Ok(Role::Ch),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub employee_code: Option<String>,
    pub location: Option<String>,
    pub role: Role,
}

// ───────────────────────────────────────
// Branches
// ───────────────────────────────────────
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "branch_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BranchCategory {
    Platinum,
    Diamond,
    Gold,
    Silver,
    Bronze,
    Unknown,
}

impl BranchCategory {
    pub const ALL: [BranchCategory; 6] = [
        BranchCategory::Platinum,
        BranchCategory::Diamond,
        BranchCategory::Gold,
        BranchCategory::Silver,
        BranchCategory::Bronze,
        BranchCategory::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BranchCategory::Platinum => "platinum",
            BranchCategory::Diamond => "diamond",
            BranchCategory::Gold => "gold",
            BranchCategory::Silver => "silver",
            BranchCategory::Bronze => "bronze",
            BranchCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BranchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub category: BranchCategory,
    pub branch_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BranchAssignment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub branch_id: Uuid,
    pub assigned_date: NaiveDate,
}

/// Assignment joined with its branch and representative, for listings and exports.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AssignmentDetail {
    pub id: Uuid,
    pub assigned_date: NaiveDate,
    pub user_id: Uuid,
    pub full_name: String,
    pub employee_code: Option<String>,
    pub branch_id: Uuid,
    pub branch_name: String,
    pub branch_code: String,
    pub branch_category: BranchCategory,
    pub location: String,
}

// ───────────────────────────────────────
// Visits
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "visit_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VisitStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl VisitStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, VisitStatus::Approved | VisitStatus::Rejected)
    }

    /// Submitted and approved visits are the ones reported on.
    pub fn is_reported(self) -> bool {
        matches!(self, VisitStatus::Submitted | VisitStatus::Approved)
    }

    pub fn can_transition_to(self, next: VisitStatus) -> bool {
        matches!(
            (self, next),
            (VisitStatus::Draft, VisitStatus::Draft)
                | (VisitStatus::Draft, VisitStatus::Submitted)
                | (VisitStatus::Submitted, VisitStatus::Approved)
                | (VisitStatus::Submitted, VisitStatus::Rejected)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VisitStatus::Draft => "draft",
            VisitStatus::Submitted => "submitted",
            VisitStatus::Approved => "approved",
            VisitStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted answer to a yes/no assessment question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "answer", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    /// Maps a tri-state toggle onto the stored answer; an unset toggle stores nothing.
    pub fn from_toggle(toggle: Option<bool>) -> Option<Answer> {
        toggle.map(Answer::from)
    }

    pub fn as_toggle(answer: Option<Answer>) -> Option<bool> {
        answer.map(|a| a == Answer::Yes)
    }

    pub fn parse(raw: &str) -> Option<Answer> {
        match raw {
            "yes" => Some(Answer::Yes),
            "no" => Some(Answer::No),
            _ => None,
        }
    }
}

impl From<bool> for Answer {
    fn from(v: bool) -> Self {
        if v {
            Answer::Yes
        } else {
            Answer::No
        }
    }
}

/// Incoming answer: UI toggles send booleans, forms send the stored strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AnswerInput {
    Toggle(bool),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "performance_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PerformanceLevel {
    Excellent,
    Good,
    Average,
    BelowAverage,
    Poor,
}

impl FromStr for PerformanceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "excellent" => Ok(PerformanceLevel::Excellent),
            "good" => Ok(PerformanceLevel::Good),
            "average" => Ok(PerformanceLevel::Average),
            "below_average" => Ok(PerformanceLevel::BelowAverage),
            "poor" => Ok(PerformanceLevel::Poor),
            other => Err(format!("unknown performance level '{other}'")),
        }
    }
}

/// The six workplace-culture questions asked on every visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualitativeField {
    LeadersAlignedWithCode,
    EmployeesFeelSafe,
    EmployeesFeelMotivated,
    LeadersAbusiveLanguage,
    EmployeesComfortEscalation,
    InclusiveCulture,
}

impl QualitativeField {
    pub const ALL: [QualitativeField; 6] = [
        QualitativeField::LeadersAlignedWithCode,
        QualitativeField::EmployeesFeelSafe,
        QualitativeField::EmployeesFeelMotivated,
        QualitativeField::LeadersAbusiveLanguage,
        QualitativeField::EmployeesComfortEscalation,
        QualitativeField::InclusiveCulture,
    ];

    pub fn key(self) -> &'static str {
        match self {
            QualitativeField::LeadersAlignedWithCode => "leaders_aligned_with_code",
            QualitativeField::EmployeesFeelSafe => "employees_feel_safe",
            QualitativeField::EmployeesFeelMotivated => "employees_feel_motivated",
            QualitativeField::LeadersAbusiveLanguage => "leaders_abusive_language",
            QualitativeField::EmployeesComfortEscalation => "employees_comfort_escalation",
            QualitativeField::InclusiveCulture => "inclusive_culture",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QualitativeField::LeadersAlignedWithCode => "Leaders aligned with code of conduct",
            QualitativeField::EmployeesFeelSafe => "Employees feel safe",
            QualitativeField::EmployeesFeelMotivated => "Employees feel motivated",
            QualitativeField::LeadersAbusiveLanguage => "Leaders use abusive language",
            QualitativeField::EmployeesComfortEscalation => "Employees comfortable escalating",
            QualitativeField::InclusiveCulture => "Inclusive culture",
        }
    }

    /// "yes" is the unhealthy answer for these questions.
    pub fn inverted(self) -> bool {
        matches!(self, QualitativeField::LeadersAbusiveLanguage)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BranchVisit {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub user_id: Uuid,
    pub visit_date: NaiveDate,
    pub status: VisitStatus,
    pub branch_category: BranchCategory,
    pub hr_connect_session: bool,
    pub total_employees_invited: Option<i32>,
    pub total_participants: Option<i32>,
    pub manning_percentage: Option<f64>,
    pub attrition_percentage: Option<f64>,
    pub non_vendor_percentage: Option<f64>,
    pub er_percentage: Option<f64>,
    pub cwt_cases: Option<i32>,
    pub new_employees_total: Option<i32>,
    pub new_employees_covered: Option<i32>,
    pub star_employees_total: Option<i32>,
    pub star_employees_covered: Option<i32>,
    pub performance_level: Option<PerformanceLevel>,
    pub leaders_aligned_with_code: Option<Answer>,
    pub employees_feel_safe: Option<Answer>,
    pub employees_feel_motivated: Option<Answer>,
    pub leaders_abusive_language: Option<Answer>,
    pub employees_comfort_escalation: Option<Answer>,
    pub inclusive_culture: Option<Answer>,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BranchVisit {
    pub fn answer(&self, field: QualitativeField) -> Option<Answer> {
        match field {
            QualitativeField::LeadersAlignedWithCode => self.leaders_aligned_with_code,
            QualitativeField::EmployeesFeelSafe => self.employees_feel_safe,
            QualitativeField::EmployeesFeelMotivated => self.employees_feel_motivated,
            QualitativeField::LeadersAbusiveLanguage => self.leaders_abusive_language,
            QualitativeField::EmployeesComfortEscalation => self.employees_comfort_escalation,
            QualitativeField::InclusiveCulture => self.inclusive_culture,
        }
    }

    pub fn coverage_percentage(&self) -> i64 {
        crate::domain::validation::coverage_percentage(
            self.total_employees_invited,
            self.total_participants,
        )
    }
}

/// Visit as returned to clients, with derived coverage.
#[derive(Debug, Serialize)]
pub struct VisitDetail {
    #[serde(flatten)]
    pub visit: BranchVisit,
    pub coverage_percentage: i64,
}

impl From<BranchVisit> for VisitDetail {
    fn from(visit: BranchVisit) -> Self {
        let coverage_percentage = visit.coverage_percentage();
        VisitDetail { visit, coverage_percentage }
    }
}

/// Flat row used by the visit export.
#[derive(Debug, Serialize, FromRow)]
pub struct VisitExportRow {
    pub visit_date: NaiveDate,
    pub branch_name: String,
    pub branch_code: String,
    pub branch_category: BranchCategory,
    pub representative: String,
    pub employee_code: Option<String>,
    pub status: VisitStatus,
    pub hr_connect_session: bool,
    pub total_employees_invited: Option<i32>,
    pub total_participants: Option<i32>,
    pub manning_percentage: Option<f64>,
    pub attrition_percentage: Option<f64>,
    pub non_vendor_percentage: Option<f64>,
    pub er_percentage: Option<f64>,
    pub cwt_cases: Option<i32>,
    pub performance_level: Option<PerformanceLevel>,
    pub leaders_aligned_with_code: Option<Answer>,
    pub employees_feel_safe: Option<Answer>,
    pub employees_feel_motivated: Option<Answer>,
    pub leaders_abusive_language: Option<Answer>,
    pub employees_comfort_escalation: Option<Answer>,
    pub inclusive_culture: Option<Answer>,
    pub feedback: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_maps_to_stored_answer() {
        assert_eq!(Answer::from_toggle(Some(true)), Some(Answer::Yes));
        assert_eq!(Answer::from_toggle(Some(false)), Some(Answer::No));
        assert_eq!(Answer::from_toggle(None), None);
        assert_eq!(Answer::as_toggle(Some(Answer::No)), Some(false));
    }

    #[test]
    fn answers_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Answer::Yes).unwrap(), "\"yes\"");
        let parsed: AnswerInput = serde_json::from_str("true").unwrap();
        assert_eq!(parsed, AnswerInput::Toggle(true));
        let parsed: AnswerInput = serde_json::from_str("\"no\"").unwrap();
        assert_eq!(parsed, AnswerInput::Text("no".into()));
    }

    #[test]
    fn only_the_forward_transitions_exist() {
        use VisitStatus::*;
        assert!(Draft.can_transition_to(Submitted));
        assert!(Submitted.can_transition_to(Approved));
        assert!(Submitted.can_transition_to(Rejected));
        assert!(!Submitted.can_transition_to(Draft));
        for terminal in [Approved, Rejected] {
            for next in [Draft, Submitted, Approved, Rejected] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn only_settled_visits_are_terminal() {
        assert!(VisitStatus::Approved.is_terminal());
        assert!(VisitStatus::Rejected.is_terminal());
        assert!(!VisitStatus::Draft.is_terminal());
        assert!(!VisitStatus::Submitted.is_terminal());
    }

    #[test]
    fn performance_levels_parse_their_stored_labels() {
        assert_eq!("below_average".parse::<PerformanceLevel>(), Ok(PerformanceLevel::BelowAverage));
        let err = "Good".parse::<PerformanceLevel>().unwrap_err();
        assert!(err.contains("Good"));
    }

    #[test]
    fn role_parsing_accepts_gateway_values() {
        assert_eq!("ZH".parse::<Role>().unwrap(), Role::Zh);
        assert_eq!("bh".parse::<Role>().unwrap(), Role::Bhr);
        assert!("manager".parse::<Role>().is_err());
    }
}
