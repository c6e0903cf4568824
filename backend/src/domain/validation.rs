// backend/src/domain/validation.rs
//
// Visit record schema: field-level checks over an incoming candidate.
// Everything here is pure; callers decide what to persist.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::FeedbackLimits;
use crate::models::{Answer, AnswerInput, BranchVisit, PerformanceLevel, QualitativeField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    Required,
    FutureDate,
    RangeError,
    LengthError,
    InvalidEnumError,
    InvalidType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: FieldErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }

    pub fn has(&self, field: &str, kind: FieldErrorKind) -> bool {
        self.0.iter().any(|e| e.field == field && e.kind == kind)
    }
}

/// Candidate visit values as they arrive from a form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisitInput {
    pub branch_id: Option<Uuid>,
    pub visit_date: Option<NaiveDate>,
    pub hr_connect_session: Option<bool>,
    pub total_employees_invited: Option<i64>,
    pub total_participants: Option<i64>,
    pub manning_percentage: Option<f64>,
    pub attrition_percentage: Option<f64>,
    pub non_vendor_percentage: Option<f64>,
    pub er_percentage: Option<f64>,
    pub cwt_cases: Option<i64>,
    pub new_employees_total: Option<i64>,
    pub new_employees_covered: Option<i64>,
    pub star_employees_total: Option<i64>,
    pub star_employees_covered: Option<i64>,
    pub performance_level: Option<String>,
    pub leaders_aligned_with_code: Option<AnswerInput>,
    pub employees_feel_safe: Option<AnswerInput>,
    pub employees_feel_motivated: Option<AnswerInput>,
    pub leaders_abusive_language: Option<AnswerInput>,
    pub employees_comfort_escalation: Option<AnswerInput>,
    pub inclusive_culture: Option<AnswerInput>,
    pub feedback: Option<String>,
}

impl VisitInput {
    pub const FIELDS: [&'static str; 22] = [
        "branch_id",
        "visit_date",
        "hr_connect_session",
        "total_employees_invited",
        "total_participants",
        "manning_percentage",
        "attrition_percentage",
        "non_vendor_percentage",
        "er_percentage",
        "cwt_cases",
        "new_employees_total",
        "new_employees_covered",
        "star_employees_total",
        "star_employees_covered",
        "performance_level",
        "leaders_aligned_with_code",
        "employees_feel_safe",
        "employees_feel_motivated",
        "leaders_abusive_language",
        "employees_comfort_escalation",
        "inclusive_culture",
        "feedback",
    ];
}

/// Turns a body deserialization failure (`"<field>: <reason>"`, optionally behind
/// axum's "... into the target type: " prefix) into a single field error.
/// Paths that are not visit fields are reported against `body`.
pub fn type_error(detail: &str) -> ValidationErrors {
    let detail = detail.split_once("target type: ").map_or(detail, |(_, rest)| rest);
    let field = detail
        .split_once(": ")
        .and_then(|(path, _)| VisitInput::FIELDS.iter().copied().find(|f| *f == path))
        .unwrap_or("body");
    ValidationErrors(vec![FieldError {
        field,
        kind: FieldErrorKind::InvalidType,
        message: detail.to_string(),
    }])
}

/// Normalized, range-checked content fields of a visit. `None` means "not provided".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitFields {
    pub hr_connect_session: Option<bool>,
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
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewVisit {
    pub branch_id: Uuid,
    pub visit_date: NaiveDate,
    pub fields: VisitFields,
}

/// `round(participants / invited * 100)`, 0 when nobody was invited.
pub fn coverage_percentage(invited: Option<i32>, participants: Option<i32>) -> i64 {
    match (invited, participants) {
        (Some(invited), Some(participants)) if invited > 0 => {
            (f64::from(participants) / f64::from(invited) * 100.0).round() as i64
        }
        _ => 0,
    }
}

/// Checks a candidate for creation: branch and a non-future date are required.
pub fn validate_new(
    input: &VisitInput,
    today: NaiveDate,
    limits: &FeedbackLimits,
) -> Result<NewVisit, ValidationErrors> {
    let mut c = Checker::new(limits);

    if input.branch_id.is_none() {
        c.fail("branch_id", FieldErrorKind::Required, "branch is required");
    }
    match input.visit_date {
        None => c.fail("visit_date", FieldErrorKind::Required, "visit date is required"),
        Some(d) => c.not_future(d, today),
    }
    let fields = c.fields(input);

    match (input.branch_id, input.visit_date) {
        (Some(branch_id), Some(visit_date)) if c.errors.is_empty() => Ok(NewVisit {
            branch_id,
            visit_date,
            fields,
        }),
        _ => Err(ValidationErrors(c.errors)),
    }
}

/// Checks a partial draft update. Nothing is required; provided fields must be valid.
pub fn validate_patch(
    input: &VisitInput,
    today: NaiveDate,
    limits: &FeedbackLimits,
) -> Result<(Option<NaiveDate>, VisitFields), ValidationErrors> {
    let mut c = Checker::new(limits);
    if let Some(d) = input.visit_date {
        c.not_future(d, today);
    }
    let fields = c.fields(input);
    c.finish((input.visit_date, fields))
}

/// Full check of a stored draft before it leaves the representative's hands.
pub fn validate_for_submit(
    visit: &BranchVisit,
    today: NaiveDate,
    limits: &FeedbackLimits,
) -> Result<(), ValidationErrors> {
    let mut c = Checker::new(limits);
    c.not_future(visit.visit_date, today);

    for (field, value) in [
        ("manning_percentage", visit.manning_percentage),
        ("attrition_percentage", visit.attrition_percentage),
        ("non_vendor_percentage", visit.non_vendor_percentage),
        ("er_percentage", visit.er_percentage),
    ] {
        c.percentage(field, value);
    }
    for (field, value) in [
        ("total_employees_invited", visit.total_employees_invited),
        ("total_participants", visit.total_participants),
        ("cwt_cases", visit.cwt_cases),
        ("new_employees_total", visit.new_employees_total),
        ("new_employees_covered", visit.new_employees_covered),
        ("star_employees_total", visit.star_employees_total),
        ("star_employees_covered", visit.star_employees_covered),
    ] {
        c.count(field, value.map(i64::from));
    }
    c.feedback(visit.feedback.as_deref());
    c.finish(())
}

struct Checker<'a> {
    limits: &'a FeedbackLimits,
    errors: Vec<FieldError>,
}

impl<'a> Checker<'a> {
    fn new(limits: &'a FeedbackLimits) -> Self {
        Self { limits, errors: Vec::new() }
    }

    fn fail(&mut self, field: &'static str, kind: FieldErrorKind, message: impl Into<String>) {
        self.errors.push(FieldError { field, kind, message: message.into() });
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(ValidationErrors(self.errors))
        }
    }

    fn not_future(&mut self, date: NaiveDate, today: NaiveDate) {
        if date > today {
            self.fail(
                "visit_date",
                FieldErrorKind::FutureDate,
                format!("visit date {date} is in the future"),
            );
        }
    }

    fn percentage(&mut self, field: &'static str, value: Option<f64>) -> Option<f64> {
        let v = value?;
        if !v.is_finite() || !(0.0..=100.0).contains(&v) {
            self.fail(field, FieldErrorKind::RangeError, "must be between 0 and 100");
            return None;
        }
        Some(v)
    }

    fn count(&mut self, field: &'static str, value: Option<i64>) -> Option<i32> {
        let v = value?;
        match i32::try_from(v) {
            Ok(n) if n >= 0 => Some(n),
            _ => {
                self.fail(field, FieldErrorKind::RangeError, "must be a non-negative whole number");
                None
            }
        }
    }

    fn answer(&mut self, field: QualitativeField, value: Option<&AnswerInput>) -> Option<Answer> {
        match value? {
            AnswerInput::Toggle(flag) => Some(Answer::from(*flag)),
            AnswerInput::Text(raw) => {
                let parsed = Answer::parse(raw);
                if parsed.is_none() {
                    self.fail(
                        field.key(),
                        FieldErrorKind::InvalidEnumError,
                        format!("'{raw}' is not one of: yes, no"),
                    );
                }
                parsed
            }
        }
    }

    fn performance_level(&mut self, value: Option<&str>) -> Option<PerformanceLevel> {
        let raw = value?;
        match raw.parse() {
            Ok(level) => Some(level),
            Err(_) => {
                self.fail(
                    "performance_level",
                    FieldErrorKind::InvalidEnumError,
                    format!("'{raw}' is not one of: excellent, good, average, below_average, poor"),
                );
                None
            }
        }
    }

    fn feedback(&mut self, value: Option<&str>) -> Option<String> {
        let text = value?.trim();
        if text.is_empty() {
            return None;
        }
        let words = text.split_whitespace().count();
        let chars = text.chars().count();
        if words > self.limits.max_words || chars > self.limits.max_chars {
            self.fail(
                "feedback",
                FieldErrorKind::LengthError,
                format!(
                    "feedback is limited to {} words / {} characters (got {words} / {chars})",
                    self.limits.max_words, self.limits.max_chars
                ),
            );
            return None;
        }
        Some(text.to_string())
    }

    fn fields(&mut self, i: &VisitInput) -> VisitFields {
        use QualitativeField as Q;
        VisitFields {
            hr_connect_session: i.hr_connect_session,
            total_employees_invited: self.count("total_employees_invited", i.total_employees_invited),
            total_participants: self.count("total_participants", i.total_participants),
            manning_percentage: self.percentage("manning_percentage", i.manning_percentage),
            attrition_percentage: self.percentage("attrition_percentage", i.attrition_percentage),
            non_vendor_percentage: self.percentage("non_vendor_percentage", i.non_vendor_percentage),
            er_percentage: self.percentage("er_percentage", i.er_percentage),
            cwt_cases: self.count("cwt_cases", i.cwt_cases),
            new_employees_total: self.count("new_employees_total", i.new_employees_total),
            new_employees_covered: self.count("new_employees_covered", i.new_employees_covered),
            star_employees_total: self.count("star_employees_total", i.star_employees_total),
            star_employees_covered: self.count("star_employees_covered", i.star_employees_covered),
            performance_level: self.performance_level(i.performance_level.as_deref()),
            leaders_aligned_with_code: self
                .answer(Q::LeadersAlignedWithCode, i.leaders_aligned_with_code.as_ref()),
            employees_feel_safe: self.answer(Q::EmployeesFeelSafe, i.employees_feel_safe.as_ref()),
            employees_feel_motivated: self
                .answer(Q::EmployeesFeelMotivated, i.employees_feel_motivated.as_ref()),
            leaders_abusive_language: self
                .answer(Q::LeadersAbusiveLanguage, i.leaders_abusive_language.as_ref()),
            employees_comfort_escalation: self
                .answer(Q::EmployeesComfortEscalation, i.employees_comfort_escalation.as_ref()),
            inclusive_culture: self.answer(Q::InclusiveCulture, i.inclusive_culture.as_ref()),
            feedback: self.feedback(i.feedback.as_deref()),
        }
    }
}
