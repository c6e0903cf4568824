// backend/src/routes/mod.rs

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

pub mod analytics;
pub mod assignments;
pub mod branches;
pub mod exports;
pub mod health;
pub mod profiles;
pub mod visits;

/// Calendar date in `tz`, used for "not in the future" checks and period windows.
pub fn today(tz: Tz) -> NaiveDate {
    local_date(Utc::now(), tz)
}

fn local_date(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Page size, 50 by default and at most 500.
pub fn limit(requested: Option<i64>) -> i64 {
    requested.unwrap_or(50).clamp(1, 500)
}

pub fn offset(requested: Option<i64>) -> i64 {
    requested.unwrap_or(0).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn today_follows_the_business_calendar() {
        // 01:30 on the 15th in India is still the 14th in UTC
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 20, 0, 0).unwrap();
        let day = |d| NaiveDate::from_ymd_opt(2026, 3, d).unwrap();
        assert_eq!(local_date(now, chrono_tz::Asia::Kolkata), day(15));
        assert_eq!(local_date(now, chrono_tz::UTC), day(14));
    }

    #[test]
    fn page_bounds_are_clamped() {
        assert_eq!(limit(None), 50);
        assert_eq!(limit(Some(10_000)), 500);
        assert_eq!(limit(Some(0)), 1);
        assert_eq!(offset(Some(-3)), 0);
    }
}
