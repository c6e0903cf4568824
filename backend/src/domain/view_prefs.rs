// backend/src/domain/view_prefs.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// A chartable metric series on the trend view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Series {
    Manning,
    Attrition,
    Er,
    NonVendor,
}

impl Series {
    pub const ALL: [Series; 4] = [Series::Manning, Series::Attrition, Series::Er, Series::NonVendor];
}

impl FromStr for Series {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "manning" => Ok(Series::Manning),
            "attrition" => Ok(Series::Attrition),
            "er" => Ok(Series::Er),
            "non_vendor" | "nonVendor" => Ok(Series::NonVendor),
            other => Err(format!("unknown series '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefsAction {
    Toggle(Series),
    Show(Series),
    Hide(Series),
    ShowAll,
}

/// Which series are visible. Replaced wholesale on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewPrefs {
    visible: BTreeMap<Series, bool>,
}

impl Default for ViewPrefs {
    fn default() -> Self {
        Self { visible: Series::ALL.iter().map(|s| (*s, true)).collect() }
    }
}

impl ViewPrefs {
    pub fn is_visible(&self, series: Series) -> bool {
        self.visible.get(&series).copied().unwrap_or(true)
    }

    pub fn reduce(&self, action: PrefsAction) -> ViewPrefs {
        let mut visible = self.visible.clone();
        match action {
            PrefsAction::Toggle(s) => {
                let now = !self.is_visible(s);
                visible.insert(s, now);
            }
            PrefsAction::Show(s) => {
                visible.insert(s, true);
            }
            PrefsAction::Hide(s) => {
                visible.insert(s, false);
            }
            PrefsAction::ShowAll => return ViewPrefs::default(),
        }
        ViewPrefs { visible }
    }

    /// Builds prefs from a comma separated `hide` list, e.g. `attrition,er`.
    pub fn from_hidden(list: &str) -> Result<ViewPrefs, String> {
        list.split(',')
            .filter(|s| !s.trim().is_empty())
            .map(Series::from_str)
            .try_fold(ViewPrefs::default(), |prefs, s| Ok(prefs.reduce(PrefsAction::Hide(s?))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn everything_visible_by_default() {
        let prefs = ViewPrefs::default();
        assert!(Series::ALL.iter().all(|s| prefs.is_visible(*s)));
    }

    #[test]
    fn reduce_returns_a_new_value() {
        let before = ViewPrefs::default();
        let after = before.reduce(PrefsAction::Toggle(Series::Er));
        assert!(before.is_visible(Series::Er));
        assert!(!after.is_visible(Series::Er));
        assert!(after.reduce(PrefsAction::Toggle(Series::Er)).is_visible(Series::Er));
        assert_eq!(after.reduce(PrefsAction::ShowAll), ViewPrefs::default());
    }

    #[test]
    fn hidden_list_is_folded() {
        let prefs = ViewPrefs::from_hidden("attrition, nonVendor").unwrap();
        assert!(prefs.is_visible(Series::Manning));
        assert!(!prefs.is_visible(Series::Attrition));
        assert!(!prefs.is_visible(Series::NonVendor));
        assert_eq!(ViewPrefs::from_hidden("").unwrap(), ViewPrefs::default());
        assert!(ViewPrefs::from_hidden("headcount").is_err());
    }
}
