use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Microsecond precision keeps lexicographic order equal to insertion order.
pub const STORED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub stored_date: NaiveDateTime,
    /// Raw stored text; only parsed when deciding whether the row is overdue.
    pub due_date: String,
}

impl Bookmark {
    /// Overdue means the due date is strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> Result<bool> {
        let due = parse_due_date(&self.due_date)?;
        Ok(due < today)
    }
}

#[derive(Debug, Clone)]
pub struct NewBookmark {
    pub url: String,
    pub title: String,
    pub summary: String,
    pub stored_date: NaiveDateTime,
    pub due_date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    DueDate,
    StoredDate,
}

impl SortKey {
    pub fn cycle(self) -> Self {
        match self {
            SortKey::DueDate => SortKey::StoredDate,
            SortKey::StoredDate => SortKey::DueDate,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::DueDate => "Due Date",
            SortKey::StoredDate => "Stored Date",
        }
    }

    pub(crate) fn column(self) -> &'static str {
        match self {
            SortKey::DueDate => "due_date",
            SortKey::StoredDate => "stored_date",
        }
    }

    pub fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "due" | "due_date" => Some(SortKey::DueDate),
            "stored" | "stored_date" => Some(SortKey::StoredDate),
            _ => None,
        }
    }
}

/// Strict `YYYY-MM-DD` parse. Anything else is an error, never a guess.
pub fn parse_due_date(s: &str) -> Result<NaiveDate> {
    // chrono accepts unpadded fields, the stored format never has them
    if s.len() != 10 {
        return Err(AppError::InvalidDueDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, DUE_DATE_FORMAT)
        .map_err(|_| AppError::InvalidDueDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark_due(due_date: &str) -> Bookmark {
        Bookmark {
            id: 1,
            url: "https://example.com".to_string(),
            title: "Example".to_string(),
            summary: "An example".to_string(),
            stored_date: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            due_date: due_date.to_string(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn due_before_today_is_overdue() {
        assert!(bookmark_due("2024-03-14").is_overdue(today()).unwrap());
        assert!(bookmark_due("2023-12-01").is_overdue(today()).unwrap());
    }

    #[test]
    fn due_today_or_later_is_not_overdue() {
        assert!(!bookmark_due("2024-03-15").is_overdue(today()).unwrap());
        assert!(!bookmark_due("2024-06-20").is_overdue(today()).unwrap());
    }

    #[test]
    fn malformed_due_date_is_an_error() {
        for bad in ["", "15/03/2024", "2024-3-5", "2024-02-30", "tomorrow"] {
            let err = bookmark_due(bad).is_overdue(today()).unwrap_err();
            assert!(matches!(err, AppError::InvalidDueDate(ref s) if s == bad));
        }
    }

    #[test]
    fn sort_key_cycles_and_parses_cli_names() {
        assert_eq!(SortKey::DueDate.cycle(), SortKey::StoredDate);
        assert_eq!(SortKey::StoredDate.cycle(), SortKey::DueDate);
        assert_eq!(SortKey::from_arg("stored"), Some(SortKey::StoredDate));
        assert_eq!(SortKey::from_arg("due_date"), Some(SortKey::DueDate));
        assert_eq!(SortKey::from_arg("title"), None);
    }

    #[test]
    fn stored_date_format_orders_lexicographically() {
        let earlier = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_micro_opt(9, 5, 3, 7)
            .unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_micro_opt(10, 0, 0, 0)
            .unwrap();

        let a = earlier.format(STORED_DATE_FORMAT).to_string();
        let b = later.format(STORED_DATE_FORMAT).to_string();
        assert_eq!(a, "2024-01-05 09:05:03.000007");
        assert!(a < b);
    }
}
