use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::models::DUE_DATE_FORMAT;

/// What the picked date is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerPurpose {
    NewBookmark { url: String },
    UpdateDueDate { id: i64 },
}

#[derive(Debug, Clone)]
pub struct DatePicker {
    pub selected: NaiveDate,
    pub purpose: PickerPurpose,
}

impl DatePicker {
    pub fn new(selected: NaiveDate, purpose: PickerPurpose) -> Self {
        Self { selected, purpose }
    }

    pub fn move_days(&mut self, days: i64) {
        if let Some(date) = self.selected.checked_add_signed(Duration::days(days)) {
            self.selected = date;
        }
    }

    /// Clamps to the last day of the target month (Jan 31 + 1 month = Feb 29/28).
    pub fn move_months(&mut self, months: i32) {
        let step = Months::new(months.unsigned_abs());
        let moved = if months >= 0 {
            self.selected.checked_add_months(step)
        } else {
            self.selected.checked_sub_months(step)
        };
        if let Some(date) = moved {
            self.selected = date;
        }
    }

    pub fn due_date(&self) -> String {
        self.selected.format(DUE_DATE_FORMAT).to_string()
    }

    /// Weeks of the selected month, Monday first; `None` pads days outside it.
    pub fn month_grid(&self) -> Vec<[Option<u32>; 7]> {
        let first = self.selected.with_day(1).unwrap_or(self.selected);
        let offset = first.weekday().num_days_from_monday() as usize;
        let days = days_in_month(first);

        let mut weeks = Vec::new();
        let mut week = [None; 7];
        let mut slot = offset;
        for day in 1..=days {
            week[slot] = Some(day);
            slot += 1;
            if slot == 7 {
                weeks.push(week);
                week = [None; 7];
                slot = 0;
            }
        }
        if slot > 0 {
            weeks.push(week);
        }
        weeks
    }
}

fn days_in_month(first: NaiveDate) -> u32 {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picker(y: i32, m: u32, d: u32) -> DatePicker {
        DatePicker::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            PickerPurpose::UpdateDueDate { id: 1 },
        )
    }

    #[test]
    fn day_and_week_steps_cross_month_boundaries() {
        let mut p = picker(2024, 1, 31);
        p.move_days(1);
        assert_eq!(p.due_date(), "2024-02-01");
        p.move_days(-7);
        assert_eq!(p.due_date(), "2024-01-25");
    }

    #[test]
    fn month_steps_clamp_to_month_end() {
        let mut p = picker(2024, 1, 31);
        p.move_months(1);
        assert_eq!(p.due_date(), "2024-02-29");
        p.move_months(-2);
        assert_eq!(p.due_date(), "2023-12-29");
    }

    #[test]
    fn month_grid_starts_on_monday() {
        // February 2024 starts on a Thursday and has 29 days
        let grid = picker(2024, 2, 10).month_grid();
        assert_eq!(grid[0], [None, None, None, Some(1), Some(2), Some(3), Some(4)]);
        assert_eq!(grid.len(), 5);
        assert_eq!(grid[4][3], Some(29));
        assert_eq!(grid[4][4], None);
    }
}
