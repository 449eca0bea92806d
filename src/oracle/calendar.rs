//! Business-day calendar (Monday through Friday, no holiday table)

use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Walks backward from `start` (inclusive), yielding at most `max_days`
/// business days. Weekend dates are skipped and not counted.
#[derive(Debug, Clone)]
pub struct BusinessDays {
    cursor: NaiveDate,
    remaining: usize,
}

impl BusinessDays {
    pub fn back_from(start: NaiveDate, max_days: usize) -> Self {
        Self {
            cursor: start,
            remaining: max_days,
        }
    }
}

impl Iterator for BusinessDays {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.remaining == 0 {
            return None;
        }
        while !is_business_day(self.cursor) {
            self.cursor = self.cursor - Duration::days(1);
        }
        let day = self.cursor;
        self.cursor = day - Duration::days(1);
        self.remaining -= 1;
        Some(day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn monday_is_followed_by_previous_friday() {
        // 2025-12-01 is a Monday
        let days: Vec<_> = BusinessDays::back_from(date(2025, 12, 1), 2).collect();
        assert_eq!(days, vec![date(2025, 12, 1), date(2025, 11, 28)]);
    }

    #[test]
    fn weekend_start_begins_on_friday() {
        // Sunday 2025-11-30
        let days: Vec<_> = BusinessDays::back_from(date(2025, 11, 30), 1).collect();
        assert_eq!(days, vec![date(2025, 11, 28)]);
    }

    #[test]
    fn never_yields_weekends_and_respects_budget() {
        let days: Vec<_> = BusinessDays::back_from(date(2025, 11, 27), 7).collect();
        assert_eq!(days.len(), 7);
        assert!(days.iter().all(|d| is_business_day(*d)));
        assert!(days.windows(2).all(|w| w[0] > w[1]));
        // Thu 27 back through Wed 19
        assert_eq!(days.last().copied(), Some(date(2025, 11, 19)));
    }

    #[test]
    fn zero_budget_yields_nothing() {
        assert_eq!(BusinessDays::back_from(date(2025, 11, 27), 0).count(), 0);
    }
}
