//! Calendar clock and date arithmetic for derived fields.
//!
//! # Responsibility
//! - Provide "today" to validation and age derivation through an injectable
//!   clock.
//! - Compute completed-years age and the 100-year lower bound.
//!
//! # Invariants
//! - "Today" is read at call time, never captured once per process.
//! - Age is a pure function of date of birth and today.

use chrono::{Datelike, Local, NaiveDate};

/// Oldest accepted date of birth, in years before today.
pub const MAX_AGE_YEARS: u32 = 100;

/// Source of the current calendar date.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// Age in completed years on `today`.
///
/// Returns `None` when `date_of_birth` is after `today`.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    if date_of_birth > today {
        return None;
    }
    let mut years = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Same month/day `MAX_AGE_YEARS` before `today`.
///
/// Feb 29 rolls over to Mar 1 when the target year has no leap day, so a
/// Feb 28 birth date is then out of range.
pub fn hundred_years_before(today: NaiveDate) -> NaiveDate {
    let year = today.year() - MAX_AGE_YEARS as i32;
    NaiveDate::from_ymd_opt(year, today.month(), today.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::{age_on, hundred_years_before, Clock, FixedClock};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn age_counts_completed_years() {
        assert_eq!(age_on(date(2000, 6, 15), date(2024, 6, 14)), Some(23));
        assert_eq!(age_on(date(2000, 6, 15), date(2024, 6, 15)), Some(24));
        assert_eq!(age_on(date(2000, 6, 15), date(2024, 5, 30)), Some(23));
        assert_eq!(age_on(date(2000, 6, 15), date(2024, 7, 1)), Some(24));
        assert_eq!(age_on(date(2024, 6, 15), date(2024, 6, 15)), Some(0));
    }

    #[test]
    fn age_is_none_for_future_dates() {
        assert_eq!(age_on(date(2024, 6, 16), date(2024, 6, 15)), None);
    }

    #[test]
    fn leap_day_birthdays_complete_on_march_first() {
        let born = date(2004, 2, 29);
        assert_eq!(age_on(born, date(2023, 2, 28)), Some(18));
        assert_eq!(age_on(born, date(2023, 3, 1)), Some(19));
        assert_eq!(age_on(born, date(2024, 2, 29)), Some(20));
    }

    #[test]
    fn hundred_year_bound_keeps_month_and_day() {
        assert_eq!(hundred_years_before(date(2024, 6, 15)), date(1924, 6, 15));
        assert_eq!(hundred_years_before(date(2024, 2, 29)), date(1924, 2, 29));
        assert_eq!(hundred_years_before(date(2028, 2, 29)), date(1928, 2, 29));
    }

    #[test]
    fn hundred_year_bound_rolls_missing_leap_day_to_march() {
        assert_eq!(hundred_years_before(date(2000, 2, 29)), date(1900, 3, 1));
        assert_eq!(hundred_years_before(date(2000, 3, 1)), date(1900, 3, 1));
        assert_eq!(hundred_years_before(date(2000, 2, 28)), date(1900, 2, 28));
    }

    #[test]
    fn fixed_clock_reports_pinned_date() {
        let clock = FixedClock(date(2024, 6, 15));
        assert_eq!(clock.today(), date(2024, 6, 15));
    }
}
