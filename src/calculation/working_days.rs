//! Working-day computation.
//!
//! Working days for a month are the calendar days minus Saturdays, Sundays
//! and any date in the organization's holiday calendar. The count drives
//! pro-ration, so a month that works out to zero working days is a
//! computation hazard upstream, not a valid divisor.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::{EngineError, EngineResult};

/// All calendar days of (year, month), in order.
///
/// Rejects months outside 1-12 before any computation.
pub fn month_days(year: i32, month: u32) -> EngineResult<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        EngineError::validation("month", format!("{year}-{month} is not a valid month"))
    })?;

    let mut days = Vec::with_capacity(31);
    let mut day = first;
    while day.month() == month {
        days.push(day);
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    Ok(days)
}

/// Number of working days in (year, month) given the holiday dates.
///
/// # Example
///
/// ```
/// use workforce_engine::calculation::working_days;
///
/// // March 2026 has 31 days, 9 of them weekend days.
/// assert_eq!(working_days(2026, 3, &[]).unwrap(), 22);
/// ```
pub fn working_days(year: i32, month: u32, holidays: &[NaiveDate]) -> EngineResult<u32> {
    let count = month_days(year, month)?
        .into_iter()
        .filter(|day| !is_weekend(*day) && !holidays.contains(day))
        .count();
    Ok(count as u32)
}

fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}
