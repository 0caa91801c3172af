//! Shift model and related types.
//!
//! A shift is a named work-schedule template owned by an organization and
//! referenced by employees. Shifts are immutable once referenced by
//! historical attendance records; edits only affect future classification
//! runs, which is why [`crate::models::AttendanceRecord`] stores the shift id
//! in effect on that day.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overtime qualification and pay rule attached to a shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeRule {
    /// Minutes past shift end before any overtime is recorded at all.
    /// Shorter overruns are ignored by the classifier.
    pub minimum_minutes: i64,
    /// Pay multiplier applied to the hourly rate for overtime hours.
    pub multiplier: Decimal,
}

/// A work-schedule template.
///
/// # Example
///
/// ```
/// use workforce_engine::models::Shift;
/// use chrono::{NaiveDate, NaiveTime};
/// use uuid::Uuid;
///
/// let shift = Shift {
///     id: Uuid::new_v4(),
///     organization_id: Uuid::new_v4(),
///     name: "General".to_string(),
///     start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
///     late_grace_minutes: 15,
///     early_exit_grace_minutes: 0,
///     overtime_rule: None,
/// };
/// let date = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
/// assert_eq!(shift.end_on(date).time(), shift.end_time);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique identifier for the shift.
    pub id: Uuid,
    /// The organization that owns this shift.
    pub organization_id: Uuid,
    /// Display name ("General", "Night A"), also used to resolve the
    /// `shift_name` column of bulk imports.
    pub name: String,
    /// Scheduled start time of day.
    pub start_time: NaiveTime,
    /// Scheduled end time of day. May be earlier than `start_time`, in which
    /// case the shift wraps past midnight.
    pub end_time: NaiveTime,
    /// Tolerance after `start_time` before a punch counts as late.
    pub late_grace_minutes: i64,
    /// Tolerance before `end_time` before a punch counts as an early exit.
    pub early_exit_grace_minutes: i64,
    /// Overtime qualification rule, if this shift pays overtime.
    pub overtime_rule: Option<OvertimeRule>,
}

impl Shift {
    /// Returns true if the shift ends on the day after it starts.
    pub fn wraps_midnight(&self) -> bool {
        self.end_time < self.start_time
    }

    /// The scheduled start instant on a given date.
    pub fn start_on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.start_time)
    }

    /// The scheduled end instant for a shift that starts on `date`.
    ///
    /// Overnight shifts end on the following calendar day.
    pub fn end_on(&self, date: NaiveDate) -> NaiveDateTime {
        let end = date.and_time(self.end_time);
        if self.wraps_midnight() {
            end + Duration::days(1)
        } else {
            end
        }
    }

    /// The instant after which a check-in counts as late: scheduled start
    /// plus the late-grace buffer.
    pub fn late_threshold_on(&self, date: NaiveDate) -> NaiveDateTime {
        self.start_on(date) + Duration::minutes(self.late_grace_minutes)
    }

    /// The instant before which a check-out counts as an early exit:
    /// scheduled end minus the early-exit grace buffer.
    pub fn early_exit_threshold_on(&self, date: NaiveDate) -> NaiveDateTime {
        self.end_on(date) - Duration::minutes(self.early_exit_grace_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day_shift() -> Shift {
        Shift {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            name: "General".to_string(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            late_grace_minutes: 15,
            early_exit_grace_minutes: 10,
            overtime_rule: Some(OvertimeRule {
                minimum_minutes: 30,
                multiplier: dec!(1.5),
            }),
        }
    }

    fn night_shift() -> Shift {
        Shift {
            start_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            name: "Night A".to_string(),
            ..day_shift()
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
    }

    #[test]
    fn day_shift_does_not_wrap() {
        assert!(!day_shift().wraps_midnight());
        assert_eq!(
            day_shift().end_on(date()),
            date().and_hms_opt(17, 0, 0).unwrap()
        );
    }

    #[test]
    fn night_shift_ends_next_day() {
        let shift = night_shift();
        assert!(shift.wraps_midnight());
        let end = shift.end_on(date());
        assert_eq!(end.date(), date().succ_opt().unwrap());
        assert_eq!(end.time(), NaiveTime::from_hms_opt(6, 0, 0).unwrap());
    }

    #[test]
    fn late_threshold_includes_grace() {
        assert_eq!(
            day_shift().late_threshold_on(date()),
            date().and_hms_opt(9, 15, 0).unwrap()
        );
    }

    #[test]
    fn early_exit_threshold_subtracts_grace() {
        assert_eq!(
            day_shift().early_exit_threshold_on(date()),
            date().and_hms_opt(16, 50, 0).unwrap()
        );
    }

    #[test]
    fn shift_round_trips_through_json() {
        let shift = day_shift();
        let json = serde_json::to_string(&shift).unwrap();
        let back: Shift = serde_json::from_str(&json).unwrap();
        assert_eq!(shift, back);
    }
}
