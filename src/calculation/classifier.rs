//! Daily attendance classification.
//!
//! For one employee-day, turns the set of raw punches (or the absence of
//! them) into exactly one attendance record. The function is pure and
//! deterministic: re-classifying the same day with the same inputs yields
//! the same record, which is what makes the upsert path idempotent.

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::models::{AttendanceRecord, AttendanceStatus, RawAttendanceEvent, Shift};

/// Everything the classifier needs to know about one employee-day.
#[derive(Debug, Clone)]
pub struct DayContext<'a> {
    /// The organization scope.
    pub organization_id: Uuid,
    /// The employee being classified.
    pub employee_id: Uuid,
    /// The day being classified.
    pub date: NaiveDate,
    /// The shift in effect on that day, if one is configured.
    pub shift: Option<&'a Shift>,
    /// That employee-day's raw punches.
    pub events: &'a [RawAttendanceEvent],
    /// Whether the date is in the organization's holiday calendar.
    pub is_holiday: bool,
}

/// Classifies one employee-day.
///
/// The first punch of the day is the check-in and the last punch is the
/// check-out; middle punches are ignored. A single punch yields no
/// check-out, and status then derives from the check-in alone.
///
/// Without a shift, lateness cannot be evaluated and any punch means
/// PRESENT. With a shift, a check-in after start plus the late-grace buffer
/// is LATE, with the overrun recorded in whole minutes (floored). Overtime
/// is recorded only when the check-out exceeds shift end by at least the
/// shift rule's minimum qualifying minutes; it is never negative. An early
/// check-out before shift end minus the early-exit grace records the
/// shortfall without changing the status.
///
/// A day with no punches is ABSENT, or HOLIDAY when the date is in the
/// organization's holiday calendar.
pub fn classify_day(ctx: &DayContext<'_>) -> AttendanceRecord {
    let mut record = AttendanceRecord {
        organization_id: ctx.organization_id,
        employee_id: ctx.employee_id,
        date: ctx.date,
        shift_id: ctx.shift.map(|s| s.id),
        check_in: None,
        check_out: None,
        status: if ctx.is_holiday {
            AttendanceStatus::Holiday
        } else {
            AttendanceStatus::Absent
        },
        late_minutes: 0,
        early_exit_minutes: 0,
        overtime_minutes: 0,
    };

    let Some(check_in) = ctx.events.iter().map(|e| e.timestamp).min() else {
        return record;
    };
    let check_out = if ctx.events.len() > 1 {
        ctx.events.iter().map(|e| e.timestamp).max()
    } else {
        None
    };

    record.check_in = Some(check_in);
    record.check_out = check_out;
    record.status = AttendanceStatus::Present;

    let Some(shift) = ctx.shift else {
        // No shift configured: lateness cannot be evaluated.
        return record;
    };

    let late_threshold = shift.late_threshold_on(ctx.date);
    if check_in > late_threshold {
        record.status = AttendanceStatus::Late;
        record.late_minutes = whole_minutes_between(late_threshold, check_in);
    }

    if let Some(out) = check_out {
        let shift_end = shift.end_on(ctx.date);
        if out > shift_end {
            let overtime = whole_minutes_between(shift_end, out);
            let qualifying = shift
                .overtime_rule
                .as_ref()
                .map(|rule| rule.minimum_minutes)
                .unwrap_or(0);
            if overtime >= qualifying {
                record.overtime_minutes = overtime;
            }
        }

        let early_threshold = shift.early_exit_threshold_on(ctx.date);
        if out < early_threshold {
            record.early_exit_minutes = whole_minutes_between(out, early_threshold);
        }
    }

    record
}

/// Whole minutes from `earlier` to `later`, floored. Callers guarantee the
/// ordering, so the result is never negative.
fn whole_minutes_between(earlier: NaiveDateTime, later: NaiveDateTime) -> i64 {
    (later - earlier).num_minutes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventSource, OvertimeRule};
    use chrono::NaiveTime;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
    }

    fn shift() -> Shift {
        Shift {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            name: "General".to_string(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            late_grace_minutes: 15,
            early_exit_grace_minutes: 0,
            overtime_rule: Some(OvertimeRule {
                minimum_minutes: 0,
                multiplier: dec!(1.5),
            }),
        }
    }

    fn punch(hour: u32, minute: u32) -> RawAttendanceEvent {
        RawAttendanceEvent {
            organization_id: Uuid::new_v4(),
            employee_id: Some(Uuid::new_v4()),
            timestamp: date().and_hms_opt(hour, minute, 0).unwrap(),
            source: EventSource::Biometric,
            location: None,
            device_fingerprint: None,
        }
    }

    fn ctx<'a>(
        shift: Option<&'a Shift>,
        events: &'a [RawAttendanceEvent],
        is_holiday: bool,
    ) -> DayContext<'a> {
        DayContext {
            organization_id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            date: date(),
            shift,
            events,
            is_holiday,
        }
    }

    #[test]
    fn no_events_is_absent_with_zero_durations() {
        let s = shift();
        let record = classify_day(&ctx(Some(&s), &[], false));
        assert_eq!(record.status, AttendanceStatus::Absent);
        assert_eq!(record.check_in, None);
        assert_eq!(record.check_out, None);
        assert_eq!(record.late_minutes, 0);
        assert_eq!(record.early_exit_minutes, 0);
        assert_eq!(record.overtime_minutes, 0);
    }

    #[test]
    fn no_events_on_a_holiday_is_holiday() {
        let s = shift();
        let record = classify_day(&ctx(Some(&s), &[], true));
        assert_eq!(record.status, AttendanceStatus::Holiday);
    }

    #[test]
    fn single_punch_has_no_check_out() {
        let s = shift();
        let events = [punch(9, 5)];
        let record = classify_day(&ctx(Some(&s), &events, false));
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.check_in, Some(date().and_hms_opt(9, 5, 0).unwrap()));
        assert_eq!(record.check_out, None);
    }

    #[test]
    fn middle_punches_are_ignored() {
        let s = shift();
        let events = [punch(9, 0), punch(12, 30), punch(13, 5), punch(17, 0)];
        let record = classify_day(&ctx(Some(&s), &events, false));
        assert_eq!(record.check_in, Some(date().and_hms_opt(9, 0, 0).unwrap()));
        assert_eq!(record.check_out, Some(date().and_hms_opt(17, 0, 0).unwrap()));
    }

    #[test]
    fn check_in_within_grace_is_present() {
        let s = shift();
        let events = [punch(9, 10), punch(17, 0)];
        let record = classify_day(&ctx(Some(&s), &events, false));
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.late_minutes, 0);
    }

    #[test]
    fn check_in_past_grace_is_late_by_the_overrun() {
        let s = shift();
        let events = [punch(9, 20), punch(17, 0)];
        let record = classify_day(&ctx(Some(&s), &events, false));
        assert_eq!(record.status, AttendanceStatus::Late);
        assert_eq!(record.late_minutes, 5);
    }

    #[test]
    fn late_minutes_are_floored_to_whole_minutes() {
        let s = shift();
        let mut late = punch(9, 20);
        late.timestamp = date().and_hms_opt(9, 20, 59).unwrap();
        let events = [late, punch(17, 0)];
        let record = classify_day(&ctx(Some(&s), &events, false));
        assert_eq!(record.late_minutes, 5);
    }

    #[test]
    fn no_shift_means_present_with_zero_durations() {
        let events = [punch(11, 45)];
        let record = classify_day(&ctx(None, &events, false));
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.shift_id, None);
        assert_eq!(record.late_minutes, 0);
        assert_eq!(record.overtime_minutes, 0);
    }

    #[test]
    fn check_out_past_shift_end_records_overtime() {
        let s = shift();
        let events = [punch(9, 0), punch(17, 45)];
        let record = classify_day(&ctx(Some(&s), &events, false));
        assert_eq!(record.overtime_minutes, 45);
    }

    #[test]
    fn check_out_before_shift_end_never_records_negative_overtime() {
        let s = shift();
        let events = [punch(9, 0), punch(16, 50)];
        let record = classify_day(&ctx(Some(&s), &events, false));
        assert_eq!(record.overtime_minutes, 0);
        assert_eq!(record.early_exit_minutes, 10);
    }

    #[test]
    fn overtime_below_qualifying_minimum_is_dropped() {
        let mut s = shift();
        s.overtime_rule = Some(OvertimeRule {
            minimum_minutes: 30,
            multiplier: dec!(1.5),
        });
        let events = [punch(9, 0), punch(17, 20)];
        let record = classify_day(&ctx(Some(&s), &events, false));
        assert_eq!(record.overtime_minutes, 0);

        let events = [punch(9, 0), punch(17, 30)];
        let record = classify_day(&ctx(Some(&s), &events, false));
        assert_eq!(record.overtime_minutes, 30);
    }

    #[test]
    fn early_exit_respects_grace_buffer() {
        let mut s = shift();
        s.early_exit_grace_minutes = 10;
        let events = [punch(9, 0), punch(16, 55)];
        let record = classify_day(&ctx(Some(&s), &events, false));
        // 16:55 is within the 16:50 threshold, so not an early exit.
        assert_eq!(record.early_exit_minutes, 0);

        let events = [punch(9, 0), punch(16, 40)];
        let record = classify_day(&ctx(Some(&s), &events, false));
        assert_eq!(record.early_exit_minutes, 10);
    }

    #[test]
    fn overnight_shift_overtime_is_measured_past_next_day_end() {
        let mut s = shift();
        s.start_time = NaiveTime::from_hms_opt(22, 0, 0).unwrap();
        s.end_time = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
        let next_day = date().succ_opt().unwrap();
        let mut out = punch(0, 0);
        out.timestamp = next_day.and_hms_opt(6, 40, 0).unwrap();
        let events = [punch(22, 0), out];
        let record = classify_day(&ctx(Some(&s), &events, false));
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.overtime_minutes, 40);
    }

    #[test]
    fn classification_is_deterministic() {
        let s = shift();
        let events = [punch(9, 20), punch(17, 45)];
        let first = classify_day(&ctx(Some(&s), &events, false));
        let second = classify_day(&DayContext {
            organization_id: first.organization_id,
            employee_id: first.employee_id,
            date: date(),
            shift: Some(&s),
            events: &events,
            is_holiday: false,
        });
        assert_eq!(first.status, second.status);
        assert_eq!(first.late_minutes, second.late_minutes);
        assert_eq!(first.overtime_minutes, second.overtime_minutes);
        assert_eq!(first.check_in, second.check_in);
        assert_eq!(first.check_out, second.check_out);
    }
}
