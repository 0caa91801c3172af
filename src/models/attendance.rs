//! Raw attendance events and daily attendance records.
//!
//! Raw events are append-only: the classifier reads them, never updates or
//! deletes them. One [`AttendanceRecord`] exists per (employee, date); the
//! classifier replaces it on re-runs, bulk import refuses to overwrite it.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::GeoPoint;

/// Where a raw punch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSource {
    /// Fingerprint/face terminal on premises.
    Biometric,
    /// Mobile app punch, normally geo-fence checked.
    Mobile,
    /// Web portal punch.
    Web,
    /// Entered by an administrator.
    Manual,
    /// Produced by the bulk import normalizer.
    Import,
}

/// A raw time-clock punch.
///
/// Multiple events per employee per day are expected: the first becomes the
/// check-in, the last becomes the check-out, and middle punches are ignored
/// by the default classification policy. That is a deliberate, tested
/// simplification, not an oversight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAttendanceEvent {
    /// The organization the punch belongs to.
    pub organization_id: Uuid,
    /// The employee who punched. `None` until an imported or unmatched
    /// device event has been reconciled.
    pub employee_id: Option<Uuid>,
    /// When the punch happened.
    pub timestamp: NaiveDateTime,
    /// The capture channel.
    pub source: EventSource,
    /// Where the punch happened, when the channel reports coordinates.
    pub location: Option<GeoPoint>,
    /// Opaque device identifier, when the channel reports one.
    pub device_fingerprint: Option<String>,
}

/// Classification of one employee-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    /// Checked in on time (or no shift configured to judge lateness by).
    Present,
    /// No punches on a working day.
    Absent,
    /// Checked in after shift start plus the late-grace buffer.
    Late,
    /// Half-day leave; written by the leave-approval workflow, never
    /// produced by the classifier.
    HalfDay,
    /// Approved leave; written by the leave-approval workflow.
    Leave,
    /// Organization holiday with no punches.
    Holiday,
}

impl FromStr for AttendanceStatus {
    type Err = ();

    /// Case-insensitive parse of the status column used by bulk imports.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PRESENT" => Ok(Self::Present),
            "ABSENT" => Ok(Self::Absent),
            "LATE" => Ok(Self::Late),
            "HALF_DAY" => Ok(Self::HalfDay),
            "LEAVE" => Ok(Self::Leave),
            "HOLIDAY" => Ok(Self::Holiday),
            _ => Err(()),
        }
    }
}

/// One row per (employee, date) — re-classifying the same day replaces the
/// record rather than duplicating it.
///
/// Created by the daily classifier or the bulk importer; read-only to the
/// payroll engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// The organization the record belongs to.
    pub organization_id: Uuid,
    /// The employee this record classifies.
    pub employee_id: Uuid,
    /// The day this record classifies.
    pub date: NaiveDate,
    /// The shift in effect on that day, if one was configured.
    pub shift_id: Option<Uuid>,
    /// Earliest punch of the day.
    pub check_in: Option<NaiveDateTime>,
    /// Latest punch of the day. `None` when the day had fewer than two
    /// punches: a single punch yields no check-out.
    pub check_out: Option<NaiveDateTime>,
    /// The classification outcome.
    pub status: AttendanceStatus,
    /// Whole minutes checked in after the late threshold; zero when on time.
    pub late_minutes: i64,
    /// Whole minutes checked out before the early-exit threshold.
    pub early_exit_minutes: i64,
    /// Whole minutes worked past shift end, if they met the shift's
    /// overtime rule. Never negative.
    pub overtime_minutes: i64,
}
