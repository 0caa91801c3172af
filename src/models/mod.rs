//! Core data models for the attendance and payroll engine.
//!
//! This module contains all the domain types used throughout the engine,
//! plus the structured outcome types returned by batch operations.

mod attendance;
mod employee;
mod geofence;
mod holiday;
mod leave;
mod outcome;
mod payroll;
mod shift;

pub use attendance::{AttendanceRecord, AttendanceStatus, EventSource, RawAttendanceEvent};
pub use employee::{Employee, EmployeeStatus};
pub use geofence::{EmployeeFenceAssignment, GeoFence, GeoPoint};
pub use holiday::Holiday;
pub use leave::LeaveBalance;
pub use outcome::{
    AttendanceBatchOutcome, EmployeeError, ImportOutcome, LocationCheck, PayrollRunOutcome,
};
pub use payroll::{
    OVERTIME_ALLOWANCE_KEY, PayComponents, PaymentStatus, PayrollRecord, SalaryStructure,
    component_total,
};
pub use shift::{OvertimeRule, Shift};
