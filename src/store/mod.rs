//! Storage seams between the engine and the host application.
//!
//! The engine never talks to a database directly; it consumes these traits.
//! Configuration tables (employees, shifts, fences, holidays, salary
//! structures, leave balances) are read-only during a run. The engine writes
//! only attendance and payroll records, and those writes are scoped by their
//! uniqueness keys — (employee, date) and (employee, month, year) — so
//! concurrent workers on different employees never contend on the same row.
//!
//! Upsert and insert-or-skip are deliberately separate operations: the daily
//! classifier replaces on re-run (idempotent), while bulk import and payroll
//! refuse to overwrite existing records. These encode different business
//! intents and must not be unified.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{
    AttendanceRecord, Employee, GeoFence, Holiday, LeaveBalance, PayrollRecord,
    RawAttendanceEvent, SalaryStructure, Shift,
};

/// Read-only access to organization configuration.
#[async_trait]
pub trait OrgDirectory: Send + Sync {
    /// Looks up an employee within an organization.
    async fn employee(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
    ) -> EngineResult<Option<Employee>>;

    /// Resolves an employee by the human-assigned code used in imports.
    async fn employee_by_code(
        &self,
        organization_id: Uuid,
        code: &str,
    ) -> EngineResult<Option<Employee>>;

    /// All active employees of an organization.
    async fn active_employees(&self, organization_id: Uuid) -> EngineResult<Vec<Employee>>;

    /// Looks up a shift within an organization.
    async fn shift(&self, organization_id: Uuid, shift_id: Uuid) -> EngineResult<Option<Shift>>;

    /// Resolves a shift by display name, as used in import rows.
    async fn shift_by_name(
        &self,
        organization_id: Uuid,
        name: &str,
    ) -> EngineResult<Option<Shift>>;

    /// All active organization-wide fences.
    async fn active_fences(&self, organization_id: Uuid) -> EngineResult<Vec<GeoFence>>;

    /// The active fences explicitly assigned to an employee. When this is
    /// non-empty, validation must not consider the organization-wide set.
    async fn assigned_fences(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
    ) -> EngineResult<Vec<GeoFence>>;

    /// Holiday calendar entries for one month.
    async fn holidays_in_month(
        &self,
        organization_id: Uuid,
        year: i32,
        month: u32,
    ) -> EngineResult<Vec<Holiday>>;

    /// Whether a date is in the organization's holiday calendar.
    async fn is_holiday(&self, organization_id: Uuid, date: NaiveDate) -> EngineResult<bool>;

    /// The employee's active salary structure, if any.
    async fn active_salary_structure(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
    ) -> EngineResult<Option<SalaryStructure>>;

    /// Every active salary structure in the organization, for payroll runs.
    /// At most one per employee (activation supersedes).
    async fn active_salary_structures(
        &self,
        organization_id: Uuid,
    ) -> EngineResult<Vec<SalaryStructure>>;
}

/// Append-only log of raw punches.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends one punch. Events are never updated or deleted.
    async fn append(&self, event: RawAttendanceEvent) -> EngineResult<()>;

    /// All punches of an organization on one date, for batch classification.
    async fn events_on(
        &self,
        organization_id: Uuid,
        date: NaiveDate,
    ) -> EngineResult<Vec<RawAttendanceEvent>>;

    /// One employee's punches on one date, ordered by timestamp.
    async fn events_for_employee_on(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> EngineResult<Vec<RawAttendanceEvent>>;
}

/// Attendance records keyed uniquely by (employee, date).
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Inserts or replaces the record for its (employee, date) key.
    async fn upsert(&self, record: AttendanceRecord) -> EngineResult<()>;

    /// Replaces a whole batch of records, one per (employee, date) key.
    async fn upsert_bulk(&self, records: Vec<AttendanceRecord>) -> EngineResult<()>;

    /// Fetches the record for one employee-day.
    async fn get(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> EngineResult<Option<AttendanceRecord>>;

    /// Every record of an organization in one month, for payroll
    /// aggregation.
    async fn month_records(
        &self,
        organization_id: Uuid,
        year: i32,
        month: u32,
    ) -> EngineResult<Vec<AttendanceRecord>>;

    /// Inserts records that must not exist yet. Fails with a conflict if
    /// any (employee, date) key is already present; the import path
    /// pre-checks, so a conflict here means a concurrent writer won.
    async fn insert_new(&self, records: Vec<AttendanceRecord>) -> EngineResult<()>;
}

/// Payroll records keyed uniquely by (employee, month, year).
#[async_trait]
pub trait PayrollStore: Send + Sync {
    /// Whether a record exists for the period.
    async fn exists(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
        month: u32,
        year: i32,
    ) -> EngineResult<bool>;

    /// The employees that already have a record for the period, so a run
    /// can screen duplicates in one read.
    async fn existing_periods(
        &self,
        organization_id: Uuid,
        month: u32,
        year: i32,
    ) -> EngineResult<Vec<Uuid>>;

    /// Fetches the record for one employee-period.
    async fn get(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
        month: u32,
        year: i32,
    ) -> EngineResult<Option<PayrollRecord>>;

    /// Commits a payroll run's records together, all-or-nothing. Fails with
    /// a conflict if any (employee, month, year) key already exists.
    async fn insert_bulk(&self, records: Vec<PayrollRecord>) -> EngineResult<()>;

    /// Inserts or replaces one record; the explicit reprocess and
    /// post-approval mutation paths.
    async fn replace(&self, record: PayrollRecord) -> EngineResult<()>;
}

/// Read-only view of leave balances.
///
/// Mutation happens in the leave-approval workflow, outside this core. A
/// missing balance record reads as zero, never as an error.
#[async_trait]
pub trait LeaveLedger: Send + Sync {
    /// The balance for one (employee, leave-type, year), if recorded.
    async fn balance(
        &self,
        employee_id: Uuid,
        leave_type_id: Uuid,
        year: i32,
    ) -> EngineResult<Option<LeaveBalance>>;

    /// All of an employee's balances for a year.
    async fn balances_for_year(
        &self,
        employee_id: Uuid,
        year: i32,
    ) -> EngineResult<Vec<LeaveBalance>>;
}
