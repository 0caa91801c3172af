//! In-memory implementation of the storage seams.
//!
//! Backs the test suites and embedded/demo use. Uniqueness keys are enforced
//! the way a database's unique constraints would be: attendance by
//! (employee, date), payroll by (employee, month, year).

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, Employee, EmployeeFenceAssignment, GeoFence, Holiday, LeaveBalance,
    PayrollRecord, RawAttendanceEvent, SalaryStructure, Shift,
};

use super::{AttendanceStore, EventStore, LeaveLedger, OrgDirectory, PayrollStore};

#[derive(Debug, Default)]
struct Inner {
    employees: HashMap<Uuid, Employee>,
    shifts: HashMap<Uuid, Shift>,
    fences: HashMap<Uuid, GeoFence>,
    assignments: Vec<EmployeeFenceAssignment>,
    holidays: Vec<Holiday>,
    salaries: Vec<SalaryStructure>,
    leave_balances: Vec<LeaveBalance>,
    events: Vec<RawAttendanceEvent>,
    attendance: HashMap<(Uuid, NaiveDate), AttendanceRecord>,
    payroll: HashMap<(Uuid, u32, i32), PayrollRecord>,
}

/// An in-memory store implementing every seam the engine consumes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| EngineError::Storage {
            message: "memory store lock poisoned".to_string(),
        })
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|_| EngineError::Storage {
            message: "memory store lock poisoned".to_string(),
        })
    }

    /// Adds or replaces an employee.
    pub fn put_employee(&self, employee: Employee) -> EngineResult<()> {
        self.write()?.employees.insert(employee.id, employee);
        Ok(())
    }

    /// Adds or replaces a shift.
    pub fn put_shift(&self, shift: Shift) -> EngineResult<()> {
        self.write()?.shifts.insert(shift.id, shift);
        Ok(())
    }

    /// Adds or replaces a fence.
    pub fn put_fence(&self, fence: GeoFence) -> EngineResult<()> {
        self.write()?.fences.insert(fence.id, fence);
        Ok(())
    }

    /// Assigns a fence to an employee.
    pub fn assign_fence(&self, assignment: EmployeeFenceAssignment) -> EngineResult<()> {
        self.write()?.assignments.push(assignment);
        Ok(())
    }

    /// Adds a holiday calendar entry.
    pub fn put_holiday(&self, holiday: Holiday) -> EngineResult<()> {
        self.write()?.holidays.push(holiday);
        Ok(())
    }

    /// Adds a salary structure. Activating a new structure supersedes any
    /// prior active structure for the same employee (deactivation, not
    /// deletion).
    pub fn put_salary_structure(&self, structure: SalaryStructure) -> EngineResult<()> {
        let mut inner = self.write()?;
        if structure.is_active {
            for existing in inner
                .salaries
                .iter_mut()
                .filter(|s| s.employee_id == structure.employee_id && s.is_active)
            {
                existing.is_active = false;
            }
        }
        inner.salaries.push(structure);
        Ok(())
    }

    /// Adds or replaces a leave balance.
    pub fn put_leave_balance(&self, balance: LeaveBalance) -> EngineResult<()> {
        let mut inner = self.write()?;
        inner.leave_balances.retain(|b| {
            !(b.employee_id == balance.employee_id
                && b.leave_type_id == balance.leave_type_id
                && b.year == balance.year)
        });
        inner.leave_balances.push(balance);
        Ok(())
    }

    fn fences_by_ids(inner: &Inner, ids: &[Uuid]) -> Vec<GeoFence> {
        ids.iter()
            .filter_map(|id| inner.fences.get(id))
            .filter(|f| f.active)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl OrgDirectory for MemoryStore {
    async fn employee(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
    ) -> EngineResult<Option<Employee>> {
        let inner = self.read()?;
        Ok(inner
            .employees
            .get(&employee_id)
            .filter(|e| e.organization_id == organization_id)
            .cloned())
    }

    async fn employee_by_code(
        &self,
        organization_id: Uuid,
        code: &str,
    ) -> EngineResult<Option<Employee>> {
        let inner = self.read()?;
        Ok(inner
            .employees
            .values()
            .find(|e| e.organization_id == organization_id && e.code == code)
            .cloned())
    }

    async fn active_employees(&self, organization_id: Uuid) -> EngineResult<Vec<Employee>> {
        let inner = self.read()?;
        let mut employees: Vec<Employee> = inner
            .employees
            .values()
            .filter(|e| e.organization_id == organization_id && e.is_active())
            .cloned()
            .collect();
        employees.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(employees)
    }

    async fn shift(&self, organization_id: Uuid, shift_id: Uuid) -> EngineResult<Option<Shift>> {
        let inner = self.read()?;
        Ok(inner
            .shifts
            .get(&shift_id)
            .filter(|s| s.organization_id == organization_id)
            .cloned())
    }

    async fn shift_by_name(
        &self,
        organization_id: Uuid,
        name: &str,
    ) -> EngineResult<Option<Shift>> {
        let inner = self.read()?;
        Ok(inner
            .shifts
            .values()
            .find(|s| s.organization_id == organization_id && s.name == name)
            .cloned())
    }

    async fn active_fences(&self, organization_id: Uuid) -> EngineResult<Vec<GeoFence>> {
        let inner = self.read()?;
        Ok(inner
            .fences
            .values()
            .filter(|f| f.organization_id == organization_id && f.active)
            .cloned()
            .collect())
    }

    async fn assigned_fences(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
    ) -> EngineResult<Vec<GeoFence>> {
        let inner = self.read()?;
        let ids: Vec<Uuid> = inner
            .assignments
            .iter()
            .filter(|a| a.employee_id == employee_id)
            .map(|a| a.fence_id)
            .collect();
        Ok(Self::fences_by_ids(&inner, &ids)
            .into_iter()
            .filter(|f| f.organization_id == organization_id)
            .collect())
    }

    async fn holidays_in_month(
        &self,
        organization_id: Uuid,
        year: i32,
        month: u32,
    ) -> EngineResult<Vec<Holiday>> {
        let inner = self.read()?;
        Ok(inner
            .holidays
            .iter()
            .filter(|h| {
                h.organization_id == organization_id
                    && h.date.year() == year
                    && h.date.month() == month
            })
            .cloned()
            .collect())
    }

    async fn is_holiday(&self, organization_id: Uuid, date: NaiveDate) -> EngineResult<bool> {
        let inner = self.read()?;
        Ok(inner
            .holidays
            .iter()
            .any(|h| h.organization_id == organization_id && h.date == date))
    }

    async fn active_salary_structure(
        &self,
        _organization_id: Uuid,
        employee_id: Uuid,
    ) -> EngineResult<Option<SalaryStructure>> {
        let inner = self.read()?;
        Ok(inner
            .salaries
            .iter()
            .find(|s| s.employee_id == employee_id && s.is_active)
            .cloned())
    }

    async fn active_salary_structures(
        &self,
        organization_id: Uuid,
    ) -> EngineResult<Vec<SalaryStructure>> {
        let inner = self.read()?;
        Ok(inner
            .salaries
            .iter()
            .filter(|s| {
                s.is_active
                    && inner
                        .employees
                        .get(&s.employee_id)
                        .is_some_and(|e| e.organization_id == organization_id)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn append(&self, event: RawAttendanceEvent) -> EngineResult<()> {
        self.write()?.events.push(event);
        Ok(())
    }

    async fn events_on(
        &self,
        organization_id: Uuid,
        date: NaiveDate,
    ) -> EngineResult<Vec<RawAttendanceEvent>> {
        let inner = self.read()?;
        let mut events: Vec<RawAttendanceEvent> = inner
            .events
            .iter()
            .filter(|e| e.organization_id == organization_id && e.timestamp.date() == date)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }

    async fn events_for_employee_on(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> EngineResult<Vec<RawAttendanceEvent>> {
        let mut events = self.events_on(organization_id, date).await?;
        events.retain(|e| e.employee_id == Some(employee_id));
        Ok(events)
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn upsert(&self, record: AttendanceRecord) -> EngineResult<()> {
        self.write()?
            .attendance
            .insert((record.employee_id, record.date), record);
        Ok(())
    }

    async fn upsert_bulk(&self, records: Vec<AttendanceRecord>) -> EngineResult<()> {
        let mut inner = self.write()?;
        for record in records {
            inner
                .attendance
                .insert((record.employee_id, record.date), record);
        }
        Ok(())
    }

    async fn get(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> EngineResult<Option<AttendanceRecord>> {
        let inner = self.read()?;
        Ok(inner
            .attendance
            .get(&(employee_id, date))
            .filter(|r| r.organization_id == organization_id)
            .cloned())
    }

    async fn month_records(
        &self,
        organization_id: Uuid,
        year: i32,
        month: u32,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        let inner = self.read()?;
        Ok(inner
            .attendance
            .values()
            .filter(|r| {
                r.organization_id == organization_id
                    && r.date.year() == year
                    && r.date.month() == month
            })
            .cloned()
            .collect())
    }

    async fn insert_new(&self, records: Vec<AttendanceRecord>) -> EngineResult<()> {
        let mut inner = self.write()?;
        // Reject the whole batch before touching anything, like a unique
        // constraint inside one transaction would.
        for record in &records {
            if inner
                .attendance
                .contains_key(&(record.employee_id, record.date))
            {
                return Err(EngineError::duplicate_attendance(
                    record.employee_id,
                    record.date,
                ));
            }
        }
        for record in records {
            inner
                .attendance
                .insert((record.employee_id, record.date), record);
        }
        Ok(())
    }
}

#[async_trait]
impl PayrollStore for MemoryStore {
    async fn exists(
        &self,
        _organization_id: Uuid,
        employee_id: Uuid,
        month: u32,
        year: i32,
    ) -> EngineResult<bool> {
        let inner = self.read()?;
        Ok(inner.payroll.contains_key(&(employee_id, month, year)))
    }

    async fn existing_periods(
        &self,
        organization_id: Uuid,
        month: u32,
        year: i32,
    ) -> EngineResult<Vec<Uuid>> {
        let inner = self.read()?;
        Ok(inner
            .payroll
            .values()
            .filter(|r| {
                r.organization_id == organization_id && r.month == month && r.year == year
            })
            .map(|r| r.employee_id)
            .collect())
    }

    async fn get(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
        month: u32,
        year: i32,
    ) -> EngineResult<Option<PayrollRecord>> {
        let inner = self.read()?;
        Ok(inner
            .payroll
            .get(&(employee_id, month, year))
            .filter(|r| r.organization_id == organization_id)
            .cloned())
    }

    async fn insert_bulk(&self, records: Vec<PayrollRecord>) -> EngineResult<()> {
        let mut inner = self.write()?;
        for record in &records {
            if inner
                .payroll
                .contains_key(&(record.employee_id, record.month, record.year))
            {
                return Err(EngineError::duplicate_payroll(
                    record.employee_id,
                    record.month,
                    record.year,
                ));
            }
        }
        for record in records {
            inner
                .payroll
                .insert((record.employee_id, record.month, record.year), record);
        }
        Ok(())
    }

    async fn replace(&self, record: PayrollRecord) -> EngineResult<()> {
        self.write()?
            .payroll
            .insert((record.employee_id, record.month, record.year), record);
        Ok(())
    }
}

#[async_trait]
impl LeaveLedger for MemoryStore {
    async fn balance(
        &self,
        employee_id: Uuid,
        leave_type_id: Uuid,
        year: i32,
    ) -> EngineResult<Option<LeaveBalance>> {
        let inner = self.read()?;
        Ok(inner
            .leave_balances
            .iter()
            .find(|b| {
                b.employee_id == employee_id && b.leave_type_id == leave_type_id && b.year == year
            })
            .cloned())
    }

    async fn balances_for_year(
        &self,
        employee_id: Uuid,
        year: i32,
    ) -> EngineResult<Vec<LeaveBalance>> {
        let inner = self.read()?;
        Ok(inner
            .leave_balances
            .iter()
            .filter(|b| b.employee_id == employee_id && b.year == year)
            .cloned()
            .collect())
    }
}
