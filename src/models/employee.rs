//! Employee model and related types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Employment status of an employee record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Currently employed; eligible for attendance and payroll processing.
    Active,
    /// No longer employed; skipped by all batch runs.
    Inactive,
}

/// An employee as this core sees it.
///
/// The surrounding HR application owns the full employee profile; the engine
/// only consumes the fields that drive classification and payroll: the
/// organization scope, the import-reconciliation code, the assigned shift and
/// the employment status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: Uuid,
    /// The organization this employee belongs to.
    pub organization_id: Uuid,
    /// Human-assigned code (badge/payroll number), used to reconcile
    /// bulk-imported rows.
    pub code: String,
    /// Display name.
    pub name: String,
    /// The shift currently assigned to this employee, if any.
    pub shift_id: Option<Uuid>,
    /// Employment status.
    pub status: EmployeeStatus,
}

impl Employee {
    /// Returns true if the employee is active.
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}
