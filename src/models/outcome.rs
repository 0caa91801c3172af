//! Structured outcomes returned by the engine's operations.
//!
//! Batch operations never abort on a single bad item: they always return a
//! success count together with a list of per-item failure descriptions, and
//! the caller decides whether any failure is fatal.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of validating a check-in location against the candidate fences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCheck {
    /// Whether the point was accepted.
    pub is_valid: bool,
    /// Distance in meters to the matched fence's center when valid, or to
    /// the nearest fence when not. Zero when no fences are configured.
    pub distance_meters: f64,
    /// The fence that accepted the point, when valid.
    pub matched_fence_id: Option<Uuid>,
    /// The closest fence, reported on rejection so the caller can present a
    /// helpful error.
    pub nearest_fence_id: Option<Uuid>,
}

/// A per-employee failure inside a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeError {
    /// The employee whose item failed.
    pub employee_id: Uuid,
    /// Description of the failure.
    pub message: String,
}

/// Result of a daily attendance batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceBatchOutcome {
    /// Number of employee-days classified and persisted.
    pub processed: usize,
    /// Per-employee failures; never aborts the rest of the batch.
    pub errors: Vec<EmployeeError>,
}

/// Result of a bulk attendance import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    /// Rows inserted.
    pub success: usize,
    /// Rows skipped with a recorded reason (unresolvable employee code,
    /// pre-existing record, in-batch duplicate).
    pub skipped: usize,
    /// Data rows seen, including rows that failed to parse.
    pub total: usize,
    /// Row-level messages for everything not inserted.
    pub errors: Vec<String>,
}

/// Result of a monthly payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRunOutcome {
    /// Number of payroll records committed.
    pub processed: usize,
    /// Identifiers of the committed records.
    pub payroll_ids: Vec<Uuid>,
    /// Per-employee failures and skips.
    pub errors: Vec<EmployeeError>,
}
