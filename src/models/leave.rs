//! Leave balance model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Leave entitlement state for one (employee, leave-type, year).
///
/// The payroll engine only reads these; the leave-approval workflow owns the
/// mutations. A missing balance record is read as all-zero, never as an
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// The employee the balance belongs to.
    pub employee_id: Uuid,
    /// The leave type ("casual", "sick", ...), keyed by id.
    pub leave_type_id: Uuid,
    /// The entitlement year.
    pub year: i32,
    /// Total entitled days for the year. Fractional values cover half-days.
    pub total: Decimal,
    /// Days already taken.
    pub used: Decimal,
    /// Days requested but not yet approved.
    pub pending: Decimal,
}

impl LeaveBalance {
    /// The all-zero balance used when no record exists.
    pub fn zero(employee_id: Uuid, leave_type_id: Uuid, year: i32) -> Self {
        Self {
            employee_id,
            leave_type_id,
            year,
            total: Decimal::ZERO,
            used: Decimal::ZERO,
            pending: Decimal::ZERO,
        }
    }

    /// Days still available: total minus used minus pending.
    pub fn available(&self) -> Decimal {
        self.total - self.used - self.pending
    }
}
