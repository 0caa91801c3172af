//! Salary structures and payroll records.
//!
//! Pay components (allowances, deductions, bonuses, adjustments) are ordered
//! maps from component name to decimal amount. Summation over a map is
//! order-independent; the ordering only matters for display.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named bag of pay components.
pub type PayComponents = BTreeMap<String, Decimal>;

/// Reserved allowance key under which computed overtime pay is recorded.
pub const OVERTIME_ALLOWANCE_KEY: &str = "overtime_pay";

/// Sums the amounts of a component map.
pub fn component_total(components: &PayComponents) -> Decimal {
    components.values().copied().sum()
}

/// An employee's salary configuration.
///
/// At most one structure is active per employee at a time; activating a new
/// one supersedes (deactivates, never deletes) the prior one, so payroll
/// already computed from the old structure is unaffected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryStructure {
    /// Unique identifier for the structure.
    pub id: Uuid,
    /// The employee this structure belongs to.
    pub employee_id: Uuid,
    /// Monthly basic salary before pro-ration.
    pub basic_salary: Decimal,
    /// Named monthly allowances.
    #[serde(default)]
    pub allowances: PayComponents,
    /// Named monthly deductions.
    #[serde(default)]
    pub deductions: PayComponents,
    /// First day this structure applies.
    pub effective_from: NaiveDate,
    /// Last day this structure applies, open-ended when `None`.
    pub effective_to: Option<NaiveDate>,
    /// Whether this is the employee's current structure.
    pub is_active: bool,
}

/// Payment lifecycle of a payroll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Computed, awaiting approval.
    Pending,
    /// Approved for payment.
    Processed,
    /// Disbursed.
    Paid,
}

/// One row per (employee, month, year).
///
/// Created by the payroll engine with status `pending`; bonuses, adjustments
/// and the payment status are mutated afterward by the approval step, which
/// must go through [`PayrollRecord::recompute_totals`] so gross and net are
/// always derived from the component totals rather than incremented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The organization the record belongs to.
    pub organization_id: Uuid,
    /// The employee this record pays.
    pub employee_id: Uuid,
    /// Month of the period, 1-12.
    pub month: u32,
    /// Year of the period.
    pub year: i32,
    /// Working days in the period (weekends and holidays excluded).
    pub working_days: u32,
    /// Days the employee was present (PRESENT or LATE).
    pub present_days: u32,
    /// Days covered by LEAVE attendance records.
    pub leave_days: u32,
    /// Overtime worked over the month, in hours.
    pub overtime_hours: Decimal,
    /// Flat penalty total accrued from late occurrences.
    pub late_penalties: Decimal,
    /// Pro-rated basic pay.
    pub basic: Decimal,
    /// Allowances, including computed overtime pay under
    /// [`OVERTIME_ALLOWANCE_KEY`].
    pub allowances: PayComponents,
    /// Deductions from the salary structure.
    pub deductions: PayComponents,
    /// Approval-stage bonuses; empty at creation.
    #[serde(default)]
    pub bonuses: PayComponents,
    /// Approval-stage adjustments (values may be negative); empty at
    /// creation.
    #[serde(default)]
    pub adjustments: PayComponents,
    /// Pro-rated basic plus allowance, bonus and adjustment totals.
    pub gross: Decimal,
    /// Gross minus deduction total and late penalties.
    pub net: Decimal,
    /// Payment lifecycle state.
    pub payment_status: PaymentStatus,
}

impl PayrollRecord {
    /// Recomputes `gross` and `net` from the current component maps.
    ///
    /// Always a full recomputation, never an increment: repeated partial
    /// updates to bonuses or adjustments would otherwise drift the totals.
    /// Results are rounded to two decimal places.
    pub fn recompute_totals(&mut self) {
        let allowance_total = component_total(&self.allowances);
        let bonus_total = component_total(&self.bonuses);
        let adjustment_total = component_total(&self.adjustments);
        let deduction_total = component_total(&self.deductions) + self.late_penalties;

        self.gross = (self.basic + allowance_total + bonus_total + adjustment_total).round_dp(2);
        self.net = (self.gross - deduction_total).round_dp(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_record() -> PayrollRecord {
        PayrollRecord {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            month: 3,
            year: 2026,
            working_days: 22,
            present_days: 20,
            leave_days: 0,
            overtime_hours: Decimal::ZERO,
            late_penalties: Decimal::ZERO,
            basic: dec!(20000),
            allowances: PayComponents::new(),
            deductions: PayComponents::new(),
            bonuses: PayComponents::new(),
            adjustments: PayComponents::new(),
            gross: Decimal::ZERO,
            net: Decimal::ZERO,
            payment_status: PaymentStatus::Pending,
        }
    }

    #[test]
    fn component_total_is_order_independent() {
        let mut forward = PayComponents::new();
        forward.insert("house_rent".to_string(), dec!(5000));
        forward.insert("medical".to_string(), dec!(1200));
        forward.insert("transport".to_string(), dec!(800));

        let mut reversed = PayComponents::new();
        reversed.insert("transport".to_string(), dec!(800));
        reversed.insert("medical".to_string(), dec!(1200));
        reversed.insert("house_rent".to_string(), dec!(5000));

        assert_eq!(component_total(&forward), dec!(7000));
        assert_eq!(component_total(&forward), component_total(&reversed));
    }

    #[test]
    fn recompute_totals_derives_gross_and_net() {
        let mut record = base_record();
        record.allowances.insert("medical".to_string(), dec!(1500));
        record.deductions.insert("pf".to_string(), dec!(600));
        record.late_penalties = dec!(200);
        record.recompute_totals();

        assert_eq!(record.gross, dec!(21500));
        assert_eq!(record.net, dec!(20700));
    }

    #[test]
    fn recompute_totals_does_not_drift_when_repeated() {
        let mut record = base_record();
        record.bonuses.insert("festival".to_string(), dec!(3000));
        record.recompute_totals();
        let (gross, net) = (record.gross, record.net);

        // A second recomputation over the same components is a no-op.
        record.recompute_totals();
        assert_eq!(record.gross, gross);
        assert_eq!(record.net, net);
    }

    #[test]
    fn negative_adjustments_reduce_gross() {
        let mut record = base_record();
        record
            .adjustments
            .insert("advance_recovery".to_string(), dec!(-1000));
        record.recompute_totals();
        assert_eq!(record.gross, dec!(19000));
        assert_eq!(record.net, dec!(19000));
    }

    #[test]
    fn payment_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Paid).unwrap(),
            "\"paid\""
        );
    }
}
