//! Monthly payroll computation.
//!
//! Aggregates a month of attendance records with the salary structure and
//! working-day count into one payroll record: pro-rated basic, overtime pay
//! under a reserved allowance key, flat late penalties, and gross/net
//! totals. All money is `Decimal`; persisted figures are rounded to two
//! decimal places.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::PayrollPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, AttendanceStatus, Employee, OVERTIME_ALLOWANCE_KEY, PayComponents,
    PaymentStatus, PayrollRecord, SalaryStructure,
};

/// Attendance figures aggregated over one employee-month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttendanceTotals {
    /// Days with status PRESENT or LATE.
    pub present_days: u32,
    /// Days with status LEAVE.
    pub leave_days: u32,
    /// Number of LATE records; each contributes one flat penalty.
    pub late_occurrences: u32,
    /// Sum of overtime minutes across all records.
    pub overtime_minutes: i64,
}

/// Aggregates a month of attendance records.
///
/// Summation is order-independent; records for other statuses (ABSENT,
/// HOLIDAY, HALF_DAY) contribute nothing beyond their overtime minutes,
/// which are always counted.
pub fn aggregate_attendance(records: &[AttendanceRecord]) -> AttendanceTotals {
    let mut totals = AttendanceTotals::default();
    for record in records {
        match record.status {
            AttendanceStatus::Present => totals.present_days += 1,
            AttendanceStatus::Late => {
                totals.present_days += 1;
                totals.late_occurrences += 1;
            }
            AttendanceStatus::Leave => totals.leave_days += 1,
            AttendanceStatus::Absent | AttendanceStatus::HalfDay | AttendanceStatus::Holiday => {}
        }
        totals.overtime_minutes += record.overtime_minutes;
    }
    totals
}

/// Everything the payroll computation needs for one employee-month.
#[derive(Debug, Clone)]
pub struct PayrollInputs<'a> {
    /// The employee being paid.
    pub employee: &'a Employee,
    /// The employee's active salary structure.
    pub salary: &'a SalaryStructure,
    /// The month's attendance records for this employee.
    pub records: &'a [AttendanceRecord],
    /// Working days in the month (weekends and holidays excluded).
    pub working_days: u32,
    /// Month of the period, 1-12.
    pub month: u32,
    /// Year of the period.
    pub year: i32,
    /// Payroll policy in effect.
    pub policy: &'a PayrollPolicy,
}

/// Computes one employee-month of payroll.
///
/// Pro-ration: `daily rate = basic / working days`, pro-rated basic is the
/// daily rate times present days. Overtime pay is
/// `overtime hours x hourly rate x multiplier` with
/// `hourly rate = basic / (working days x standard daily hours)`, recorded
/// into the allowances map under [`OVERTIME_ALLOWANCE_KEY`] only when
/// positive. Each late occurrence adds the policy's flat penalty to the
/// deduction total.
///
/// Zero working days would divide by zero, so it is rejected as a
/// [`EngineError::ComputationHazard`] — a hard per-employee failure, never a
/// NaN in a persisted record.
pub fn compute_payroll(inputs: &PayrollInputs<'_>) -> EngineResult<PayrollRecord> {
    let period = format!("{}-{:02}", inputs.year, inputs.month);
    if inputs.working_days == 0 {
        return Err(EngineError::ComputationHazard {
            employee_id: inputs.employee.id,
            period,
            message: "zero working days in period".to_string(),
        });
    }
    if inputs.policy.standard_daily_hours <= Decimal::ZERO {
        return Err(EngineError::ComputationHazard {
            employee_id: inputs.employee.id,
            period,
            message: "standard daily hours must be positive".to_string(),
        });
    }

    let totals = aggregate_attendance(inputs.records);
    let working_days = Decimal::from(inputs.working_days);
    let basic_salary = inputs.salary.basic_salary;

    let daily_rate = basic_salary / working_days;
    let prorated_basic = (daily_rate * Decimal::from(totals.present_days)).round_dp(2);

    let overtime_hours = Decimal::from(totals.overtime_minutes) / Decimal::from(60);
    let hourly_rate = basic_salary / (working_days * inputs.policy.standard_daily_hours);
    let overtime_pay =
        (overtime_hours * hourly_rate * inputs.policy.overtime_multiplier).round_dp(2);

    let mut allowances: PayComponents = inputs.salary.allowances.clone();
    if overtime_pay > Decimal::ZERO {
        allowances.insert(OVERTIME_ALLOWANCE_KEY.to_string(), overtime_pay);
    }

    let late_penalties =
        Decimal::from(totals.late_occurrences) * inputs.policy.late_penalty_amount;

    let mut record = PayrollRecord {
        id: Uuid::new_v4(),
        organization_id: inputs.employee.organization_id,
        employee_id: inputs.employee.id,
        month: inputs.month,
        year: inputs.year,
        working_days: inputs.working_days,
        present_days: totals.present_days,
        leave_days: totals.leave_days,
        overtime_hours: overtime_hours.round_dp(2),
        late_penalties,
        basic: prorated_basic,
        allowances,
        deductions: inputs.salary.deductions.clone(),
        bonuses: PayComponents::new(),
        adjustments: PayComponents::new(),
        gross: Decimal::ZERO,
        net: Decimal::ZERO,
        payment_status: PaymentStatus::Pending,
    };
    record.recompute_totals();
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmployeeStatus;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn employee() -> Employee {
        Employee {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            code: "EMP-001".to_string(),
            name: "Asha Rahman".to_string(),
            shift_id: None,
            status: EmployeeStatus::Active,
        }
    }

    fn salary(employee: &Employee, basic: Decimal) -> SalaryStructure {
        SalaryStructure {
            id: Uuid::new_v4(),
            employee_id: employee.id,
            basic_salary: basic,
            allowances: PayComponents::new(),
            deductions: PayComponents::new(),
            effective_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            effective_to: None,
            is_active: true,
        }
    }

    fn day_record(
        employee: &Employee,
        day: u32,
        status: AttendanceStatus,
        overtime_minutes: i64,
    ) -> AttendanceRecord {
        AttendanceRecord {
            organization_id: employee.organization_id,
            employee_id: employee.id,
            date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            shift_id: None,
            check_in: None,
            check_out: None,
            status,
            late_minutes: 0,
            early_exit_minutes: 0,
            overtime_minutes,
        }
    }

    fn records(employee: &Employee, statuses: &[(AttendanceStatus, i64)]) -> Vec<AttendanceRecord> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, (status, ot))| day_record(employee, i as u32 + 1, *status, *ot))
            .collect()
    }

    #[test]
    fn aggregation_counts_present_late_and_leave() {
        let emp = employee();
        let recs = records(
            &emp,
            &[
                (AttendanceStatus::Present, 0),
                (AttendanceStatus::Late, 30),
                (AttendanceStatus::Late, 0),
                (AttendanceStatus::Leave, 0),
                (AttendanceStatus::Absent, 0),
                (AttendanceStatus::Holiday, 0),
            ],
        );
        let totals = aggregate_attendance(&recs);
        assert_eq!(totals.present_days, 3);
        assert_eq!(totals.late_occurrences, 2);
        assert_eq!(totals.leave_days, 1);
        assert_eq!(totals.overtime_minutes, 30);
    }

    #[test]
    fn full_attendance_yields_full_pay() {
        let emp = employee();
        let sal = salary(&emp, dec!(30000));
        let recs: Vec<_> = (1..=30)
            .map(|day| day_record(&emp, day, AttendanceStatus::Present, 0))
            .collect();
        let policy = PayrollPolicy::default();
        let record = compute_payroll(&PayrollInputs {
            employee: &emp,
            salary: &sal,
            records: &recs,
            working_days: 30,
            month: 4,
            year: 2026,
            policy: &policy,
        })
        .unwrap();

        assert_eq!(record.basic, dec!(30000.00));
        assert_eq!(record.present_days, 30);
        assert_eq!(record.gross, dec!(30000.00));
        assert_eq!(record.net, dec!(30000.00));
        assert_eq!(record.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn absences_pro_rate_the_basic() {
        let emp = employee();
        let sal = salary(&emp, dec!(22000));
        let recs: Vec<_> = (1..=20)
            .map(|day| day_record(&emp, day, AttendanceStatus::Present, 0))
            .collect();
        let policy = PayrollPolicy::default();
        let record = compute_payroll(&PayrollInputs {
            employee: &emp,
            salary: &sal,
            records: &recs,
            working_days: 22,
            month: 3,
            year: 2026,
            policy: &policy,
        })
        .unwrap();

        assert_eq!(record.basic, dec!(20000.00));
    }

    #[test]
    fn overtime_pay_lands_under_the_reserved_allowance_key() {
        let emp = employee();
        let sal = salary(&emp, dec!(22000));
        // 20 present days, 30 minutes of overtime each.
        let recs: Vec<_> = (1..=20)
            .map(|day| day_record(&emp, day, AttendanceStatus::Present, 30))
            .collect();
        let policy = PayrollPolicy::default();
        let record = compute_payroll(&PayrollInputs {
            employee: &emp,
            salary: &sal,
            records: &recs,
            working_days: 22,
            month: 3,
            year: 2026,
            policy: &policy,
        })
        .unwrap();

        // 600 minutes = 10 hours; hourly = 22000 / (22 * 8) = 125.
        assert_eq!(record.overtime_hours, dec!(10.00));
        assert_eq!(
            record.allowances.get(OVERTIME_ALLOWANCE_KEY),
            Some(&dec!(1875.00))
        );
        assert_eq!(record.gross, dec!(21875.00));
        assert_eq!(record.net, dec!(21875.00));
    }

    #[test]
    fn no_overtime_means_no_reserved_key() {
        let emp = employee();
        let sal = salary(&emp, dec!(30000));
        let recs = records(&emp, &[(AttendanceStatus::Present, 0)]);
        let policy = PayrollPolicy::default();
        let record = compute_payroll(&PayrollInputs {
            employee: &emp,
            salary: &sal,
            records: &recs,
            working_days: 22,
            month: 3,
            year: 2026,
            policy: &policy,
        })
        .unwrap();
        assert!(!record.allowances.contains_key(OVERTIME_ALLOWANCE_KEY));
    }

    #[test]
    fn late_occurrences_accrue_flat_penalties() {
        let emp = employee();
        let sal = salary(&emp, dec!(22000));
        let recs = records(
            &emp,
            &[
                (AttendanceStatus::Late, 0),
                (AttendanceStatus::Late, 0),
                (AttendanceStatus::Present, 0),
            ],
        );
        let policy = PayrollPolicy {
            late_penalty_amount: dec!(100),
            ..PayrollPolicy::default()
        };
        let record = compute_payroll(&PayrollInputs {
            employee: &emp,
            salary: &sal,
            records: &recs,
            working_days: 22,
            month: 3,
            year: 2026,
            policy: &policy,
        })
        .unwrap();

        assert_eq!(record.late_penalties, dec!(200));
        assert_eq!(record.net, record.gross - dec!(200));
    }

    #[test]
    fn salary_components_flow_into_totals() {
        let emp = employee();
        let mut sal = salary(&emp, dec!(22000));
        sal.allowances.insert("house_rent".to_string(), dec!(5000));
        sal.deductions.insert("provident_fund".to_string(), dec!(1200));
        let recs: Vec<_> = (1..=22)
            .map(|day| day_record(&emp, day, AttendanceStatus::Present, 0))
            .collect();
        let policy = PayrollPolicy::default();
        let record = compute_payroll(&PayrollInputs {
            employee: &emp,
            salary: &sal,
            records: &recs,
            working_days: 22,
            month: 3,
            year: 2026,
            policy: &policy,
        })
        .unwrap();

        assert_eq!(record.gross, dec!(27000.00));
        assert_eq!(record.net, dec!(25800.00));
    }

    #[test]
    fn zero_working_days_is_a_computation_hazard() {
        let emp = employee();
        let sal = salary(&emp, dec!(22000));
        let policy = PayrollPolicy::default();
        let result = compute_payroll(&PayrollInputs {
            employee: &emp,
            salary: &sal,
            records: &[],
            working_days: 0,
            month: 3,
            year: 2026,
            policy: &policy,
        });
        assert!(matches!(
            result,
            Err(EngineError::ComputationHazard { .. })
        ));
    }

    #[test]
    fn month_with_no_attendance_pays_nothing_but_computes() {
        let emp = employee();
        let sal = salary(&emp, dec!(22000));
        let policy = PayrollPolicy::default();
        let record = compute_payroll(&PayrollInputs {
            employee: &emp,
            salary: &sal,
            records: &[],
            working_days: 22,
            month: 3,
            year: 2026,
            policy: &policy,
        })
        .unwrap();
        assert_eq!(record.basic, dec!(0.00));
        assert_eq!(record.present_days, 0);
        assert_eq!(record.gross, dec!(0.00));
    }
}
