//! Strongly-typed policy configuration structures.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Payroll policy knobs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PayrollPolicy {
    /// Flat amount deducted per late occurrence.
    pub late_penalty_amount: Decimal,
    /// Multiplier applied to the hourly rate for overtime pay.
    pub overtime_multiplier: Decimal,
    /// Scheduled hours per working day, used to derive the hourly rate from
    /// the basic salary.
    pub standard_daily_hours: Decimal,
}

impl Default for PayrollPolicy {
    fn default() -> Self {
        Self {
            late_penalty_amount: Decimal::ZERO,
            overtime_multiplier: Decimal::new(15, 1),
            standard_daily_hours: Decimal::from(8),
        }
    }
}

/// Geo-fence policy knobs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeoFencePolicy {
    /// What an empty candidate fence set resolves to. Defaults to `true`:
    /// organizations that never configured fences must not block check-ins.
    pub fail_open: bool,
}

impl Default for GeoFencePolicy {
    fn default() -> Self {
        Self { fail_open: true }
    }
}

/// Batch execution knobs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BatchPolicy {
    /// Maximum employees processed concurrently by a batch run.
    pub worker_concurrency: usize,
    /// Timeout applied to each storage call, in seconds.
    pub storage_timeout_secs: u64,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            worker_concurrency: 8,
            storage_timeout_secs: 10,
        }
    }
}

/// The complete policy configuration consumed by the engine.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Payroll policy.
    pub payroll: PayrollPolicy,
    /// Geo-fence policy.
    pub geofence: GeoFencePolicy,
    /// Batch execution policy.
    pub batch: BatchPolicy,
}
