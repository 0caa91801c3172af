//! The engine facade: orchestration over the pure calculation layer.
//!
//! Every operation here follows the same shape: batch-fetch the
//! configuration and source records through the storage seams, run the pure
//! calculation functions over them, then persist the results. Per-employee
//! failures inside a batch become entries in the outcome, never an abort of
//! the whole run. Storage calls are individually bounded by the configured
//! timeout, and long batches check a [`CancelToken`] between employees so a
//! shutdown request stops new work promptly.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    DayContext, PayrollInputs, classify_day, compute_payroll, validate_point, working_days,
};
use crate::config::PolicyConfig;
use crate::error::{EngineError, EngineResult};
use crate::import::normalize;
use crate::models::{
    AttendanceBatchOutcome, AttendanceRecord, EmployeeError, EventSource, GeoPoint, ImportOutcome,
    LocationCheck, PayComponents, PayrollRecord, PayrollRunOutcome, RawAttendanceEvent,
    SalaryStructure, Shift,
};
use crate::store::{AttendanceStore, EventStore, LeaveLedger, OrgDirectory, PayrollStore};

/// Cooperative cancellation handle for batch runs.
///
/// Cancelling never interrupts in-flight work; batches check the token
/// between employees and stop scheduling new ones. Results already computed
/// when the token trips are still persisted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// The attendance and payroll engine.
///
/// Holds the storage seams and the policy configuration; all operations are
/// `&self` and safe to call concurrently.
pub struct Engine {
    directory: Arc<dyn OrgDirectory>,
    events: Arc<dyn EventStore>,
    attendance: Arc<dyn AttendanceStore>,
    payroll: Arc<dyn PayrollStore>,
    leave: Arc<dyn LeaveLedger>,
    policy: PolicyConfig,
}

impl Engine {
    /// Builds an engine over individually-supplied storage seams.
    pub fn new(
        directory: Arc<dyn OrgDirectory>,
        events: Arc<dyn EventStore>,
        attendance: Arc<dyn AttendanceStore>,
        payroll: Arc<dyn PayrollStore>,
        leave: Arc<dyn LeaveLedger>,
        policy: PolicyConfig,
    ) -> Self {
        Self {
            directory,
            events,
            attendance,
            payroll,
            leave,
            policy,
        }
    }

    /// Builds an engine over one backend that implements every seam, such as
    /// [`crate::store::MemoryStore`].
    pub fn with_unified_store<S>(store: Arc<S>, policy: PolicyConfig) -> Self
    where
        S: OrgDirectory + EventStore + AttendanceStore + PayrollStore + LeaveLedger + 'static,
    {
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            policy,
        )
    }

    /// The policy configuration in effect.
    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    async fn with_timeout<T, F>(&self, operation: &str, fut: F) -> EngineResult<T>
    where
        F: Future<Output = EngineResult<T>>,
    {
        let limit = Duration::from_secs(self.policy.batch.storage_timeout_secs);
        match timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::StorageTimeout {
                operation: operation.to_string(),
            }),
        }
    }

    /// Validates a check-in location against the fences that apply to the
    /// employee.
    ///
    /// Fence precedence: an employee with any active fence assignment is
    /// validated against the assigned fences exclusively; otherwise the
    /// organization-wide active set applies. An unreconciled event (no
    /// employee yet) always uses the organization-wide set. With no
    /// candidate fences at all, the policy's fail-open flag decides.
    pub async fn validate_location(
        &self,
        organization_id: Uuid,
        employee_id: Option<Uuid>,
        point: GeoPoint,
    ) -> EngineResult<LocationCheck> {
        if !point.is_in_range() {
            return Err(EngineError::validation(
                "location",
                format!(
                    "coordinates ({}, {}) are out of range",
                    point.latitude, point.longitude
                ),
            ));
        }

        let fences = match employee_id {
            Some(id) => {
                let assigned = self
                    .with_timeout(
                        "assigned fence fetch",
                        self.directory.assigned_fences(organization_id, id),
                    )
                    .await?;
                if assigned.is_empty() {
                    self.with_timeout(
                        "active fence fetch",
                        self.directory.active_fences(organization_id),
                    )
                    .await?
                } else {
                    assigned
                }
            }
            None => {
                self.with_timeout(
                    "active fence fetch",
                    self.directory.active_fences(organization_id),
                )
                .await?
            }
        };

        Ok(validate_point(
            point,
            &fences,
            self.policy.geofence.fail_open,
        ))
    }

    /// Records one raw punch.
    ///
    /// Events carrying coordinates are geo-fence checked first; a rejected
    /// location is reported in the returned check and the event is NOT
    /// appended. Events without coordinates (biometric terminals, manual
    /// entry) are appended unchecked.
    pub async fn record_event(&self, event: RawAttendanceEvent) -> EngineResult<LocationCheck> {
        let check = match event.location {
            Some(point) => {
                self.validate_location(event.organization_id, event.employee_id, point)
                    .await?
            }
            None => LocationCheck {
                is_valid: true,
                distance_meters: 0.0,
                matched_fence_id: None,
                nearest_fence_id: None,
            },
        };

        if check.is_valid {
            self.with_timeout("event append", self.events.append(event))
                .await?;
        } else {
            warn!(
                organization_id = %event.organization_id,
                distance_meters = check.distance_meters,
                "check-in rejected outside every candidate fence"
            );
        }
        Ok(check)
    }

    /// Classifies one employee-day and persists the record.
    ///
    /// Idempotent: re-running over the same punches replaces the record with
    /// an identical one.
    pub async fn classify_day(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> EngineResult<AttendanceRecord> {
        let employee = self
            .with_timeout(
                "employee fetch",
                self.directory.employee(organization_id, employee_id),
            )
            .await?
            .ok_or_else(|| EngineError::not_found("employee", employee_id))?;

        let shift = match employee.shift_id {
            Some(shift_id) => {
                self.with_timeout("shift fetch", self.directory.shift(organization_id, shift_id))
                    .await?
            }
            None => None,
        };
        let events = self
            .with_timeout(
                "event fetch",
                self.events
                    .events_for_employee_on(organization_id, employee_id, date),
            )
            .await?;
        let is_holiday = self
            .with_timeout(
                "holiday lookup",
                self.directory.is_holiday(organization_id, date),
            )
            .await?;

        let record = classify_day(&DayContext {
            organization_id,
            employee_id,
            date,
            shift: shift.as_ref(),
            events: &events,
            is_holiday,
        });
        self.with_timeout("attendance upsert", self.attendance.upsert(record.clone()))
            .await?;
        Ok(record)
    }

    /// Classifies one day for every active employee of an organization.
    ///
    /// Fetches the day's events, the shift table and the holiday flag once
    /// up front, then fans classification out over a bounded worker pool.
    /// All resulting records are committed in one bulk upsert, so a re-run
    /// replaces the whole day consistently.
    pub async fn process_attendance_batch(
        &self,
        organization_id: Uuid,
        date: NaiveDate,
        cancel: &CancelToken,
    ) -> EngineResult<AttendanceBatchOutcome> {
        let run_id = Uuid::new_v4();
        let employees = self
            .with_timeout(
                "employee list fetch",
                self.directory.active_employees(organization_id),
            )
            .await?;
        let events = self
            .with_timeout("event fetch", self.events.events_on(organization_id, date))
            .await?;
        let is_holiday = self
            .with_timeout(
                "holiday lookup",
                self.directory.is_holiday(organization_id, date),
            )
            .await?;

        let mut shifts: HashMap<Uuid, Shift> = HashMap::new();
        for shift_id in employees.iter().filter_map(|e| e.shift_id) {
            if shifts.contains_key(&shift_id) {
                continue;
            }
            if let Some(shift) = self
                .with_timeout("shift fetch", self.directory.shift(organization_id, shift_id))
                .await?
            {
                shifts.insert(shift_id, shift);
            }
        }

        let mut by_employee: HashMap<Uuid, Vec<RawAttendanceEvent>> = HashMap::new();
        for event in events {
            if let Some(id) = event.employee_id {
                by_employee.entry(id).or_default().push(event);
            }
        }

        info!(
            %run_id,
            %organization_id,
            %date,
            employees = employees.len(),
            "attendance batch started"
        );

        let semaphore = Arc::new(Semaphore::new(self.policy.batch.worker_concurrency.max(1)));
        let mut join_set = JoinSet::new();
        // Task id to employee id, so a panicked worker is still attributed.
        let mut spawned: HashMap<tokio::task::Id, Uuid> = HashMap::new();
        let mut errors = Vec::new();

        for employee in employees {
            if cancel.is_cancelled() {
                info!(%run_id, "cancellation requested, scheduling no further employees");
                break;
            }
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| EngineError::Storage {
                    message: "batch worker pool closed unexpectedly".to_string(),
                })?;
            let shift = employee.shift_id.and_then(|id| shifts.get(&id).cloned());
            let employee_events = by_employee.remove(&employee.id).unwrap_or_default();
            let employee_id = employee.id;

            let handle = join_set.spawn(async move {
                let _permit = permit;
                classify_day(&DayContext {
                    organization_id,
                    employee_id,
                    date,
                    shift: shift.as_ref(),
                    events: &employee_events,
                    is_holiday,
                })
            });
            spawned.insert(handle.id(), employee_id);
        }

        let mut records = Vec::new();
        while let Some(joined) = join_set.join_next_with_id().await {
            match joined {
                Ok((_, record)) => records.push(record),
                Err(e) => errors.push(EmployeeError {
                    employee_id: spawned.get(&e.id()).copied().unwrap_or_default(),
                    message: format!("classification worker failed: {e}"),
                }),
            }
        }

        let processed = records.len();
        if !records.is_empty() {
            self.with_timeout(
                "attendance bulk upsert",
                self.attendance.upsert_bulk(records),
            )
            .await?;
        }
        info!(%run_id, processed, failed = errors.len(), "attendance batch finished");
        Ok(AttendanceBatchOutcome { processed, errors })
    }

    /// Imports a tabular attendance stream.
    ///
    /// Rows resolve to employees by code; unresolvable codes, in-batch
    /// duplicates of an (employee, date) key and keys that already have a
    /// record are skipped with a recorded reason. Surviving rows produce
    /// synthetic IMPORT punches and a classified record each, so a row
    /// without an explicit status gets the same verdict live punches would —
    /// a check-in past the grace window imports as LATE, not as a bare
    /// PRESENT. An explicit valid status column overrides the classified
    /// status. The new records commit together through the insert-only path,
    /// which never overwrites.
    pub async fn import_attendance(
        &self,
        organization_id: Uuid,
        bytes: &[u8],
    ) -> EngineResult<ImportOutcome> {
        let run_id = Uuid::new_v4();
        let parsed = normalize(bytes)?;
        let total = parsed.rows.len() + parsed.errors.len();
        let mut errors: Vec<String> = parsed.errors.iter().map(|e| e.to_string()).collect();
        let mut skipped = 0usize;

        let mut seen: HashSet<(Uuid, NaiveDate)> = HashSet::new();
        let mut new_events = Vec::new();
        let mut new_records = Vec::new();

        for row in &parsed.rows {
            let employee = match self
                .with_timeout(
                    "employee resolution",
                    self.directory
                        .employee_by_code(organization_id, &row.employee_code),
                )
                .await?
            {
                Some(employee) => employee,
                None => {
                    skipped += 1;
                    errors.push(format!(
                        "row {}: unknown employee code '{}'",
                        row.line, row.employee_code
                    ));
                    continue;
                }
            };

            if !seen.insert((employee.id, row.date)) {
                skipped += 1;
                errors.push(format!(
                    "row {}: duplicate of an earlier row for '{}' on {}",
                    row.line, row.employee_code, row.date
                ));
                continue;
            }

            let existing = self
                .with_timeout(
                    "attendance lookup",
                    self.attendance.get(organization_id, employee.id, row.date),
                )
                .await?;
            if existing.is_some() {
                skipped += 1;
                errors.push(format!(
                    "row {}: attendance already recorded for '{}' on {}",
                    row.line, row.employee_code, row.date
                ));
                continue;
            }

            // An unresolvable shift name is not fatal: the row still imports,
            // classified without lateness evaluation.
            let shift = match &row.shift_name {
                Some(name) => {
                    let resolved = self
                        .with_timeout(
                            "shift resolution",
                            self.directory.shift_by_name(organization_id, name),
                        )
                        .await?;
                    if resolved.is_none() {
                        warn!(%run_id, row = row.line, shift = %name, "unknown shift name, importing without a shift");
                    }
                    resolved
                }
                None => match employee.shift_id {
                    Some(shift_id) => {
                        self.with_timeout(
                            "shift fetch",
                            self.directory.shift(organization_id, shift_id),
                        )
                        .await?
                    }
                    None => None,
                },
            };

            let row_events: Vec<RawAttendanceEvent> = [row.check_in, row.check_out]
                .into_iter()
                .flatten()
                .map(|timestamp| RawAttendanceEvent {
                    organization_id,
                    employee_id: Some(employee.id),
                    timestamp,
                    source: EventSource::Import,
                    location: None,
                    device_fingerprint: None,
                })
                .collect();

            let is_holiday = self
                .with_timeout(
                    "holiday lookup",
                    self.directory.is_holiday(organization_id, row.date),
                )
                .await?;
            let mut record = classify_day(&DayContext {
                organization_id,
                employee_id: employee.id,
                date: row.date,
                shift: shift.as_ref(),
                events: &row_events,
                is_holiday,
            });
            if let Some(status) = row.status {
                record.status = status;
            }

            new_events.extend(row_events);
            new_records.push(record);
        }

        let success = new_records.len();
        for event in new_events {
            self.with_timeout("event append", self.events.append(event))
                .await?;
        }
        if !new_records.is_empty() {
            self.with_timeout("attendance insert", self.attendance.insert_new(new_records))
                .await?;
        }

        info!(%run_id, %organization_id, total, success, skipped, "attendance import finished");
        Ok(ImportOutcome {
            success,
            skipped,
            total,
            errors,
        })
    }

    /// Runs monthly payroll for every active employee.
    ///
    /// An organization with no active employee holding an active salary
    /// structure is rejected outright. An employee who already has a record
    /// for the period is skipped with a per-employee entry; use
    /// [`Engine::reprocess_payroll`] to overwrite.
    pub async fn process_payroll(
        &self,
        organization_id: Uuid,
        month: u32,
        year: i32,
        cancel: &CancelToken,
    ) -> EngineResult<PayrollRunOutcome> {
        self.run_payroll(organization_id, month, year, false, cancel)
            .await
    }

    /// Re-runs monthly payroll, replacing existing records for the period.
    ///
    /// Replacement recomputes from attendance: approval-stage bonuses and
    /// adjustments on the old record are discarded, not carried over.
    pub async fn reprocess_payroll(
        &self,
        organization_id: Uuid,
        month: u32,
        year: i32,
        cancel: &CancelToken,
    ) -> EngineResult<PayrollRunOutcome> {
        self.run_payroll(organization_id, month, year, true, cancel)
            .await
    }

    async fn run_payroll(
        &self,
        organization_id: Uuid,
        month: u32,
        year: i32,
        force: bool,
        cancel: &CancelToken,
    ) -> EngineResult<PayrollRunOutcome> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::validation(
                "month",
                format!("{month} is not a calendar month"),
            ));
        }

        let run_id = Uuid::new_v4();
        let employees = self
            .with_timeout(
                "employee list fetch",
                self.directory.active_employees(organization_id),
            )
            .await?;
        let mut salary_by_employee: HashMap<Uuid, SalaryStructure> = self
            .with_timeout(
                "salary fetch",
                self.directory.active_salary_structures(organization_id),
            )
            .await?
            .into_iter()
            .map(|salary| (salary.employee_id, salary))
            .collect();
        // A run with nobody to pay is an operator mistake, not an empty
        // success.
        if !employees
            .iter()
            .any(|e| salary_by_employee.contains_key(&e.id))
        {
            return Err(EngineError::validation(
                "organization",
                "no active employees with an active salary structure",
            ));
        }

        let existing: HashSet<Uuid> = self
            .with_timeout(
                "payroll period fetch",
                self.payroll.existing_periods(organization_id, month, year),
            )
            .await?
            .into_iter()
            .collect();

        let holidays = self
            .with_timeout(
                "holiday fetch",
                self.directory.holidays_in_month(organization_id, year, month),
            )
            .await?;
        let holiday_dates: Vec<NaiveDate> = holidays.iter().map(|h| h.date).collect();
        let working_days = working_days(year, month, &holiday_dates)?;

        let month_records = self
            .with_timeout(
                "attendance fetch",
                self.attendance.month_records(organization_id, year, month),
            )
            .await?;
        let mut by_employee: HashMap<Uuid, Vec<AttendanceRecord>> = HashMap::new();
        for record in month_records {
            by_employee.entry(record.employee_id).or_default().push(record);
        }

        info!(
            %run_id,
            %organization_id,
            period = %format!("{year}-{month:02}"),
            employees = employees.len(),
            working_days,
            force,
            "payroll run started"
        );

        let semaphore = Arc::new(Semaphore::new(self.policy.batch.worker_concurrency.max(1)));
        let mut join_set = JoinSet::new();
        let mut spawned: HashMap<tokio::task::Id, Uuid> = HashMap::new();
        let mut errors = Vec::new();

        for employee in employees {
            if cancel.is_cancelled() {
                info!(%run_id, "cancellation requested, computing no further employees");
                break;
            }

            if existing.contains(&employee.id) && !force {
                errors.push(EmployeeError {
                    employee_id: employee.id,
                    message: format!("payroll already exists for {year}-{month:02}, skipped"),
                });
                continue;
            }

            let salary = match salary_by_employee.remove(&employee.id) {
                Some(salary) => salary,
                None => {
                    errors.push(EmployeeError {
                        employee_id: employee.id,
                        message: "no active salary structure".to_string(),
                    });
                    continue;
                }
            };

            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| EngineError::Storage {
                    message: "payroll worker pool closed unexpectedly".to_string(),
                })?;
            let records = by_employee.remove(&employee.id).unwrap_or_default();
            let policy = self.policy.payroll.clone();
            let employee_id = employee.id;

            let handle = join_set.spawn(async move {
                let _permit = permit;
                compute_payroll(&PayrollInputs {
                    employee: &employee,
                    salary: &salary,
                    records: &records,
                    working_days,
                    month,
                    year,
                    policy: &policy,
                })
            });
            spawned.insert(handle.id(), employee_id);
        }

        let mut fresh = Vec::new();
        let mut replacements = Vec::new();

        while let Some(joined) = join_set.join_next_with_id().await {
            match joined {
                Ok((_, Ok(record))) => {
                    self.cross_check_leave(record.employee_id, year, &record).await;
                    if existing.contains(&record.employee_id) {
                        replacements.push(record);
                    } else {
                        fresh.push(record);
                    }
                }
                Ok((id, Err(e))) => errors.push(EmployeeError {
                    employee_id: spawned.get(&id).copied().unwrap_or_default(),
                    message: e.to_string(),
                }),
                Err(e) => errors.push(EmployeeError {
                    employee_id: spawned.get(&e.id()).copied().unwrap_or_default(),
                    message: format!("payroll worker failed: {e}"),
                }),
            }
        }

        let payroll_ids: Vec<Uuid> = fresh
            .iter()
            .chain(replacements.iter())
            .map(|record| record.id)
            .collect();

        if !fresh.is_empty() {
            self.with_timeout("payroll insert", self.payroll.insert_bulk(fresh))
                .await?;
        }
        for record in replacements {
            self.with_timeout("payroll replace", self.payroll.replace(record))
                .await?;
        }

        let processed = payroll_ids.len();
        info!(%run_id, processed, failed = errors.len(), "payroll run finished");
        Ok(PayrollRunOutcome {
            processed,
            payroll_ids,
            errors,
        })
    }

    /// Read-only consistency check between attendance LEAVE days and the
    /// leave ledger. Mismatches are logged, never fatal: the ledger belongs
    /// to the leave-approval workflow and payroll must not block on it.
    async fn cross_check_leave(&self, employee_id: Uuid, year: i32, record: &PayrollRecord) {
        if record.leave_days == 0 {
            return;
        }
        let balances = match self.leave.balances_for_year(employee_id, year).await {
            Ok(balances) => balances,
            Err(e) => {
                warn!(%employee_id, error = %e, "leave ledger unavailable for cross-check");
                return;
            }
        };
        let used: Decimal = balances.iter().map(|b| b.used).sum();
        if Decimal::from(record.leave_days) > used {
            warn!(
                %employee_id,
                leave_days = record.leave_days,
                ledger_used = %used,
                "attendance leave days exceed ledger usage"
            );
        }
    }

    /// Applies approval-stage bonuses and adjustments to an existing payroll
    /// record and recomputes its totals.
    ///
    /// Components merge by name (a repeated name replaces the prior amount);
    /// gross and net are always re-derived from the full component maps,
    /// never incremented.
    pub async fn apply_payroll_adjustments(
        &self,
        organization_id: Uuid,
        employee_id: Uuid,
        month: u32,
        year: i32,
        bonuses: PayComponents,
        adjustments: PayComponents,
    ) -> EngineResult<PayrollRecord> {
        let mut record = self
            .with_timeout(
                "payroll lookup",
                self.payroll.get(organization_id, employee_id, month, year),
            )
            .await?
            .ok_or_else(|| {
                EngineError::not_found(
                    "payroll record",
                    format!("employee {employee_id}, period {year}-{month:02}"),
                )
            })?;

        record.bonuses.extend(bonuses);
        record.adjustments.extend(adjustments);
        record.recompute_totals();

        self.with_timeout("payroll replace", self.payroll.replace(record.clone()))
            .await?;
        Ok(record)
    }
}
