//! Pure computation for the attendance-to-payroll pipeline.
//!
//! Everything in this module is side-effect free: geo-fence validation,
//! daily attendance classification, working-day counting and monthly payroll
//! computation all take their inputs as values and return results. The
//! [`crate::engine`] facade owns fetching those inputs and persisting the
//! outputs.

mod classifier;
mod geofence;
mod payroll;
mod working_days;

pub use classifier::{DayContext, classify_day};
pub use geofence::{EARTH_RADIUS_METERS, haversine_distance_meters, validate_point};
pub use payroll::{AttendanceTotals, PayrollInputs, aggregate_attendance, compute_payroll};
pub use working_days::{month_days, working_days};
