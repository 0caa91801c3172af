//! Geo-fence models.
//!
//! A geo-fence is a circular region (center + radius) that constrains where
//! a mobile check-in is accepted. Fences are owned by an organization;
//! employees may additionally hold explicit fence assignments, which take
//! total precedence over the organization-wide set.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, range [-90, 90].
    pub latitude: f64,
    /// Longitude in degrees, range [-180, 180].
    pub longitude: f64,
}

impl GeoPoint {
    /// Returns true if both coordinates are finite and within range.
    pub fn is_in_range(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A circular check-in region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFence {
    /// Unique identifier for the fence.
    pub id: Uuid,
    /// The organization that owns this fence.
    pub organization_id: Uuid,
    /// Display name ("Head Office", "Warehouse 2").
    pub name: String,
    /// Center of the region.
    pub center: GeoPoint,
    /// Radius of the region in meters.
    pub radius_meters: f64,
    /// Inactive fences are ignored by validation.
    pub active: bool,
}

/// Links an employee to a fence.
///
/// When an employee has any active assignment, validation is scoped to the
/// assigned fences exclusively; the organization-wide set is a fallback only
/// for employees with zero assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFenceAssignment {
    /// The assigned employee.
    pub employee_id: Uuid,
    /// The assigned fence.
    pub fence_id: Uuid,
    /// Marks the employee's primary work location; informational only,
    /// validation treats all assigned fences equally.
    pub is_primary: bool,
}
