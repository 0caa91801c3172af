//! Organization holiday calendar entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry in an organization's holiday calendar.
///
/// Holiday dates are excluded from the working-day count and, when an
/// employee has no punches on one, classify the day as HOLIDAY rather than
/// ABSENT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// The organization whose calendar this entry belongs to.
    pub organization_id: Uuid,
    /// The holiday date.
    pub date: NaiveDate,
    /// Display name ("Victory Day").
    pub name: String,
}
