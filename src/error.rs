//! Error types for the attendance and payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! The taxonomy matters for batch behavior: validation errors are rejected
//! before any computation, not-found and conflict errors demote to per-item
//! entries inside batch results, and computation hazards are hard per-employee
//! failures that must never leak NaN or Infinity into a persisted record.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// The main error type for the engine.
///
/// # Example
///
/// ```
/// use workforce_engine::error::EngineError;
///
/// let error = EngineError::Validation {
///     field: "month".to_string(),
///     message: "must be between 1 and 12".to_string(),
/// };
/// assert_eq!(error.to_string(), "Invalid month: must be between 1 and 12");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed input, rejected before any computation takes place.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// The input field that failed validation.
        field: String,
        /// A description of what made it invalid.
        message: String,
    },

    /// A referenced entity does not exist.
    ///
    /// In batch operations this surfaces as a per-item error entry rather
    /// than aborting the whole run.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity ("employee", "shift", "salary structure", ...).
        entity: String,
        /// The identifier that could not be resolved.
        id: String,
    },

    /// A record already exists for a uniqueness key that rejects duplicates.
    #[error("Duplicate {entity} for {key}")]
    Conflict {
        /// The kind of record ("payroll record", "attendance record").
        entity: String,
        /// The uniqueness key that collided.
        key: String,
    },

    /// A computation could not proceed without producing a nonsensical
    /// figure (for example pro-rating over zero working days).
    #[error("Computation hazard for employee {employee_id} on {period}: {message}")]
    ComputationHazard {
        /// The employee whose computation failed.
        employee_id: Uuid,
        /// The period being computed ("2026-03", "2026-03-14").
        period: String,
        /// A description of the hazard.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParse {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The storage backend reported a failure.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },

    /// A storage call did not complete within the configured timeout.
    #[error("Storage call '{operation}' timed out")]
    StorageTimeout {
        /// The storage operation that timed out.
        operation: String,
    },
}

impl EngineError {
    /// Convenience constructor for validation errors.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for not-found errors.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Builds the conventional period key for a monthly conflict.
    pub fn duplicate_payroll(employee_id: Uuid, month: u32, year: i32) -> Self {
        Self::Conflict {
            entity: "payroll record".to_string(),
            key: format!("employee {employee_id}, period {year}-{month:02}"),
        }
    }

    /// Builds the conventional key for a daily attendance conflict.
    pub fn duplicate_attendance(employee_id: Uuid, date: NaiveDate) -> Self {
        Self::Conflict {
            entity: "attendance record".to_string(),
            key: format!("employee {employee_id}, date {date}"),
        }
    }
}

/// A type alias for Results that return [`EngineError`].
pub type EngineResult<T> = Result<T, EngineError>;
