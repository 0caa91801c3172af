//! Attendance-to-payroll computation engine for multi-tenant HR platforms.
//!
//! This crate turns raw time-clock punches (biometric, mobile, manual,
//! bulk-imported) into per-day attendance classifications, and a month of
//! those classifications into pro-rated, rule-driven payroll figures. It is
//! a library: HTTP routing, authentication and persistence mechanics live in
//! the surrounding application, which talks to this core through the
//! [`engine::Engine`] facade and the storage seams in [`store`].

#![warn(missing_docs)]

pub use engine::{CancelToken, Engine};

pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod import;
pub mod models;
pub mod store;
