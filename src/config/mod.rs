//! Policy configuration for the engine.
//!
//! The reference behaviors that are business policy rather than arithmetic —
//! the flat late-penalty amount, the overtime multiplier, the geo-fence
//! fail-open default, batch worker limits — live here instead of being
//! hard-coded into the computation.

mod loader;
mod types;

pub use types::{BatchPolicy, GeoFencePolicy, PayrollPolicy, PolicyConfig};
