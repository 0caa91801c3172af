//! Bulk attendance import normalization.
//!
//! Parses an external tabular byte stream into normalized rows shaped like
//! the raw events the classifier consumes. Parsing is forgiving at the row
//! level — a bad row records an error and never aborts the rest of the
//! import — and strict at the file level: a stream without the required
//! headers is rejected outright.

mod normalize;

pub use normalize::{ImportRow, NormalizedImport, RowError, normalize};
