//! Core weight-lookup types

pub mod types;

pub use types::{CardRole, FormatVariant, WeightKey};
