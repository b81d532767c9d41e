//! MTGA Weights - deck weight calculator
//!
//! Parses pasted MTG Arena deck lists and scores them against reference
//! weight tables (per-card weights for the 99 and for the commander, in
//! historic and standard variants).

pub mod calculator;
pub mod config;
pub mod core;
pub mod error;
pub mod loader;
pub mod logging;
pub mod scoring;

pub use calculator::WeightsCalculator;
pub use config::WeightsConfig;
pub use crate::core::{CardRole, FormatVariant, WeightKey};
pub use error::{DataSourceError, Result, WeightsError};
pub use scoring::{DeckScore, ScoredCard};
