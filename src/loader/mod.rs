//! Deck and weight table loaders
//!
//! Parsers for pasted deck lists and CSV weight tables, plus the cache that
//! keeps loaded tables around.

pub mod cache;
pub mod deck;
pub mod normalize;
pub mod source;
pub mod table;

pub use cache::{TableStatus, WeightCache};
pub use deck::{DeckList, DeckLoader, Dialect, ParsedCardEntry};
pub use normalize::remove_extra_info;
pub use source::{DirTableSource, HttpTableSource, StaticTableSource, TableSource};
pub use table::{TableSpec, WeightColumn, WeightRecord, WeightTable};
