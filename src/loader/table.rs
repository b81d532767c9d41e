//! Weight table parser (CSV)
//!
//! A table is a CSV resource with one row per card. Header names are matched
//! case-insensitively. Which columns hold which weights is described by a
//! [`TableSpec`], so the same parser handles the split main-deck/commander
//! files and a single unified file.

use crate::core::{CardRole, FormatVariant, WeightKey};
use crate::error::DataSourceError;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Maps one CSV column to the weight it provides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightColumn {
    pub header: String,
    pub format: FormatVariant,
    pub role: CardRole,
}

impl WeightColumn {
    pub fn new(header: impl Into<String>, format: FormatVariant, role: CardRole) -> Self {
        WeightColumn {
            header: header.into(),
            format,
            role,
        }
    }

    pub fn key(&self) -> WeightKey {
        WeightKey::new(self.format, self.role)
    }
}

fn default_name_column() -> String {
    "name".to_string()
}

/// Where a table lives and how its columns are laid out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    pub id: String,
    /// Resource path relative to the source root, e.g. `csv/WeightsMainDeck.csv`
    pub resource: String,
    #[serde(default = "default_name_column")]
    pub name_column: String,
    pub columns: Vec<WeightColumn>,
}

impl TableSpec {
    pub fn new(
        id: impl Into<String>,
        resource: impl Into<String>,
        columns: Vec<WeightColumn>,
    ) -> Self {
        TableSpec {
            id: id.into(),
            resource: resource.into(),
            name_column: default_name_column(),
            columns,
        }
    }

    /// Whether this table carries a weight for `key`
    pub fn provides(&self, key: WeightKey) -> bool {
        self.columns.iter().any(|c| c.key() == key)
    }
}

/// One card row of a weight table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightRecord {
    pub name: String,
    pub id: Option<String>,
    pub expansion: Option<String>,
    pub color_identity: Option<String>,
    weights: SmallVec<[(WeightKey, i64); 4]>,
}

impl WeightRecord {
    pub fn new(name: impl Into<String>) -> Self {
        WeightRecord {
            name: name.into(),
            id: None,
            expansion: None,
            color_identity: None,
            weights: SmallVec::new(),
        }
    }

    pub fn with_weight(mut self, key: WeightKey, weight: i64) -> Self {
        self.set_weight(key, weight);
        self
    }

    fn set_weight(&mut self, key: WeightKey, weight: i64) {
        match self.weights.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = weight,
            None => self.weights.push((key, weight)),
        }
    }

    /// Weight for a (format, role) pair, if the table has that column
    pub fn weight(&self, key: WeightKey) -> Option<i64> {
        self.weights.iter().find(|(k, _)| *k == key).map(|(_, w)| *w)
    }

    pub fn main_deck_weight(&self, format: FormatVariant) -> Option<i64> {
        self.weight(WeightKey::main_deck(format))
    }

    pub fn commander_weight(&self, format: FormatVariant) -> Option<i64> {
        self.weight(WeightKey::commander(format))
    }
}

/// A fully loaded weight table
#[derive(Debug, Clone, Default)]
pub struct WeightTable {
    id: String,
    /// Keyed by lowercase card name
    records: FxHashMap<String, WeightRecord>,
    /// Sorted ascending
    names: Vec<String>,
    duplicates: usize,
}

impl WeightTable {
    /// Build a table from records; the first record for each name is kept
    pub fn from_records(
        id: impl Into<String>,
        records: impl IntoIterator<Item = WeightRecord>,
    ) -> Self {
        let mut table = WeightTable {
            id: id.into(),
            ..Default::default()
        };
        for record in records {
            table.insert(record);
        }
        table.names.sort();
        table
    }

    fn insert(&mut self, record: WeightRecord) {
        let key = record.name.to_lowercase();
        if self.records.contains_key(&key) {
            tracing::debug!(table = %self.id, card = %record.name, "skipping duplicate card row");
            self.duplicates += 1;
            return;
        }
        self.names.push(record.name.clone());
        self.records.insert(key, record);
    }

    /// Parse CSV content according to `spec`
    ///
    /// Fails on a missing required column, an empty name or a non-integer
    /// weight anywhere in the file.
    pub fn parse(spec: &TableSpec, content: &str) -> Result<Self, DataSourceError> {
        Self::parse_bytes(spec, content.as_bytes())
    }

    /// Parse raw CSV bytes; non-UTF-8 text is a malformed row
    pub fn parse_bytes(spec: &TableSpec, content: &[u8]) -> Result<Self, DataSourceError> {
        let table_id = spec.id.as_str();
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(content);

        let headers = reader
            .headers()
            .map_err(|e| DataSourceError::MalformedRow {
                table: table_id.to_string(),
                line: 1,
                reason: format!("unreadable header row: {e}"),
            })?
            .clone();
        let column_of = |header: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(header));
        let require = |header: &str| {
            column_of(header).ok_or_else(|| DataSourceError::MissingColumn {
                table: table_id.to_string(),
                column: header.to_string(),
            })
        };

        let name_idx = require(&spec.name_column)?;
        let weight_idx = spec
            .columns
            .iter()
            .map(|c| Ok((c.key(), require(&c.header)?)))
            .collect::<Result<Vec<_>, DataSourceError>>()?;
        let id_idx = column_of("id");
        let expansion_idx = column_of("expansion");
        let color_idx = column_of("color_identity");

        let mut table = WeightTable {
            id: table_id.to_string(),
            ..Default::default()
        };

        for (row_number, row) in reader.records().enumerate() {
            // Header is line 1
            let fallback_line = row_number as u64 + 2;
            let row = row.map_err(|e| DataSourceError::MalformedRow {
                table: table_id.to_string(),
                line: e.position().map_or(fallback_line, |p| p.line()),
                reason: e.to_string(),
            })?;
            let line = row.position().map_or(fallback_line, |p| p.line());
            let malformed = |reason: String| DataSourceError::MalformedRow {
                table: table_id.to_string(),
                line,
                reason,
            };

            let name = row.get(name_idx).unwrap_or_default();
            if name.is_empty() {
                return Err(malformed("missing card name".to_string()));
            }

            let optional = |idx: Option<usize>| {
                idx.and_then(|i| row.get(i))
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            };
            let mut record = WeightRecord {
                name: name.to_string(),
                id: optional(id_idx),
                expansion: optional(expansion_idx),
                color_identity: optional(color_idx),
                weights: SmallVec::new(),
            };

            for (key, idx) in &weight_idx {
                let raw = row.get(*idx).unwrap_or_default();
                let weight = raw.parse::<i64>().map_err(|_| {
                    malformed(format!("weight '{raw}' for '{name}' is not an integer"))
                })?;
                record.set_weight(*key, weight);
            }

            table.insert(record);
        }

        table.names.sort();
        Ok(table)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Case-insensitive exact lookup
    pub fn get(&self, name: &str) -> Option<&WeightRecord> {
        self.records.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(&name.to_lowercase())
    }

    /// Every card name, ascending
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Rows skipped because their name was already present
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
