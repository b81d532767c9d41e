//! Calculator configuration
//!
//! Describes where the weight tables live, which CSV columns carry which
//! weights, and which tables the scorer reads. Loaded from TOML with a couple
//! of environment overrides; the defaults match the published
//! `WeightsMainDeck.csv` / `WeightsCommander.csv` pair.

use crate::core::{CardRole, FormatVariant, WeightKey};
use crate::loader::source::{DirTableSource, HttpTableSource, TableSource};
use crate::loader::table::{TableSpec, WeightColumn};
use crate::{Result, WeightsError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const ENV_CONFIG_PATH: &str = "MTGA_WEIGHTS_CONFIG";
pub const ENV_BASE_URL: &str = "MTGA_WEIGHTS_BASE_URL";
pub const ENV_DATA_DIR: &str = "MTGA_WEIGHTS_DATA_DIR";
pub const DEFAULT_CONFIG_PATH: &str = "config/weights.toml";

pub const MAIN_TABLE: &str = "main";
pub const COMMANDER_TABLE: &str = "commander";

/// Which tables the scorer reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub main_table: String,
    pub commander_table: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            main_table: MAIN_TABLE.to_string(),
            commander_table: COMMANDER_TABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightsConfig {
    /// Base URL the table resources are fetched from
    #[serde(default)]
    pub base_url: Option<String>,
    /// Local directory to read tables from instead of HTTP
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_tables")]
    pub tables: Vec<TableSpec>,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

fn default_tables() -> Vec<TableSpec> {
    use CardRole::{Commander, MainDeck};
    use FormatVariant::{Historic, Standard};

    vec![
        TableSpec::new(
            MAIN_TABLE,
            "csv/WeightsMainDeck.csv",
            vec![
                WeightColumn::new("weight_hb_99", Historic, MainDeck),
                WeightColumn::new("weight_sb_99", Standard, MainDeck),
            ],
        ),
        TableSpec::new(
            COMMANDER_TABLE,
            "csv/WeightsCommander.csv",
            vec![
                WeightColumn::new("weight_hb_cmd", Historic, Commander),
                WeightColumn::new("weight_sb_cmd", Standard, Commander),
            ],
        ),
    ]
}

impl Default for WeightsConfig {
    fn default() -> Self {
        WeightsConfig {
            base_url: None,
            data_dir: None,
            tables: default_tables(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl WeightsConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration using env var + fallbacks:
    /// 1) `$MTGA_WEIGHTS_CONFIG`
    /// 2) `config/weights.toml`
    /// 3) built-in defaults
    ///
    /// then apply `$MTGA_WEIGHTS_BASE_URL` / `$MTGA_WEIGHTS_DATA_DIR`.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(ENV_CONFIG_PATH) {
            Ok(path) => {
                let path = PathBuf::from(path);
                if !path.exists() {
                    return Err(WeightsError::Config(format!(
                        "{ENV_CONFIG_PATH} points to non-existent path {}",
                        path.display()
                    )));
                }
                Self::from_file(&path)?
            }
            Err(_) => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            self.base_url = Some(url);
        }
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn table(&self, id: &str) -> Option<&TableSpec> {
        self.tables.iter().find(|t| t.id == id)
    }

    /// Check that the scorer can find every weight it needs
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for table in &self.tables {
            if !seen.insert(table.id.as_str()) {
                return Err(WeightsError::Config(format!(
                    "duplicate table id '{}'",
                    table.id
                )));
            }
            if table.columns.is_empty() {
                return Err(WeightsError::Config(format!(
                    "table '{}' has no weight columns",
                    table.id
                )));
            }
        }

        let required = [
            (&self.scoring.main_table, CardRole::MainDeck),
            (&self.scoring.commander_table, CardRole::Commander),
        ];
        for (table_id, role) in required {
            let table = self.table(table_id).ok_or_else(|| {
                WeightsError::Config(format!("scoring table '{table_id}' is not configured"))
            })?;
            for format in FormatVariant::ALL {
                let key = WeightKey::new(format, role);
                if !table.provides(key) {
                    return Err(WeightsError::Config(format!(
                        "table '{table_id}' has no column for {key}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Build the table source this configuration points at
    pub fn build_source(&self) -> Result<Arc<dyn TableSource>> {
        if let Some(dir) = &self.data_dir {
            return Ok(Arc::new(DirTableSource::new(dir.clone())));
        }
        match &self.base_url {
            Some(url) => Ok(Arc::new(HttpTableSource::new(url.clone()))),
            None => Err(WeightsError::Config(format!(
                "no table source configured \
                 (set base_url, data_dir, {ENV_BASE_URL} or {ENV_DATA_DIR})"
            ))),
        }
    }
}
