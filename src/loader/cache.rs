//! Weight table cache
//!
//! Each configured table moves through
//! `Unloaded -> Loading -> Loaded | Failed`. The first caller that needs a
//! table spawns its load; everyone arriving while it runs subscribes to the
//! same completion channel, so a table is fetched at most once at a time no
//! matter how many callers race for it.
//!
//! A failed load does not stick: the next request starts a fresh one. A
//! reload that fails keeps serving the previously loaded table.

use crate::error::DataSourceError;
use crate::loader::source::TableSource;
use crate::loader::table::{TableSpec, WeightRecord, WeightTable};
use crate::{Result, WeightsError};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::time::Instant;

type LoadOutcome = std::result::Result<Arc<WeightTable>, DataSourceError>;
type LoadSignal = watch::Receiver<Option<LoadOutcome>>;

enum TableState {
    Unloaded,
    Loading {
        done: LoadSignal,
        /// Table to fall back to if this load fails
        previous: Option<Arc<WeightTable>>,
    },
    Loaded(Arc<WeightTable>),
    Failed(DataSourceError),
}

/// Observable lifecycle of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Unloaded,
    Loading,
    Loaded { records: usize },
    Failed { error: DataSourceError },
}

struct Inner {
    source: Arc<dyn TableSource>,
    specs: FxHashMap<String, TableSpec>,
    states: RwLock<FxHashMap<String, TableState>>,
}

/// Shared, lazily populated cache of weight tables
pub struct WeightCache {
    inner: Arc<Inner>,
}

/// The load task for a table has gone away without reporting
fn is_abandoned(done: &LoadSignal) -> bool {
    done.has_changed().is_err() && done.borrow().is_none()
}

impl WeightCache {
    /// Create a cache over `source` serving the given tables
    pub fn new(source: Arc<dyn TableSource>, specs: impl IntoIterator<Item = TableSpec>) -> Self {
        let specs = specs
            .into_iter()
            .map(|spec| (spec.id.clone(), spec))
            .collect();
        WeightCache {
            inner: Arc::new(Inner {
                source,
                specs,
                states: RwLock::new(FxHashMap::default()),
            }),
        }
    }

    /// Get a clone of the cache handle (shares the tables)
    pub fn clone_handle(&self) -> Self {
        WeightCache {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn spec(&self, table_id: &str) -> Result<&TableSpec> {
        self.inner
            .specs
            .get(table_id)
            .ok_or_else(|| WeightsError::UnknownTable(table_id.to_string()))
    }

    /// Configured table ids, sorted
    pub fn table_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.specs.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn status(&self, table_id: &str) -> TableStatus {
        let states = self.inner.states.read().await;
        match states.get(table_id) {
            None | Some(TableState::Unloaded) => TableStatus::Unloaded,
            Some(TableState::Loading { .. }) => TableStatus::Loading,
            Some(TableState::Loaded(table)) => TableStatus::Loaded {
                records: table.len(),
            },
            Some(TableState::Failed(error)) => TableStatus::Failed {
                error: error.clone(),
            },
        }
    }

    /// The loaded table, loading it first if needed
    pub async fn table(&self, table_id: &str) -> Result<Arc<WeightTable>> {
        self.acquire(table_id, false).await
    }

    /// Fetch and parse a table, replacing the cached copy on success
    ///
    /// Joins a load that is already in flight instead of starting another.
    pub async fn load(&self, table_id: &str) -> Result<Arc<WeightTable>> {
        self.acquire(table_id, true).await
    }

    /// Case-insensitive exact lookup of one card
    pub async fn lookup(&self, table_id: &str, card_name: &str) -> Result<Option<WeightRecord>> {
        let table = self.table(table_id).await?;
        Ok(table.get(card_name).cloned())
    }

    /// Every card name in a table, ascending
    pub async fn all_names(&self, table_id: &str) -> Result<Vec<String>> {
        Ok(self.table(table_id).await?.names().to_vec())
    }

    /// Forget a loaded or failed table; an in-flight load is left alone
    pub async fn invalidate(&self, table_id: &str) -> Result<()> {
        self.spec(table_id)?;
        let mut states = self.inner.states.write().await;
        if let Some(state) = states.get_mut(table_id) {
            if !matches!(state, TableState::Loading { .. }) {
                *state = TableState::Unloaded;
            }
        }
        Ok(())
    }

    /// Load every configured table in parallel
    /// Returns (table id, records) pairs sorted by id
    pub async fn load_all(&self) -> Result<Vec<(String, usize)>> {
        let mut tasks = Vec::new();
        for table_id in self.table_ids() {
            let cache = self.clone_handle();
            let task_id = table_id.clone();
            tasks.push((
                task_id,
                tokio::spawn(async move { cache.load(&table_id).await }),
            ));
        }

        // Fail fast on the first table that does not load
        let mut loaded = Vec::with_capacity(tasks.len());
        for (table_id, task) in tasks {
            match task.await {
                Ok(Ok(table)) => loaded.push((table_id, table.len())),
                Ok(Err(e)) => return Err(e),
                Err(e) => {
                    return Err(DataSourceError::Transport {
                        table: table_id,
                        reason: format!("load task failed: {e}"),
                    }
                    .into())
                }
            }
        }
        Ok(loaded)
    }

    async fn acquire(&self, table_id: &str, force: bool) -> Result<Arc<WeightTable>> {
        let spec = self.spec(table_id)?;

        // Fast path: already loaded, or reloading with a table still served
        if !force {
            let states = self.inner.states.read().await;
            match states.get(table_id) {
                Some(TableState::Loaded(table))
                | Some(TableState::Loading {
                    previous: Some(table),
                    ..
                }) => return Ok(Arc::clone(table)),
                _ => {}
            }
        }

        let done = {
            let mut states = self.inner.states.write().await;
            let state = states
                .entry(table_id.to_string())
                .or_insert(TableState::Unloaded);
            match *state {
                TableState::Loaded(ref table)
                | TableState::Loading {
                    previous: Some(ref table),
                    ..
                } if !force => return Ok(Arc::clone(table)),
                TableState::Loading { ref done, .. } if !is_abandoned(done) => done.clone(),
                _ => {
                    let previous = match std::mem::replace(state, TableState::Unloaded) {
                        TableState::Loaded(table) => Some(table),
                        TableState::Loading { previous, .. } => previous,
                        TableState::Unloaded | TableState::Failed(_) => None,
                    };
                    let (tx, rx) = watch::channel(None);
                    *state = TableState::Loading {
                        done: rx.clone(),
                        previous,
                    };
                    self.spawn_load(spec.clone(), tx);
                    rx
                }
            }
        };

        Self::wait(table_id, done).await.map_err(WeightsError::from)
    }

    fn spawn_load(&self, spec: TableSpec, tx: watch::Sender<Option<LoadOutcome>>) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let outcome = inner.fetch_and_parse(&spec).await;
            {
                let mut states = inner.states.write().await;
                let previous = match states.remove(&spec.id) {
                    Some(TableState::Loading { previous, .. }) => previous,
                    _ => None,
                };
                let next = match (&outcome, previous) {
                    (Ok(table), _) => TableState::Loaded(Arc::clone(table)),
                    (Err(_), Some(previous)) => TableState::Loaded(previous),
                    (Err(error), None) => TableState::Failed(error.clone()),
                };
                states.insert(spec.id.clone(), next);
            }
            // State is final before anyone wakes up
            let _ = tx.send(Some(outcome));
        });
    }

    async fn wait(table_id: &str, mut done: LoadSignal) -> LoadOutcome {
        let interrupted = || DataSourceError::Interrupted {
            table: table_id.to_string(),
        };
        match done.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).clone().unwrap_or_else(|| Err(interrupted())),
            Err(_) => Err(interrupted()),
        }
    }
}

impl Inner {
    async fn fetch_and_parse(&self, spec: &TableSpec) -> LoadOutcome {
        let start = Instant::now();
        tracing::info!(table = %spec.id, source = self.source.name(), "loading weight table");

        let result = match self.source.fetch_table(spec).await {
            Ok(content) => WeightTable::parse(spec, &content),
            Err(WeightsError::DataSource(e)) => Err(e),
            Err(e) => Err(DataSourceError::Transport {
                table: spec.id.clone(),
                reason: e.to_string(),
            }),
        };

        match result {
            Ok(table) => {
                tracing::info!(
                    table = %spec.id,
                    records = table.len(),
                    duplicates = table.duplicates(),
                    elapsed = ?start.elapsed(),
                    "weight table loaded"
                );
                Ok(Arc::new(table))
            }
            Err(e) => {
                tracing::warn!(table = %spec.id, error = %e, "weight table failed to load");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardRole, FormatVariant};
    use crate::loader::source::StaticTableSource;
    use crate::loader::table::WeightColumn;

    fn spec() -> TableSpec {
        TableSpec::new(
            "main",
            "main.csv",
            vec![WeightColumn::new("weight", FormatVariant::Historic, CardRole::MainDeck)],
        )
    }

    #[tokio::test]
    async fn test_lazy_loading() {
        let source = Arc::new(
            StaticTableSource::new().with_table("main.csv", "name,weight\nSol Ring,5\n"),
        );
        let cache = WeightCache::new(source.clone(), [spec()]);

        assert_eq!(cache.status("main").await, TableStatus::Unloaded);

        let record = cache.lookup("main", "sol ring").await.unwrap();
        assert_eq!(record.map(|r| r.name), Some("Sol Ring".to_string()));
        assert_eq!(cache.status("main").await, TableStatus::Loaded { records: 1 });

        // Second lookup hits the cache
        assert!(cache.lookup("main", "Island").await.unwrap().is_none());
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let cache = WeightCache::new(Arc::new(StaticTableSource::new()), [spec()]);
        let err = cache.lookup("nope", "Forest").await.unwrap_err();
        assert!(matches!(err, WeightsError::UnknownTable(ref id) if id == "nope"));
    }

    #[tokio::test]
    async fn test_failed_fetch_reports_transport_error() {
        let cache = WeightCache::new(Arc::new(StaticTableSource::new()), [spec()]);
        let err = cache.table("main").await.unwrap_err();
        assert!(matches!(err, WeightsError::DataSource(DataSourceError::Transport { .. })));
        assert!(matches!(cache.status("main").await, TableStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let source =
            Arc::new(StaticTableSource::new().with_table("main.csv", "name,weight\nForest,1\n"));
        let cache = WeightCache::new(source.clone(), [spec()]);

        cache.table("main").await.unwrap();
        cache.invalidate("main").await.unwrap();
        assert_eq!(cache.status("main").await, TableStatus::Unloaded);
        cache.table("main").await.unwrap();
        assert_eq!(source.fetch_count(), 2);
    }
}
