//! Parse-and-score entry point
//!
//! Ties the deck loader, the weight cache and the scorer together. One
//! calculator is meant to be shared by every request so the tables are only
//! fetched once.

use crate::config::{ScoringConfig, WeightsConfig};
use crate::core::FormatVariant;
use crate::loader::{DeckList, DeckLoader, WeightCache};
use crate::scoring::{score_deck, DeckScore};
use crate::Result;

pub struct WeightsCalculator {
    cache: WeightCache,
    scoring: ScoringConfig,
}

impl WeightsCalculator {
    pub fn new(cache: WeightCache, scoring: ScoringConfig) -> Self {
        WeightsCalculator { cache, scoring }
    }

    /// Validate `config` and build a calculator over its table source
    pub fn from_config(config: &WeightsConfig) -> Result<Self> {
        config.validate()?;
        let source = config.build_source()?;
        let cache = WeightCache::new(source, config.tables.iter().cloned());
        Ok(Self::new(cache, config.scoring.clone()))
    }

    pub fn cache(&self) -> &WeightCache {
        &self.cache
    }

    /// Parse pasted deck text without scoring it
    pub fn parse(&self, raw_deck: &str) -> DeckList {
        DeckLoader::parse(raw_deck)
    }

    /// Parse a deck list and score it for `format`
    ///
    /// Input that yields no cards scores as an empty deck without touching
    /// the tables.
    pub async fn parse_and_score(
        &self,
        raw_deck: &str,
        format: FormatVariant,
    ) -> Result<DeckScore> {
        let deck = self.parse(raw_deck);
        self.score(&deck, format).await
    }

    /// Score an already parsed deck
    pub async fn score(&self, deck: &DeckList, format: FormatVariant) -> Result<DeckScore> {
        if deck.is_empty() {
            return Ok(DeckScore::empty());
        }

        let has_commander = deck.entries.iter().any(|e| e.is_commander);
        let (main, commander) = if has_commander {
            // Independent reads; fetch both at once
            let (main, commander) = tokio::try_join!(
                self.cache.table(&self.scoring.main_table),
                self.cache.table(&self.scoring.commander_table),
            )?;
            (main, Some(commander))
        } else {
            (self.cache.table(&self.scoring.main_table).await?, None)
        };

        let score = score_deck(&deck.entries, &main, commander.as_deref(), format);
        tracing::debug!(
            %format,
            cards = score.cards.len(),
            total_weight = score.total_weight,
            "scored deck"
        );
        Ok(score)
    }

    /// Every card name the scorer knows, sorted and de-duplicated
    pub async fn list_known_card_names(&self) -> Result<Vec<String>> {
        let (main, commander) = tokio::try_join!(
            self.cache.table(&self.scoring.main_table),
            self.cache.table(&self.scoring.commander_table),
        )?;

        let mut names: Vec<String> = main.names().to_vec();
        if main.id() != commander.id() {
            names.extend_from_slice(commander.names());
            // Lookups ignore case, so "Sol Ring" and "sol ring" are one card
            names.sort_by_cached_key(|name| name.to_lowercase());
            names.dedup_by(|a, b| a.to_lowercase() == b.to_lowercase());
        }
        Ok(names)
    }
}
