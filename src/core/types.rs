//! Strongly-typed keys for weight lookups
//!
//! A weight table column is identified by the format it applies to and the
//! role the card plays in the deck. Keeping both as enums instead of raw
//! column names lets the scorer ask for "historic commander weight" without
//! knowing how a particular CSV spells it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Game format variant selecting which weight column applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatVariant {
    /// Historic Brawl (`hb` columns)
    #[default]
    Historic,
    /// Standard Brawl (`sb` columns)
    Standard,
}

impl FormatVariant {
    pub const ALL: [FormatVariant; 2] = [FormatVariant::Historic, FormatVariant::Standard];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatVariant::Historic => "historic",
            FormatVariant::Standard => "standard",
        }
    }
}

impl fmt::Display for FormatVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "historic" | "hb" => Ok(FormatVariant::Historic),
            "standard" | "sb" => Ok(FormatVariant::Standard),
            _ => Err(format!(
                "invalid format '{s}' (expected: historic/hb, standard/sb)"
            )),
        }
    }
}

/// Role a card plays in the deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardRole {
    /// One of the 99 (or any non-commander card)
    MainDeck,
    Commander,
}

impl fmt::Display for CardRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardRole::MainDeck => write!(f, "main-deck"),
            CardRole::Commander => write!(f, "commander"),
        }
    }
}

/// Identifies one weight column: (format, role)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeightKey {
    pub format: FormatVariant,
    pub role: CardRole,
}

impl WeightKey {
    pub fn new(format: FormatVariant, role: CardRole) -> Self {
        WeightKey { format, role }
    }

    pub fn main_deck(format: FormatVariant) -> Self {
        WeightKey::new(format, CardRole::MainDeck)
    }

    pub fn commander(format: FormatVariant) -> Self {
        WeightKey::new(format, CardRole::Commander)
    }
}

impl fmt::Display for WeightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.format, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("historic".parse::<FormatVariant>(), Ok(FormatVariant::Historic));
        assert_eq!("SB".parse::<FormatVariant>(), Ok(FormatVariant::Standard));
        assert!("pauper".parse::<FormatVariant>().is_err());
    }

    #[test]
    fn test_weight_key_display() {
        let key = WeightKey::commander(FormatVariant::Standard);
        assert_eq!(key.to_string(), "standard/commander");
    }
}
