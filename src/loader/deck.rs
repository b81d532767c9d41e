//! Deck list loader (MTG Arena export text)
//!
//! Two input dialects are understood:
//! - line-oriented: one `"<qty> <name>"` per line with `Commander`, `Deck`
//!   and `Sideboard` section headers
//! - dense: everything on one line, scanned as consecutive `"<qty> <name>"`
//!   tokens
//!
//! A parse uses exactly one of them.

use crate::loader::normalize::{remove_extra_info, split_lines, strip_deck_word};
use nom::{
    bytes::complete::is_not, character::complete::digit0, combinator::recognize,
    sequence::pair, IResult,
};
use serde::Serialize;

const DIGITS: &str = "0123456789";

/// One card line of a parsed deck
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedCardEntry {
    pub name: String,
    pub quantity: u32,
    pub is_commander: bool,
}

impl ParsedCardEntry {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        ParsedCardEntry {
            name: name.into(),
            quantity,
            is_commander: false,
        }
    }

    pub fn commander(name: impl Into<String>) -> Self {
        ParsedCardEntry {
            name: name.into(),
            quantity: 1,
            is_commander: true,
        }
    }
}

/// Which input dialect produced a deck list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dialect {
    LineOriented,
    Dense,
}

/// A parsed deck, in input order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeckList {
    pub entries: Vec<ParsedCardEntry>,
    pub dialect: Dialect,
}

impl DeckList {
    /// The commander entry, if the deck designates one
    pub fn commander(&self) -> Option<&ParsedCardEntry> {
        self.entries.iter().find(|e| e.is_commander)
    }

    /// Total card count, commander included
    pub fn total_cards(&self) -> usize {
        self.entries.iter().map(|e| e.quantity as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Section header recognized at the start of a line or token
enum Header {
    Commander,
    Section,
}

fn header_of(text: &str) -> Option<Header> {
    if text.starts_with("Commander") {
        Some(Header::Commander)
    } else if text.starts_with("Deck") || text.starts_with("Sideboard") {
        Some(Header::Section)
    } else {
        None
    }
}

/// Collects entries and carries the one-shot commander flag
#[derive(Default)]
struct EntryBuilder {
    entries: Vec<ParsedCardEntry>,
    next_is_commander: bool,
}

impl EntryBuilder {
    /// Returns true if the text was a header and produced no entry
    fn header(&mut self, text: &str) -> bool {
        match header_of(text) {
            Some(Header::Commander) => {
                self.next_is_commander = true;
                true
            }
            Some(Header::Section) => {
                // A new section ends an empty commander section.
                self.next_is_commander = false;
                true
            }
            None => false,
        }
    }

    fn push(&mut self, name: &str, quantity: u32) {
        if !self.next_is_commander {
            let name = name.trim();
            if quantity == 0 || !name.chars().any(char::is_alphanumeric) {
                tracing::trace!(name, quantity, "ignoring deck line without a card");
                return;
            }
            self.entries.push(ParsedCardEntry::new(name, quantity));
            return;
        }

        let name = strip_deck_word(name);
        if !name.chars().any(char::is_alphanumeric) {
            tracing::trace!("ignoring empty commander line");
            return;
        }
        self.next_is_commander = false;
        // Last commander wins; earlier ones fall back to the main deck.
        for previous in self.entries.iter_mut().filter(|e| e.is_commander) {
            tracing::debug!(card = %previous.name, "demoting earlier commander");
            previous.is_commander = false;
        }
        self.entries.push(ParsedCardEntry::commander(name));
    }

    fn finish(self) -> Vec<ParsedCardEntry> {
        self.entries
    }
}

/// Deck loader for pasted deck lists
pub struct DeckLoader;

impl DeckLoader {
    /// Parse a deck list, detecting its dialect
    ///
    /// Never fails: lines that are not cards are dropped.
    pub fn parse(content: &str) -> DeckList {
        let lines: Vec<&str> = split_lines(content).map(remove_extra_info).collect();

        let line_entries = Self::parse_lines(&lines);
        let dialect = if line_entries.is_empty() {
            Dialect::Dense
        } else if lines.len() == 1 && Self::is_quantified_dense(lines[0]) {
            // A single line may be a whole deck squeezed together.
            let dense = Self::parse_dense(&lines);
            if dense.len() > 1 {
                tracing::debug!(entries = dense.len(), "single line parsed as dense deck");
                return DeckList {
                    entries: dense,
                    dialect: Dialect::Dense,
                };
            }
            Dialect::LineOriented
        } else {
            Dialect::LineOriented
        };

        let entries = match dialect {
            Dialect::LineOriented => line_entries,
            Dialect::Dense => Self::parse_dense(&lines),
        };
        tracing::debug!(?dialect, entries = entries.len(), "parsed deck list");
        DeckList { entries, dialect }
    }

    /// Line-oriented dialect: `"<qty> <name>"` per normalized line
    fn parse_lines(lines: &[&str]) -> Vec<ParsedCardEntry> {
        let mut builder = EntryBuilder::default();

        for line in lines {
            if line.is_empty() || builder.header(line) {
                continue;
            }

            // Format: "1 Card Name"
            let Some((count_str, name)) = line.split_once(' ') else {
                tracing::trace!(line, "ignoring deck line without a name");
                continue;
            };
            match count_str.parse::<u32>() {
                Ok(count) => builder.push(name, count),
                Err(_) => tracing::trace!(line, "ignoring deck line without a quantity"),
            }
        }

        builder.finish()
    }

    /// Every dense token on the line is `"<qty> <name>"`
    ///
    /// Digits inside a card name produce a token without a quantity, so such
    /// a line stays a single line-oriented entry.
    fn is_quantified_dense(line: &str) -> bool {
        dense_tokens(line)
            .into_iter()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .all(|token| {
                token
                    .split_once(' ')
                    .is_some_and(|(count, _)| count.parse::<u32>().is_ok())
            })
    }

    /// Dense dialect: scan `"<digits><non-digits>"` tokens across all lines
    fn parse_dense(lines: &[&str]) -> Vec<ParsedCardEntry> {
        let joined = lines.join(" ");
        let mut builder = EntryBuilder::default();

        for token in dense_tokens(&joined) {
            let token = token.trim();
            if token.is_empty() || builder.header(token) {
                continue;
            }

            let (quantity, name) = match token.split_once(' ') {
                Some((count_str, rest)) => match count_str.parse::<u32>() {
                    Ok(count) => (count, rest),
                    Err(_) => (1, token),
                },
                None => (1, token),
            };
            builder.push(name, quantity);
        }

        builder.finish()
    }
}

/// One dense token: optional digits followed by at least one non-digit
fn dense_token(input: &str) -> IResult<&str, &str> {
    recognize(pair(digit0, is_not(DIGITS)))(input)
}

/// Split text into dense tokens; a trailing run of bare digits is dropped
fn dense_tokens(mut input: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    while !input.is_empty() {
        match dense_token(input) {
            Ok((rest, token)) => {
                tokens.push(token);
                input = rest;
            }
            Err(_) => break,
        }
    }
    tokens
}
