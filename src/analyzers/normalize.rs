//! Score token normalization.

use crate::analyzers::types::{ScoreValue, SpecialCode};
use crate::transcript::RawScore;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Bidirectional lookup between special codes, their tokens, and their display text.
#[derive(Debug, Clone)]
pub struct SpecialCodeTable {
    by_token: HashMap<&'static str, SpecialCode>,
    by_text: HashMap<&'static str, SpecialCode>,
}

impl SpecialCodeTable {
    pub fn new() -> Self {
        let mut by_token = HashMap::new();
        let mut by_text = HashMap::new();

        for code in SpecialCode::ALL {
            by_token.insert(code.as_str(), code);
            if let Some(text) = code.display_text() {
                by_text.insert(text, code);
            }
        }

        Self { by_token, by_text }
    }

    pub fn code_for_token(&self, token: &str) -> Option<SpecialCode> {
        self.by_token.get(token).copied()
    }

    pub fn code_for_text(&self, text: &str) -> Option<SpecialCode> {
        self.by_text.get(text).copied()
    }
}

impl Default for SpecialCodeTable {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_TABLE: Lazy<SpecialCodeTable> = Lazy::new(SpecialCodeTable::new);

/// Turns raw score cells into [`ScoreValue`]s. Holds no state besides its table.
#[derive(Debug, Clone, Copy)]
pub struct ScoreNormalizer<'t> {
    table: &'t SpecialCodeTable,
}

impl<'t> ScoreNormalizer<'t> {
    pub fn new(table: &'t SpecialCodeTable) -> Self {
        Self { table }
    }

    /// Normalizes one raw cell. Never fails; unknown text becomes [`ScoreValue::Opaque`].
    pub fn normalize(&self, raw: &RawScore) -> ScoreValue {
        match raw {
            RawScore::Number(n) if n.is_finite() => ScoreValue::Numeric(*n),
            RawScore::Number(n) => ScoreValue::Opaque(n.to_string()),
            RawScore::Text(text) => self.normalize_text(text),
        }
    }

    pub fn normalize_text(&self, text: &str) -> ScoreValue {
        let token = text.trim();

        if let Ok(n) = token.parse::<f64>() {
            if n.is_finite() {
                return ScoreValue::Numeric(n);
            }
        }
        if let Some(code) = self.table.code_for_token(token) {
            return ScoreValue::Special(code);
        }
        if let Some(code) = self.table.code_for_text(token) {
            return ScoreValue::Special(code);
        }

        ScoreValue::Opaque(token.to_string())
    }
}

impl Default for ScoreNormalizer<'static> {
    fn default() -> Self {
        Self::new(&DEFAULT_TABLE)
    }
}
