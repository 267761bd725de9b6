//! Keyword aggregation — liberal decode and union-only accumulation.
//!
//! The upstream extraction step is not strictly typed, so the keyword field
//! of a backend response arrives in one of several shapes. [`KeywordPayload`]
//! decodes them all and normalizes to a flat string batch; [`KeywordSet`]
//! accumulates batches for the lifetime of the session.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

// ── Payload decode ──────────────────────────────────────────────────

/// Keyword data as it appears on the wire.
///
/// Decode fallback order: a direct list, an object with a `keywords` list
/// property, an object whose values are scanned for nested lists, or a
/// string (parsed as a JSON array, falling back to comma-splitting). Any
/// other shape degrades to an empty batch rather than a decode failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum KeywordPayload {
    List(Vec<Value>),
    Map(serde_json::Map<String, Value>),
    Text(String),
    Other(Value),
}

impl KeywordPayload {
    /// Normalize into a flat batch of keyword strings.
    ///
    /// Non-string and blank entries are dropped after extraction.
    pub fn into_keywords(self) -> Vec<String> {
        let raw = match self {
            Self::List(values) => values,
            Self::Map(map) => match map.get("keywords") {
                Some(Value::Array(list)) => list.clone(),
                _ => map
                    .values()
                    .filter_map(Value::as_array)
                    .flatten()
                    .cloned()
                    .collect(),
            },
            Self::Text(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Array(list)) => list,
                // Valid JSON but not a list — nothing usable.
                Ok(_) => Vec::new(),
                Err(_) => text
                    .split(',')
                    .map(|part| Value::String(part.trim().to_string()))
                    .collect(),
            },
            Self::Other(value) => {
                tracing::warn!(?value, "Unrecognized keyword payload shape");
                Vec::new()
            }
        };

        raw.into_iter()
            .filter_map(|value| match value {
                Value::String(s) => {
                    let trimmed = s.trim();
                    (!trimmed.is_empty()).then(|| trimmed.to_string())
                }
                _ => None,
            })
            .collect()
    }
}

// ── Growth policy ───────────────────────────────────────────────────

/// Growth policy for the accumulated keyword set.
pub trait KeywordPolicy: Send + Sync {
    /// Whether a new keyword may be admitted given the current set size.
    fn admit(&self, current_size: usize) -> bool;
}

/// Default policy: the set grows for the lifetime of the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnboundedGrowth;

impl KeywordPolicy for UnboundedGrowth {
    fn admit(&self, _current_size: usize) -> bool {
        true
    }
}

/// Cap the set at a fixed size; later arrivals are dropped.
#[derive(Debug, Clone, Copy)]
pub struct CappedGrowth(pub usize);

impl KeywordPolicy for CappedGrowth {
    fn admit(&self, current_size: usize) -> bool {
        current_size < self.0
    }
}

// ── Accumulated set ─────────────────────────────────────────────────

/// The set of distinct keywords extracted across the whole conversation.
///
/// Union-only: merges add, nothing is ever removed. Uniqueness is
/// case-insensitive; first-seen casing and insertion order are preserved
/// for display.
pub struct KeywordSet {
    entries: Vec<String>,
    seen: HashSet<String>,
    policy: Box<dyn KeywordPolicy>,
}

impl KeywordSet {
    pub fn new() -> Self {
        Self::with_policy(Box::new(UnboundedGrowth))
    }

    pub fn with_policy(policy: Box<dyn KeywordPolicy>) -> Self {
        Self {
            entries: Vec::new(),
            seen: HashSet::new(),
            policy,
        }
    }

    /// Merge a normalized batch into the set. Returns how many entries
    /// were actually added.
    pub fn merge<I>(&mut self, batch: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let mut added = 0;
        for keyword in batch {
            let keyword = keyword.trim();
            if keyword.is_empty() {
                continue;
            }
            let key = keyword.to_lowercase();
            if self.seen.contains(&key) {
                continue;
            }
            if !self.policy.admit(self.entries.len()) {
                tracing::debug!(keyword, "Keyword cap reached, dropping");
                continue;
            }
            self.seen.insert(key);
            self.entries.push(keyword.to_string());
            added += 1;
        }
        added
    }

    /// Current keywords in first-seen order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.seen.contains(&keyword.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KeywordSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("KeywordSet").field(&self.entries).finish()
    }
}
