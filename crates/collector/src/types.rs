//! Core types for resource collection

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Facts recorded by handlers during a collection run
///
/// Keys are unique; recording a fact under an existing key overwrites it.
/// Facts are never removed. Iteration is in key order so reports are
/// stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectedData {
    facts: BTreeMap<String, Value>,
}

impl CollectedData {
    /// Create an empty fact map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fact, returning the value it replaced (if any)
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.facts.insert(key.into(), value.into())
    }

    /// Look up a fact by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.facts.get(key)
    }

    /// Mutable access to an existing fact, for handlers that accumulate
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.facts.get_mut(key)
    }

    /// Check whether a fact has been recorded
    pub fn contains_key(&self, key: &str) -> bool {
        self.facts.contains_key(key)
    }

    /// Number of recorded facts
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Check if no facts have been recorded
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Iterate over facts in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.facts.iter()
    }

    /// Consume into the underlying map
    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.facts
    }
}

impl<'a> IntoIterator for &'a CollectedData {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.iter()
    }
}

/// Summary of a collection run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectSummary {
    /// Positions the cursor visited
    pub visited: usize,
    /// Positions claimed by a handler
    pub handled: usize,
    /// Positions no handler claimed
    pub unmatched: usize,
}

impl CollectSummary {
    /// Record the outcome for one position
    pub fn add_position(&mut self, matched: bool) {
        self.visited += 1;
        if matched {
            self.handled += 1;
        } else {
            self.unmatched += 1;
        }
    }

    /// Check if every visited position was claimed
    pub fn is_complete(&self) -> bool {
        self.unmatched == 0
    }
}
