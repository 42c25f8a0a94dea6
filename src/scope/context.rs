//! Scope context store - per-subgraph bookkeeping for one extraction
//!
//! Each record tracks, for a single graph level:
//! - values produced by nodes directly inside it
//! - values its nodes consume that are not produced there
//! - values synthesized as explicit top-level inputs

use crate::value::ValueRef;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::HashMap;

/// Bookkeeping for one graph level
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScopeRecord {
    produced: IndexSet<String>,
    /// Name → defining reference, in first-encounter order
    consumed: IndexMap<String, ValueRef>,
    synthesized: IndexMap<String, ValueRef>,
}

impl ScopeRecord {
    pub fn produced(&self) -> &IndexSet<String> {
        &self.produced
    }

    pub fn consumed(&self) -> &IndexMap<String, ValueRef> {
        &self.consumed
    }

    pub fn synthesized(&self) -> &IndexMap<String, ValueRef> {
        &self.synthesized
    }

    pub fn produces(&self, name: &str) -> bool {
        self.produced.contains(name)
    }

    pub fn consumes(&self, name: &str) -> bool {
        self.consumed.contains_key(name)
    }

    /// Whether the value is produced or consumed at this level
    pub fn accounts_for(&self, name: &str) -> bool {
        self.produces(name) || self.consumes(name)
    }

    pub(crate) fn record_produced(&mut self, name: &str) {
        self.produced.insert(name.to_string());
    }

    /// Record a consumed value unless it is produced here or already recorded.
    pub(crate) fn record_consumed(&mut self, value: &ValueRef) {
        if self.produced.contains(&value.name) {
            return;
        }
        self.consumed
            .entry(value.name.clone())
            .or_insert_with(|| value.clone());
    }

    /// Record a synthesized top-level input. Returns false if it was
    /// already recorded.
    pub fn record_synthesized(&mut self, value: ValueRef) -> bool {
        if self.synthesized.contains_key(&value.name) {
            return false;
        }
        self.synthesized.insert(value.name.clone(), value);
        true
    }

    /// Clear produced/consumed; synthesized entries survive
    pub(crate) fn reset_locals(&mut self) {
        self.produced.clear();
        self.consumed.clear();
    }

    /// `produced` and the keys of `consumed` never overlap
    pub fn is_disjoint(&self) -> bool {
        self.consumed.keys().all(|name| !self.produced.contains(name))
    }
}

/// Side table of scope records keyed by graph name.
///
/// One store belongs to exactly one extraction; independent extractions
/// use independent stores.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ScopeContextStore {
    records: HashMap<String, ScopeRecord>,
}

impl ScopeContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, graph_name: &str) -> Option<&ScopeRecord> {
        self.records.get(graph_name)
    }

    pub fn get_mut(&mut self, graph_name: &str) -> Option<&mut ScopeRecord> {
        self.records.get_mut(graph_name)
    }

    /// Get the record for a graph, creating an empty one if needed
    pub fn entry(&mut self, graph_name: &str) -> &mut ScopeRecord {
        self.records.entry(graph_name.to_string()).or_default()
    }

    pub fn contains(&self, graph_name: &str) -> bool {
        self.records.contains_key(graph_name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records sorted by graph name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScopeRecord)> {
        let mut entries: Vec<_> = self.records.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }

    /// Total synthesized inputs across all records
    pub fn synthesized_count(&self) -> usize {
        self.records.values().map(|r| r.synthesized.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumed_first_writer_wins() {
        let mut record = ScopeRecord::default();
        record.record_produced("y");
        record.record_consumed(&ValueRef::new("y"));
        record.record_consumed(&ValueRef::new("a"));
        record.record_consumed(&ValueRef::new("b"));
        record.record_consumed(&ValueRef::new("a"));

        let keys: Vec<&str> = record.consumed().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(record.is_disjoint());
        assert!(record.accounts_for("y"));
        assert!(!record.accounts_for("z"));
    }

    #[test]
    fn test_synthesized_survives_reset() {
        let mut store = ScopeContextStore::new();
        let record = store.entry("main");
        record.record_produced("y");
        assert!(record.record_synthesized(ValueRef::new("x")));
        assert!(!record.record_synthesized(ValueRef::new("x")));

        record.reset_locals();
        assert!(record.produced().is_empty());
        assert_eq!(record.synthesized().len(), 1);
        assert_eq!(store.synthesized_count(), 1);
    }

    #[test]
    fn test_store_iter_sorted() {
        let mut store = ScopeContextStore::new();
        store.entry("then");
        store.entry("else");
        store.entry("main");

        let names: Vec<&str> = store.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["else", "main", "then"]);
        assert!(store.contains("main"));
        assert!(store.get("loop").is_none());
    }
}
