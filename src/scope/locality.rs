//! Locality classifier - where does a value come from?
//!
//! Answers the questions a resolved graph would answer about its own
//! values, but for freshly built graphs that have not been resolved yet.
//! Everything is computed from the scope records and the graph nesting.

use super::context::ScopeContextStore;
use crate::graph::{Graph, GraphId, Model};
use serde::Serialize;

/// Where a value is accounted for, seen from one graph level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueLocality {
    /// Produced or consumed at this level
    Local,
    /// Accounted for by an enclosing graph (the nearest one)
    Inherited(GraphId),
    /// Not visible anywhere from this level outward
    External,
}

/// Answers locality questions for graphs of one model.
///
/// A `GraphId` issued by another model is never local and never inherited.
pub struct Locality<'a> {
    model: &'a Model,
    store: &'a ScopeContextStore,
}

impl<'a> Locality<'a> {
    pub fn new(model: &'a Model, store: &'a ScopeContextStore) -> Self {
        Self { model, store }
    }

    /// The value is produced or consumed directly at `graph`
    pub fn is_local(&self, graph: GraphId, name: &str) -> bool {
        self.model
            .get(graph)
            .and_then(|g| self.store.get(g.name()))
            .is_some_and(|record| record.accounts_for(name))
    }

    /// The value is local to `graph`, or (with `check_ancestors`) to any
    /// graph enclosing it
    pub fn is_input_or_output(&self, graph: GraphId, name: &str, check_ancestors: bool) -> bool {
        if self.is_local(graph, name) {
            return true;
        }
        match self.model.get(graph).and_then(Graph::parent) {
            Some(parent) if check_ancestors => self.is_input_or_output(parent, name, true),
            _ => false,
        }
    }

    /// The value is supplied to `graph` by some enclosing graph
    pub fn is_outer_scope(&self, graph: GraphId, name: &str) -> bool {
        self.model
            .get(graph)
            .and_then(Graph::parent)
            .is_some_and(|parent| self.is_input_or_output(parent, name, true))
    }

    pub fn classify(&self, graph: GraphId, name: &str) -> ValueLocality {
        if self.is_local(graph, name) {
            return ValueLocality::Local;
        }
        if self.model.get(graph).is_none() {
            return ValueLocality::External;
        }
        self.model
            .ancestors(graph)
            .into_iter()
            .find(|ancestor| self.is_local(*ancestor, name))
            .map_or(ValueLocality::External, ValueLocality::Inherited)
    }
}
