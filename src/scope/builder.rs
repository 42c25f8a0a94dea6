//! Context builder - populate scope records from build-time graphs
//!
//! Nested bodies are visited before the graph that owns them, so a child's
//! record is always complete by the time anything asks about its parent.

use super::context::ScopeContextStore;
use crate::graph::{GraphId, Model};

/// Walks a graph tree and fills a [`ScopeContextStore`].
pub struct ContextBuilder<'a> {
    model: &'a Model,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self { model }
    }

    /// Populate records for `graph` and everything nested below it.
    ///
    /// Produced/consumed sets are recomputed from the current graph
    /// contents on every call; synthesized entries are kept. An id from
    /// another model leaves the store untouched.
    pub fn build(&self, graph: GraphId, store: &mut ScopeContextStore) {
        let Some(g) = self.model.get(graph) else {
            tracing::warn!("Graph {:?} is not part of this model", graph);
            return;
        };

        for (_, node) in g.nodes() {
            for subgraph in node.subgraphs.values() {
                self.build(*subgraph, store);
            }
        }

        let record = store.entry(g.name());
        record.reset_locals();

        for (_, node) in g.nodes() {
            for output in node.outputs.iter().filter(|v| v.exists()) {
                record.record_produced(&output.name);
            }
        }

        // Anything not produced here must be a graph input, an initializer
        // or an outer-scope value.
        for (_, node) in g.nodes() {
            for input in node.inputs.iter().filter(|v| v.exists()) {
                record.record_consumed(input);
            }
        }

        tracing::debug!(
            graph = g.name(),
            produced = record.produced().len(),
            consumed = record.consumed().len(),
            "built scope record"
        );
    }
}
