//! Closure check - values the host's validation pass would reject
//!
//! Read-only. Reports instead of fixing: local reconstruction tolerates
//! gaps, the host's own resolve step stays authoritative.

use super::context::ScopeContextStore;
use super::locality::Locality;
use crate::graph::{GraphId, Model};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnboundValue {
    pub graph: String,
    pub name: String,
}

impl std::fmt::Display for UnboundValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' in graph '{}'", self.name, self.graph)
    }
}

/// List values under `root` that no reachable scope supplies.
///
/// - an outer-scope value of a nested graph must be accounted for by an
///   enclosing graph or declared at the top level
/// - once the top level has a declared input list, each value it consumes
///   must be declared there (or be an initializer)
///
/// A `root` that is not part of `model` yields nothing.
pub fn verify_closure(model: &Model, root: GraphId, store: &ScopeContextStore) -> Vec<UnboundValue> {
    if model.get(root).is_none() {
        return Vec::new();
    }
    let locality = Locality::new(model, store);
    let top = model.graph(model.top_level(root));
    let mut unbound = Vec::new();

    for id in model.descendants(root) {
        let g = model.graph(id);
        for name in g.outer_scope_node_args() {
            if !locality.is_outer_scope(id, name) && !top.declares_input(name) {
                unbound.push(UnboundValue {
                    graph: g.name().to_string(),
                    name: name.to_string(),
                });
            }
        }
    }

    if !top.inputs().is_empty() {
        if let Some(record) = store.get(top.name()) {
            for name in record.consumed().keys() {
                if !top.declares_input(name) {
                    unbound.push(UnboundValue {
                        graph: top.name().to_string(),
                        name: name.clone(),
                    });
                }
            }
        }
    }

    for value in &unbound {
        tracing::warn!("Unbound value {}", value);
    }
    unbound
}
