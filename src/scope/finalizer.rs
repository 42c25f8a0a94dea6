//! Input-set finalizer - install complete input lists after synthesis
//!
//! Synthesized inputs are written straight into the value registry, which
//! bypasses the declared-input list a resolve pass would otherwise derive.
//! Once that has happened the whole list has to be set by hand.

use super::context::ScopeContextStore;
use crate::graph::{GraphId, Model};
use crate::value::ValueRef;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How repeated names in the finalized input list are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputPolicy {
    /// Keep every entry; the downstream validator deduplicates
    #[default]
    Preserve,
    /// Keep only the first entry for each name
    Deduplicate,
}

pub struct InputFinalizer {
    policy: InputPolicy,
}

impl InputFinalizer {
    pub fn new(policy: InputPolicy) -> Self {
        Self { policy }
    }

    /// Install consumed ++ synthesized ++ declared inputs on `graph`.
    ///
    /// Returns false (and leaves the graph untouched) when nothing was
    /// synthesized for it.
    pub fn finalize(&self, model: &mut Model, graph: GraphId, store: &ScopeContextStore) -> bool {
        let g = model.graph(graph);
        let Some(record) = store.get(g.name()) else {
            return false;
        };
        if record.synthesized().is_empty() {
            return false;
        }

        let mut inputs: Vec<ValueRef> = record
            .consumed()
            .values()
            .chain(record.synthesized().values())
            .cloned()
            .collect();
        inputs.extend(g.inputs_including_initializers().into_iter().cloned());

        if self.policy == InputPolicy::Deduplicate {
            let mut seen = HashSet::new();
            inputs.retain(|v| seen.insert(v.name.clone()));
        }

        tracing::info!(
            "Finalized {} input(s) for graph '{}' ({} synthesized)",
            inputs.len(),
            g.name(),
            record.synthesized().len()
        );
        model.graph_mut(graph).set_inputs(inputs);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::scope::ContextBuilder;

    fn names(model: &Model, graph: GraphId) -> Vec<String> {
        model.graph(graph).inputs().iter().map(|v| v.name.clone()).collect()
    }

    fn model_with_store() -> (Model, ScopeContextStore) {
        let mut model = Model::new("main");
        let root = model.root();
        model.graph_mut(root).add_input(ValueRef::new("a"));
        model.graph_mut(root).add_initializer(ValueRef::new("w"));
        model.add_node(root, Node::new("mm", "MatMul").with_inputs(["a", "w"]).with_outputs(["y"]));

        let mut store = ScopeContextStore::new();
        ContextBuilder::new(&model).build(root, &mut store);
        (model, store)
    }

    #[test]
    fn test_noop_without_synthesis() {
        let (mut model, store) = model_with_store();
        let root = model.root();
        let before = names(&model, root);

        assert!(!InputFinalizer::new(InputPolicy::Preserve).finalize(&mut model, root, &store));
        assert_eq!(names(&model, root), before);
    }

    #[test]
    fn test_noop_without_record() {
        let (mut model, _) = model_with_store();
        let root = model.root();
        let store = ScopeContextStore::new();
        assert!(!InputFinalizer::new(InputPolicy::Preserve).finalize(&mut model, root, &store));
    }

    #[test]
    fn test_preserve_order_and_duplicates() {
        let (mut model, mut store) = model_with_store();
        let root = model.root();
        store.entry("main").record_synthesized(ValueRef::new("x"));

        assert!(InputFinalizer::new(InputPolicy::Preserve).finalize(&mut model, root, &store));
        assert_eq!(names(&model, root), vec!["a", "w", "x", "a", "w"]);
    }

    #[test]
    fn test_deduplicate_keeps_first() {
        let (mut model, mut store) = model_with_store();
        let root = model.root();
        store.entry("main").record_synthesized(ValueRef::new("x"));

        assert!(InputFinalizer::new(InputPolicy::Deduplicate).finalize(&mut model, root, &store));
        assert_eq!(names(&model, root), vec!["a", "w", "x"]);
    }
}
