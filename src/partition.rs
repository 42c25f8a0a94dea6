//! Partition context - one extraction, end to end
//!
//! Owns the sequencing of the scope passes for a single fragment. Each
//! run creates its own [`ScopeContextStore`], so independent fragments of
//! the same original model can be processed with independent contexts.

use crate::config::PartitionConfig;
use crate::extract::extract_fragment;
use crate::graph::{GraphId, Model};
use crate::node::NodeIndex;
use crate::scope::{
    verify_closure, BindReport, ContextBuilder, InputFinalizer, OuterScopeBinder, ScopeContextStore,
    UnboundValue,
};
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;

/// Everything a run produced besides the mutated fragment
#[derive(Debug, Clone, Serialize)]
pub struct PartitionOutcome {
    pub store: ScopeContextStore,
    pub report: BindReport,
    /// Graphs whose declared inputs were installed by the finalizer
    pub finalized: Vec<String>,
    pub unbound: Vec<UnboundValue>,
}

impl PartitionOutcome {
    /// No diagnostics and nothing left unbound
    pub fn is_closed(&self) -> bool {
        self.report.is_clean() && self.unbound.is_empty()
    }
}

impl fmt::Display for PartitionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Partition Summary:")?;
        writeln!(f, "  Graph levels: {}", self.store.len())?;
        writeln!(f, "  Outer-scope bindings: {}", self.report.outer_scope.len())?;
        writeln!(f, "  Synthesized inputs: {}", self.store.synthesized_count())?;
        writeln!(f, "  Finalized graphs: {}", self.finalized.len())?;
        writeln!(f, "  Diagnostics: {}", self.report.diagnostics.len())?;
        writeln!(f, "  Unbound values: {}", self.unbound.len())
    }
}

pub struct PartitionContext<'a> {
    original: &'a Model,
    config: PartitionConfig,
}

impl<'a> PartitionContext<'a> {
    pub fn new(original: &'a Model, config: PartitionConfig) -> Self {
        Self { original, config }
    }

    /// Run build, bind and finalize on `built`, whose root corresponds to
    /// `original_graph` in the original model.
    pub fn run(&self, built: &mut Model, original_graph: GraphId) -> Result<PartitionOutcome> {
        let root = built.root();
        let mut store = ScopeContextStore::new();

        ContextBuilder::new(built).build(root, &mut store);

        let report = OuterScopeBinder::new(self.original)
            .strict(self.config.strict_structure)
            .bind(built, root, original_graph, &mut store)?;

        let finalizer = InputFinalizer::new(self.config.input_policy);
        let mut finalized = Vec::new();
        for id in built.descendants(root) {
            if finalizer.finalize(built, id, &store) {
                finalized.push(built.graph(id).name().to_string());
            }
        }

        let unbound = verify_closure(built, root, &store);
        tracing::info!(
            "Partitioned '{}': {} synthesized input(s), {} diagnostic(s), {} unbound",
            built.graph(root).name(),
            store.synthesized_count(),
            report.diagnostics.len(),
            unbound.len()
        );

        Ok(PartitionOutcome {
            store,
            report,
            finalized,
            unbound,
        })
    }

    /// Extract `nodes` of `graph` into a new fragment and run all passes on it
    pub fn extract(&self, graph: GraphId, nodes: &[NodeIndex]) -> Result<(Model, PartitionOutcome)> {
        let source = self
            .original
            .get(graph)
            .ok_or_else(|| Error::GraphNotFound(format!("{:?}", graph)))?;
        let default_name = format!("{}_fragment", source.name());
        let name = self.config.fragment_name.as_deref().unwrap_or(&default_name);
        let mut fragment = extract_fragment(self.original, graph, nodes, name)?;
        let outcome = self.run(&mut fragment, graph)?;
        Ok((fragment, outcome))
    }
}
