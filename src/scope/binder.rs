//! Outer-scope binder - carry implicit inputs into rebuilt subgraphs
//!
//! The built fragment and the original graph are walked side by side.
//! Control-flow nodes are paired by name and their bodies by attribute
//! name. For every nested body the original owning node's implicit inputs
//! tell us which values the body reads from enclosing scopes; each one the
//! rebuilt body actually references is declared outer-scope there, and if
//! no enclosing level of the *fragment* accounts for it, it is added as an
//! explicit input of the fragment's top-level graph.
//!
//! The original model is only ever read.

use super::context::ScopeContextStore;
use super::locality::Locality;
use crate::graph::{GraphId, Model};
use crate::{Error, Result};
use serde::Serialize;

/// Structural disagreement between the built and the original tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A built control-flow node has no same-named node in the original
    MissingCounterpart { graph: String, node: String },
    /// The original node exists but has no body under this attribute
    MissingSubgraph {
        graph: String,
        node: String,
        attribute: String,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::MissingCounterpart { graph, node } => {
                write!(f, "node '{}' in graph '{}' has no counterpart in the original graph", node, graph)
            }
            Diagnostic::MissingSubgraph { graph, node, attribute } => write!(
                f,
                "original node '{}' (graph '{}') has no subgraph for attribute '{}'",
                node, graph, attribute
            ),
        }
    }
}

/// A value declared outer-scope in a rebuilt body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OuterScopeBinding {
    pub graph: String,
    pub value: String,
}

/// What a bind pass did
#[derive(Debug, Clone, Default, Serialize)]
pub struct BindReport {
    pub outer_scope: Vec<OuterScopeBinding>,
    /// Values newly added as explicit top-level inputs
    pub synthesized: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BindReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

pub struct OuterScopeBinder<'a> {
    original: &'a Model,
    strict: bool,
}

impl<'a> OuterScopeBinder<'a> {
    pub fn new(original: &'a Model) -> Self {
        Self {
            original,
            strict: false,
        }
    }

    /// Fail on the first structural diagnostic instead of skipping the branch
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Bind `built_graph` (in `built`) against `original_graph` (in the
    /// original model), recursing through every paired control-flow body.
    pub fn bind(
        &self,
        built: &mut Model,
        built_graph: GraphId,
        original_graph: GraphId,
        store: &mut ScopeContextStore,
    ) -> Result<BindReport> {
        if built.get(built_graph).is_none() {
            return Err(Error::GraphNotFound(format!("{:?} in built model", built_graph)));
        }
        if self.original.get(original_graph).is_none() {
            return Err(Error::GraphNotFound(format!("{:?} in original model", original_graph)));
        }
        let mut report = BindReport::default();
        self.bind_level(built, built_graph, original_graph, store, &mut report)?;
        Ok(report)
    }

    fn bind_level(
        &self,
        built: &mut Model,
        built_graph: GraphId,
        original_graph: GraphId,
        store: &mut ScopeContextStore,
        report: &mut BindReport,
    ) -> Result<()> {
        for (built_sub, original_sub) in self.pair_subgraphs(built, built_graph, original_graph, report)? {
            self.bind_level(built, built_sub, original_sub, store, report)?;
        }

        if built.graph(built_graph).parent_node().is_none() {
            return Ok(());
        }
        let Some(owner) = self.original.parent_node(original_graph) else {
            return Ok(());
        };

        for implicit in &owner.implicit_inputs {
            let name = implicit.name.as_str();

            // A sibling body under the same node may be the only reader.
            if built.graph(built_graph).node_arg(name).is_none() {
                continue;
            }

            built.graph_mut(built_graph).add_outer_scope_node_arg(name);
            report.outer_scope.push(OuterScopeBinding {
                graph: built.graph(built_graph).name().to_string(),
                value: name.to_string(),
            });

            if Locality::new(built, store).is_outer_scope(built_graph, name) {
                continue;
            }

            let top = built.top_level(built_graph);
            if built.graph(top).declares_input(name) {
                continue;
            }

            let ty = implicit.ty.clone().or_else(|| {
                self.original
                    .graph(original_graph)
                    .parent()
                    .and_then(|parent| self.original.resolve_value_type(parent, name))
                    .cloned()
            });
            let value = built.graph_mut(top).get_or_create_node_arg(name, ty).clone();
            let top_name = built.graph(top).name().to_string();

            if store.entry(&top_name).record_synthesized(value) {
                tracing::info!("Added explicit input '{}' to top-level graph '{}'", name, top_name);
                report.synthesized.push(name.to_string());
            }
        }
        Ok(())
    }

    /// Pair each built body with the original body owned by the same-named
    /// node under the same attribute.
    fn pair_subgraphs(
        &self,
        built: &Model,
        built_graph: GraphId,
        original_graph: GraphId,
        report: &mut BindReport,
    ) -> Result<Vec<(GraphId, GraphId)>> {
        let built_g = built.graph(built_graph);
        let original_g = self.original.graph(original_graph);
        let mut pairs = Vec::new();

        for (_, node) in built_g.nodes().filter(|(_, n)| n.is_control_flow()) {
            let Some((_, original_node)) = original_g.find_node(&node.name) else {
                self.report(
                    report,
                    Diagnostic::MissingCounterpart {
                        graph: built_g.name().to_string(),
                        node: node.name.clone(),
                    },
                )?;
                continue;
            };

            for (attribute, built_sub) in &node.subgraphs {
                match original_node.subgraphs.get(attribute) {
                    Some(original_sub) => pairs.push((*built_sub, *original_sub)),
                    None => self.report(
                        report,
                        Diagnostic::MissingSubgraph {
                            graph: original_g.name().to_string(),
                            node: original_node.name.clone(),
                            attribute: attribute.clone(),
                        },
                    )?,
                }
            }
        }
        Ok(pairs)
    }

    fn report(&self, report: &mut BindReport, diagnostic: Diagnostic) -> Result<()> {
        if self.strict {
            return Err(Error::StructuralMismatch(diagnostic));
        }
        tracing::warn!("{}", diagnostic);
        report.diagnostics.push(diagnostic);
        Ok(())
    }
}
