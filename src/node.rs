//! Nodes - operators inside a graph
//!
//! A node consumes and produces value references by name. Control-flow
//! nodes additionally own nested graphs (keyed by attribute name, e.g.
//! `then_branch`/`else_branch`) and carry implicit inputs: values their
//! bodies read from an enclosing scope without passing them as ordinary
//! inputs.

use crate::graph::GraphId;
use crate::value::ValueRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Position of a node in its graph's (sparse) node list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

impl std::fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node name, unique within its graph
    pub name: String,
    /// Operator type (e.g. `If`, `Loop`, `Relu`)
    pub op_type: String,
    pub inputs: Vec<ValueRef>,
    pub outputs: Vec<ValueRef>,
    /// Values the node's nested graphs read from enclosing scopes
    pub implicit_inputs: Vec<ValueRef>,
    /// Owned nested graphs by attribute name
    pub subgraphs: BTreeMap<String, GraphId>,
}

impl Node {
    pub fn new(name: impl Into<String>, op_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op_type: op_type.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            implicit_inputs: Vec::new(),
            subgraphs: BTreeMap::new(),
        }
    }

    pub fn with_inputs<I, V>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ValueRef>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_outputs<I, V>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ValueRef>,
    {
        self.outputs = outputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_implicit_inputs<I, V>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ValueRef>,
    {
        self.implicit_inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    /// Whether this node owns nested graphs
    pub fn is_control_flow(&self) -> bool {
        !self.subgraphs.is_empty()
    }

}
