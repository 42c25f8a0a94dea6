//! Graph documents - nested JSON description of a model
//!
//! The arena in [`crate::graph`] is convenient to mutate but awkward to
//! write by hand, so models are exchanged as a tree: each node lists its
//! control-flow bodies inline under their attribute names.

use crate::graph::{GraphId, Model};
use crate::node::Node;
use crate::value::ValueRef;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<ValueRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub initializers: Vec<ValueRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<ValueRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outer_scope: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub name: String,
    pub op_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<ValueRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<ValueRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implicit_inputs: Vec<ValueRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subgraphs: BTreeMap<String, GraphDocument>,
}

/// Read a graph document from a JSON file
pub fn load_document(path: &Path) -> Result<GraphDocument> {
    let contents = std::fs::read_to_string(path)?;
    let document = serde_json::from_str(&contents)?;
    Ok(document)
}

/// Write a graph document as pretty JSON
pub fn write_document(path: &Path, document: &GraphDocument) -> Result<()> {
    let contents = serde_json::to_string_pretty(document)?;
    std::fs::write(path, contents)?;
    Ok(())
}

impl Model {
    /// Build a model from a document.
    ///
    /// Graph names must be unique across the whole tree, since scope
    /// bookkeeping is keyed by name.
    pub fn from_document(document: &GraphDocument) -> Result<Model> {
        let mut model = Model::new(document.name.clone());
        let mut seen = HashSet::new();
        seen.insert(document.name.clone());
        let root = model.root();
        fill_graph(&mut model, root, document, &mut seen)?;
        Ok(model)
    }

    /// Render `graph` and its nested bodies as a document
    pub fn to_document(&self, graph: GraphId) -> GraphDocument {
        let g = self.graph(graph);
        let nodes = g
            .nodes()
            .map(|(_, node)| NodeDocument {
                name: node.name.clone(),
                op_type: node.op_type.clone(),
                inputs: node.inputs.clone(),
                outputs: node.outputs.clone(),
                implicit_inputs: node.implicit_inputs.clone(),
                subgraphs: node
                    .subgraphs
                    .iter()
                    .map(|(attr, id)| (attr.clone(), self.to_document(*id)))
                    .collect(),
            })
            .collect();

        GraphDocument {
            name: g.name().to_string(),
            inputs: g.inputs().to_vec(),
            initializers: g.initializers().to_vec(),
            outputs: g.outputs().to_vec(),
            outer_scope: g.outer_scope_node_args().map(str::to_string).collect(),
            nodes,
        }
    }
}

fn fill_graph(
    model: &mut Model,
    graph: GraphId,
    document: &GraphDocument,
    seen: &mut HashSet<String>,
) -> Result<()> {
    {
        let g = model.graph_mut(graph);
        for input in &document.inputs {
            g.add_input(input.clone());
        }
        for init in &document.initializers {
            g.add_initializer(init.clone());
        }
        for output in &document.outputs {
            g.add_output(output.clone());
        }
        for name in &document.outer_scope {
            g.add_outer_scope_node_arg(name);
        }
    }

    for node_doc in &document.nodes {
        let node = Node::new(node_doc.name.clone(), node_doc.op_type.clone())
            .with_inputs(node_doc.inputs.clone())
            .with_outputs(node_doc.outputs.clone())
            .with_implicit_inputs(node_doc.implicit_inputs.clone());
        let index = model.add_node(graph, node);

        for (attr, sub_doc) in &node_doc.subgraphs {
            if !seen.insert(sub_doc.name.clone()) {
                return Err(Error::DuplicateGraph(sub_doc.name.clone()));
            }
            let sub = model.add_subgraph(graph, index, attr.clone(), sub_doc.name.clone())?;
            fill_graph(model, sub, sub_doc, seen)?;
        }
    }
    Ok(())
}
