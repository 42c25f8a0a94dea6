//! Graph model - in-memory host graphs with nested control-flow bodies
//!
//! A [`Model`] is an arena of [`Graph`]s addressed by [`GraphId`]. The root
//! graph has no parent; every nested graph records its parent graph and the
//! index of the control-flow node that owns it. Node lists are sparse:
//! removing a node leaves a hole so that existing indices stay valid.
//!
//! Graphs here are always in their *build-time* state. Nothing in this
//! module derives inputs or outputs from the node list; that is the job of
//! the host's resolve pass (and, for extracted fragments, of
//! [`crate::scope`]).

use crate::node::{Node, NodeIndex};
use crate::value::{ValueRef, ValueType};
use crate::{Error, Result};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier of a graph inside a [`Model`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphId(pub u32);

impl GraphId {
    /// The root graph of every model
    pub fn root() -> Self {
        Self(0)
    }
}

/// A single graph level.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    name: String,
    parent: Option<GraphId>,
    /// Owning node in the parent graph
    parent_node: Option<NodeIndex>,
    nodes: Vec<Option<Node>>,
    /// Graph-local value registry
    node_args: HashMap<String, ValueRef>,
    inputs: Vec<ValueRef>,
    initializers: Vec<ValueRef>,
    outputs: Vec<ValueRef>,
    /// Names declared as coming from an enclosing scope
    outer_scope_args: IndexSet<String>,
}

impl Graph {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<GraphId> {
        self.parent
    }

    /// Index of the owning node in the parent graph, if this graph is nested
    pub fn parent_node(&self) -> Option<NodeIndex> {
        self.parent_node
    }

    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.0).and_then(Option::as_ref)
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        self.nodes.get_mut(index.0).and_then(Option::as_mut)
    }

    /// Iterate present nodes, skipping holes
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|node| (NodeIndex(i), node)))
    }

    /// Find a node by name
    pub fn find_node(&self, name: &str) -> Option<(NodeIndex, &Node)> {
        self.nodes().find(|(_, node)| node.name == name)
    }

    /// Add a node, registering every value it touches in the graph-local
    /// registry. Untyped references pick up a type already registered here.
    pub fn add_node(&mut self, mut node: Node) -> NodeIndex {
        for arg in node
            .inputs
            .iter_mut()
            .chain(node.implicit_inputs.iter_mut())
            .chain(node.outputs.iter_mut())
        {
            if !arg.exists() {
                continue;
            }
            let registered = self.get_or_create_node_arg(&arg.name, arg.ty.clone());
            if arg.ty.is_none() {
                arg.ty = registered.ty.clone();
            }
        }
        self.nodes.push(Some(node));
        NodeIndex(self.nodes.len() - 1)
    }

    /// Remove a node, leaving a hole at its index
    pub fn remove_node(&mut self, index: NodeIndex) -> Option<Node> {
        self.nodes.get_mut(index.0).and_then(Option::take)
    }

    /// Graph-local value lookup (does not walk enclosing scopes)
    pub fn node_arg(&self, name: &str) -> Option<&ValueRef> {
        self.node_args.get(name)
    }

    /// Get the value registered under `name`, creating it if needed.
    ///
    /// An existing untyped entry adopts `ty`; an existing typed entry keeps
    /// its type.
    pub fn get_or_create_node_arg(&mut self, name: &str, ty: Option<ValueType>) -> &ValueRef {
        let entry = self
            .node_args
            .entry(name.to_string())
            .or_insert_with(|| ValueRef::new(name));
        if entry.ty.is_none() {
            entry.ty = ty;
        }
        entry
    }

    /// Declared inputs (excluding initializers not listed as inputs)
    pub fn inputs(&self) -> &[ValueRef] {
        &self.inputs
    }

    pub fn add_input(&mut self, input: ValueRef) {
        self.get_or_create_node_arg(&input.name, input.ty.clone());
        self.inputs.push(input);
    }

    /// Replace the declared input list
    pub fn set_inputs(&mut self, inputs: Vec<ValueRef>) {
        for input in &inputs {
            self.get_or_create_node_arg(&input.name, input.ty.clone());
        }
        self.inputs = inputs;
    }

    pub fn initializers(&self) -> &[ValueRef] {
        &self.initializers
    }

    pub fn add_initializer(&mut self, initializer: ValueRef) {
        self.get_or_create_node_arg(&initializer.name, initializer.ty.clone());
        self.initializers.push(initializer);
    }

    /// Declared inputs followed by initializers not already declared
    pub fn inputs_including_initializers(&self) -> Vec<&ValueRef> {
        let mut all: Vec<&ValueRef> = self.inputs.iter().collect();
        for init in &self.initializers {
            if !self.inputs.iter().any(|i| i.name == init.name) {
                all.push(init);
            }
        }
        all
    }

    /// Whether `name` is a declared input or an initializer
    pub fn declares_input(&self, name: &str) -> bool {
        self.inputs.iter().any(|v| v.name == name) || self.initializers.iter().any(|v| v.name == name)
    }

    pub fn outputs(&self) -> &[ValueRef] {
        &self.outputs
    }

    pub fn add_output(&mut self, output: ValueRef) {
        self.get_or_create_node_arg(&output.name, output.ty.clone());
        self.outputs.push(output);
    }

    /// Declare `name` as a value supplied by an enclosing scope
    pub fn add_outer_scope_node_arg(&mut self, name: &str) {
        self.outer_scope_args.insert(name.to_string());
    }

    pub fn outer_scope_node_args(&self) -> impl Iterator<Item = &str> {
        self.outer_scope_args.iter().map(String::as_str)
    }

    pub fn is_outer_scope_node_arg(&self, name: &str) -> bool {
        self.outer_scope_args.contains(name)
    }
}

/// Arena of graphs: one root plus every nested control-flow body.
#[derive(Debug, Clone)]
pub struct Model {
    graphs: Vec<Graph>,
}

impl Model {
    /// Create a model holding an empty root graph
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            graphs: vec![Graph::new(root_name)],
        }
    }

    pub fn root(&self) -> GraphId {
        GraphId::root()
    }

    pub fn get(&self, id: GraphId) -> Option<&Graph> {
        self.graphs.get(id.0 as usize)
    }

    /// Get a graph by id.
    ///
    /// Panics if `id` was not issued by this model.
    pub fn graph(&self, id: GraphId) -> &Graph {
        &self.graphs[id.0 as usize]
    }

    /// Mutable variant of [`Model::graph`]
    pub fn graph_mut(&mut self, id: GraphId) -> &mut Graph {
        &mut self.graphs[id.0 as usize]
    }

    pub fn graph_ids(&self) -> impl Iterator<Item = GraphId> {
        (0..self.graphs.len() as u32).map(GraphId)
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    pub fn find_graph(&self, name: &str) -> Option<GraphId> {
        self.graph_ids().find(|id| self.graph(*id).name == name)
    }

    /// Add a node to a graph
    pub fn add_node(&mut self, graph: GraphId, node: Node) -> NodeIndex {
        self.graph_mut(graph).add_node(node)
    }

    /// Create a nested graph owned by `node` under `attribute`
    pub fn add_subgraph(
        &mut self,
        graph: GraphId,
        node: NodeIndex,
        attribute: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<GraphId> {
        let owner_exists = self.get(graph).and_then(|g| g.node(node)).is_some();
        if !owner_exists {
            return Err(Error::NodeNotFound(format!("{} in graph {:?}", node, graph)));
        }

        let id = GraphId(self.graphs.len() as u32);
        let mut subgraph = Graph::new(name);
        subgraph.parent = Some(graph);
        subgraph.parent_node = Some(node);
        self.graphs.push(subgraph);

        if let Some(owner) = self.graph_mut(graph).node_mut(node) {
            owner.subgraphs.insert(attribute.into(), id);
        }
        Ok(id)
    }

    /// The control-flow node owning `graph`, if it is nested
    pub fn parent_node(&self, graph: GraphId) -> Option<&Node> {
        let g = self.get(graph)?;
        let index = g.parent_node?;
        self.get(g.parent?)?.node(index)
    }

    /// Walk parents up to the top-most graph
    pub fn top_level(&self, graph: GraphId) -> GraphId {
        let mut current = graph;
        while let Some(parent) = self.graph(current).parent {
            current = parent;
        }
        current
    }

    /// Enclosing graphs, nearest first
    pub fn ancestors(&self, graph: GraphId) -> Vec<GraphId> {
        let mut chain = Vec::new();
        let mut current = graph;
        while let Some(parent) = self.graph(current).parent {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// `graph` and every graph nested below it, in pre-order
    pub fn descendants(&self, graph: GraphId) -> Vec<GraphId> {
        let mut out = vec![graph];
        for (_, node) in self.graph(graph).nodes() {
            for subgraph in node.subgraphs.values() {
                out.extend(self.descendants(*subgraph));
            }
        }
        out
    }

    /// First known type for `name`, searching `graph` then its ancestors
    pub fn resolve_value_type(&self, graph: GraphId, name: &str) -> Option<&ValueType> {
        std::iter::once(graph)
            .chain(self.ancestors(graph))
            .find_map(|id| self.graph(id).node_arg(name).and_then(|v| v.ty.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ElemType;

    #[test]
    fn test_add_node_registers_args() {
        let mut model = Model::new("main");
        let root = model.root();
        let x = ValueRef::typed("x", ValueType::scalar(ElemType::Float32));

        model.add_node(root, Node::new("p", "Relu").with_inputs(["a"]).with_outputs([x]));
        let idx = model.add_node(root, Node::new("q", "Neg").with_inputs(["x"]).with_outputs(["y"]));

        let graph = model.graph(root);
        assert!(graph.node_arg("a").is_some());
        assert!(graph.node_arg("y").is_some());
        // untyped use picks up the registered type
        let q = graph.node(idx).unwrap();
        assert_eq!(q.inputs[0].ty, Some(ValueType::scalar(ElemType::Float32)));
    }

    #[test]
    fn test_sparse_nodes() {
        let mut model = Model::new("main");
        let root = model.root();
        let a = model.add_node(root, Node::new("a", "Relu"));
        model.add_node(root, Node::new("b", "Relu"));

        assert!(model.graph_mut(root).remove_node(a).is_some());
        let graph = model.graph(root);
        assert!(graph.node(a).is_none());
        assert!(graph.node(NodeIndex(1)).is_some());
        let names: Vec<&str> = graph.nodes().map(|(_, n)| n.name.as_str()).collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn test_nesting() {
        let mut model = Model::new("main");
        let root = model.root();
        let if_node = model.add_node(root, Node::new("if", "If").with_inputs(["c"]));
        let then_g = model.add_subgraph(root, if_node, "then_branch", "then").unwrap();
        let inner = model.add_node(then_g, Node::new("loop", "Loop"));
        let body = model.add_subgraph(then_g, inner, "body", "body").unwrap();

        assert_eq!(model.top_level(body), root);
        assert_eq!(model.ancestors(body), vec![then_g, root]);
        assert_eq!(model.descendants(root), vec![root, then_g, body]);
        assert_eq!(model.parent_node(then_g).unwrap().name, "if");
        assert!(model.parent_node(root).is_none());
        assert_eq!(model.find_graph("body"), Some(body));
        assert!(model.graph(root).node(if_node).unwrap().is_control_flow());
    }

    #[test]
    fn test_add_subgraph_requires_owner() {
        let mut model = Model::new("main");
        let root = model.root();
        assert!(model.add_subgraph(root, NodeIndex(3), "body", "body").is_err());
    }

    #[test]
    fn test_inputs_including_initializers() {
        let mut model = Model::new("main");
        let graph = model.graph_mut(GraphId::root());
        graph.add_input(ValueRef::new("a"));
        graph.add_input(ValueRef::new("w"));
        graph.add_initializer(ValueRef::new("w"));
        graph.add_initializer(ValueRef::new("b"));

        let names: Vec<&str> = graph
            .inputs_including_initializers()
            .into_iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "w", "b"]);
        assert!(graph.declares_input("b"));
        assert!(!graph.declares_input("z"));
    }

    #[test]
    fn test_get_or_create_keeps_existing_type() {
        let mut model = Model::new("main");
        let graph = model.graph_mut(GraphId::root());
        graph.get_or_create_node_arg("x", None);
        let ty = ValueType::unranked(ElemType::Int64);
        assert_eq!(graph.get_or_create_node_arg("x", Some(ty.clone())).ty, Some(ty.clone()));
        let other = ValueType::unranked(ElemType::Bool);
        assert_eq!(graph.get_or_create_node_arg("x", Some(other)).ty, Some(ty));
    }

    #[test]
    fn test_resolve_value_type_walks_ancestors() {
        let mut model = Model::new("main");
        let root = model.root();
        let x = ValueRef::typed("x", ValueType::scalar(ElemType::Int64));
        let if_node = model.add_node(root, Node::new("if", "If").with_outputs([x]));
        let then_g = model.add_subgraph(root, if_node, "then_branch", "then").unwrap();

        assert!(model.graph(then_g).node_arg("x").is_none());
        assert_eq!(
            model.resolve_value_type(then_g, "x"),
            Some(&ValueType::scalar(ElemType::Int64))
        );

        // an untyped local entry does not hide the ancestor's type
        model.add_node(then_g, Node::new("id", "Identity").with_inputs(["x"]));
        assert!(model.graph(then_g).node_arg("x").unwrap().ty.is_none());
        assert_eq!(
            model.resolve_value_type(then_g, "x"),
            Some(&ValueType::scalar(ElemType::Int64))
        );
    }
}
