//! Fragment extraction - copy a subset of nodes into a new model
//!
//! The copy is deliberately left unresolved: nested bodies keep their
//! names, nodes and declared inputs, but no outer-scope declarations are
//! carried over and the new root gets no declared inputs. Rebuilding that
//! bookkeeping is the job of [`crate::scope`].

use crate::graph::{GraphId, Model};
use crate::node::{Node, NodeIndex};
use crate::{Error, Result};
use std::collections::HashSet;

/// Copy `nodes` of `graph` (and all their nested bodies) into a new model
/// whose root graph is called `name`.
///
/// Original initializers read by the copied top-level nodes are copied as
/// initializers of the new root. Repeated indices are copied once. Scope
/// records are keyed by graph name, so `name` may not match any copied body.
pub fn extract_fragment(
    original: &Model,
    graph: GraphId,
    nodes: &[NodeIndex],
    name: &str,
) -> Result<Model> {
    let source = original
        .get(graph)
        .ok_or_else(|| Error::GraphNotFound(format!("{:?}", graph)))?;

    let mut fragment = Model::new(name);
    let root = fragment.root();
    let mut copied = HashSet::new();

    for &index in nodes {
        if !copied.insert(index) {
            continue;
        }
        let node = source.node(index).ok_or_else(|| {
            Error::NodeNotFound(format!("{} in graph {}", index, source.name()))
        })?;
        copy_node(original, node, &mut fragment, root)?;
    }

    let referenced: HashSet<&str> = fragment
        .graph(root)
        .nodes()
        .flat_map(|(_, node)| node.inputs.iter().chain(node.implicit_inputs.iter()))
        .map(|v| v.name.as_str())
        .collect();
    let initializers: Vec<_> = source
        .initializers()
        .iter()
        .filter(|init| referenced.contains(init.name.as_str()))
        .cloned()
        .collect();
    for init in initializers {
        fragment.graph_mut(root).add_initializer(init);
    }

    tracing::debug!(
        "Extracted {} node(s) from {} into {} ({} graph level(s))",
        copied.len(),
        source.name(),
        name,
        fragment.len()
    );
    Ok(fragment)
}

fn copy_node(original: &Model, node: &Node, fragment: &mut Model, into: GraphId) -> Result<()> {
    let mut copy = node.clone();
    copy.subgraphs.clear();
    let index = fragment.add_node(into, copy);

    for (attr, body) in &node.subgraphs {
        let body_name = original.graph(*body).name().to_string();
        if body_name == fragment.graph(fragment.root()).name() {
            return Err(Error::DuplicateGraph(body_name));
        }
        let target = fragment.add_subgraph(into, index, attr.clone(), body_name)?;
        copy_body(original, *body, fragment, target)?;
    }
    Ok(())
}

fn copy_body(original: &Model, source: GraphId, fragment: &mut Model, target: GraphId) -> Result<()> {
    let body = original.graph(source);
    {
        let g = fragment.graph_mut(target);
        for input in body.inputs() {
            g.add_input(input.clone());
        }
        for init in body.initializers() {
            g.add_initializer(init.clone());
        }
        for output in body.outputs() {
            g.add_output(output.clone());
        }
    }
    for (_, node) in body.nodes() {
        copy_node(original, node, fragment, target)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueRef;

    fn model() -> (Model, NodeIndex, NodeIndex) {
        let mut model = Model::new("main");
        let root = model.root();
        model.graph_mut(root).add_initializer(ValueRef::new("w"));
        model.graph_mut(root).add_initializer(ValueRef::new("unused"));
        let mm = model.add_node(root, Node::new("mm", "MatMul").with_inputs(["a", "w"]).with_outputs(["x"]));
        let if_node = model.add_node(
            root,
            Node::new("if", "If").with_inputs(["c"]).with_outputs(["y"]).with_implicit_inputs(["x"]),
        );
        let then_g = model.add_subgraph(root, if_node, "then_branch", "then").unwrap();
        model.graph_mut(then_g).add_output(ValueRef::new("t"));
        model.add_node(then_g, Node::new("id", "Identity").with_inputs(["x"]).with_outputs(["t"]));
        (model, mm, if_node)
    }

    #[test]
    fn test_extract_copies_bodies() {
        let (original, _, if_node) = model();
        let fragment = extract_fragment(&original, original.root(), &[if_node, if_node], "frag").unwrap();

        assert_eq!(fragment.graph(fragment.root()).name(), "frag");
        assert_eq!(fragment.graph(fragment.root()).nodes().count(), 1);
        let then_g = fragment.find_graph("then").unwrap();
        assert_eq!(fragment.parent_node(then_g).unwrap().name, "if");
        assert_eq!(fragment.graph(then_g).outputs()[0].name, "t");
        assert!(fragment.graph(fragment.root()).inputs().is_empty());
        assert_eq!(fragment.graph(then_g).outer_scope_node_args().count(), 0);
    }

    #[test]
    fn test_extract_copies_referenced_initializers() {
        let (original, mm, _) = model();
        let fragment = extract_fragment(&original, original.root(), &[mm], "frag").unwrap();

        let inits: Vec<&str> = fragment
            .graph(fragment.root())
            .initializers()
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(inits, vec!["w"]);
    }

    #[test]
    fn test_fragment_name_must_not_shadow_a_body() {
        let (original, _, if_node) = model();
        let err = extract_fragment(&original, original.root(), &[if_node], "then").unwrap_err();
        assert!(matches!(err, Error::DuplicateGraph(name) if name == "then"));
    }

    #[test]
    fn test_extract_unknown_node() {
        let (original, _, _) = model();
        let err = extract_fragment(&original, original.root(), &[NodeIndex(42)], "frag").unwrap_err();
        assert!(matches!(err, Error::NodeNotFound(_)));
    }
}
