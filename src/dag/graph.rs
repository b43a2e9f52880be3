//! Pure graph surgery over `daggy::Dag`. Vertices are identified by weight
//! equality, so weights must be unique within a graph. Every function
//! returns a new graph and leaves its inputs untouched.

use std::collections::HashMap;
use std::fmt::Debug;
use std::ops::Index;

use daggy::{Dag, NodeIndex};

pub(crate) fn find_vertex<N, E>(dag: &Dag<N, E>, weight: &N) -> Option<NodeIndex>
where
    N: PartialEq,
{
    (0..dag.node_count())
        .map(NodeIndex::new)
        .find(|node_index| dag.index(*node_index) == weight)
}

/// Induced sub-graph around `vertex`: the vertex, its direct neighbors and
/// exactly the edges incident to it. Empty graph if the vertex is unknown.
pub fn sub_graph<N, E>(dag: &Dag<N, E>, vertex: &N) -> Dag<N, E>
where
    N: Clone + PartialEq,
    E: Clone + Debug,
{
    let mut sub = Dag::new();
    let center = match find_vertex(dag, vertex) {
        Some(node_index) => node_index,
        None => return sub,
    };

    let mut sub_indies: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    sub_indies.insert(center, sub.add_node(dag.index(center).clone()));

    for edge in dag.raw_edges() {
        if edge.source() != center && edge.target() != center {
            continue;
        }

        let source = *sub_indies
            .entry(edge.source())
            .or_insert_with(|| sub.add_node(dag.index(edge.source()).clone()));
        let target = *sub_indies
            .entry(edge.target())
            .or_insert_with(|| sub.add_node(dag.index(edge.target()).clone()));

        sub.add_edge(source, target, edge.weight.clone()).unwrap();
    }

    sub
}

/// Same topology with the vertex weighted `from` rewritten to `to`.
pub fn replace_vertex<N, E>(dag: &Dag<N, E>, from: &N, to: &N) -> Dag<N, E>
where
    N: Clone + PartialEq,
    E: Clone + Debug,
{
    let mut replaced = Dag::new();
    for node in dag.raw_nodes() {
        let weight = if node.weight.eq(from) {
            to.clone()
        } else {
            node.weight.clone()
        };
        replaced.add_node(weight);
    }

    // nodes were re-added in index order, edge endpoints carry over as is
    for edge in dag.raw_edges() {
        replaced
            .add_edge(edge.source(), edge.target(), edge.weight.clone())
            .unwrap();
    }

    replaced
}

/// Union of two graphs: vertices merged by weight equality, edges merged by
/// `(source, target, label)` equality.
pub fn union<N, E>(left: &Dag<N, E>, right: &Dag<N, E>) -> Dag<N, E>
where
    N: Clone + PartialEq,
    E: Clone + PartialEq + Debug,
{
    let mut merged = left.clone();

    for node in right.raw_nodes() {
        if find_vertex(&merged, &node.weight).is_none() {
            merged.add_node(node.weight.clone());
        }
    }

    for edge in right.raw_edges() {
        let source = find_vertex(&merged, right.index(edge.source())).unwrap();
        let target = find_vertex(&merged, right.index(edge.target())).unwrap();

        let exists = merged
            .raw_edges()
            .iter()
            .any(|e| e.source() == source && e.target() == target && e.weight.eq(&edge.weight));
        if !exists {
            merged.add_edge(source, target, edge.weight.clone()).unwrap();
        }
    }

    merged
}
