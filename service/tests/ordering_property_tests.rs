//! Property-based tests for dependency ordering
//!
//! Random acyclic graphs are generated by only drawing edges from a lower to a
//! higher node index, so every generated graph is a DAG rooted at `N0`.

use proptest::prelude::*;
use schematic_service::prelude::*;
use std::collections::HashSet;

const DEP: Relationship = Relationship::RequiresDependency;

fn label(index: usize) -> String {
    format!("N{index}")
}

/// Generate a node count and a forward-only edge list
fn arb_dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2usize..24).prop_flat_map(|nodes| {
        let edge = (0..nodes - 1).prop_flat_map(move |source| (Just(source), source + 1..nodes));
        (Just(nodes), prop::collection::vec(edge, 0..nodes * 3))
    })
}

fn build(nodes: usize, edges: &[(usize, usize)]) -> RelationshipGraph {
    let mut builder = SchemaGraphBuilder::new();
    for index in 0..nodes {
        builder.add_node(Node::property(label(index)));
    }
    for &(source, target) in edges {
        builder.add_edge(label(source), label(target), DEP);
    }
    builder.build().expect("generated graph is valid")
}

/// Labels reachable from `root` along dependency edges, root excluded
fn reachable(graph: &RelationshipGraph, root: &str) -> HashSet<String> {
    let mut seen = HashSet::new();
    let mut stack = vec![root.to_string()];
    while let Some(current) = stack.pop() {
        for child in graph.out_edges(&current, DEP) {
            if seen.insert(child.to_string()) {
                stack.push(child.to_string());
            }
        }
    }
    seen.remove(root);
    seen
}

proptest! {
    #[test]
    fn prop_every_edge_points_forward((nodes, edges) in arb_dag()) {
        let graph = build(nodes, &edges);
        let order = ordered_descendants(&graph, "N0", DEP).unwrap();
        let position = |l: &str| order.iter().position(|o| o == l);

        for (source, target) in edges {
            let (source, target) = (label(source), label(target));
            if source == "N0" {
                continue;
            }
            if let Some(source_at) = position(&source) {
                let target_at = position(&target);
                prop_assert!(target_at.is_some(), "{target} missing after {source}");
                prop_assert!(source_at < target_at.unwrap_or(0));
            }
        }
    }

    #[test]
    fn prop_result_is_exactly_the_descendant_set((nodes, edges) in arb_dag()) {
        let graph = build(nodes, &edges);
        let order = ordered_descendants(&graph, "N0", DEP).unwrap();

        let as_set: HashSet<String> = order.iter().cloned().collect();
        prop_assert_eq!(as_set.len(), order.len());
        prop_assert!(!as_set.contains("N0"));
        prop_assert_eq!(as_set, reachable(&graph, "N0"));
    }

    #[test]
    fn prop_ordering_is_deterministic((nodes, edges) in arb_dag()) {
        let graph = build(nodes, &edges);
        let resolver = DependencyResolver::new(&graph);
        let first = resolver.ordered_descendants("N0", DEP).unwrap();
        let second = resolver.ordered_descendants("N0", DEP).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_back_edge_is_a_cycle((nodes, edges) in arb_dag()) {
        let mut edges = edges;
        let last = nodes - 1;
        // Chain every node so the last one is reachable, then close the loop.
        edges.extend((0..last).map(|i| (i, i + 1)));
        edges.push((last, last.min(1)));
        let graph = build(nodes, &edges);

        let is_cycle = matches!(
            ordered_descendants(&graph, "N0", DEP),
            Err(SchematicError::CycleDetected { .. })
        );
        prop_assert!(is_cycle);
    }
}
