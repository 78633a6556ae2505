//! Dependency ordering over a single relationship kind

use schematic_core::prelude::*;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// One level of the explicit DFS stack
struct Frame<'g> {
    label: &'g str,
    children: Vec<&'g str>,
    cursor: usize,
}

/// Computes the ordered, deduplicated set of terms a root depends on
pub struct DependencyResolver<'g, G: SchemaGraph + ?Sized> {
    graph: &'g G,
}

impl<'g, G: SchemaGraph + ?Sized> DependencyResolver<'g, G> {
    /// Create a resolver over `graph`
    #[must_use]
    pub fn new(graph: &'g G) -> Self {
        Self { graph }
    }

    /// All terms reachable from `root` along `relationship` edges
    ///
    /// The result is the reversed finish order of a depth-first traversal
    /// with `root` removed: for every edge `u -> v` inside the reachable
    /// subgraph, `u` comes before `v`. Neighbours are visited in edge
    /// insertion order, so the result is deterministic.
    ///
    /// Dependents therefore come before the terms they require, and leaf
    /// requirements come last: a chain `A -> B -> C` resolved from `A` gives
    /// `[B, C]`. This is deliberately not a "leaves first" listing; the edge
    /// ordering above is what callers may rely on. Reverse the result when
    /// leaves must come first.
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::NotFound` if `root` is absent and
    /// `SchematicError::CycleDetected` if the reachable subgraph has a cycle.
    pub fn ordered_descendants(
        &self,
        root: &str,
        relationship: Relationship,
    ) -> Result<Vec<String>> {
        let root = self.graph.get_node(root)?.label.as_str();
        let budget = self.graph.node_count();

        let mut marks: HashMap<&'g str, Mark> = HashMap::new();
        let mut postorder: Vec<&'g str> = Vec::new();
        let mut visits = 1usize;

        marks.insert(root, Mark::Visiting);
        let mut stack = vec![Frame {
            label: root,
            children: self.graph.out_edges(root, relationship),
            cursor: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(&child) = frame.children.get(frame.cursor) else {
                let label = frame.label;
                stack.pop();
                marks.insert(label, Mark::Done);
                postorder.push(label);
                continue;
            };
            frame.cursor += 1;

            match marks.get(child) {
                Some(Mark::Done) => continue,
                Some(Mark::Visiting) => {
                    debug!(%relationship, label = child, "Cycle reached from '{root}'");
                    return Err(SchematicError::cycle(relationship, child));
                }
                None => {}
            }

            let node = self.graph.node(child).ok_or_else(|| {
                SchematicError::malformed_graph_at(
                    format!("Edge target '{child}' is not a term of the graph"),
                    child,
                )
            })?;

            visits += 1;
            if visits > budget {
                return Err(SchematicError::cycle(relationship, child));
            }

            let child = node.label.as_str();
            marks.insert(child, Mark::Visiting);
            stack.push(Frame {
                label: child,
                children: self.graph.out_edges(child, relationship),
                cursor: 0,
            });
        }

        let ordered: Vec<String> = postorder
            .into_iter()
            .rev()
            .filter(|&label| label != root)
            .map(str::to_string)
            .collect();

        debug!(
            root,
            %relationship,
            count = ordered.len(),
            "Resolved ordered descendants"
        );

        Ok(ordered)
    }
}

/// Convenience wrapper around [`DependencyResolver::ordered_descendants`]
///
/// # Errors
///
/// See [`DependencyResolver::ordered_descendants`].
pub fn ordered_descendants<G: SchemaGraph + ?Sized>(
    graph: &G,
    root: &str,
    relationship: Relationship,
) -> Result<Vec<String>> {
    DependencyResolver::new(graph).ordered_descendants(root, relationship)
}
