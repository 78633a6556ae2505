//! Transitive component requirements

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use schematic_core::prelude::*;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Computes every component a source component transitively requires
pub struct ComponentRequirementResolver<'g, G: SchemaGraph + ?Sized> {
    graph: &'g G,
}

impl<'g, G: SchemaGraph + ?Sized> ComponentRequirementResolver<'g, G> {
    /// Create a resolver over `graph`
    #[must_use]
    pub fn new(graph: &'g G) -> Self {
        Self { graph }
    }

    /// Components reachable from `source` along `requiresComponent` edges,
    /// in breadth-first order, without `source` itself
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::NotFound` if `source` is absent and
    /// `SchematicError::CycleDetected` if the reachable requirements loop.
    pub fn required_components(&self, source: &str) -> Result<Vec<String>> {
        let source = self.graph.get_node(source)?.label.as_str();
        let reachable = self.breadth_first(source)?;

        self.check_acyclic(&reachable)?;

        let components: Vec<String> = reachable
            .into_iter()
            .filter(|&label| label != source)
            .map(str::to_string)
            .collect();

        debug!(
            source,
            count = components.len(),
            "Resolved component requirements"
        );

        Ok(components)
    }

    fn breadth_first(&self, source: &'g str) -> Result<Vec<&'g str>> {
        let mut visited: HashSet<&'g str> = HashSet::from([source]);
        let mut order = vec![source];
        let mut queue = VecDeque::from([source]);

        while let Some(current) = queue.pop_front() {
            for target in self
                .graph
                .out_edges(current, Relationship::RequiresComponent)
            {
                if !self.graph.node_exists(target) {
                    return Err(SchematicError::malformed_graph_at(
                        format!("Component '{current}' requires unknown term '{target}'"),
                        target,
                    ));
                }
                if visited.insert(target) {
                    order.push(target);
                    queue.push_back(target);
                }
            }
        }

        Ok(order)
    }

    fn check_acyclic(&self, reachable: &[&'g str]) -> Result<()> {
        let mut requirements: DiGraphMap<&str, ()> = DiGraphMap::new();
        for &label in reachable {
            requirements.add_node(label);
        }
        for &label in reachable {
            for target in self.graph.out_edges(label, Relationship::RequiresComponent) {
                requirements.add_edge(label, target, ());
            }
        }

        toposort(&requirements, None).map(|_| ()).map_err(|cycle| {
            let label = cycle.node_id();
            debug!(label, "Component requirements form a cycle");
            SchematicError::cycle(Relationship::RequiresComponent, label)
        })
    }
}

/// Convenience wrapper around [`ComponentRequirementResolver::required_components`]
///
/// # Errors
///
/// See [`ComponentRequirementResolver::required_components`].
pub fn required_components<G: SchemaGraph + ?Sized>(graph: &G, source: &str) -> Result<Vec<String>> {
    ComponentRequirementResolver::new(graph).required_components(source)
}
