//! Schema graph query interface and its adjacency-table implementation
//!
//! The graph is a typed multigraph: nodes are stored once in a vector and
//! every relationship is an entry in an adjacency table keyed by
//! `(node index, relationship)`. Nodes never hold references to each other,
//! so a built graph is a plain immutable value that can be shared across
//! threads behind an `Arc`.

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::error::{Result, SchematicError};
use crate::types::{Edge, Node, Relationship};

/// Read-only query interface over a built schema graph
///
/// Implementations must be safe for concurrent reads from multiple
/// resolution and validation calls.
pub trait SchemaGraph: Send + Sync {
    /// Look up a node by label
    fn node(&self, label: &str) -> Option<&Node>;

    /// Targets of `relationship` edges leaving `label`, in insertion order
    fn out_edges(&self, label: &str, relationship: Relationship) -> Vec<&str>;

    /// Sources of `relationship` edges entering `label`, in insertion order
    fn in_edges(&self, label: &str, relationship: Relationship) -> Vec<&str>;

    /// Number of nodes in the graph
    fn node_count(&self) -> usize;

    /// Whether a node with this label exists
    fn node_exists(&self, label: &str) -> bool {
        self.node(label).is_some()
    }

    /// Look up a node by label
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::NotFound` if the label is absent.
    fn get_node(&self, label: &str) -> Result<&Node> {
        self.node(label)
            .ok_or_else(|| SchematicError::not_found(label))
    }

    /// The `rangeIncludes` target of `label` standing for the allowed `value`
    fn value_node(&self, label: &str, value: &str) -> Option<&Node> {
        self.out_edges(label, Relationship::RangeIncludes)
            .into_iter()
            .filter_map(|target| self.node(target))
            .find(|node| node.display_name == value || node.label == value)
    }
}

/// Index-based schema graph
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    outgoing: HashMap<(usize, Relationship), Vec<usize>>,
    incoming: HashMap<(usize, Relationship), Vec<usize>>,
    edge_count: usize,
}

impl RelationshipGraph {
    /// Start building a graph
    #[must_use]
    pub fn builder() -> SchemaGraphBuilder {
        SchemaGraphBuilder::new()
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Number of distinct edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// All edges, grouped by source node
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.nodes.iter().enumerate().flat_map(move |(source, node)| {
            Relationship::ALL.into_iter().flat_map(move |relationship| {
                self.outgoing
                    .get(&(source, relationship))
                    .into_iter()
                    .flatten()
                    .map(move |&target| {
                        Edge::new(
                            node.label.clone(),
                            self.nodes[target].label.clone(),
                            relationship,
                        )
                    })
            })
        })
    }

    fn labels_of(&self, indices: Option<&Vec<usize>>) -> Vec<&str> {
        indices
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| self.nodes[i].label.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl SchemaGraph for RelationshipGraph {
    fn node(&self, label: &str) -> Option<&Node> {
        self.index.get(label).map(|&i| &self.nodes[i])
    }

    fn out_edges(&self, label: &str, relationship: Relationship) -> Vec<&str> {
        match self.index.get(label) {
            Some(&i) => self.labels_of(self.outgoing.get(&(i, relationship))),
            None => Vec::new(),
        }
    }

    fn in_edges(&self, label: &str, relationship: Relationship) -> Vec<&str> {
        match self.index.get(label) {
            Some(&i) => self.labels_of(self.incoming.get(&(i, relationship))),
            None => Vec::new(),
        }
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Builder that validates graph invariants before producing a [`RelationshipGraph`]
#[derive(Debug, Default)]
pub struct SchemaGraphBuilder {
    nodes: IndexMap<String, Node>,
    duplicates: Vec<String>,
    edges: Vec<Edge>,
}

impl SchemaGraphBuilder {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; a repeated label is reported by [`Self::build`]
    pub fn add_node(&mut self, node: Node) -> &mut Self {
        if self.nodes.contains_key(&node.label) {
            self.duplicates.push(node.label.clone());
        } else {
            self.nodes.insert(node.label.clone(), node);
        }
        self
    }

    /// Add a node (chaining form)
    #[must_use]
    pub fn node(mut self, node: Node) -> Self {
        self.add_node(node);
        self
    }

    /// Add an edge
    pub fn add_edge(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        relationship: Relationship,
    ) -> &mut Self {
        self.edges.push(Edge::new(source, target, relationship));
        self
    }

    /// Add an edge (chaining form)
    #[must_use]
    pub fn edge(
        mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        relationship: Relationship,
    ) -> Self {
        self.add_edge(source, target, relationship);
        self
    }

    /// Whether a node with this label has been added
    #[must_use]
    pub fn contains_node(&self, label: &str) -> bool {
        self.nodes.contains_key(label)
    }

    /// Mutable access to an already added node
    pub fn node_mut(&mut self, label: &str) -> Option<&mut Node> {
        self.nodes.get_mut(label)
    }

    /// Get the node for `label`, inserting `default()` first if it is missing
    pub fn upsert_node(&mut self, label: &str, default: impl FnOnce() -> Node) -> &mut Node {
        self.nodes
            .entry(label.to_string())
            .or_insert_with(default)
    }

    /// Validate and freeze the graph
    ///
    /// Range targets' display names are folded into their property's
    /// `valid_values` so the allowed-value set is complete after build.
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::MalformedGraph` if a label is declared twice
    /// or an edge references a term that was never added.
    pub fn build(self) -> Result<RelationshipGraph> {
        if let Some(label) = self.duplicates.first() {
            return Err(SchematicError::malformed_graph_at(
                format!("Duplicate term label '{label}'"),
                label.clone(),
            ));
        }

        let mut graph = RelationshipGraph {
            index: self
                .nodes
                .keys()
                .enumerate()
                .map(|(i, label)| (label.clone(), i))
                .collect(),
            nodes: self.nodes.into_values().collect(),
            ..RelationshipGraph::default()
        };

        for edge in &self.edges {
            let source = endpoint(&graph, edge, &edge.source)?;
            let target = endpoint(&graph, edge, &edge.target)?;

            let targets = graph
                .outgoing
                .entry((source, edge.relationship))
                .or_default();
            if targets.contains(&target) {
                continue;
            }
            targets.push(target);
            graph
                .incoming
                .entry((target, edge.relationship))
                .or_default()
                .push(source);
            graph.edge_count += 1;
        }

        for edge in self
            .edges
            .iter()
            .filter(|edge| edge.relationship == Relationship::RangeIncludes)
        {
            let source = graph.index[&edge.source];
            let value = graph.nodes[graph.index[&edge.target]].display_name.clone();
            let node = &mut graph.nodes[source];
            if !node.valid_values.contains(&value) {
                node.valid_values.push(value);
            }
        }

        tracing::debug!(
            nodes = graph.nodes.len(),
            edges = graph.edge_count,
            "Built schema graph"
        );

        Ok(graph)
    }
}

fn endpoint(graph: &RelationshipGraph, edge: &Edge, label: &str) -> Result<usize> {
    graph.index.get(label).copied().ok_or_else(|| {
        SchematicError::malformed_graph_at(
            format!(
                "Edge '{}' -{}-> '{}' references unknown term '{label}'",
                edge.source, edge.relationship, edge.target
            ),
            label,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn patient_graph() -> RelationshipGraph {
        SchemaGraphBuilder::new()
            .node(Node::class("Patient"))
            .node(Node::property("Diagnosis").required(true))
            .node(Node::class("Cancer"))
            .node(Node::class("Healthy"))
            .node(Node::property("Cancer Type"))
            .edge("Patient", "Diagnosis", Relationship::RequiresDependency)
            .edge("Diagnosis", "Cancer", Relationship::RangeIncludes)
            .edge("Diagnosis", "Healthy", Relationship::RangeIncludes)
            .edge("Cancer", "Cancer Type", Relationship::RequiresDependency)
            .build()
            .expect("valid graph")
    }

    #[test]
    fn test_queries() {
        let graph = patient_graph();
        assert!(graph.node_exists("Patient"));
        assert!(!graph.node_exists("Biospecimen"));
        assert_eq!(
            graph.out_edges("Patient", Relationship::RequiresDependency),
            vec!["Diagnosis"]
        );
        assert_eq!(
            graph.in_edges("Cancer Type", Relationship::RequiresDependency),
            vec!["Cancer"]
        );
        assert!(graph.out_edges("Missing", Relationship::RequiresDependency).is_empty());
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn test_range_values_folded_in_order() {
        let graph = patient_graph();
        let diagnosis = graph.get_node("Diagnosis").expect("node exists");
        assert_eq!(diagnosis.valid_values, vec!["Cancer", "Healthy"]);
        assert_eq!(
            graph.value_node("Diagnosis", "Cancer").map(|n| n.label.as_str()),
            Some("Cancer")
        );
        assert!(graph.value_node("Diagnosis", "Unknown").is_none());
    }

    #[test]
    fn test_parallel_edges_collapse() {
        let graph = SchemaGraphBuilder::new()
            .node(Node::class("A"))
            .node(Node::class("B"))
            .edge("A", "B", Relationship::RequiresComponent)
            .edge("A", "B", Relationship::RequiresComponent)
            .edge("A", "B", Relationship::SubClassOf)
            .build()
            .expect("valid graph");
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edges().count(), 2);
    }

    #[test]
    fn test_dangling_edge_is_malformed() {
        let result = SchemaGraphBuilder::new()
            .node(Node::class("A"))
            .edge("A", "Ghost", Relationship::RequiresDependency)
            .build();
        match result {
            Err(SchematicError::MalformedGraph { label, .. }) => {
                assert_eq!(label.as_deref(), Some("Ghost"));
            }
            other => panic!("expected MalformedGraph, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_label_is_malformed() {
        let result = SchemaGraphBuilder::new()
            .node(Node::class("A"))
            .node(Node::property("A"))
            .build();
        assert!(matches!(result, Err(SchematicError::MalformedGraph { .. })));
    }

    #[test]
    fn test_get_node_not_found() {
        let graph = patient_graph();
        assert!(matches!(
            graph.get_node("Nope"),
            Err(SchematicError::NotFound { .. })
        ));
    }
}
