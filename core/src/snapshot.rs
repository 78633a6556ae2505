//! Arc-based graph snapshots
//!
//! A loaded graph is never mutated. Reloading a data model builds a new
//! [`RelationshipGraph`] and swaps it in; calls already holding the previous
//! snapshot finish against it undisturbed.

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::graph::RelationshipGraph;

/// Type alias for an Arc-wrapped graph
pub type ArcGraph = Arc<RelationshipGraph>;

/// Shared, atomically replaceable handle to the current graph snapshot
#[derive(Debug)]
pub struct SharedSchemaGraph {
    current: ArcSwap<RelationshipGraph>,
}

impl SharedSchemaGraph {
    /// Create a handle around an initial graph
    #[must_use]
    pub fn new(graph: RelationshipGraph) -> Self {
        Self {
            current: ArcSwap::from_pointee(graph),
        }
    }

    /// Create from an existing Arc
    #[must_use]
    pub fn from_arc(graph: ArcGraph) -> Self {
        Self {
            current: ArcSwap::new(graph),
        }
    }

    /// Take the current snapshot (cheap; clones the Arc)
    #[must_use]
    pub fn snapshot(&self) -> ArcGraph {
        self.current.load_full()
    }

    /// Replace the current snapshot, returning the previous one
    pub fn replace(&self, graph: RelationshipGraph) -> ArcGraph {
        self.current.swap(Arc::new(graph))
    }
}

impl Clone for SharedSchemaGraph {
    fn clone(&self) -> Self {
        Self::from_arc(self.snapshot())
    }
}
