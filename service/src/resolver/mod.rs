//! Graph traversals that answer "what does this term need"
//!
//! - [`DependencyResolver`] orders the terms a root depends on along one
//!   relationship kind
//! - [`ComponentRequirementResolver`] lists the components a component
//!   transitively requires

pub mod component;
pub mod dependency;

pub use component::{ComponentRequirementResolver, required_components};
pub use dependency::{DependencyResolver, ordered_descendants};
