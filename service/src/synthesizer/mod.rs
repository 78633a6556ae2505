//! Validation-schema synthesis
//!
//! [`ValidationSchemaSynthesizer::build_schema`] walks the schema graph from a
//! root term and produces the [`ConstraintDocument`] a record for that root
//! must satisfy. Fields are keyed by display name because records are keyed
//! by the column headers a curator sees.

pub mod rules;

use indexmap::IndexSet;
use schematic_core::prelude::*;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info};

use crate::resolver::DependencyResolver;

pub use rules::{RegexMode, RuleToken, compile_constraint, parse_rule};

/// Builds constraint documents from a schema graph
pub struct ValidationSchemaSynthesizer<'g, G: SchemaGraph + ?Sized> {
    graph: &'g G,
    component_marker: Option<String>,
}

impl<'g, G: SchemaGraph + ?Sized> ValidationSchemaSynthesizer<'g, G> {
    /// Create a synthesizer over `graph`
    #[must_use]
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            component_marker: None,
        }
    }

    /// Require the given marker property on every document, when the graph has it
    #[must_use]
    pub fn with_component_marker(mut self, marker: impl Into<String>) -> Self {
        self.component_marker = Some(marker.into());
        self
    }

    /// Synthesize the constraint document for `root`
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::NotFound` if `root` is absent,
    /// `SchematicError::CycleDetected` if its dependencies loop and
    /// `SchematicError::MalformedGraph` if a term's rules are unusable.
    pub fn build_schema(&self, root: &str) -> Result<ConstraintDocument> {
        let root_node = self.graph.get_node(root)?;
        let root = root_node.label.as_str();
        let resolver = DependencyResolver::new(self.graph);

        let mut base: IndexSet<String> = self
            .graph
            .in_edges(root, Relationship::DomainIncludes)
            .into_iter()
            .map(str::to_string)
            .collect();
        base.extend(resolver.ordered_descendants(root, Relationship::RequiresDependency)?);
        let marker = self
            .component_marker
            .as_deref()
            .and_then(|marker| self.graph.node(marker))
            .map(|node| node.label.clone());
        if let Some(marker) = &marker {
            base.insert(marker.clone());
        }
        base.shift_remove(root);

        let mut document = ConstraintDocument::new(root);
        let mut required: HashSet<String> = HashSet::new();
        let mut excluded: HashSet<&str> = HashSet::from([root]);

        for label in &base {
            let node = self.graph.get_node(label)?;
            self.insert_property(&mut document, node)?;
            if node.required || marker.as_deref() == Some(label.as_str()) {
                required.insert(node.display_name.clone());
                excluded.insert(label.as_str());
            }
        }

        self.add_conditional_clauses(&mut document, &resolver, &base, &excluded)?;

        document.required = document
            .properties
            .keys()
            .filter(|field| required.contains(field.as_str()))
            .cloned()
            .collect();

        info!(
            root,
            properties = document.properties.len(),
            required = document.required.len(),
            conditional = document.conditional.len(),
            "Synthesized validation schema"
        );

        Ok(document)
    }

    fn insert_property(&self, document: &mut ConstraintDocument, node: &Node) -> Result<()> {
        if document.properties.contains_key(&node.display_name) {
            return Ok(());
        }
        document
            .properties
            .insert(node.display_name.clone(), compile_constraint(node)?);
        Ok(())
    }

    /// Emit one clause per allowed value whose value node has dependents
    /// that are not already unconditionally required
    ///
    /// `excluded` holds the root and the unconditionally required base
    /// properties. Optional base properties can still be required by a
    /// clause; their base constraint already applies, so the clause does not
    /// repeat it.
    fn add_conditional_clauses(
        &self,
        document: &mut ConstraintDocument,
        resolver: &DependencyResolver<'g, G>,
        base: &IndexSet<String>,
        excluded: &HashSet<&str>,
    ) -> Result<()> {
        let mut queued: HashSet<String> = base.iter().cloned().collect();
        let mut worklist: VecDeque<String> = base.iter().cloned().collect();

        while let Some(label) = worklist.pop_front() {
            let trigger = self.graph.get_node(&label)?;
            for value in &trigger.valid_values {
                let Some(value_node) = self.graph.value_node(&trigger.label, value) else {
                    continue;
                };
                let direct: HashSet<&str> = self
                    .graph
                    .out_edges(&value_node.label, Relationship::RequiresDependency)
                    .into_iter()
                    .collect();
                if direct.is_empty() {
                    continue;
                }

                let gated: Vec<String> = resolver
                    .ordered_descendants(&value_node.label, Relationship::RequiresDependency)?
                    .into_iter()
                    .filter(|member| {
                        !excluded.contains(member.as_str()) && *member != trigger.label
                    })
                    .collect();
                if gated.is_empty() {
                    debug!(
                        field = %trigger.display_name,
                        %value,
                        "Dependents of value are already unconditionally required"
                    );
                    continue;
                }

                let mut clause = ConditionalClause {
                    on_field: trigger.display_name.clone(),
                    on_value: value.clone(),
                    ..ConditionalClause::default()
                };
                for member in &gated {
                    let node = self.graph.get_node(member)?;
                    if direct.contains(member.as_str()) || node.required {
                        clause.then_requires.push(node.display_name.clone());
                    }
                    if base.contains(member) {
                        continue;
                    }
                    clause
                        .then_constrains
                        .insert(node.display_name.clone(), compile_constraint(node)?);
                    self.insert_property(document, node)?;
                    if queued.insert(member.clone()) {
                        worklist.push_back(member.clone());
                    }
                }
                if clause.then_requires.is_empty() && clause.then_constrains.is_empty() {
                    continue;
                }

                debug!(
                    field = %clause.on_field,
                    value = %clause.on_value,
                    requires = clause.then_requires.len(),
                    "Added conditional clause"
                );
                document.conditional.push(clause);
            }
        }

        Ok(())
    }
}

/// Convenience wrapper around [`ValidationSchemaSynthesizer::build_schema`]
///
/// # Errors
///
/// See [`ValidationSchemaSynthesizer::build_schema`].
pub fn build_schema<G: SchemaGraph + ?Sized>(graph: &G, root: &str) -> Result<ConstraintDocument> {
    ValidationSchemaSynthesizer::new(graph).build_schema(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn patient_graph() -> RelationshipGraph {
        SchemaGraphBuilder::new()
            .node(Node::class("Patient"))
            .node(Node::class("Component"))
            .node(Node::property("PatientID").with_display_name("Patient ID").required(true))
            .node(Node::property("Diagnosis").required(true))
            .node(Node::class("Cancer"))
            .node(Node::class("Healthy"))
            .node(Node::property("CancerType").with_display_name("Cancer Type").required(true))
            .node(Node::property("FamilyHistory").with_display_name("Family History"))
            .edge("Patient", "PatientID", Relationship::RequiresDependency)
            .edge("Patient", "Diagnosis", Relationship::RequiresDependency)
            .edge("Diagnosis", "Cancer", Relationship::RangeIncludes)
            .edge("Diagnosis", "Healthy", Relationship::RangeIncludes)
            .edge("Cancer", "CancerType", Relationship::RequiresDependency)
            .edge("Cancer", "FamilyHistory", Relationship::RequiresDependency)
            .build()
            .expect("valid graph")
    }

    #[test]
    fn test_base_properties_and_required() {
        let graph = patient_graph();
        let document = build_schema(&graph, "Patient").unwrap();
        assert_eq!(document.title, "Patient_validation");
        assert_eq!(
            document.properties.keys().collect::<Vec<_>>(),
            vec!["Diagnosis", "Patient ID", "Family History", "Cancer Type"]
        );
        assert_eq!(document.required, vec!["Diagnosis", "Patient ID"]);
        assert_eq!(
            document.property("Diagnosis").unwrap().enumeration,
            Some(vec!["Cancer".to_string(), "Healthy".to_string()])
        );
    }

    #[test]
    fn test_value_gated_clause() {
        let graph = patient_graph();
        let document = build_schema(&graph, "Patient").unwrap();
        assert_eq!(document.conditional.len(), 1);
        let clause = &document.conditional[0];
        assert_eq!(clause.on_field, "Diagnosis");
        assert_eq!(clause.on_value, "Cancer");
        assert_eq!(clause.then_requires, vec!["Family History", "Cancer Type"]);
        assert_eq!(
            clause.then_constrains.keys().collect::<Vec<_>>(),
            vec!["Family History", "Cancer Type"]
        );
    }

    #[test]
    fn test_unconditional_dependents_stay_out_of_clauses() {
        let graph = SchemaGraphBuilder::new()
            .node(Node::class("Patient"))
            .node(Node::property("Diagnosis").required(true))
            .node(Node::class("Cancer"))
            .node(Node::property("Sex").required(true))
            .edge("Patient", "Diagnosis", Relationship::RequiresDependency)
            .edge("Patient", "Sex", Relationship::RequiresDependency)
            .edge("Diagnosis", "Cancer", Relationship::RangeIncludes)
            .edge("Cancer", "Sex", Relationship::RequiresDependency)
            .build()
            .unwrap();
        let document = build_schema(&graph, "Patient").unwrap();
        assert!(document.conditional.is_empty());
        assert_eq!(document.required, vec!["Sex", "Diagnosis"]);
    }

    #[test]
    fn test_optional_base_dependent_is_required_by_value() {
        let graph = SchemaGraphBuilder::new()
            .node(Node::class("Patient"))
            .node(Node::property("Diagnosis").required(true))
            .node(Node::class("Cancer"))
            .node(Node::class("Healthy"))
            .node(Node::property("CancerType").with_display_name("Cancer Type"))
            .edge("Patient", "Diagnosis", Relationship::RequiresDependency)
            .edge("Patient", "CancerType", Relationship::RequiresDependency)
            .edge("Diagnosis", "Cancer", Relationship::RangeIncludes)
            .edge("Diagnosis", "Healthy", Relationship::RangeIncludes)
            .edge("Cancer", "CancerType", Relationship::RequiresDependency)
            .build()
            .unwrap();
        let document = build_schema(&graph, "Patient").unwrap();

        assert_eq!(document.required, vec!["Diagnosis"]);
        assert_eq!(document.conditional.len(), 1);
        let clause = &document.conditional[0];
        assert_eq!((clause.on_field.as_str(), clause.on_value.as_str()), ("Diagnosis", "Cancer"));
        assert_eq!(clause.then_requires, vec!["Cancer Type"]);
        assert!(clause.then_constrains.is_empty());
    }

    #[test]
    fn test_component_marker_and_domain_properties() {
        let graph = SchemaGraphBuilder::new()
            .node(Node::class("Biospecimen"))
            .node(Node::property("Component"))
            .node(Node::property("TissueStatus").with_display_name("Tissue Status").required(true))
            .node(Node::property("Notes"))
            .edge("TissueStatus", "Biospecimen", Relationship::DomainIncludes)
            .edge("Notes", "Biospecimen", Relationship::DomainIncludes)
            .build()
            .unwrap();
        let document = ValidationSchemaSynthesizer::new(&graph)
            .with_component_marker("Component")
            .build_schema("Biospecimen")
            .unwrap();
        assert_eq!(
            document.properties.keys().collect::<Vec<_>>(),
            vec!["Tissue Status", "Notes", "Component"]
        );
        assert_eq!(document.required, vec!["Tissue Status", "Component"]);
    }

    #[test]
    fn test_nested_gating_is_followed() {
        let graph = SchemaGraphBuilder::new()
            .node(Node::class("Patient"))
            .node(Node::property("Diagnosis"))
            .node(Node::class("Cancer"))
            .node(Node::property("CancerType").with_display_name("Cancer Type"))
            .node(Node::class("Breast"))
            .node(Node::property("Receptor"))
            .edge("Patient", "Diagnosis", Relationship::RequiresDependency)
            .edge("Diagnosis", "Cancer", Relationship::RangeIncludes)
            .edge("Cancer", "CancerType", Relationship::RequiresDependency)
            .edge("CancerType", "Breast", Relationship::RangeIncludes)
            .edge("Breast", "Receptor", Relationship::RequiresDependency)
            .build()
            .unwrap();
        let document = build_schema(&graph, "Patient").unwrap();
        let triggers: Vec<(&str, &str)> = document
            .conditional
            .iter()
            .map(|c| (c.on_field.as_str(), c.on_value.as_str()))
            .collect();
        assert_eq!(triggers, vec![("Diagnosis", "Cancer"), ("Cancer Type", "Breast")]);
        assert!(document.property("Receptor").is_some());
        assert!(document.required.is_empty());
    }

    #[test]
    fn test_missing_root() {
        let graph = patient_graph();
        assert!(matches!(
            build_schema(&graph, "Nope"),
            Err(SchematicError::NotFound { .. })
        ));
    }

    #[test]
    fn test_repeated_calls_are_equal() {
        let graph = patient_graph();
        assert_eq!(
            build_schema(&graph, "Patient").unwrap(),
            build_schema(&graph, "Patient").unwrap()
        );
    }
}
