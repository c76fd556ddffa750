//! Evaluation ordering
//!
//! Gradle configures subprojects lazily; declaring an anchor means every
//! other subproject is configured only after the anchor has been. The plan is
//! a DAG over subproject names with an edge `anchor -> other`.

use crate::project::ProjectRegistry;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use relayout_core::error::{Error, Result};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// `before` is fully configured before `after` starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderingConstraint {
    /// Configured first
    pub before: String,
    /// Configured second
    pub after: String,
}

/// Configuration order over a registry's subprojects
#[derive(Debug, Clone)]
pub struct EvaluationPlan {
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
    anchors: Vec<String>,
}

impl EvaluationPlan {
    /// A plan with every subproject and no constraints
    pub fn unordered(registry: &ProjectRegistry) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();
        for project in registry.subprojects() {
            let idx = graph.add_node(project.name.clone());
            nodes.insert(project.name.clone(), idx);
        }
        Self {
            graph,
            nodes,
            anchors: Vec::new(),
        }
    }

    /// A plan where `anchor` is configured before every other subproject
    pub fn anchored_on(registry: &ProjectRegistry, anchor: &str) -> Result<Self> {
        let mut plan = Self::unordered(registry);
        plan.declare_anchor(registry, anchor)?;
        Ok(plan)
    }

    /// Require `anchor` to be configured before every other subproject.
    ///
    /// Anchors declared earlier still come first, so a sequence of anchors
    /// forms a chain. Declaring the same anchor twice changes nothing.
    pub fn declare_anchor(&mut self, registry: &ProjectRegistry, anchor: &str) -> Result<()> {
        let project = registry
            .get(anchor)
            .ok_or_else(|| Error::project_not_found(anchor, &registry.names()))?;
        let name = project.name.clone();
        if self.anchors.contains(&name) {
            return Ok(());
        }

        let Some(&from) = self.nodes.get(&name) else {
            return Err(Error::project_not_found(anchor, &registry.names()));
        };
        let targets: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|&to| to != from && !has_path_connecting(&self.graph, to, from, None))
            .collect();
        for to in targets {
            self.graph.update_edge(from, to, ());
        }

        tracing::debug!(anchor = %name, "Declared evaluation anchor");
        self.anchors.push(name);
        Ok(())
    }

    /// Anchors in declaration order
    pub fn anchors(&self) -> &[String] {
        &self.anchors
    }

    /// Subprojects in configuration order.
    ///
    /// Among projects with no constraint between them, registry order wins.
    pub fn order(&self) -> Vec<&str> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|n| self.graph.neighbors_directed(n, Direction::Incoming).count())
            .collect();
        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(i)) = ready.pop() {
            let node = NodeIndex::new(i);
            order.push(self.graph[node].as_str());
            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                in_degree[next.index()] -= 1;
                if in_degree[next.index()] == 0 {
                    ready.push(Reverse(next.index()));
                }
            }
        }
        order
    }

    /// Every recorded constraint, grouped by anchor
    pub fn constraints(&self) -> Vec<OrderingConstraint> {
        let mut edges: Vec<(usize, usize)> = self
            .graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
            .collect();
        edges.sort_unstable();
        edges
            .into_iter()
            .map(|(a, b)| OrderingConstraint {
                before: self.graph[NodeIndex::new(a)].clone(),
                after: self.graph[NodeIndex::new(b)].clone(),
            })
            .collect()
    }

    /// Whether `before` is configured strictly before `after`
    pub fn must_precede(&self, before: &str, after: &str) -> bool {
        match (self.node(before), self.node(after)) {
            (Some(a), Some(b)) if a != b => has_path_connecting(&self.graph, a, b, None),
            _ => false,
        }
    }

    // `app`, `:app` and `:feature:app` all name the node `app`
    fn node(&self, key: &str) -> Option<NodeIndex> {
        let name = key.rsplit(':').next().unwrap_or(key);
        self.nodes.get(name).copied()
    }

    /// Number of constraints
    pub fn len(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether no constraints were declared
    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }
}

impl Serialize for EvaluationPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EvaluationPlan", 3)?;
        state.serialize_field("anchors", &self.anchors)?;
        state.serialize_field("order", &self.order())?;
        state.serialize_field("constraints", &self.constraints())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::Project;
    use relayout_core::ErrorCode;

    fn registry(names: &[&str]) -> ProjectRegistry {
        let mut registry = ProjectRegistry::new(Project::root("/repo/android"));
        for name in names {
            registry.add(Project::new(*name, *name)).unwrap();
        }
        registry
    }

    #[test]
    fn test_anchor_precedes_everything() {
        let reg = registry(&["core", "app", "feature"]);
        let plan = EvaluationPlan::anchored_on(&reg, "app").unwrap();

        assert_eq!(plan.order(), vec!["app", "core", "feature"]);
        assert_eq!(
            plan.constraints(),
            vec![
                OrderingConstraint { before: "app".into(), after: "core".into() },
                OrderingConstraint { before: "app".into(), after: "feature".into() },
            ]
        );
        assert!(plan.must_precede("app", "core"));
        assert!(!plan.must_precede("core", "feature"));
        assert!(!plan.must_precede("app", "app"));
    }

    #[test]
    fn test_gradle_path_anchor() {
        let reg = registry(&["app", "core"]);
        let plan = EvaluationPlan::anchored_on(&reg, ":app").unwrap();
        assert_eq!(plan.anchors(), ["app".to_string()]);
        assert!(plan.must_precede(":app", ":core"));
    }

    #[test]
    fn test_missing_anchor_is_an_error() {
        let reg = registry(&["core"]);
        let err = EvaluationPlan::anchored_on(&reg, "app").unwrap_err();
        assert_eq!(err.code, ErrorCode::ProjectNotFound);
        assert_eq!(err.suggestion.as_deref(), Some("Known projects: core"));
    }

    #[test]
    fn test_only_anchor_has_no_constraints() {
        let reg = registry(&["app"]);
        let plan = EvaluationPlan::anchored_on(&reg, "app").unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.order(), vec!["app"]);
    }

    #[test]
    fn test_anchors_form_a_chain() {
        let reg = registry(&["feature", "core", "app"]);
        let mut plan = EvaluationPlan::anchored_on(&reg, "app").unwrap();
        plan.declare_anchor(&reg, "core").unwrap();

        assert_eq!(plan.order(), vec!["app", "core", "feature"]);
        assert!(plan.must_precede("app", "core"));
        assert!(plan.must_precede("core", "feature"));
        assert!(!plan.must_precede("core", "app"));
    }

    #[test]
    fn test_redeclaring_anchor_is_a_no_op() {
        let reg = registry(&["app", "core"]);
        let mut plan = EvaluationPlan::anchored_on(&reg, "app").unwrap();
        let before = plan.len();
        plan.declare_anchor(&reg, ":app").unwrap();
        assert_eq!(plan.len(), before);
        assert_eq!(plan.anchors().len(), 1);
    }

    #[test]
    fn test_unordered_plan_keeps_registry_order() {
        let reg = registry(&["b", "a", "c"]);
        let plan = EvaluationPlan::unordered(&reg);
        assert_eq!(plan.order(), vec!["b", "a", "c"]);
    }
}
