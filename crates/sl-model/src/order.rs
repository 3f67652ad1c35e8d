//! Dependency ordering of model definitions

use crate::error::{ModelError, ModelResult};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet};

/// Models and the edges between them.
///
/// Node indices follow definition order, so among models that are ready at
/// the same time the earlier-defined one runs first.
#[derive(Debug)]
pub struct ModelGraph {
    graph: DiGraph<String, ()>,
}

impl ModelGraph {
    /// Build the graph from `(model, referenced relations)` pairs.
    ///
    /// References to anything that is not another model in the list are
    /// external and add no edge. A model referencing itself adds no edge.
    pub fn build(models: &[(String, BTreeSet<String>)]) -> Self {
        let mut graph = DiGraph::new();
        let mut index: HashMap<String, NodeIndex> = HashMap::new();
        for (name, _) in models {
            let idx = graph.add_node(name.clone());
            index.entry(name.to_lowercase()).or_insert(idx);
        }

        for (position, (name, refs)) in models.iter().enumerate() {
            let dependent = NodeIndex::new(position);
            for reference in refs {
                if reference.eq_ignore_ascii_case(name) {
                    continue;
                }
                if let Some(&dependency) = index.get(&reference.to_lowercase()) {
                    // Edge goes from dependency to dependent
                    graph.update_edge(dependency, dependent, ());
                }
            }
        }

        Self { graph }
    }

    /// Positions of the models in execution order (dependencies first)
    pub fn execution_order(&self) -> ModelResult<Vec<usize>> {
        if let Err(cycle) = toposort(&self.graph, None) {
            return Err(ModelError::CircularDependency {
                cycle: self.find_cycle_path(cycle.node_id()),
            });
        }

        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|n| self.graph.edges_directed(n, Direction::Incoming).count())
            .collect();
        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(in_degree.len());
        while let Some(Reverse(i)) = ready.pop() {
            order.push(i);
            for edge in self.graph.edges(NodeIndex::new(i)) {
                let target = edge.target().index();
                in_degree[target] -= 1;
                if in_degree[target] == 0 {
                    ready.push(Reverse(target));
                }
            }
        }
        Ok(order)
    }

    fn find_cycle_path(&self, start: NodeIndex) -> String {
        let mut path = vec![self.graph[start].clone()];
        let mut visited = HashSet::from([start]);
        let mut current = start;

        while let Some(edge) = self
            .graph
            .edges(current)
            .find(|e| self.reaches(e.target(), start))
        {
            let target = edge.target();
            path.push(self.graph[target].clone());
            if target == start || !visited.insert(target) {
                break;
            }
            current = target;
        }

        path.join(" -> ")
    }

    fn reaches(&self, from: NodeIndex, to: NodeIndex) -> bool {
        petgraph::algo::has_path_connecting(&self.graph, from, to, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models(defs: &[(&str, &[&str])]) -> Vec<(String, BTreeSet<String>)> {
        defs.iter()
            .map(|(name, refs)| {
                (
                    name.to_string(),
                    refs.iter().map(|r| r.to_string()).collect(),
                )
            })
            .collect()
    }

    fn names(defs: &[(&str, &[&str])]) -> Vec<String> {
        let m = models(defs);
        ModelGraph::build(&m)
            .execution_order()
            .unwrap()
            .into_iter()
            .map(|i| m[i].0.clone())
            .collect()
    }

    #[test]
    fn test_independent_models_keep_definition_order() {
        assert_eq!(
            names(&[("b", &["raw_x"]), ("a", &[]), ("c", &["raw_y"])]),
            vec!["b", "a", "c"]
        );
    }

    #[test]
    fn test_dependency_runs_first() {
        assert_eq!(
            names(&[
                ("fact_sales", &["dim_agents", "stg_sales"]),
                ("dim_agents", &["stg_agents"]),
                ("dim_parts", &[]),
            ]),
            vec!["dim_agents", "fact_sales", "dim_parts"]
        );
    }

    #[test]
    fn test_reference_matching_ignores_case() {
        assert_eq!(
            names(&[("report", &["DIM_AGENTS"]), ("dim_agents", &[])]),
            vec!["dim_agents", "report"]
        );
    }

    #[test]
    fn test_self_reference_is_not_a_cycle() {
        assert_eq!(names(&[("a", &["a"])]), vec!["a"]);
    }

    #[test]
    fn test_cycle_reported() {
        let m = models(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"]), ("d", &[])]);
        let err = ModelGraph::build(&m).execution_order().unwrap_err();
        match err {
            ModelError::CircularDependency { cycle } => {
                for model in ["a", "b", "c"] {
                    assert!(cycle.contains(model), "{cycle}");
                }
                assert!(!cycle.contains('d'));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
