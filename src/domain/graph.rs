//! Dependency graph over an environment's root deployments
//!
//! Provider bindings are the edges: an edge runs from the providing
//! deployment to the consuming one, so a topological order of the graph is a
//! valid execution order. Uses petgraph for graph operations.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use thiserror::Error;

use super::environment::EnvironmentState;
use super::stage::StageKind;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Deployment '{0}' cannot consume itself")]
    SelfConsumption(String),

    #[error("Deployment '{consumer}' references unknown provider deployment '{provider}'")]
    UnknownProvider { provider: String, consumer: String },

    #[error("Dependency cycle detected involving deployment '{0}'")]
    DependencyCycle(String),
}

/// Provider-to-consumer graph for one environment and stage kind.
/// Construction validates the bindings; any error leaves no partial graph
/// behind.
#[derive(Debug)]
pub struct DeploymentGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
    roots: Vec<String>,
}

impl DeploymentGraph {
    /// Builds the graph over every root deployment holding a record for
    /// `stage`. Deployments without that record are excluded entirely;
    /// bindings pointing at an excluded deployment impose no ordering.
    /// Self-consumption, bindings to names absent from the environment, and
    /// dependency cycles are all rejected here.
    pub fn from_environment(
        env: &EnvironmentState,
        stage: StageKind,
    ) -> Result<Self, GraphError> {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();

        // nodes first, in name order, so indices are deterministic
        for (name, deployment) in &env.deployments {
            if deployment.stage(stage).is_some() {
                let idx = graph.add_node(name.clone());
                node_map.insert(name.clone(), idx);
            }
        }

        let mut roots = Vec::new();
        for (name, deployment) in &env.deployments {
            let record = match deployment.stage(stage) {
                Some(record) => record,
                None => continue,
            };
            let consumer_idx = match node_map.get(name.as_str()) {
                Some(idx) => *idx,
                None => continue,
            };

            let mut prerequisites = 0;
            for provider in record.providers.values() {
                if provider == name {
                    return Err(GraphError::SelfConsumption(name.clone()));
                }
                if !env.deployments.contains_key(provider.as_str()) {
                    return Err(GraphError::UnknownProvider {
                        provider: provider.clone(),
                        consumer: name.clone(),
                    });
                }
                // the provider exists but sits outside this stage's graph
                let provider_idx = match node_map.get(provider.as_str()) {
                    Some(idx) => *idx,
                    None => continue,
                };
                graph.add_edge(provider_idx, consumer_idx, ());
                prerequisites += 1;
            }
            if prerequisites == 0 {
                roots.push(name.clone());
            }
        }

        if let Err(cycle) = toposort(&graph, None) {
            let name = graph
                .node_weight(cycle.node_id())
                .cloned()
                .unwrap_or_default();
            return Err(GraphError::DependencyCycle(name));
        }

        Ok(Self {
            graph,
            node_map,
            roots,
        })
    }

    /// Deployments with no prerequisite in this graph, in name order
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    /// Direct providers of a deployment, in name order
    pub fn dependencies(&self, name: &str) -> Vec<String> {
        self.neighbors(name, petgraph::Direction::Incoming)
    }

    /// Direct consumers of a deployment, in name order
    pub fn dependents(&self, name: &str) -> Vec<String> {
        self.neighbors(name, petgraph::Direction::Outgoing)
    }

    fn neighbors(&self, name: &str, direction: petgraph::Direction) -> Vec<String> {
        let idx = match self.node_map.get(name) {
            Some(idx) => *idx,
            None => return vec![],
        };
        let mut result: Vec<String> = self
            .graph
            .neighbors_directed(idx, direction)
            .filter_map(|n| self.graph.node_weight(n).cloned())
            .collect();
        result.sort();
        result.dedup();
        result
    }

    /// Every deployment in the graph exactly once, each provider strictly
    /// before all of its consumers
    pub fn deployment_order(&self) -> Result<Vec<String>, GraphError> {
        match toposort(&self.graph, None) {
            Ok(order) => Ok(order
                .into_iter()
                .filter_map(|idx| self.graph.node_weight(idx).cloned())
                .collect()),
            Err(cycle) => Err(GraphError::DependencyCycle(
                self.graph
                    .node_weight(cycle.node_id())
                    .cloned()
                    .unwrap_or_default(),
            )),
        }
    }
}

impl EnvironmentState {
    /// Dependency graph over this environment's root deployments for `stage`
    pub fn deployment_graph(&self, stage: StageKind) -> Result<DeploymentGraph, GraphError> {
        DeploymentGraph::from_environment(self, stage)
    }

    /// Execution order for `stage`: providers before their consumers
    pub fn deployment_order(&self, stage: StageKind) -> Result<Vec<String>, GraphError> {
        self.deployment_graph(stage)?.deployment_order()
    }
}
