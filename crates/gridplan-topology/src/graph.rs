//! The assembled topology graph.
//!
//! `TopologyGraph` collects every declared entity and enforces the
//! cross-entity invariants the per-entity builders cannot see: logical
//! ids are unique across the graph, and every service or scheduled task
//! references a cluster (and task definition) that was actually declared.
//! Once assembled the graph is write-once; an update is a full
//! redeclaration producing a new graph for the provisioner to reconcile.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use gridplan_core::{ConfigError, ConfigResult, LogicalId};

use crate::cluster::ClusterSpec;
use crate::network::NetworkSpec;
use crate::schedule::ScheduledTaskSpec;
use crate::service::ServiceSpec;
use crate::task::TaskDefinitionSpec;

/// Everything one declaration pass produced, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyGraph {
    pub networks: Vec<NetworkSpec>,
    pub clusters: Vec<ClusterSpec>,
    pub task_definitions: Vec<TaskDefinitionSpec>,
    pub services: Vec<ServiceSpec>,
    pub scheduled_tasks: Vec<ScheduledTaskSpec>,
}

impl TopologyGraph {
    pub fn new() -> TopologyGraph {
        TopologyGraph::default()
    }

    pub fn add_network(&mut self, network: NetworkSpec) -> ConfigResult<()> {
        self.claim_id(&network.id)?;
        self.networks.push(network);
        Ok(())
    }

    pub fn add_cluster(&mut self, cluster: ClusterSpec) -> ConfigResult<()> {
        self.claim_id(&cluster.id)?;
        if !self.networks.iter().any(|n| n.id == cluster.network) {
            return Err(ConfigError::UnknownReference {
                owner: cluster.id.clone(),
                kind: "network",
                id: cluster.network.clone(),
            });
        }
        let mut sibling_ids: HashSet<&str> = HashSet::new();
        sibling_ids.insert(&cluster.id);
        for pool in &cluster.capacity_pools {
            self.claim_id(&pool.id)?;
            if !sibling_ids.insert(&pool.id) {
                return Err(ConfigError::DuplicateLogicalId(pool.id.clone()));
            }
        }
        self.clusters.push(cluster);
        Ok(())
    }

    pub fn add_task_definition(&mut self, task: TaskDefinitionSpec) -> ConfigResult<()> {
        self.claim_id(&task.id)?;
        self.task_definitions.push(task);
        Ok(())
    }

    pub fn add_service(&mut self, service: ServiceSpec) -> ConfigResult<()> {
        self.claim_id(&service.id)?;
        if !self.clusters.iter().any(|c| c.id == service.cluster) {
            return Err(ConfigError::UnknownReference {
                owner: service.id.clone(),
                kind: "cluster",
                id: service.cluster.clone(),
            });
        }
        if !self.task_definitions.iter().any(|t| t.id == service.task_definition) {
            return Err(ConfigError::UnknownReference {
                owner: service.id.clone(),
                kind: "task definition",
                id: service.task_definition.clone(),
            });
        }
        self.services.push(service);
        Ok(())
    }

    pub fn add_scheduled_task(&mut self, task: ScheduledTaskSpec) -> ConfigResult<()> {
        self.claim_id(&task.id)?;
        if !self.clusters.iter().any(|c| c.id == task.cluster) {
            return Err(ConfigError::UnknownReference {
                owner: task.id.clone(),
                kind: "cluster",
                id: task.cluster.clone(),
            });
        }
        self.scheduled_tasks.push(task);
        Ok(())
    }

    /// Total declared resources, counting one per capacity pool.
    pub fn resource_count(&self) -> usize {
        self.networks.len()
            + self.clusters.len()
            + self.clusters.iter().map(|c| c.capacity_pools.len()).sum::<usize>()
            + self.task_definitions.len()
            + self.services.len()
            + self.scheduled_tasks.len()
    }

    /// Log a one-line summary of the assembled graph.
    pub fn log_summary(&self) {
        info!(
            networks = self.networks.len(),
            clusters = self.clusters.len(),
            task_definitions = self.task_definitions.len(),
            services = self.services.len(),
            scheduled_tasks = self.scheduled_tasks.len(),
            "assembled topology graph"
        );
    }

    fn claim_id(&self, id: &LogicalId) -> ConfigResult<()> {
        let mut ids: HashSet<&str> = HashSet::new();
        for network in &self.networks {
            ids.insert(&network.id);
        }
        for cluster in &self.clusters {
            ids.insert(&cluster.id);
            for pool in &cluster.capacity_pools {
                ids.insert(&pool.id);
            }
        }
        for task in &self.task_definitions {
            ids.insert(&task.id);
        }
        for service in &self.services {
            ids.insert(&service.id);
        }
        for task in &self.scheduled_tasks {
            ids.insert(&task.id);
        }
        if ids.contains(id.as_str()) {
            return Err(ConfigError::DuplicateLogicalId(id.clone()));
        }
        Ok(())
    }
}
