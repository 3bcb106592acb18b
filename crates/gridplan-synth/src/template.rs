//! Provider-template rendering.
//!
//! One resource per declared entity (each capacity pool renders as its
//! own resource). Resources live in a `BTreeMap` so serialization order
//! never depends on declaration order; ordered semantics (containers,
//! dependency edges, placement strategies) stay inside JSON arrays, which
//! preserve the declared order verbatim.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use gridplan_topology::{
    CapacityPoolSpec, ClusterSpec, ContainerSpec, NetworkSpec, PlacementStrategy, ScheduledTaskSpec,
    ServiceSpec, SpreadAttribute, TaskDefinitionSpec, TopologyGraph,
};

/// A synthesized template: resources keyed by logical ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub resources: BTreeMap<String, Resource>,
}

/// One resource: a type tag plus an opaque property bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub properties: Value,
}

impl Template {
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(raw: &str) -> serde_json::Result<Template> {
        serde_json::from_str(raw)
    }
}

/// Render a topology graph into a template.
pub fn render(graph: &TopologyGraph) -> Template {
    let mut resources = BTreeMap::new();

    for network in &graph.networks {
        resources.insert(network.id.clone(), render_network(network));
    }
    for cluster in &graph.clusters {
        resources.insert(cluster.id.clone(), render_cluster(cluster));
        for pool in &cluster.capacity_pools {
            resources.insert(pool.id.clone(), render_pool(cluster, pool));
        }
    }
    for task in &graph.task_definitions {
        resources.insert(task.id.clone(), render_task_definition(task));
    }
    for service in &graph.services {
        resources.insert(service.id.clone(), render_service(service));
    }
    for task in &graph.scheduled_tasks {
        resources.insert(task.id.clone(), render_scheduled_task(task));
    }

    debug!(resources = resources.len(), "rendered template");
    Template { resources }
}

fn render_network(network: &NetworkSpec) -> Resource {
    Resource {
        resource_type: "GridPlan::Network".to_string(),
        properties: json!({
            "cidr": network.cidr,
            "subnets": network.subnets.iter().map(|s| json!({
                "id": s.id,
                "zone": s.zone.0,
                "cidr": s.cidr,
            })).collect::<Vec<_>>(),
        }),
    }
}

fn render_cluster(cluster: &ClusterSpec) -> Resource {
    Resource {
        resource_type: "GridPlan::Cluster".to_string(),
        properties: json!({
            "network": cluster.network,
            "capacityPools": cluster.capacity_pools.iter().map(|p| &p.id).collect::<Vec<_>>(),
        }),
    }
}

fn render_pool(cluster: &ClusterSpec, pool: &CapacityPoolSpec) -> Resource {
    Resource {
        resource_type: "GridPlan::CapacityPool".to_string(),
        properties: json!({
            "cluster": cluster.id,
            "instanceShape": pool.shape.to_string(),
            "machineImage": pool.image,
            "desiredCount": pool.desired_count,
        }),
    }
}

fn render_task_definition(task: &TaskDefinitionSpec) -> Resource {
    Resource {
        resource_type: "GridPlan::TaskDefinition".to_string(),
        properties: json!({
            "networkMode": task.network_mode,
            "containers": task.containers.iter().map(render_container).collect::<Vec<_>>(),
            "dependencies": task.dependencies.iter().map(|d| json!({
                "container": d.container,
                "dependsOn": d.depends_on,
                "condition": d.condition,
            })).collect::<Vec<_>>(),
        }),
    }
}

fn render_container(container: &ContainerSpec) -> Value {
    let mut bag = serde_json::Map::new();
    bag.insert("name".to_string(), json!(container.name));
    bag.insert("image".to_string(), json!(container.image));
    bag.insert("memoryMib".to_string(), json!(container.memory_mib));
    bag.insert("essential".to_string(), json!(container.essential));

    if let Some(cpu) = container.cpu {
        bag.insert("cpu".to_string(), json!(cpu));
    }
    if let Some(gpu) = container.gpu_count {
        bag.insert("gpuCount".to_string(), json!(gpu));
    }
    if let Some(command) = &container.command {
        bag.insert("command".to_string(), json!(command));
    }
    if !container.environment.is_empty() {
        // Rendered as an ordered list of pairs, not a map, so declared
        // order survives serialization.
        bag.insert(
            "environment".to_string(),
            json!(
                container
                    .environment
                    .iter()
                    .map(|(k, v)| json!({ "name": k, "value": v }))
                    .collect::<Vec<_>>()
            ),
        );
    }
    if !container.port_mappings.is_empty() {
        bag.insert(
            "portMappings".to_string(),
            json!(
                container
                    .port_mappings
                    .iter()
                    .map(|p| json!({
                        "containerPort": p.container_port,
                        "hostPort": p.host_port,
                        "protocol": p.protocol,
                    }))
                    .collect::<Vec<_>>()
            ),
        );
    }
    if let Some(check) = &container.health_check {
        bag.insert(
            "healthCheck".to_string(),
            json!({
                "command": check.command,
                "intervalSecs": check.interval_secs,
                "timeoutSecs": check.timeout_secs,
                "retries": check.retries,
            }),
        );
    }
    if let Some(logging) = &container.logging {
        bag.insert(
            "logging".to_string(),
            json!({
                "streamPrefix": logging.stream_prefix,
                "retentionDays": logging.retention_days,
            }),
        );
    }

    Value::Object(bag)
}

fn render_service(service: &ServiceSpec) -> Resource {
    Resource {
        resource_type: "GridPlan::Service".to_string(),
        properties: json!({
            "cluster": service.cluster,
            "taskDefinition": service.task_definition,
            "desiredCount": service.desired_count,
            "placementStrategies": service
                .placement_strategies
                .iter()
                .map(render_strategy)
                .collect::<Vec<_>>(),
        }),
    }
}

fn render_strategy(strategy: &PlacementStrategy) -> Value {
    match strategy {
        PlacementStrategy::BinPack { resource } => json!({
            "type": "binpack",
            "resource": resource,
        }),
        PlacementStrategy::Spread { attribute } => json!({
            "type": "spread",
            "attribute": match attribute {
                SpreadAttribute::AvailabilityZone => "availability_zone".to_string(),
                SpreadAttribute::InstanceType => "instance_type".to_string(),
                SpreadAttribute::Custom(name) => name.clone(),
            },
        }),
        PlacementStrategy::Random => json!({ "type": "random" }),
    }
}

fn render_scheduled_task(task: &ScheduledTaskSpec) -> Resource {
    Resource {
        resource_type: "GridPlan::ScheduledTask".to_string(),
        properties: json!({
            "cluster": task.cluster,
            "schedule": task.schedule.as_str(),
            "container": render_container(&task.container),
        }),
    }
}
