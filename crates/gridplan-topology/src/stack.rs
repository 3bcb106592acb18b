//! The reference topology: one network, one cluster with a small and a
//! GPU capacity pool, four workloads.
//!
//! `declare_topology` is a pure function from stack configuration to
//! graph; declaring the same config twice yields structurally identical
//! graphs.

use tracing::debug;

use gridplan_core::{ConfigResult, StackConfig};

use crate::cluster::{ClusterSpec, InstanceClass, InstanceShape, InstanceSize, MachineImage};
use crate::graph::TopologyGraph;
use crate::network::NetworkSpec;
use crate::schedule::ScheduledTaskSpec;
use crate::service::{BinPackResource, PlacementStrategy, ServiceSpec, SpreadAttribute};
use crate::task::{
    ContainerSpec, DependencyCondition, HealthCheck, NetworkMode, Protocol, TaskDefinitionSpec,
};

/// Declare the full reference topology for `config`.
pub fn declare_topology(config: &StackConfig) -> ConfigResult<TopologyGraph> {
    let stack = &config.stack.name;
    debug!(stack, region = config.region(), "declaring topology");

    let mut graph = TopologyGraph::new();

    let network_id = format!("{stack}/vpc");
    graph.add_network(NetworkSpec::declare(
        &network_id,
        config.region(),
        config.max_zones(),
    )?)?;

    let cluster_id = format!("{stack}/cluster");
    let mut cluster = ClusterSpec::declare(&cluster_id, &network_id);
    cluster.add_capacity_pool(
        &format!("{stack}/small-instances"),
        InstanceShape::of(InstanceClass::T2, InstanceSize::Micro),
        MachineImage::Standard,
        config.small_instances(),
    )?;
    cluster.add_capacity_pool(
        &format!("{stack}/gpu-instances"),
        InstanceShape::of(InstanceClass::G3, InstanceSize::XLarge4),
        MachineImage::GpuOptimized,
        config.gpu_instances(),
    )?;
    graph.add_cluster(cluster)?;

    declare_web_workload(&mut graph, stack, &cluster_id)?;
    declare_gpu_workload(&mut graph, stack, &cluster_id)?;
    declare_ordered_workload(&mut graph, stack, &cluster_id)?;
    declare_scheduled_sweep(&mut graph, stack, &cluster_id)?;

    graph.log_summary();
    Ok(graph)
}

/// A load-balanced web service: bin-pack on memory first, then spread the
/// survivors across availability zones.
fn declare_web_workload(
    graph: &mut TopologyGraph,
    stack: &str,
    cluster_id: &str,
) -> ConfigResult<()> {
    let task_id = format!("{stack}/web-task");
    let task = TaskDefinitionSpec::builder(&task_id)
        .container(
            ContainerSpec::new("web", "amazon/amazon-ecs-sample", 256)
                .port(80, Some(8080), Protocol::Tcp),
        )
        .build()?;
    graph.add_task_definition(task)?;

    let service = ServiceSpec::declare(&format!("{stack}/web-service"), cluster_id, &task_id, 2)
        .with_placement_strategies([
            PlacementStrategy::packed_by(BinPackResource::Memory),
            PlacementStrategy::spread_across(SpreadAttribute::AvailabilityZone),
        ]);
    graph.add_service(service)
}

/// A GPU batch service pinned to the GPU pool by its resource reservation.
fn declare_gpu_workload(
    graph: &mut TopologyGraph,
    stack: &str,
    cluster_id: &str,
) -> ConfigResult<()> {
    let task_id = format!("{stack}/gpu-task");
    let task = TaskDefinitionSpec::builder(&task_id)
        .container(
            ContainerSpec::new("gpu", "nvidia/cuda:9.0-base", 80)
                .cpu(100)
                .gpu_count(1)
                .command(["sh", "-c", "nvidia-smi && sleep 3600"])
                .logging("gpu-service", 1),
        )
        .build()?;
    graph.add_task_definition(task)?;

    let service = ServiceSpec::declare(&format!("{stack}/gpu-service"), cluster_id, &task_id, 1);
    graph.add_service(service)
}

/// An ordered multi-container service: an ephemeral init container must
/// run to completion before a health-checked server starts, and the
/// application starts only once that server is healthy.
fn declare_ordered_workload(
    graph: &mut TopologyGraph,
    stack: &str,
    cluster_id: &str,
) -> ConfigResult<()> {
    let task_id = format!("{stack}/ordered-task");
    let task = TaskDefinitionSpec::builder(&task_id)
        .network_mode(NetworkMode::AwsVpc)
        .container(
            ContainerSpec::new("initial-work", "alpine:3.10", 80)
                .essential(false)
                .cpu(100)
                .command(["sh", "-c", "echo 'Working...' && sleep 5 && echo 'Done'"])
                .logging("ordered-task", 1),
        )
        .container(
            ContainerSpec::new("simple-server-dependency", "nathanpeck/name", 256)
                .cpu(100)
                .env("PORT", "3000")
                .health_check(HealthCheck {
                    command: vec!["CMD-SHELL".to_string(), "curl localhost:3000".to_string()],
                    interval_secs: 5,
                    timeout_secs: 2,
                    retries: 3,
                })
                .logging("ordered-task", 1),
        )
        .container(
            ContainerSpec::new("need-server-dependency", "nathanpeck/name", 256)
                .cpu(100)
                .env("PORT", "3001")
                .logging("ordered-task", 1),
        )
        .depends(
            "simple-server-dependency",
            "initial-work",
            DependencyCondition::Success,
        )
        .depends(
            "need-server-dependency",
            "simple-server-dependency",
            DependencyCondition::Healthy,
        )
        .build()?;
    graph.add_task_definition(task)?;

    let service =
        ServiceSpec::declare(&format!("{stack}/dependency-service"), cluster_id, &task_id, 1);
    graph.add_service(service)
}

/// A cron-fired ephemeral task; each firing is an independent,
/// non-restarting task instance.
fn declare_scheduled_sweep(
    graph: &mut TopologyGraph,
    stack: &str,
    cluster_id: &str,
) -> ConfigResult<()> {
    let task = ScheduledTaskSpec::declare(
        &format!("{stack}/scheduled-task"),
        cluster_id,
        "cron(0/5 * * * ? *)",
        ContainerSpec::new("scheduled", "amazonlinux:2", 512)
            .cpu(256)
            .command(["sh", "-c", "sleep 5"]),
    )?;
    graph.add_scheduled_task(task)
}
