//! GridPlan topology declarator.
//!
//! This crate builds the immutable resource graph that `gridplan-synth`
//! renders into a provider template. Declaration is a single synchronous
//! pass: every entity is validated as it is constructed, and any
//! configuration error aborts the pass before a graph exists. It does NOT
//! talk to any provider — realizing the declared topology is the external
//! provisioner's job.
//!
//! # Components
//!
//! - **`network`** — isolated address space spanning availability zones
//! - **`cluster`** — clusters and their capacity pools
//! - **`task`** — task definitions, containers, dependency ordering
//! - **`service`** — services and placement strategy chains
//! - **`schedule`** — schedule expressions and cron-fired tasks
//! - **`graph`** — the assembled write-once topology graph
//! - **`stack`** — the reference topology built from a `StackConfig`

pub mod cluster;
pub mod graph;
pub mod network;
pub mod schedule;
pub mod service;
pub mod stack;
pub mod task;

pub use cluster::{CapacityPoolSpec, ClusterSpec, InstanceClass, InstanceShape, InstanceSize, MachineImage};
pub use graph::TopologyGraph;
pub use network::NetworkSpec;
pub use schedule::{ScheduleExpression, ScheduledTaskSpec};
pub use service::{BinPackResource, PlacementStrategy, ServiceSpec, SpreadAttribute};
pub use stack::declare_topology;
pub use task::{
    ContainerDependency, ContainerSpec, DependencyCondition, HealthCheck, LogConfig, NetworkMode,
    PortMapping, Protocol, TaskDefinitionSpec,
};
