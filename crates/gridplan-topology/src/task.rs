//! Task definitions — containers that run together as one unit, with
//! declared startup ordering.
//!
//! A task definition is validated at build time: container names must be
//! unique, every dependency edge must reference a declared container, and
//! the edge set must be acyclic. Cycle detection runs a three-color DFS
//! over the per-task-definition subgraph; the provisioner never sees an
//! unordered or cyclic graph.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use gridplan_core::{ConfigError, ConfigResult, ContainerName, LogicalId};

/// A template describing one or more containers that run together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinitionSpec {
    pub id: LogicalId,
    pub network_mode: NetworkMode,
    /// Containers in declaration order.
    pub containers: Vec<ContainerSpec>,
    /// Startup-ordering edges between containers of this task definition.
    pub dependencies: Vec<ContainerDependency>,
}

/// How task containers attach to the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkMode {
    Bridge,
    Host,
    AwsVpc,
    None,
}

/// One container within a task definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSpec {
    /// Name, unique within the task definition.
    pub name: ContainerName,
    /// Source image reference (registry path, optionally tagged).
    pub image: String,
    /// Memory reservation in MiB.
    pub memory_mib: u32,
    /// CPU share (relative weight).
    pub cpu: Option<u32>,
    /// GPUs reserved for this container.
    pub gpu_count: Option<u32>,
    /// If true, this container failing terminates the whole task.
    pub essential: bool,
    pub command: Option<Vec<String>>,
    pub environment: Vec<(String, String)>,
    pub port_mappings: Vec<PortMapping>,
    pub health_check: Option<HealthCheck>,
    pub logging: Option<LogConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub container_port: u16,
    pub host_port: Option<u16>,
    pub protocol: Protocol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

/// Health-check policy run inside the container by the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub command: Vec<String>,
    pub interval_secs: u32,
    pub timeout_secs: u32,
    pub retries: u32,
}

/// Log-driver configuration for a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    pub stream_prefix: String,
    pub retention_days: u32,
}

/// A startup-ordering edge: `container` may start only once `depends_on`
/// has satisfied `condition`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerDependency {
    pub container: ContainerName,
    pub depends_on: ContainerName,
    pub condition: DependencyCondition,
}

/// Predecessor state required before a dependent container may start.
///
/// Whether a dependent whose predecessor never reaches the condition stays
/// pending or is failed is runtime policy; the declaration only asserts
/// the edge and its condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyCondition {
    /// Predecessor process has started.
    Start,
    /// Predecessor ran to completion with exit code 0.
    Success,
    /// Predecessor's health check has passed at least once.
    Healthy,
}

/// Incrementally assembles a task definition, validated on `build()`.
#[derive(Debug)]
pub struct TaskDefinitionBuilder {
    id: LogicalId,
    network_mode: NetworkMode,
    containers: Vec<ContainerSpec>,
    dependencies: Vec<ContainerDependency>,
}

impl TaskDefinitionSpec {
    pub fn builder(id: &str) -> TaskDefinitionBuilder {
        TaskDefinitionBuilder {
            id: id.to_string(),
            network_mode: NetworkMode::Bridge,
            containers: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Look up a container by name.
    pub fn container(&self, name: &str) -> Option<&ContainerSpec> {
        self.containers.iter().find(|c| c.name == name)
    }
}

impl TaskDefinitionBuilder {
    pub fn network_mode(mut self, mode: NetworkMode) -> Self {
        self.network_mode = mode;
        self
    }

    pub fn container(mut self, container: ContainerSpec) -> Self {
        self.containers.push(container);
        self
    }

    /// Declare that `container` starts only after `depends_on` satisfies
    /// `condition`.
    pub fn depends(
        mut self,
        container: &str,
        depends_on: &str,
        condition: DependencyCondition,
    ) -> Self {
        self.dependencies.push(ContainerDependency {
            container: container.to_string(),
            depends_on: depends_on.to_string(),
            condition,
        });
        self
    }

    /// Validate and freeze the task definition.
    pub fn build(self) -> ConfigResult<TaskDefinitionSpec> {
        let mut seen: HashSet<&str> = HashSet::new();
        for container in &self.containers {
            if !seen.insert(&container.name) {
                return Err(ConfigError::DuplicateContainer {
                    task: self.id.clone(),
                    container: container.name.clone(),
                });
            }
        }

        if !self.containers.is_empty() && !self.containers.iter().any(|c| c.essential) {
            return Err(ConfigError::NoEssentialContainer {
                task: self.id.clone(),
            });
        }

        for dep in &self.dependencies {
            for name in [&dep.container, &dep.depends_on] {
                if !seen.contains(name.as_str()) {
                    return Err(ConfigError::UnknownDependencyContainer {
                        task: self.id.clone(),
                        container: name.clone(),
                    });
                }
            }
        }

        check_acyclic(&self.id, &self.dependencies)?;

        debug!(
            task = %self.id,
            containers = self.containers.len(),
            dependencies = self.dependencies.len(),
            "built task definition"
        );

        Ok(TaskDefinitionSpec {
            id: self.id,
            network_mode: self.network_mode,
            containers: self.containers,
            dependencies: self.dependencies,
        })
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    InProgress,
    Done,
}

/// Reject dependency edge sets containing a cycle.
///
/// Three-color DFS: unvisited / in-progress / done. Hitting an
/// in-progress node again means the current path loops back on itself.
fn check_acyclic(task: &str, edges: &[ContainerDependency]) -> ConfigResult<()> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        adjacency
            .entry(edge.container.as_str())
            .or_default()
            .push(edge.depends_on.as_str());
    }

    let mut marks: HashMap<&str, Mark> = HashMap::new();
    for edge in edges {
        let start = edge.container.as_str();
        if marks.contains_key(start) {
            continue;
        }
        // Iterative DFS; the second stack entry per node closes it out.
        let mut stack: Vec<(&str, bool)> = vec![(start, false)];
        while let Some((node, closing)) = stack.pop() {
            if closing {
                marks.insert(node, Mark::Done);
                continue;
            }
            match marks.get(node) {
                Some(Mark::Done) => continue,
                Some(Mark::InProgress) => {
                    return Err(ConfigError::DependencyCycle {
                        task: task.to_string(),
                        container: node.to_string(),
                    });
                }
                None => {}
            }
            marks.insert(node, Mark::InProgress);
            stack.push((node, true));
            if let Some(next) = adjacency.get(node) {
                for &succ in next {
                    match marks.get(succ) {
                        Some(Mark::Done) => {}
                        Some(Mark::InProgress) => {
                            return Err(ConfigError::DependencyCycle {
                                task: task.to_string(),
                                container: succ.to_string(),
                            });
                        }
                        None => stack.push((succ, false)),
                    }
                }
            }
        }
    }
    Ok(())
}

impl ContainerSpec {
    /// A minimal container: image and memory reservation, essential by
    /// default.
    pub fn new(name: &str, image: &str, memory_mib: u32) -> ContainerSpec {
        ContainerSpec {
            name: name.to_string(),
            image: image.to_string(),
            memory_mib,
            cpu: None,
            gpu_count: None,
            essential: true,
            command: None,
            environment: Vec::new(),
            port_mappings: Vec::new(),
            health_check: None,
            logging: None,
        }
    }

    pub fn cpu(mut self, cpu: u32) -> Self {
        self.cpu = Some(cpu);
        self
    }

    pub fn gpu_count(mut self, count: u32) -> Self {
        self.gpu_count = Some(count);
        self
    }

    pub fn essential(mut self, essential: bool) -> Self {
        self.essential = essential;
        self
    }

    pub fn command<S: Into<String>>(mut self, command: impl IntoIterator<Item = S>) -> Self {
        self.command = Some(command.into_iter().map(Into::into).collect());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.environment.push((key.to_string(), value.to_string()));
        self
    }

    pub fn port(mut self, container_port: u16, host_port: Option<u16>, protocol: Protocol) -> Self {
        self.port_mappings.push(PortMapping {
            container_port,
            host_port,
            protocol,
        });
        self
    }

    pub fn health_check(mut self, check: HealthCheck) -> Self {
        self.health_check = Some(check);
        self
    }

    pub fn logging(mut self, stream_prefix: &str, retention_days: u32) -> Self {
        self.logging = Some(LogConfig {
            stream_prefix: stream_prefix.to_string(),
            retention_days,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(name: &str) -> ContainerSpec {
        ContainerSpec::new(name, "registry/sample", 128)
    }

    #[test]
    fn build_single_container() {
        let task = TaskDefinitionSpec::builder("demo/web-task")
            .container(simple("web").port(80, Some(8080), Protocol::Tcp))
            .build()
            .unwrap();
        assert_eq!(task.containers.len(), 1);
        assert_eq!(task.network_mode, NetworkMode::Bridge);
        assert_eq!(task.container("web").unwrap().port_mappings[0].host_port, Some(8080));
    }

    #[test]
    fn duplicate_container_name_rejected() {
        let err = TaskDefinitionSpec::builder("demo/task")
            .container(simple("a"))
            .container(simple("a"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateContainer { .. }));
    }

    #[test]
    fn unknown_dependency_reference_rejected() {
        let err = TaskDefinitionSpec::builder("demo/task")
            .container(simple("a"))
            .depends("a", "ghost", DependencyCondition::Start)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownDependencyContainer { container, .. } if container == "ghost"
        ));
    }

    #[test]
    fn two_node_cycle_rejected() {
        let err = TaskDefinitionSpec::builder("demo/task")
            .container(simple("a"))
            .container(simple("b"))
            .depends("a", "b", DependencyCondition::Start)
            .depends("b", "a", DependencyCondition::Start)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::DependencyCycle { .. }));
    }

    #[test]
    fn self_cycle_rejected() {
        let err = TaskDefinitionSpec::builder("demo/task")
            .container(simple("a"))
            .depends("a", "a", DependencyCondition::Success)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::DependencyCycle { .. }));
    }

    #[test]
    fn longer_cycle_rejected() {
        let err = TaskDefinitionSpec::builder("demo/task")
            .container(simple("a"))
            .container(simple("b"))
            .container(simple("c"))
            .depends("a", "b", DependencyCondition::Start)
            .depends("b", "c", DependencyCondition::Start)
            .depends("c", "a", DependencyCondition::Start)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::DependencyCycle { .. }));
    }

    #[test]
    fn chain_is_accepted() {
        let task = TaskDefinitionSpec::builder("demo/task")
            .container(simple("init").essential(false))
            .container(simple("server"))
            .container(simple("app"))
            .depends("server", "init", DependencyCondition::Success)
            .depends("app", "server", DependencyCondition::Healthy)
            .build()
            .unwrap();
        assert_eq!(task.dependencies.len(), 2);
    }

    #[test]
    fn diamond_is_accepted() {
        // a depends on b and c, both depend on d: shared predecessors are
        // not cycles.
        let task = TaskDefinitionSpec::builder("demo/task")
            .container(simple("a"))
            .container(simple("b"))
            .container(simple("c"))
            .container(simple("d"))
            .depends("a", "b", DependencyCondition::Start)
            .depends("a", "c", DependencyCondition::Start)
            .depends("b", "d", DependencyCondition::Start)
            .depends("c", "d", DependencyCondition::Start)
            .build()
            .unwrap();
        assert_eq!(task.dependencies.len(), 4);
    }

    #[test]
    fn all_non_essential_rejected() {
        let err = TaskDefinitionSpec::builder("demo/task")
            .container(simple("a").essential(false))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::NoEssentialContainer { .. }));
    }

    #[test]
    fn non_essential_without_dependents_is_valid() {
        // A sidecar that may exit non-zero must not invalidate the task;
        // whether it blocks anything at runtime is provisioner policy.
        let task = TaskDefinitionSpec::builder("demo/task")
            .container(simple("sidecar").essential(false))
            .container(simple("main"))
            .build()
            .unwrap();
        assert!(!task.container("sidecar").unwrap().essential);
        assert!(task.dependencies.is_empty());
    }
}
