//! Services — long-running bindings of a task definition to a cluster,
//! with an ordered placement strategy chain.
//!
//! Strategy order is semantic: the provisioner evaluates strategies
//! left-to-right as successive tie-breakers. The first strategy picks the
//! candidate hosts that best satisfy it; each later strategy only breaks
//! ties among the survivors. GridPlan therefore preserves the declared
//! order verbatim and never reorders or deduplicates the chain.

use serde::{Deserialize, Serialize};
use tracing::debug;

use gridplan_core::LogicalId;

/// A continuously-desired workload on a cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub id: LogicalId,
    pub cluster: LogicalId,
    pub task_definition: LogicalId,
    pub desired_count: u32,
    /// Tie-break chain, highest priority first.
    pub placement_strategies: Vec<PlacementStrategy>,
}

/// A rule guiding which host a task instance lands on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlacementStrategy {
    /// Prefer the host with the least remaining capacity of a resource
    /// dimension that still fits (minimizes fragmentation).
    BinPack { resource: BinPackResource },
    /// Maximize distribution across a topology attribute.
    Spread { attribute: SpreadAttribute },
    /// Place on any candidate host, uniformly.
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinPackResource {
    Cpu,
    Memory,
}

/// Built-in topology attributes a spread strategy can target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadAttribute {
    AvailabilityZone,
    InstanceType,
    /// Custom host attribute, by name.
    Custom(String),
}

impl ServiceSpec {
    /// Declare a service binding `task_definition` to `cluster`.
    pub fn declare(
        id: &str,
        cluster: &str,
        task_definition: &str,
        desired_count: u32,
    ) -> ServiceSpec {
        debug!(service = id, cluster, task_definition, desired_count, "declared service");
        ServiceSpec {
            id: id.to_string(),
            cluster: cluster.to_string(),
            task_definition: task_definition.to_string(),
            desired_count,
            placement_strategies: Vec::new(),
        }
    }

    /// Append placement strategies, preserving priority order.
    pub fn with_placement_strategies(
        mut self,
        strategies: impl IntoIterator<Item = PlacementStrategy>,
    ) -> Self {
        self.placement_strategies.extend(strategies);
        self
    }
}

impl PlacementStrategy {
    pub fn packed_by(resource: BinPackResource) -> PlacementStrategy {
        PlacementStrategy::BinPack { resource }
    }

    pub fn spread_across(attribute: SpreadAttribute) -> PlacementStrategy {
        PlacementStrategy::Spread { attribute }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_order_is_preserved() {
        let service = ServiceSpec::declare("demo/web", "demo/cluster", "demo/web-task", 2)
            .with_placement_strategies([
                PlacementStrategy::packed_by(BinPackResource::Memory),
                PlacementStrategy::spread_across(SpreadAttribute::AvailabilityZone),
            ]);

        assert_eq!(service.placement_strategies.len(), 2);
        assert_eq!(
            service.placement_strategies[0],
            PlacementStrategy::BinPack { resource: BinPackResource::Memory }
        );
        assert_eq!(
            service.placement_strategies[1],
            PlacementStrategy::Spread { attribute: SpreadAttribute::AvailabilityZone }
        );
    }

    #[test]
    fn chained_appends_keep_relative_order() {
        let service = ServiceSpec::declare("demo/web", "demo/cluster", "demo/web-task", 1)
            .with_placement_strategies([PlacementStrategy::Random])
            .with_placement_strategies([PlacementStrategy::packed_by(BinPackResource::Cpu)]);

        assert_eq!(service.placement_strategies[0], PlacementStrategy::Random);
        assert_eq!(
            service.placement_strategies[1],
            PlacementStrategy::BinPack { resource: BinPackResource::Cpu }
        );
    }
}
