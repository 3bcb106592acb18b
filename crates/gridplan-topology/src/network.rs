//! Network declaration — an isolated address space partitioned across
//! availability zones.

use serde::{Deserialize, Serialize};
use tracing::debug;

use gridplan_core::{AvailabilityZone, ConfigError, ConfigResult, LogicalId};

/// An isolated network partitioned into one subnet per availability zone.
///
/// Created once at declaration time; never mutated afterwards. Subnet
/// address ranges are carved out of the network CIDR in zone order so the
/// same inputs always yield the same partitioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub id: LogicalId,
    /// Address space for the whole network.
    pub cidr: String,
    /// Zones this network spans, in enumeration order.
    pub zones: Vec<AvailabilityZone>,
    /// One subnet per zone, same order as `zones`.
    pub subnets: Vec<SubnetSpec>,
}

/// A single-zone slice of the network address space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubnetSpec {
    pub id: LogicalId,
    pub zone: AvailabilityZone,
    pub cidr: String,
}

const DEFAULT_CIDR_PREFIX: &str = "10.0";

impl NetworkSpec {
    /// Declare a network spanning at most `max_zones` zones of `region`.
    ///
    /// Fails with `ConfigError::InvalidZoneCount` if `max_zones < 1`.
    pub fn declare(id: &str, region: &str, max_zones: i64) -> ConfigResult<NetworkSpec> {
        if max_zones < 1 {
            return Err(ConfigError::InvalidZoneCount(max_zones));
        }

        let zones = AvailabilityZone::enumerate(region, max_zones as u32);
        let subnets = zones
            .iter()
            .enumerate()
            .map(|(i, zone)| SubnetSpec {
                id: format!("{id}/subnet-{}", i + 1),
                zone: zone.clone(),
                cidr: format!("{DEFAULT_CIDR_PREFIX}.{i}.0/24"),
            })
            .collect();

        debug!(network = id, zones = zones.len(), "declared network");

        Ok(NetworkSpec {
            id: id.to_string(),
            cidr: format!("{DEFAULT_CIDR_PREFIX}.0.0/16"),
            zones,
            subnets,
        })
    }
}
