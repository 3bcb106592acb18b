//! Shared types used across GridPlan crates.

use serde::{Deserialize, Serialize};

/// Logical identifier of a declared resource, unique within one graph.
pub type LogicalId = String;

/// Container name, unique within one task definition.
pub type ContainerName = String;

/// Deployment-target region identifier (e.g. "us-east-1").
pub type Region = String;

/// A named availability zone within a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityZone(pub String);

impl AvailabilityZone {
    /// Enumerate the first `count` zones of a region, in zone-suffix order.
    pub fn enumerate(region: &str, count: u32) -> Vec<AvailabilityZone> {
        // Zone suffixes are single letters; regions cap out well below 26.
        (0..count)
            .map(|i| {
                let suffix = (b'a' + (i % 26) as u8) as char;
                AvailabilityZone(format!("{region}{suffix}"))
            })
            .collect()
    }
}

impl std::fmt::Display for AvailabilityZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
