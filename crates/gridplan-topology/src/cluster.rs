//! Cluster declaration — clusters and the capacity pools backing them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use gridplan_core::{ConfigError, ConfigResult, LogicalId};

/// A cluster bound to a network, backed by zero or more capacity pools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSpec {
    pub id: LogicalId,
    /// Network this cluster's instances attach to.
    pub network: LogicalId,
    pub capacity_pools: Vec<CapacityPoolSpec>,
}

/// A homogeneous group of compute instances backing a cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityPoolSpec {
    pub id: LogicalId,
    pub shape: InstanceShape,
    pub image: MachineImage,
    pub desired_count: u32,
}

/// Compute instance shape: class family plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceShape {
    pub class: InstanceClass,
    pub size: InstanceSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceClass {
    /// Burstable general purpose.
    T2,
    T3,
    /// Fixed-performance general purpose.
    M5,
    /// Compute optimized.
    C5,
    /// GPU accelerated.
    G3,
    G4,
    P3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceSize {
    Micro,
    Small,
    Medium,
    Large,
    XLarge,
    XLarge2,
    XLarge4,
}

/// Base machine image for a capacity pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineImage {
    /// Cluster-optimized image for general-purpose instances.
    Standard,
    /// Cluster-optimized image with GPU drivers baked in.
    GpuOptimized,
}

impl InstanceShape {
    pub fn of(class: InstanceClass, size: InstanceSize) -> InstanceShape {
        InstanceShape { class, size }
    }

    pub fn supports_gpu(&self) -> bool {
        matches!(
            self.class,
            InstanceClass::G3 | InstanceClass::G4 | InstanceClass::P3
        )
    }
}

impl std::fmt::Display for InstanceShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let class = match self.class {
            InstanceClass::T2 => "t2",
            InstanceClass::T3 => "t3",
            InstanceClass::M5 => "m5",
            InstanceClass::C5 => "c5",
            InstanceClass::G3 => "g3",
            InstanceClass::G4 => "g4",
            InstanceClass::P3 => "p3",
        };
        let size = match self.size {
            InstanceSize::Micro => "micro",
            InstanceSize::Small => "small",
            InstanceSize::Medium => "medium",
            InstanceSize::Large => "large",
            InstanceSize::XLarge => "xlarge",
            InstanceSize::XLarge2 => "2xlarge",
            InstanceSize::XLarge4 => "4xlarge",
        };
        write!(f, "{class}.{size}")
    }
}

impl ClusterSpec {
    /// Declare an empty cluster on a network, referenced by logical id.
    pub fn declare(id: &str, network: &str) -> ClusterSpec {
        ClusterSpec {
            id: id.to_string(),
            network: network.to_string(),
            capacity_pools: Vec::new(),
        }
    }

    /// Register a capacity pool on this cluster.
    ///
    /// Fails if `desired_count` is negative, or if a GPU-optimized image is
    /// requested on a shape without GPU support.
    pub fn add_capacity_pool(
        &mut self,
        id: &str,
        shape: InstanceShape,
        image: MachineImage,
        desired_count: i64,
    ) -> ConfigResult<()> {
        if desired_count < 0 {
            return Err(ConfigError::NegativeDesiredCount {
                pool: id.to_string(),
                count: desired_count,
            });
        }
        if image == MachineImage::GpuOptimized && !shape.supports_gpu() {
            return Err(ConfigError::GpuImageOnNonGpuShape {
                pool: id.to_string(),
                shape: shape.to_string(),
            });
        }

        debug!(cluster = %self.id, pool = id, shape = %shape, desired_count, "added capacity pool");

        self.capacity_pools.push(CapacityPoolSpec {
            id: id.to_string(),
            shape,
            image,
            desired_count: desired_count as u32,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_registration_preserves_order() {
        let mut cluster = ClusterSpec::declare("demo/cluster", "demo/vpc");
        cluster
            .add_capacity_pool(
                "small",
                InstanceShape::of(InstanceClass::T2, InstanceSize::Micro),
                MachineImage::Standard,
                3,
            )
            .unwrap();
        cluster
            .add_capacity_pool(
                "gpu",
                InstanceShape::of(InstanceClass::G3, InstanceSize::XLarge4),
                MachineImage::GpuOptimized,
                2,
            )
            .unwrap();

        assert_eq!(cluster.capacity_pools.len(), 2);
        assert_eq!(cluster.capacity_pools[0].id, "small");
        assert_eq!(cluster.capacity_pools[1].desired_count, 2);
    }

    #[test]
    fn negative_desired_count_rejected() {
        let mut cluster = ClusterSpec::declare("demo/cluster", "demo/vpc");
        let err = cluster
            .add_capacity_pool(
                "small",
                InstanceShape::of(InstanceClass::T2, InstanceSize::Micro),
                MachineImage::Standard,
                -1,
            )
            .unwrap_err();
        assert!(matches!(err, ConfigError::NegativeDesiredCount { count: -1, .. }));
    }

    #[test]
    fn gpu_image_on_non_gpu_shape_rejected() {
        let mut cluster = ClusterSpec::declare("demo/cluster", "demo/vpc");
        let err = cluster
            .add_capacity_pool(
                "gpu",
                InstanceShape::of(InstanceClass::T2, InstanceSize::Micro),
                MachineImage::GpuOptimized,
                1,
            )
            .unwrap_err();
        assert!(matches!(err, ConfigError::GpuImageOnNonGpuShape { .. }));
    }

    #[test]
    fn gpu_image_on_gpu_shape_accepted() {
        let mut cluster = ClusterSpec::declare("demo/cluster", "demo/vpc");
        assert!(
            cluster
                .add_capacity_pool(
                    "gpu",
                    InstanceShape::of(InstanceClass::P3, InstanceSize::XLarge2),
                    MachineImage::GpuOptimized,
                    0,
                )
                .is_ok()
        );
    }

    #[test]
    fn zero_desired_count_is_valid() {
        let mut cluster = ClusterSpec::declare("demo/cluster", "demo/vpc");
        cluster
            .add_capacity_pool(
                "idle",
                InstanceShape::of(InstanceClass::M5, InstanceSize::Large),
                MachineImage::Standard,
                0,
            )
            .unwrap();
        assert_eq!(cluster.capacity_pools[0].desired_count, 0);
    }

    #[test]
    fn shape_display() {
        let shape = InstanceShape::of(InstanceClass::G3, InstanceSize::XLarge4);
        assert_eq!(shape.to_string(), "g3.4xlarge");
    }
}
