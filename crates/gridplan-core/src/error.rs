//! Configuration-validation errors.
//!
//! Every error GridPlan can raise is a `ConfigError`, surfaced synchronously
//! during the declaration pass. None are retried: a failed declaration
//! produces no graph at all, and the stack must be corrected and redeclared.

use thiserror::Error;

/// Errors raised while declaring or validating a topology.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid zone count {0}: a network must span at least one availability zone")]
    InvalidZoneCount(i64),

    #[error("capacity pool '{pool}': desired count {count} is negative")]
    NegativeDesiredCount { pool: String, count: i64 },

    #[error("capacity pool '{pool}': GPU-optimized image requires a GPU-capable instance shape, got {shape}")]
    GpuImageOnNonGpuShape { pool: String, shape: String },

    #[error("task definition '{task}': duplicate container name '{container}'")]
    DuplicateContainer { task: String, container: String },

    #[error("task definition '{task}': dependency references unknown container '{container}'")]
    UnknownDependencyContainer { task: String, container: String },

    #[error("task definition '{task}': container dependency cycle through '{container}'")]
    DependencyCycle { task: String, container: String },

    #[error("task definition '{task}': at least one container must be essential")]
    NoEssentialContainer { task: String },

    #[error("invalid schedule expression '{expression}': {reason}")]
    InvalidSchedule { expression: String, reason: String },

    #[error("'{owner}': unknown {kind} reference '{id}'")]
    UnknownReference {
        owner: String,
        kind: &'static str,
        id: String,
    },

    #[error("duplicate logical id '{0}' in topology graph")]
    DuplicateLogicalId(String),

    #[error("failed to read stack config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse stack config: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
