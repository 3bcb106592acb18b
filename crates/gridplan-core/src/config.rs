//! gridplan.toml stack configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigResult;

/// Top-level stack configuration, read from `gridplan.toml`.
///
/// Everything beyond the stack name is optional; defaults reproduce the
/// reference topology. Deployment-target credentials are ambient
/// (environment-supplied) and never appear here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackConfig {
    pub stack: StackSection,
    pub network: Option<NetworkSection>,
    pub capacity: Option<CapacitySection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackSection {
    /// Stack/application identifier; prefixes every logical id.
    pub name: String,
    /// Target region for zone enumeration.
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSection {
    /// Cap on availability zones the network spans. Must be >= 1.
    pub max_zones: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacitySection {
    /// Desired instance count for the small general-purpose pool.
    pub small_instances: Option<i64>,
    /// Desired instance count for the GPU pool.
    pub gpu_instances: Option<i64>,
}

impl StackConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: StackConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> String {
        // StackConfig contains only tables of scalars; serialization
        // cannot fail.
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Scaffold a minimal gridplan.toml for a new stack.
    pub fn scaffold(name: &str) -> Self {
        StackConfig {
            stack: StackSection {
                name: name.to_string(),
                region: Some("us-east-1".to_string()),
            },
            network: Some(NetworkSection { max_zones: Some(3) }),
            capacity: Some(CapacitySection {
                small_instances: Some(3),
                gpu_instances: Some(2),
            }),
        }
    }

    pub fn region(&self) -> &str {
        self.stack.region.as_deref().unwrap_or("us-east-1")
    }

    pub fn max_zones(&self) -> i64 {
        self.network
            .as_ref()
            .and_then(|n| n.max_zones)
            .unwrap_or(3)
    }

    pub fn small_instances(&self) -> i64 {
        self.capacity
            .as_ref()
            .and_then(|c| c.small_instances)
            .unwrap_or(3)
    }

    pub fn gpu_instances(&self) -> i64 {
        self.capacity
            .as_ref()
            .and_then(|c| c.gpu_instances)
            .unwrap_or(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaffold_round_trips() {
        let config = StackConfig::scaffold("demo-stack");
        let toml_str = config.to_toml_string();
        assert!(toml_str.contains("demo-stack"));

        let parsed: StackConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.stack.name, "demo-stack");
        assert_eq!(parsed.max_zones(), 3);
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let toml_str = r#"
[stack]
name = "test"
"#;
        let config: StackConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.stack.name, "test");
        assert_eq!(config.region(), "us-east-1");
        assert_eq!(config.max_zones(), 3);
        assert_eq!(config.small_instances(), 3);
        assert_eq!(config.gpu_instances(), 2);
    }

    #[test]
    fn overrides_win_over_defaults() {
        let toml_str = r#"
[stack]
name = "test"
region = "eu-west-1"

[network]
max_zones = 2

[capacity]
small_instances = 5
"#;
        let config: StackConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.region(), "eu-west-1");
        assert_eq!(config.max_zones(), 2);
        assert_eq!(config.small_instances(), 5);
        assert_eq!(config.gpu_instances(), 2);
    }
}
