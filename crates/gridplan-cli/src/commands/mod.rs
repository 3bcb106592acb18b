pub mod diff;
pub mod init;
pub mod synth;

use std::path::Path;

use gridplan_core::StackConfig;
use gridplan_synth::Template;
use gridplan_topology::declare_topology;

/// Load the stack config and synthesize its template.
pub fn synthesize(config_path: &str) -> anyhow::Result<Template> {
    let config = StackConfig::from_file(Path::new(config_path))?;
    let graph = declare_topology(&config)?;
    Ok(gridplan_synth::render(&graph))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, body: &str) -> String {
        let path = dir.join("gridplan.toml");
        std::fs::write(&path, body).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn synthesize_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(
            dir.path(),
            r#"
[stack]
name = "cli-test"

[network]
max_zones = 2
"#,
        );

        let template = synthesize(&config).unwrap();
        assert!(template.resources.contains_key("cli-test/vpc"));
        assert_eq!(template.resources.len(), 11);
    }

    #[test]
    fn missing_config_file_fails() {
        assert!(synthesize("/nonexistent/gridplan.toml").is_err());
    }

    #[test]
    fn invalid_zone_count_fails_synthesis() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(
            dir.path(),
            r#"
[stack]
name = "cli-test"

[network]
max_zones = 0
"#,
        );
        assert!(synthesize(&config).is_err());
    }

    #[test]
    fn synth_then_diff_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path(), "[stack]\nname = \"cli-test\"\n");

        let template = synthesize(&config).unwrap();
        let out = dir.path().join("template.json");
        std::fs::write(&out, template.to_json_string().unwrap()).unwrap();

        let previous =
            Template::from_json_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        let diff = gridplan_synth::diff_templates(&previous, &synthesize(&config).unwrap());
        assert!(diff.is_empty());
    }
}
