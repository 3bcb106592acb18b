use std::path::Path;

use gridplan_core::StackConfig;

pub fn run(name: &str, path: &str) -> anyhow::Result<()> {
    let output = Path::new(path).join("gridplan.toml");
    if output.exists() {
        anyhow::bail!("{} already exists", output.display());
    }

    let config = StackConfig::scaffold(name);
    std::fs::write(&output, config.to_toml_string())?;
    println!("✓ Generated {}", output.display());
    Ok(())
}
