use tracing::info;

pub fn run(config_path: &str, output: Option<&str>) -> anyhow::Result<()> {
    let template = super::synthesize(config_path)?;
    let rendered = template.to_json_string()?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            info!(path, resources = template.resources.len(), "wrote template");
            println!("✓ Wrote {} ({} resources)", path, template.resources.len());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
