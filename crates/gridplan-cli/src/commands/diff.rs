use gridplan_synth::{Template, diff_templates};

pub fn run(config_path: &str, against: &str) -> anyhow::Result<()> {
    let previous_raw = std::fs::read_to_string(against)?;
    let previous = Template::from_json_str(&previous_raw)?;

    let current = super::synthesize(config_path)?;
    let diff = diff_templates(&previous, &current);

    print!("{diff}");
    Ok(())
}
