use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "gridplan",
    about = "GridPlan — declarative cluster topology compiler",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize the topology template from gridplan.toml.
    ///
    /// Exits 0 on successful synthesis; any configuration validation
    /// failure (invalid zone count, dependency cycle, malformed schedule,
    /// GPU shape mismatch, ...) aborts with a non-zero exit code before
    /// any output is written.
    Synth {
        /// Stack config file
        #[arg(short, long, default_value = "gridplan.toml")]
        config: String,
        /// Write the template here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Diff a fresh synthesis against a previously-written template
    Diff {
        /// Stack config file
        #[arg(short, long, default_value = "gridplan.toml")]
        config: String,
        /// Previously synthesized template to compare against
        #[arg(short, long)]
        against: String,
    },
    /// Scaffold a gridplan.toml in the current directory
    Init {
        /// Stack name
        #[arg(short, long, default_value = "my-stack")]
        name: String,
        #[arg(short, long, default_value = ".")]
        path: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gridplan=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Synth { config, output } => commands::synth::run(&config, output.as_deref()),
        Commands::Diff { config, against } => commands::diff::run(&config, &against),
        Commands::Init { name, path } => commands::init::run(&name, &path),
    }
}
