//! psyreport CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "psyreport", version, about = "Assessment result report renderer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one result file into an HTML report
    Render {
        /// Path to the result JSON file
        #[arg(long)]
        result: PathBuf,

        /// Template version (default: the result's pinned version, then the latest)
        #[arg(long)]
        template_version: Option<u32>,

        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the view model as JSON instead of rendering
        #[arg(long)]
        view_model: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Render every result file in a directory
    Batch {
        /// Directory of result JSON files
        #[arg(long)]
        results: PathBuf,

        /// Output directory (default: output_dir from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Template version for every report
        #[arg(long)]
        template_version: Option<u32>,

        /// Max concurrent renders
        #[arg(long)]
        parallelism: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List available template versions
    Versions {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check a template file for syntax errors and unknown placeholders
    Validate {
        /// Path to the template file
        #[arg(long)]
        template: PathBuf,
    },

    /// Create starter config and the version 0 template
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("psyreport=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            result,
            template_version,
            output,
            view_model,
            config,
        } => commands::render::execute(result, template_version, output, view_model, config),
        Commands::Batch {
            results,
            output,
            template_version,
            parallelism,
            config,
        } => {
            commands::batch::execute(results, output, template_version, parallelism, config).await
        }
        Commands::Versions { config } => commands::versions::execute(config),
        Commands::Validate { template } => commands::validate::execute(template),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
