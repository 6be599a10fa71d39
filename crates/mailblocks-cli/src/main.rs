//! mailblocks CLI - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "mailblocks")]
#[command(version)]
#[command(about = "Build, render and migrate block-based email templates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template to HTML
    Render {
        /// Template JSON file
        template: String,

        /// JSON file with variable values
        #[arg(long)]
        vars: Option<String>,

        /// Variable value (KEY=VALUE), overrides --vars
        #[arg(short = 'V', long = "var")]
        var: Vec<String>,

        /// Fill variables from the registry's example values first
        #[arg(long)]
        examples: bool,

        /// Keep every {{name}} reference instead of substituting
        #[arg(long)]
        preserve: bool,

        /// Draw the preview banner
        #[arg(long)]
        preview: bool,

        /// Emit the block fragments only, without the envelope
        #[arg(long)]
        fragment: bool,

        /// TOML file with shell options
        #[arg(long)]
        config: Option<String>,

        /// Write output to FILE instead of stdout
        #[arg(short = 'o', long)]
        output: Option<String>,
    },

    /// Import a legacy template module
    Import {
        /// Legacy .ts module
        input: String,

        /// Write the template JSON to FILE instead of stdout
        #[arg(short = 'o', long)]
        output: Option<String>,

        /// Print the full import result, diagnostics included, as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a legacy template module from a template
    Generate {
        /// Template JSON file
        template: String,

        /// Write output to FILE instead of stdout
        #[arg(short = 'o', long)]
        output: Option<String>,
    },

    /// List the variable registry
    Variables {
        /// Only variables available in this template context
        #[arg(long)]
        context: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the system template catalog
    Catalog {
        /// Only templates in this category
        #[arg(long)]
        category: Option<String>,

        /// Print the starter template for SLUG as JSON
        #[arg(long, value_name = "SLUG")]
        starter: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a new block of the given kind with default content
    NewBlock {
        /// Block kind (e.g. button, info-box)
        kind: String,

        /// Block id
        id: String,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailblocks=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            template,
            vars,
            var,
            examples,
            preserve,
            preview,
            fragment,
            config,
            output,
        } => commands::render::execute(commands::render::RenderArgs {
            template,
            vars,
            var,
            examples,
            preserve,
            preview,
            fragment,
            config,
            output,
        }),
        Commands::Import {
            input,
            output,
            json,
        } => commands::import::execute(commands::import::ImportArgs {
            input,
            output,
            json,
        }),
        Commands::Generate { template, output } => {
            commands::generate::execute(commands::generate::GenerateArgs { template, output })
        }
        Commands::Variables { context, json } => {
            commands::variables::execute(commands::variables::VariablesArgs { context, json })
        }
        Commands::Catalog {
            category,
            starter,
            json,
        } => commands::catalog::execute(commands::catalog::CatalogArgs {
            category,
            starter,
            json,
        }),
        Commands::NewBlock { kind, id } => {
            commands::new_block::execute(commands::new_block::NewBlockArgs { kind, id })
        }
    }
}
