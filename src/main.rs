//! Copydesk - marketing copy and research studio
//!
#![doc = "Copydesk - marketing copy and research studio"]
#![doc = "Main entry point for the Copydesk application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use copydesk::cli::{Cli, Commands};
use copydesk::commands;
use copydesk::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Generate {
            content_type,
            prompt,
            tone,
            words,
            keywords,
            audience,
            save,
            copy,
        } => {
            tracing::info!("Starting one-shot generation");
            let args = commands::generate::GenerateArgs {
                content_type,
                prompt,
                tone,
                words,
                keywords,
                audience,
                save,
                copy,
            };
            commands::generate::run_generate(config, args).await?;
            Ok(())
        }
        Commands::Research {
            research_type,
            attach,
            question,
        } => {
            tracing::info!("Starting research question");
            commands::research::run_research(config, research_type, attach, question).await?;
            Ok(())
        }
        Commands::Studio { panel } => {
            tracing::info!("Starting interactive studio");
            commands::studio::run_studio(config, &panel).await?;
            Ok(())
        }
        Commands::Types { json } => {
            commands::types::print_types(json)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "copydesk=debug"
    } else {
        "copydesk=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
