use anyhow::Context;
use clap::Parser;
use flakestat::cli::commands::{self, ScoresOptions};
use flakestat::cli::{Cli, Commands};
use flakestat::types::config::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = if cli.config.exists() {
        Config::load(&cli.config)
            .with_context(|| format!("failed to load {}", cli.config.display()))?
    } else {
        Config::default_config()
    };

    // CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("flakestat={}", log_level)
            .parse()
            .unwrap_or_else(|_| "flakestat=info".parse().expect("fallback directive is valid")),
    );

    let registry = tracing_subscriber::registry().with(filter);
    if config.general.log_format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            commands::init(path)?;
        }
        Commands::Walk { root } => {
            commands::walk(&root)?;
        }
        Commands::Scores {
            root,
            pattern,
            label_column,
            cache,
            json,
        } => {
            let options = ScoresOptions {
                pattern,
                label_column,
                cache,
                json,
            };
            commands::scores(&root, &options, &config)
                .with_context(|| format!("failed to score {}", root.display()))?;
        }
        Commands::Cache(command) => {
            commands::cache(&command, &config)?;
        }
        Commands::Plot(command) => {
            commands::plot(&command, &config)?;
        }
        Commands::Version => {
            commands::version();
        }
    }

    Ok(())
}
