use clap::Parser;
use locator_cache::cli::commands::{cmd_run, cmd_search, cmd_show};
use locator_cache::cli::config::{Cli, Commands, apply_cli_overrides, load_config};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // CLI > config file > defaults
    let config = apply_cli_overrides(load_config(cli.config.as_deref()), &cli);

    match &cli.command {
        Commands::Run { scenario, headless } => {
            let passed = cmd_run(&config, scenario.as_deref(), *headless)?;
            if !passed {
                std::process::exit(1);
            }
        }
        Commands::Show { page } => cmd_show(&config, page.as_deref()),
        Commands::Search { page, term } => {
            if !cmd_search(&config, page, term) {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
