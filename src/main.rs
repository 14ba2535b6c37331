use clap::Parser;
use trendgate::cli::{describe_thresholds, Cli, Commands};
use trendgate::config::Config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration; only a missing file falls back to the example
    let config = match Config::load_if_present(&cli.config)? {
        Some(config) => config,
        None => {
            eprintln!("Warning: {} not found, using default configuration", cli.config);
            Config::from_toml(include_str!("../config.toml.example"))?
        }
    };

    // Initialize telemetry
    trendgate::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Replay(args) => {
            tracing::info!("Starting replay");
            args.execute(&config)?;
        }
        Commands::Classify(args) => {
            args.execute(&config)?;
        }
        Commands::Check => {
            config.validate()?;
            println!("Configuration OK ({})", cli.config);
            println!("{}", describe_thresholds(&config));
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
