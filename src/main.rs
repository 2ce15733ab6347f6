use clap::Parser;
use fwatch::Settings;
use fwatch::cli::commands::{check, expand, init, watch};
use fwatch::cli::{Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let settings_path = cli.config.clone().unwrap_or_else(Settings::config_path);

    // Load configuration
    let config = if matches!(cli.command, Commands::Init { .. }) {
        Settings::default()
    } else {
        Settings::load_from(&settings_path).unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            eprintln!("Using default configuration for now.");
            Settings::default()
        })
    };

    fwatch::logging::init_with_config(&config.logging);

    let result = match cli.command {
        Commands::Init { force } => init::run_init(force),
        Commands::Config => init::run_config(&config),
        Commands::Watch => watch::run_watch(config, settings_path).await,
        Commands::Expand { template, file } => {
            expand::run_expand(&config, &template, file.as_deref())
        }
        Commands::Check { json } => check::run_check(&config, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
