//! Init and Config commands.

use anyhow::Context;

use crate::config::Settings;

/// Run init command - create configuration file.
pub fn run_init(force: bool) -> anyhow::Result<()> {
    let path = Settings::init_config_file(force)?;

    if force {
        println!("Wrote configuration to: {}", path.display());
    } else {
        println!("Created configuration file at: {}", path.display());
    }
    println!("Edit this file to declare watchers.");
    Ok(())
}

/// Run config command - display current configuration.
pub fn run_config(config: &Settings) -> anyhow::Result<()> {
    let toml_str = toml::to_string_pretty(config).context("Error displaying config")?;
    println!("{toml_str}");
    Ok(())
}
