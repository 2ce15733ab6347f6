//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// File watcher that runs declared actions on create, change and delete
#[derive(Parser)]
#[command(
    name = "fwatch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Run declared actions when watched files change",
    long_about = "Watch workspace files and run status, notification and save actions \
                  declared in .fwatch/settings.toml.",
    next_line_help = true,
    styles = clap_cargo_style(),
    after_help = "Quick Start:\n  $ fwatch init                        # Create .fwatch/settings.toml\n  $ fwatch check                       # Show what would be watched\n  $ fwatch expand '${relativeFile}' --file src/app.js\n  $ fwatch watch                       # Run until Ctrl-C"
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize project
    #[command(about = "Set up .fwatch directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings from .fwatch/settings.toml")]
    Config,

    /// Watch files and run actions until interrupted
    #[command(about = "Start watching and run declared actions")]
    Watch,

    /// Expand a template
    #[command(
        about = "Expand ${...} placeholders in a template",
        after_help = "Examples:\n  fwatch expand '${userHome}${pathSeparator}notes'\n  fwatch expand '${relativeFileDirname}/${fileBasenameNoExtension}.test${fileExtname}' --file src/app.js"
    )]
    Expand {
        /// Template text
        template: String,

        /// File to use as the triggering file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Validate configuration
    #[command(about = "Load settings and list what each watcher would observe")]
    Check {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}
