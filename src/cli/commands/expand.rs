//! Expand command.

use std::path::{Path, PathBuf};

use console::style;

use crate::config::Settings;
use crate::variables::{SystemEnvironment, VariableResolver};

/// Run expand command - print the expansion of `template`.
///
/// Diagnostics go to stderr; they never make the command fail.
pub fn run_expand(config: &Settings, template: &str, file: Option<&Path>) -> anyhow::Result<()> {
    let env = SystemEnvironment::new(config.platform);
    let workspace = config.workspace();

    let file = file.map(absolute).transpose()?;
    let resolver = VariableResolver::new(&env, &workspace);
    let resolver = match &file {
        Some(file) => resolver.with_file(file),
        None => resolver,
    };

    let expansion = resolver.expand(template);
    println!("{}", expansion.value);

    for diagnostic in &expansion.diagnostics {
        eprintln!("{} {diagnostic}", style("warning:").for_stderr().yellow().bold());
    }
    crate::debug_event!("expand", "passes", "{}", expansion.passes);
    Ok(())
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}
