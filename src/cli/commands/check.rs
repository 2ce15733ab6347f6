//! Check command - validate settings and preview watchers.

use std::path::PathBuf;

use console::style;
use serde::Serialize;

use crate::config::Settings;
use crate::variables::SystemEnvironment;
use crate::watcher::resolve_scope;

#[derive(Debug, Serialize)]
struct WatcherSummary {
    index: usize,
    roots: Vec<PathBuf>,
    glob: String,
    events: Vec<&'static str>,
    on_create: usize,
    on_change: usize,
    on_delete: usize,
    trigger_on_editor_save: bool,
    trigger_on_external_save: bool,
    diagnostics: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    workspace: Vec<PathBuf>,
    legacy: bool,
    watchers: Vec<WatcherSummary>,
}

fn summarize(config: &Settings) -> CheckReport {
    let env = SystemEnvironment::new(config.platform);
    let workspace = config.workspace();

    let watchers = config
        .declarations()
        .iter()
        .enumerate()
        .map(|(index, declaration)| {
            let (roots, diagnostics) = match resolve_scope(declaration, &workspace, &env) {
                Ok((scope, errors)) => (
                    scope.roots().to_vec(),
                    errors.iter().map(ToString::to_string).collect(),
                ),
                Err(e) => (Vec::new(), vec![e.to_string()]),
            };

            WatcherSummary {
                index,
                roots,
                glob: declaration.glob_pattern.clone(),
                events: declaration.event_kinds().names(),
                on_create: declaration.on_create.len(),
                on_change: declaration.on_change.len(),
                on_delete: declaration.on_delete.len(),
                trigger_on_editor_save: declaration.trigger_on_editor_save,
                trigger_on_external_save: declaration.trigger_on_external_save,
                diagnostics,
            }
        })
        .collect();

    CheckReport {
        workspace: workspace
            .folders()
            .iter()
            .map(|folder| folder.root.clone())
            .collect(),
        legacy: config.watchers.is_empty() && config.notify.is_some(),
        watchers,
    }
}

/// Run check command - list each declared watcher and what it observes.
pub fn run_check(config: &Settings, json: bool) -> anyhow::Result<()> {
    let report = summarize(config);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.watchers.is_empty() {
        println!("No watchers declared.");
        return Ok(());
    }

    if report.legacy {
        println!("Using legacy [notify] declaration.");
    }

    for watcher in &report.watchers {
        let roots: Vec<String> = watcher
            .roots
            .iter()
            .map(|root| root.display().to_string())
            .collect();
        println!(
            "{} {} in {}",
            style(format!("#{}", watcher.index)).cyan().bold(),
            style(&watcher.glob).green(),
            roots.join(", ")
        );

        if watcher.events.is_empty() {
            println!("  events:  none (no actions declared)");
        } else {
            println!("  events:  {}", watcher.events.join(", "));
        }
        println!(
            "  actions: {} create, {} change, {} delete",
            watcher.on_create, watcher.on_change, watcher.on_delete
        );
        println!(
            "  changes: editor saves {}, external saves {}",
            on_off(watcher.trigger_on_editor_save),
            on_off(watcher.trigger_on_external_save)
        );
        for diagnostic in &watcher.diagnostics {
            println!("  {} {diagnostic}", style("warning:").yellow().bold());
        }
    }
    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "run" } else { "ignored" }
}
