// UI layer: the interactive run. Prompts for configuration, shows the
// tree, provisions it behind a spinner and prints the summary report.

use crate::api::ApiClient;
use crate::config::RunConfig;
use crate::provision::Provisioner;
use crate::status::{StatusEntry, StatusLog};
use crate::structure::{render_preview, ProjectStructure};
use anyhow::Result;
use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use std::io::IsTerminal;
use std::time::Duration;

/// Run one provisioning session. Input and API errors are reported on the
/// console and still return `Ok`; only prompt or client setup failures are
/// returned as errors.
pub fn run() -> Result<()> {
    let config = RunConfig::prompt()?;

    let structure = match ProjectStructure::load(&config.structure_path) {
        Ok(s) => s,
        Err(e) => {
            println!("{}", e);
            return Ok(());
        }
    };

    println!("\nFolder Structure Preview:");
    print!("{}", render_preview(&structure.root));
    println!(
        "({} folders, {} recipes{})",
        structure.root.folder_count(),
        structure.root.recipe_count(),
        if structure.properties.is_some() { ", project properties" } else { "" }
    );

    let log = {
        // one client for the whole run, dropped once the tree is done
        let api = ApiClient::from_env(&config.api_token)?;
        if config.dry_run {
            println!("\nDry run: No folders will be created.");
            Provisioner::new(&api, true).run(&structure)
        } else {
            println!("\nCreating folders...");
            provision_with_spinner(&api, &structure)?
        }
    };

    print_summary(&log, std::io::stdout().is_terminal());
    Ok(())
}

fn provision_with_spinner(api: &ApiClient, structure: &ProjectStructure) -> Result<StatusLog> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(120));

    let log = Provisioner::new(api, false)
        .with_progress(spinner.clone())
        .run(structure);

    spinner.finish_and_clear();
    Ok(log)
}

/// Print one line per status entry, followed by a tally.
pub fn print_summary(log: &StatusLog, color: bool) {
    println!("\nSummary Report:");
    for entry in log {
        println!("{}", summary_line(entry, color));
    }
    let summary = log.summary();
    println!("\n{}", summary);
    if summary.failed > 0 {
        warn!("{} operation(s) failed", summary.failed);
        println!("Errors are shown above.");
    }
}

fn summary_line(entry: &StatusEntry, color: bool) -> String {
    let line = entry.to_string();
    if !color {
        return line;
    }
    if entry.is_created() {
        line.green().to_string()
    } else if entry.is_failed() {
        line.red().to_string()
    } else {
        line.yellow().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Outcome;

    #[test]
    fn plain_summary_line_has_no_escape_codes() {
        let entry = StatusEntry::Folder {
            name: "Root".into(),
            parent_id: None,
            outcome: Outcome::Created(1),
        };
        assert_eq!(summary_line(&entry, false), "Created folder: Root (ID: 1, Parent ID: None)");
        assert!(summary_line(&entry, true).contains("Created folder: Root"));
    }
}
