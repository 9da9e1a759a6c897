use crate::cli_args::DebugArgs;
use crate::load_config_for_command;
use anyhow::{Context, Result};
use colored::*;
use log;
use treetext_core::{IgnoreScope, TreeTextGenerator};

pub fn handle_debug_command(args: DebugArgs) -> Result<()> {
    let project = load_config_for_command(&args.project_config, &args.traversal)
        .context("Failed to load configuration for debug command")?;

    println!("{}", "\n--- Project Root ---".green().bold().underline());
    println!("{}", project.root.display().to_string().cyan());

    println!(
        "{}",
        "\n--- Effective Configuration ---"
            .green()
            .bold()
            .underline()
    );
    let config_toml = project
        .config
        .to_toml_string()
        .context("Failed to serialize effective config to TOML")?;
    println!("{}", config_toml);

    println!("{}", "\n--- Language Overrides ---".green().bold().underline());
    if project.config.languages.overrides.is_empty() {
        println!("{}", "(None)".dimmed());
    } else {
        for (extension, language) in &project.config.languages.overrides {
            println!("- {} {} {}", extension.cyan(), "->".dimmed(), language);
        }
    }
    println!(
        "{} {}",
        "Total mappings:".green(),
        project.languages.len().to_string().cyan()
    );

    let traversal = project.config.traversal;
    let scope_note = match (traversal.use_gitignore, traversal.ignore_scope) {
        (false, _) => " (disabled)",
        (true, IgnoreScope::Scoped) => " (scoped mode applies these per directory)",
        (true, IgnoreScope::Flattened) => "",
    };
    println!(
        "{}",
        format!("\n--- Ignore Rules{} ---", scope_note)
            .green()
            .bold()
            .underline()
    );
    log::debug!("Debug: Loading ignore rules...");
    let patterns = TreeTextGenerator::new(traversal)
        .ignore_patterns(&project.root)
        .context("Failed to load ignore rules for debug")?;
    if patterns.is_empty() {
        println!("{}", "(None)".dimmed());
    } else {
        patterns.iter().for_each(|p| println!("- {}", p.cyan()));
    }

    println!("{}", "\n--- End Debug Info ---".green().bold());
    Ok(())
}
