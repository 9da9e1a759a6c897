use crate::cli_args::ConfigArgs;
use crate::output::{confirm_overwrite, write_to_file, write_to_stdout};
use anyhow::{Context, Result};
use colored::*;
use std::path::Path;
use treetext_core::Config;

pub fn handle_config_command(args: &ConfigArgs, project_root: &Path, quiet: bool) -> Result<()> {
    let default_toml = Config::default()
        .to_toml_string()
        .context("Failed to serialize default configuration")?;

    if !args.save {
        return write_to_stdout(&default_toml);
    }

    let save_path = Config::default_config_path(project_root);
    if !confirm_overwrite(&save_path, "Config file", quiet)? {
        return Ok(());
    }
    write_to_file(&save_path, &default_toml)?;
    if !quiet {
        println!(
            "{} Default configuration saved to: {}",
            "✅".green(),
            save_path.display().to_string().blue()
        );
    }
    Ok(())
}
