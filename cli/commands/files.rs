use crate::cli_args::FilesArgs;
use crate::output::write_to_stdout;
use crate::{load_config_for_command, relative_display};
use anyhow::{Context, Result};
use log;
use treetext_core::{AppError, TreeTextGenerator};

pub fn handle_files_command(args: FilesArgs) -> Result<()> {
    let project = load_config_for_command(&args.project_config, &args.traversal)
        .context("Failed to load configuration")?;

    let mut generator = TreeTextGenerator::new(project.config.traversal);
    let files: Vec<String> = generator
        .collect_files(&project.root)
        .with_context(|| format!("Failed to collect files under {}", project.root.display()))?
        .iter()
        .map(|path| relative_display(path, &project.root))
        .collect();
    log::debug!("Collected {} files", files.len());

    let rendered = if args.json {
        serde_json::to_string_pretty(&files).map_err(AppError::JsonSerialize)?
    } else {
        files.join("\n")
    };
    if rendered.is_empty() {
        return Ok(());
    }
    write_to_stdout(&rendered)
}
