use crate::cli_args::GenerateArgs;
use crate::load_config_for_command;
use crate::output;
use anyhow::{Context, Result};
use log;
use treetext_core::TreeTextGenerator;

pub fn handle_generate_command(args: GenerateArgs, quiet: bool) -> Result<()> {
    let project = load_config_for_command(&args.project_config, &args.traversal)
        .context("Failed to load configuration")?;

    let mut options = project.config.traversal;
    if args.content {
        options.show_content = true;
    }

    let mut generator = TreeTextGenerator::new(options).with_languages(project.languages);
    let rendered = generator
        .generate_with_progress(&project.root, |progress| {
            log::info!("Progress: {}%", progress.percent);
        })
        .with_context(|| format!("Failed to render {}", project.root.display()))?;

    output::print_or_save(&rendered, args.output.as_deref(), quiet)
}
