use crate::cli_args::BundleArgs;
use crate::load_config_for_command;
use crate::output;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use treetext_core::TreeTextGenerator;

pub fn handle_bundle_command(args: BundleArgs, quiet: bool) -> Result<()> {
    let project = load_config_for_command(&args.project_config(), &args.traversal())
        .context("Failed to load configuration")?;

    let cwd = env::current_dir().context("Failed to read the current directory")?;
    let files: Vec<PathBuf> = args
        .files
        .iter()
        .map(|file| if file.is_absolute() { file.clone() } else { cwd.join(file) })
        .collect();

    let generator =
        TreeTextGenerator::new(project.config.traversal).with_languages(project.languages);
    let rendered = generator
        .bundle(&project.root, &files)
        .with_context(|| format!("Failed to bundle files under {}", project.root.display()))?;

    output::print_or_save(&rendered, args.output.as_deref(), quiet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn bundle_writes_structure_and_blocks() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("proj");
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/lib.rs"), "pub fn f() {}").unwrap();
        let out = dir.path().join("bundle.md");

        let args = BundleArgs {
            files: vec![root.join("src/lib.rs")],
            root: Some(root.clone()),
            config: None,
            no_config: true,
            languages: None,
            use_ascii_glyphs: true,
            output: Some(out.clone()),
        };
        handle_bundle_command(args, true).unwrap();

        let written = fs::read_to_string(&out).unwrap();
        assert!(written.starts_with("proj\n`-- src\n    `-- lib.rs\n\n---\n\n"));
        assert!(written.contains("**src/lib.rs**\n\n```rust\npub fn f() {}\n```"));
    }
}
