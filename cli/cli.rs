mod cli_args;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use log;
use std::path::{Path, PathBuf};
use std::process;

use cli_args::{Cli, Commands, ProjectConfigOpts, TraversalFlags};
use treetext_core::{AppError, Config, IgnoreScope, LanguageMap};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = exit_code_for(&e);
            if !quiet || exit_code == 1 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }
            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<AppError>() {
        Some(AppError::Config(_)) => 1,
        Some(AppError::TomlParse(_)) => 1,
        Some(AppError::InvalidArgument(_)) => 1,
        Some(AppError::InvalidRoot { .. }) => 2,
        Some(AppError::Io(_)) => 2,
        Some(AppError::FileRead { .. }) => 2,
        Some(AppError::FileWrite { .. }) => 2,
        Some(AppError::TomlSerialize(_)) => 6,
        Some(AppError::JsonSerialize(_)) => 6,
        Some(_) => 1,
        None => 1,
    }
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
        }
        Some(command) => match command {
            Commands::Generate(args) => {
                log::debug!("Executing 'generate' command...");
                commands::generate::handle_generate_command(args, quiet)?;
            }
            Commands::Files(args) => {
                log::debug!("Executing 'files' command...");
                commands::files::handle_files_command(args)?;
            }
            Commands::Bundle(args) => {
                log::debug!("Executing 'bundle' command...");
                commands::bundle::handle_bundle_command(args, quiet)?;
            }
            Commands::Debug(args) => {
                log::debug!("Executing 'debug' command...");
                commands::debug::handle_debug_command(args)?;
            }
            Commands::Completion(args) => {
                log::debug!("Executing 'completion' command...");
                commands::completion::handle_completion_command(&args, quiet)?;
            }
            Commands::Config(args) => {
                log::debug!("Executing 'config' command...");
                let project_root = Config::determine_project_root(args.path.as_ref())
                    .context("Failed to determine project root for config command")?;
                commands::config::handle_config_command(&args, &project_root, quiet)?;
            }
        },
    }
    Ok(())
}

pub struct LoadedProject {
    pub root: PathBuf,
    pub config: Config,
    pub languages: LanguageMap,
}

fn apply_traversal_overrides(mut config: Config, flags: &TraversalFlags) -> Config {
    log::trace!("Applying CLI traversal overrides to config...");
    let options = &mut config.traversal;

    if flags.show_hidden {
        options.show_hidden = true;
    }
    if flags.dirs_first {
        options.dirs_first = true;
    }
    if flags.dirs_only {
        options.dirs_only = true;
    }
    if flags.show_sizes {
        options.show_sizes = true;
    }
    if flags.reverse_order {
        options.reverse_order = true;
    }
    if flags.trailing_slash {
        options.trailing_slash = true;
    }
    if flags.use_ascii_glyphs {
        options.use_ascii_glyphs = true;
    }
    if !flags.exclude.is_empty() {
        options.exclude_patterns.extend(flags.exclude.iter().cloned());
    }
    if let Some(depth) = flags.max_depth {
        options.max_depth = Some(depth);
    }
    if let Some(filter) = &flags.regex_filter {
        options.regex_filter = Some(filter.clone());
    }

    if flags.no_gitignore {
        options.use_gitignore = false;
    }
    if flags.scoped_gitignore {
        options.use_gitignore = true;
        options.ignore_scope = IgnoreScope::Scoped;
    }

    log::trace!("Options after CLI overrides: {:?}", config.traversal);
    config
}

pub fn load_config_for_command(
    project_opts: &ProjectConfigOpts,
    flags: &TraversalFlags,
) -> Result<LoadedProject> {
    let root = Config::determine_project_root(project_opts.path.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", root.display());

    let config_path =
        Config::resolve_config_path(&root, project_opts.config.as_ref(), project_opts.no_config)
            .context("Failed to resolve configuration path")?;
    let config = Config::load_or_default(config_path.as_deref());
    let config = apply_traversal_overrides(config, flags);

    let languages = config.resolve_languages(&root, project_opts.languages.as_deref());

    Ok(LoadedProject {
        root,
        config,
        languages,
    })
}

pub fn relative_display(path: &Path, root: &Path) -> String {
    pathdiff::diff_paths(path, root)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
