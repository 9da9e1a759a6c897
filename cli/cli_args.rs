use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        value_name = "PATH",
        help = "Directory to render (default: $TREETEXT_ROOT or current dir)."
    )]
    pub path: Option<PathBuf>,

    #[arg(
        long,
        help = "Path/filename of the TOML config file (default: .treetext/treetext.toml).",
        value_name = "CONFIG_FILE",
        conflicts_with = "no_config",
        help_heading = "Project Setup"
    )]
    pub config: Option<String>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "config",
        help_heading = "Project Setup"
    )]
    pub no_config: bool,

    #[arg(
        long,
        help = "JSON extension-to-language mapping (default: .treetext/languages.json).",
        value_name = "FILE",
        help_heading = "Project Setup"
    )]
    pub languages: Option<PathBuf>,
}

// Unset flags leave the config (or default) value alone.
#[derive(Args, Debug, Clone, Default)]
pub struct TraversalFlags {
    #[arg(short = 'a', long = "all", help = "Include hidden (dot) entries.", help_heading = "Traversal")]
    pub show_hidden: bool,

    #[arg(long, help = "List directories before files.", help_heading = "Traversal")]
    pub dirs_first: bool,

    #[arg(short = 'd', long, help = "Show directories only in the tree.", help_heading = "Traversal")]
    pub dirs_only: bool,

    #[arg(short = 's', long = "sizes", help = "Prefix files with a human-readable size.", help_heading = "Traversal")]
    pub show_sizes: bool,

    #[arg(short = 'e', long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append, help = "Exclude paths matching a regex or glob (repeatable).", help_heading = "Traversal")]
    pub exclude: Vec<String>,

    #[arg(short = 'L', long, value_name = "N", help = "Descend at most N levels below the root.", help_heading = "Traversal")]
    pub max_depth: Option<usize>,

    #[arg(short = 'r', long = "reverse", help = "Reverse the name order.", help_heading = "Traversal")]
    pub reverse_order: bool,

    #[arg(long, help = "Append '/' to directory names.", help_heading = "Traversal")]
    pub trailing_slash: bool,

    #[arg(long = "ascii", help = "Draw branches with ASCII characters.", help_heading = "Traversal")]
    pub use_ascii_glyphs: bool,

    #[arg(long, help = "Do not apply .gitignore rules.", conflicts_with = "scoped_gitignore", help_heading = "Ignore Rules")]
    pub no_gitignore: bool,

    #[arg(long, help = "Apply each .gitignore only below its own directory.", help_heading = "Ignore Rules")]
    pub scoped_gitignore: bool,

    #[arg(long = "filter", value_name = "REGEX", help = "Hide entries whose name matches REGEX.", help_heading = "Traversal")]
    pub regex_filter: Option<String>,
}

#[derive(Parser, Debug)]
#[command(
    name = "treetext",
    author,
    version,
    about = "Render a directory as a text tree, optionally followed by file contents.",
    long_about = "treetext walks a directory, applies exclude patterns, .gitignore rules, hidden-file \nand depth policies, and prints a tree diagram. With --content it appends every \nlisted file as a language-tagged fenced block.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  treetext generate -c -L 2 ./project\n  treetext generate --ascii -e '*.lock' -o tree.md\n  treetext files --json\n  treetext bundle src/main.rs Cargo.toml\n  treetext debug",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "g",
        visible_alias = "gen",
        about = "Render the tree (and optionally file contents)."
    )]
    Generate(GenerateArgs),

    #[command(
        visible_alias = "f",
        about = "List the files the content dump would include."
    )]
    Files(FilesArgs),

    #[command(
        visible_alias = "d",
        about = "Show effective options, language overrides and ignore rules."
    )]
    Debug(DebugArgs),

    #[command(
        visible_alias = "b",
        about = "Render the structure and contents of selected files only."
    )]
    Bundle(BundleArgs),

    #[command(about = "Generate or save shell completion scripts.")]
    Completion(CompletionArgs),

    #[command(about = "Show or save the default configuration file structure.")]
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub traversal: TraversalFlags,

    #[arg(
        short = 'c',
        long,
        help = "Append the contents of every listed file.",
        help_heading = "Output Control"
    )]
    pub content: bool,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write the result to FILE instead of stdout.",
        help_heading = "Output Control"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct FilesArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub traversal: TraversalFlags,

    #[arg(long, help = "Print a JSON array instead of one path per line.", help_heading = "Output Control")]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct BundleArgs {
    #[arg(
        value_name = "FILES",
        required = true,
        num_args = 1..,
        help = "Files to include, relative to the current directory."
    )]
    pub files: Vec<PathBuf>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Project root the selection is drawn from (default: $TREETEXT_ROOT or current dir).",
        help_heading = "Project Setup"
    )]
    pub root: Option<PathBuf>,

    #[arg(
        long,
        help = "Path/filename of the TOML config file (default: .treetext/treetext.toml).",
        value_name = "CONFIG_FILE",
        conflicts_with = "no_config",
        help_heading = "Project Setup"
    )]
    pub config: Option<String>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "config",
        help_heading = "Project Setup"
    )]
    pub no_config: bool,

    #[arg(
        long,
        help = "JSON extension-to-language mapping (default: .treetext/languages.json).",
        value_name = "FILE",
        help_heading = "Project Setup"
    )]
    pub languages: Option<PathBuf>,

    #[arg(long = "ascii", help = "Draw branches with ASCII characters.", help_heading = "Output Control")]
    pub use_ascii_glyphs: bool,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write the result to FILE instead of stdout.",
        help_heading = "Output Control"
    )]
    pub output: Option<PathBuf>,
}

impl BundleArgs {
    pub fn project_config(&self) -> ProjectConfigOpts {
        ProjectConfigOpts {
            path: self.root.clone(),
            config: self.config.clone(),
            no_config: self.no_config,
            languages: self.languages.clone(),
        }
    }

    pub fn traversal(&self) -> TraversalFlags {
        TraversalFlags {
            use_ascii_glyphs: self.use_ascii_glyphs,
            ..Default::default()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct DebugArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub traversal: TraversalFlags,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    #[arg(
        long,
        value_name = "SHELL",
        help = "Shell to generate completions for (fish, bash, zsh) [default: fish]"
    )]
    pub shell: Option<String>,
    #[arg(
        long,
        help = "Save completion script to default location (prompts overwrite)."
    )]
    pub save: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(value_name = "PATH", help = "Project directory (default: current dir).")]
    pub path: Option<PathBuf>,

    #[arg(
        long,
        help = "Save default config structure to default path (prompts overwrite)."
    )]
    pub save: bool,
}
