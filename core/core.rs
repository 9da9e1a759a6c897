pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod ignore_rules;
pub mod languages;
pub mod options;
pub mod patterns;
pub mod sorter;
pub mod walker;

pub use config::{Config, LanguagesConfig};
pub use content::{FileNode, FileStructure, build_file_structure, render_contents, render_structure};
pub use error::{AppError, Result};
pub use generator::{Progress, TreeTextGenerator, generate, validate_root};
pub use ignore_rules::{IgnoreRuleLoader, ScopedIgnoreRules};
pub use languages::LanguageMap;
pub use options::{IgnoreScope, TraversalOptions};
pub use patterns::PatternMatcher;
pub use sorter::sort_contents;
pub use walker::{Pass, TreeWalker};
