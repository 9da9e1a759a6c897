use crate::content::{BLOCK_SEPARATOR, build_file_structure, render_contents, render_structure};
use crate::error::{AppError, Result};
use crate::ignore_rules::{IgnoreRuleLoader, ScopedIgnoreRules};
use crate::languages::LanguageMap;
use crate::options::{IgnoreScope, TraversalOptions};
use crate::patterns::PatternMatcher;
use crate::walker::TreeWalker;
use indexmap::IndexSet;
use log;
use std::path::{Path, PathBuf};

const TREE_PASS_SHARE: usize = 90;
const CONTENT_PASS_DONE: u8 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Progress {
    pub percent: u8,
}

// The `.gitignore` cache lives as long as the generator; build a new one after the tree changes.
#[derive(Debug)]
pub struct TreeTextGenerator {
    options: TraversalOptions,
    matcher: PatternMatcher,
    loader: IgnoreRuleLoader,
    scoped: ScopedIgnoreRules,
    languages: LanguageMap,
}

pub fn validate_root(root: &Path) -> Result<PathBuf> {
    if !root.exists() {
        return Err(AppError::InvalidRoot {
            path: root.to_path_buf(),
            reason: "does not exist".to_string(),
        });
    }
    if !root.is_dir() {
        return Err(AppError::InvalidRoot {
            path: root.to_path_buf(),
            reason: "is not a directory".to_string(),
        });
    }
    root.canonicalize().map_err(|e| AppError::InvalidRoot {
        path: root.to_path_buf(),
        reason: format!("cannot be resolved: {}", e),
    })
}

impl TreeTextGenerator {
    pub fn new(options: TraversalOptions) -> Self {
        let matcher = PatternMatcher::new(&options.exclude_patterns);
        Self {
            options,
            matcher,
            loader: IgnoreRuleLoader::new(),
            scoped: ScopedIgnoreRules::new(),
            languages: LanguageMap::builtin(),
        }
    }

    pub fn with_languages(mut self, languages: LanguageMap) -> Self {
        self.languages = languages;
        self
    }

    pub fn options(&self) -> &TraversalOptions {
        &self.options
    }

    pub fn languages(&self) -> &LanguageMap {
        &self.languages
    }

    fn uses_flattened_rules(&self) -> bool {
        self.options.use_gitignore && self.options.ignore_scope == IgnoreScope::Flattened
    }

    fn uses_scoped_rules(&self) -> bool {
        self.options.use_gitignore && self.options.ignore_scope == IgnoreScope::Scoped
    }

    fn prepare_ignore_rules(&mut self, root: &Path) {
        if self.uses_flattened_rules() {
            self.loader
                .load_rules(root, &self.matcher, self.options.show_hidden);
            self.matcher
                .set_ignore_patterns(self.loader.patterns().to_vec());
        } else {
            self.matcher.set_ignore_patterns(Vec::new());
        }
    }

    pub fn ignore_patterns(&mut self, root: &Path) -> Result<Vec<String>> {
        let root = validate_root(root)?;
        self.loader
            .load_rules(&root, &self.matcher, self.options.show_hidden);
        Ok(self.loader.pattern_strings())
    }

    pub fn collect_files(&mut self, root: &Path) -> Result<Vec<PathBuf>> {
        let root = validate_root(root)?;
        self.prepare_ignore_rules(&root);
        let scoped = if self.uses_scoped_rules() {
            Some(&mut self.scoped)
        } else {
            None
        };
        let mut walker = TreeWalker::new(&root, &self.options, &self.matcher, scoped);
        Ok(walker.collect_files())
    }

    pub fn generate(&mut self, root: &Path) -> Result<String> {
        self.generate_with_progress(root, |_| {})
    }

    pub fn generate_with_progress<F>(&mut self, root: &Path, mut on_progress: F) -> Result<String>
    where
        F: FnMut(Progress),
    {
        let root = validate_root(root)?;
        log::info!("Generating tree for {}", root.display());
        self.prepare_ignore_rules(&root);

        let use_scoped = self.uses_scoped_rules();
        let scoped = if use_scoped {
            Some(&mut self.scoped)
        } else {
            None
        };
        let mut walker = TreeWalker::new(&root, &self.options, &self.matcher, scoped);

        let mut last = 0u8;
        let mut report = |percent: u8| {
            let percent = percent.max(last);
            last = percent;
            on_progress(Progress { percent });
        };

        let lines = walker.render(&mut |done, total| {
            let percent = if total == 0 {
                TREE_PASS_SHARE
            } else {
                done.min(total) * TREE_PASS_SHARE / total
            };
            report(percent as u8);
        });
        let mut output = lines.join("\n");

        if self.options.show_content {
            let files = walker.collect_files();
            if files.is_empty() {
                log::debug!("Content requested but no files were collected");
            } else {
                let structure = build_file_structure(&files, &root);
                output.push_str(&format!("\n\n{}\n\n", BLOCK_SEPARATOR));
                output.push_str(&render_contents(&structure, &root, &self.languages));
            }
            report(CONTENT_PASS_DONE);
        }

        report(100);
        Ok(output)
    }

    // Structure tree and content blocks for an explicit selection. No exclusion
    // or ignore rule applies; entries that are not files under `root` are skipped.
    pub fn bundle(&self, root: &Path, files: &[PathBuf]) -> Result<String> {
        let root = validate_root(root)?;
        let mut selected: IndexSet<PathBuf> = IndexSet::new();
        for file in files {
            let candidate = if file.is_absolute() {
                file.clone()
            } else {
                root.join(file)
            };
            let resolved = match candidate.canonicalize() {
                Ok(resolved) => resolved,
                Err(e) => {
                    log::warn!("Skipping {}: {}", file.display(), e);
                    continue;
                }
            };
            if !resolved.is_file() {
                log::warn!("Skipping {}: not a file", file.display());
                continue;
            }
            if !resolved.starts_with(&root) {
                log::warn!("Skipping {}: outside {}", file.display(), root.display());
                continue;
            }
            selected.insert(resolved);
        }
        if selected.is_empty() {
            return Err(AppError::InvalidArgument(
                "no files under the root were selected".to_string(),
            ));
        }
        log::info!("Bundling {} files from {}", selected.len(), root.display());

        let files: Vec<PathBuf> = selected.into_iter().collect();
        let structure = build_file_structure(&files, &root);
        let root_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());
        let mut output = render_structure(&structure, &root_name, self.options.glyphs());
        output.push_str(&format!("\n\n{}\n\n", BLOCK_SEPARATOR));
        output.push_str(&render_contents(&structure, &root, &self.languages));
        Ok(output)
    }
}

pub fn generate(root: &Path, options: &TraversalOptions) -> Result<String> {
    TreeTextGenerator::new(options.clone()).generate(root)
}
