use crate::error::{AppError, Result};
use globset::{GlobBuilder, GlobMatcher};
use log;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static BUILTIN_EXCLUDES: Lazy<Vec<ExcludePattern>> = Lazy::new(|| {
    Regex::new(r"(^|/)\.DS_Store$")
        .into_iter()
        .map(ExcludePattern::Regex)
        .collect()
});

#[derive(Debug, Clone)]
pub enum ExcludePattern {
    Regex(Regex),
    Glob(GlobMatcher),
}

impl ExcludePattern {
    // Regex first; strings that are not valid regexes (`*.log`) are read as globs.
    pub fn compile(pattern: &str) -> Result<Self> {
        let regex_err = match Regex::new(pattern) {
            Ok(regex) => return Ok(ExcludePattern::Regex(regex)),
            Err(e) => e,
        };
        log::trace!(
            "Exclude pattern '{}' is not a regex ({}), trying glob",
            pattern,
            regex_err
        );
        let glob = build_path_glob(pattern).map_err(|e| {
            AppError::Glob(format!(
                "Exclude pattern \"{}\" is neither a regex ({}) nor a glob ({})",
                pattern, regex_err, e
            ))
        })?;
        Ok(ExcludePattern::Glob(glob))
    }

    pub fn is_match(&self, path_str: &str) -> bool {
        match self {
            ExcludePattern::Regex(regex) => regex.is_match(path_str),
            ExcludePattern::Glob(glob) => glob.is_match(path_str),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IgnorePattern {
    raw: String,
    suffix: String,
    glob: Option<GlobMatcher>,
}

impl IgnorePattern {
    pub fn new(pattern: &str) -> Self {
        let glob = match build_path_glob(pattern) {
            Ok(glob) => Some(glob),
            Err(e) => {
                log::debug!("Ignore pattern '{}' has no glob form: {}", pattern, e);
                None
            }
        };
        Self {
            raw: pattern.to_string(),
            suffix: pattern.strip_prefix("**/").unwrap_or(pattern).to_string(),
            glob,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    // Suffix match on a component boundary, or a shell-glob match on the full path.
    pub fn matches(&self, path_str: &str) -> bool {
        if !self.suffix.is_empty() {
            if let Some(head) = path_str.strip_suffix(self.suffix.as_str()) {
                if head.is_empty() || head.ends_with('/') {
                    return true;
                }
            }
        }
        self.glob.as_ref().is_some_and(|glob| glob.is_match(path_str))
    }
}

// `fnmatch`-style glob: `*` and `?` may cross `/`.
fn build_path_glob(pattern: &str) -> std::result::Result<GlobMatcher, globset::Error> {
    GlobBuilder::new(pattern)
        .literal_separator(false)
        .backslash_escape(true)
        .build()
        .map(|glob| glob.compile_matcher())
}

pub fn path_to_match_string(path: &Path) -> String {
    let lossy = path.to_string_lossy();
    if cfg!(windows) {
        lossy.replace('\\', "/")
    } else {
        lossy.into_owned()
    }
}

pub fn ignore_pattern_matches(path: &Path, patterns: &[IgnorePattern]) -> bool {
    let path_str = path_to_match_string(path);
    patterns.iter().any(|p| p.matches(&path_str))
}

pub fn is_path_excluded(
    path: &Path,
    static_patterns: &[ExcludePattern],
    ignore_patterns: &[IgnorePattern],
) -> bool {
    let path_str = path_to_match_string(path);
    if static_patterns.iter().any(|p| p.is_match(&path_str)) {
        log::trace!("Excluded by pattern: {}", path_str);
        return true;
    }
    if ignore_patterns.iter().any(|p| p.matches(&path_str)) {
        log::trace!("Excluded by ignore rule: {}", path_str);
        return true;
    }
    false
}

#[derive(Debug, Clone)]
pub struct PatternMatcher {
    static_patterns: Vec<ExcludePattern>,
    ignore_patterns: Vec<IgnorePattern>,
}

impl PatternMatcher {
    // Built-in excludes plus `exclude_patterns`; patterns that fail to compile are dropped.
    pub fn new(exclude_patterns: &[String]) -> Self {
        let mut static_patterns = BUILTIN_EXCLUDES.clone();
        for pattern in exclude_patterns {
            match ExcludePattern::compile(pattern.trim()) {
                Ok(compiled) => static_patterns.push(compiled),
                Err(e) => log::warn!("Skipping exclude pattern: {}", e),
            }
        }
        log::debug!(
            "Pattern matcher built with {} static patterns",
            static_patterns.len()
        );
        Self {
            static_patterns,
            ignore_patterns: Vec::new(),
        }
    }

    pub fn set_ignore_patterns(&mut self, patterns: Vec<IgnorePattern>) {
        self.ignore_patterns = patterns;
    }

    pub fn ignore_patterns(&self) -> &[IgnorePattern] {
        &self.ignore_patterns
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        is_path_excluded(path, &self.static_patterns, &self.ignore_patterns)
    }

    // Built-in and caller excludes only; loaded ignore rules are not consulted.
    pub fn is_statically_excluded(&self, path: &Path) -> bool {
        is_path_excluded(path, &self.static_patterns, &[])
    }
}
