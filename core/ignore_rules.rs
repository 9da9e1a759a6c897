use crate::patterns::{IgnorePattern, PatternMatcher, ignore_pattern_matches};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

pub const GITIGNORE_FILENAME: &str = ".gitignore";

// Trailing `/` dropped. A leading `/` anchors the rule; anything else matches at any depth.
pub fn parse_gitignore_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let pattern = line.trim_end_matches('/');
    if pattern.is_empty() {
        return None;
    }
    Some(match pattern.strip_prefix('/') {
        Some(anchored) => anchored.to_string(),
        None => format!("**/{}", pattern),
    })
}

pub fn parse_gitignore(content: &str) -> Vec<String> {
    content.lines().filter_map(parse_gitignore_line).collect()
}

fn read_gitignore(dir: &Path) -> Vec<String> {
    let gitignore_path = dir.join(GITIGNORE_FILENAME);
    if !gitignore_path.is_file() {
        return Vec::new();
    }
    match fs::read_to_string(&gitignore_path) {
        Ok(content) => {
            let patterns = parse_gitignore(&content);
            log::debug!(
                "Loaded {} rules from {}",
                patterns.len(),
                gitignore_path.display()
            );
            patterns
        }
        Err(e) => {
            log::warn!("Failed to read {}: {}", gitignore_path.display(), e);
            Vec::new()
        }
    }
}

// `.git` is never searched; hidden dirs only when they would be shown.
fn is_rule_source(entry: &DirEntry, matcher: &PatternMatcher, show_hidden: bool) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    if name == ".git" || (!show_hidden && name.starts_with('.')) {
        return false;
    }
    !matcher.is_statically_excluded(entry.path())
}

// Memoized by canonical directory path for the loader's lifetime.
#[derive(Debug, Default)]
pub struct IgnoreRuleLoader {
    cache: HashMap<PathBuf, Vec<String>>,
    accumulated: Vec<IgnorePattern>,
    computed: usize,
}

impl IgnoreRuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_rules(&mut self, root_dir: &Path, matcher: &PatternMatcher, show_hidden: bool) {
        self.accumulated.clear();
        let mut walker = WalkDir::new(root_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| is_rule_source(entry, matcher, show_hidden));

        while let Some(result) = walker.next() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    log::debug!("Skipping during rule discovery: {}", e);
                    continue;
                }
            };
            let dir = entry.path();
            let key = match dir.canonicalize() {
                Ok(key) => key,
                Err(e) => {
                    log::debug!("Cannot resolve {}: {}", dir.display(), e);
                    walker.skip_current_dir();
                    continue;
                }
            };

            if let Some(cached) = self.cache.get(&key) {
                log::trace!("Rule cache hit for {}", dir.display());
                self.accumulated
                    .extend(cached.iter().map(|p| IgnorePattern::new(p)));
                continue;
            }
            // the root itself is never tested against rules
            if entry.depth() > 0 && ignore_pattern_matches(dir, &self.accumulated) {
                log::trace!("Directory {} is ignored, not descending", dir.display());
                walker.skip_current_dir();
                continue;
            }
            let patterns = read_gitignore(dir);
            self.computed += 1;
            self.accumulated
                .extend(patterns.iter().map(|p| IgnorePattern::new(p)));
            self.cache.insert(key, patterns);
        }
        log::debug!(
            "Ignore rules loaded: {} patterns from {} cached directories",
            self.accumulated.len(),
            self.cache.len()
        );
    }

    pub fn patterns(&self) -> &[IgnorePattern] {
        &self.accumulated
    }

    pub fn pattern_strings(&self) -> Vec<String> {
        self.accumulated
            .iter()
            .map(|p| p.as_str().to_string())
            .collect()
    }

    // cache misses
    pub fn computed_dirs(&self) -> usize {
        self.computed
    }
}

#[derive(Debug, Default)]
pub struct ScopedIgnoreRules {
    matchers: HashMap<PathBuf, Option<Gitignore>>,
}

impl ScopedIgnoreRules {
    pub fn new() -> Self {
        Self::default()
    }

    fn matcher_for(&mut self, dir: &Path) -> Option<&Gitignore> {
        let key = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        self.matchers
            .entry(key)
            .or_insert_with(|| build_scoped_matcher(dir))
            .as_ref()
    }

    // nearest ancestor with a verdict wins
    pub fn is_ignored(&mut self, path: &Path, is_dir: bool, root: &Path) -> bool {
        let mut current = path.parent();
        while let Some(dir) = current {
            if !dir.starts_with(root) {
                break;
            }
            if let Some(gitignore) = self.matcher_for(dir) {
                let verdict = gitignore.matched(path, is_dir);
                if verdict.is_ignore() {
                    log::trace!("Ignored by {}/.gitignore: {}", dir.display(), path.display());
                    return true;
                }
                if verdict.is_whitelist() {
                    return false;
                }
            }
            if dir == root {
                break;
            }
            current = dir.parent();
        }
        false
    }
}

fn build_scoped_matcher(dir: &Path) -> Option<Gitignore> {
    let gitignore_path = dir.join(GITIGNORE_FILENAME);
    if !gitignore_path.is_file() {
        return None;
    }
    let mut builder = GitignoreBuilder::new(dir);
    if let Some(e) = builder.add(&gitignore_path) {
        log::warn!("Problem reading {}: {}", gitignore_path.display(), e);
    }
    match builder.build() {
        Ok(gitignore) if !gitignore.is_empty() => Some(gitignore),
        Ok(_) => None,
        Err(e) => {
            log::warn!("Failed to compile {}: {}", gitignore_path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn line_transformation() {
        assert_eq!(parse_gitignore_line("# comment"), None);
        assert_eq!(parse_gitignore_line("   "), None);
        assert_eq!(parse_gitignore_line("/"), None);
        assert_eq!(parse_gitignore_line("target/"), Some("**/target".into()));
        assert_eq!(parse_gitignore_line("/dist/"), Some("dist".into()));
        assert_eq!(parse_gitignore_line("  *.log  "), Some("**/*.log".into()));
    }

    #[test]
    fn nested_rules_are_flattened() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join(".gitignore"), "target/\n").unwrap();
        fs::create_dir_all(root.join("web")).unwrap();
        fs::write(root.join("web/.gitignore"), "# deps\nnode_modules\n").unwrap();

        let mut loader = IgnoreRuleLoader::new();
        loader.load_rules(root, &PatternMatcher::new(&[]), false);
        assert_eq!(
            loader.pattern_strings(),
            vec!["**/target".to_string(), "**/node_modules".to_string()]
        );
    }

    #[test]
    fn ignored_directory_rules_are_never_read() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join(".gitignore"), "vendor\n").unwrap();
        fs::create_dir_all(root.join("vendor/lib")).unwrap();
        fs::write(root.join("vendor/.gitignore"), "*.rs\n").unwrap();

        let mut loader = IgnoreRuleLoader::new();
        loader.load_rules(root, &PatternMatcher::new(&[]), false);
        assert_eq!(loader.pattern_strings(), vec!["**/vendor".to_string()]);
    }

    #[test]
    fn directories_are_computed_once() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::write(root.join("a/.gitignore"), "*.tmp\n").unwrap();

        let mut loader = IgnoreRuleLoader::new();
        loader.load_rules(root, &PatternMatcher::new(&[]), false);
        let first = loader.computed_dirs();
        assert_eq!(first, 3);

        loader.load_rules(root, &PatternMatcher::new(&[]), false);
        assert_eq!(loader.computed_dirs(), first);
        assert_eq!(loader.pattern_strings(), vec!["**/*.tmp".to_string()]);
    }

    #[test]
    fn git_directory_is_skipped() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git/info")).unwrap();
        fs::write(root.join(".git/.gitignore"), "*\n").unwrap();

        let mut loader = IgnoreRuleLoader::new();
        loader.load_rules(root, &PatternMatcher::new(&[]), true);
        assert!(loader.patterns().is_empty());
    }

    #[test]
    fn hidden_directories_follow_show_hidden() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".pytest_cache")).unwrap();
        fs::write(root.join(".pytest_cache/.gitignore"), "*\n").unwrap();

        let mut loader = IgnoreRuleLoader::new();
        loader.load_rules(root, &PatternMatcher::new(&[]), false);
        assert!(loader.patterns().is_empty());

        loader.load_rules(root, &PatternMatcher::new(&[]), true);
        assert_eq!(loader.pattern_strings(), vec!["**/*".to_string()]);
    }

    #[test]
    fn excluded_directories_are_not_searched() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("vendor")).unwrap();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("vendor/.gitignore"), "a.py\n").unwrap();
        fs::write(root.join("src/.gitignore"), "*.pyc\n").unwrap();

        let mut loader = IgnoreRuleLoader::new();
        loader.load_rules(root, &PatternMatcher::new(&["/vendor$".into()]), false);
        assert_eq!(loader.pattern_strings(), vec!["**/*.pyc".to_string()]);
    }

    #[test]
    fn root_is_never_matched_by_its_own_rules() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("build");
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join(".gitignore"), "build\n").unwrap();
        fs::write(root.join("src/.gitignore"), "*.o\n").unwrap();

        let mut loader = IgnoreRuleLoader::new();
        loader.load_rules(&root, &PatternMatcher::new(&[]), false);
        assert_eq!(
            loader.pattern_strings(),
            vec!["**/build".to_string(), "**/*.o".to_string()]
        );
    }

    #[test]
    fn scoped_rules_stay_in_their_subtree() {
        let dir = tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("a/.gitignore"), "out\n").unwrap();

        let mut scoped = ScopedIgnoreRules::new();
        assert!(scoped.is_ignored(&root.join("a/out"), true, &root));
        assert!(!scoped.is_ignored(&root.join("b/out"), true, &root));
    }

    #[test]
    fn scoped_negation_whitelists() {
        let dir = tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join(".gitignore"), "*.log\n!keep.log\n").unwrap();

        let mut scoped = ScopedIgnoreRules::new();
        assert!(scoped.is_ignored(&root.join("debug.log"), false, &root));
        assert!(!scoped.is_ignored(&root.join("keep.log"), false, &root));
    }
}
