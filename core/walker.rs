use crate::ignore_rules::ScopedIgnoreRules;
use crate::options::TraversalOptions;
use crate::patterns::PatternMatcher;
use crate::sorter::{SortEntry, compare_entries, sort_entries};
use byte_unit::{Byte, UnitType};
use log;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Tree,
    // files survive dirs_only
    Content,
}

#[derive(Debug, Clone)]
pub struct Child {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

impl SortEntry for Child {
    fn sort_name(&self) -> &str {
        &self.name
    }

    fn is_dir(&self) -> bool {
        self.is_dir
    }
}

enum Frame {
    Visit {
        path: PathBuf,
        name: String,
        depth: usize,
        prefix: String,
        is_last: bool,
    },
    Leave(PathBuf),
}

// Decimal units, no inner space: `512B`, `1.5KB`.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1000 {
        return format!("{}B", bytes);
    }
    let adjusted = Byte::from_u64(bytes).get_appropriate_unit(UnitType::Decimal);
    format!("{:.1}", adjusted).replace(' ', "")
}

fn compile_name_filter(filter: Option<&str>) -> Option<Regex> {
    let filter = filter.map(str::trim).filter(|f| !f.is_empty())?;
    match Regex::new(filter) {
        Ok(regex) => Some(regex),
        Err(e) => {
            log::warn!("Ignoring invalid regex filter '{}': {}", filter, e);
            None
        }
    }
}

// Both passes filter through `keeps`, so the content pass sees exactly the tree's files.
pub struct TreeWalker<'a> {
    root: &'a Path,
    options: &'a TraversalOptions,
    matcher: &'a PatternMatcher,
    scoped: Option<&'a mut ScopedIgnoreRules>,
    name_filter: Option<Regex>,
}

impl<'a> TreeWalker<'a> {
    pub fn new(
        root: &'a Path,
        options: &'a TraversalOptions,
        matcher: &'a PatternMatcher,
        scoped: Option<&'a mut ScopedIgnoreRules>,
    ) -> Self {
        Self {
            root,
            options,
            matcher,
            scoped,
            name_filter: compile_name_filter(options.regex_filter.as_deref()),
        }
    }

    fn is_excluded(&mut self, path: &Path, is_dir: bool) -> bool {
        if self.matcher.is_excluded(path) {
            return true;
        }
        let root = self.root;
        match self.scoped.as_deref_mut() {
            Some(scoped) => scoped.is_ignored(path, is_dir, root),
            None => false,
        }
    }

    // The root (depth 0) is always admitted.
    pub fn admits(&mut self, path: &Path, is_dir: bool, depth: usize, pass: Pass) -> bool {
        if depth == 0 {
            return true;
        }
        if self.is_excluded(path, is_dir) {
            return false;
        }
        if pass == Pass::Tree && self.options.dirs_only && !is_dir {
            return false;
        }
        !self.options.exceeds_depth(depth)
    }

    // Hidden and name-filter policy on top of `admits`.
    fn keeps(&mut self, path: &Path, name: &str, is_dir: bool, depth: usize, pass: Pass) -> bool {
        if depth == 0 {
            return true;
        }
        if !self.options.show_hidden && name.starts_with('.') {
            log::trace!("Skipping hidden entry: {}", name);
            return false;
        }
        if self.name_filter.as_ref().is_some_and(|f| f.is_match(name)) {
            log::trace!("Skipping entry matched by regex filter: {}", name);
            return false;
        }
        self.admits(path, is_dir, depth, pass)
    }

    fn pass_options(&self, pass: Pass) -> Cow<'a, TraversalOptions> {
        if pass == Pass::Content && self.options.dirs_only {
            Cow::Owned(TraversalOptions {
                dirs_only: false,
                ..self.options.clone()
            })
        } else {
            Cow::Borrowed(self.options)
        }
    }

    // Kept, sorted children of `dir`, which sits at `depth - 1`. Dangling links are dropped.
    pub fn list_children(&mut self, dir: &Path, depth: usize, pass: Pass) -> Vec<Child> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Cannot list {}: {}", dir.display(), e);
                return Vec::new();
            }
        };

        let mut children = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::debug!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            let is_dir = match fs::metadata(&path) {
                Ok(meta) => meta.is_dir(),
                Err(e) => {
                    log::debug!("Skipping dangling entry {}: {}", path.display(), e);
                    continue;
                }
            };
            if self.keeps(&path, &name, is_dir, depth, pass) {
                children.push(Child { name, path, is_dir });
            }
        }

        let options = self.pass_options(pass);
        sort_entries(&mut children, &options);
        children
    }

    fn root_name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    fn build_line(
        &self,
        path: &Path,
        name: &str,
        is_dir: bool,
        depth: usize,
        prefix: &str,
        is_last: bool,
    ) -> String {
        let glyphs = self.options.glyphs();
        let mut line = String::from(prefix);
        if depth >= 1 {
            line.push_str(if is_last {
                glyphs.last_branch
            } else {
                glyphs.branch
            });
        }
        if !is_dir && self.options.show_sizes {
            match fs::metadata(path) {
                Ok(meta) => {
                    line.push_str(&format_size(meta.len()));
                    line.push(' ');
                }
                Err(e) => log::debug!("No size for {}: {}", path.display(), e),
            }
        }
        line.push_str(name);
        if is_dir && self.options.trailing_slash {
            line.push('/');
        }
        line
    }

    // `progress` gets (done, total) over the root's direct children.
    pub fn render(&mut self, progress: &mut dyn FnMut(usize, usize)) -> Vec<String> {
        let glyphs = self.options.glyphs();
        let mut lines = Vec::new();
        let mut on_stack: HashSet<PathBuf> = HashSet::new();
        let mut top_total = 0;
        let mut top_done = 0;
        let mut stack = vec![Frame::Visit {
            path: self.root.to_path_buf(),
            name: self.root_name(),
            depth: 0,
            prefix: String::new(),
            is_last: false,
        }];

        while let Some(frame) = stack.pop() {
            let (path, name, depth, prefix, is_last) = match frame {
                Frame::Leave(key) => {
                    on_stack.remove(&key);
                    continue;
                }
                Frame::Visit {
                    path,
                    name,
                    depth,
                    prefix,
                    is_last,
                } => (path, name, depth, prefix, is_last),
            };

            if depth == 1 {
                progress(top_done, top_total);
                top_done += 1;
            }

            let is_dir = path.is_dir();
            lines.push(self.build_line(&path, &name, is_dir, depth, &prefix, is_last));
            if !is_dir {
                continue;
            }

            let key = path.canonicalize().unwrap_or_else(|_| path.clone());
            if !on_stack.insert(key.clone()) {
                log::warn!("Symlink cycle at {}, not descending", path.display());
                continue;
            }
            stack.push(Frame::Leave(key));

            let children = self.list_children(&path, depth + 1, Pass::Tree);
            if depth == 0 {
                top_total = children.len();
            }
            let child_prefix = if depth == 0 {
                String::new()
            } else {
                format!(
                    "{}{}",
                    prefix,
                    if is_last { glyphs.indent } else { glyphs.vertical }
                )
            };
            let count = children.len();
            for (i, child) in children.into_iter().enumerate().rev() {
                stack.push(Frame::Visit {
                    path: child.path,
                    name: child.name,
                    depth: depth + 1,
                    prefix: child_prefix.clone(),
                    is_last: i + 1 == count,
                });
            }
        }
        progress(top_total, top_total);
        log::debug!("Rendered {} tree lines", lines.len());
        lines
    }

    // Files in tree order.
    pub fn collect_files(&mut self) -> Vec<PathBuf> {
        let order = self.pass_options(Pass::Content).into_owned();
        let walker = WalkDir::new(self.root)
            .follow_links(true)
            .sort_by(move |a, b| {
                compare_entries(
                    &a.file_name().to_string_lossy(),
                    a.file_type().is_dir(),
                    &b.file_name().to_string_lossy(),
                    b.file_type().is_dir(),
                    &order,
                )
            })
            .into_iter()
            .filter_entry(|entry| self.keeps_entry(entry));

        let mut files = Vec::new();
        for result in walker {
            match result {
                Ok(entry) if !entry.file_type().is_dir() => files.push(entry.into_path()),
                Ok(_) => {}
                Err(e) => match e.loop_ancestor() {
                    Some(ancestor) => log::warn!(
                        "Symlink cycle back to {}, not descending",
                        ancestor.display()
                    ),
                    None => log::debug!("Skipping during content walk: {}", e),
                },
            }
        }
        log::debug!("Collected {} files", files.len());
        files
    }

    fn keeps_entry(&mut self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.keeps(
            entry.path(),
            &name,
            entry.file_type().is_dir(),
            entry.depth(),
            Pass::Content,
        )
    }
}
