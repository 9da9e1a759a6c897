use crate::languages::LanguageMap;
use crate::options::GlyphSet;
use indexmap::IndexMap;
use log;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

pub const BINARY_PLACEHOLDER: &str = "(cannot display content: likely a binary file)";
pub const BLOCK_SEPARATOR: &str = "---";
const BINARY_SNIFF_LEN: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
pub enum FileNode {
    File(PathBuf),
    Dir(FileStructure),
}

// insertion order is traversal order
pub type FileStructure = IndexMap<String, FileNode>;

fn relative_components(path: &Path, root: &Path) -> Vec<String> {
    let relative = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

pub fn build_file_structure(files: &[PathBuf], root: &Path) -> FileStructure {
    let mut structure = FileStructure::new();
    'files: for file in files {
        let parts = relative_components(file, root);
        let Some((leaf, dirs)) = parts.split_last() else {
            log::debug!("Skipping file outside root: {}", file.display());
            continue;
        };
        let mut level = &mut structure;
        for part in dirs {
            level = match level
                .entry(part.clone())
                .or_insert_with(|| FileNode::Dir(FileStructure::new()))
            {
                FileNode::Dir(children) => children,
                FileNode::File(existing) => {
                    log::warn!(
                        "Structure conflict: {} is a file, cannot hold {}",
                        existing.display(),
                        file.display()
                    );
                    continue 'files;
                }
            };
        }
        level.insert(leaf.clone(), FileNode::File(file.clone()));
    }
    structure
}

pub fn is_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(BINARY_SNIFF_LEN).any(|b| *b == 0)
}

enum FileText {
    Text(String),
    Binary,
}

// Sniffs the first kilobyte before reading the rest.
fn read_text(path: &Path) -> io::Result<FileText> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::with_capacity(BINARY_SNIFF_LEN);
    file.by_ref()
        .take(BINARY_SNIFF_LEN as u64)
        .read_to_end(&mut bytes)?;
    if is_binary(&bytes) {
        return Ok(FileText::Binary);
    }
    file.read_to_end(&mut bytes)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => FileText::Text(text),
        Err(_) => FileText::Binary,
    })
}

pub fn read_file_content(path: &Path) -> String {
    match read_text(path) {
        Ok(FileText::Text(text)) => text,
        Ok(FileText::Binary) => {
            log::debug!("Undecodable content: {}", path.display());
            BINARY_PLACEHOLDER.to_string()
        }
        Err(e) => {
            log::warn!("Failed to read {}: {}", path.display(), e);
            format!("(failed to read file content: {})", e)
        }
    }
}

fn structure_lines(level: &FileStructure, prefix: &str, glyphs: &GlyphSet, lines: &mut Vec<String>) {
    let count = level.len();
    for (i, (name, node)) in level.iter().enumerate() {
        let is_last = i + 1 == count;
        let branch = if is_last { glyphs.last_branch } else { glyphs.branch };
        lines.push(format!("{}{}{}", prefix, branch, name));
        if let FileNode::Dir(children) = node {
            let indent = if is_last { glyphs.indent } else { glyphs.vertical };
            structure_lines(children, &format!("{}{}", prefix, indent), glyphs, lines);
        }
    }
}

// Tree drawn from the nested mapping alone, for explicit selections.
pub fn render_structure(structure: &FileStructure, root_name: &str, glyphs: &GlyphSet) -> String {
    let mut lines = vec![root_name.to_string()];
    structure_lines(structure, "", glyphs, &mut lines);
    lines.join("\n")
}

fn render_level(
    level: &FileStructure,
    root: &Path,
    languages: &LanguageMap,
    out: &mut String,
    count: &mut usize,
) {
    for node in level.values() {
        match node {
            FileNode::Dir(children) => render_level(children, root, languages, out, count),
            FileNode::File(path) => {
                let relative = relative_components(path, root).join("/");
                let language = languages.language_for_path(path);
                let content = read_file_content(path);
                out.push_str(&format!(
                    "**{}**\n\n```{}\n{}\n```\n\n{}\n\n",
                    relative, language, content, BLOCK_SEPARATOR
                ));
                *count += 1;
            }
        }
    }
}

pub fn render_contents(structure: &FileStructure, root: &Path, languages: &LanguageMap) -> String {
    let mut out = String::new();
    let mut count = 0;
    render_level(structure, root, languages, &mut out, &mut count);
    log::debug!("Rendered content for {} files", count);
    out
}
