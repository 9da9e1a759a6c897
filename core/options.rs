use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphSet {
    pub branch: &'static str,
    pub last_branch: &'static str,
    pub vertical: &'static str,
    pub indent: &'static str,
}

pub const ANSI_GLYPHS: GlyphSet = GlyphSet {
    branch: "├── ",
    last_branch: "└── ",
    vertical: "│   ",
    indent: "    ",
};

pub const ASCII_GLYPHS: GlyphSet = GlyphSet {
    branch: "|-- ",
    last_branch: "`-- ",
    vertical: "|   ",
    indent: "    ",
};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreScope {
    #[default]
    Flattened,
    // A rule only applies below the directory whose `.gitignore` declared it.
    Scoped,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TraversalOptions {
    pub show_hidden: bool,
    pub dirs_first: bool,
    pub dirs_only: bool,
    pub show_sizes: bool,
    pub exclude_patterns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    pub reverse_order: bool,
    pub trailing_slash: bool,
    pub use_ascii_glyphs: bool,
    pub use_gitignore: bool,
    pub ignore_scope: IgnoreScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex_filter: Option<String>,
    pub show_content: bool,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            show_hidden: false,
            dirs_first: false,
            dirs_only: false,
            show_sizes: false,
            exclude_patterns: Vec::new(),
            max_depth: None,
            reverse_order: false,
            trailing_slash: false,
            use_ascii_glyphs: false,
            use_gitignore: true,
            ignore_scope: IgnoreScope::default(),
            regex_filter: None,
            show_content: false,
        }
    }
}

impl TraversalOptions {
    pub fn glyphs(&self) -> &'static GlyphSet {
        if self.use_ascii_glyphs {
            &ASCII_GLYPHS
        } else {
            &ANSI_GLYPHS
        }
    }

    pub fn exceeds_depth(&self, depth: usize) -> bool {
        self.max_depth.is_some_and(|max| depth > max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_gitignore_only() {
        let opts = TraversalOptions::default();
        assert!(opts.use_gitignore);
        assert!(!opts.show_hidden && !opts.dirs_only && !opts.show_content);
        assert_eq!(opts.max_depth, None);
        assert_eq!(opts.ignore_scope, IgnoreScope::Flattened);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let opts: TraversalOptions =
            toml::from_str("dirs_first = true\nmax_depth = 2\nignore_scope = \"scoped\"").unwrap();
        assert!(opts.dirs_first);
        assert_eq!(opts.max_depth, Some(2));
        assert_eq!(opts.ignore_scope, IgnoreScope::Scoped);
        assert!(opts.use_gitignore);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<TraversalOptions>("colour = true").is_err());
    }

    #[test]
    fn depth_limit() {
        let mut opts = TraversalOptions::default();
        assert!(!opts.exceeds_depth(1_000));
        opts.max_depth = Some(1);
        assert!(!opts.exceeds_depth(1));
        assert!(opts.exceeds_depth(2));
    }

    #[test]
    fn glyph_selection() {
        let mut opts = TraversalOptions::default();
        assert_eq!(opts.glyphs().branch, "├── ");
        opts.use_ascii_glyphs = true;
        assert_eq!(opts.glyphs().last_branch, "`-- ");
    }
}
