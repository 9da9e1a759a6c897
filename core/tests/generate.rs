use std::fs;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};
use treetext_core::content::BINARY_PLACEHOLDER;
use treetext_core::{
    AppError, IgnoreScope, LanguageMap, Progress, TraversalOptions, TreeTextGenerator, generate,
};

fn proj() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let root = dir.path().join("proj");
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::write(root.join("a.py"), "x=1").unwrap();
    fs::write(root.join("sub/b.md"), "# hi").unwrap();
    fs::write(root.join(".git/config"), "[core]").unwrap();
    fs::write(root.join(".gitignore"), ".git/\n").unwrap();
    (dir, root)
}

fn with(f: impl FnOnce(&mut TraversalOptions)) -> TraversalOptions {
    let mut opts = TraversalOptions::default();
    f(&mut opts);
    opts
}

fn tree_part(output: &str) -> &str {
    output.split("\n\n---\n\n").next().unwrap()
}

#[test]
fn renders_tree_and_content_dump() {
    let (_dir, root) = proj();
    let output = generate(&root, &with(|o| o.show_content = true)).unwrap();

    assert_eq!(tree_part(&output), "proj\n├── a.py\n└── sub\n    └── b.md");
    let expected_dump = "\n\n---\n\n\
        **a.py**\n\n```python\nx=1\n```\n\n---\n\n\
        **sub/b.md**\n\n```markdown\n# hi\n```\n\n---\n\n";
    assert!(output.ends_with(expected_dump), "unexpected output:\n{}", output);
    assert!(!output.contains("[core]"));
}

#[test]
fn hidden_git_stays_out_even_with_show_hidden() {
    let (_dir, root) = proj();
    let output = generate(
        &root,
        &with(|o| {
            o.show_hidden = true;
            o.show_content = true;
        }),
    )
    .unwrap();
    assert!(output.contains(".gitignore"));
    assert!(!output.contains("config"));
}

#[test]
fn tree_without_content_has_no_separator() {
    let (_dir, root) = proj();
    let output = generate(&root, &TraversalOptions::default()).unwrap();
    assert!(!output.contains("---"));
    assert!(!output.ends_with('\n'));
}

fn flat_fixture(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let root = dir.path().join("proj");
    for (rel, content) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    (dir, root)
}

#[test]
fn rules_inside_excluded_directory_are_not_applied() {
    let (_dir, root) = flat_fixture(&[
        ("a.py", "a"),
        ("b.py", "b"),
        ("vendor/.gitignore", "a.py\n"),
    ]);
    let output = generate(
        &root,
        &with(|o| {
            o.exclude_patterns = vec!["/vendor$".into()];
            o.show_content = true;
        }),
    )
    .unwrap();
    assert_eq!(tree_part(&output), "proj\n├── a.py\n└── b.py");
    assert!(output.contains("**a.py**"));
}

#[test]
fn rules_inside_hidden_directory_wait_for_show_hidden() {
    let (_dir, root) = flat_fixture(&[("a.py", "a"), (".pytest_cache/.gitignore", "*\n")]);
    let output = generate(&root, &TraversalOptions::default()).unwrap();
    assert_eq!(output, "proj\n└── a.py");

    // the catch-all rule now loads, but the root line stays
    let shown = generate(&root, &with(|o| o.show_hidden = true)).unwrap();
    assert_eq!(shown, "proj");
}

#[test]
fn malformed_exclude_pattern_fails_open() {
    let (_dir, root) = proj();
    let output = generate(&root, &with(|o| o.exclude_patterns = vec!["[".into()])).unwrap();
    assert!(output.contains("a.py"));
}

#[test]
fn max_depth_limits_tree_and_content() {
    let (_dir, root) = proj();
    fs::create_dir_all(root.join("sub/deeper")).unwrap();
    fs::write(root.join("sub/deeper/c.txt"), "c").unwrap();
    let output = generate(
        &root,
        &with(|o| {
            o.max_depth = Some(1);
            o.show_content = true;
        }),
    )
    .unwrap();
    assert_eq!(tree_part(&output), "proj\n├── a.py\n└── sub");
    assert!(output.contains("**a.py**"));
    assert!(!output.contains("b.md"));
}

#[test]
fn binary_files_get_placeholder() {
    let (_dir, root) = proj();
    let mut bytes = b"PNG".to_vec();
    bytes.push(0);
    bytes.extend_from_slice(&[0xff; 64]);
    fs::write(root.join("img.png"), &bytes).unwrap();

    let output = generate(&root, &with(|o| o.show_content = true)).unwrap();
    assert!(output.contains(&format!("**img.png**\n\n```png\n{}\n```", BINARY_PLACEHOLDER)));
    assert!(!output.contains('\u{fffd}'));
}

#[test]
fn ascii_toggle_only_changes_connectors() {
    let (_dir, root) = proj();
    let ansi = generate(&root, &TraversalOptions::default()).unwrap();
    let ascii = generate(&root, &with(|o| o.use_ascii_glyphs = true)).unwrap();
    assert_eq!(ascii, "proj\n|-- a.py\n`-- sub\n    `-- b.md");
    let names = |s: &str| -> Vec<String> {
        s.lines()
            .map(|l| l.rsplit(' ').next().unwrap_or(l).to_string())
            .collect()
    };
    assert_eq!(names(&ansi), names(&ascii));
}

#[test]
fn content_files_match_tree_lines() {
    let (_dir, root) = proj();
    fs::write(root.join("sub/A.rs"), "fn a() {}").unwrap();
    fs::write(root.join("Z.toml"), "z = 1").unwrap();
    let opts = with(|o| {
        o.dirs_first = true;
        o.reverse_order = true;
    });

    let mut generator = TreeTextGenerator::new(opts);
    let tree = generator.generate(&root).unwrap();
    let files: Vec<String> = generator
        .collect_files(&root)
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    let tree_files: Vec<String> = tree
        .lines()
        .skip(1)
        .map(|l| l.rsplit(' ').next().unwrap().to_string())
        .filter(|name| name.contains('.'))
        .collect();
    assert_eq!(files, tree_files);
    assert_eq!(files, vec!["b.md", "A.rs", "Z.toml", "a.py"]);
}

#[test]
fn dirs_only_tree_still_dumps_files() {
    let (_dir, root) = proj();
    let output = generate(
        &root,
        &with(|o| {
            o.dirs_only = true;
            o.show_content = true;
        }),
    )
    .unwrap();
    assert_eq!(tree_part(&output), "proj\n└── sub");
    assert!(output.contains("**a.py**"));
    assert!(output.contains("**sub/b.md**"));
}

#[test]
fn invalid_root_is_an_error() {
    let dir = tempdir().unwrap();
    let result = generate(&dir.path().join("missing"), &TraversalOptions::default());
    assert!(matches!(result, Err(AppError::InvalidRoot { .. })));
}

fn nested_ignore_fixture() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let root = dir.path().join("repo");
    fs::create_dir_all(root.join("app/build")).unwrap();
    fs::create_dir_all(root.join("lib/build")).unwrap();
    fs::write(root.join("app/.gitignore"), "build\n").unwrap();
    fs::write(root.join("app/build/out.o"), "o").unwrap();
    fs::write(root.join("lib/build/gen.rs"), "g").unwrap();
    (dir, root)
}

#[test]
fn flattened_rules_apply_everywhere() {
    let (_dir, root) = nested_ignore_fixture();
    let output = generate(&root, &TraversalOptions::default()).unwrap();
    assert_eq!(output, "repo\n├── app\n└── lib");
}

#[test]
fn scoped_rules_apply_to_their_subtree() {
    let (_dir, root) = nested_ignore_fixture();
    let output = generate(&root, &with(|o| o.ignore_scope = IgnoreScope::Scoped)).unwrap();
    assert_eq!(
        output,
        "repo\n├── app\n└── lib\n    └── build\n        └── gen.rs"
    );
}

#[test]
fn progress_ends_at_completion() {
    let (_dir, root) = proj();
    let mut seen: Vec<Progress> = Vec::new();
    TreeTextGenerator::new(with(|o| o.show_content = true))
        .generate_with_progress(&root, |p| seen.push(p))
        .unwrap();
    assert_eq!(seen.last(), Some(&Progress { percent: 100 }));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert!(seen.iter().any(|p| p.percent == 90));
}

#[test]
fn custom_language_table_is_used() {
    let (_dir, root) = proj();
    let mut languages = LanguageMap::builtin();
    languages.insert(".py", "py3");
    let output = TreeTextGenerator::new(with(|o| o.show_content = true))
        .with_languages(languages)
        .generate(&root)
        .unwrap();
    assert!(output.contains("```py3\nx=1\n```"));
}

#[cfg(unix)]
#[test]
fn symlink_cycle_terminates() {
    let (_dir, root) = proj();
    std::os::unix::fs::symlink(&root, root.join("sub/back")).unwrap();
    let output = generate(&root, &with(|o| o.show_content = true)).unwrap();
    assert_eq!(output.matches("**a.py**").count(), 1);
    assert!(tree_part(&output).contains("└── back"));
}
