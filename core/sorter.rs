use crate::options::TraversalOptions;
use std::cmp::Ordering;
use std::path::Path;

// Case-insensitive name order (raw name breaks ties), flipped by reverse_order,
// with dirs_only applied before the stable dirs_first partition.
pub fn sort_contents(names: Vec<String>, dir: &Path, options: &TraversalOptions) -> Vec<String> {
    let mut entries: Vec<(String, bool)> = names
        .into_iter()
        .map(|name| {
            let is_dir = dir.join(&name).is_dir();
            (name, is_dir)
        })
        .collect();
    sort_entries(&mut entries, options);
    entries.into_iter().map(|(name, _)| name).collect()
}

pub trait SortEntry {
    fn sort_name(&self) -> &str;
    fn is_dir(&self) -> bool;
}

impl SortEntry for (String, bool) {
    fn sort_name(&self) -> &str {
        &self.0
    }

    fn is_dir(&self) -> bool {
        self.1
    }
}

// Pairwise form of the display order, usable as a walkdir comparator.
pub fn compare_entries(
    a_name: &str,
    a_is_dir: bool,
    b_name: &str,
    b_is_dir: bool,
    options: &TraversalOptions,
) -> Ordering {
    let by_kind = if options.dirs_first {
        b_is_dir.cmp(&a_is_dir)
    } else {
        Ordering::Equal
    };
    by_kind.then_with(|| {
        let by_name = a_name
            .to_lowercase()
            .cmp(&b_name.to_lowercase())
            .then_with(|| a_name.cmp(b_name));
        if options.reverse_order {
            by_name.reverse()
        } else {
            by_name
        }
    })
}

pub fn sort_entries<T: SortEntry>(entries: &mut Vec<T>, options: &TraversalOptions) {
    if options.dirs_only {
        entries.retain(|entry| entry.is_dir());
    }
    entries.sort_by(|a, b| {
        compare_entries(a.sort_name(), a.is_dir(), b.sort_name(), b.is_dir(), options)
    });
}
