use crate::error::{AppError, Result};
use log;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_LANGUAGE: &str = "text";

static BUILTIN_LANGUAGES: Lazy<HashMap<String, String>> = Lazy::new(|| {
    let yaml_content = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../data/languages.yaml"
    ));
    serde_yml::from_str(yaml_content).unwrap_or_else(|e| {
        log::error!("Embedded data/languages.yaml is invalid: {}", e);
        HashMap::new()
    })
});

#[derive(Debug, Deserialize)]
struct MappingFile {
    #[serde(default)]
    extension_mapping: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageMap {
    mapping: HashMap<String, String>,
}

fn normalize_extension(extension: &str) -> String {
    let lower = extension.trim().to_lowercase();
    if lower.is_empty() || lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}

impl LanguageMap {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self {
            mapping: BUILTIN_LANGUAGES.clone(),
        }
    }

    // Parses `{"extension_mapping": {".py": "python"}}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let parsed: MappingFile = serde_json::from_str(json).map_err(AppError::JsonSerialize)?;
        let mut map = Self::empty();
        map.extend(parsed.extension_mapping);
        Ok(map)
    }

    // Loads an external mapping file. A missing file is silent; an unreadable
    // or malformed one is logged. Both yield an empty map.
    pub fn load_json_file(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No language mapping file at {}", path.display());
            return Self::empty();
        }
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Failed to read language mapping {}: {}", path.display(), e);
                return Self::empty();
            }
        };
        match Self::from_json_str(&content) {
            Ok(map) => {
                log::debug!(
                    "Loaded {} language mappings from {}",
                    map.len(),
                    path.display()
                );
                map
            }
            Err(e) => {
                log::warn!(
                    "Ignoring malformed language mapping {}: {}",
                    path.display(),
                    e
                );
                Self::empty()
            }
        }
    }

    pub fn insert(&mut self, extension: &str, language: &str) {
        self.mapping
            .insert(normalize_extension(extension), language.to_string());
    }

    pub fn extend<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (extension, language) in entries {
            self.insert(&extension, &language);
        }
    }

    pub fn overlay(&mut self, other: &LanguageMap) {
        for (extension, language) in &other.mapping {
            self.mapping.insert(extension.clone(), language.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    pub fn language_for_extension(&self, extension: &str) -> String {
        let key = normalize_extension(extension);
        if key.is_empty() {
            return DEFAULT_LANGUAGE.to_string();
        }
        match self.mapping.get(&key) {
            Some(language) if !language.is_empty() => language.clone(),
            _ => key.trim_start_matches('.').to_string(),
        }
    }

    pub fn language_for_path(&self, path: &Path) -> String {
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        self.language_for_extension(&extension)
    }
}
