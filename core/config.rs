use crate::error::{AppError, Result};
use crate::languages::LanguageMap;
use crate::options::TraversalOptions;
use indexmap::IndexMap;
use log;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_DIR: &str = ".treetext";
pub const DEFAULT_CONFIG_FILENAME: &str = "treetext.toml";
pub const DEFAULT_LANGUAGES_FILENAME: &str = "languages.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub traversal: TraversalOptions,
    #[serde(default)]
    pub languages: LanguagesConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct LanguagesConfig {
    // JSON `{"extension_mapping": {...}}` file; relative paths resolve against the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_file: Option<PathBuf>,
    #[serde(default)]
    pub overrides: IndexMap<String, String>,
}

impl Config {
    // `cli_project_root`, then `$TREETEXT_ROOT`, then the working directory; `~` expanded.
    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var("TREETEXT_ROOT").ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        if !path_to_resolve.exists() {
            return Err(AppError::InvalidRoot {
                path: path_to_resolve,
                reason: "does not exist".to_string(),
            });
        }
        path_to_resolve
            .canonicalize()
            .map_err(|e| AppError::InvalidRoot {
                path: path_to_resolve.clone(),
                reason: format!("cannot be resolved: {}", e),
            })
    }

    pub fn default_config_path(project_root: &Path) -> PathBuf {
        project_root
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILENAME)
    }

    pub fn resolve_config_path(
        project_root: &Path,
        cli_config_file: Option<&String>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        match cli_config_file {
            Some(p_str) => {
                let mut path = PathBuf::from(shellexpand::tilde(p_str).as_ref());
                if path.is_relative() && !path.exists() {
                    path = project_root.join(&path);
                }
                if !path.exists() && path.extension().is_none() {
                    path.set_extension("toml");
                }
                if !path.is_file() {
                    return Err(AppError::InvalidArgument(format!(
                        "Specified config file not found: {}",
                        path.display()
                    )));
                }
                log::debug!("Using specified config file path: {}", path.display());
                Ok(Some(path))
            }
            None => {
                let default_path = Self::default_config_path(project_root);
                if default_path.is_file() {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Ok(Some(default_path))
                } else {
                    log::debug!(
                        "No config file specified and default not found at: {}",
                        default_path.display()
                    );
                    Ok(None)
                }
            }
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        toml::from_str::<Config>(&toml_content).map_err(|e| {
            AppError::TomlParse(format!(
                "Error parsing config file '{}': {}. Check TOML syntax and structure.",
                config_path.display(),
                e
            ))
        })
    }

    // Loads `config_path` when given. A file that cannot be read or parsed is
    // logged and replaced by the defaults.
    pub fn load_or_default(config_path: Option<&Path>) -> Self {
        let Some(path) = config_path else {
            log::debug!("Using default configuration.");
            return Self::default();
        };
        match Self::load_from_path(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{}", e);
                log::warn!("Falling back to default configuration.");
                Self::default()
            }
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(AppError::TomlSerialize)
    }

    fn languages_path(&self, project_root: &Path, cli_languages: Option<&Path>) -> PathBuf {
        let configured = cli_languages
            .map(Path::to_path_buf)
            .or_else(|| self.languages.mapping_file.clone());
        match configured {
            Some(path) => {
                let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());
                if expanded.is_relative() {
                    project_root.join(expanded)
                } else {
                    expanded
                }
            }
            None => project_root
                .join(DEFAULT_CONFIG_DIR)
                .join(DEFAULT_LANGUAGES_FILENAME),
        }
    }

    // Built-in table, overlaid by the JSON mapping file, then by inline overrides.
    pub fn resolve_languages(&self, project_root: &Path, cli_languages: Option<&Path>) -> LanguageMap {
        let mut languages = LanguageMap::builtin();
        let path = self.languages_path(project_root, cli_languages);
        languages.overlay(&LanguageMap::load_json_file(&path));
        languages.extend(
            self.languages
                .overrides
                .iter()
                .map(|(ext, lang)| (ext.clone(), lang.clone())),
        );
        log::debug!("Resolved {} language mappings", languages.len());
        languages
    }
}
