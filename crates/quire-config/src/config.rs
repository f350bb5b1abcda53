use std::{
  fs,
  path::{Path, PathBuf},
  sync::OnceLock,
};

use indexmap::IndexMap;
use quire_hooks::{MarkupSubstitutions, ReplacementTable};
use quire_macros::Configurable;
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, html, search};

/// Placeholder that always resolves to [`Config::release`] unless the
/// replacement table maps it explicitly.
pub const VERSION_PLACEHOLDER: &str = "{version_num}";

/// Configuration for a Quire documentation project.
///
/// [`Config`] carries project metadata, the options handed to the HTML theme,
/// and the settings for the two build hooks: the literal replacement table
/// applied to raw sources, and the search index feeder. Fields are loaded
/// from a TOML or JSON file and can be overridden with `--config KEY=VALUE`.
#[derive(Debug, Clone, Serialize, Deserialize, Configurable)]
#[serde(default)]
pub struct Config {
  /// Project name.
  #[config(key = "project")]
  pub project: String,

  /// Author shown in page footers.
  #[config(key = "author")]
  pub author: String,

  /// Copyright notice.
  #[config(key = "copyright")]
  pub copyright: String,

  /// Full version string, including alpha/beta/rc tags.
  #[config(key = "release")]
  pub release: String,

  /// Document holding the root table of contents.
  #[config(key = "master_doc")]
  pub master_doc: String,

  /// Directory containing markdown sources.
  #[config(key = "input_dir", allow_empty)]
  pub input_dir: Option<PathBuf>,

  /// Output directory for the search index and other generated files.
  #[config(key = "output_dir")]
  pub output_dir: PathBuf,

  /// Directory containing theme template overrides.
  #[config(key = "templates_path", allow_empty)]
  pub templates_path: Option<PathBuf>,

  /// Theme extensions to enable.
  pub extensions: Vec<String>,

  /// Glob patterns, relative to the input directory, of sources to skip.
  pub exclude_patterns: Vec<String>,

  /// Number of threads used to read sources.
  #[config(key = "jobs", allow_empty)]
  pub jobs: Option<usize>,

  /// HTML theme options.
  #[config(nested)]
  pub html: Option<html::HtmlConfig>,

  /// Search index configuration.
  #[config(nested)]
  pub search: Option<search::SearchConfig>,

  /// Literal placeholder replacements applied to raw sources, code blocks
  /// included.
  #[config(key = "replacements", map)]
  pub replacements: IndexMap<String, String>,

  /// `{{ name }}` substitutions applied outside code.
  #[config(key = "substitutions", map)]
  pub substitutions: IndexMap<String, String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      project:          "Project".to_string(),
      author:           String::new(),
      copyright:        String::new(),
      release:          String::new(),
      master_doc:       "index".to_string(),
      input_dir:        None,
      output_dir:       PathBuf::from("build"),
      templates_path:   None,
      extensions:       Vec::new(),
      exclude_patterns: Vec::new(),
      jobs:             None,
      html:             None,
      search:           None,
      replacements:     IndexMap::new(),
      substitutions:    IndexMap::new(),
    }
  }
}

impl Config {
  /// Returns whether a search index should be generated.
  #[must_use]
  pub fn is_search_enabled(&self) -> bool {
    self.search.as_ref().is_none_or(|s| s.enable)
  }

  /// Search configuration, or the defaults when the section is absent.
  #[must_use]
  pub fn search_options(&self) -> search::SearchConfig {
    self.search.clone().unwrap_or_default()
  }

  /// HTML configuration, or the defaults when the section is absent.
  #[must_use]
  pub fn html_options(&self) -> html::HtmlConfig {
    self.html.clone().unwrap_or_default()
  }

  /// Site title: the configured HTML title, falling back to the project name.
  #[must_use]
  pub fn site_title(&self) -> &str {
    self
      .html
      .as_ref()
      .and_then(|h| h.title.as_deref())
      .unwrap_or(&self.project)
  }

  /// Build the literal replacement table for the source-read hook.
  ///
  /// [`VERSION_PLACEHOLDER`] maps to [`Config::release`] when a release is
  /// set and the placeholder is not configured explicitly.
  #[must_use]
  pub fn replacement_table(&self) -> ReplacementTable {
    let mut table = ReplacementTable::new();
    if !self.release.is_empty()
      && !self.replacements.contains_key(VERSION_PLACEHOLDER)
    {
      table.insert(VERSION_PLACEHOLDER, &self.release);
    }
    for (key, value) in &self.replacements {
      table.insert(key, value);
    }
    table
  }

  /// Build the markup substitution hook.
  ///
  /// `version_num` resolves to [`Config::release`] unless configured.
  #[must_use]
  pub fn markup_substitutions(&self) -> MarkupSubstitutions {
    let mut values = IndexMap::new();
    if !self.release.is_empty() {
      values.insert("version_num".to_string(), self.release.clone());
    }
    values.extend(self.substitutions.clone());
    MarkupSubstitutions::new(values)
  }

  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::Config`] if the format is unsupported, or the
  /// [`ConfigError::Io`], [`ConfigError::Serde`] or [`ConfigError::Toml`]
  /// error raised while reading or parsing the file.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
      return Err(ConfigError::Config(format!(
        "Config file has no extension: {}",
        path.display()
      )));
    };

    match ext.to_lowercase().as_str() {
      "json" => Ok(serde_json::from_str(&fs::read_to_string(path)?)?),
      "toml" => Ok(toml::from_str(&fs::read_to_string(path)?)?),
      _ => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
    }
  }

  /// Load configuration from config files and overrides.
  ///
  /// Files are merged in order, later ones taking precedence. Without any
  /// files, a config is discovered in the standard locations, falling back to
  /// the defaults. `KEY=VALUE` overrides are applied last.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded or an override is invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged_config = Self::from_file(first).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load config from {}: {}",
          first.display(),
          e
        ))
      })?;

      for config_path in rest {
        let additional_config = Self::from_file(config_path).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to load config from {}: {}",
            config_path.display(),
            e
          ))
        })?;
        merged_config.merge(additional_config);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }

      merged_config
    } else if let Some(discovered_config) = Self::find_config_file() {
      log::info!(
        "Using discovered config file: {}",
        discovered_config.display()
      );
      Self::from_file(&discovered_config).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load discovered config from {}: {}",
          discovered_config.display(),
          e
        ))
      })?
    } else {
      Self::default()
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    Ok(config)
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// Nested sections are addressed with a dot (`search.language=de`), and so
  /// are map entries (`replacements.{version_num}=v1.0`).
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// # Merge Rules
  ///
  /// - [`Option<T>`] fields: Other's [`Some`] value replaces this config's
  ///   value
  /// - [`Vec<T>`] fields: Other's vec is appended to this config's vec
  /// - Map fields: Other's entries are merged in, overriding existing keys
  /// - Plain fields (String, bool, etc.): Other's value always replaces
  pub fn merge(&mut self, other: Self) {
    self.merge_fields(other);
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let config_filenames = [
          "quire.toml",
          "quire.json",
          ".quire.toml",
          ".quire.json",
          ".config/quire.toml",
          ".config/quire.json",
        ];

        let current_dir = std::env::current_dir().ok()?;
        for filename in &config_filenames {
          let config_path = current_dir.join(filename);
          if config_path.exists() {
            return Some(config_path);
          }
        }

        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
          let xdg_config_dir = PathBuf::from(xdg_config_home);
          for filename in &["quire.toml", "quire.json"] {
            let config_path = xdg_config_dir.join(filename);
            if config_path.exists() {
              return Some(config_path);
            }
          }
        }

        None
      })
      .clone()
  }

  /// Validate all paths specified in the configuration
  ///
  /// # Errors
  ///
  /// Returns an error if any configured path does not exist or is invalid.
  pub fn validate_paths(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if let Some(ref input_dir) = self.input_dir {
      if !input_dir.exists() {
        errors.push(format!(
          "Input directory does not exist: {}",
          input_dir.display()
        ));
      } else if !input_dir.is_dir() {
        errors.push(format!(
          "Input path is not a directory: {}",
          input_dir.display()
        ));
      }
    }

    if let Some(ref templates_path) = self.templates_path
      && !templates_path.is_dir()
    {
      errors.push(format!(
        "Templates directory does not exist: {}",
        templates_path.display()
      ));
    }

    for pattern in &self.exclude_patterns {
      if pattern.trim().is_empty() {
        errors.push("Exclude patterns must not be empty".to_string());
      }
    }

    if !errors.is_empty() {
      let error_message = errors.join("\n");
      return Err(ConfigError::Config(format!(
        "Configuration path validation errors:\n{error_message}"
      )));
    }

    Ok(())
  }

  /// Generate a default configuration file with commented explanations
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unsupported or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)
      .map_err(|e| ConfigError::Template(e.to_string()))?;

    fs::write(path, config_content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}
