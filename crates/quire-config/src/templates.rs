use std::fmt;

/// Error type for config template operations.
#[derive(Debug)]
pub enum TemplateError {
  /// The requested configuration format is not supported. Contains the name
  /// of the unsupported format.
  UnsupportedFormat(String),
}

impl fmt::Display for TemplateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnsupportedFormat(format) => {
        write!(f, "Unsupported config format: {format}")
      },
    }
  }
}

impl std::error::Error for TemplateError {}

/// Default configuration template in TOML, commented so that a new user can
/// find their way around without reading the docs first.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# Quire Configuration File

# -- Project information -------------------------------------------------------

project = "My Project"
author = ""
copyright = ""

# The full version, including alpha/beta/rc tags. Also the default value of the
# {version_num} placeholder.
release = "v0.1.0"

# Document holding the root table of contents
master_doc = "index"

# -- Sources -------------------------------------------------------------------

# Directory containing markdown sources
input_dir = "docs"

# Output directory for the generated search index
output_dir = "build"

# Glob patterns, relative to input_dir, of sources to skip
exclude_patterns = ["_build/**", "**/.DS_Store"]

# Theme extensions to enable
extensions = []

# Directory containing theme template overrides
# templates_path = "_templates"

# Number of threads used to read sources (defaults to number of CPU cores)
# jobs = 4

# -- Placeholders --------------------------------------------------------------

# Literal replacements applied to every source before it is parsed, including
# inside code blocks.
[replacements]
# "{version_num}" = "v0.1.0"

# `{{ name }}` substitutions, applied outside code only
[substitutions]
# info_url = "[information website](https://example.com/)"

# -- HTML output ---------------------------------------------------------------

[html]
theme = "book"
# title = "My Project Documentation"
# short_title = "My Project"
# logo = "_static/logo.png"
# favicon = "_static/favicon.png"
# baseurl = "https://docs.example.com/my-project/"
static_path = ["_static"]
css_files = ["custom.css"]
js_files = []
copy_source = true
sourcelink_suffix = ""

[html.theme_options]
show_toc_level = 4

# -- Search --------------------------------------------------------------------

[search]
# Whether to generate a search index
enable = true

# Language used for stemming and stopwords
language = "en"

# Stems of at most this many characters are replaced by the literal word, so
# short acronyms stay searchable
short_term_length = 3

# Index stems unconditionally, as stock search indexers do
standard_stemming = false
"#;

/// Default configuration template in JSON format.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "project": "My Project",
  "author": "",
  "copyright": "",
  "release": "v0.1.0",
  "master_doc": "index",
  "input_dir": "docs",
  "output_dir": "build",
  "exclude_patterns": ["_build/**", "**/.DS_Store"],
  "extensions": [],
  "replacements": {},
  "substitutions": {},
  "html": {
    "theme": "book",
    "static_path": ["_static"],
    "css_files": ["custom.css"],
    "js_files": [],
    "copy_source": true,
    "sourcelink_suffix": "",
    "theme_options": {
      "show_toc_level": 4
    }
  },
  "search": {
    "enable": true,
    "language": "en",
    "short_term_length": 3,
    "standard_stemming": false
  }
}
"#;

/// Get the correct configuration template based on the requested format.
///
/// # Errors
///
/// Returns an error if the requested format is not supported.
pub fn get_template(format: &str) -> Result<&'static str, TemplateError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => Err(TemplateError::UnsupportedFormat(format.to_string())),
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;
  use crate::Config;

  #[test]
  fn test_toml_template_parses() {
    let config: Config = toml::from_str(DEFAULT_TOML_TEMPLATE).unwrap();
    assert_eq!(config.project, "My Project");
    assert_eq!(config.search_options().short_term_length, 3);
    assert_eq!(config.html_options().css_files, ["custom.css"]);
  }

  #[test]
  fn test_json_template_parses() {
    let config: Config = serde_json::from_str(DEFAULT_JSON_TEMPLATE).unwrap();
    assert_eq!(config.release, "v0.1.0");
    assert!(config.is_search_enabled());
  }

  #[test]
  fn test_unsupported_format() {
    let err = get_template("yaml").unwrap_err();
    assert_eq!(err.to_string(), "Unsupported config format: yaml");
  }
}
