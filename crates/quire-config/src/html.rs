use std::path::PathBuf;

use indexmap::IndexMap;
use quire_macros::Configurable;
use serde::{Deserialize, Serialize};

/// Options handed to the HTML theme.
///
/// Quire does not render HTML itself; these values are carried so a single
/// config file describes the whole documentation project.
#[derive(Debug, Clone, Serialize, Deserialize, Configurable)]
#[serde(default)]
pub struct HtmlConfig {
  /// Theme name
  #[config(key = "theme")]
  pub theme: String,

  /// Full site title. Falls back to the project name.
  #[config(key = "title", allow_empty)]
  pub title: Option<String>,

  /// Short title used in navigation bars
  #[config(key = "short_title", allow_empty)]
  pub short_title: Option<String>,

  /// Logo image, relative to the source directory
  #[config(key = "logo", allow_empty)]
  pub logo: Option<PathBuf>,

  /// Favicon, relative to the source directory
  #[config(key = "favicon", allow_empty)]
  pub favicon: Option<PathBuf>,

  /// Final location of the published docs, used for sitemaps
  #[config(key = "baseurl", allow_empty)]
  pub baseurl: Option<String>,

  /// Directories copied verbatim into the output
  pub static_path: Vec<PathBuf>,

  /// Extra stylesheets, relative to a static path
  pub css_files: Vec<String>,

  /// Extra scripts. Absolute URLs are allowed.
  pub js_files: Vec<String>,

  /// Whether page sources are copied next to the output
  #[config(key = "copy_source")]
  pub copy_source: bool,

  /// Suffix appended to source links
  #[config(key = "sourcelink_suffix")]
  pub sourcelink_suffix: String,

  /// Free-form theme options
  pub theme_options: IndexMap<String, serde_json::Value>,
}

impl Default for HtmlConfig {
  fn default() -> Self {
    Self {
      theme:             "book".to_string(),
      title:             None,
      short_title:       None,
      logo:              None,
      favicon:           None,
      baseurl:           None,
      static_path:       Vec::new(),
      css_files:         Vec::new(),
      js_files:          Vec::new(),
      copy_source:       true,
      sourcelink_suffix: String::new(),
      theme_options:     IndexMap::new(),
    }
  }
}
