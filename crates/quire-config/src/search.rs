use quire_macros::Configurable;
use serde::{Deserialize, Serialize};

/// Configuration for search index generation
#[derive(Debug, Clone, Serialize, Deserialize, Configurable)]
#[serde(default)]
pub struct SearchConfig {
  /// Whether a search index is generated at all
  #[config(key = "enable")]
  pub enable: bool,

  /// Language code selecting the stemmer and stopword list
  #[config(key = "language")]
  pub language: String,

  /// Stems of at most this many characters are considered mangled, and the
  /// literal word is indexed in their place.
  ///
  /// Short words like "iOS" tend to lose a meaningful letter to the
  /// stemmer. Setting this to 0 disables the guard for title words, but body
  /// words still fall back when the stem fails the stopword filter.
  #[config(key = "short_term_length")]
  pub short_term_length: usize,

  /// Use the stock feeding behavior: index the stem, or the raw word only
  /// when the stem fails the stopword filter
  #[config(key = "standard_stemming")]
  pub standard_stemming: bool,
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self {
      enable:            true,
      language:          "en".to_string(),
      short_term_length: 3,
      standard_stemming: false,
    }
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn test_search_config_overrides() {
    let mut config = SearchConfig::default();

    config.apply_override("language", "de").unwrap();
    config.apply_override("short_term_length", "4").unwrap();
    config.apply_override("standard_stemming", "yes").unwrap();

    assert_eq!(config.language, "de");
    assert_eq!(config.short_term_length, 4);
    assert!(config.standard_stemming);
  }

  #[test]
  fn test_search_config_rejects_negative_length() {
    let mut config = SearchConfig::default();

    let err = config
      .apply_override("short_term_length", "-1")
      .unwrap_err()
      .to_string();
    assert!(err.contains("Expected a positive integer"), "{err}");
  }
}
