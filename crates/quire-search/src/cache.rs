use std::collections::HashMap;

use crate::language::Language;

/// Memoized stems, keyed by the raw word.
///
/// Entries are never evicted; the cache lives as long as the
/// [`IndexBuilder`](crate::IndexBuilder) that owns it.
#[derive(Debug, Default, Clone)]
pub struct StemCache {
  stems:  HashMap<String, String>,
  misses: usize,
}

impl StemCache {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Stemmed, lower-cased form of `word`, stemming it on first use.
  pub fn stem(&mut self, language: &dyn Language, word: &str) -> String {
    if let Some(stemmed) = self.stems.get(word) {
      return stemmed.clone();
    }

    let stemmed = language.stem(word).to_lowercase();
    self.misses += 1;
    self.stems.insert(word.to_string(), stemmed.clone());
    stemmed
  }

  #[must_use]
  pub fn get(&self, word: &str) -> Option<&str> {
    self.stems.get(word).map(String::as_str)
  }

  /// Number of times the underlying stemmer ran.
  #[must_use]
  pub const fn misses(&self) -> usize {
    self.misses
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.stems.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.stems.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use super::*;

  #[derive(Default)]
  struct CountingLanguage {
    calls: Cell<usize>,
  }

  impl Language for CountingLanguage {
    fn code(&self) -> &str {
      "test"
    }

    fn stem(&self, word: &str) -> String {
      self.calls.set(self.calls.get() + 1);
      word.trim_end_matches('s').to_string()
    }
  }

  #[test]
  fn test_stem_is_memoized() {
    let language = CountingLanguage::default();
    let mut cache = StemCache::new();

    let first = cache.stem(&language, "Docs");
    let second = cache.stem(&language, "Docs");

    assert_eq!(first, "doc");
    assert_eq!(first, second);
    assert_eq!(language.calls.get(), 1);
    assert_eq!(cache.misses(), 1);
  }

  #[test]
  fn test_raw_words_are_distinct_keys() {
    let language = CountingLanguage::default();
    let mut cache = StemCache::new();

    cache.stem(&language, "Docs");
    cache.stem(&language, "docs");

    assert_eq!(language.calls.get(), 2);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("docs"), Some("doc"));
    assert_eq!(cache.get("guide"), None);
  }
}
