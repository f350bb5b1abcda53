use std::{fmt, sync::OnceLock};

use log::warn;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

/// Stopwords shared with the search frontend's English query parser. Words
/// dropped here must also be dropped from queries or they would never match.
pub const ENGLISH_STOPWORDS: &[&str] = &[
  "a", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into",
  "is", "it", "near", "no", "not", "of", "on", "or", "such", "that", "the",
  "their", "then", "there", "these", "they", "this", "to", "was", "will",
  "with",
];

/// Language-specific word handling used while indexing.
pub trait Language {
  /// Language code, e.g. "en".
  fn code(&self) -> &str;

  /// Stem a single word. The result is lower-cased by callers.
  fn stem(&self, word: &str) -> String;

  /// Stopwords for [`Language::word_filter`].
  fn stopwords(&self) -> &[&'static str] {
    &[]
  }

  /// Whether `word` is worth putting in the index.
  ///
  /// Rejects stopwords (only for words starting below U+0100, and matched
  /// case-sensitively) and hiragana words shorter than three characters.
  /// The empty string is accepted.
  fn word_filter(&self, word: &str) -> bool {
    let Some(first) = word.chars().next() else {
      return true;
    };
    let code = u32::from(first);
    let short_hiragana = word.chars().count() < 3 && code > 12353 && code < 12436;
    let stopword = code < 256 && self.stopwords().contains(&word);
    !(short_hiragana || stopword)
  }

  /// Split text into words.
  fn split(&self, text: &str) -> Vec<String> {
    word_regex()
      .find_iter(text)
      .map(|m| m.as_str().to_string())
      .collect()
  }
}

fn word_regex() -> &'static Regex {
  static WORD_REGEX: OnceLock<Regex> = OnceLock::new();
  WORD_REGEX.get_or_init(|| {
    #[allow(
      clippy::unwrap_used,
      reason = "regex pattern is statically known to be valid"
    )]
    Regex::new(r"\w+").unwrap()
  })
}

/// A [`Language`] backed by a Snowball stemmer.
///
/// English carries a stopword list; the other languages only stem.
pub struct SnowballLanguage {
  code:      &'static str,
  stemmer:   Stemmer,
  stopwords: &'static [&'static str],
}

impl SnowballLanguage {
  #[must_use]
  pub fn english() -> Self {
    Self {
      code:      "en",
      stemmer:   Stemmer::create(Algorithm::English),
      stopwords: ENGLISH_STOPWORDS,
    }
  }

  /// Look up a language by its code. Returns `None` for languages without
  /// a stemmer.
  #[must_use]
  pub fn from_code(code: &str) -> Option<Self> {
    let (code, algorithm) = match code.to_lowercase().as_str() {
      "en" | "english" => return Some(Self::english()),
      "ar" => ("ar", Algorithm::Arabic),
      "da" => ("da", Algorithm::Danish),
      "de" => ("de", Algorithm::German),
      "el" => ("el", Algorithm::Greek),
      "es" => ("es", Algorithm::Spanish),
      "fi" => ("fi", Algorithm::Finnish),
      "fr" => ("fr", Algorithm::French),
      "hu" => ("hu", Algorithm::Hungarian),
      "it" => ("it", Algorithm::Italian),
      "nl" => ("nl", Algorithm::Dutch),
      "no" | "nb" => ("no", Algorithm::Norwegian),
      "pt" => ("pt", Algorithm::Portuguese),
      "ro" => ("ro", Algorithm::Romanian),
      "ru" => ("ru", Algorithm::Russian),
      "sv" => ("sv", Algorithm::Swedish),
      "ta" => ("ta", Algorithm::Tamil),
      "tr" => ("tr", Algorithm::Turkish),
      _ => return None,
    };

    Some(Self {
      code,
      stemmer: Stemmer::create(algorithm),
      stopwords: &[],
    })
  }

  /// Like [`SnowballLanguage::from_code`], falling back to English.
  #[must_use]
  pub fn from_code_or_english(code: &str) -> Self {
    Self::from_code(code).unwrap_or_else(|| {
      warn!("No stemmer for language '{code}', falling back to English");
      Self::english()
    })
  }
}

impl Language for SnowballLanguage {
  fn code(&self) -> &str {
    self.code
  }

  fn stem(&self, word: &str) -> String {
    self.stemmer.stem(&word.to_lowercase()).into_owned()
  }

  fn stopwords(&self) -> &[&'static str] {
    self.stopwords
  }
}

impl fmt::Debug for SnowballLanguage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SnowballLanguage")
      .field("code", &self.code)
      .field("stopwords", &self.stopwords.len())
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn test_english_stems_lowercased_input() {
    let english = SnowballLanguage::english();
    assert_eq!(english.stem("Running"), "run");
    assert_eq!(english.stem("connections"), "connect");
  }

  #[test]
  fn test_word_filter_rejects_stopwords() {
    let english = SnowballLanguage::english();
    assert!(!english.word_filter("the"));
    assert!(!english.word_filter("with"));
    assert!(english.word_filter("overview"));
  }

  #[test]
  fn test_word_filter_is_case_sensitive() {
    let english = SnowballLanguage::english();
    assert!(english.word_filter("The"));
  }

  #[test]
  fn test_word_filter_accepts_empty() {
    assert!(SnowballLanguage::english().word_filter(""));
  }

  #[test]
  fn test_word_filter_rejects_short_hiragana() {
    let english = SnowballLanguage::english();
    assert!(!english.word_filter("です"));
    assert!(english.word_filter("ですね"));
  }

  #[test]
  fn test_split_keeps_unicode_words() {
    let english = SnowballLanguage::english();
    assert_eq!(
      english.split("TTS-based café, v0.1.0!"),
      ["TTS", "based", "café", "v0", "1", "0"]
    );
  }

  #[test]
  fn test_from_code() {
    assert_eq!(SnowballLanguage::from_code("DE").unwrap().code(), "de");
    assert_eq!(SnowballLanguage::from_code("nb").unwrap().code(), "no");
    assert!(SnowballLanguage::from_code("tlh").is_none());
    assert_eq!(SnowballLanguage::from_code_or_english("tlh").code(), "en");
  }

  #[test]
  fn test_non_english_has_no_stopwords() {
    let german = SnowballLanguage::from_code("de").unwrap();
    assert!(german.stopwords().is_empty());
    assert!(german.word_filter("the"));
  }
}
