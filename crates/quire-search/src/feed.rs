use comrak::nodes::AstNode;
use log::trace;

use crate::{
  builder::IndexEntries,
  collector::{CollectedWords, WordCollector},
  language::Language,
};

/// Strategy deciding how a document's words become index keys.
///
/// [`IndexBuilder`](crate::IndexBuilder) owns one feed, chosen at
/// construction, and calls it once per document.
pub trait Feed {
  /// Short name used in logs.
  fn name(&self) -> &str;

  /// Record `docname` and index the words of `doctree`.
  fn feed<'a>(
    &self,
    entries: &mut IndexEntries,
    language: &dyn Language,
    docname: &str,
    filename: &str,
    title: &str,
    doctree: &'a AstNode<'a>,
  );
}

/// Record the document and collect its words. Shared first steps of every
/// feed: the title and filename overwrite any earlier entry for `docname`.
pub fn begin_document<'a>(
  entries: &mut IndexEntries,
  language: &dyn Language,
  docname: &str,
  filename: &str,
  title: &str,
  doctree: &'a AstNode<'a>,
) -> CollectedWords {
  entries.set_document(docname, filename, title);
  let words = WordCollector::new(language).collect(doctree);
  trace!(
    "{docname}: {} title words, {} body words",
    words.title_words.len(),
    words.words.len()
  );
  words
}

/// Stock feeding: the stem is the index key whenever it passes the filter.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardFeed;

impl Feed for StandardFeed {
  fn name(&self) -> &str {
    "standard"
  }

  fn feed<'a>(
    &self,
    entries: &mut IndexEntries,
    language: &dyn Language,
    docname: &str,
    filename: &str,
    title: &str,
    doctree: &'a AstNode<'a>,
  ) {
    let found =
      begin_document(entries, language, docname, filename, title, doctree);

    for word in &found.title_words {
      let stemmed = entries.stem(language, word);
      if language.word_filter(&stemmed) {
        entries.add_title_term(&stemmed, docname);
      } else if language.word_filter(word) {
        entries.add_title_term(word, docname);
      }
    }

    for word in &found.words {
      let mut key = entries.stem(language, word);
      if !language.word_filter(&key) && language.word_filter(word) {
        key.clone_from(word);
      }
      let already_indexed = entries.is_title_indexed(&key, docname);
      if language.word_filter(&key) && !already_indexed {
        entries.add_body_term(&key, docname);
      }
    }
  }
}

/// Feeding that keeps short words searchable.
///
/// Stemmers reduce short words and acronyms to fragments ("iOS" becomes
/// "io"), which then never match a query for the word. Stems of at most
/// `short_term_length` characters are replaced by the lower-cased literal
/// word.
///
/// Title and body words use deliberately different fallback conditions:
///
/// - title: the stem is used if it is long enough *and* passes the filter,
///   otherwise the literal word if it passes the filter;
/// - body: the literal word is used if the stem is short, or if the stem
///   fails the filter while the literal word passes it.
#[derive(Debug, Clone, Copy)]
pub struct ShortTermFeed {
  short_term_length: usize,
}

impl ShortTermFeed {
  pub const DEFAULT_SHORT_TERM_LENGTH: usize = 3;

  #[must_use]
  pub const fn new(short_term_length: usize) -> Self {
    Self { short_term_length }
  }

  #[must_use]
  pub const fn short_term_length(&self) -> usize {
    self.short_term_length
  }

  fn is_short(&self, stemmed: &str) -> bool {
    stemmed.chars().count() <= self.short_term_length
  }
}

impl Default for ShortTermFeed {
  fn default() -> Self {
    Self::new(Self::DEFAULT_SHORT_TERM_LENGTH)
  }
}

impl Feed for ShortTermFeed {
  fn name(&self) -> &str {
    "short-term"
  }

  fn feed<'a>(
    &self,
    entries: &mut IndexEntries,
    language: &dyn Language,
    docname: &str,
    filename: &str,
    title: &str,
    doctree: &'a AstNode<'a>,
  ) {
    let found =
      begin_document(entries, language, docname, filename, title, doctree);

    for word in &found.title_words {
      let stemmed = entries.stem(language, word);
      if !self.is_short(&stemmed) && language.word_filter(&stemmed) {
        entries.add_title_term(&stemmed, docname);
      } else if language.word_filter(word) {
        entries.add_title_term(&word.to_lowercase(), docname);
      }
    }

    for word in &found.words {
      let stemmed = entries.stem(language, word);
      let key = if self.is_short(&stemmed)
        || (!language.word_filter(&stemmed) && language.word_filter(word))
      {
        word.to_lowercase()
      } else {
        stemmed
      };
      let already_indexed = entries.is_title_indexed(&key, docname);
      if language.word_filter(&key) && !already_indexed {
        entries.add_body_term(&key, docname);
      }
    }
  }
}
