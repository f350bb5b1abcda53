use std::{
  collections::{BTreeMap, BTreeSet, HashMap},
  fmt,
};

use comrak::{Arena, nodes::AstNode, options::Options, parse_document};
use log::{debug, info};

use crate::{
  cache::StemCache,
  collector::first_heading_text,
  error::SearchError,
  feed::{Feed, ShortTermFeed, StandardFeed},
  frozen::{DocRefs, SearchIndexData},
  language::{Language, SnowballLanguage},
};

/// Term to the docnames it was found in.
pub type TermIndex = BTreeMap<String, BTreeSet<String>>;

/// Everything the index knows about fed documents.
///
/// Title and filename are keyed by docname, and a later write for the same
/// docname replaces the earlier one. The two term indices only ever grow
/// until [`IndexEntries::prune`] is called.
#[derive(Debug, Default, Clone)]
pub struct IndexEntries {
  titles:        BTreeMap<String, String>,
  filenames:     BTreeMap<String, String>,
  title_mapping: TermIndex,
  mapping:       TermIndex,
  stem_cache:    StemCache,
}

impl IndexEntries {
  pub fn set_document(&mut self, docname: &str, filename: &str, title: &str) {
    self.titles.insert(docname.to_string(), title.to_string());
    self
      .filenames
      .insert(docname.to_string(), filename.to_string());
  }

  /// Stem `word` through the cache.
  pub fn stem(&mut self, language: &dyn Language, word: &str) -> String {
    self.stem_cache.stem(language, word)
  }

  pub fn add_title_term(&mut self, term: &str, docname: &str) {
    self
      .title_mapping
      .entry(term.to_string())
      .or_default()
      .insert(docname.to_string());
  }

  pub fn add_body_term(&mut self, term: &str, docname: &str) {
    self
      .mapping
      .entry(term.to_string())
      .or_default()
      .insert(docname.to_string());
  }

  /// Whether `docname` is already listed under `term` in the title index.
  #[must_use]
  pub fn is_title_indexed(&self, term: &str, docname: &str) -> bool {
    self
      .title_mapping
      .get(term)
      .is_some_and(|docs| docs.contains(docname))
  }

  #[must_use]
  pub const fn titles(&self) -> &BTreeMap<String, String> {
    &self.titles
  }

  #[must_use]
  pub const fn filenames(&self) -> &BTreeMap<String, String> {
    &self.filenames
  }

  /// Words found in headings.
  #[must_use]
  pub const fn title_index(&self) -> &TermIndex {
    &self.title_mapping
  }

  /// Words found in the document body.
  #[must_use]
  pub const fn body_index(&self) -> &TermIndex {
    &self.mapping
  }

  #[must_use]
  pub const fn stem_cache(&self) -> &StemCache {
    &self.stem_cache
  }

  /// Forget every document not in `keep`. Terms left without documents are
  /// dropped.
  pub fn prune(&mut self, keep: &BTreeSet<String>) {
    self.titles.retain(|docname, _| keep.contains(docname));
    self.filenames.retain(|docname, _| keep.contains(docname));

    for index in [&mut self.title_mapping, &mut self.mapping] {
      index.retain(|_, docs| {
        docs.retain(|docname| keep.contains(docname));
        !docs.is_empty()
      });
    }
  }
}

/// Accumulates documents into a search index.
pub struct IndexBuilder {
  entries:  IndexEntries,
  language: Box<dyn Language>,
  feed:     Box<dyn Feed>,
}

impl IndexBuilder {
  #[must_use]
  pub fn new(language: Box<dyn Language>, feed: Box<dyn Feed>) -> Self {
    Self {
      entries: IndexEntries::default(),
      language,
      feed,
    }
  }

  /// Builder guarding stems of at most `short_term_length` characters.
  #[must_use]
  pub fn with_short_term_length(
    language: Box<dyn Language>,
    short_term_length: usize,
  ) -> Self {
    Self::new(language, Box::new(ShortTermFeed::new(short_term_length)))
  }

  /// Builder for a language code, as used in configuration files.
  ///
  /// Unknown codes fall back to English. `short_term_length` is ignored when
  /// `standard_stemming` is set.
  #[must_use]
  pub fn for_language(
    code: &str,
    standard_stemming: bool,
    short_term_length: usize,
  ) -> Self {
    let language = Box::new(SnowballLanguage::from_code_or_english(code));
    if standard_stemming {
      Self::new(language, Box::new(StandardFeed))
    } else {
      Self::with_short_term_length(language, short_term_length)
    }
  }

  /// Add an already parsed document.
  pub fn feed<'a>(
    &mut self,
    docname: &str,
    filename: &str,
    title: &str,
    doctree: &'a AstNode<'a>,
  ) {
    debug!("Indexing {docname} ({} feed)", self.feed.name());
    self.feed.feed(
      &mut self.entries,
      self.language.as_ref(),
      docname,
      filename,
      title,
      doctree,
    );
  }

  /// Parse Markdown `source` and add it. The first heading becomes the
  /// title; documents without one are titled by their docname.
  pub fn feed_source(&mut self, docname: &str, filename: &str, source: &str) {
    let arena = Arena::new();
    let root = parse_document(&arena, source, &markdown_options());
    let title =
      first_heading_text(root).unwrap_or_else(|| docname.to_string());
    self.feed(docname, filename, &title, root);
  }

  #[must_use]
  pub const fn entries(&self) -> &IndexEntries {
    &self.entries
  }

  #[must_use]
  pub fn language(&self) -> &dyn Language {
    self.language.as_ref()
  }

  #[must_use]
  pub fn feed_name(&self) -> &str {
    self.feed.name()
  }

  #[must_use]
  pub const fn titles(&self) -> &BTreeMap<String, String> {
    self.entries.titles()
  }

  #[must_use]
  pub const fn filenames(&self) -> &BTreeMap<String, String> {
    self.entries.filenames()
  }

  #[must_use]
  pub const fn title_index(&self) -> &TermIndex {
    self.entries.title_index()
  }

  #[must_use]
  pub const fn body_index(&self) -> &TermIndex {
    self.entries.body_index()
  }

  #[must_use]
  pub const fn stem_cache(&self) -> &StemCache {
    self.entries.stem_cache()
  }

  pub fn prune(&mut self, keep: &BTreeSet<String>) {
    let before = self.entries.titles.len();
    self.entries.prune(keep);
    debug!(
      "Pruned {} documents from the search index",
      before - self.entries.titles.len()
    );
  }

  /// Snapshot the index in the compact form read by the search frontend.
  ///
  /// Documents are numbered in docname order. A term found in a single
  /// document maps to that number, otherwise to the sorted list.
  #[must_use]
  pub fn freeze(&self) -> SearchIndexData {
    let docnames: Vec<String> = self.entries.titles.keys().cloned().collect();
    let numbers: HashMap<&str, usize> = docnames
      .iter()
      .enumerate()
      .map(|(i, docname)| (docname.as_str(), i))
      .collect();

    let filenames = docnames
      .iter()
      .map(|docname| {
        self
          .entries
          .filenames
          .get(docname)
          .cloned()
          .unwrap_or_default()
      })
      .collect();
    let titles = self.entries.titles.values().cloned().collect();

    let data = SearchIndexData {
      terms: freeze_terms(&self.entries.mapping, &numbers),
      titleterms: freeze_terms(&self.entries.title_mapping, &numbers),
      docnames,
      filenames,
      titles,
    };

    info!(
      "Froze search index: {} documents, {} terms, {} title terms",
      data.docnames.len(),
      data.terms.len(),
      data.titleterms.len()
    );
    data
  }

  /// Replace the current entries with a frozen index.
  ///
  /// The stem cache starts out empty.
  ///
  /// # Errors
  ///
  /// Returns [`SearchError::Format`] if the lists of documents differ in
  /// length or a term refers to a document number that does not exist.
  pub fn load(&mut self, data: &SearchIndexData) -> Result<(), SearchError> {
    let count = data.docnames.len();
    if data.filenames.len() != count || data.titles.len() != count {
      return Err(SearchError::Format(format!(
        "{count} docnames but {} filenames and {} titles",
        data.filenames.len(),
        data.titles.len()
      )));
    }

    let mut entries = IndexEntries::default();
    for ((docname, filename), title) in
      data.docnames.iter().zip(&data.filenames).zip(&data.titles)
    {
      entries.set_document(docname, filename, title);
    }
    entries.mapping = thaw_terms(&data.terms, &data.docnames)?;
    entries.title_mapping = thaw_terms(&data.titleterms, &data.docnames)?;

    self.entries = entries;
    Ok(())
  }
}

impl fmt::Debug for IndexBuilder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("IndexBuilder")
      .field("language", &self.language.code())
      .field("feed", &self.feed.name())
      .field("entries", &self.entries)
      .finish()
  }
}

/// Markdown extensions enabled when parsing sources for indexing.
#[must_use]
pub fn markdown_options() -> Options<'static> {
  let mut options = Options::default();
  options.extension.table = true;
  options.extension.footnotes = true;
  options.extension.strikethrough = true;
  options.extension.tasklist = true;
  options
}

fn freeze_terms(
  index: &TermIndex,
  numbers: &HashMap<&str, usize>,
) -> BTreeMap<String, DocRefs> {
  index
    .iter()
    .filter_map(|(term, docs)| {
      let mut refs: Vec<usize> = docs
        .iter()
        .filter_map(|docname| numbers.get(docname.as_str()).copied())
        .collect();
      refs.sort_unstable();
      let refs = match refs.as_slice() {
        [] => return None,
        [single] => DocRefs::One(*single),
        _ => DocRefs::Many(refs),
      };
      Some((term.clone(), refs))
    })
    .collect()
}

fn thaw_terms(
  terms: &BTreeMap<String, DocRefs>,
  docnames: &[String],
) -> Result<TermIndex, SearchError> {
  terms
    .iter()
    .map(|(term, refs)| {
      let docs = refs
        .iter()
        .map(|number| {
          docnames.get(number).cloned().ok_or_else(|| {
            SearchError::Format(format!(
              "term '{term}' refers to document {number}, but there are only \
               {} documents",
              docnames.len()
            ))
          })
        })
        .collect::<Result<BTreeSet<_>, _>>()?;
      Ok((term.clone(), docs))
    })
    .collect()
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  fn english(short_term_length: usize) -> IndexBuilder {
    IndexBuilder::with_short_term_length(
      Box::new(SnowballLanguage::english()),
      short_term_length,
    )
  }

  fn keep(docnames: &[&str]) -> BTreeSet<String> {
    docnames.iter().map(ToString::to_string).collect()
  }

  #[test]
  fn test_feed_source_uses_first_heading_as_title() {
    let mut builder = english(3);
    builder.feed_source("guide/tts", "guide/tts.html", "# TTS Overview\n\nbody");
    builder.feed_source("notes", "notes.html", "no heading here");

    assert_eq!(builder.titles()["guide/tts"], "TTS Overview");
    assert_eq!(builder.titles()["notes"], "notes");
    assert_eq!(builder.filenames()["guide/tts"], "guide/tts.html");
  }

  #[test]
  fn test_acronym_title_survives_stemming() {
    let mut builder = english(3);
    builder.feed_source("doc1", "doc1.html", "# iOS Overview\n\noverview");

    // the English stemmer reduces "ios" to "io"
    assert!(builder.title_index()["ios"].contains("doc1"));
    assert!(!builder.title_index().contains_key("io"));
    assert!(builder.title_index()["overview"].contains("doc1"));
    assert!(!builder.body_index().contains_key("overview"));
  }

  #[test]
  fn test_standard_stemming_reduces_acronym() {
    let mut builder = IndexBuilder::for_language("en", true, 3);
    builder.feed_source("doc1", "doc1.html", "# iOS Overview\n");

    assert_eq!(builder.feed_name(), "standard");
    assert!(builder.title_index()["io"].contains("doc1"));
    assert!(!builder.title_index().contains_key("ios"));
  }

  #[test]
  fn test_for_language_falls_back_to_english() {
    let builder = IndexBuilder::for_language("tlh", false, 3);
    assert_eq!(builder.language().code(), "en");
    assert_eq!(builder.feed_name(), "short-term");
  }

  #[test]
  fn test_refeeding_overwrites_title() {
    let mut builder = english(3);
    builder.feed_source("doc1", "doc1.html", "# First\n");
    builder.feed_source("doc1", "doc1.html", "# Second\n");

    assert_eq!(builder.titles().len(), 1);
    assert_eq!(builder.titles()["doc1"], "Second");
  }

  #[test]
  fn test_stem_cache_is_shared_between_documents() {
    let mut builder = english(3);
    builder.feed_source("doc1", "doc1.html", "connections");
    builder.feed_source("doc2", "doc2.html", "connections connections");

    assert_eq!(builder.stem_cache().misses(), 1);
    assert_eq!(builder.stem_cache().get("connections"), Some("connect"));
  }

  #[test]
  fn test_prune_drops_documents_and_empty_terms() {
    let mut builder = english(3);
    builder.feed_source("doc1", "doc1.html", "# Speech\n\nshared words");
    builder.feed_source("doc2", "doc2.html", "# Vision\n\nshared");

    builder.prune(&keep(&["doc2"]));

    assert_eq!(builder.titles().keys().collect::<Vec<_>>(), ["doc2"]);
    assert_eq!(builder.filenames().len(), 1);
    assert!(!builder.title_index().contains_key("speech"));
    assert!(!builder.body_index().contains_key("word"));
    assert_eq!(builder.body_index()["share"], keep(&["doc2"]));
  }

  #[test]
  fn test_freeze_compresses_single_documents() {
    let mut builder = english(3);
    builder.feed_source("b", "b.html", "# Vision\n\nshared");
    builder.feed_source("a", "a.html", "# Speech\n\nshared");

    let data = builder.freeze();

    assert_eq!(data.docnames, ["a", "b"]);
    assert_eq!(data.filenames, ["a.html", "b.html"]);
    assert_eq!(data.titles, ["Speech", "Vision"]);
    assert_eq!(data.titleterms["speech"], DocRefs::One(0));
    assert_eq!(data.titleterms["vision"], DocRefs::One(1));
    assert_eq!(data.terms["share"], DocRefs::Many(vec![0, 1]));
  }

  #[test]
  fn test_load_restores_frozen_index() {
    let mut builder = english(3);
    builder.feed_source("a", "a.html", "# Speech\n\nshared");
    builder.feed_source("b", "b.html", "shared");
    let data = builder.freeze();

    let mut restored = english(3);
    restored.load(&data).unwrap();

    assert_eq!(restored.titles(), builder.titles());
    assert_eq!(restored.filenames(), builder.filenames());
    assert_eq!(restored.title_index(), builder.title_index());
    assert_eq!(restored.body_index(), builder.body_index());
    assert!(restored.stem_cache().is_empty());
  }

  #[test]
  fn test_load_rejects_unknown_document_number() {
    let data = SearchIndexData {
      docnames:   vec!["a".to_string()],
      filenames:  vec!["a.html".to_string()],
      titles:     vec!["A".to_string()],
      terms:      BTreeMap::from([("word".to_string(), DocRefs::One(3))]),
      titleterms: BTreeMap::new(),
    };

    let err = english(3).load(&data).unwrap_err();
    assert!(matches!(err, SearchError::Format(_)));
  }

  #[test]
  fn test_load_rejects_mismatched_lists() {
    let data = SearchIndexData {
      docnames: vec!["a".to_string(), "b".to_string()],
      filenames: vec!["a.html".to_string()],
      titles: vec!["A".to_string(), "B".to_string()],
      ..SearchIndexData::default()
    };

    assert!(english(3).load(&data).is_err());
  }
}
