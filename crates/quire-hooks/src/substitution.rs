use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::events::SourceReadHook;

/// Placeholder to value mapping applied to raw document text.
///
/// Entries are applied in insertion order. Keys are matched literally, so
/// `{version_num}` needs no escaping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplacementTable {
  entries: IndexMap<String, String>,
}

impl ReplacementTable {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a placeholder. An existing placeholder keeps its position and takes
  /// the new value.
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.entries.insert(key.into(), value.into());
  }

  #[must_use]
  pub fn get(&self, key: &str) -> Option<&str> {
    self.entries.get(key).map(String::as_str)
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .entries
      .iter()
      .map(|(key, value)| (key.as_str(), value.as_str()))
  }

  /// Replace every occurrence of each placeholder in `text`, in place.
  ///
  /// Each key is applied once over the whole buffer. Values are not rescanned
  /// for the same key, but a later key may match text produced by an earlier
  /// value. Empty keys are skipped.
  pub fn apply(&self, text: &mut String) {
    for (key, value) in &self.entries {
      if key.is_empty() || !text.contains(key.as_str()) {
        continue;
      }
      *text = text.replace(key.as_str(), value);
    }
  }

  /// Like [`ReplacementTable::apply`], on a borrowed string.
  #[must_use]
  pub fn apply_to(&self, text: &str) -> String {
    let mut owned = text.to_string();
    self.apply(&mut owned);
    owned
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)>
  for ReplacementTable
{
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self {
      entries: iter
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect(),
    }
  }
}

/// Source-read hook that applies a [`ReplacementTable`] to every document.
#[derive(Debug, Clone, Default)]
pub struct Substitutions {
  table: ReplacementTable,
}

impl Substitutions {
  #[must_use]
  pub const fn new(table: ReplacementTable) -> Self {
    Self { table }
  }

  #[must_use]
  pub const fn table(&self) -> &ReplacementTable {
    &self.table
  }
}

impl SourceReadHook for Substitutions {
  fn source_read(&self, docname: &str, source: &mut String) {
    let matched = self
      .table
      .iter()
      .any(|(key, _)| !key.is_empty() && source.contains(key));
    if !matched {
      return;
    }

    self.table.apply(source);
    debug!("Substituted placeholders in {docname}");
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn version_table() -> ReplacementTable {
    [("{version_num}", "v0.1.0")].into_iter().collect()
  }

  #[test]
  fn test_apply_replaces_placeholder() {
    let mut text = "Version: {version_num}".to_string();
    version_table().apply(&mut text);
    assert_eq!(text, "Version: v0.1.0");
  }

  #[test]
  fn test_apply_replaces_every_occurrence() {
    let text = "pip install pkg=={version_num} # {version_num}";
    assert_eq!(
      version_table().apply_to(text),
      "pip install pkg==v0.1.0 # v0.1.0"
    );
  }

  #[test]
  fn test_missing_placeholder_is_noop() {
    let text = "Nothing to see here.";
    assert_eq!(version_table().apply_to(text), text);
  }

  #[test]
  fn test_empty_key_is_skipped() {
    let table: ReplacementTable = [("", "x")].into_iter().collect();
    assert_eq!(table.apply_to("abc"), "abc");
  }

  #[test]
  fn test_value_is_not_rescanned_for_same_key() {
    let table: ReplacementTable = [("{a}", "{a}{a}")].into_iter().collect();
    assert_eq!(table.apply_to("{a}"), "{a}{a}");
  }

  #[test]
  fn test_idempotent_when_keys_absent_from_values() {
    let table: ReplacementTable = [
      ("{version_num}", "v0.1.0"),
      ("{info_url}", "https://example.com/info"),
    ]
    .into_iter()
    .collect();

    let once = table.apply_to("{version_num} at {info_url} and {version_num}");
    let twice = table.apply_to(&once);
    assert_eq!(once, twice);
    assert_eq!(once, "v0.1.0 at https://example.com/info and v0.1.0");
  }

  #[test]
  fn test_insert_keeps_position() {
    let mut table = ReplacementTable::new();
    table.insert("{a}", "1");
    table.insert("{b}", "2");
    table.insert("{a}", "3");

    let entries: Vec<_> = table.iter().collect();
    assert_eq!(entries, [("{a}", "3"), ("{b}", "2")]);
    assert_eq!(table.get("{a}"), Some("3"));
    assert_eq!(table.len(), 2);
  }

  #[test]
  fn test_substitutions_hook_mutates_source() {
    let hook = Substitutions::new(version_table());
    let mut source = "```\nquire --version # {version_num}\n```".to_string();
    hook.source_read("install", &mut source);
    assert_eq!(source, "```\nquire --version # v0.1.0\n```");
  }
}
