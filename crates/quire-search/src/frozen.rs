use std::{collections::BTreeMap, fs, path::Path};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

const JS_PREFIX: &str = "Search.setIndex(";
const JS_SUFFIX: &str = ")";

/// Documents a term was found in, by document number.
///
/// Serialized as a bare number when there is only one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocRefs {
  One(usize),
  Many(Vec<usize>),
}

impl DocRefs {
  pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
    let many = match self {
      Self::One(_) => &[][..],
      Self::Many(numbers) => numbers.as_slice(),
    };
    let one = match self {
      Self::One(number) => Some(*number),
      Self::Many(_) => None,
    };
    one.into_iter().chain(many.iter().copied())
  }

  #[must_use]
  pub fn len(&self) -> usize {
    match self {
      Self::One(_) => 1,
      Self::Many(numbers) => numbers.len(),
    }
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  #[must_use]
  pub fn contains(&self, number: usize) -> bool {
    self.iter().any(|n| n == number)
  }
}

/// Frozen search index, as written to `searchindex.js`.
///
/// `docnames`, `filenames` and `titles` are parallel lists; document numbers
/// in `terms` and `titleterms` index into them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchIndexData {
  pub docnames:   Vec<String>,
  pub filenames:  Vec<String>,
  pub titles:     Vec<String>,
  pub terms:      BTreeMap<String, DocRefs>,
  pub titleterms: BTreeMap<String, DocRefs>,
}

impl SearchIndexData {
  /// # Errors
  ///
  /// Returns an error if serialization fails.
  pub fn to_json(&self) -> Result<String, SearchError> {
    Ok(serde_json::to_string(self)?)
  }

  /// Render the index as the script loaded by the search page.
  ///
  /// # Errors
  ///
  /// Returns an error if serialization fails.
  pub fn to_js(&self) -> Result<String, SearchError> {
    Ok(format!("{JS_PREFIX}{}{JS_SUFFIX}", self.to_json()?))
  }

  /// # Errors
  ///
  /// Returns an error if `json` is not a valid index.
  pub fn from_json(json: &str) -> Result<Self, SearchError> {
    Ok(serde_json::from_str(json)?)
  }

  /// Parse a script produced by [`SearchIndexData::to_js`].
  ///
  /// # Errors
  ///
  /// Returns [`SearchError::Format`] if the `Search.setIndex(...)` wrapper is
  /// missing, or a serde error if its argument is not a valid index.
  pub fn from_js(js: &str) -> Result<Self, SearchError> {
    let js = js.trim().trim_end_matches(';');
    let json = js
      .strip_prefix(JS_PREFIX)
      .and_then(|rest| rest.strip_suffix(JS_SUFFIX))
      .ok_or_else(|| {
        SearchError::Format(format!(
          "expected the index to be wrapped in {JS_PREFIX}...{JS_SUFFIX}"
        ))
      })?;
    Self::from_json(json)
  }

  /// Write the index script to `path`, creating parent directories.
  ///
  /// # Errors
  ///
  /// Returns an error if the directory or file cannot be written.
  pub fn write_to(&self, path: &Path) -> Result<(), SearchError> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(path, self.to_js()?)?;
    info!("Wrote search index to {}", path.display());
    Ok(())
  }

  /// Read an index script written by [`SearchIndexData::write_to`].
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed.
  pub fn read_from(path: &Path) -> Result<Self, SearchError> {
    Self::from_js(&fs::read_to_string(path)?)
  }

  /// Docnames whose body contains `term`.
  #[must_use]
  pub fn documents_for(&self, term: &str) -> Vec<&str> {
    self.resolve(self.terms.get(term))
  }

  /// Docnames whose headings contain `term`.
  #[must_use]
  pub fn title_documents_for(&self, term: &str) -> Vec<&str> {
    self.resolve(self.titleterms.get(term))
  }

  fn resolve(&self, refs: Option<&DocRefs>) -> Vec<&str> {
    refs
      .into_iter()
      .flat_map(|refs| refs.iter())
      .filter_map(|number| self.docnames.get(number).map(String::as_str))
      .collect()
  }
}
