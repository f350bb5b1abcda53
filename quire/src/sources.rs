//! Discovering and reading markdown sources.
use std::{
  fs,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result};
use glob::{MatchOptions, Pattern};
use log::{debug, info};
use quire_hooks::EventHooks;
use rayon::prelude::*;
use walkdir::WalkDir;

/// A markdown source after the source-read hooks ran over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
  /// Path relative to the input directory, without extension, `/` separated.
  pub docname: String,

  /// Output page the document renders to.
  pub filename: String,

  pub path: PathBuf,

  pub text: String,
}

/// Compiled `exclude_patterns`, matched against paths relative to the input
/// directory.
#[derive(Debug, Default)]
pub struct Excludes {
  patterns: Vec<Pattern>,
}

impl Excludes {
  /// # Errors
  ///
  /// Returns an error if a pattern is not a valid glob.
  pub fn new(patterns: &[String]) -> Result<Self> {
    let patterns = patterns
      .iter()
      .map(|pattern| {
        Pattern::new(pattern)
          .wrap_err_with(|| format!("Invalid exclude pattern: '{pattern}'"))
      })
      .collect::<Result<_>>()?;
    Ok(Self { patterns })
  }

  /// `*` and `?` stay within one path segment; `**` crosses them.
  #[must_use]
  pub fn is_excluded(&self, relative: &Path) -> bool {
    let options = MatchOptions {
      require_literal_separator: true,
      ..MatchOptions::new()
    };
    self
      .patterns
      .iter()
      .any(|pattern| pattern.matches_path_with(relative, options))
  }
}

/// Docname for a source path relative to the input directory.
#[must_use]
pub fn docname_for(relative: &Path) -> String {
  let stem = relative.with_extension("");
  stem
    .components()
    .map(|component| component.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("/")
}

/// Collect `*.md` files under `input_dir`, sorted, skipping excluded ones.
///
/// # Errors
///
/// Returns an error if the directory cannot be walked.
pub fn collect_markdown_files(
  input_dir: &Path,
  excludes: &Excludes,
) -> Result<Vec<PathBuf>> {
  let mut files = Vec::new();

  for entry in WalkDir::new(input_dir).sort_by_file_name() {
    let entry = entry.wrap_err_with(|| {
      format!("Failed to walk input directory: {}", input_dir.display())
    })?;
    let path = entry.path();
    if !entry.file_type().is_file()
      || path.extension().is_none_or(|ext| ext != "md")
    {
      continue;
    }

    let relative = path.strip_prefix(input_dir).unwrap_or(path);
    if excludes.is_excluded(relative) {
      debug!("Excluding {}", relative.display());
      continue;
    }
    files.push(path.to_path_buf());
  }

  info!("Found {} markdown files", files.len());
  Ok(files)
}

/// Read `files` in parallel and run the source-read hooks over each.
///
/// The result is sorted by docname.
///
/// # Errors
///
/// Returns an error if any file cannot be read.
pub fn read_sources(
  input_dir: &Path,
  files: &[PathBuf],
  hooks: &EventHooks,
) -> Result<Vec<Source>> {
  let mut sources = files
    .par_iter()
    .map(|path| {
      let mut text = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;

      let relative = path.strip_prefix(input_dir).unwrap_or(path);
      let docname = docname_for(relative);
      hooks.emit_source_read(&docname, &mut text);

      Ok(Source {
        filename: format!("{docname}.html"),
        docname,
        path: path.clone(),
        text,
      })
    })
    .collect::<Result<Vec<_>>>()?;

  sources.sort_by(|a, b| a.docname.cmp(&b.docname));
  Ok(sources)
}
