use std::{fs, path::Path};

use color_eyre::eyre::{Context, Result};
use quire_config::Config;

use crate::{commands::source_read_hooks, sources::docname_for};

/// Read `file` and run the configured source-read hooks over it.
///
/// The docname is derived relative to the configured input directory when
/// `file` lies inside it.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn render(config: &Config, file: &Path) -> Result<String> {
  let mut source = fs::read_to_string(file)
    .wrap_err_with(|| format!("Failed to read {}", file.display()))?;

  let relative = config
    .input_dir
    .as_deref()
    .and_then(|input_dir| file.strip_prefix(input_dir).ok())
    .unwrap_or(file);
  let docname = docname_for(relative);

  source_read_hooks(config).emit_source_read(&docname, &mut source);
  Ok(source)
}

/// Print `file` after substitution.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
#[allow(clippy::print_stdout, reason = "Output is the command's result")]
pub fn run(config: &Config, file: &Path) -> Result<()> {
  print!("{}", render(config, file)?);
  Ok(())
}

#[cfg(test)]
mod tests {
  #![allow(
    clippy::unwrap_used,
    clippy::field_reassign_with_default,
    reason = "Fine in tests"
  )]

  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_render_applies_both_hooks() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("index.md");
    fs::write(
      &file,
      "Version: {version_num}\n\nSee {{ site }}, not `{{ site }}`.\n",
    )
    .unwrap();

    let mut config = Config::default();
    config.release = "v0.1.0".to_string();
    config
      .substitutions
      .insert("site".to_string(), "example.com".to_string());

    assert_eq!(
      render(&config, &file).unwrap(),
      "Version: v0.1.0\n\nSee example.com, not `{{ site }}`.\n"
    );
  }

  #[test]
  fn test_render_expands_version_reference_with_and_without_spaces() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("index.md");
    fs::write(
      &file,
      "Release {{version_num}} and {{ version_num }}, raw {version_num}",
    )
    .unwrap();

    let mut config = Config::default();
    config.release = "v0.1.0".to_string();

    assert_eq!(
      render(&config, &file).unwrap(),
      "Release v0.1.0 and v0.1.0, raw v0.1.0"
    );
  }

  #[test]
  fn test_render_without_release_leaves_placeholder() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("index.md");
    fs::write(&file, "Version: {version_num}").unwrap();

    let rendered = render(&Config::default(), &file).unwrap();
    assert_eq!(rendered, "Version: {version_num}");
  }

  #[test]
  fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(render(&Config::default(), &dir.path().join("nope.md")).is_err());
  }
}
