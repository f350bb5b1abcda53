use std::{fs, path::Path};

use color_eyre::eyre::{Context, Result, bail};
use log::info;
use quire_config::Config;

/// Write the default configuration to `output`.
///
/// # Errors
///
/// Returns an error if `output` exists and `force` is not set, or if the file
/// cannot be written.
pub fn run(output: &Path, format: &str, force: bool) -> Result<()> {
  if output.exists() && !force {
    bail!(
      "Configuration file already exists: {}. Use --force to overwrite.",
      output.display()
    );
  }

  if let Some(parent) = output.parent()
    && !parent.as_os_str().is_empty()
    && !parent.exists()
  {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
    info!("Created directory: {}", parent.display());
  }

  Config::generate_default_config(format, output).wrap_err_with(|| {
    format!("Failed to generate configuration file: {}", output.display())
  })?;

  info!(
    "Configuration file created successfully. Edit it to customize your \
     project."
  );
  Ok(())
}
