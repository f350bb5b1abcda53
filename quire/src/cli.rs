use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for quire
#[derive(Parser, Debug)]
#[command(author, version, about = "Quire: documentation hooks and search indexing")]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`]). Defaults to `index`.
  #[command(subcommand)]
  pub command: Option<Commands>,

  /// Enable verbose debug logging
  #[arg(short, long)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times) Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(short = 'c', long = "config-file", action = clap::ArgAction::Append)]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the quire CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new Quire configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "quire.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Build the search index for a directory of markdown sources.
  Index(IndexArgs),

  /// Print a source file after the source-read hooks ran over it.
  Substitute {
    /// Markdown file to process.
    file: PathBuf,
  },
}

/// Options of the `index` subcommand. Each one overrides its counterpart in
/// the configuration file.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct IndexArgs {
  /// Path to the directory containing markdown files.
  #[arg(short, long)]
  pub input_dir: Option<PathBuf>,

  /// Output directory for `searchindex.js`.
  #[arg(short, long)]
  pub output_dir: Option<PathBuf>,

  /// Language code selecting the stemmer and stopwords.
  #[arg(short, long)]
  pub language: Option<String>,

  /// Always index stems, even for short words.
  #[arg(long = "standard-stemming", action = clap::ArgAction::SetTrue)]
  pub standard_stemming: bool,

  /// Number of threads to use for reading sources.
  #[arg(short = 'p', long = "jobs")]
  pub jobs: Option<usize>,
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::panic, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn test_index_arguments() {
    let cli = Cli::try_parse_from([
      "quire",
      "-v",
      "-c",
      "base.toml",
      "-c",
      "local.toml",
      "--config",
      "release=1.2.0",
      "index",
      "-i",
      "docs",
      "--standard-stemming",
    ])
    .unwrap();

    assert!(cli.verbose);
    assert_eq!(cli.config_files.len(), 2);
    assert_eq!(cli.config_overrides, ["release=1.2.0"]);
    let Some(Commands::Index(args)) = cli.command else {
      panic!("expected the index command");
    };
    assert_eq!(args.input_dir, Some(PathBuf::from("docs")));
    assert!(args.standard_stemming);
    assert_eq!(args.language, None);
  }

  #[test]
  fn test_init_rejects_unknown_format() {
    assert!(Cli::try_parse_from(["quire", "init", "-F", "yaml"]).is_err());
  }

  #[test]
  fn test_command_is_optional() {
    let cli = Cli::try_parse_from(["quire"]).unwrap();
    assert!(cli.command.is_none());
  }
}
