use std::path::PathBuf;

use color_eyre::eyre::{Context, Result, bail};
use log::{info, warn};
use quire_config::Config;
use quire_search::IndexBuilder;

use crate::{
  cli::IndexArgs,
  commands::source_read_hooks,
  sources::{self, Excludes},
};

/// File name of the frozen index inside the output directory.
pub const SEARCH_INDEX_FILE: &str = "searchindex.js";

/// Apply command line options on top of the loaded configuration.
pub fn apply_args(config: &mut Config, args: &IndexArgs) {
  if let Some(ref input_dir) = args.input_dir {
    config.input_dir = Some(input_dir.clone());
  }
  if let Some(ref output_dir) = args.output_dir {
    config.output_dir.clone_from(output_dir);
  }
  if args.jobs.is_some() {
    config.jobs = args.jobs;
  }

  if args.language.is_some() || args.standard_stemming {
    let search = config.search.get_or_insert_with(Default::default);
    if let Some(ref language) = args.language {
      search.language.clone_from(language);
    }
    if args.standard_stemming {
      search.standard_stemming = true;
    }
  }
}

/// Build the search index for every markdown source under the input
/// directory and write it to the output directory.
///
/// Returns the path of the written index, or `None` when search is disabled.
///
/// # Errors
///
/// Returns an error if no input directory is configured, a source cannot be
/// read, or the index cannot be written.
pub fn run(config: &Config) -> Result<Option<PathBuf>> {
  if !config.is_search_enabled() {
    info!("Search is disabled, not building an index");
    return Ok(None);
  }

  let Some(ref input_dir) = config.input_dir else {
    bail!(
      "No input directory configured. Pass --input-dir or set input_dir in \
       the configuration file."
    );
  };
  config.validate_paths()?;

  let excludes = Excludes::new(&config.exclude_patterns)?;
  let files = sources::collect_markdown_files(input_dir, &excludes)?;

  let hooks = source_read_hooks(config);
  let thread_count = config.jobs.unwrap_or_else(num_cpus::get);
  let pool = rayon::ThreadPoolBuilder::new()
    .num_threads(thread_count)
    .build()
    .wrap_err("Failed to build thread pool")?;
  let sources =
    pool.install(|| sources::read_sources(input_dir, &files, &hooks))?;

  let search = config.search_options();
  let mut builder = IndexBuilder::for_language(
    &search.language,
    search.standard_stemming,
    search.short_term_length,
  );
  info!(
    "Indexing {} documents ({} stemming, language '{}')",
    sources.len(),
    builder.feed_name(),
    builder.language().code()
  );

  for source in &sources {
    builder.feed_source(&source.docname, &source.filename, &source.text);
  }

  if !sources.is_empty() && !builder.titles().contains_key(&config.master_doc)
  {
    warn!(
      "Master document '{}' was not found among the sources",
      config.master_doc
    );
  }

  let path = config.output_dir.join(SEARCH_INDEX_FILE);
  builder
    .freeze()
    .write_to(&path)
    .wrap_err_with(|| format!("Failed to write {}", path.display()))?;

  Ok(Some(path))
}
