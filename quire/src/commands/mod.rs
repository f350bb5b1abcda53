pub mod index;
pub mod init;
pub mod substitute;

use quire_config::Config;
use quire_hooks::{EventHooks, Substitutions};

/// Source-read hooks for `config`: `{{ name }}` substitutions first, then
/// the literal replacements.
///
/// The literal `{version_num}` key also matches inside `{{version_num}}`, so
/// markup references must be expanded before it runs.
#[must_use]
pub fn source_read_hooks(config: &Config) -> EventHooks {
  let mut hooks = EventHooks::new();

  hooks.connect_source_read(config.markup_substitutions());

  let table = config.replacement_table();
  if !table.is_empty() {
    hooks.connect_source_read(Substitutions::new(table));
  }

  hooks
}
