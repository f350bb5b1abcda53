//! Hooks that run over raw document sources before they are parsed.
//!
//! [`EventHooks`] is the registry the build drives. Two stock hooks are
//! provided: [`Substitutions`] fills literal placeholders such as
//! `{version_num}` everywhere, including inside code blocks, and
//! [`MarkupSubstitutions`] expands `{{ name }}` references outside code.
pub mod events;
pub mod markup;
pub mod substitution;

pub use events::{EventHooks, ListenerId, SourceReadHook};
pub use markup::MarkupSubstitutions;
pub use substitution::{ReplacementTable, Substitutions};
