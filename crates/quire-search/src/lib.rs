//! Search index building for Quire.
//!
//! An [`IndexBuilder`] accumulates, per document, a title, an output filename
//! and two word indices: one for words found in headings and one for words
//! found anywhere else. How words become index keys is decided by a [`Feed`]
//! strategy chosen when the builder is constructed:
//!
//! - [`StandardFeed`] indexes the stem, falling back to the raw word only
//!   when the stem fails the stopword filter and the word passes it.
//! - [`ShortTermFeed`] also falls back to the literal word when the stem is
//!   short, so words like "iOS" are not reduced to "io".
//!
//! Stemming and stopword filtering come from a [`Language`]; Markdown is
//! parsed with `comrak` and walked by the [`WordCollector`]. Once every
//! document is fed, [`IndexBuilder::freeze`] produces the compact
//! [`SearchIndexData`] consumed by the search frontend.
pub mod builder;
pub mod cache;
pub mod collector;
pub mod error;
pub mod feed;
pub mod frozen;
pub mod language;

pub use builder::{IndexBuilder, IndexEntries, TermIndex};
pub use cache::StemCache;
pub use collector::{CollectedWords, WordCollector};
pub use error::SearchError;
pub use feed::{Feed, ShortTermFeed, StandardFeed};
pub use frozen::{DocRefs, SearchIndexData};
pub use language::{Language, SnowballLanguage};
