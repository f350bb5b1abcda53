//! `{{ name }}` substitutions that leave code untouched.
//!
//! Unlike [`crate::ReplacementTable`], these follow Markdown structure: fenced
//! code blocks and inline code spans are copied verbatim, so documentation
//! can show the substitution syntax itself.
use std::sync::OnceLock;

use indexmap::IndexMap;
use log::warn;
use regex::{Captures, Regex};

use crate::events::SourceReadHook;

/// Source-read hook that expands `{{ name }}` references outside code.
#[derive(Debug, Clone, Default)]
pub struct MarkupSubstitutions {
  values: IndexMap<String, String>,
}

impl MarkupSubstitutions {
  #[must_use]
  pub const fn new(values: IndexMap<String, String>) -> Self {
    Self { values }
  }

  #[must_use]
  pub fn get(&self, name: &str) -> Option<&str> {
    self.values.get(name).map(String::as_str)
  }

  /// Expand references in `source`. Unknown names are left as written.
  #[must_use]
  pub fn expand(&self, docname: &str, source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut fence: Option<(char, usize)> = None;

    for line in source.split_inclusive('\n') {
      let trimmed = line.trim_start();
      if let Some((marker, len)) = fence {
        out.push_str(line);
        if is_closing_fence(trimmed, marker, len) {
          fence = None;
        }
        continue;
      }

      if let Some(open) = fence_marker(trimmed) {
        fence = Some(open);
        out.push_str(line);
        continue;
      }

      self.expand_line(docname, line, &mut out);
    }

    out
  }

  fn expand_line(&self, docname: &str, line: &str, out: &mut String) {
    let bytes = line.as_bytes();
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len() {
      if bytes[i] != b'`' {
        i += 1;
        continue;
      }

      let run = count_run(bytes, i, b'`');
      if let Some(close) = find_closing_run(bytes, i + run, run) {
        self.expand_plain(docname, &line[plain_start..i], out);
        out.push_str(&line[i..close + run]);
        i = close + run;
        plain_start = i;
      } else {
        i += run;
      }
    }

    self.expand_plain(docname, &line[plain_start..], out);
  }

  fn expand_plain(&self, docname: &str, text: &str, out: &mut String) {
    if !text.contains("{{") {
      out.push_str(text);
      return;
    }

    let expanded = reference_regex().replace_all(text, |caps: &Captures| {
      let name = &caps[1];
      self.values.get(name).map_or_else(
        || {
          warn!("Unknown substitution '{name}' in {docname}");
          caps[0].to_string()
        },
        Clone::clone,
      )
    });
    out.push_str(&expanded);
  }
}

impl SourceReadHook for MarkupSubstitutions {
  fn source_read(&self, docname: &str, source: &mut String) {
    if self.values.is_empty() || !source.contains("{{") {
      return;
    }
    *source = self.expand(docname, source);
  }
}

fn reference_regex() -> &'static Regex {
  static REFERENCE: OnceLock<Regex> = OnceLock::new();
  REFERENCE.get_or_init(|| {
    #[allow(
      clippy::unwrap_used,
      reason = "regex pattern is statically known to be valid"
    )]
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_-]*)\s*\}\}").unwrap()
  })
}

/// Returns the fence character and length when `line` opens or closes a
/// fenced code block.
fn fence_marker(line: &str) -> Option<(char, usize)> {
  let first = line.chars().next()?;
  if first != '`' && first != '~' {
    return None;
  }
  let len = line.chars().take_while(|c| *c == first).count();
  (len >= 3).then_some((first, len))
}

/// A closing fence repeats the opening marker at least as many times and
/// carries no info string.
fn is_closing_fence(line: &str, marker: char, len: usize) -> bool {
  let run = line.chars().take_while(|c| *c == marker).count();
  run >= len && line[run * marker.len_utf8()..].trim().is_empty()
}

fn count_run(bytes: &[u8], start: usize, byte: u8) -> usize {
  bytes[start..].iter().take_while(|b| **b == byte).count()
}

fn find_closing_run(bytes: &[u8], from: usize, len: usize) -> Option<usize> {
  let mut i = from;
  while i < bytes.len() {
    if bytes[i] == b'`' {
      let run = count_run(bytes, i, b'`');
      if run == len {
        return Some(i);
      }
      i += run;
    } else {
      i += 1;
    }
  }
  None
}

#[cfg(test)]
mod tests {
  use super::*;

  fn subs() -> MarkupSubstitutions {
    MarkupSubstitutions::new(IndexMap::from([
      ("version_num".to_string(), "v0.1.0".to_string()),
      (
        "info_url".to_string(),
        "[information website](https://example.com/)".to_string(),
      ),
    ]))
  }

  #[test]
  fn test_expands_references_with_optional_spaces() {
    assert_eq!(
      subs().expand("index", "Release {{version_num}}, see {{ info_url }}."),
      "Release v0.1.0, see [information website](https://example.com/)."
    );
  }

  #[test]
  fn test_leaves_inline_code_alone() {
    assert_eq!(
      subs().expand("index", "Write `{{ version_num }}` to get {{ version_num }}"),
      "Write `{{ version_num }}` to get v0.1.0"
    );
  }

  #[test]
  fn test_leaves_fenced_blocks_alone() {
    let source =
      "{{ version_num }}\n```sh\necho {{ version_num }}\n```\n{{ version_num }}\n";
    assert_eq!(
      subs().expand("index", source),
      "v0.1.0\n```sh\necho {{ version_num }}\n```\nv0.1.0\n"
    );
  }

  #[test]
  fn test_longer_fence_needs_matching_close() {
    let source = "````\n```\n{{ version_num }}\n````\n{{ version_num }}";
    assert_eq!(
      subs().expand("index", source),
      "````\n```\n{{ version_num }}\n````\nv0.1.0"
    );
  }

  #[test]
  fn test_fence_with_info_string_does_not_close() {
    let source = "```\n```sh\n{{ version_num }}\n```\n{{ version_num }}";
    assert_eq!(
      subs().expand("index", source),
      "```\n```sh\n{{ version_num }}\n```\nv0.1.0"
    );
  }

  #[test]
  fn test_closing_fence_allows_trailing_whitespace() {
    let source = "~~~\n{{ version_num }}\n~~~  \n{{ version_num }}";
    assert_eq!(
      subs().expand("index", source),
      "~~~\n{{ version_num }}\n~~~  \nv0.1.0"
    );
  }

  #[test]
  fn test_unknown_reference_is_kept() {
    assert_eq!(subs().expand("index", "{{ nope }}"), "{{ nope }}");
  }

  #[test]
  fn test_unclosed_backtick_is_plain_text() {
    assert_eq!(
      subs().expand("index", "a ` b {{ version_num }}"),
      "a ` b v0.1.0"
    );
  }
}
