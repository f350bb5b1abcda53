use std::sync::OnceLock;

use comrak::nodes::{AstNode, NodeValue};
use regex::Regex;

use crate::language::Language;

/// Words found in a document, in document order. Duplicates are kept.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollectedWords {
  /// Words found in headings.
  pub title_words: Vec<String>,

  /// Words found anywhere, headings included.
  pub words: Vec<String>,
}

/// Walks a parsed Markdown tree and collects its words.
///
/// Heading text counts as both a title word and a body word. Raw HTML is
/// reduced to its text, and HTML comments are skipped entirely.
pub struct WordCollector<'l> {
  language: &'l dyn Language,
  found:    CollectedWords,
}

impl<'l> WordCollector<'l> {
  #[must_use]
  pub fn new(language: &'l dyn Language) -> Self {
    Self {
      language,
      found: CollectedWords::default(),
    }
  }

  /// Collect every word under `root`.
  #[must_use]
  pub fn collect<'a>(mut self, root: &'a AstNode<'a>) -> CollectedWords {
    self.visit(root, false);
    self.found
  }

  fn visit<'a>(&mut self, node: &'a AstNode<'a>, in_title: bool) {
    let in_title = {
      let data = node.data.borrow();
      match &data.value {
        NodeValue::Text(text) => self.add_text(text, in_title),
        NodeValue::Code(code) => self.add_text(&code.literal, in_title),
        NodeValue::CodeBlock(block) => self.add_text(&block.literal, false),
        NodeValue::HtmlBlock(block) => {
          if !is_html_comment(&block.literal) {
            self.add_text(&html_to_text(&block.literal), false);
          }
        },
        NodeValue::HtmlInline(html) => {
          if !is_html_comment(html) {
            self.add_text(&html_to_text(html), in_title);
          }
        },
        _ => {},
      }
      in_title || matches!(data.value, NodeValue::Heading(_))
    };

    for child in node.children() {
      self.visit(child, in_title);
    }
  }

  fn add_text(&mut self, text: &str, in_title: bool) {
    let words = self.language.split(text);
    if words.is_empty() {
      return;
    }
    if in_title {
      self.found.title_words.extend(words.iter().cloned());
    }
    self.found.words.extend(words);
  }
}

/// Text of the first heading under `root`, if any.
#[must_use]
pub fn first_heading_text<'a>(root: &'a AstNode<'a>) -> Option<String> {
  root.descendants().find_map(|node| {
    if !matches!(node.data.borrow().value, NodeValue::Heading(_)) {
      return None;
    }

    let mut text = String::new();
    for child in node.descendants() {
      match &child.data.borrow().value {
        NodeValue::Text(t) => text.push_str(t),
        NodeValue::Code(code) => text.push_str(&code.literal),
        _ => {},
      }
    }
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
  })
}

fn is_html_comment(html: &str) -> bool {
  html.trim_start().starts_with("<!--")
}

/// Text content of raw HTML. Script and style elements carry no prose and
/// are dropped along with their contents.
fn html_to_text(html: &str) -> String {
  static NON_TEXT_REGEX: OnceLock<Regex> = OnceLock::new();
  static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
  let non_text_regex = NON_TEXT_REGEX.get_or_init(|| {
    #[allow(
      clippy::unwrap_used,
      reason = "regex pattern is statically known to be valid"
    )]
    Regex::new(r"(?is)<style\b.*?</style\s*>|<script\b.*?</script\s*>")
      .unwrap()
  });
  let tag_regex = TAG_REGEX.get_or_init(|| {
    #[allow(
      clippy::unwrap_used,
      reason = "regex pattern is statically known to be valid"
    )]
    Regex::new(r"<[^>]*>").unwrap()
  });

  let text = non_text_regex.replace_all(html, " ");
  let stripped = tag_regex.replace_all(&text, " ");
  html_escape::decode_html_entities(&stripped).into_owned()
}
