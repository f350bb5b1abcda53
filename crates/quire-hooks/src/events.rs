use std::fmt;

use log::trace;

/// Callback run over a document's raw source before it is parsed.
///
/// Implementations mutate `source` in place. Closures of the form
/// `|docname: &str, source: &mut String| { ... }` implement this directly.
pub trait SourceReadHook: Send + Sync {
  fn source_read(&self, docname: &str, source: &mut String);
}

impl<F> SourceReadHook for F
where
  F: Fn(&str, &mut String) + Send + Sync,
{
  fn source_read(&self, docname: &str, source: &mut String) {
    self(docname, source);
  }
}

/// Handle returned by [`EventHooks::connect_source_read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

/// Registry of hooks the build emits events to.
///
/// Hooks run in the order they were connected, each seeing the output of the
/// previous one.
#[derive(Default)]
pub struct EventHooks {
  source_read: Vec<(ListenerId, Box<dyn SourceReadHook>)>,
  next_id:     usize,
}

impl EventHooks {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  pub fn connect_source_read<H>(&mut self, hook: H) -> ListenerId
  where
    H: SourceReadHook + 'static,
  {
    let id = ListenerId(self.next_id);
    self.next_id += 1;
    self.source_read.push((id, Box::new(hook)));
    id
  }

  /// Remove a previously connected hook. Returns `false` if `id` is unknown.
  pub fn disconnect(&mut self, id: ListenerId) -> bool {
    let before = self.source_read.len();
    self.source_read.retain(|(listener, _)| *listener != id);
    self.source_read.len() != before
  }

  /// Run every source-read hook over `source`.
  pub fn emit_source_read(&self, docname: &str, source: &mut String) {
    for (id, hook) in &self.source_read {
      trace!("Running source-read listener {} on {docname}", id.0);
      hook.source_read(docname, source);
    }
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.source_read.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.source_read.is_empty()
  }
}

impl fmt::Debug for EventHooks {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("EventHooks")
      .field("source_read", &self.source_read.len())
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_hooks_run_in_connection_order() {
    let mut hooks = EventHooks::new();
    hooks.connect_source_read(|_: &str, source: &mut String| {
      source.push('a');
    });
    hooks.connect_source_read(|_: &str, source: &mut String| {
      source.push('b');
    });

    let mut source = String::new();
    hooks.emit_source_read("index", &mut source);
    assert_eq!(source, "ab");
  }

  #[test]
  fn test_hook_sees_docname() {
    let mut hooks = EventHooks::new();
    hooks.connect_source_read(|docname: &str, source: &mut String| {
      source.insert_str(0, docname);
    });

    let mut source = ": body".to_string();
    hooks.emit_source_read("guide/intro", &mut source);
    assert_eq!(source, "guide/intro: body");
  }

  #[test]
  fn test_disconnect_removes_only_that_hook() {
    let mut hooks = EventHooks::new();
    let first = hooks.connect_source_read(|_: &str, source: &mut String| {
      source.push('1');
    });
    hooks.connect_source_read(|_: &str, source: &mut String| {
      source.push('2');
    });

    assert!(hooks.disconnect(first));
    assert!(!hooks.disconnect(first));
    assert_eq!(hooks.len(), 1);

    let mut source = String::new();
    hooks.emit_source_read("index", &mut source);
    assert_eq!(source, "2");
  }

  #[test]
  fn test_emit_without_hooks_leaves_source_alone() {
    let hooks = EventHooks::new();
    let mut source = "unchanged".to_string();
    hooks.emit_source_read("index", &mut source);
    assert_eq!(source, "unchanged");
    assert!(hooks.is_empty());
  }
}
