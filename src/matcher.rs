//! Evaluation of filter expressions against tag text.

use crate::filter::{parse_filter, Clause};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

/// Tests a tag blob against a filter expression.
///
/// This compiles the filter on every call. When the same filter is applied
/// to many records, build a [`CompiledFilter`] once instead.
///
/// # Examples
///
/// ```rust
/// use tagsift::matcher::matches;
///
/// assert!(matches("cat dog", "cat,dog,toy"));
/// assert!(!matches("-cat", "cat,dog"));
/// assert!(matches("\"cat$\"", "cat,dog"));
/// assert!(!matches("\"cat$\"", "category,dog"));
/// ```
pub fn matches(filter_text: &str, tag_blob: &str) -> bool {
  CompiledFilter::new(filter_text).matches(tag_blob)
}

/// A filter expression compiled into one test per clause.
///
/// The filter holds no mutable state and is `Send + Sync`, so a single
/// instance can be shared by every scan worker.
#[derive(Debug, Clone, Default)]
pub struct CompiledFilter {
  tests: Vec<ClauseTest>,
}

impl CompiledFilter {
  /// Parses and compiles a filter. An empty filter matches everything.
  ///
  /// Identical clauses are compiled once and shared.
  pub fn new(filter_text: &str) -> Self {
    let mut compiled: HashMap<(String, bool), Matcher> = HashMap::new();
    let tests = parse_filter(filter_text)
      .into_iter()
      .map(|clause| {
        let matcher = compiled
          .entry((clause.text.clone(), clause.exact))
          .or_insert_with(|| Matcher::compile(&clause))
          .clone();
        ClauseTest {
          matcher,
          negated: clause.negated,
        }
      })
      .collect();

    Self { tests }
  }

  /// Returns `true` if this filter has no clauses and so accepts anything.
  pub fn is_empty(&self) -> bool {
    self.tests.is_empty()
  }

  /// The number of clauses in the filter.
  pub fn len(&self) -> usize {
    self.tests.len()
  }

  /// Returns `true` when every clause is satisfied by `tag_blob`.
  pub fn matches(&self, tag_blob: &str) -> bool {
    self
      .tests
      .iter()
      .all(|test| test.matcher.is_match(tag_blob) != test.negated)
  }
}

#[derive(Debug, Clone)]
struct ClauseTest {
  matcher: Matcher,
  negated: bool,
}

#[derive(Debug, Clone)]
enum Matcher {
  Pattern(Regex),
  /// Lower-cased literal text, used when the pattern cannot be built.
  Literal(String),
}

impl Matcher {
  fn compile(clause: &Clause) -> Self {
    let pattern = clause_pattern(clause);
    match RegexBuilder::new(&pattern)
      .case_insensitive(true)
      .dot_matches_new_line(true)
      .build()
    {
      Ok(regex) => Matcher::Pattern(regex),
      Err(err) => {
        tracing::debug!(clause = %clause.text, error = %err, "falling back to literal clause");
        Matcher::Literal(clause.text.to_lowercase())
      }
    }
  }

  fn is_match(&self, haystack: &str) -> bool {
    match self {
      Matcher::Pattern(regex) => regex.is_match(haystack),
      Matcher::Literal(text) => haystack.to_lowercase().contains(text.as_str()),
    }
  }
}

/// Builds the regex source for a clause.
///
/// Exact clauses are anchored to one comma-delimited entry; whitespace after
/// the separating comma is ignored.
fn clause_pattern(clause: &Clause) -> String {
  let body = glob_to_regex(&clause.text, clause.exact);
  if clause.exact {
    format!(r"(?:^|,)\s*{body}(?:,|$)")
  } else {
    body
  }
}

/// Translates wildcard text into regex source, escaping everything else.
///
/// In exact clauses the wildcards stay inside a single tag entry.
fn glob_to_regex(text: &str, exact: bool) -> String {
  let (one, any) = if exact { ("[^,]", "[^,]*") } else { (".", ".*") };
  let mut out = String::with_capacity(text.len() * 2);
  let mut buf = [0u8; 4];
  for c in text.chars() {
    match c {
      '?' | '_' => out.push_str(one),
      '*' | '%' => out.push_str(any),
      _ => out.push_str(&regex::escape(c.encode_utf8(&mut buf))),
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn escapes_regex_syntax() {
    assert_eq!(glob_to_regex("a.b(c)", false), r"a\.b\(c\)");
    assert_eq!(glob_to_regex("c?t_*%", false), "c.t..*.*");
    assert_eq!(glob_to_regex("c?t*", true), "c[^,]t[^,]*");
  }

  #[test]
  fn shares_identical_clauses() {
    let filter = CompiledFilter::new("cat -cat cat$");
    assert_eq!(filter.len(), 3);
    assert!(!filter.matches("cat,dog"));
  }

  #[test]
  fn literal_fallback_is_case_insensitive() {
    let matcher = Matcher::Literal("cat".to_string());
    assert!(matcher.is_match("Big CAT,dog"));
    assert!(!matcher.is_match("dog"));
  }
}
