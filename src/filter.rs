//! Parsing of the tag filter language.
//!
//! A filter is a sequence of whitespace separated clauses:
//!
//! ```text
//! clause := ["-"] term
//! term   := '"' text '"' ["$"] | text ["$"]
//! ```
//!
//! A leading `-` negates the clause and a trailing `$` requires the text to
//! equal a complete tag entry. For quoted terms the `$` may sit on either
//! side of the closing quote. Inside `text`, `?` and `_` stand for a single
//! character while `*` and `%` stand for any run of characters.
//!
//! The parser never fails. Malformed input is read as literal text.

use serde::{Deserialize, Serialize};

/// A single parsed clause of a filter expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clause {
  /// The clause text, wildcards still unexpanded.
  pub text: String,
  /// The clause is satisfied when the text does *not* match.
  pub negated: bool,
  /// The text has to equal a whole comma-delimited entry.
  pub exact: bool,
}

impl Clause {
  fn new(text: impl Into<String>, negated: bool, exact: bool) -> Self {
    Self {
      text: text.into(),
      negated,
      exact,
    }
  }
}

/// Splits a filter string into clauses.
///
/// Each call works on its own cursor, so any number of filters can be parsed
/// concurrently. Empty clauses (such as `""`) are dropped.
pub fn parse_filter(input: &str) -> Vec<Clause> {
  let mut cursor = Cursor::new(input);
  let mut clauses = Vec::new();

  while let Some(clause) = cursor.next_clause() {
    if !clause.text.is_empty() {
      clauses.push(clause);
    }
  }

  clauses
}

/// A read position into the filter string.
struct Cursor<'a> {
  input: &'a str,
  pos: usize,
}

impl<'a> Cursor<'a> {
  fn new(input: &'a str) -> Self {
    Self { input, pos: 0 }
  }

  fn rest(&self) -> &'a str {
    &self.input[self.pos..]
  }

  fn peek(&self) -> Option<char> {
    self.rest().chars().next()
  }

  fn bump(&mut self, c: char) {
    self.pos += c.len_utf8();
  }

  fn skip_whitespace(&mut self) {
    while let Some(c) = self.peek() {
      if !c.is_whitespace() {
        break;
      }
      self.bump(c);
    }
  }

  fn next_clause(&mut self) -> Option<Clause> {
    self.skip_whitespace();
    let first = self.peek()?;

    let mut negated = false;
    if first == '-' {
      self.bump(first);
      match self.peek() {
        // A dangling minus is just a minus.
        None => return Some(Clause::new("-", false, false)),
        Some(c) if c.is_whitespace() => return Some(Clause::new("-", false, false)),
        Some(_) => negated = true,
      }
    }

    if self.peek() == Some('"') {
      self.bump('"');
      Some(self.quoted(negated))
    } else {
      Some(self.bare(negated))
    }
  }

  fn quoted(&mut self, negated: bool) -> Clause {
    let rest = self.rest();
    match rest.find('"') {
      Some(end) => {
        let mut text = &rest[..end];
        self.pos += end + 1;
        let mut exact = self.peek() == Some('$');
        if exact {
          self.bump('$');
        }
        if let Some(stripped) = text.strip_suffix('$') {
          text = stripped;
          exact = true;
        }
        // Text glued to the closing quote starts the next clause.
        Clause::new(text, negated, exact)
      }
      None => {
        self.pos = self.input.len();
        Clause::new(rest.trim_end(), negated, false)
      }
    }
  }

  fn bare(&mut self, negated: bool) -> Clause {
    let word = self.take_until_whitespace();
    match word.strip_suffix('$') {
      Some(text) if !text.is_empty() => Clause::new(text, negated, true),
      _ => Clause::new(word, negated, false),
    }
  }

  fn take_until_whitespace(&mut self) -> &'a str {
    let rest = self.rest();
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    self.pos += end;
    &rest[..end]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn clause(text: &str, negated: bool, exact: bool) -> Clause {
    Clause::new(text, negated, exact)
  }

  #[test]
  fn splits_on_whitespace() {
    assert_eq!(
      parse_filter("  cat   dog "),
      vec![clause("cat", false, false), clause("dog", false, false)]
    );
  }

  #[test]
  fn reads_negation_and_exact_markers() {
    assert_eq!(
      parse_filter("-cat dog$ -\"artist:bob ross\"$"),
      vec![
        clause("cat", true, false),
        clause("dog", false, true),
        clause("artist:bob ross", true, true),
      ]
    );
  }

  #[test]
  fn exact_marker_inside_or_after_quotes() {
    assert_eq!(parse_filter("\"cat$\""), vec![clause("cat", false, true)]);
    assert_eq!(parse_filter("\"cat\"$"), vec![clause("cat", false, true)]);
  }

  #[test]
  fn text_after_a_closing_quote_is_the_next_clause() {
    assert_eq!(
      parse_filter("\"cat\"dog -\"big\"$-fish"),
      vec![
        clause("cat", false, false),
        clause("dog", false, false),
        clause("big", true, true),
        clause("fish", true, false),
      ]
    );
  }

  #[test]
  fn unterminated_quote_is_literal() {
    assert_eq!(
      parse_filter("dog \"big cat  "),
      vec![clause("dog", false, false), clause("big cat", false, false)]
    );
  }

  #[test]
  fn dangling_minus_is_literal() {
    assert_eq!(parse_filter("-"), vec![clause("-", false, false)]);
    assert_eq!(
      parse_filter("- cat"),
      vec![clause("-", false, false), clause("cat", false, false)]
    );
  }

  #[test]
  fn drops_empty_clauses() {
    assert_eq!(parse_filter("\"\" -\"\"   "), Vec::<Clause>::new());
  }

  #[test]
  fn lone_dollar_is_literal() {
    assert_eq!(parse_filter("$"), vec![clause("$", false, false)]);
  }
}
