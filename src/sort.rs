//! Sort key extraction and natural-order comparison of match results.

use crate::config::MissingKeyOrder;
use crate::types::{MatchResult, DEFAULT_SORT_KEY};
use std::cmp::Ordering;

/// The value a record is sorted by.
///
/// Values are lower-cased on extraction. `Missing` stands for a record
/// without the requested tag namespace. It compares greater than every real
/// value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
  /// A value taken from the title or from a `namespace:value` tag.
  Value(String),
  /// The record has no value for the key.
  Missing,
}

impl SortKey {
  fn natural_cmp(&self, other: &Self) -> Ordering {
    match (self, other) {
      (SortKey::Value(a), SortKey::Value(b)) => cmp_folded(a, b),
      (SortKey::Value(_), SortKey::Missing) => Ordering::Less,
      (SortKey::Missing, SortKey::Value(_)) => Ordering::Greater,
      (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
    }
  }
}

/// Extracts the sort key of a result.
///
/// `"title"` returns the lower-cased title. Any other key is read as a tag
/// namespace: the value of the first `key:value` entry in the tag string,
/// trimmed and lower-cased.
pub fn extract_key(result: &MatchResult, sort_key: &str) -> SortKey {
  if sort_key.is_empty() || sort_key.eq_ignore_ascii_case(DEFAULT_SORT_KEY) {
    return SortKey::Value(result.title.to_lowercase());
  }

  result
    .tags
    .split(',')
    .filter_map(|entry| entry.trim().split_once(':'))
    .find(|(namespace, _)| namespace.trim().eq_ignore_ascii_case(sort_key))
    .map(|(_, value)| SortKey::Value(value.trim().to_lowercase()))
    .unwrap_or(SortKey::Missing)
}

/// Compares two results by sort key.
///
/// Descending order swaps the keys before comparing them, so with
/// [`MissingKeyOrder::Greatest`] missing keys come last when ascending and
/// first when descending. [`MissingKeyOrder::AlwaysLast`] keeps them last in
/// both directions. Ties are broken by ascending id.
pub fn compare(
  a: &MatchResult,
  b: &MatchResult,
  sort_key: &str,
  descending: bool,
  missing: MissingKeyOrder,
) -> Ordering {
  compare_keys(
    &extract_key(a, sort_key),
    &extract_key(b, sort_key),
    descending,
    missing,
  )
  .then_with(|| a.id.cmp(&b.id))
}

fn compare_keys(a: &SortKey, b: &SortKey, descending: bool, missing: MissingKeyOrder) -> Ordering {
  if missing == MissingKeyOrder::AlwaysLast {
    match (a, b) {
      (SortKey::Missing, SortKey::Value(_)) => return Ordering::Greater,
      (SortKey::Value(_), SortKey::Missing) => return Ordering::Less,
      _ => {}
    }
  }

  if descending {
    b.natural_cmp(a)
  } else {
    a.natural_cmp(b)
  }
}

/// Sorts results in place.
///
/// Keys are extracted once per result rather than once per comparison.
pub fn sort_results(
  results: &mut Vec<MatchResult>,
  sort_key: &str,
  descending: bool,
  missing: MissingKeyOrder,
) {
  let mut keyed: Vec<(SortKey, MatchResult)> = results
    .drain(..)
    .map(|result| (extract_key(&result, sort_key), result))
    .collect();

  keyed.sort_by(|(ka, a), (kb, b)| {
    compare_keys(ka, kb, descending, missing).then_with(|| a.id.cmp(&b.id))
  });

  results.extend(keyed.into_iter().map(|(_, result)| result));
}

/// Compares two strings in natural order.
///
/// Runs of ASCII digits compare by numeric value, everything else compares
/// character by character, ignoring case. When two strings only differ in
/// leading zeros, the one with fewer zeros sorts first.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
  cmp_folded(&a.to_lowercase(), &b.to_lowercase())
}

/// Natural comparison of two strings that are already lower-cased.
fn cmp_folded(mut a: &str, mut b: &str) -> Ordering {
  let mut zeros = Ordering::Equal;

  loop {
    let (x, y) = match (a.chars().next(), b.chars().next()) {
      (None, None) => return zeros,
      (None, Some(_)) => return Ordering::Less,
      (Some(_), None) => return Ordering::Greater,
      (Some(x), Some(y)) => (x, y),
    };

    if x.is_ascii_digit() && y.is_ascii_digit() {
      let (run_a, rest_a) = split_digits(a);
      let (run_b, rest_b) = split_digits(b);
      let num_a = run_a.trim_start_matches('0');
      let num_b = run_b.trim_start_matches('0');

      let ord = num_a
        .len()
        .cmp(&num_b.len())
        .then_with(|| num_a.cmp(num_b));
      if ord != Ordering::Equal {
        return ord;
      }
      if zeros == Ordering::Equal {
        zeros = run_a.len().cmp(&run_b.len());
      }
      a = rest_a;
      b = rest_b;
    } else {
      if x != y {
        return x.cmp(&y);
      }
      a = &a[x.len_utf8()..];
      b = &b[y.len_utf8()..];
    }
  }
}

/// Splits a leading run of ASCII digits off `s`.
fn split_digits(s: &str) -> (&str, &str) {
  let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
  s.split_at(end)
}
