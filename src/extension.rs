//! Defines the extension system for tagsift.

use crate::types::{MatchResult, Query};

/// A trait for extensions that can hook into the search lifecycle.
///
/// Extensions can rewrite queries, adjust freshly scanned results before
/// they are sorted and cached, and touch up the final page.
///
/// # Examples
///
/// Implementing a simple logging extension:
///
/// ```rust
/// use tagsift::prelude::*;
///
/// struct LoggingExtension;
///
/// impl SearchExtension for LoggingExtension {
///     fn before_query(&self, query: &mut Query) {
///         println!("Processing filter: {}", query.filter_text);
///     }
///
///     fn after_page(&self, _query: &Query, page: &mut Vec<MatchResult>) {
///         println!("Returning {} results", page.len());
///     }
/// }
/// ```
pub trait SearchExtension: Send + Sync {
  /// Called before anything else happens.
  ///
  /// Changes made here are part of the cache signature, so a rewriting
  /// extension shares cache entries with queries it rewrites to.
  fn before_query(&self, _query: &mut Query) {}

  /// Called on a cache miss, after the scan and before sorting.
  ///
  /// Whatever is left in `results` gets sorted and cached.
  fn after_scan(&self, _query: &Query, _results: &mut Vec<MatchResult>) {}

  /// Called on the final page, on cache hits and misses alike.
  fn after_page(&self, _query: &Query, _page: &mut Vec<MatchResult>) {}
}
