//! Memoization of fully sorted search results.
//!
//! Entries are keyed by a [`Signature`] of every query parameter that affects
//! the result list. The page offset is deliberately not part of it: pages are
//! cut from the cached list.

use crate::context::ScanContext;
use crate::index::adapter::CacheStore;
use crate::types::{MatchResult, Query};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use xxhash_rust::xxh3::xxh3_128;

/// A deterministic key for the result list of a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(String);

/// The fields of a query that determine its result list.
#[derive(Serialize)]
struct SignatureFields<'a> {
  collection: Option<&'a str>,
  filter: &'a str,
  sort_key: &'a str,
  descending: bool,
  new_only: bool,
  untagged_only: bool,
}

impl Signature {
  /// Computes the signature of `query`.
  ///
  /// An unset sort key signs the same as `"title"`, since both sort alike.
  pub fn of(query: &Query) -> Self {
    let fields = SignatureFields {
      collection: query.collection.as_deref(),
      filter: &query.filter_text,
      sort_key: query.effective_sort_key(),
      descending: query.sort_descending,
      new_only: query.new_only,
      untagged_only: query.untagged_only,
    };
    // Serializing a struct of strings and bools cannot fail.
    let encoded = serde_json::to_vec(&fields).unwrap_or_default();
    Self(format!("search:{:032x}", xxh3_128(&encoded)))
  }

  /// The signature as a cache key.
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Signature {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// A best-effort cache of sorted result lists.
///
/// Neither reads nor writes can fail from the caller's point of view: a read
/// problem is a miss and a write problem is dropped. Both are logged.
#[derive(Clone)]
pub struct ResultCache {
  store: Arc<dyn CacheStore>,
}

impl fmt::Debug for ResultCache {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ResultCache").finish_non_exhaustive()
  }
}

impl ResultCache {
  /// Wraps a cache store.
  pub fn new(store: Arc<dyn CacheStore>) -> Self {
    Self { store }
  }

  /// Looks up the results stored under `signature`.
  pub fn get(&self, signature: &Signature, ctx: &ScanContext) -> Option<Vec<MatchResult>> {
    if ctx.is_cancelled() {
      return None;
    }

    let bytes = match self.store.get(signature.as_str()) {
      Ok(Some(bytes)) => bytes,
      Ok(None) => return None,
      Err(err) => {
        tracing::warn!(%signature, error = %err, "cache read failed, treating as miss");
        return None;
      }
    };

    match serde_json::from_slice(&bytes) {
      Ok(results) => Some(results),
      Err(err) => {
        tracing::warn!(%signature, error = %err, "cached entry is corrupt, treating as miss");
        None
      }
    }
  }

  /// Stores `results` under `signature`, unless the search was cancelled.
  pub fn put(&self, signature: &Signature, results: &[MatchResult], ctx: &ScanContext) {
    if ctx.is_cancelled() {
      return;
    }

    let bytes = match serde_json::to_vec(results) {
      Ok(bytes) => bytes,
      Err(err) => {
        tracing::warn!(%signature, error = %err, "failed to encode results for the cache");
        return;
      }
    };

    if let Err(err) = self.store.set(signature.as_str(), bytes) {
      tracing::warn!(%signature, error = %err, "cache write failed");
    }
  }
}
