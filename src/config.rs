//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::time::Duration;

/// Where records lacking the requested sort key end up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingKeyOrder {
  /// A missing key compares greater than any value. Records without the key
  /// come last in ascending order and first in descending order.
  #[default]
  Greatest,
  /// Records without the key always come last.
  AlwaysLast,
}

/// Settings that control an engine instance.
///
/// Every field has a default, so a partial document deserializes fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
  /// The number of results per page.
  #[serde(default = "default_page_size")]
  pub page_size: usize,
  /// The size of the scan worker pool. `0` uses the detected parallelism.
  #[serde(default)]
  pub workers: usize,
  /// A deadline for each search in milliseconds. A value of 0 means no
  /// deadline.
  #[serde(default)]
  pub timeout_ms: u64,
  /// Placement of records lacking the sort key.
  #[serde(default)]
  pub missing_keys: MissingKeyOrder,
}

fn default_page_size() -> usize {
  100
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self {
      page_size: default_page_size(),
      workers: 0,
      timeout_ms: 0,
      missing_keys: MissingKeyOrder::default(),
    }
  }
}

impl SearchConfig {
  /// Sets the page size.
  pub fn page_size(mut self, page_size: usize) -> Self {
    self.page_size = page_size;
    self
  }

  /// Sets the worker pool size.
  pub fn workers(mut self, workers: usize) -> Self {
    self.workers = workers;
    self
  }

  /// Sets the per-search deadline in milliseconds.
  pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
    self.timeout_ms = timeout_ms;
    self
  }

  /// Sets the placement of records lacking the sort key.
  pub fn missing_keys(mut self, order: MissingKeyOrder) -> Self {
    self.missing_keys = order;
    self
  }

  /// The worker count to use, resolving `0` to the detected parallelism.
  pub fn resolved_workers(&self) -> usize {
    if self.workers > 0 {
      return self.workers;
    }
    std::thread::available_parallelism()
      .map(NonZeroUsize::get)
      .unwrap_or(1)
  }

  /// The per-search deadline, if any.
  pub fn timeout(&self) -> Option<Duration> {
    (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_documents_use_defaults() {
    let config: SearchConfig = serde_json::from_str(r#"{"workers": 3}"#).unwrap();
    assert_eq!(config.page_size, 100);
    assert_eq!(config.resolved_workers(), 3);
    assert_eq!(config.timeout(), None);
    assert_eq!(config.missing_keys, MissingKeyOrder::Greatest);
  }

  #[test]
  fn zero_workers_means_detected() {
    assert!(SearchConfig::default().resolved_workers() >= 1);
  }

  #[test]
  fn reads_missing_key_order() {
    let config: SearchConfig = serde_json::from_str(r#"{"missing_keys": "always_last"}"#).unwrap();
    assert_eq!(config.missing_keys, MissingKeyOrder::AlwaysLast);
  }
}
