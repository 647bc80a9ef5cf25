//! Cancellation state shared by the workers of one search.

use crate::error::{Result, SearchError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A flag a caller can raise to stop a running search.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
  flag: Arc<AtomicBool>,
}

impl CancelToken {
  /// Creates a token that is not cancelled.
  pub fn new() -> Self {
    Self::default()
  }

  /// Requests cancellation.
  pub fn cancel(&self) {
    self.flag.store(true, Ordering::Relaxed);
  }

  /// Returns `true` once [`cancel`](Self::cancel) has been called on any clone.
  pub fn is_cancelled(&self) -> bool {
    self.flag.load(Ordering::Relaxed)
  }
}

/// The context a search runs under: a cancel token plus an optional deadline.
#[derive(Debug, Clone)]
pub struct ScanContext {
  token: CancelToken,
  deadline: Option<Instant>,
}

impl ScanContext {
  /// Creates a context watching `token`, expiring after `timeout` if given.
  pub fn new(token: CancelToken, timeout: Option<Duration>) -> Self {
    Self {
      token,
      deadline: timeout.map(|t| Instant::now() + t),
    }
  }

  /// Returns `true` if the token was raised or the deadline has passed.
  pub fn is_cancelled(&self) -> bool {
    self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
  }

  /// Fails with [`SearchError::Cancelled`] if the search should stop.
  pub fn check(&self) -> Result<()> {
    if self.is_cancelled() {
      Err(SearchError::Cancelled)
    } else {
      Ok(())
    }
  }
}
