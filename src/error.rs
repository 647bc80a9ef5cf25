//! Error types returned by the engine and its storage adapters.

use thiserror::Error;

/// An error reported by one of the external collaborators: the record store,
/// the collection provider or the cache store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
  /// The backend could not be reached at all.
  #[error("store unavailable: {0}")]
  Unavailable(String),
  /// The backend was reached but the operation failed.
  #[error("store error: {0}")]
  Backend(String),
}

/// The error type of a search call.
///
/// Cache failures never show up here; they are logged and treated as a miss
/// (on read) or a no-op (on write).
#[derive(Debug, Error)]
pub enum SearchError {
  /// The record store or the collection provider failed.
  #[error(transparent)]
  Store(#[from] StoreError),
  /// The search was cancelled or ran past its deadline.
  #[error("search cancelled")]
  Cancelled,
  /// The worker pool could not be created.
  #[error("failed to build worker pool: {0}")]
  WorkerPool(String),
}

/// A specialized `Result` for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
