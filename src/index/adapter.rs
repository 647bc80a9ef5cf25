//! Traits for the storage backends the engine consumes.

use crate::error::StoreError;
use crate::types::{Collection, EntityId, Record};
use std::collections::HashSet;

/// The record store holding every archive entry.
///
/// The `Send` and `Sync` bounds are required because scan workers share the
/// store across threads. Workers never share a reader, though: each one calls
/// [`connect`](RecordStore::connect) for its own.
pub trait RecordStore: Send + Sync {
  /// Lists record ids in a stable order.
  ///
  /// With a `scope`, only ids that are both in the scope and in the store are
  /// returned.
  fn list_ids(&self, scope: Option<&HashSet<EntityId>>) -> Result<Vec<EntityId>, StoreError>;

  /// Returns the ids of every record without tags.
  fn untagged_ids(&self) -> Result<HashSet<EntityId>, StoreError>;

  /// Opens a reader for one scan worker.
  fn connect(&self) -> Result<Box<dyn RecordReader + '_>, StoreError>;
}

/// A connection to the record store used by a single worker.
pub trait RecordReader {
  /// Fetches a record, or `None` if the id is unknown.
  fn get_record(&mut self, id: &str) -> Result<Option<Record>, StoreError>;
}

/// The named-collection subsystem.
pub trait CollectionProvider: Send + Sync {
  /// Resolves a collection by name. Unknown names resolve to `None`.
  fn resolve(&self, name: &str) -> Result<Option<Collection>, StoreError>;

  /// Records that the collection was just used.
  fn touch_last_used(&self, name: &str) -> Result<(), StoreError>;
}

/// The byte store backing the result cache.
pub trait CacheStore: Send + Sync {
  /// Reads the bytes stored under `key`.
  fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

  /// Stores `value` under `key`, replacing any previous value.
  fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;
}
