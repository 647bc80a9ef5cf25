//! In-memory implementations of the storage traits.

use crate::error::StoreError;
use crate::index::adapter::{CacheStore, CollectionProvider, RecordReader, RecordStore};
use crate::types::{Collection, EntityId, Record};
use dashmap::DashMap;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::SystemTime;

/// In-memory record store.
///
/// Ids are listed in lexicographic order.
#[derive(Debug, Default)]
pub struct MemRecordStore {
  records: BTreeMap<EntityId, Record>,
}

impl MemRecordStore {
  /// Create a new empty store.
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds or replaces a record.
  pub fn put(&mut self, record: Record) {
    self.records.insert(record.id.clone(), record);
  }

  /// Removes a record.
  pub fn remove(&mut self, id: &str) -> Option<Record> {
    self.records.remove(id)
  }

  /// The number of stored records.
  pub fn len(&self) -> usize {
    self.records.len()
  }

  /// Returns `true` if the store holds no records.
  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }
}

impl FromIterator<Record> for MemRecordStore {
  fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
    let mut store = Self::new();
    for record in iter {
      store.put(record);
    }
    store
  }
}

impl RecordStore for MemRecordStore {
  fn list_ids(&self, scope: Option<&HashSet<EntityId>>) -> Result<Vec<EntityId>, StoreError> {
    Ok(
      self
        .records
        .keys()
        .filter(|id| scope.map_or(true, |scope| scope.contains(*id)))
        .cloned()
        .collect(),
    )
  }

  fn untagged_ids(&self) -> Result<HashSet<EntityId>, StoreError> {
    Ok(
      self
        .records
        .values()
        .filter(|record| record.tags.trim().is_empty())
        .map(|record| record.id.clone())
        .collect(),
    )
  }

  fn connect(&self) -> Result<Box<dyn RecordReader + '_>, StoreError> {
    Ok(Box::new(MemReader {
      records: &self.records,
    }))
  }
}

struct MemReader<'a> {
  records: &'a BTreeMap<EntityId, Record>,
}

impl RecordReader for MemReader<'_> {
  fn get_record(&mut self, id: &str) -> Result<Option<Record>, StoreError> {
    Ok(self.records.get(id).cloned())
  }
}

/// In-memory collection provider that remembers when each collection was
/// last used.
#[derive(Debug, Default)]
pub struct MemCollections {
  collections: HashMap<String, Collection>,
  last_used: DashMap<String, SystemTime>,
}

impl MemCollections {
  /// Create a new empty provider.
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers a static collection.
  pub fn with_static<I, S>(mut self, name: impl Into<String>, ids: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<EntityId>,
  {
    let ids = ids.into_iter().map(Into::into).collect();
    self.collections.insert(name.into(), Collection::Static(ids));
    self
  }

  /// Registers a saved-search collection.
  pub fn with_saved_search(mut self, name: impl Into<String>, filter: impl Into<String>) -> Self {
    self
      .collections
      .insert(name.into(), Collection::SavedSearch(filter.into()));
    self
  }

  /// When the collection was last used, if ever.
  pub fn last_used(&self, name: &str) -> Option<SystemTime> {
    self.last_used.get(name).map(|entry| *entry.value())
  }
}

impl CollectionProvider for MemCollections {
  fn resolve(&self, name: &str) -> Result<Option<Collection>, StoreError> {
    Ok(self.collections.get(name).cloned())
  }

  fn touch_last_used(&self, name: &str) -> Result<(), StoreError> {
    self.last_used.insert(name.to_string(), SystemTime::now());
    Ok(())
  }
}

/// In-memory cache store backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemCacheStore {
  entries: DashMap<String, Vec<u8>>,
}

impl MemCacheStore {
  /// Create a new empty cache store.
  pub fn new() -> Self {
    Self::default()
  }

  /// The number of cached entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` if nothing is cached.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Drops every entry.
  pub fn clear(&self) {
    self.entries.clear();
  }
}

impl CacheStore for MemCacheStore {
  fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    Ok(self.entries.get(key).map(|entry| entry.value().clone()))
  }

  fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
    self.entries.insert(key.to_string(), value);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;
  use std::thread;

  #[test]
  fn touches_are_recorded_per_collection() {
    let collections = Arc::new(
      MemCollections::new()
        .with_static("a", ["1"])
        .with_saved_search("b", "colour"),
    );
    assert_eq!(collections.last_used("a"), None);

    let handles: Vec<_> = (0..8)
      .map(|i| {
        let collections = collections.clone();
        thread::spawn(move || {
          let name = if i % 2 == 0 { "a" } else { "b" };
          collections.touch_last_used(name)
        })
      })
      .collect();
    for handle in handles {
      assert!(handle.join().unwrap().is_ok());
    }

    assert!(collections.last_used("a").is_some());
    assert!(collections.last_used("b").is_some());
    assert_eq!(collections.last_used("c"), None);
  }
}
