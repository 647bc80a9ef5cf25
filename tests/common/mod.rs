#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tagsift::prelude::*;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Routes engine logs to the test output. Safe to call multiple times.
pub fn init_tracing() {
  INIT.call_once(|| {
    let _ = tracing_subscriber::fmt()
      .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
      .with_test_writer()
      .try_init();
  });
}

/// A small archive covering tagged, untagged, new and invalid records.
pub fn archive() -> MemRecordStore {
  vec![
    Record::new("1", "Alpha Saga", "artist:Bob,series:saga,colour,date:2021"),
    Record::new("2", "beta", "artist:Alice,monochrome").new_flag(true),
    Record::new("3", "Gamma 10", "artist:carol,colour"),
    Record::new("4", "Gamma 2", "").new_flag(true),
    Record::new("5", "Broken", "artist:dan").without_file(),
    Record::new("6", "delta", "category,dog"),
  ]
  .into_iter()
  .collect()
}

/// `n` records titled `item 0` .. `item n-1`, all tagged `bulk`.
pub fn bulk_archive(n: usize) -> MemRecordStore {
  (0..n)
    .map(|i| {
      let parity = if i % 2 == 0 { "even" } else { "odd" };
      Record::new(format!("{i:04}"), format!("item {i}"), format!("bulk,{parity},rank:{}", n - i))
    })
    .collect()
}

pub fn ids(outcome: &SearchOutcome) -> Vec<&str> {
  outcome.page.iter().map(|m| m.id.as_str()).collect()
}

/// Runs before each fetch with the 1-based fetch number and the record id.
pub type FetchHook = Box<dyn Fn(usize, &str) -> Result<(), StoreError> + Send + Sync>;

/// Wraps a store and counts record fetches.
pub struct CountingStore {
  inner: MemRecordStore,
  fetches: AtomicUsize,
  hook: Option<FetchHook>,
}

impl CountingStore {
  pub fn new(inner: MemRecordStore) -> Arc<Self> {
    Arc::new(Self {
      inner,
      fetches: AtomicUsize::new(0),
      hook: None,
    })
  }

  /// Counts fetches and calls `hook` before each one. A hook error fails the fetch.
  pub fn with_hook(
    inner: MemRecordStore,
    hook: impl Fn(usize, &str) -> Result<(), StoreError> + Send + Sync + 'static,
  ) -> Arc<Self> {
    Arc::new(Self {
      inner,
      fetches: AtomicUsize::new(0),
      hook: Some(Box::new(hook)),
    })
  }

  pub fn fetches(&self) -> usize {
    self.fetches.load(Ordering::SeqCst)
  }
}

struct CountingReader<'a> {
  inner: Box<dyn RecordReader + 'a>,
  fetches: &'a AtomicUsize,
  hook: Option<&'a FetchHook>,
}

impl RecordReader for CountingReader<'_> {
  fn get_record(&mut self, id: &str) -> Result<Option<Record>, StoreError> {
    let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
    if let Some(hook) = self.hook {
      hook(n, id)?;
    }
    self.inner.get_record(id)
  }
}

impl RecordStore for CountingStore {
  fn list_ids(&self, scope: Option<&HashSet<EntityId>>) -> Result<Vec<EntityId>, StoreError> {
    self.inner.list_ids(scope)
  }

  fn untagged_ids(&self) -> Result<HashSet<EntityId>, StoreError> {
    self.inner.untagged_ids()
  }

  fn connect(&self) -> Result<Box<dyn RecordReader + '_>, StoreError> {
    Ok(Box::new(CountingReader {
      inner: self.inner.connect()?,
      fetches: &self.fetches,
      hook: self.hook.as_ref(),
    }))
  }
}

/// A store that fails whenever a particular record is fetched.
pub struct FailingStore {
  inner: MemRecordStore,
  poisoned: EntityId,
}

impl FailingStore {
  pub fn new(inner: MemRecordStore, poisoned: impl Into<EntityId>) -> Arc<Self> {
    Arc::new(Self {
      inner,
      poisoned: poisoned.into(),
    })
  }
}

struct FailingReader<'a> {
  inner: Box<dyn RecordReader + 'a>,
  poisoned: &'a str,
}

impl RecordReader for FailingReader<'_> {
  fn get_record(&mut self, id: &str) -> Result<Option<Record>, StoreError> {
    if id == self.poisoned {
      return Err(StoreError::Unavailable("connection reset".to_string()));
    }
    self.inner.get_record(id)
  }
}

impl RecordStore for FailingStore {
  fn list_ids(&self, scope: Option<&HashSet<EntityId>>) -> Result<Vec<EntityId>, StoreError> {
    self.inner.list_ids(scope)
  }

  fn untagged_ids(&self) -> Result<HashSet<EntityId>, StoreError> {
    self.inner.untagged_ids()
  }

  fn connect(&self) -> Result<Box<dyn RecordReader + '_>, StoreError> {
    Ok(Box::new(FailingReader {
      inner: self.inner.connect()?,
      poisoned: &self.poisoned,
    }))
  }
}
