//! The scan-and-filter stage: evaluates every candidate record against a query.

use crate::context::ScanContext;
use crate::error::Result;
use crate::index::adapter::RecordStore;
use crate::matcher::CompiledFilter;
use crate::types::{EntityId, MatchResult, Query, Record};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Everything a worker needs to decide whether a record passes.
///
/// Filters are compiled once per search and shared by all workers.
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
  /// The query's own filter.
  pub primary: CompiledFilter,
  /// The filter of a saved-search collection, if one is in scope.
  pub secondary: Option<CompiledFilter>,
  /// Only keep records flagged as new.
  pub new_only: bool,
  /// Only keep untagged records.
  pub untagged_only: bool,
}

impl ScanFilter {
  /// Builds the filter for `query`, ANDing in a saved-search filter.
  pub fn new(query: &Query, saved_filter: Option<&str>) -> Self {
    Self {
      primary: CompiledFilter::new(&query.filter_text),
      secondary: saved_filter.map(CompiledFilter::new),
      new_only: query.new_only,
      untagged_only: query.untagged_only,
    }
  }

  /// Tests a fetched record. Records without a file never pass.
  pub fn accepts(&self, record: &Record) -> bool {
    if record.file.is_none() {
      return false;
    }
    if self.new_only && !record.is_new {
      return false;
    }

    let blob = record.tag_blob();
    self.secondary.as_ref().map_or(true, |f| f.matches(&blob)) && self.primary.matches(&blob)
  }
}

/// Splits `ids` into at most `workers` contiguous groups of near-equal size.
///
/// The grouping depends only on the input order and the worker count.
pub fn partition(ids: &[EntityId], workers: usize) -> Vec<&[EntityId]> {
  if ids.is_empty() {
    return Vec::new();
  }
  let size = ids.len().div_ceil(workers.max(1));
  ids.chunks(size).collect()
}

/// Fans the candidate set out over a fixed pool of workers.
///
/// Each worker opens its own store reader and fills its own buffer; buffers
/// are concatenated once every worker is done. No order is promised across
/// workers, so callers sort the output.
#[derive(Debug)]
pub struct ParallelScanner {
  workers: usize,
  #[cfg(feature = "parallel")]
  pool: rayon::ThreadPool,
}

impl ParallelScanner {
  /// Creates a scanner with `workers` workers (at least one).
  pub fn new(workers: usize) -> Result<Self> {
    let workers = workers.max(1);

    #[cfg(feature = "parallel")]
    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(workers)
      .thread_name(|i| format!("tagsift-scan-{i}"))
      .build()
      .map_err(|err| crate::error::SearchError::WorkerPool(err.to_string()))?;

    Ok(Self {
      workers,
      #[cfg(feature = "parallel")]
      pool,
    })
  }

  /// The configured worker count.
  pub fn workers(&self) -> usize {
    self.workers
  }

  /// Returns every record in `ids` accepted by `filter`.
  ///
  /// A store failure in any worker stops the others and is returned. So is a
  /// cancellation. In both cases no partial result escapes.
  pub fn scan(
    &self,
    store: &dyn RecordStore,
    ids: &[EntityId],
    filter: &ScanFilter,
    ctx: &ScanContext,
  ) -> Result<Vec<MatchResult>> {
    ctx.check()?;

    let untagged = if filter.untagged_only {
      Some(store.untagged_ids()?)
    } else {
      None
    };

    let groups = partition(ids, self.workers);
    let abort = AtomicBool::new(false);
    let job = Job {
      store,
      filter,
      untagged: untagged.as_ref(),
      ctx,
      abort: &abort,
    };

    #[cfg(feature = "parallel")]
    let buffers: Result<Vec<Vec<MatchResult>>> = self
      .pool
      .install(|| groups.par_iter().map(|group| job.run(group)).collect());

    #[cfg(not(feature = "parallel"))]
    let buffers: Result<Vec<Vec<MatchResult>>> = groups.iter().map(|group| job.run(group)).collect();

    let found: Vec<MatchResult> = buffers?.into_iter().flatten().collect();
    tracing::debug!(
      candidates = ids.len(),
      groups = groups.len(),
      matches = found.len(),
      "scan finished"
    );
    Ok(found)
  }
}

/// The shared, read-only inputs of one scan.
struct Job<'a> {
  store: &'a dyn RecordStore,
  filter: &'a ScanFilter,
  untagged: Option<&'a HashSet<EntityId>>,
  ctx: &'a ScanContext,
  abort: &'a AtomicBool,
}

impl Job<'_> {
  fn run(&self, group: &[EntityId]) -> Result<Vec<MatchResult>> {
    let result = self.scan_group(group);
    if result.is_err() {
      self.abort.store(true, Ordering::Relaxed);
    }
    result
  }

  fn scan_group(&self, group: &[EntityId]) -> Result<Vec<MatchResult>> {
    let mut reader = self.store.connect()?;
    let mut found = Vec::new();

    for id in group {
      if self.abort.load(Ordering::Relaxed) {
        // A sibling failed; this buffer is thrown away.
        return Ok(Vec::new());
      }
      self.ctx.check()?;

      if self.untagged.is_some_and(|set| !set.contains(id)) {
        continue;
      }
      let Some(record) = reader.get_record(id)? else {
        continue;
      };
      if self.filter.accepts(&record) {
        found.push(MatchResult::from(&record));
      }
    }

    Ok(found)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ids(n: usize) -> Vec<EntityId> {
    (0..n).map(|i| i.to_string()).collect()
  }

  #[test]
  fn partitions_contiguously() {
    let ids = ids(10);
    let groups = partition(&ids, 3);
    assert_eq!(groups.len(), 3);
    assert_eq!(groups.iter().map(|g| g.len()).collect::<Vec<_>>(), [4, 4, 2]);
    assert_eq!(groups.concat(), ids);
  }

  #[test]
  fn never_makes_more_groups_than_ids() {
    assert_eq!(partition(&ids(2), 8).len(), 2);
    assert!(partition(&ids(0), 8).is_empty());
    assert_eq!(partition(&ids(5), 0).len(), 1);
  }

  #[test]
  fn filter_rejects_invalid_and_old_records() {
    let query = Query::builder().new_only(true).build();
    let filter = ScanFilter::new(&query, None);
    assert!(filter.accepts(&Record::new("1", "t", "a").new_flag(true)));
    assert!(!filter.accepts(&Record::new("2", "t", "a")));
    assert!(!filter.accepts(&Record::new("3", "t", "a").new_flag(true).without_file()));
  }

  #[test]
  fn filter_sees_the_title() {
    let query = Query::builder().filter("\"my title$\" artist:bob").build();
    let filter = ScanFilter::new(&query, Some("-colour"));
    assert!(filter.accepts(&Record::new("1", "My Title", "artist:bob")));
    assert!(!filter.accepts(&Record::new("2", "My Title", "artist:bob,colour")));
  }
}
