//! The search engine that ties scope resolution, caching, scanning, sorting
//! and pagination together.

use crate::cache::{ResultCache, Signature};
use crate::config::SearchConfig;
use crate::context::{CancelToken, ScanContext};
use crate::error::Result;
use crate::extension::SearchExtension;
use crate::index::adapter::{CacheStore, CollectionProvider, RecordStore};
use crate::scanner::{ParallelScanner, ScanFilter};
use crate::sort::sort_results;
use crate::types::{Collection, EntityId, MatchResult, Query, SearchOutcome};
use std::collections::HashSet;
use std::sync::Arc;

/// The main search engine.
///
/// `SearchEngine` answers [`Query`] values against a record store. A search
/// runs through these steps:
///
/// 1.  **`before_query` Hook**: Extensions may rewrite the query.
/// 2.  **Scope Resolution**: A named collection either replaces the candidate
///     set with its own id list or contributes a saved filter that is ANDed
///     with the query's filter. Resolving marks the collection as used.
///     Unknown collections are ignored.
/// 3.  **Cache Lookup**: The query [`Signature`] is looked up in the result
///     cache.
/// 4.  **Scan** (on a miss): Every candidate is fetched and tested by the
///     [`ParallelScanner`].
/// 5.  **`after_scan` Hook**: Extensions may adjust the fresh results.
/// 6.  **Sorting**: Results are sorted in natural order by the query's sort
///     key, then stored in the cache.
/// 7.  **Pagination**: One page of `page_size` results is cut, starting at
///     `page_start`.
/// 8.  **`after_page` Hook**: Extensions may adjust the final page.
///
/// Create one with [`SearchEngine::builder`].
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use tagsift::prelude::*;
///
/// let store: MemRecordStore = vec![
///     Record::new("1", "Alpha", "artist:bob,colour"),
///     Record::new("2", "Beta", "artist:alice"),
/// ]
/// .into_iter()
/// .collect();
///
/// let engine = SearchEngine::builder(Arc::new(store))
///     .cache(Arc::new(MemCacheStore::new()))
///     .config(SearchConfig::default().workers(2))
///     .build()
///     .unwrap();
///
/// let query = Query::builder().filter("artist:*").sort_by("artist").build();
/// let outcome = engine.search(&query).unwrap();
///
/// assert_eq!(outcome.total_matches, 2);
/// assert_eq!(outcome.page[0].title, "Beta");
/// ```
pub struct SearchEngine {
  records: Arc<dyn RecordStore>,
  collections: Option<Arc<dyn CollectionProvider>>,
  cache: Option<ResultCache>,
  scanner: ParallelScanner,
  config: SearchConfig,
  extensions: Vec<Box<dyn SearchExtension>>,
}

/// The candidate scope a collection resolves to.
enum Scope {
  All,
  Static(HashSet<EntityId>),
  Saved(String),
}

impl SearchEngine {
  /// Creates a builder for an engine reading from `records`.
  pub fn builder(records: Arc<dyn RecordStore>) -> SearchEngineBuilder {
    SearchEngineBuilder::new(records)
  }

  /// The configuration the engine was built with.
  pub fn config(&self) -> &SearchConfig {
    &self.config
  }

  /// The size of the scan worker pool.
  pub fn workers(&self) -> usize {
    self.scanner.workers()
  }

  /// Runs a search with the configured deadline and no external cancellation.
  pub fn search(&self, query: &Query) -> Result<SearchOutcome> {
    self.search_with(query, &CancelToken::new())
  }

  /// Runs a search that stops early once `token` is cancelled.
  ///
  /// A cancelled search returns [`SearchError::Cancelled`](crate::error::SearchError::Cancelled)
  /// and leaves the cache untouched.
  pub fn search_with(&self, query: &Query, token: &CancelToken) -> Result<SearchOutcome> {
    let ctx = ScanContext::new(token.clone(), self.config.timeout());

    let mut query = query.clone();
    for ext in &self.extensions {
      ext.before_query(&mut query);
    }

    let scope = self.resolve_scope(&query)?;
    let ids = match &scope {
      Scope::Static(set) => self.records.list_ids(Some(set))?,
      Scope::All | Scope::Saved(_) => self.records.list_ids(None)?,
    };
    let saved_filter = match &scope {
      Scope::Saved(filter) => Some(filter.as_str()),
      Scope::All | Scope::Static(_) => None,
    };

    let signature = Signature::of(&query);
    let cached = self
      .cache
      .as_ref()
      .and_then(|cache| cache.get(&signature, &ctx));

    let results = match cached {
      Some(results) => {
        tracing::debug!(%signature, matches = results.len(), "cache hit");
        results
      }
      None => {
        tracing::debug!(%signature, candidates = ids.len(), "cache miss, scanning");
        let results = self.compute(&query, &ids, saved_filter, &ctx)?;
        if let Some(cache) = &self.cache {
          cache.put(&signature, &results, &ctx);
        }
        results
      }
    };

    let mut page = paginate(&results, query.page_start, self.config.page_size);
    for ext in &self.extensions {
      ext.after_page(&query, &mut page);
    }

    Ok(SearchOutcome {
      total_candidates: ids.len(),
      total_matches: results.len(),
      page,
    })
  }

  /// Scans and sorts the full result list of a query.
  fn compute(
    &self,
    query: &Query,
    ids: &[EntityId],
    saved_filter: Option<&str>,
    ctx: &ScanContext,
  ) -> Result<Vec<MatchResult>> {
    let filter = ScanFilter::new(query, saved_filter);
    let mut results = self.scanner.scan(self.records.as_ref(), ids, &filter, ctx)?;

    for ext in &self.extensions {
      ext.after_scan(query, &mut results);
    }

    sort_results(
      &mut results,
      query.effective_sort_key(),
      query.sort_descending,
      self.config.missing_keys,
    );

    // A result finished after cancellation is not trusted or cached.
    ctx.check()?;
    Ok(results)
  }

  fn resolve_scope(&self, query: &Query) -> Result<Scope> {
    let name = match query.collection.as_deref() {
      Some(name) if !name.is_empty() => name,
      _ => return Ok(Scope::All),
    };
    let Some(provider) = &self.collections else {
      return Ok(Scope::All);
    };

    let Some(collection) = provider.resolve(name)? else {
      tracing::debug!(collection = name, "unknown collection, searching everything");
      return Ok(Scope::All);
    };

    if let Err(err) = provider.touch_last_used(name) {
      tracing::warn!(collection = name, error = %err, "failed to mark collection as used");
    }

    Ok(match collection {
      Collection::Static(ids) => {
        tracing::debug!(collection = name, ids = ids.len(), "static collection");
        Scope::Static(ids.into_iter().collect())
      }
      Collection::SavedSearch(filter) => {
        tracing::debug!(collection = name, %filter, "saved search collection");
        Scope::Saved(filter)
      }
    })
  }
}

/// Cuts the page starting at `start` out of `results`.
///
/// The page is empty when `start` is past the end.
pub fn paginate(results: &[MatchResult], start: usize, page_size: usize) -> Vec<MatchResult> {
  if start >= results.len() {
    return Vec::new();
  }
  let end = start.saturating_add(page_size).min(results.len());
  results[start..end].to_vec()
}

/// A builder for creating `SearchEngine` instances.
pub struct SearchEngineBuilder {
  records: Arc<dyn RecordStore>,
  collections: Option<Arc<dyn CollectionProvider>>,
  cache: Option<Arc<dyn CacheStore>>,
  config: SearchConfig,
  extensions: Vec<Box<dyn SearchExtension>>,
}

impl SearchEngineBuilder {
  /// Creates a builder reading from `records`, with no collections, no cache
  /// and the default configuration.
  pub fn new(records: Arc<dyn RecordStore>) -> Self {
    Self {
      records,
      collections: None,
      cache: None,
      config: SearchConfig::default(),
      extensions: Vec::new(),
    }
  }

  /// Sets the collection provider used to resolve `Query::collection`.
  pub fn collections(mut self, collections: Arc<dyn CollectionProvider>) -> Self {
    self.collections = Some(collections);
    self
  }

  /// Sets the store backing the result cache.
  pub fn cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
    self.cache = Some(cache);
    self
  }

  /// Sets the engine configuration.
  pub fn config(mut self, config: SearchConfig) -> Self {
    self.config = config;
    self
  }

  /// Adds an extension to the engine.
  pub fn with_extension(mut self, extension: Box<dyn SearchExtension>) -> Self {
    self.extensions.push(extension);
    self
  }

  /// Builds the engine, starting its worker pool.
  pub fn build(self) -> Result<SearchEngine> {
    let scanner = ParallelScanner::new(self.config.resolved_workers())?;

    Ok(SearchEngine {
      records: self.records,
      collections: self.collections,
      cache: self.cache.map(ResultCache::new),
      scanner,
      config: self.config,
      extensions: self.extensions,
    })
  }
}
