mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tagsift::prelude::*;

fn store() -> MemRecordStore {
  vec![
    Record::new("1", "Intro", "topic:machine learning,level:beginner"),
    Record::new("2", "Deep Dive", "topic:machine learning,level:advanced"),
    Record::new("3", "Other", "topic:gardening"),
  ]
  .into_iter()
  .collect()
}

struct QueryRewriteExt;

impl SearchExtension for QueryRewriteExt {
  fn before_query(&self, query: &mut Query) {
    if query.filter_text == "ml" {
      query.filter_text = "\"topic:machine learning$\"".to_string();
    }
  }
}

struct HideAdvancedExt {
  calls: AtomicUsize,
}

impl SearchExtension for HideAdvancedExt {
  fn after_scan(&self, _query: &Query, results: &mut Vec<MatchResult>) {
    self.calls.fetch_add(1, Ordering::SeqCst);
    results.retain(|m| !m.tags.contains("level:advanced"));
  }
}

struct ShoutTitlesExt;

impl SearchExtension for ShoutTitlesExt {
  fn after_page(&self, _query: &Query, page: &mut Vec<MatchResult>) {
    for m in page {
      m.title = m.title.to_uppercase();
    }
  }
}

#[test]
fn test_extensions() {
  common::init_tracing();
  let hide = Arc::new(HideAdvancedExt {
    calls: AtomicUsize::new(0),
  });

  struct Shared(Arc<HideAdvancedExt>);
  impl SearchExtension for Shared {
    fn after_scan(&self, query: &Query, results: &mut Vec<MatchResult>) {
      self.0.after_scan(query, results);
    }
  }

  let engine = SearchEngine::builder(Arc::new(store()))
    .cache(Arc::new(MemCacheStore::new()))
    .with_extension(Box::new(QueryRewriteExt))
    .with_extension(Box::new(Shared(hide.clone())))
    .with_extension(Box::new(ShoutTitlesExt))
    .build()
    .unwrap();

  // "ml" is rewritten to the exact topic and the advanced entry is dropped.
  let query = Query::builder().filter("ml").build();
  let outcome = engine.search(&query).unwrap();
  assert_eq!(outcome.total_matches, 1);
  assert_eq!(outcome.page[0].id, "1");
  assert_eq!(outcome.page[0].title, "INTRO");

  // The second call is a cache hit: no scan hook, but the page hook runs.
  let again = engine.search(&query).unwrap();
  assert_eq!(again, outcome);
  assert_eq!(hide.calls.load(Ordering::SeqCst), 1);
}
