//! Core data types for the tagsift engine.

use serde::{Deserialize, Serialize};

/// Type alias for record identifiers.
///
/// Identifiers are opaque to the engine; they are only compared, hashed and
/// handed back to the record store.
pub type EntityId = String;

/// The sort key used when a query does not name one.
pub const DEFAULT_SORT_KEY: &str = "title";

/// An archive entry as held by the record store.
///
/// `tags` is a single comma-joined string. Each entry is either a bare label
/// (`"colour"`) or a `namespace:value` pair (`"artist:bob"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
  /// The record identifier.
  pub id: EntityId,
  /// The display title.
  pub title: String,
  /// The comma-joined tag string.
  pub tags: String,
  /// The backing file. Records without one are invalid and never returned.
  pub file: Option<String>,
  /// Whether the record is still flagged as new.
  #[serde(default)]
  pub is_new: bool,
}

impl Record {
  /// Creates a valid record with the given id, title and tags.
  ///
  /// The file path defaults to the id so that the record passes the
  /// validity check; use [`Record::without_file`] to build an invalid one.
  pub fn new(id: impl Into<EntityId>, title: impl Into<String>, tags: impl Into<String>) -> Self {
    let id = id.into();
    Self {
      file: Some(id.clone()),
      id,
      title: title.into(),
      tags: tags.into(),
      is_new: false,
    }
  }

  /// Marks the record as new.
  pub fn new_flag(mut self, is_new: bool) -> Self {
    self.is_new = is_new;
    self
  }

  /// Sets the backing file.
  pub fn file(mut self, file: impl Into<String>) -> Self {
    self.file = Some(file.into());
    self
  }

  /// Removes the backing file.
  pub fn without_file(mut self) -> Self {
    self.file = None;
    self
  }

  /// The text the filter language is evaluated against: the title followed
  /// by the tag string, comma separated.
  pub fn tag_blob(&self) -> String {
    format!("{},{}", self.title, self.tags)
  }
}

/// The minimal projection of a record that passed a search.
///
/// It holds plain owned values only, so it can be serialized into the result
/// cache and sent to callers without keeping any scanner state alive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchResult {
  /// The record identifier.
  pub id: EntityId,
  /// The record title.
  pub title: String,
  /// The record tag string.
  pub tags: String,
}

impl From<&Record> for MatchResult {
  fn from(record: &Record) -> Self {
    Self {
      id: record.id.clone(),
      title: record.title.clone(),
      tags: record.tags.clone(),
    }
  }
}

/// What a named collection resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collection {
  /// A fixed, ordered list of record ids that replaces the full database as
  /// the candidate set.
  Static(Vec<EntityId>),
  /// A saved filter string that is ANDed with the query's own filter.
  SavedSearch(String),
}

/// A search request.
///
/// A `Query` is immutable once built. Create one with [`Query::builder`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
  /// The filter expression, in the tag query language.
  #[serde(default)]
  pub filter_text: String,
  /// An optional collection restricting the scope of the search.
  #[serde(default)]
  pub collection: Option<String>,
  /// The metadata key to sort by: `"title"` or a tag namespace.
  #[serde(default)]
  pub sort_key: Option<String>,
  /// Whether to reverse the sort order.
  #[serde(default)]
  pub sort_descending: bool,
  /// Only keep records flagged as new.
  #[serde(default)]
  pub new_only: bool,
  /// Only keep records without any tags.
  #[serde(default)]
  pub untagged_only: bool,
  /// The index of the first result of the requested page.
  #[serde(default)]
  pub page_start: usize,
}

impl Query {
  /// Creates a new `QueryBuilder` to construct a `Query` in a chained manner.
  pub fn builder() -> QueryBuilder {
    QueryBuilder::default()
  }

  /// The trimmed sort key in effect for this query, defaulting to the title.
  pub fn effective_sort_key(&self) -> &str {
    match self.sort_key.as_deref().map(str::trim) {
      Some(key) if !key.is_empty() => key,
      _ => DEFAULT_SORT_KEY,
    }
  }
}

/// A builder for creating `Query` instances.
#[derive(Debug, Default)]
pub struct QueryBuilder {
  query: Query,
}

impl QueryBuilder {
  /// Sets the filter expression.
  pub fn filter(mut self, text: impl Into<String>) -> Self {
    self.query.filter_text = text.into();
    self
  }

  /// Restricts the search to a named collection.
  pub fn collection(mut self, name: impl Into<String>) -> Self {
    self.query.collection = Some(name.into());
    self
  }

  /// Sets the sort key.
  pub fn sort_by(mut self, key: impl Into<String>) -> Self {
    self.query.sort_key = Some(key.into());
    self
  }

  /// Sorts in descending order.
  pub fn descending(mut self, descending: bool) -> Self {
    self.query.sort_descending = descending;
    self
  }

  /// Keeps only records flagged as new.
  pub fn new_only(mut self, new_only: bool) -> Self {
    self.query.new_only = new_only;
    self
  }

  /// Keeps only untagged records.
  pub fn untagged_only(mut self, untagged_only: bool) -> Self {
    self.query.untagged_only = untagged_only;
    self
  }

  /// Sets the offset of the requested page.
  pub fn page_start(mut self, start: usize) -> Self {
    self.query.page_start = start;
    self
  }

  /// Builds the final `Query` object.
  pub fn build(self) -> Query {
    self.query
  }
}

/// The answer to a search call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
  /// The number of records the query was evaluated against.
  pub total_candidates: usize,
  /// The number of records that matched, across all pages.
  pub total_matches: usize,
  /// The requested page of results, in final sorted order.
  pub page: Vec<MatchResult>,
}
