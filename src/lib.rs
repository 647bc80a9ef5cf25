//! tagsift - a tag query and filter engine for large archive collections.
//!
//! tagsift answers queries written in a small tag language (wildcards,
//! exact entries, negation, implicit AND) over records held in an external
//! store. Candidates are scanned in parallel, sorted in natural order by a
//! chosen metadata key, memoized in a result cache and served page by page.

pub mod types;
pub mod error;
pub mod config;
pub mod context;
pub mod filter;
pub mod matcher;
pub mod sort;
pub mod scanner;
pub mod cache;
pub mod engine;
pub mod extension;
pub mod index;

pub use matcher::matches;

pub mod prelude {
  //! Convenient re-exports for common types and traits.

  pub use crate::cache::*;
  pub use crate::config::*;
  pub use crate::context::*;
  pub use crate::engine::*;
  pub use crate::error::{SearchError, StoreError};
  pub use crate::extension::*;
  pub use crate::index::*;
  pub use crate::matcher::*;
  pub use crate::types::*;
}
