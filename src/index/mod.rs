//! Storage adapters for tagsift.

pub mod adapter;
pub mod memory;

pub use adapter::{CacheStore, CollectionProvider, RecordReader, RecordStore};
pub use memory::{MemCacheStore, MemCollections, MemRecordStore};
