// Species cache and rate counter storage on top of the key-value store

pub mod keys;
pub mod operations;

pub use operations::{CacheError, SpeciesCacheOperations};
