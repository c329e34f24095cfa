// Cache module: the file-backed controller and its value types

mod affix;
mod delegate;
mod factory;
mod file_cache;
mod shred;
mod snapshot;
mod update;

pub use affix::{with_prefix, with_prefix_and_suffix, with_suffix};
pub use delegate::CachedValue;
pub use factory::{FactoryError, FileCacheFactory, FileCacheFactoryBuilder};
pub use file_cache::FileCache;
pub use snapshot::CacheSnapshot;
pub use update::{CacheUpdate, WriteTime};
