// filecache: single-value, file-backed cache with pluggable binary codecs

pub mod cache;
pub mod codec;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod error;
pub mod logging;

pub use cache::{
    CacheSnapshot, CacheUpdate, CachedValue, FactoryError, FileCache, FileCacheFactory,
    FileCacheFactoryBuilder, WriteTime,
};
pub use codec::{CacheCodec, CacheReader, CacheWriter, CodecError};
pub use coordinator::ReadWriteCoordinator;
pub use error::{CacheError, CacheResult};
