//! Field-like access to a cache
//!
//! [`CachedValue`] presents a [`FileCache`] as an optional value with
//! `get`/`set`: assigning `None` clears the cache.

use super::file_cache::FileCache;
use crate::error::CacheResult;

#[derive(Debug)]
pub struct CachedValue<'a, T> {
    cache: &'a FileCache<T>,
    shred_on_clear: bool,
}

impl<'a, T> CachedValue<'a, T> {
    /// Wrapper that deletes on `set(None)`
    pub fn new(cache: &'a FileCache<T>) -> Self {
        Self {
            cache,
            shred_on_clear: false,
        }
    }

    /// Wrapper that shreds on `set(None)`
    pub fn shredding(cache: &'a FileCache<T>) -> Self {
        Self {
            cache,
            shred_on_clear: true,
        }
    }

    pub fn get(&self) -> CacheResult<Option<T>> {
        self.cache.get_value_or_absent()
    }

    pub fn set(&self, value: Option<T>) -> CacheResult<()> {
        match value {
            Some(value) => self.cache.set_value(&value),
            None if self.shred_on_clear => self.cache.shred(),
            None => self.cache.delete(),
        }
    }

    pub fn cache(&self) -> &'a FileCache<T> {
        self.cache
    }
}

impl<T> FileCache<T> {
    /// Borrow this cache as a [`CachedValue`]
    pub fn cached(&self, shred_on_clear: bool) -> CachedValue<'_, T> {
        if shred_on_clear {
            CachedValue::shredding(self)
        } else {
            CachedValue::new(self)
        }
    }
}
