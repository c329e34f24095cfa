//! File-backed single-value cache controller
//!
//! A [`FileCache`] binds one file path, one codec and one max-age policy.
//! The value is the file's bytes; the modification time is the file's mtime,
//! truncated to whole seconds.
//!
//! Presence at instant `now`:
//!
//! ```text
//! present(now) := file length > 0 && (max_age == 0 || now - mtime <= max_age)
//! ```
//!
//! Read operations hold the coordinator's read side, write operations its
//! write side, for the whole operation. Every public operation first rejects
//! calls made from inside this cache's own update callback.

use std::collections::HashSet;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread::{self, ThreadId};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, SubsecRound, Utc};
use parking_lot::Mutex;

use super::shred::shred_file;
use super::snapshot::CacheSnapshot;
use super::update::{CacheUpdate, WriteTime};
use crate::codec::{self, CacheCodec};
use crate::constants::TEMP_FILE_PREFIX;
use crate::coordinator::ReadWriteCoordinator;
use crate::error::{CacheError, CacheResult};

/// Single-value cache persisted to one file.
///
/// Share one instance (e.g. behind an `Arc`) between threads; two instances
/// pointing at the same path do not coordinate with each other.
pub struct FileCache<T> {
    path: PathBuf,
    codec: Box<dyn CacheCodec<T>>,
    max_age: Duration,
    coordinator: ReadWriteCoordinator,
    /// Threads currently running an update callback of this cache
    blocked_threads: Mutex<HashSet<ThreadId>>,
}

impl<T> FileCache<T> {
    /// Cache without age invalidation
    pub fn new(path: impl Into<PathBuf>, codec: impl CacheCodec<T> + 'static) -> Self {
        Self::with_max_age(path, codec, Duration::ZERO)
    }

    /// Cache whose entries count as absent once older than `max_age`.
    /// A zero `max_age` disables age invalidation.
    pub fn with_max_age(
        path: impl Into<PathBuf>,
        codec: impl CacheCodec<T> + 'static,
        max_age: Duration,
    ) -> Self {
        Self {
            path: path.into(),
            codec: Box::new(codec),
            max_age,
            coordinator: ReadWriteCoordinator::new(),
            blocked_threads: Mutex::new(HashSet::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    // =========================================================================
    // Read operations
    // =========================================================================

    pub fn is_present(&self) -> CacheResult<bool> {
        self.read_op(|now| Ok(self.present_modification_time(now)?.is_some()))
    }

    pub fn is_not_present(&self) -> CacheResult<bool> {
        self.is_present().map(|present| !present)
    }

    pub fn get_snapshot_or_absent(&self) -> CacheResult<Option<CacheSnapshot<T>>> {
        self.read_op(|now| self.read_snapshot(now))
    }

    pub fn get_modification_time_or_absent(&self) -> CacheResult<Option<DateTime<Utc>>> {
        self.read_op(|now| self.present_modification_time(now))
    }

    pub fn get_value_or_absent(&self) -> CacheResult<Option<T>> {
        self.read_op(|now| self.read_value(now))
    }

    /// Like [`get_snapshot_or_absent`](Self::get_snapshot_or_absent), but
    /// fails with [`CacheError::NotPresent`] when absent
    pub fn get_snapshot(&self) -> CacheResult<CacheSnapshot<T>> {
        self.get_snapshot_or_absent()?.ok_or(CacheError::NotPresent)
    }

    pub fn get_modification_time(&self) -> CacheResult<DateTime<Utc>> {
        self.get_modification_time_or_absent()?
            .ok_or(CacheError::NotPresent)
    }

    pub fn get_value(&self) -> CacheResult<T> {
        self.get_value_or_absent()?.ok_or(CacheError::NotPresent)
    }

    pub fn get_value_or_else(&self, fallback: impl FnOnce() -> T) -> CacheResult<T> {
        Ok(self.get_value_or_absent()?.unwrap_or_else(fallback))
    }

    pub fn get_value_or_default(&self, default: T) -> CacheResult<T> {
        Ok(self.get_value_or_absent()?.unwrap_or(default))
    }

    /// Run `action` with the snapshot if present. Returns whether it ran.
    ///
    /// No lock is held while `action` runs.
    pub fn if_present(&self, action: impl FnOnce(CacheSnapshot<T>)) -> CacheResult<bool> {
        Ok(self.get_snapshot_or_absent()?.map(action).is_some())
    }

    pub fn if_not_present(&self, action: impl FnOnce()) -> CacheResult<bool> {
        if self.is_present()? {
            return Ok(false);
        }
        action();
        Ok(true)
    }

    pub fn if_value_present(&self, action: impl FnOnce(T)) -> CacheResult<bool> {
        Ok(self.get_value_or_absent()?.map(action).is_some())
    }

    // =========================================================================
    // Write operations
    // =========================================================================

    /// Store `value` stamped with the current time
    pub fn set_value(&self, value: &T) -> CacheResult<()> {
        self.set_value_at(value, WriteTime::Now)
    }

    pub fn set_value_at(&self, value: &T, when: impl Into<WriteTime>) -> CacheResult<()> {
        let when = when.into();
        self.write_op(|now| self.store(value, when, now))
    }

    /// Store `value` and return the previously present value
    pub fn get_and_set_value(&self, value: &T) -> CacheResult<Option<T>> {
        self.get_and_set_value_at(value, WriteTime::Now)
    }

    pub fn get_and_set_value_at(
        &self,
        value: &T,
        when: impl Into<WriteTime>,
    ) -> CacheResult<Option<T>> {
        let when = when.into();
        self.write_op(|now| {
            let old = self.read_value(now)?;
            self.store(value, when, now)?;
            Ok(old)
        })
    }

    /// Remove the entry; no error when there is none
    pub fn delete(&self) -> CacheResult<()> {
        self.write_op(|_| self.remove_entry().map(|_| ()))
    }

    /// Remove the entry and return the previously present value
    pub fn get_and_delete(&self) -> CacheResult<Option<T>> {
        self.write_op(|now| {
            let old = self.read_value(now)?;
            self.remove_entry()?;
            Ok(old)
        })
    }

    /// Overwrite the file with random data, then zeros, then delete it
    pub fn shred(&self) -> CacheResult<()> {
        self.write_op(|_| {
            if shred_file(&self.path)? {
                tracing::debug!(path = %self.path.display(), "shredded cache entry");
            }
            Ok(())
        })
    }

    /// Read-modify-write under the write lock.
    ///
    /// `update` receives the present snapshot (or `None`) and returns the next
    /// state; `None` deletes the entry. Calling back into this cache from
    /// inside `update` fails with [`CacheError::IllegalReentrantAccess`].
    pub fn update<F>(&self, update: F) -> CacheResult<()>
    where
        F: FnOnce(Option<CacheSnapshot<T>>) -> Option<CacheUpdate<T>>,
    {
        self.write_op(|now| {
            let snapshot = self.read_snapshot(now)?;
            match self.run_callback(|| update(snapshot)) {
                Some(next) => {
                    let (value, modification_time) = next.into_parts();
                    self.write_entry(&value, modification_time)
                }
                None => self.remove_entry().map(|_| ()),
            }
        })
    }

    /// Value-only [`update`](Self::update), stamping the current time
    pub fn update_value<F>(&self, update: F) -> CacheResult<()>
    where
        F: FnOnce(Option<T>) -> Option<T>,
    {
        self.update_value_at(WriteTime::Now, update)
    }

    pub fn update_value_at<F>(&self, when: impl Into<WriteTime>, update: F) -> CacheResult<()>
    where
        F: FnOnce(Option<T>) -> Option<T>,
    {
        let when = when.into();
        self.write_op(|now| {
            let value = self.read_value(now)?;
            match self.run_callback(|| update(value)) {
                Some(next) => self.store(&next, when, now),
                None => self.remove_entry().map(|_| ()),
            }
        })
    }

    /// Like [`update_value`](Self::update_value), but `update` only runs when
    /// a value is present; an absent cache stays absent
    pub fn update_existing_value<F>(&self, update: F) -> CacheResult<()>
    where
        F: FnOnce(T) -> Option<T>,
    {
        self.update_existing_value_at(WriteTime::Now, update)
    }

    pub fn update_existing_value_at<F>(
        &self,
        when: impl Into<WriteTime>,
        update: F,
    ) -> CacheResult<()>
    where
        F: FnOnce(T) -> Option<T>,
    {
        self.update_value_at(when, |value| value.and_then(update))
    }

    /// Set the modification time to now without touching the value
    pub fn touch(&self) -> CacheResult<()> {
        self.touch_at(Utc::now())
    }

    /// Set the modification time to `when`.
    ///
    /// A missing file is created empty, and an empty file still counts as
    /// absent.
    pub fn touch_at(&self, when: DateTime<Utc>) -> CacheResult<()> {
        self.write_op(|_| {
            self.create_parent_dir()?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            file.set_modified(to_system_time(when))?;
            tracing::debug!(path = %self.path.display(), %when, "touched cache entry");
            Ok(())
        })
    }

    // =========================================================================
    // Guards
    // =========================================================================

    fn ensure_not_reentrant(&self) -> CacheResult<()> {
        if self.blocked_threads.lock().contains(&thread::current().id()) {
            tracing::warn!(
                path = %self.path.display(),
                "rejected cache access from inside its own update callback"
            );
            return Err(CacheError::IllegalReentrantAccess);
        }
        Ok(())
    }

    fn read_op<R>(&self, op: impl FnOnce(DateTime<Utc>) -> CacheResult<R>) -> CacheResult<R> {
        self.ensure_not_reentrant()?;
        self.coordinator.with_read(|| op(Utc::now()))
    }

    fn write_op<R>(&self, op: impl FnOnce(DateTime<Utc>) -> CacheResult<R>) -> CacheResult<R> {
        self.ensure_not_reentrant()?;
        self.coordinator.with_write(|| op(Utc::now()))
    }

    fn run_callback<R>(&self, callback: impl FnOnce() -> R) -> R {
        let _scope = CallbackScope::enter(&self.blocked_threads);
        callback()
    }

    // =========================================================================
    // Unsynchronized helpers; callers hold the coordinator
    // =========================================================================

    fn present_modification_time(&self, now: DateTime<Utc>) -> CacheResult<Option<DateTime<Utc>>> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        if metadata.len() == 0 {
            return Ok(None);
        }

        let modification_time = DateTime::<Utc>::from(metadata.modified()?).trunc_subsecs(0);
        if self.is_expired(modification_time, now) {
            tracing::trace!(path = %self.path.display(), "cache entry expired");
            return Ok(None);
        }

        Ok(Some(modification_time))
    }

    fn is_expired(&self, modification_time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        if self.max_age.is_zero() {
            return false;
        }
        // Negative ages (mtime in the future) never expire
        match now.signed_duration_since(modification_time).to_std() {
            Ok(age) => age > self.max_age,
            Err(_) => false,
        }
    }

    fn read_snapshot(&self, now: DateTime<Utc>) -> CacheResult<Option<CacheSnapshot<T>>> {
        let Some(modification_time) = self.present_modification_time(now)? else {
            return Ok(None);
        };

        let bytes = fs::read(&self.path)?;
        let value = codec::decode_from_slice(&*self.codec, &bytes)?;
        Ok(Some(CacheSnapshot::new(value, modification_time)))
    }

    fn read_value(&self, now: DateTime<Utc>) -> CacheResult<Option<T>> {
        Ok(self.read_snapshot(now)?.map(CacheSnapshot::into_value))
    }

    fn store(&self, value: &T, when: WriteTime, now: DateTime<Utc>) -> CacheResult<()> {
        let present = match when {
            WriteTime::Preserve => self.present_modification_time(now)?,
            WriteTime::Now | WriteTime::At(_) => None,
        };
        self.write_entry(value, when.resolve(present, now))
    }

    /// Encode in memory, write a uniquely named temp file next to the entry,
    /// stamp it, rename it over the entry. A failed encode leaves the entry
    /// untouched; a failed write removes the temp file.
    fn write_entry(&self, value: &T, modification_time: DateTime<Utc>) -> CacheResult<()> {
        let bytes = codec::encode_to_vec(&*self.codec, value)?;

        let parent = self.create_parent_dir()?;
        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .tempfile_in(parent)?;
        temp.write_all(&bytes)?;
        temp.as_file().set_modified(to_system_time(modification_time))?;
        temp.persist(&self.path).map_err(|err| err.error)?;

        tracing::debug!(
            path = %self.path.display(),
            bytes = bytes.len(),
            modification_time = %modification_time.trunc_subsecs(0),
            "wrote cache entry"
        );
        Ok(())
    }

    fn remove_entry(&self) -> CacheResult<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "deleted cache entry");
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Creates the entry's directory and returns it
    fn create_parent_dir(&self) -> io::Result<&Path> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)?;
                Ok(parent)
            }
            _ => Ok(Path::new(".")),
        }
    }
}

impl<T> fmt::Debug for FileCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileCache")
            .field("path", &self.path)
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}

/// Registers the current thread as blocked for the lifetime of the scope,
/// including unwinding out of a panicking callback
struct CallbackScope<'a> {
    threads: &'a Mutex<HashSet<ThreadId>>,
    id: ThreadId,
}

impl<'a> CallbackScope<'a> {
    fn enter(threads: &'a Mutex<HashSet<ThreadId>>) -> Self {
        let id = thread::current().id();
        threads.lock().insert(id);
        Self { threads, id }
    }
}

impl Drop for CallbackScope<'_> {
    fn drop(&mut self) {
        self.threads.lock().remove(&self.id);
    }
}

fn to_system_time(when: DateTime<Utc>) -> SystemTime {
    SystemTime::from(when.trunc_subsecs(0))
}
