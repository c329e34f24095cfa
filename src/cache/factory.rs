//! Path-naming factory
//!
//! Builds [`FileCache`] instances below a base directory, applying optional
//! filename prefix/suffix rules and a default max age.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use super::affix::with_prefix_and_suffix;
use super::file_cache::FileCache;
use crate::codec::CacheCodec;
use crate::config::CacheConfig;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FactoryError {
    #[error("No base directory given")]
    MissingBaseDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCacheFactory {
    base_dir: PathBuf,
    filename_prefix: String,
    filename_suffix: String,
    default_max_age: Duration,
}

impl FileCacheFactory {
    /// Factory without affixes or default max age
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            filename_prefix: String::new(),
            filename_suffix: String::new(),
            default_max_age: Duration::ZERO,
        }
    }

    pub fn builder() -> FileCacheFactoryBuilder {
        FileCacheFactoryBuilder::default()
    }

    /// Builder pre-populated with this factory's settings
    pub fn new_builder(&self) -> FileCacheFactoryBuilder {
        FileCacheFactoryBuilder {
            base_dir: Some(self.base_dir.clone()),
            filename_prefix: self.filename_prefix.clone(),
            filename_suffix: self.filename_suffix.clone(),
            default_max_age: self.default_max_age,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            base_dir: config.base_dir.clone(),
            filename_prefix: config.filename_prefix.clone(),
            filename_suffix: config.filename_suffix.clone(),
            default_max_age: config.default_max_age(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn filename_prefix(&self) -> &str {
        &self.filename_prefix
    }

    pub fn filename_suffix(&self) -> &str {
        &self.filename_suffix
    }

    pub fn default_max_age(&self) -> Duration {
        self.default_max_age
    }

    /// Cache for `name` using the factory's default max age
    pub fn create<T>(&self, name: impl AsRef<Path>, codec: impl CacheCodec<T> + 'static) -> FileCache<T> {
        self.create_with_max_age(name, codec, self.default_max_age)
    }

    pub fn create_with_max_age<T>(
        &self,
        name: impl AsRef<Path>,
        codec: impl CacheCodec<T> + 'static,
        max_age: Duration,
    ) -> FileCache<T> {
        let path = self.resolve_path(name);
        tracing::debug!(path = %path.display(), ?max_age, "creating file cache");
        FileCache::with_max_age(path, codec, max_age)
    }

    /// Final cache file path for `name`.
    ///
    /// The name is normalized, the affixes go onto its last component only,
    /// and an absolute name replaces the base directory. Names whose last
    /// component is not valid UTF-8 are used without affixes.
    pub fn resolve_path(&self, name: impl AsRef<Path>) -> PathBuf {
        let mut path = normalize(name.as_ref());

        let has_affixes = !self.filename_prefix.is_empty() || !self.filename_suffix.is_empty();
        if has_affixes {
            if let Some(file_name) = path.file_name().and_then(OsStr::to_str) {
                let file_name =
                    with_prefix_and_suffix(file_name, &self.filename_prefix, &self.filename_suffix);
                path.set_file_name(file_name);
            }
        }

        self.base_dir.join(path)
    }
}

/// Lexical normalization: drops `.` components, and `..` removes a preceding
/// normal component. No filesystem access.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir if depth > 0 => {
                out.pop();
                depth -= 1;
            }
            Component::ParentDir => out.push(".."),
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
            Component::RootDir | Component::Prefix(_) => out.push(component.as_os_str()),
        }
    }

    out
}

#[derive(Debug, Clone, Default)]
pub struct FileCacheFactoryBuilder {
    base_dir: Option<PathBuf>,
    filename_prefix: String,
    filename_suffix: String,
    default_max_age: Duration,
}

impl FileCacheFactoryBuilder {
    pub fn base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn filename_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.filename_prefix = prefix.into();
        self
    }

    pub fn filename_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.filename_suffix = suffix.into();
        self
    }

    pub fn default_max_age(mut self, max_age: Duration) -> Self {
        self.default_max_age = max_age;
        self
    }

    pub fn build(self) -> Result<FileCacheFactory, FactoryError> {
        Ok(FileCacheFactory {
            base_dir: self.base_dir.ok_or(FactoryError::MissingBaseDir)?,
            filename_prefix: self.filename_prefix,
            filename_suffix: self.filename_suffix,
            default_max_age: self.default_max_age,
        })
    }
}
