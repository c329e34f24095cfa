// Shared fixtures for integration tests

use filecache::{CacheCodec, CacheReader, CacheWriter, CodecError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: i64,
    pub name: Option<String>,
}

impl User {
    pub fn new(uid: i64, name: &str) -> Self {
        Self {
            uid,
            name: Some(name.to_string()),
        }
    }

    pub fn anonymous(uid: i64) -> Self {
        Self { uid, name: None }
    }
}

/// Hand-written codec: uid, then nullable name
pub struct UserCodec;

impl CacheCodec<User> for UserCodec {
    fn read(&self, reader: &mut CacheReader<'_>) -> Result<User, CodecError> {
        Ok(User {
            uid: reader.read_i64()?,
            name: reader.read_nullable_string()?,
        })
    }

    fn write(&self, value: &User, writer: &mut CacheWriter<'_>) -> Result<(), CodecError> {
        writer.write_i64(value.uid)?;
        writer.write_nullable_string(value.name.as_deref())
    }
}
