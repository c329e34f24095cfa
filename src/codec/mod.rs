//! Binary codec protocol
//!
//! A [`CacheCodec`] converts between a typed value and a byte stream through
//! a [`CacheReader`] / [`CacheWriter`] pair. Implementations must not rely on
//! end-of-stream to find the end of a value: every variable-length field is
//! length-prefixed, and nested values delegate to another codec.
//!
//! Wire format (big-endian, fixed widths):
//!
//! | kind    | encoding                                      |
//! |---------|-----------------------------------------------|
//! | bool    | 1 byte, `0x00` / `0x01`                       |
//! | u8/i8   | 1 byte                                        |
//! | i16     | 2 bytes                                       |
//! | i32     | 4 bytes                                       |
//! | i64     | 8 bytes                                       |
//! | f32/f64 | raw bit pattern as i32/i64                    |
//! | char    | one 16-bit code unit                          |
//! | string  | i32 byte count, then UTF-8 bytes              |
//! | list    | i32 element count, then each element          |
//!
//! See [`nullable`] for the nullable encodings, which are deliberately not
//! compatible with the plain ones.

use std::io::Cursor;
use std::sync::Arc;

mod adapters;
mod error;
pub mod nullable;
mod reader;
mod writer;

pub use self::adapters::{
    BoolCodec, CharCodec, F32Codec, F64Codec, I16Codec, I32Codec, I64Codec, I8Codec, JsonCodec,
    ListCodec, OptionCodec, SerializedCodec, StringCodec, U8Codec,
};
pub use self::error::CodecError;
pub use self::reader::CacheReader;
pub use self::writer::CacheWriter;

/// Pluggable (de)serialization strategy for one value type.
///
/// Implementations must not close the reader's or writer's stream; ownership
/// stays with the caller.
pub trait CacheCodec<T>: Send + Sync {
    /// Decode one value
    fn read(&self, reader: &mut CacheReader<'_>) -> Result<T, CodecError>;

    /// Encode one value
    fn write(&self, value: &T, writer: &mut CacheWriter<'_>) -> Result<(), CodecError>;
}

impl<T, C> CacheCodec<T> for Arc<C>
where
    C: CacheCodec<T> + ?Sized,
{
    fn read(&self, reader: &mut CacheReader<'_>) -> Result<T, CodecError> {
        (**self).read(reader)
    }

    fn write(&self, value: &T, writer: &mut CacheWriter<'_>) -> Result<(), CodecError> {
        (**self).write(value, writer)
    }
}

impl<T, C> CacheCodec<T> for Box<C>
where
    C: CacheCodec<T> + ?Sized,
{
    fn read(&self, reader: &mut CacheReader<'_>) -> Result<T, CodecError> {
        (**self).read(reader)
    }

    fn write(&self, value: &T, writer: &mut CacheWriter<'_>) -> Result<(), CodecError> {
        (**self).write(value, writer)
    }
}

/// Encode a value into a fresh buffer
pub fn encode_to_vec<T, C>(codec: &C, value: &T) -> Result<Vec<u8>, CodecError>
where
    C: CacheCodec<T> + ?Sized,
{
    let mut buf = Vec::new();
    let mut writer = CacheWriter::new(&mut buf);
    codec.write(value, &mut writer)?;
    Ok(buf)
}

/// Decode a value from the start of `bytes`; trailing bytes are ignored
pub fn decode_from_slice<T, C>(codec: &C, bytes: &[u8]) -> Result<T, CodecError>
where
    C: CacheCodec<T> + ?Sized,
{
    let mut cursor = Cursor::new(bytes);
    let mut reader = CacheReader::new(&mut cursor);
    codec.read(&mut reader)
}
