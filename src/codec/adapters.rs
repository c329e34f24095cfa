//! Ready-made codecs for primitives, collections and serde types

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::CodecError;
use super::reader::CacheReader;
use super::writer::{length_prefix, CacheWriter};
use super::CacheCodec;

macro_rules! primitive_codec {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $read:ident, $write:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl CacheCodec<$ty> for $name {
            fn read(&self, reader: &mut CacheReader<'_>) -> Result<$ty, CodecError> {
                reader.$read()
            }

            fn write(&self, value: &$ty, writer: &mut CacheWriter<'_>) -> Result<(), CodecError> {
                writer.$write(*value)
            }
        }
    };
}

primitive_codec!(
    /// 1 byte, `0x00`/`0x01`
    BoolCodec, bool, read_bool, write_bool
);
primitive_codec!(U8Codec, u8, read_u8, write_u8);
primitive_codec!(I8Codec, i8, read_i8, write_i8);
primitive_codec!(I16Codec, i16, read_i16, write_i16);
primitive_codec!(I32Codec, i32, read_i32, write_i32);
primitive_codec!(I64Codec, i64, read_i64, write_i64);
primitive_codec!(F32Codec, f32, read_f32, write_f32);
primitive_codec!(F64Codec, f64, read_f64, write_f64);
primitive_codec!(
    /// One 16-bit code unit; chars outside the BMP cannot be encoded
    CharCodec, char, read_char, write_char
);

/// Length-prefixed UTF-8 string
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl CacheCodec<String> for StringCodec {
    fn read(&self, reader: &mut CacheReader<'_>) -> Result<String, CodecError> {
        reader.read_string()
    }

    fn write(&self, value: &String, writer: &mut CacheWriter<'_>) -> Result<(), CodecError> {
        writer.write_string(value)
    }
}

/// List of elements: i32 count, then each element through the element codec
#[derive(Debug, Clone, Default)]
pub struct ListCodec<C> {
    element: C,
}

impl<C> ListCodec<C> {
    pub fn new(element: C) -> Self {
        Self { element }
    }
}

impl<T, C> CacheCodec<Vec<T>> for ListCodec<C>
where
    C: CacheCodec<T>,
{
    fn read(&self, reader: &mut CacheReader<'_>) -> Result<Vec<T>, CodecError> {
        let count = reader.read_i32()?;
        if count < 0 {
            return Err(CodecError::InvalidLength(count));
        }

        // Cap the pre-allocation; a corrupt count must not reserve gigabytes
        let mut list = Vec::with_capacity((count as usize).min(1024));
        for _ in 0..count {
            list.push(reader.read_object(&self.element)?);
        }
        Ok(list)
    }

    fn write(&self, value: &Vec<T>, writer: &mut CacheWriter<'_>) -> Result<(), CodecError> {
        writer.write_i32(length_prefix(value.len())?)?;
        for element in value {
            writer.write_object(element, &self.element)?;
        }
        Ok(())
    }
}

/// Optional value: presence flag, then the inner encoding when present
#[derive(Debug, Clone, Default)]
pub struct OptionCodec<C> {
    inner: C,
}

impl<C> OptionCodec<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<T, C> CacheCodec<Option<T>> for OptionCodec<C>
where
    C: CacheCodec<T>,
{
    fn read(&self, reader: &mut CacheReader<'_>) -> Result<Option<T>, CodecError> {
        reader.read_nullable_object(&self.inner)
    }

    fn write(&self, value: &Option<T>, writer: &mut CacheWriter<'_>) -> Result<(), CodecError> {
        writer.write_nullable_object(value.as_ref(), &self.inner)
    }
}

/// Any serde type through the host serialization mechanism (MessagePack)
pub struct SerializedCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerializedCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for SerializedCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SerializedCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SerializedCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SerializedCodec")
    }
}

impl<T> CacheCodec<T> for SerializedCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    fn read(&self, reader: &mut CacheReader<'_>) -> Result<T, CodecError> {
        reader.read_serialized()
    }

    fn write(&self, value: &T, writer: &mut CacheWriter<'_>) -> Result<(), CodecError> {
        writer.write_serialized(value)
    }
}

/// Any serde type as JSON text, stored as a length-prefixed string
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonCodec")
    }
}

impl<T> CacheCodec<T> for JsonCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    fn read(&self, reader: &mut CacheReader<'_>) -> Result<T, CodecError> {
        let json = reader.read_string()?;
        Ok(serde_json::from_str(&json)?)
    }

    fn write(&self, value: &T, writer: &mut CacheWriter<'_>) -> Result<(), CodecError> {
        let json = serde_json::to_string(value)?;
        writer.write_string(&json)
    }
}
