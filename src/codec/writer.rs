//! Primitive encoding into a byte stream

use std::io::Write;

use serde::Serialize;

use super::error::CodecError;
use super::CacheCodec;

/// Write access to an encoded cache entry
pub struct CacheWriter<'a> {
    stream: &'a mut dyn Write,
}

impl<'a> CacheWriter<'a> {
    pub fn new(stream: &'a mut dyn Write) -> Self {
        Self { stream }
    }

    /// The underlying stream. Codecs must not close or replace it.
    pub fn stream(&mut self) -> &mut dyn Write {
        &mut *self.stream
    }

    pub fn write_buffer(&mut self, buf: &[u8]) -> Result<(), CodecError> {
        self.stream.write_all(buf)?;
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<(), CodecError> {
        self.write_u8(u8::from(value))
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), CodecError> {
        self.write_buffer(&[value])
    }

    pub fn write_i8(&mut self, value: i8) -> Result<(), CodecError> {
        self.write_buffer(&value.to_be_bytes())
    }

    pub fn write_i16(&mut self, value: i16) -> Result<(), CodecError> {
        self.write_buffer(&value.to_be_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), CodecError> {
        self.write_buffer(&value.to_be_bytes())
    }

    pub fn write_i64(&mut self, value: i64) -> Result<(), CodecError> {
        self.write_buffer(&value.to_be_bytes())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<(), CodecError> {
        self.write_i32(value.to_bits() as i32)
    }

    pub fn write_f64(&mut self, value: f64) -> Result<(), CodecError> {
        self.write_i64(value.to_bits() as i64)
    }

    /// Write a char as one 16-bit code unit
    pub fn write_char(&mut self, value: char) -> Result<(), CodecError> {
        let unit = u16::try_from(u32::from(value)).map_err(|_| CodecError::UnencodableChar(value))?;
        self.write_i16(unit as i16)
    }

    /// Write a string as an i32 byte count followed by its UTF-8 bytes
    pub fn write_string(&mut self, value: &str) -> Result<(), CodecError> {
        let len = length_prefix(value.len())?;
        self.write_i32(len)?;
        if len > 0 {
            self.write_buffer(value.as_bytes())?;
        }
        Ok(())
    }

    /// Write a payload through the host serialization mechanism (MessagePack)
    pub fn write_serialized<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        let mut stream = &mut *self.stream;
        rmp_serde::encode::write(&mut stream, value)?;
        Ok(())
    }

    /// Write a nested value through another codec
    pub fn write_object<T, C>(&mut self, value: &T, codec: &C) -> Result<(), CodecError>
    where
        C: CacheCodec<T> + ?Sized,
    {
        codec.write(value, self)
    }
}

/// Convert a payload length to the i32 prefix used on the wire
pub(super) fn length_prefix(len: usize) -> Result<i32, CodecError> {
    i32::try_from(len).map_err(|_| CodecError::PayloadTooLarge(len))
}
