//! Nullable encodings
//!
//! Nullable values are NOT wire-compatible with their non-nullable
//! counterparts. Reading a nullable encoding with the plain reader (or the
//! other way around) misparses; this is part of the format.
//!
//! - bool: one byte, `0b11` = true, `0b10` = false, `0` = absent
//! - string: i32 length `-1` = absent, otherwise the plain string encoding
//! - everything else: one presence byte, then the plain encoding when present

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::CodecError;
use super::reader::CacheReader;
use super::writer::CacheWriter;
use super::CacheCodec;
use crate::constants::{
    NULLABLE_BOOL_ABSENT, NULLABLE_BOOL_FALSE, NULLABLE_BOOL_TRUE, NULLABLE_STRING_ABSENT_LEN,
};

impl<'a> CacheReader<'a> {
    fn read_nullable<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<T, CodecError>,
    ) -> Result<Option<T>, CodecError> {
        if !self.read_bool()? {
            return Ok(None);
        }
        read(self).map(Some)
    }

    pub fn read_nullable_bool(&mut self) -> Result<Option<bool>, CodecError> {
        Ok(match self.read_u8()? & 0b11 {
            NULLABLE_BOOL_TRUE => Some(true),
            NULLABLE_BOOL_FALSE => Some(false),
            _ => None,
        })
    }

    pub fn read_nullable_u8(&mut self) -> Result<Option<u8>, CodecError> {
        self.read_nullable(Self::read_u8)
    }

    pub fn read_nullable_i8(&mut self) -> Result<Option<i8>, CodecError> {
        self.read_nullable(Self::read_i8)
    }

    pub fn read_nullable_i16(&mut self) -> Result<Option<i16>, CodecError> {
        self.read_nullable(Self::read_i16)
    }

    pub fn read_nullable_i32(&mut self) -> Result<Option<i32>, CodecError> {
        self.read_nullable(Self::read_i32)
    }

    pub fn read_nullable_i64(&mut self) -> Result<Option<i64>, CodecError> {
        self.read_nullable(Self::read_i64)
    }

    pub fn read_nullable_f32(&mut self) -> Result<Option<f32>, CodecError> {
        self.read_nullable(Self::read_f32)
    }

    pub fn read_nullable_f64(&mut self) -> Result<Option<f64>, CodecError> {
        self.read_nullable(Self::read_f64)
    }

    pub fn read_nullable_char(&mut self) -> Result<Option<char>, CodecError> {
        self.read_nullable(Self::read_char)
    }

    pub fn read_nullable_string(&mut self) -> Result<Option<String>, CodecError> {
        let len = self.read_i32()?;
        if len == NULLABLE_STRING_ABSENT_LEN {
            return Ok(None);
        }
        self.read_string_payload(len).map(Some)
    }

    pub fn read_nullable_serialized<T: DeserializeOwned>(&mut self) -> Result<Option<T>, CodecError> {
        self.read_nullable(Self::read_serialized)
    }

    pub fn read_nullable_object<T, C>(&mut self, codec: &C) -> Result<Option<T>, CodecError>
    where
        C: CacheCodec<T> + ?Sized,
    {
        self.read_nullable(|reader| codec.read(reader))
    }
}

impl<'a> CacheWriter<'a> {
    fn write_nullable<T>(
        &mut self,
        value: Option<T>,
        write: impl FnOnce(&mut Self, T) -> Result<(), CodecError>,
    ) -> Result<(), CodecError> {
        match value {
            None => self.write_bool(false),
            Some(value) => {
                self.write_bool(true)?;
                write(self, value)
            }
        }
    }

    pub fn write_nullable_bool(&mut self, value: Option<bool>) -> Result<(), CodecError> {
        self.write_u8(match value {
            Some(true) => NULLABLE_BOOL_TRUE,
            Some(false) => NULLABLE_BOOL_FALSE,
            None => NULLABLE_BOOL_ABSENT,
        })
    }

    pub fn write_nullable_u8(&mut self, value: Option<u8>) -> Result<(), CodecError> {
        self.write_nullable(value, Self::write_u8)
    }

    pub fn write_nullable_i8(&mut self, value: Option<i8>) -> Result<(), CodecError> {
        self.write_nullable(value, Self::write_i8)
    }

    pub fn write_nullable_i16(&mut self, value: Option<i16>) -> Result<(), CodecError> {
        self.write_nullable(value, Self::write_i16)
    }

    pub fn write_nullable_i32(&mut self, value: Option<i32>) -> Result<(), CodecError> {
        self.write_nullable(value, Self::write_i32)
    }

    pub fn write_nullable_i64(&mut self, value: Option<i64>) -> Result<(), CodecError> {
        self.write_nullable(value, Self::write_i64)
    }

    pub fn write_nullable_f32(&mut self, value: Option<f32>) -> Result<(), CodecError> {
        self.write_nullable(value, Self::write_f32)
    }

    pub fn write_nullable_f64(&mut self, value: Option<f64>) -> Result<(), CodecError> {
        self.write_nullable(value, Self::write_f64)
    }

    pub fn write_nullable_char(&mut self, value: Option<char>) -> Result<(), CodecError> {
        self.write_nullable(value, Self::write_char)
    }

    pub fn write_nullable_string(&mut self, value: Option<&str>) -> Result<(), CodecError> {
        match value {
            None => self.write_i32(NULLABLE_STRING_ABSENT_LEN),
            Some(value) => self.write_string(value),
        }
    }

    pub fn write_nullable_serialized<T: Serialize + ?Sized>(
        &mut self,
        value: Option<&T>,
    ) -> Result<(), CodecError> {
        self.write_nullable(value, |writer, value| writer.write_serialized(value))
    }

    pub fn write_nullable_object<T, C>(&mut self, value: Option<&T>, codec: &C) -> Result<(), CodecError>
    where
        C: CacheCodec<T> + ?Sized,
    {
        self.write_nullable(value, |writer, value| codec.write(value, writer))
    }
}
