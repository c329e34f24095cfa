//! Primitive decoding from a byte stream
//!
//! All multi-byte values are big-endian. Variable-length values carry their
//! own length prefix, so decoding never relies on end-of-stream.

use std::io::{self, ErrorKind, Read};

use serde::de::DeserializeOwned;

use super::error::CodecError;
use super::CacheCodec;

/// Read access to an encoded cache entry.
///
/// Each reader owns its scratch space, so concurrent decodes never share
/// mutable buffers.
pub struct CacheReader<'a> {
    stream: &'a mut dyn Read,
}

impl<'a> CacheReader<'a> {
    pub fn new(stream: &'a mut dyn Read) -> Self {
        Self { stream }
    }

    /// The underlying stream. Codecs must not close or replace it.
    pub fn stream(&mut self) -> &mut dyn Read {
        &mut *self.stream
    }

    /// Fill `buf` completely or fail with `Truncated`
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), CodecError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(CodecError::Truncated {
                        expected: buf.len(),
                        actual: filled,
                    })
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut scratch = [0u8; N];
        self.fill(&mut scratch)?;
        Ok(scratch)
    }

    /// Skip up to `n` bytes, returning how many were actually skipped
    pub fn skip(&mut self, n: u64) -> Result<u64, CodecError> {
        let skipped = io::copy(&mut (&mut *self.stream).take(n), &mut io::sink())?;
        Ok(skipped)
    }

    /// Single read into `buf`; returns the number of bytes read.
    ///
    /// Fails with `Truncated` when the stream is already exhausted.
    pub fn read_into_buffer(&mut self, buf: &mut [u8]) -> Result<usize, CodecError> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            match self.stream.read(buf) {
                Ok(0) => {
                    return Err(CodecError::Truncated {
                        expected: buf.len(),
                        actual: 0,
                    })
                }
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read exactly `len` bytes
    pub fn read_buffer(&mut self, len: usize) -> Result<Vec<u8>, CodecError> {
        let mut buf = vec![0u8; len];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        Ok(self.read_u8()? == 1)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, CodecError> {
        Ok(i8::from_be_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, CodecError> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, CodecError> {
        Ok(f32::from_bits(self.read_i32()? as u32))
    }

    pub fn read_f64(&mut self) -> Result<f64, CodecError> {
        Ok(f64::from_bits(self.read_i64()? as u64))
    }

    /// Read a single 16-bit code unit. Lone surrogates are rejected.
    pub fn read_char(&mut self) -> Result<char, CodecError> {
        let unit = self.read_i16()? as u16;
        char::from_u32(u32::from(unit)).ok_or(CodecError::InvalidChar(unit))
    }

    /// Read a length-prefixed UTF-8 string
    pub fn read_string(&mut self) -> Result<String, CodecError> {
        let len = self.read_i32()?;
        self.read_string_payload(len)
    }

    pub(super) fn read_string_payload(&mut self, len: i32) -> Result<String, CodecError> {
        if len < 0 {
            return Err(CodecError::InvalidLength(len));
        }
        if len == 0 {
            return Ok(String::new());
        }
        // Grows with the bytes actually present, not the declared length
        let expected = len as usize;
        let mut bytes = Vec::new();
        (&mut *self.stream).take(expected as u64).read_to_end(&mut bytes)?;
        if bytes.len() < expected {
            return Err(CodecError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(String::from_utf8(bytes)?)
    }

    /// Read a payload produced by the host serialization mechanism (MessagePack).
    ///
    /// The payload is self-delimiting and passed through without extra framing.
    pub fn read_serialized<T: DeserializeOwned>(&mut self) -> Result<T, CodecError> {
        Ok(rmp_serde::from_read(&mut *self.stream)?)
    }

    /// Read a nested value through another codec
    pub fn read_object<T, C>(&mut self, codec: &C) -> Result<T, CodecError>
    where
        C: CacheCodec<T> + ?Sized,
    {
        codec.read(self)
    }
}
