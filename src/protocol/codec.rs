//! Protocol codec
//!
//! Tagged scalar primitives for the FTL wire format.
//!
//! ## Wire Format
//!
//! Every value is preceded by a one-byte tag (MessagePack-style):
//! ```text
//! ┌──────────┬─────────────────────────────────────┐
//! │ Tag (1)  │ Payload (big-endian)                │
//! └──────────┴─────────────────────────────────────┘
//! ```
//!
//! | Tag  | Value          | Payload                    |
//! |------|----------------|----------------------------|
//! | 0xD2 | int32          | 4 bytes                    |
//! | 0xD3 | int64          | 8 bytes                    |
//! | 0xCA | float32        | 4 bytes IEEE-754           |
//! | 0xCC | uint8          | 1 byte                     |
//! | 0xDB | string         | len (4) + UTF-8 bytes      |
//! | 0xDE | map16 header   | count (2)                  |
//! | 0xC1 | END            | none                       |
//!
//! A read that hits END returns `Ok(None)`; the caller decides whether that
//! terminates a list or breaks a record.

use std::io::{self, BufRead, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use super::Command;
use crate::error::{FtlError, Result};

/// Maximum accepted string payload (16 MB)
pub const MAX_STRING_LEN: u32 = 16 * 1024 * 1024;

/// Tag bytes
pub mod tag {
    pub const INT32: u8 = 0xd2;
    pub const INT64: u8 = 0xd3;
    pub const FLOAT32: u8 = 0xca;
    pub const UINT8: u8 = 0xcc;
    pub const STRING: u8 = 0xdb;
    pub const MAP16: u8 = 0xde;
    pub const END: u8 = 0xc1;
}

// =============================================================================
// Decoding
// =============================================================================

/// Reads tagged values from a buffered byte stream
///
/// Holds no state besides the stream, so one reader per response is all a
/// decoder needs.
pub struct WireReader<R> {
    inner: R,
}

impl<R: BufRead> WireReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// True when the peer closed the stream and nothing is left to read
    pub fn at_eof(&mut self) -> Result<bool> {
        let buf = self.inner.fill_buf().map_err(FtlError::Read)?;
        Ok(buf.is_empty())
    }

    /// Read one tag byte
    pub fn read_tag(&mut self, expected: &'static str) -> Result<u8> {
        let [tag] = self.read_array::<1>(expected)?;
        Ok(tag)
    }

    /// Read a 4-byte big-endian integer that carries no tag
    pub fn read_raw_u32(&mut self, expected: &'static str) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array(expected)?))
    }

    pub fn read_i32(&mut self) -> Result<Option<i32>> {
        if !self.expect_tag(tag::INT32, "int32")? {
            return Ok(None);
        }
        Ok(Some(i32::from_be_bytes(self.read_array("int32")?)))
    }

    pub fn read_i64(&mut self) -> Result<Option<i64>> {
        if !self.expect_tag(tag::INT64, "int64")? {
            return Ok(None);
        }
        Ok(Some(i64::from_be_bytes(self.read_array("int64")?)))
    }

    pub fn read_f32(&mut self) -> Result<Option<f32>> {
        if !self.expect_tag(tag::FLOAT32, "float32")? {
            return Ok(None);
        }
        Ok(Some(f32::from_be_bytes(self.read_array("float32")?)))
    }

    pub fn read_u8(&mut self) -> Result<Option<u8>> {
        if !self.expect_tag(tag::UINT8, "uint8")? {
            return Ok(None);
        }
        let [value] = self.read_array::<1>("uint8")?;
        Ok(Some(value))
    }

    pub fn read_string(&mut self) -> Result<Option<String>> {
        if !self.expect_tag(tag::STRING, "string")? {
            return Ok(None);
        }

        let len = u32::from_be_bytes(self.read_array("string length")?);
        if len > MAX_STRING_LEN {
            return Err(FtlError::Protocol(format!(
                "String too large: {} bytes (max {})",
                len, MAX_STRING_LEN
            )));
        }

        let mut value = vec![0u8; len as usize];
        self.read_exact(&mut value, "string")?;
        Ok(Some(String::from_utf8(value)?))
    }

    /// Read a map16 header, the element count of a fixed array
    pub fn read_map16(&mut self) -> Result<Option<u16>> {
        if !self.expect_tag(tag::MAP16, "map16")? {
            return Ok(None);
        }
        Ok(Some(u16::from_be_bytes(self.read_array("map16")?)))
    }

    /// Consume the tag; `false` on END, error on anything but `wanted`
    fn expect_tag(&mut self, wanted: u8, expected: &'static str) -> Result<bool> {
        match self.read_tag(expected)? {
            tag::END => Ok(false),
            found if found == wanted => Ok(true),
            found => Err(FtlError::FormatMismatch { expected, found }),
        }
    }

    fn read_array<const N: usize>(&mut self, expected: &'static str) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf, expected)?;
        Ok(buf)
    }

    fn read_exact(&mut self, buf: &mut [u8], expected: &'static str) -> Result<()> {
        self.inner.read_exact(buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => FtlError::Truncated { expected },
            _ => FtlError::Read(e),
        })
    }
}

/// Turn an END read into an error where a value is mandatory
pub fn required<T>(value: Option<T>, expected: &'static str) -> Result<T> {
    value.ok_or(FtlError::UnexpectedEnd { expected })
}

// =============================================================================
// Encoding
// =============================================================================

/// Builds daemon-shaped response bytes
///
/// The daemon is the only real producer of this format; the builder exists
/// for the stub daemon, tests and benchmarks.
#[derive(Debug, Default, Clone)]
pub struct FrameBuilder {
    buf: BytesMut,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn int32(mut self, value: i32) -> Self {
        self.buf.put_u8(tag::INT32);
        self.buf.put_i32(value);
        self
    }

    pub fn int64(mut self, value: i64) -> Self {
        self.buf.put_u8(tag::INT64);
        self.buf.put_i64(value);
        self
    }

    pub fn float32(mut self, value: f32) -> Self {
        self.buf.put_u8(tag::FLOAT32);
        self.buf.put_f32(value);
        self
    }

    pub fn uint8(mut self, value: u8) -> Self {
        self.buf.put_u8(tag::UINT8);
        self.buf.put_u8(value);
        self
    }

    pub fn string(mut self, value: &str) -> Self {
        self.buf.put_u8(tag::STRING);
        self.buf.put_u32(value.len() as u32);
        self.buf.put_slice(value.as_bytes());
        self
    }

    pub fn map16(mut self, count: u16) -> Self {
        self.buf.put_u8(tag::MAP16);
        self.buf.put_u16(count);
        self
    }

    /// A lead byte followed by an untagged 4-byte value
    pub fn raw_u32(mut self, lead: u8, value: u32) -> Self {
        self.buf.put_u8(lead);
        self.buf.put_u32(value);
        self
    }

    pub fn end(mut self) -> Self {
        self.buf.put_u8(tag::END);
        self
    }

    /// Append arbitrary bytes (used to build malformed streams)
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.put_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write a command literal to a stream, verbatim and without delimiter
pub fn write_command<W: Write>(writer: &mut W, command: Command) -> Result<()> {
    writer.write_all(command.literal().as_bytes())?;
    writer.flush()?;
    Ok(())
}
