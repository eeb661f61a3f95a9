//! Variable-length integer encoding utilities.
//!
//! Base-128 encoding with a continuation bit, as used by the graph codec.
//! Small values take one byte; a `u32` never takes more than five.

use byteorder::ReadBytesExt;
use std::io::{Read, Write};

use crate::error::{FalcataError, Result};

/// Write a variable-length encoded u64 to a writer, returning the number of
/// bytes written.
pub fn write_u64<W: Write>(writer: &mut W, value: u64) -> Result<usize> {
    let mut val = value;
    let mut written = 0;

    loop {
        let mut byte = (val & 0x7F) as u8;
        val >>= 7;

        if val != 0 {
            byte |= 0x80; // Set continuation bit
        }

        writer.write_all(&[byte])?;
        written += 1;

        if val == 0 {
            return Ok(written);
        }
    }
}

/// Write a variable-length encoded u32 to a writer.
pub fn write_u32<W: Write>(writer: &mut W, value: u32) -> Result<usize> {
    write_u64(writer, value as u64)
}

/// Read a variable-length encoded u64 from a reader.
pub fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut result = 0u64;
    let mut shift = 0;

    loop {
        let byte = reader.read_u8()?;

        if shift >= 64 {
            return Err(FalcataError::serialization("VarInt overflow"));
        }

        result |= ((byte & 0x7F) as u64) << shift;

        if (byte & 0x80) == 0 {
            return Ok(result);
        }

        shift += 7;
    }
}

/// Read a variable-length encoded u32 from a reader.
pub fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let value = read_u64(reader)?;
    u32::try_from(value).map_err(|_| FalcataError::serialization("VarInt overflow"))
}

/// Map a signed value onto the unsigned varint space (zigzag encoding), so
/// small magnitudes of either sign stay short on the wire.
pub fn encode_zigzag32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Inverse of [`encode_zigzag32`].
pub fn decode_zigzag32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}
