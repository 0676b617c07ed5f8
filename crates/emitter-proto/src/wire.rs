//! Field readers shared by the UUID and event decoders.
//!
//! Fixed-width integers either decode fully or fail with
//! [`ReadError::UnexpectedEof`] ([`ReadError::Eof`] when nothing is left).
//! Variable-length reads take whatever is available and report a short count.

use bytes::{Buf, Bytes};

use crate::errors::ReadError;

/// Check that `len` bytes are available for a fixed-width read.
pub(crate) fn ensure(src: &impl Buf, len: usize) -> Result<(), ReadError> {
    match src.remaining() {
        0 if len > 0 => Err(ReadError::Eof),
        available if available < len => Err(ReadError::UnexpectedEof),
        _ => Ok(()),
    }
}

pub(crate) fn read_u8(src: &mut impl Buf) -> Result<u8, ReadError> {
    ensure(src, 1)?;
    Ok(src.get_u8())
}

pub(crate) fn read_u16(src: &mut impl Buf) -> Result<u16, ReadError> {
    ensure(src, 2)?;
    Ok(src.get_u16())
}

pub(crate) fn read_u32(src: &mut impl Buf) -> Result<u32, ReadError> {
    ensure(src, 4)?;
    Ok(src.get_u32())
}

/// Read exactly `len` bytes.
///
/// A partial read still consumes what was available before failing with
/// [`ReadError::Short`].
pub(crate) fn read_bytes(src: &mut impl Buf, len: usize) -> Result<Bytes, ReadError> {
    if len == 0 {
        return Ok(Bytes::new());
    }

    let available = src.remaining();
    if available == 0 {
        return Err(ReadError::Eof);
    }
    if available < len {
        src.advance(available);
        return Err(ReadError::Short { read: available, expected: len });
    }

    Ok(src.copy_to_bytes(len))
}
