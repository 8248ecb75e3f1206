//! Word-level helpers shared by the decoder and the encoder: bounds-checked
//! word reads, pointer and length-prefix resolution, and length-prefixed
//! writes.

use crate::{error::DecodingError, primitive::WORD_SIZE};
use alloc::{
    format,
    string::{String, ToString},
};
use alloy_primitives::U256;
use byteorder::{BigEndian, ByteOrder};
use bytes::{BufMut, BytesMut};

/// Largest pointer or length we accept: offsets must fit a signed 64-bit
/// integer.
const MAX_ADDRESSABLE_BITS: usize = 63;

/// Rounds `offset` up to the next multiple of `ALIGN`.
#[inline(always)]
pub const fn align_up<const ALIGN: usize>(offset: usize) -> usize {
    (offset + ALIGN - 1) / ALIGN * ALIGN
}

/// Reads the 32-byte word at `offset`.
pub fn read_word(buf: &[u8], offset: usize) -> Result<&[u8; WORD_SIZE], DecodingError> {
    let truncated = || DecodingError::Truncated {
        expected: offset.saturating_add(WORD_SIZE),
        found: buf.len(),
    };
    let end = offset
        .checked_add(WORD_SIZE)
        .filter(|end| *end <= buf.len())
        .ok_or_else(truncated)?;
    buf[offset..end].try_into().map_err(|_| truncated())
}

/// Reads the word at `offset` as a big-endian unsigned integer.
pub fn read_u256(buf: &[u8], offset: usize) -> Result<U256, DecodingError> {
    Ok(U256::from_be_bytes(*read_word(buf, offset)?))
}

/// Converts an offset or length to `usize` when it stays within the
/// addressable range.
fn to_addressable(value: U256) -> Option<usize> {
    if value.bit_len() > MAX_ADDRESSABLE_BITS {
        return None;
    }
    usize::try_from(value.as_limbs()[0]).ok()
}

/// Resolves the pointer word at `offset` to the absolute start of the
/// region it references, relative to `buf`.
pub fn read_pointer(buf: &[u8], offset: usize) -> Result<usize, DecodingError> {
    let pointer = read_u256(buf, offset)?;
    let overflow = || DecodingError::OffsetOverflow {
        offset: pointer.to_string(),
        len: buf.len(),
    };
    if pointer > U256::from(buf.len()) {
        return Err(overflow());
    }
    to_addressable(pointer).ok_or_else(overflow)
}

/// Resolves the length-prefixed region referenced by the pointer word at
/// `offset` and returns `(data_start, length)`.
///
/// The pointer locates the length word; data starts right after it. The
/// length counts bytes for `bytes`/`string` and elements for slices.
pub fn read_bytes_header(buf: &[u8], offset: usize) -> Result<(usize, usize), DecodingError> {
    let pointer = read_u256(buf, offset)?;
    let buf_len = U256::from(buf.len());

    let offset_end = pointer
        .checked_add(U256::from(WORD_SIZE))
        .filter(|end| *end <= buf_len)
        .ok_or_else(|| DecodingError::OffsetOverflow {
            offset: pointer.to_string(),
            len: buf.len(),
        })?;
    let data_start = to_addressable(offset_end).ok_or_else(|| DecodingError::OffsetOverflow {
        offset: offset_end.to_string(),
        len: buf.len(),
    })?;

    let length = read_u256(buf, data_start - WORD_SIZE)?;
    let length_overflow = |required: String| DecodingError::LengthOverflow {
        required,
        len: buf.len(),
    };
    let total = offset_end
        .checked_add(length)
        .ok_or_else(|| length_overflow(format!("{offset_end} + {length}")))?;
    if total > buf_len || to_addressable(total).is_none() {
        return Err(length_overflow(total.to_string()));
    }
    let length = to_addressable(length).ok_or_else(|| length_overflow(total.to_string()))?;

    Ok((data_start, length))
}

/// Reads the raw payload of a `bytes` or `string` value.
pub fn read_bytes(buf: &[u8], offset: usize) -> Result<&[u8], DecodingError> {
    let (data_start, length) = read_bytes_header(buf, offset)?;
    // `read_bytes_header` guarantees `data_start + length <= buf.len()`.
    buf.get(data_start..data_start + length)
        .ok_or(DecodingError::LengthOverflow {
            required: (data_start + length).to_string(),
            len: buf.len(),
        })
}

/// Appends `value` as a big-endian word.
pub fn write_usize_word(buf: &mut BytesMut, value: usize) {
    let mut word = [0u8; WORD_SIZE];
    BigEndian::write_u64(&mut word[WORD_SIZE - 8..], value as u64);
    buf.put_slice(&word);
}

/// Appends a length word followed by `data`, zero-padded to the word size.
/// Returns the number of bytes written.
pub fn write_bytes(buf: &mut BytesMut, data: &[u8], elements: usize) -> usize {
    let start = buf.len();
    write_usize_word(buf, elements);
    buf.put_slice(data);
    let padded = align_up::<WORD_SIZE>(data.len());
    buf.put_bytes(0, padded - data.len());
    buf.len() - start
}
