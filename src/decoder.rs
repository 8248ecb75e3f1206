use crate::{
    bytes::{read_bytes, read_bytes_header, read_pointer, read_word},
    config::CodecConfig,
    error::{CodecError, DecodingError},
    primitive::{FunctionSelector, Hash, Identity, FUNCTION_SELECTOR_LENGTH, WORD_SIZE},
    types::{AbiType, TypeKind},
    utils::Words,
    value::Value,
};
use alloc::{string::ToString, vec::Vec};
use alloy_primitives::{Bytes, Sign, B256, I256, U256};
use byteorder::{BigEndian, ByteOrder};
use tracing::trace;

/// Decodes a value of type `ty` whose head slot starts at `offset`.
pub fn decode(ty: &AbiType, buf: &[u8], offset: usize) -> Result<Value, CodecError> {
    Decoder::default().decode(ty, buf, offset)
}

/// Reads [`Value`] trees out of ABI-encoded buffers.
///
/// All pointers are resolved against the region that contains them: a
/// dynamic tuple or array is decoded from the sub-slice its pointer selects.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: CodecConfig,
}

impl Decoder {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn decode(&self, ty: &AbiType, buf: &[u8], offset: usize) -> Result<Value, CodecError> {
        trace!(ty = %ty, offset, buf = %Words(buf), "decode");
        Ok(self.decode_at(ty, buf, offset, 0)?)
    }

    /// Decodes a top-level parameter list: the buffer is an implicit tuple
    /// of `fields`, laid out from offset zero.
    pub fn decode_tuple<'a, I>(&self, fields: I, buf: &[u8]) -> Result<Value, CodecError>
    where
        I: IntoIterator<Item = (&'a str, &'a AbiType)>,
    {
        trace!(buf = %Words(buf), "decode tuple");
        Ok(self.decode_fields(fields, buf, 0)?)
    }

    fn decode_at(
        &self,
        ty: &AbiType,
        buf: &[u8],
        index: usize,
        depth: usize,
    ) -> Result<Value, DecodingError> {
        if depth > self.config.max_depth {
            return Err(DecodingError::DepthLimit(self.config.max_depth));
        }
        if ty.is_zero_sized() {
            return zero_sized_value(ty);
        }
        let word = read_word(buf, index)?;

        match ty.kind() {
            TypeKind::Tuple(fields) => {
                let region = if ty.is_dynamic() {
                    let start = read_pointer(buf, index)?;
                    trace!(ty = %ty, index, start, "tuple pointer");
                    &buf[start..]
                } else {
                    &buf[index..]
                };
                self.decode_fields(
                    fields.iter().map(|field| (field.name.as_str(), &field.ty)),
                    region,
                    depth + 1,
                )
            }
            TypeKind::Slice(elem) => {
                let (start, count) = read_bytes_header(buf, index)?;
                trace!(ty = %ty, index, start, count, "slice header");
                let values = self.decode_each(elem, &buf[start..], 0, count, depth + 1)?;
                Ok(Value::Array(values))
            }
            TypeKind::Array(size, elem) => {
                let values = if elem.is_dynamic() {
                    let start = read_pointer(buf, index)?;
                    trace!(ty = %ty, index, start, "array pointer");
                    self.decode_each(elem, &buf[start..], 0, *size, depth + 1)?
                } else {
                    self.decode_each(elem, buf, index, *size, depth + 1)?
                };
                Ok(Value::FixedArray(values))
            }
            TypeKind::String => {
                let payload = read_bytes(buf, index)?;
                if self.config.strict_utf8 && core::str::from_utf8(payload).is_err() {
                    return Err(DecodingError::InvalidUtf8);
                }
                Ok(Value::String(Bytes::copy_from_slice(payload)))
            }
            TypeKind::Bytes => Ok(Value::Bytes(Bytes::copy_from_slice(read_bytes(
                buf, index,
            )?))),
            TypeKind::Bool => read_bool(word).map(Value::Bool),
            TypeKind::Uint(bits) => Ok(Value::Uint(read_uint(word, *bits), *bits)),
            TypeKind::Int(bits) => Ok(Value::Int(read_int(word, *bits), *bits)),
            TypeKind::FixedBytes(size) => {
                let data = word
                    .get(..*size)
                    .ok_or_else(|| DecodingError::UnexpectedValue {
                        expected: "bytes1..bytes32".to_string(),
                        found: ty.to_string(),
                    })?;
                Ok(Value::FixedBytes(B256::right_padding_from(data), *size))
            }
            TypeKind::FunctionSelector => read_function_selector(word).map(Value::Function),
            TypeKind::Identity => Ok(Value::Identity(Identity::new(*word))),
            TypeKind::Hash => Ok(Value::Hash(Hash::new(*word))),
        }
    }

    /// Decodes `fields` in order from `region`, each at the cumulative head
    /// offset of the preceding ones.
    fn decode_fields<'a, I>(
        &self,
        fields: I,
        region: &[u8],
        depth: usize,
    ) -> Result<Value, DecodingError>
    where
        I: IntoIterator<Item = (&'a str, &'a AbiType)>,
    {
        let mut cursor = 0usize;
        let mut values = Vec::new();
        for (name, ty) in fields {
            let value = self.decode_at(ty, region, cursor, depth)?;
            cursor = cursor.saturating_add(ty.head_size());
            values.push((name.to_string(), value));
        }
        Ok(Value::Tuple(values))
    }

    /// Decodes `count` consecutive elements starting at `start`.
    fn decode_each(
        &self,
        elem: &AbiType,
        region: &[u8],
        start: usize,
        count: usize,
        depth: usize,
    ) -> Result<Vec<Value>, DecodingError> {
        let overflow = || DecodingError::ArrayOverflow {
            start,
            count,
            len: region.len(),
        };
        let stride = elem.head_size();
        if stride == 0 && count != 0 {
            // Nothing in the buffer bounds how many of these there are.
            return Err(zero_sized_elements(elem, count));
        }
        count
            .checked_mul(WORD_SIZE)
            .and_then(|size| size.checked_add(start))
            .filter(|end| *end <= region.len())
            .ok_or_else(overflow)?;

        let mut values = Vec::with_capacity(count);
        for i in 0..count {
            let index = i
                .checked_mul(stride)
                .and_then(|offset| offset.checked_add(start))
                .ok_or_else(overflow)?;
            values.push(self.decode_at(elem, region, index, depth)?);
        }
        Ok(values)
    }
}

/// Value of a static type that occupies no bytes.
fn zero_sized_value(ty: &AbiType) -> Result<Value, DecodingError> {
    match ty.kind() {
        TypeKind::Array(0, _) => Ok(Value::FixedArray(Vec::new())),
        TypeKind::Array(size, elem) => Err(zero_sized_elements(elem, *size)),
        TypeKind::Tuple(fields) => fields
            .iter()
            .map(|field| Ok((field.name.clone(), zero_sized_value(&field.ty)?)))
            .collect::<Result<_, _>>()
            .map(Value::Tuple),
        _ => Ok(Value::Tuple(Vec::new())),
    }
}

fn zero_sized_elements(elem: &AbiType, count: usize) -> DecodingError {
    DecodingError::ZeroSizedElements {
        ty: elem.to_string(),
        count,
    }
}

fn read_bool(word: &[u8; WORD_SIZE]) -> Result<bool, DecodingError> {
    if word[..WORD_SIZE - 1].iter().any(|b| *b != 0) {
        return Err(DecodingError::MalformedBool);
    }
    match word[WORD_SIZE - 1] {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(DecodingError::MalformedBool),
    }
}

fn read_function_selector(word: &[u8; WORD_SIZE]) -> Result<FunctionSelector, DecodingError> {
    let (selector, padding) = word.split_at(FUNCTION_SELECTOR_LENGTH);
    if padding.iter().any(|b| *b != 0) {
        return Err(DecodingError::BadFunctionSelector);
    }
    Ok(FunctionSelector::from_slice_truncated(selector))
}

/// Native widths read only their trailing bytes; anything else reads the
/// whole word.
fn read_uint(word: &[u8; WORD_SIZE], bits: usize) -> U256 {
    match bits {
        8 => U256::from(word[31]),
        16 => U256::from(BigEndian::read_u16(&word[30..])),
        32 => U256::from(BigEndian::read_u32(&word[28..])),
        64 => U256::from(BigEndian::read_u64(&word[24..])),
        _ => U256::from_be_bytes(*word),
    }
}

fn read_int(word: &[u8; WORD_SIZE], bits: usize) -> I256 {
    match bits {
        8 => sign_extend(word[31] as i8 as i64),
        16 => sign_extend(BigEndian::read_i16(&word[30..]) as i64),
        32 => sign_extend(BigEndian::read_i32(&word[28..]) as i64),
        64 => sign_extend(BigEndian::read_i64(&word[24..])),
        _ => from_twos_complement(U256::from_be_bytes(*word)),
    }
}

fn sign_extend(value: i64) -> I256 {
    let magnitude = U256::from(value.unsigned_abs());
    if value < 0 {
        I256::overflowing_from_sign_and_abs(Sign::Negative, magnitude).0
    } else {
        I256::from_raw(magnitude)
    }
}

/// Magnitudes above `2^255 - 1` are negative: the value is
/// `magnitude - 2^256`.
fn from_twos_complement(magnitude: U256) -> I256 {
    if magnitude <= I256::MAX.into_raw() {
        return I256::from_raw(magnitude);
    }
    let abs = (U256::MAX - magnitude).wrapping_add(U256::from(1u8));
    I256::overflowing_from_sign_and_abs(Sign::Negative, abs).0
}
