use crate::{
    error::EncodingError,
    primitive::{FunctionSelector, Hash, Identity, WORD_SIZE},
    types::field_key,
};
use alloc::{format, string::String, vec::Vec};
use alloy_primitives::{hex, Bytes, B256, I256, U256};
use core::fmt;

/// Decoded value tree. Its shape mirrors the [`AbiType`](crate::AbiType) that
/// produced it.
///
/// The bit width carried by `Int` and `Uint` is informational: the encoder
/// range-checks against the descriptor width, and equality ignores it, so
/// `Uint(5, 64)` equals the `Uint(5, 8)` a `uint8` slot decodes to.
#[derive(Debug, Clone, Eq)]
pub enum Value {
    Bool(bool),
    /// Signed integer and the bit width it was produced with.
    Int(I256, usize),
    /// Unsigned integer and the bit width it was produced with.
    Uint(U256, usize),
    /// Left-aligned bytes and the declared size.
    FixedBytes(B256, usize),
    Bytes(Bytes),
    /// Raw `string` payload. Not guaranteed to be valid UTF-8, see [`Value::as_str`].
    String(Bytes),
    Function(FunctionSelector),
    Identity(Identity),
    Hash(Hash),
    FixedArray(Vec<Value>),
    Array(Vec<Value>),
    /// Named fields in declaration order. Anonymous fields have an empty name.
    Tuple(Vec<(String, Value)>),
}

impl Value {
    pub fn string(text: impl Into<String>) -> Self {
        Self::String(Bytes::from(text.into().into_bytes()))
    }

    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(Bytes::from(data.into()))
    }

    /// `bytesN` value from the first `data.len()` bytes of a word. Fails
    /// unless `data` holds 1 to 32 bytes.
    pub fn fixed_bytes(data: &[u8]) -> Result<Self, EncodingError> {
        if data.is_empty() || data.len() > WORD_SIZE {
            return Err(EncodingError::TypeMismatch {
                expected: "bytes1..bytes32".into(),
                found: format!("{} bytes", data.len()),
            });
        }
        Ok(Self::FixedBytes(B256::right_padding_from(data), data.len()))
    }

    pub fn tuple<N: Into<String>>(fields: impl IntoIterator<Item = (N, Value)>) -> Self {
        Self::Tuple(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    /// Tuple whose fields carry no names.
    pub fn anonymous_tuple(values: impl IntoIterator<Item = Value>) -> Self {
        Self::Tuple(
            values
                .into_iter()
                .map(|value| (String::new(), value))
                .collect(),
        )
    }

    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(..) => "int",
            Self::Uint(..) => "uint",
            Self::FixedBytes(..) => "fixed bytes",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::Function(_) => "function",
            Self::Identity(_) => "identity",
            Self::Hash(_) => "hash",
            Self::FixedArray(_) => "fixed array",
            Self::Array(_) => "array",
            Self::Tuple(_) => "tuple",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(value, _) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            Self::Int(value, _) => Some(*value),
            _ => None,
        }
    }

    /// Payload of `bytes`, `string` and `bytesN` values.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(data) | Self::String(data) => Some(&data[..]),
            Self::FixedBytes(word, size) => Some(&word[..*size]),
            _ => None,
        }
    }

    /// Text of a `string` value, if it holds valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(data) => core::str::from_utf8(data).ok(),
            _ => None,
        }
    }

    /// Elements of a fixed array or a slice.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::FixedArray(values) | Self::Array(values) => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[(String, Value)]> {
        match self {
            Self::Tuple(fields) => Some(fields.as_slice()),
            _ => None,
        }
    }

    /// Tuple field looked up by [`field_key`] (`token_id` finds `tokenId`).
    pub fn field(&self, name: &str) -> Option<&Value> {
        let wanted = field_key(name);
        self.as_tuple()?
            .iter()
            .find(|(field, _)| field_key(field) == wanted)
            .map(|(_, value)| value)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a, _), Self::Int(b, _)) => a == b,
            (Self::Uint(a, _), Self::Uint(b, _)) => a == b,
            (Self::FixedBytes(a, a_size), Self::FixedBytes(b, b_size)) => {
                a_size == b_size && a == b
            }
            (Self::Bytes(a), Self::Bytes(b)) | (Self::String(a), Self::String(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => a == b,
            (Self::Identity(a), Self::Identity(b)) => a == b,
            (Self::Hash(a), Self::Hash(b)) => a == b,
            (Self::FixedArray(a), Self::FixedArray(b)) | (Self::Array(a), Self::Array(b)) => {
                a == b
            }
            (Self::Tuple(a), Self::Tuple(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value, _) => write!(f, "{value}"),
            Self::Uint(value, _) => write!(f, "{value}"),
            Self::FixedBytes(word, size) => write!(f, "0x{}", hex::encode(&word[..*size])),
            Self::Bytes(data) => write!(f, "0x{}", hex::encode(data)),
            Self::String(data) => write!(f, "{:?}", String::from_utf8_lossy(data)),
            Self::Function(selector) => write!(f, "{selector}"),
            Self::Identity(identity) => write!(f, "{identity}"),
            Self::Hash(hash) => write!(f, "{hash}"),
            Self::FixedArray(values) | Self::Array(values) => {
                f.write_str("[")?;
                for (index, value) in values.iter().enumerate() {
                    if index != 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
            Self::Tuple(fields) => {
                f.write_str("(")?;
                for (index, (name, value)) in fields.iter().enumerate() {
                    if index != 0 {
                        f.write_str(", ")?;
                    }
                    if !name.is_empty() {
                        write!(f, "{name}: ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str(")")
            }
        }
    }
}
