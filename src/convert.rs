//! Conversions between Rust types and [`Value`] trees.

use crate::{
    error::DecodingError,
    primitive::{FunctionSelector, Hash, Identity},
    types::field_key,
    value::Value,
};
use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};
use alloy_primitives::{Bytes, FixedBytes, B256, I256, U256};

pub trait IntoValue {
    fn into_value(self) -> Value;
}

pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, DecodingError>;
}

fn unexpected(expected: impl Into<String>, found: &Value) -> DecodingError {
    DecodingError::UnexpectedValue {
        expected: expected.into(),
        found: found.kind_name().to_string(),
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        Ok(value)
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        value.as_bool().ok_or_else(|| unexpected("bool", &value))
    }
}

macro_rules! impl_uint {
    ($($t:ty => $bits:expr),* $(,)?) => {
        $(
            impl IntoValue for $t {
                fn into_value(self) -> Value {
                    Value::Uint(U256::from(self), $bits)
                }
            }

            impl FromValue for $t {
                fn from_value(value: Value) -> Result<Self, DecodingError> {
                    let number = value
                        .as_uint()
                        .ok_or_else(|| unexpected(stringify!($t), &value))?;
                    <$t>::try_from(number).map_err(|_| DecodingError::UnexpectedValue {
                        expected: stringify!($t).to_string(),
                        found: number.to_string(),
                    })
                }
            }
        )*
    };
}

macro_rules! impl_int {
    ($($t:ty => $bits:expr),* $(,)?) => {
        $(
            impl IntoValue for $t {
                fn into_value(self) -> Value {
                    // i128 and narrower always fit
                    Value::Int(I256::try_from(self).unwrap_or_default(), $bits)
                }
            }

            impl FromValue for $t {
                fn from_value(value: Value) -> Result<Self, DecodingError> {
                    let number = value
                        .as_int()
                        .ok_or_else(|| unexpected(stringify!($t), &value))?;
                    <$t>::try_from(number).map_err(|_| DecodingError::UnexpectedValue {
                        expected: stringify!($t).to_string(),
                        found: number.to_string(),
                    })
                }
            }
        )*
    };
}

impl_uint!(u8 => 8, u16 => 16, u32 => 32, u64 => 64, u128 => 128);
impl_int!(i8 => 8, i16 => 16, i32 => 32, i64 => 64, i128 => 128);

impl IntoValue for U256 {
    fn into_value(self) -> Value {
        Value::Uint(self, 256)
    }
}

impl FromValue for U256 {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        value.as_uint().ok_or_else(|| unexpected("uint", &value))
    }
}

impl IntoValue for I256 {
    fn into_value(self) -> Value {
        Value::Int(self, 256)
    }
}

impl FromValue for I256 {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        value.as_int().ok_or_else(|| unexpected("int", &value))
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::string(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::string(self)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        match value {
            Value::String(data) => {
                String::from_utf8(data.to_vec()).map_err(|_| DecodingError::InvalidUtf8)
            }
            other => Err(unexpected("string", &other)),
        }
    }
}

impl IntoValue for Bytes {
    fn into_value(self) -> Value {
        Value::Bytes(self)
    }
}

impl FromValue for Bytes {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        match value {
            Value::Bytes(data) => Ok(data),
            other => Err(unexpected("bytes", &other)),
        }
    }
}

macro_rules! impl_fixed_bytes {
    ($($n:literal)*) => {
        $(
            impl IntoValue for FixedBytes<$n> {
                fn into_value(self) -> Value {
                    Value::FixedBytes(B256::right_padding_from(self.as_slice()), $n)
                }
            }

            impl FromValue for FixedBytes<$n> {
                fn from_value(value: Value) -> Result<Self, DecodingError> {
                    match &value {
                        Value::FixedBytes(word, $n) => Ok(FixedBytes::<$n>::from_slice(&word[..$n])),
                        _ => Err(unexpected(concat!("bytes", $n), &value)),
                    }
                }
            }
        )*
    };
}

impl_fixed_bytes!(
    1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16
    17 18 19 20 21 22 23 24 25 26 27 28 29 30 31 32
);

macro_rules! impl_leaf {
    ($($t:ident => $name:literal),*) => {
        $(
            impl IntoValue for $t {
                fn into_value(self) -> Value {
                    Value::$t(self)
                }
            }

            impl FromValue for $t {
                fn from_value(value: Value) -> Result<Self, DecodingError> {
                    match value {
                        Value::$t(inner) => Ok(inner),
                        other => Err(unexpected($name, &other)),
                    }
                }
            }
        )*
    };
}

impl_leaf!(Identity => "identity", Hash => "hash");

impl IntoValue for FunctionSelector {
    fn into_value(self) -> Value {
        Value::Function(self)
    }
}

impl FromValue for FunctionSelector {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        match value {
            Value::Function(selector) => Ok(selector),
            other => Err(unexpected("function", &other)),
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::Array(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        match value {
            Value::Array(values) | Value::FixedArray(values) => {
                values.into_iter().map(T::from_value).collect()
            }
            other => Err(unexpected("array", &other)),
        }
    }
}

impl<T: IntoValue, const N: usize> IntoValue for [T; N] {
    fn into_value(self) -> Value {
        Value::FixedArray(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue, const N: usize> FromValue for [T; N] {
    fn from_value(value: Value) -> Result<Self, DecodingError> {
        let values = Vec::<T>::from_value(value)?;
        let found = values.len();
        values
            .try_into()
            .map_err(|_| DecodingError::UnexpectedValue {
                expected: format!("array of {N} elements"),
                found: format!("{found} elements"),
            })
    }
}

macro_rules! impl_tuple {
    ($len:literal; $($name:ident),+) => {
        impl<$($name: IntoValue),+> IntoValue for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_value(self) -> Value {
                let ($($name,)+) = self;
                Value::anonymous_tuple([$($name.into_value()),+])
            }
        }

        impl<$($name: FromValue),+> FromValue for ($($name,)+) {
            fn from_value(value: Value) -> Result<Self, DecodingError> {
                let fields = match value {
                    Value::Tuple(fields) if fields.len() == $len => fields,
                    other => return Err(unexpected(concat!("tuple of ", $len, " fields"), &other)),
                };
                let mut fields = fields.into_iter().map(|(_, value)| value);
                Ok(($(
                    $name::from_value(fields.next().ok_or_else(|| DecodingError::UnexpectedValue {
                        expected: concat!("tuple of ", $len, " fields").to_string(),
                        found: "fewer fields".to_string(),
                    })?)?,
                )+))
            }
        }
    };
}

impl_tuple!(1; T1);
impl_tuple!(2; T1, T2);
impl_tuple!(3; T1, T2, T3);
impl_tuple!(4; T1, T2, T3, T4);
impl_tuple!(5; T1, T2, T3, T4, T5);
impl_tuple!(6; T1, T2, T3, T4, T5, T6);
impl_tuple!(7; T1, T2, T3, T4, T5, T6, T7);
impl_tuple!(8; T1, T2, T3, T4, T5, T6, T7, T8);

/// Field access for `#[derive(AbiTuple)]`: fields are matched by
/// [`field_key`], and anonymous fields by position.
#[doc(hidden)]
pub struct FieldReader {
    fields: Vec<(String, Option<Value>)>,
}

impl FieldReader {
    pub fn new(value: Value) -> Result<Self, DecodingError> {
        match value {
            Value::Tuple(fields) => Ok(Self {
                fields: fields
                    .into_iter()
                    .map(|(name, value)| (field_key(&name), Some(value)))
                    .collect(),
            }),
            other => Err(unexpected("tuple", &other)),
        }
    }

    /// Takes the field matching `name`, falling back to an anonymous field
    /// at `index`.
    pub fn take(&mut self, index: usize, name: &str) -> Result<Value, DecodingError> {
        let key = field_key(name);
        let position = self
            .fields
            .iter()
            .position(|(field, _)| *field == key)
            .or_else(|| match self.fields.get(index) {
                Some((name, _)) if name.is_empty() => Some(index),
                _ => None,
            });
        position
            .and_then(|position| self.fields.get_mut(position))
            .and_then(|(_, value)| value.take())
            .ok_or_else(|| DecodingError::UnexpectedValue {
                expected: format!("field `{name}`"),
                found: "tuple without it".to_string(),
            })
    }
}
