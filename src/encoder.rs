use crate::{
    bytes::{write_bytes, write_usize_word},
    config::CodecConfig,
    error::{CodecError, EncodingError},
    primitive::{FUNCTION_SELECTOR_LENGTH, WORD_SIZE},
    types::{field_key, AbiType, TypeKind},
    utils::Words,
    value::Value,
};
use alloc::{format, string::ToString, vec::Vec};
use alloy_primitives::{Bytes, I256, U256};
use bytes::{BufMut, BytesMut};
use tracing::trace;

/// Encodes `value` as a one-element parameter list, so that
/// `decode(ty, &encode(ty, value)?, 0)` yields `value` back.
pub fn encode(ty: &AbiType, value: &Value) -> Result<Bytes, CodecError> {
    Encoder::default().encode(ty, value)
}

/// Writes [`Value`] trees in the word-based head/tail layout.
///
/// Static values are inlined in the head. Dynamic values leave a pointer in
/// the head, relative to the start of the enclosing region, and append their
/// payload to the tail.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: CodecConfig,
}

impl Encoder {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn encode(&self, ty: &AbiType, value: &Value) -> Result<Bytes, CodecError> {
        let buf = self.encode_region(&[(ty, value)], 0)?;
        trace!(ty = %ty, buf = %Words(&buf), "encode");
        Ok(buf.freeze().into())
    }

    /// Encodes `values` as the implicit tuple of `types`.
    pub fn encode_params<'a, I>(&self, types: I, values: &[Value]) -> Result<Bytes, CodecError>
    where
        I: IntoIterator<Item = &'a AbiType>,
    {
        let types: Vec<&AbiType> = types.into_iter().collect();
        if types.len() != values.len() {
            return Err(EncodingError::ArgumentCount {
                expected: types.len(),
                found: values.len(),
            }
            .into());
        }
        let items: Vec<_> = types.into_iter().zip(values).collect();
        let buf = self.encode_region(&items, 0)?;
        trace!(buf = %Words(&buf), "encode params");
        Ok(buf.freeze().into())
    }

    /// Lays out `items` as one region: heads first, then the tails of the
    /// dynamic items in declaration order.
    fn encode_region(
        &self,
        items: &[(&AbiType, &Value)],
        depth: usize,
    ) -> Result<BytesMut, EncodingError> {
        let too_large = || {
            let types: Vec<_> = items.iter().map(|(ty, _)| ty.canonical_name()).collect();
            EncodingError::SizeOverflow(format!("({})", types.join(",")))
        };
        let head_len = items
            .iter()
            .try_fold(0usize, |total, (ty, _)| total.checked_add(ty.head_size()))
            .ok_or_else(too_large)?;
        // Sized by what actually gets written, not by the declared head.
        let mut head = BytesMut::new();
        let mut tail = BytesMut::new();

        for (ty, value) in items {
            if ty.is_dynamic() {
                let pointer = head_len.checked_add(tail.len()).ok_or_else(too_large)?;
                write_usize_word(&mut head, pointer);
                self.encode_value(ty, value, &mut tail, depth)?;
            } else {
                self.encode_value(ty, value, &mut head, depth)?;
            }
        }

        head.unsplit(tail);
        Ok(head)
    }

    /// Writes the inline form of a static value, or the payload of a dynamic
    /// one.
    fn encode_value(
        &self,
        ty: &AbiType,
        value: &Value,
        out: &mut BytesMut,
        depth: usize,
    ) -> Result<(), EncodingError> {
        if depth > self.config.max_depth {
            return Err(EncodingError::DepthLimit(self.config.max_depth));
        }
        let mismatch = || EncodingError::TypeMismatch {
            expected: ty.to_string(),
            found: value.kind_name().to_string(),
        };

        match (ty.kind(), value) {
            (TypeKind::Bool, Value::Bool(flag)) => {
                out.put_slice(&U256::from(*flag as u8).to_be_bytes::<WORD_SIZE>());
            }
            (TypeKind::Uint(bits), Value::Uint(number, _)) => {
                if number.bit_len() > *bits {
                    return Err(out_of_range(ty, number));
                }
                out.put_slice(&number.to_be_bytes::<WORD_SIZE>());
            }
            (TypeKind::Int(bits), Value::Int(number, _)) => {
                if !int_fits(number, *bits) {
                    return Err(out_of_range(ty, number));
                }
                out.put_slice(&number.into_raw().to_be_bytes::<WORD_SIZE>());
            }
            (TypeKind::FixedBytes(size), Value::FixedBytes(data, found)) => {
                if size != found {
                    return Err(EncodingError::TypeMismatch {
                        expected: ty.to_string(),
                        found: format!("bytes{found}"),
                    });
                }
                let data = data.get(..*size).ok_or_else(mismatch)?;
                put_left_aligned(out, data);
            }
            (TypeKind::FunctionSelector, Value::Function(selector)) => {
                put_left_aligned(out, &selector.as_slice()[..FUNCTION_SELECTOR_LENGTH]);
            }
            (TypeKind::Identity, Value::Identity(identity)) => out.put_slice(identity.as_slice()),
            (TypeKind::Hash, Value::Hash(hash)) => out.put_slice(hash.as_slice()),
            (TypeKind::String, Value::String(data)) | (TypeKind::Bytes, Value::Bytes(data)) => {
                write_bytes(out, data, data.len());
            }
            (TypeKind::Slice(elem), Value::Array(values)) => {
                write_usize_word(out, values.len());
                self.encode_elements(elem, values, out, depth)?;
            }
            (TypeKind::Array(size, elem), Value::FixedArray(values)) => {
                if values.len() != *size {
                    return Err(EncodingError::ArrayLengthMismatch {
                        expected: *size,
                        found: values.len(),
                    });
                }
                self.encode_elements(elem, values, out, depth)?;
            }
            (TypeKind::Tuple(fields), Value::Tuple(entries)) => {
                if fields.len() != entries.len() {
                    return Err(EncodingError::ArgumentCount {
                        expected: fields.len(),
                        found: entries.len(),
                    });
                }
                let mut items = Vec::with_capacity(fields.len());
                for (field, (name, value)) in fields.iter().zip(entries) {
                    if !field.name.is_empty()
                        && !name.is_empty()
                        && field_key(&field.name) != field_key(name)
                    {
                        return Err(EncodingError::FieldMismatch {
                            expected: field.name.clone(),
                            found: name.clone(),
                        });
                    }
                    items.push((&field.ty, value));
                }
                out.unsplit(self.encode_region(&items, depth + 1)?);
            }
            _ => return Err(mismatch()),
        }
        Ok(())
    }

    fn encode_elements(
        &self,
        elem: &AbiType,
        values: &[Value],
        out: &mut BytesMut,
        depth: usize,
    ) -> Result<(), EncodingError> {
        let items: Vec<_> = values.iter().map(|value| (elem, value)).collect();
        out.unsplit(self.encode_region(&items, depth + 1)?);
        Ok(())
    }
}

fn put_left_aligned(out: &mut BytesMut, data: &[u8]) {
    out.put_slice(data);
    out.put_bytes(0, WORD_SIZE - data.len());
}

fn out_of_range(ty: &AbiType, value: &impl ToString) -> EncodingError {
    EncodingError::ValueOutOfRange {
        ty: ty.to_string(),
        value: value.to_string(),
    }
}

/// Whether `value` lies in `[-2^(bits-1), 2^(bits-1))`.
fn int_fits(value: &I256, bits: usize) -> bool {
    if bits >= 256 {
        return true;
    }
    if bits == 0 {
        return value.is_zero();
    }
    let bound = U256::from(1u8) << (bits - 1);
    let magnitude = value.unsigned_abs();
    if value.is_negative() {
        magnitude <= bound
    } else {
        magnitude < bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        convert::IntoValue,
        decoder::decode,
        primitive::{FunctionSelector, Hash, Identity},
        types::{ParamSpec, TupleField},
    };
    use hex_literal::hex;

    fn parse(signature: &str) -> AbiType {
        AbiType::parse(signature, &[]).unwrap()
    }

    fn uint(value: u64, bits: usize) -> Value {
        Value::Uint(U256::from(value), bits)
    }

    fn int(value: i64, bits: usize) -> Value {
        Value::Int(I256::try_from(value).unwrap(), bits)
    }

    fn assert_round_trip(ty: &AbiType, value: Value) {
        let encoded = encode(ty, &value).unwrap();
        assert_eq!(encoded.len() % WORD_SIZE, 0, "{ty}");
        let decoded = decode(ty, &encoded, 0).unwrap();
        assert_eq!(decoded, value, "{ty}");
    }

    #[test]
    fn test_encode_static_words() {
        let encoded = encode(&parse("uint32"), &uint(0x12345678, 32)).unwrap();
        assert_eq!(
            encoded[..],
            hex!("0000000000000000000000000000000000000000000000000000000012345678")
        );

        let encoded = encode(&parse("int16"), &int(-1, 16)).unwrap();
        assert_eq!(encoded[..], [0xff; 32]);

        let value = Value::fixed_bytes(&hex!("abcdef")).unwrap();
        let encoded = encode(&parse("bytes3"), &value).unwrap();
        assert_eq!(
            encoded[..],
            hex!("abcdef0000000000000000000000000000000000000000000000000000000000")
        );
    }

    #[test]
    fn test_encode_string() {
        let encoded = encode(&parse("string"), &Value::string("Hello, World")).unwrap();
        assert_eq!(
            encoded[..],
            hex!(
                "0000000000000000000000000000000000000000000000000000000000000020"
                "000000000000000000000000000000000000000000000000000000000000000c"
                "48656c6c6f2c20576f726c640000000000000000000000000000000000000000"
            )
        );
    }

    #[test]
    fn test_round_trip_leaves() {
        assert_round_trip(&parse("bool"), Value::Bool(true));
        assert_round_trip(&parse("uint8"), uint(255, 8));
        assert_round_trip(&parse("uint256"), Value::Uint(U256::MAX, 256));
        assert_round_trip(&parse("int8"), int(-128, 8));
        assert_round_trip(&parse("int64"), int(i64::MIN, 64));
        assert_round_trip(&parse("int256"), Value::Int(I256::MIN, 256));
        assert_round_trip(&parse("int200"), int(-42, 200));
        assert_round_trip(&parse("bytes32"), Value::fixed_bytes(&[0x5a; 32]).unwrap());
        assert_round_trip(
            &parse("function"),
            Value::Function(FunctionSelector::new([0x42; 24])),
        );
        assert_round_trip(&parse("identity"), Value::Identity(Identity::new([7; 32])));
        assert_round_trip(&parse("hash"), Value::Hash(Hash::new([9; 32])));
        assert_round_trip(&parse("bytes"), Value::bytes(vec![1u8; 33]));
        assert_round_trip(&parse("string"), Value::string(""));
    }

    #[test]
    fn test_round_trip_composites() {
        assert_round_trip(
            &parse("uint16[]"),
            Value::Array(vec![uint(1, 16), uint(2, 16), uint(3, 16)]),
        );
        assert_round_trip(&parse("string[]"), Value::Array(vec![]));
        assert_round_trip(
            &parse("string[2]"),
            Value::FixedArray(vec![Value::string("a"), Value::string("bc")]),
        );
        assert_round_trip(
            &parse("uint8[][2]"),
            Value::FixedArray(vec![
                Value::Array(vec![uint(1, 8)]),
                Value::Array(vec![uint(2, 8), uint(3, 8)]),
            ]),
        );
        assert_round_trip(
            &parse("bool[2][3]"),
            Value::FixedArray(vec![
                Value::FixedArray(vec![Value::Bool(true), Value::Bool(false)]),
                Value::FixedArray(vec![Value::Bool(false), Value::Bool(true)]),
                Value::FixedArray(vec![Value::Bool(true), Value::Bool(true)]),
            ]),
        );
        assert_round_trip(&parse("uint256[0]"), Value::FixedArray(vec![]));
    }

    #[test]
    fn test_round_trip_tuples() {
        let components = vec![
            ParamSpec::new("owner", "identity"),
            ParamSpec::new("tags", "string[]"),
            ParamSpec::new("limits", "uint32[2]"),
            ParamSpec::new("inner", "tuple").with_components(vec![
                ParamSpec::new("flag", "bool"),
                ParamSpec::new("data", "bytes"),
            ]),
        ];
        let ty = AbiType::parse("tuple[]", &components).unwrap();
        let item = |n: u8| {
            Value::tuple([
                ("owner", Value::Identity(Identity::new([n; 32]))),
                (
                    "tags",
                    Value::Array(vec![Value::string("x"), Value::string("yz")]),
                ),
                (
                    "limits",
                    Value::FixedArray(vec![uint(n as u64, 32), uint(7, 32)]),
                ),
                (
                    "inner",
                    Value::tuple([
                        ("flag", Value::Bool(n % 2 == 0)),
                        ("data", Value::bytes(vec![n; n as usize])),
                    ]),
                ),
            ])
        };
        assert_round_trip(&ty, Value::Array(vec![item(1), item(2), item(3)]));

        let static_tuple = parse("(uint8,(bool,hash),int32[2])");
        assert_round_trip(
            &static_tuple,
            Value::anonymous_tuple([
                uint(1, 8),
                Value::anonymous_tuple([Value::Bool(true), Value::Hash(Hash::new([3; 32]))]),
                Value::FixedArray(vec![int(-5, 32), int(5, 32)]),
            ]),
        );
    }

    #[test]
    fn test_encode_params_layout() {
        let types = [parse("uint256"), parse("string"), parse("bool")];
        let values = [uint(1, 256), Value::string("ab"), Value::Bool(true)];
        let encoded = Encoder::default()
            .encode_params(types.iter(), &values)
            .unwrap();
        assert_eq!(
            encoded[..],
            hex!(
                "0000000000000000000000000000000000000000000000000000000000000001"
                "0000000000000000000000000000000000000000000000000000000000000060"
                "0000000000000000000000000000000000000000000000000000000000000001"
                "0000000000000000000000000000000000000000000000000000000000000002"
                "6162000000000000000000000000000000000000000000000000000000000000"
            )
        );

        let err = Encoder::default()
            .encode_params(types.iter(), &values[..2])
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::Encoding(EncodingError::ArgumentCount {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_encode_rejects_mismatches() {
        assert!(matches!(
            encode(&parse("uint256"), &Value::Bool(true)),
            Err(CodecError::Encoding(EncodingError::TypeMismatch { .. }))
        ));
        assert!(matches!(
            encode(&parse("uint8"), &uint(256, 8)),
            Err(CodecError::Encoding(EncodingError::ValueOutOfRange { .. }))
        ));
        assert!(matches!(
            encode(&parse("int8"), &int(128, 8)),
            Err(CodecError::Encoding(EncodingError::ValueOutOfRange { .. }))
        ));
        assert!(matches!(
            encode(&parse("int8"), &int(-129, 8)),
            Err(CodecError::Encoding(EncodingError::ValueOutOfRange { .. }))
        ));
        assert!(matches!(
            encode(&parse("bytes4"), &Value::fixed_bytes(&[1, 2]).unwrap()),
            Err(CodecError::Encoding(EncodingError::TypeMismatch { .. }))
        ));
        assert!(matches!(
            encode(&parse("uint8[2]"), &Value::FixedArray(vec![uint(1, 8)])),
            Err(CodecError::Encoding(EncodingError::ArrayLengthMismatch {
                expected: 2,
                found: 1
            }))
        ));
        assert!(matches!(
            encode(&parse("uint8[2]"), &Value::Array(vec![uint(1, 8), uint(2, 8)])),
            Err(CodecError::Encoding(EncodingError::TypeMismatch { .. }))
        ));
    }

    #[test]
    fn test_encode_checks_field_names() {
        let ty = AbiType::parse("tuple", &[
            ParamSpec::new("token_id", "uint256"),
            ParamSpec::new("owner", "identity"),
        ])
        .unwrap();

        let value = Value::tuple([
            ("tokenId", uint(1, 256)),
            ("", Value::Identity(Identity::ZERO)),
        ]);
        assert!(encode(&ty, &value).is_ok());

        let value = Value::tuple([
            ("amount", uint(1, 256)),
            ("owner", Value::Identity(Identity::ZERO)),
        ]);
        assert!(matches!(
            encode(&ty, &value),
            Err(CodecError::Encoding(EncodingError::FieldMismatch { .. }))
        ));
    }

    #[test]
    fn test_encode_matches_acronym_field_names() {
        let ty = AbiType::parse("tuple", &[
            ParamSpec::new("tokenURI", "string"),
            ParamSpec::new("ownerID", "uint64"),
        ])
        .unwrap();
        let value = Value::tuple([
            ("token_uri", Value::string("x")),
            ("owner_id", uint(3, 64)),
        ]);
        let decoded = decode(&ty, &encode(&ty, &value).unwrap(), 0).unwrap();
        assert_eq!(decoded.field("token_uri").and_then(Value::as_str), Some("x"));
        assert_eq!(decoded.field("OwnerId").and_then(Value::as_uint), Some(U256::from(3u64)));
    }

    #[test]
    fn test_encode_oversized_types() {
        let huge = AbiType::array(AbiType::uint(256), 1 << 59);
        assert!(matches!(
            encode(&huge, &Value::FixedArray(vec![])),
            Err(CodecError::Encoding(EncodingError::ArrayLengthMismatch { .. }))
        ));

        let pair = AbiType::tuple(vec![
            TupleField::new("a", huge.clone()),
            TupleField::new("b", huge),
        ]);
        let value = Value::tuple([
            ("a", Value::FixedArray(vec![])),
            ("b", Value::FixedArray(vec![])),
        ]);
        assert!(matches!(
            encode(&pair, &value),
            Err(CodecError::Encoding(EncodingError::SizeOverflow(_)))
        ));
    }

    #[test]
    fn test_encode_width_is_taken_from_descriptor() {
        let ty = parse("uint8");
        let value = 5u64.into_value();
        let decoded = decode(&ty, &encode(&ty, &value).unwrap(), 0).unwrap();
        assert_eq!(decoded, Value::Uint(U256::from(5u64), 8));
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_encode_depth_limit() {
        let encoder = Encoder::new(CodecConfig::default().with_max_depth(1));
        let value = Value::FixedArray(vec![Value::FixedArray(vec![uint(1, 8)])]);
        assert!(matches!(
            encoder.encode(&parse("uint8[1][1]"), &value),
            Err(CodecError::Encoding(EncodingError::DepthLimit(1)))
        ));
    }

    #[test]
    fn test_int_fits() {
        assert!(int_fits(&I256::try_from(127i64).unwrap(), 8));
        assert!(int_fits(&I256::try_from(-128i64).unwrap(), 8));
        assert!(!int_fits(&I256::try_from(128i64).unwrap(), 8));
        assert!(int_fits(&I256::MIN, 256));
    }
}
