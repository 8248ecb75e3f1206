use abi_codec::{
    decode, encode, Abi, AbiTuple, AbiType, DecodingError, FromValue, Identity, IntoValue,
    ParamSpec, Value,
};
use alloy_primitives::U256;

#[derive(Debug, Clone, PartialEq, AbiTuple)]
struct Holder {
    holder: Identity,
    token_id: U256,
    memo: String,
    tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, AbiTuple)]
struct Registry {
    name: String,
    holders: Vec<Holder>,
    r#type: u8,
}

#[derive(Debug, Clone, PartialEq, AbiTuple)]
struct Token {
    token_uri: String,
    owner_id: u64,
}

#[derive(Debug, Clone, PartialEq, AbiTuple)]
struct Empty {}

fn holder_components() -> Vec<ParamSpec> {
    vec![
        ParamSpec::new("holder", "identity"),
        ParamSpec::new("tokenId", "uint256"),
        ParamSpec::new("memo", "string"),
        ParamSpec::new("tags", "string[]"),
    ]
}

fn sample_holder(n: u8) -> Holder {
    Holder {
        holder: Identity::new([n; 32]),
        token_id: U256::from(n as u64 * 1000),
        memo: format!("holder #{n}"),
        tags: vec!["gold".to_string(); n as usize],
    }
}

#[test]
fn test_struct_round_trip() {
    let ty = AbiType::parse("tuple", &holder_components()).unwrap();
    let original = sample_holder(3);

    let encoded = encode(&ty, &original.clone().into_value()).unwrap();
    let decoded = decode(&ty, &encoded, 0).unwrap();
    assert_eq!(decoded.field("tokenId"), Some(&Value::Uint(U256::from(3000u64), 256)));
    assert_eq!(Holder::from_value(decoded).unwrap(), original);
}

#[test]
fn test_nested_structs() {
    let components = vec![
        ParamSpec::new("name", "string"),
        ParamSpec::new("holders", "tuple[]").with_components(holder_components()),
        ParamSpec::new("type", "uint8"),
    ];
    let ty = AbiType::parse("tuple", &components).unwrap();
    let original = Registry {
        name: "registry".to_string(),
        holders: vec![sample_holder(1), sample_holder(2)],
        r#type: 7,
    };

    let encoded = encode(&ty, &original.clone().into_value()).unwrap();
    let decoded = Registry::from_value(decode(&ty, &encoded, 0).unwrap()).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn test_fields_are_matched_by_name() {
    let value = Value::tuple([
        ("tags", Vec::<String>::new().into_value()),
        ("memo", "reordered".into_value()),
        ("token_id", U256::from(5u64).into_value()),
        ("holder", Identity::ZERO.into_value()),
    ]);
    let holder = Holder::from_value(value).unwrap();
    assert_eq!(holder.memo, "reordered");
    assert_eq!(holder.token_id, U256::from(5u64));
}

#[test]
fn test_anonymous_fields_are_matched_by_position() {
    let ty = AbiType::parse("(identity,uint256,string,string[])", &[]).unwrap();
    let original = sample_holder(2);
    let value = Value::anonymous_tuple([
        original.holder.into_value(),
        original.token_id.into_value(),
        original.memo.clone().into_value(),
        original.tags.clone().into_value(),
    ]);
    let encoded = encode(&ty, &value).unwrap();
    let decoded = Holder::from_value(decode(&ty, &encoded, 0).unwrap()).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn test_missing_field() {
    let value = Value::tuple([("holder", Identity::ZERO.into_value())]);
    assert!(matches!(
        Holder::from_value(value),
        Err(DecodingError::UnexpectedValue { .. })
    ));
}

#[test]
fn test_decode_into() {
    let abi = Abi::from_json(
        r#"[{
            "type": "function",
            "name": "holderOf",
            "inputs": [{"name": "id", "type": "uint256"}],
            "outputs": [
                {"name": "holder", "type": "identity"},
                {"name": "token_id", "type": "uint256"},
                {"name": "memo", "type": "string"},
                {"name": "tags", "type": "string[]"}
            ]
        }]"#,
    )
    .unwrap();

    let original = sample_holder(4);
    let outputs = abi.lookup_method_outputs("holderOf").unwrap();
    let Value::Tuple(fields) = original.clone().into_value() else {
        panic!("struct must convert into a tuple");
    };
    let args: Vec<Value> = fields.into_iter().map(|(_, value)| value).collect();
    let data = abi_codec::Encoder::default()
        .encode_params(outputs.iter().map(|param| &param.ty), &args)
        .unwrap();

    let decoded: Holder = abi.decode_into("holderOf", &data).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn test_acronym_field_names() {
    let components = vec![
        ParamSpec::new("tokenURI", "string"),
        ParamSpec::new("ownerID", "uint64"),
    ];
    let ty = AbiType::parse("tuple", &components).unwrap();
    let original = Token {
        token_uri: "ipfs://token".to_string(),
        owner_id: 42,
    };

    let encoded = encode(&ty, &original.clone().into_value()).unwrap();
    let decoded = decode(&ty, &encoded, 0).unwrap();
    assert_eq!(decoded.field("tokenURI").and_then(Value::as_str), Some("ipfs://token"));
    assert_eq!(Token::from_value(decoded).unwrap(), original);
}

#[test]
fn test_empty_struct() {
    let ty = AbiType::parse("()", &[]).unwrap();
    let encoded = encode(&ty, &Empty {}.into_value()).unwrap();
    assert!(encoded.is_empty());
    assert_eq!(Empty::from_value(decode(&ty, &encoded, 0).unwrap()).unwrap(), Empty {});
}
