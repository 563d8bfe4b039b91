use std::collections::BTreeMap;

use serde_json::json;

use super::decode_value_exact;
use super::encode_value;
use super::from_json;
use super::to_json;
use super::ContractV3;
use super::EnumVariant;
use super::Error;
use super::Fields;
use super::FunctionV2;
use super::LookupTarget;
use super::ModuleSchema;
use super::Number;
use super::Result;
use super::SchemaType;
use super::SizeLength;
use super::TagWidthPolicy;
use super::Value;

type R<T> = Result<T>;

fn named(fields: Vec<(&str, SchemaType)>) -> SchemaType {
    SchemaType::Struct(Fields::Named(
        fields.into_iter().map(|(n, t)| (n.to_string(), t)).collect(),
    ))
}

// ==== SCHEMA PARSING ====

#[test]
fn test_schema_type_roundtrip() -> R<()> {
    let schema = SchemaType::Map(
        SizeLength::U16,
        Box::new(SchemaType::String(SizeLength::U8)),
        Box::new(SchemaType::Enum(vec![
            EnumVariant::new("Empty", Fields::None),
            EnumVariant::new("Holding", Fields::Unnamed(vec![SchemaType::U128])),
            EnumVariant::new(
                "Tagged",
                Fields::Named(vec![
                    ("owner".to_string(), SchemaType::AccountAddress),
                    ("since".to_string(), SchemaType::Timestamp),
                ]),
            ),
        ])),
    );
    let bytes = schema.to_bytes();
    assert_eq!(SchemaType::from_bytes(&bytes)?, schema);
    Ok(())
}

#[test]
fn test_schema_raw_bytes() -> R<()> {
    // tag 16 = list, size length 1 = u16 prefix, tag 4 = u32 items
    assert_eq!(
        SchemaType::from_bytes(&[16, 1, 4])?,
        SchemaType::List(SizeLength::U16, Box::new(SchemaType::U32))
    );
    assert_eq!(
        SchemaType::from_bytes(&[22, 0])?,
        SchemaType::String(SizeLength::U8)
    );
    Ok(())
}

#[test]
fn test_unknown_type_tag() {
    match SchemaType::from_bytes(&[99]) {
        Err(Error::SchemaParse { offset, .. }) => assert_eq!(offset, 0),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_unknown_fields_tag() {
    // struct whose fields tag is out of range
    match SchemaType::from_bytes(&[20, 3]) {
        Err(Error::SchemaParse { offset, .. }) => assert_eq!(offset, 1),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_truncated_schema() {
    match SchemaType::from_bytes(&[15, 4]) {
        Err(Error::SchemaParse { .. }) => {}
        other => panic!("expected parse error, got {:?}", other),
    }
}

// ==== MODULE SCHEMAS ====

fn sample_module_v3() -> ModuleSchema {
    let mut receive = BTreeMap::new();
    receive.insert(
        "increment".to_string(),
        FunctionV2 {
            parameter: Some(SchemaType::U64),
            return_value: Some(SchemaType::U64),
            error: Some(SchemaType::String(SizeLength::U32)),
        },
    );
    receive.insert(
        "reset".to_string(),
        FunctionV2::default(),
    );
    let contract = ContractV3 {
        init: Some(FunctionV2 {
            parameter: Some(named(vec![("start", SchemaType::U64)])),
            return_value: None,
            error: Some(SchemaType::String(SizeLength::U32)),
        }),
        receive,
        event: Some(SchemaType::Enum(vec![
            EnumVariant::new("Incremented", Fields::Unnamed(vec![SchemaType::U64])),
            EnumVariant::new("Reset", Fields::None),
        ])),
    };
    let mut contracts = BTreeMap::new();
    contracts.insert("counter".to_string(), contract);
    ModuleSchema::V3(contracts)
}

#[test]
fn test_module_v3_roundtrip() -> R<()> {
    let module = sample_module_v3();
    let bytes = module.to_bytes()?;
    assert_eq!(&bytes[..3], &[0xFF, 0xFF, 3]);
    assert_eq!(ModuleSchema::from_bytes(&bytes)?, module);
    Ok(())
}

#[test]
fn test_module_missing_prefix() {
    match ModuleSchema::from_bytes(&[0, 0, 0, 0]) {
        Err(Error::MissingVersionPrefix) => {}
        other => panic!("expected missing prefix, got {:?}", other),
    }
}

#[test]
fn test_module_unsupported_version() {
    match ModuleSchema::from_bytes(&[0xFF, 0xFF, 4, 0, 0, 0, 0]) {
        Err(Error::UnsupportedVersion { found: 4 }) => {}
        other => panic!("expected unsupported version, got {:?}", other),
    }
}

#[test]
fn test_unversioned_parsing() -> R<()> {
    // an empty contract map is just the u32 count
    let module = ModuleSchema::from_unversioned_bytes(&[0, 0, 0, 0], 0)?;
    assert_eq!(module, ModuleSchema::V0(BTreeMap::new()));
    // only versions 0 and 1 ever shipped without a prefix
    match ModuleSchema::from_unversioned_bytes(&[0, 0, 0, 0], 2) {
        Err(Error::UnsupportedVersion { found: 2 }) => {}
        other => panic!("expected unsupported version, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_function_v2_tag_bytes() -> R<()> {
    // version 2 module, one contract "c" whose init carries only an error
    // schema (function tag byte 3) and no receive functions
    let bytes = [
        0xFF, 0xFF, 2, // versioned prefix
        1, 0, 0, 0, // one contract
        1, 0, 0, 0, b'c', // name "c"
        1, // init present
        3, // error only
        2, // error schema: u8
        0, 0, 0, 0, // no receive functions
    ];
    let module = ModuleSchema::from_bytes(&bytes)?;
    match &module {
        ModuleSchema::V2(contracts) => {
            let init = contracts["c"].init.as_ref().unwrap();
            assert_eq!(init.parameter, None);
            assert_eq!(init.return_value, None);
            assert_eq!(init.error, Some(SchemaType::U8));
        }
        other => panic!("expected v2 module, got {:?}", other),
    }

    // tag byte 8 is out of range
    let mut bad = bytes.to_vec();
    bad[13] = 8;
    match ModuleSchema::from_bytes(&bad) {
        Err(Error::SchemaParse { .. }) => {}
        other => panic!("expected parse error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_lookup_errors() {
    let module = sample_module_v3();
    match module.init_param_schema("vault") {
        Err(Error::SchemaNotFound {
            contract,
            entrypoint: None,
            target: LookupTarget::Contract,
        }) => assert_eq!(contract, "vault"),
        other => panic!("expected contract miss, got {:?}", other),
    }
    match module.receive_param_schema("counter", "decrement") {
        Err(Error::SchemaNotFound {
            entrypoint: Some(ep),
            target: LookupTarget::Entrypoint,
            ..
        }) => assert_eq!(ep, "decrement"),
        other => panic!("expected entrypoint miss, got {:?}", other),
    }
    // "reset" exists but declares no parameter
    match module.receive_param_schema("counter", "reset") {
        Err(Error::SchemaNotFound {
            target: LookupTarget::Parameter,
            ..
        }) => {}
        other => panic!("expected parameter miss, got {:?}", other),
    }
    // state schemas only exist in version 0 modules
    match module.decode_state("counter", &[]) {
        Err(Error::SchemaNotFound {
            target: LookupTarget::State,
            ..
        }) => {}
        other => panic!("expected state miss, got {:?}", other),
    }
}

#[test]
fn test_module_dispatch_codec() -> R<()> {
    let module = sample_module_v3();
    let bytes = module.encode_receive_param("counter", "increment", &Value::number(41u64))?;
    assert_eq!(bytes, 41u64.to_le_bytes());
    let back = module.decode_receive_return_value("counter", "increment", &bytes)?;
    assert_eq!(back, Value::number(41u64));

    let event = module.decode_event("counter", &[0, 7, 0, 0, 0, 0, 0, 0, 0])?;
    assert_eq!(
        event,
        Value::object([("Incremented", Value::Array(vec![Value::number(7u64)]))])
    );
    Ok(())
}

// ==== VALUE ENCODING ====

#[test]
fn test_struct_end_to_end() -> R<()> {
    let schema = named(vec![
        ("a", SchemaType::U64),
        ("b", SchemaType::String(SizeLength::U8)),
    ]);
    let value = Value::object([
        ("a", Value::number(90071992547409910u64)),
        ("b", Value::string("hi")),
    ]);
    let bytes = encode_value(&schema, &value, TagWidthPolicy::NarrowestFit)?;
    let mut expected = 90071992547409910u64.to_le_bytes().to_vec();
    expected.extend([2, b'h', b'i']);
    assert_eq!(bytes, expected);
    // encoding is a pure function: same inputs, same bytes
    assert_eq!(encode_value(&schema, &value, TagWidthPolicy::NarrowestFit)?, bytes);
    assert_eq!(
        decode_value_exact(&schema, &bytes, TagWidthPolicy::NarrowestFit)?,
        value
    );
    Ok(())
}

#[test]
fn test_field_order_does_not_matter() -> R<()> {
    let schema = named(vec![("a", SchemaType::U8), ("b", SchemaType::U8)]);
    let forward = Value::object([("a", Value::number(1u8)), ("b", Value::number(2u8))]);
    let backward = Value::object([("b", Value::number(2u8)), ("a", Value::number(1u8))]);
    let policy = TagWidthPolicy::NarrowestFit;
    assert_eq!(encode_value(&schema, &forward, policy)?, vec![1, 2]);
    assert_eq!(encode_value(&schema, &backward, policy)?, vec![1, 2]);
    Ok(())
}

#[test]
fn test_missing_and_extra_fields() {
    let schema = named(vec![("a", SchemaType::U8)]);
    let policy = TagWidthPolicy::NarrowestFit;
    let missing = Value::Object(Vec::new());
    assert!(matches!(
        encode_value(&schema, &missing, policy),
        Err(Error::Serialization(_))
    ));
    let extra = Value::object([("a", Value::number(1u8)), ("z", Value::number(2u8))]);
    assert!(matches!(
        encode_value(&schema, &extra, policy),
        Err(Error::Serialization(_))
    ));
}

#[test]
fn test_numeric_ranges() -> R<()> {
    let policy = TagWidthPolicy::NarrowestFit;
    assert_eq!(
        encode_value(&SchemaType::U8, &Value::number(255u8), policy)?,
        vec![255]
    );
    assert!(encode_value(&SchemaType::U8, &Value::number(256u16), policy).is_err());
    assert_eq!(
        encode_value(&SchemaType::I8, &Value::number(-128i8), policy)?,
        vec![0x80]
    );
    assert!(encode_value(&SchemaType::I8, &Value::number(-129i16), policy).is_err());
    // decimal strings work where JSON numbers run out of range
    assert_eq!(
        encode_value(&SchemaType::U128, &Value::string(u128::MAX.to_string()), policy)?,
        u128::MAX.to_le_bytes()
    );
    Ok(())
}

#[test]
fn test_enum_tag_widths() -> R<()> {
    let two = SchemaType::Enum(vec![
        EnumVariant::new("A", Fields::None),
        EnumVariant::new("B", Fields::None),
    ]);
    let b = Value::string("B");
    assert_eq!(encode_value(&two, &b, TagWidthPolicy::NarrowestFit)?, vec![1]);
    assert_eq!(
        encode_value(&two, &b, TagWidthPolicy::AlwaysWide)?,
        vec![1, 0, 0, 0]
    );

    // 256 variants no longer fit a single tag byte
    let many = SchemaType::Enum(
        (0..256)
            .map(|i| EnumVariant::new(format!("V{}", i), Fields::None))
            .collect(),
    );
    let last = Value::string("V255");
    assert_eq!(
        encode_value(&many, &last, TagWidthPolicy::NarrowestFit)?,
        vec![255, 0]
    );
    assert_eq!(
        encode_value(&many, &last, TagWidthPolicy::AlwaysWide)?,
        vec![255, 0, 0, 0]
    );

    // the same tags must read back under each width regime
    let decoded_last = Value::object([("V255", Value::Array(vec![]))]);
    assert_eq!(
        decode_value_exact(&many, &[255, 0], TagWidthPolicy::NarrowestFit)?,
        decoded_last
    );
    assert_eq!(
        decode_value_exact(&many, &[255, 0, 0, 0], TagWidthPolicy::AlwaysWide)?,
        decoded_last
    );
    assert_eq!(
        decode_value_exact(&two, &[1, 0, 0, 0], TagWidthPolicy::AlwaysWide)?,
        Value::object([("B", Value::Array(vec![]))])
    );
    assert_eq!(
        decode_value_exact(&two, &[1], TagWidthPolicy::NarrowestFit)?,
        Value::object([("B", Value::Array(vec![]))])
    );
    Ok(())
}

#[test]
fn test_enum_payloads() -> R<()> {
    let schema = SchemaType::Enum(vec![
        EnumVariant::new("Nothing", Fields::None),
        EnumVariant::new("Some", Fields::Unnamed(vec![SchemaType::U8])),
    ]);
    let policy = TagWidthPolicy::NarrowestFit;
    let bytes = encode_value(
        &schema,
        &Value::object([("Some", Value::Array(vec![Value::number(9u8)]))]),
        policy,
    )?;
    assert_eq!(bytes, vec![1, 9]);
    // a bare name only works for fieldless variants
    assert!(encode_value(&schema, &Value::string("Some"), policy).is_err());
    assert_eq!(encode_value(&schema, &Value::string("Nothing"), policy)?, vec![0]);
    Ok(())
}

#[test]
fn test_tagged_enum_uses_declared_tags() -> R<()> {
    let schema = SchemaType::TaggedEnum(vec![
        (42, EnumVariant::new("Transfer", Fields::Unnamed(vec![SchemaType::U8]))),
        (250, EnumVariant::new("Mint", Fields::None)),
    ]);
    let policy = TagWidthPolicy::NarrowestFit;
    let bytes = encode_value(
        &schema,
        &Value::object([("Transfer", Value::Array(vec![Value::number(1u8)]))]),
        policy,
    )?;
    assert_eq!(bytes, vec![42, 1]);
    let back = decode_value_exact(&schema, &[250], policy)?;
    assert_eq!(back, Value::object([("Mint", Value::Array(vec![]))]));
    Ok(())
}

#[test]
fn test_amount_and_account_address() -> R<()> {
    let policy = TagWidthPolicy::NarrowestFit;
    let bytes = encode_value(&SchemaType::Amount, &Value::string("1000000"), policy)?;
    assert_eq!(bytes, 1_000_000u64.to_le_bytes());
    assert_eq!(
        decode_value_exact(&SchemaType::Amount, &bytes, policy)?,
        Value::string("1000000")
    );

    let addr = "01".repeat(32);
    let bytes = encode_value(&SchemaType::AccountAddress, &Value::string(&addr), policy)?;
    assert_eq!(bytes, vec![1; 32]);
    assert_eq!(
        decode_value_exact(&SchemaType::AccountAddress, &bytes, policy)?,
        Value::string(addr)
    );
    // wrong length is rejected before anything is written
    assert!(encode_value(&SchemaType::AccountAddress, &Value::string("0102"), policy).is_err());
    Ok(())
}

#[test]
fn test_contract_address_defaults_subindex() -> R<()> {
    let policy = TagWidthPolicy::NarrowestFit;
    let bytes = encode_value(
        &SchemaType::ContractAddress,
        &Value::object([("index", Value::number(7u64))]),
        policy,
    )?;
    let mut expected = 7u64.to_le_bytes().to_vec();
    expected.extend(0u64.to_le_bytes());
    assert_eq!(bytes, expected);
    assert_eq!(
        decode_value_exact(&SchemaType::ContractAddress, &bytes, policy)?,
        Value::object([
            ("index", Value::number(7u64)),
            ("subindex", Value::number(0u64)),
        ])
    );
    Ok(())
}

#[test]
fn test_timestamp_and_duration() -> R<()> {
    let policy = TagWidthPolicy::NarrowestFit;
    let bytes = encode_value(
        &SchemaType::Timestamp,
        &Value::string("2020-01-01T00:00:00Z"),
        policy,
    )?;
    assert_eq!(bytes, 1_577_836_800_000u64.to_le_bytes());
    assert_eq!(
        decode_value_exact(&SchemaType::Timestamp, &bytes, policy)?,
        Value::string("2020-01-01T00:00:00.000Z")
    );

    let bytes = encode_value(
        &SchemaType::Duration,
        &Value::string("10d 1h 2m 7s 1ms"),
        policy,
    )?;
    assert_eq!(bytes, 867_727_001u64.to_le_bytes());
    assert_eq!(
        decode_value_exact(&SchemaType::Duration, &bytes, policy)?,
        Value::number(867_727_001u64)
    );
    Ok(())
}

#[test]
fn test_leb128_byte_bounds() -> R<()> {
    let policy = TagWidthPolicy::NarrowestFit;
    let bytes = encode_value(&SchemaType::ULeb128(2), &Value::number(300u32), policy)?;
    assert_eq!(bytes, vec![0xAC, 0x02]);
    assert!(encode_value(&SchemaType::ULeb128(2), &Value::number(100_000u32), policy).is_err());

    assert_eq!(
        encode_value(&SchemaType::ILeb128(1), &Value::number(-64i8), policy)?,
        vec![0x40]
    );
    assert!(encode_value(&SchemaType::ILeb128(1), &Value::number(-65i8), policy).is_err());
    Ok(())
}

#[test]
fn test_string_prefix_overflow() {
    let long = "x".repeat(300);
    assert!(matches!(
        encode_value(
            &SchemaType::String(SizeLength::U8),
            &Value::string(long),
            TagWidthPolicy::NarrowestFit,
        ),
        Err(Error::Serialization(_))
    ));
}

#[test]
fn test_contract_and_receive_names() -> R<()> {
    let policy = TagWidthPolicy::NarrowestFit;
    let schema = SchemaType::ContractName(SizeLength::U16);
    let value = Value::object([("contract", Value::string("counter"))]);
    let bytes = encode_value(&schema, &value, policy)?;
    let mut expected = (12u16).to_le_bytes().to_vec();
    expected.extend(b"init_counter");
    assert_eq!(bytes, expected);
    assert_eq!(decode_value_exact(&schema, &bytes, policy)?, value);

    let schema = SchemaType::ReceiveName(SizeLength::U16);
    let value = Value::object([
        ("contract", Value::string("counter")),
        ("func", Value::string("increment")),
    ]);
    let bytes = encode_value(&schema, &value, policy)?;
    let mut expected = (17u16).to_le_bytes().to_vec();
    expected.extend(b"counter.increment");
    assert_eq!(bytes, expected);
    assert_eq!(decode_value_exact(&schema, &bytes, policy)?, value);

    // dots would make the init_ form ambiguous
    let dotted = Value::object([("contract", Value::string("a.b"))]);
    assert!(encode_value(&SchemaType::ContractName(SizeLength::U16), &dotted, policy).is_err());
    Ok(())
}

#[test]
fn test_byte_lists_and_arrays() -> R<()> {
    let policy = TagWidthPolicy::NarrowestFit;
    let bytes = encode_value(
        &SchemaType::ByteArray(4),
        &Value::string("deadbeef"),
        policy,
    )?;
    assert_eq!(bytes, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    assert!(encode_value(&SchemaType::ByteArray(4), &Value::string("dead"), policy).is_err());

    let bytes = encode_value(&SchemaType::ByteList(SizeLength::U8), &Value::string("ff00"), policy)?;
    assert_eq!(bytes, vec![2, 0xFF, 0x00]);
    assert_eq!(
        decode_value_exact(&SchemaType::ByteList(SizeLength::U8), &bytes, policy)?,
        Value::string("ff00")
    );
    Ok(())
}

// ==== VALUE DECODING ====

#[test]
fn test_decode_nested_roundtrip() -> R<()> {
    let schema = named(vec![
        (
            "owners",
            SchemaType::Map(
                SizeLength::U8,
                Box::new(SchemaType::String(SizeLength::U8)),
                Box::new(SchemaType::Bool),
            ),
        ),
        (
            "scores",
            SchemaType::List(SizeLength::U16, Box::new(SchemaType::I32)),
        ),
        ("pair", SchemaType::Pair(Box::new(SchemaType::Unit), Box::new(SchemaType::U8))),
    ]);
    let value = Value::object([
        (
            "owners",
            Value::Array(vec![Value::Array(vec![
                Value::string("ada"),
                Value::Bool(true),
            ])]),
        ),
        (
            "scores",
            Value::Array(vec![Value::number(-5i32), Value::number(17i32)]),
        ),
        ("pair", Value::Array(vec![Value::Unit, Value::number(3u8)])),
    ]);
    let policy = TagWidthPolicy::NarrowestFit;
    let bytes = encode_value(&schema, &value, policy)?;
    assert_eq!(decode_value_exact(&schema, &bytes, policy)?, value);
    Ok(())
}

#[test]
fn test_truncated_input() {
    // three u32 items promised, third one cut short
    let schema = SchemaType::List(SizeLength::U8, Box::new(SchemaType::U32));
    let bytes = [3, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0];
    match decode_value_exact(&schema, &bytes, TagWidthPolicy::NarrowestFit) {
        Err(Error::Underflow { expected, remaining }) => {
            assert_eq!(expected, 4);
            assert_eq!(remaining, 2);
        }
        other => panic!("expected underflow, got {:?}", other),
    }
}

#[test]
fn test_hostile_length_prefix() {
    // a u64 size prefix of u64::MAX must surface as underflow, with the
    // bytes after the prefix left unread
    let schema = SchemaType::ByteList(SizeLength::U64);
    match decode_value_exact(&schema, &[0xFF; 8], TagWidthPolicy::NarrowestFit) {
        Err(Error::Underflow { remaining: 0, .. }) => {}
        other => panic!("expected underflow, got {:?}", other),
    }
    let schema = SchemaType::String(SizeLength::U64);
    let mut bytes = u64::MAX.to_le_bytes().to_vec();
    bytes.extend(b"hi");
    match decode_value_exact(&schema, &bytes, TagWidthPolicy::NarrowestFit) {
        Err(Error::Underflow { remaining: 2, .. }) => {}
        other => panic!("expected underflow, got {:?}", other),
    }
}

#[test]
fn test_trailing_bytes() {
    match decode_value_exact(&SchemaType::U8, &[1, 2], TagWidthPolicy::NarrowestFit) {
        Err(Error::TrailingBytes { count: 1 }) => {}
        other => panic!("expected trailing bytes, got {:?}", other),
    }
}

#[test]
fn test_invalid_bool_byte() {
    assert!(decode_value_exact(&SchemaType::Bool, &[2], TagWidthPolicy::NarrowestFit).is_err());
}

#[test]
fn test_unknown_variant_tag() {
    let schema = SchemaType::Enum(vec![
        EnumVariant::new("A", Fields::None),
        EnumVariant::new("B", Fields::None),
        EnumVariant::new("C", Fields::None),
    ]);
    match decode_value_exact(&schema, &[5], TagWidthPolicy::NarrowestFit) {
        Err(Error::UnknownVariant { tag: 5 }) => {}
        other => panic!("expected unknown variant, got {:?}", other),
    }
}

#[test]
fn test_enum_decodes_to_named_object() -> R<()> {
    let schema = SchemaType::Enum(vec![
        EnumVariant::new("Off", Fields::None),
        EnumVariant::new(
            "On",
            Fields::Named(vec![("level".to_string(), SchemaType::U8)]),
        ),
    ]);
    let value = decode_value_exact(&schema, &[1, 7], TagWidthPolicy::NarrowestFit)?;
    assert_eq!(
        value,
        Value::object([("On", Value::object([("level", Value::number(7u8))]))])
    );
    Ok(())
}

// ==== JSON INTEROP ====

#[test]
fn test_json_big_integers_become_strings() {
    assert_eq!(
        to_json(&Value::Number(Number::Unsigned(u128::MAX))),
        json!(u128::MAX.to_string())
    );
    assert_eq!(
        to_json(&Value::Number(Number::Signed(i128::MIN))),
        json!(i128::MIN.to_string())
    );
    // in-range numbers stay numbers
    assert_eq!(to_json(&Value::number(42u64)), json!(42));
}

#[test]
fn test_json_floats_are_rejected() {
    assert!(from_json(&json!(1.5)).is_err());
}

#[test]
fn test_json_value_roundtrip() -> R<()> {
    let json = json!({
        "flag": true,
        "items": [1, -2, "three"],
        "nested": { "empty": null }
    });
    let value = from_json(&json)?;
    assert_eq!(value.field("flag"), Some(&Value::Bool(true)));
    assert_eq!(to_json(&value), json);
    Ok(())
}

// ==== PROPERTIES ====

mod props {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_u64_list_roundtrip(items in proptest::collection::vec(any::<u64>(), 0..50)) {
            let schema = SchemaType::List(SizeLength::U32, Box::new(SchemaType::U64));
            let value = Value::Array(items.iter().map(|v| Value::number(*v)).collect());
            let bytes = encode_value(&schema, &value, TagWidthPolicy::NarrowestFit).unwrap();
            let back = decode_value_exact(&schema, &bytes, TagWidthPolicy::NarrowestFit).unwrap();
            prop_assert_eq!(back, value);
        }

        #[test]
        fn prop_string_roundtrip(text in ".*") {
            let schema = SchemaType::String(SizeLength::U32);
            let value = Value::string(text);
            let bytes = encode_value(&schema, &value, TagWidthPolicy::NarrowestFit).unwrap();
            let back = decode_value_exact(&schema, &bytes, TagWidthPolicy::NarrowestFit).unwrap();
            prop_assert_eq!(back, value);
        }

        #[test]
        fn prop_i128_roundtrip(v in any::<i128>()) {
            let schema = SchemaType::I128;
            let value = Value::number(v);
            let bytes = encode_value(&schema, &value, TagWidthPolicy::NarrowestFit).unwrap();
            prop_assert_eq!(bytes.len(), 16);
            let back = decode_value_exact(&schema, &bytes, TagWidthPolicy::NarrowestFit).unwrap();
            prop_assert_eq!(back, value);
        }
    }
}
