//! 编解码性质测试。
//!
//! # 设计目的（Why）
//! - 固定向量只能覆盖有限样本，往返一致性与 ZigZag 双射需要在整个定义域上成立；
//! - 任意字节输入都必须得到 `Ok` 或确定的错误，绝不允许 panic 或越界读取。
//!
//! # 结构说明（How）
//! - `varint_*`/`zigzag_*`：直接对底层模块做性质验证；
//! - `typed_*`：经由原生类型桥接的往返，覆盖序列、映射、可选与元组的组合；
//! - `arbitrary_input_*`：随机字节喂给复合 Schema，只断言不 panic 且成功时消费量合法。

use std::collections::BTreeMap;

use proptest::prelude::*;
use spark_codec_postcard::{
    EnumSchema, IntKind, Schema, StructSchema, take_from_slice,
    typed::{from_bytes, to_vec},
    varint, zigzag,
    zigzag::ZigZag,
};

fn composite_schema() -> Schema {
    Schema::Struct(
        StructSchema::new("Envelope")
            .field("id", IntKind::U64)
            .field("tags", Schema::seq(Schema::String))
            .field(
                "body",
                Schema::Enum(
                    EnumSchema::new("Body")
                        .unit_variant("Empty")
                        .tuple_variant("Raw", [Schema::Bytes])
                        .tuple_variant("Pair", [Schema::int(IntKind::I16), Schema::F32]),
                ),
            )
            .field(
                "extra",
                Schema::option(Schema::map(Schema::int(IntKind::U8), Schema::Bool)),
            ),
    )
}

proptest! {
    #[test]
    fn varint_round_trips_every_width(value in any::<u128>()) {
        let encoded = varint::encode(value);
        prop_assert!(encoded.len() <= varint::MAX_VARINT_LEN);
        prop_assert_eq!(varint::decode(&encoded, 128), Ok((value, encoded.len())));
        for bits in [8u32, 16, 32, 64] {
            if varint::fits(value, bits) {
                prop_assert!(encoded.len() <= varint::max_len(bits));
                prop_assert_eq!(varint::decode(&encoded, bits), Ok((value, encoded.len())));
            } else {
                prop_assert!(varint::decode(&encoded, bits).is_err());
            }
        }
    }

    #[test]
    fn zigzag_is_a_bijection(value in any::<i64>(), raw in any::<u64>()) {
        prop_assert_eq!(i64::unzigzag(value.zigzag()), value);
        prop_assert_eq!(i64::unzigzag(raw).zigzag(), raw);
        prop_assert_eq!(zigzag::encode(i128::from(value)), u128::from(value.zigzag()));
    }

    #[test]
    fn zigzag_wide_entry_is_a_bijection(value in any::<i128>()) {
        prop_assert_eq!(zigzag::decode(zigzag::encode(value)), value);
    }

    #[test]
    fn typed_sequences_round_trip(items in proptest::collection::vec((any::<u16>(), proptest::option::of(".{0,8}")), 0..16)) {
        let bytes = to_vec(items.clone()).expect("编码");
        prop_assert_eq!(from_bytes::<Vec<(u16, Option<String>)>>(&bytes), Ok(items));
    }

    #[test]
    fn typed_maps_round_trip(map in proptest::collection::btree_map(any::<i32>(), proptest::collection::vec(any::<u8>(), 0..8), 0..8)) {
        let bytes = to_vec(map.clone()).expect("编码");
        prop_assert_eq!(from_bytes::<BTreeMap<i32, Vec<u8>>>(&bytes), Ok(map));
    }

    #[test]
    fn typed_wide_integers_round_trip(a in any::<i128>(), b in any::<u128>(), c in any::<isize>()) {
        let bytes = to_vec((a, b, c)).expect("编码");
        prop_assert_eq!(from_bytes::<(i128, u128, isize)>(&bytes), Ok((a, b, c)));
    }

    #[test]
    fn arbitrary_input_never_panics(input in proptest::collection::vec(any::<u8>(), 0..64)) {
        let schema = composite_schema();
        if let Ok((_, rest)) = take_from_slice(&schema, &input) {
            prop_assert!(rest.len() <= input.len());
        }
    }
}
