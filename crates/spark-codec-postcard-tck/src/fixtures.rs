//! 黄金向量对应的参考类型与程序化构造的值。
//!
//! # 教案式说明
//! - **意图（Why）**：向量文件只保存字节，期望值必须由代码独立构造，才能同时验证"解码正确"与"编码正确"两个方向；
//! - **结构（How）**：[`registry`] 注册全部参考类型，[`value`] 按用例标签返回对应的值；
//!   边界用例以类型名（如 `u8`、`option<u8>`）注册为别名，使所有用例都能以 `schema_ref` 统一寻址；
//! - **契约（What）**：参考类型与值在任何语言实现中都应得到完全相同的字节，修改任何一处都必须同步更新向量文件。

use spark_codec_postcard::{
    Codec, EnumSchema, Field, IntKind, Schema, SchemaRegistry, StructSchema, Value, fields,
};

/// 全部用例标签及其 `schema_ref`，按向量文件中的顺序排列。
pub const CASES: [(&str, &str); 14] = [
    ("all_types", "AllTests"),
    ("primitives", "PrimitiveTypes"),
    ("containers", "ContainerTypes"),
    ("compound", "CompoundTypes"),
    ("collections", "AllocTypes"),
    ("heapless_collections", "HeaplessTypes"),
    ("nested_modules", "e::E"),
    ("boundary_u8_max", "u8"),
    ("boundary_bool_true", "bool"),
    ("boundary_option_none", "option<u8>"),
    ("boundary_option_some", "option<u8>"),
    ("boundary_empty_seq", "seq<u8>"),
    ("boundary_i8_negative_one", "i8"),
    ("boundary_varint_128", "u32"),
];

const FILL: u8 = 123;

fn int(kind: IntKind) -> Schema {
    Schema::int(kind)
}

fn struct_container() -> StructSchema {
    StructSchema::new("StructContainer")
        .field("a", IntKind::U8)
        .field("b", IntKind::U16)
        .field("c", IntKind::U32)
        .field("d", IntKind::U64)
}

fn enum_container() -> EnumSchema {
    EnumSchema::new("EnumContainer")
        .unit_variant("A")
        .tuple_variant("B", [int(IntKind::U8)])
        .tuple_variant("C", [int(IntKind::U8), Schema::named("StructContainer")])
        .struct_variant(
            "D",
            fields([
                ("a", int(IntKind::U8)),
                ("b", Schema::named("StructContainer")),
            ]),
        )
}

fn container_types() -> StructSchema {
    StructSchema::new("ContainerTypes")
        .field("u", Schema::named("UnionContainer"))
        .field("e_a", Schema::named("EnumContainer"))
        .field("e_b", Schema::named("EnumContainer"))
        .field("e_c", Schema::named("EnumContainer"))
        .field("e_d", Schema::named("EnumContainer"))
        .field("t", Schema::named("TupleContainer"))
        .field("s", Schema::named("StructContainer"))
}

fn primitive_types() -> StructSchema {
    let mut schema = StructSchema::new("PrimitiveTypes");
    for kind in [
        IntKind::U8,
        IntKind::U16,
        IntKind::U32,
        IntKind::U64,
        IntKind::U128,
        IntKind::Usize,
    ] {
        schema = schema.field(kind.name(), kind);
    }
    for kind in [
        IntKind::I8,
        IntKind::I16,
        IntKind::I32,
        IntKind::I64,
        IntKind::I128,
        IntKind::Isize,
    ] {
        schema = schema
            .field(format!("{kind}_max"), kind)
            .field(format!("{kind}_min"), kind);
    }
    schema
        .field("f32", Schema::F32)
        .field("f64", Schema::F64)
        .field("bool_true", Schema::Bool)
        .field("bool_false", Schema::Bool)
        .field("none_zero", Schema::non_zero(IntKind::U8))
}

fn compound_types() -> StructSchema {
    StructSchema::new("CompoundTypes")
        .field("static_byte_slice", Schema::array(int(IntKind::U8), 10))
        .field("static_str", Schema::String)
        .field("array", Schema::array(int(IntKind::U32), 10))
        .field("range", Schema::range(int(IntKind::U16)))
        .field("option_some", Schema::option(int(IntKind::U8)))
        .field("option_none", Schema::option(int(IntKind::U8)))
        .field(
            "tuple",
            Schema::tuple([
                int(IntKind::U8),
                Schema::named("StructContainer"),
                Schema::named("EnumContainer"),
                Schema::named("TupleContainer"),
            ]),
        )
}

fn alloc_types() -> StructSchema {
    StructSchema::new("AllocTypes")
        .field("a", Schema::seq(int(IntKind::U8)))
        .field("b", Schema::String)
        .field("c", Schema::map(int(IntKind::U8), int(IntKind::U8)))
}

fn heapless_types() -> StructSchema {
    StructSchema::new("HeaplessTypes")
        .field("a", Schema::Bytes)
        .field("b", Schema::String)
        .field("c", Schema::map(int(IntKind::U16), int(IntKind::U32)))
}

fn all_tests() -> StructSchema {
    StructSchema::new("AllTests")
        .field("a", Schema::named("ContainerTypes"))
        .field("b", Schema::named("PrimitiveTypes"))
        .field("c", Schema::named("CompoundTypes"))
        .field("d", Schema::named("AllocTypes"))
        .field("e", Schema::named("HeaplessTypes"))
        .field("f", Schema::named("e::E"))
}

/// 注册全部参考类型与边界别名。
///
/// 注册表只在 TCK 内部构造，名称均为常量，重复注册视为夹具本身的缺陷。
pub fn registry() -> anyhow::Result<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    registry.register_struct(struct_container())?;
    registry.register_struct(StructSchema::new("UnionContainer"))?;
    registry.register_enum(enum_container())?;
    registry.register(
        "TupleContainer",
        Schema::tuple([
            int(IntKind::U8),
            Schema::named("StructContainer"),
            Schema::named("EnumContainer"),
        ]),
    )?;
    registry.register_struct(container_types())?;
    registry.register_struct(primitive_types())?;
    registry.register_struct(compound_types())?;
    registry.register_struct(alloc_types())?;
    registry.register_struct(heapless_types())?;
    registry.register("e::f::F", Schema::tuple([int(IntKind::U8)]))?;
    registry.register(
        "e::E",
        Schema::tuple([int(IntKind::U8), Schema::named("e::f::F")]),
    )?;
    registry.register_struct(all_tests())?;

    registry.register("u8", int(IntKind::U8))?;
    registry.register("i8", int(IntKind::I8))?;
    registry.register("u32", int(IntKind::U32))?;
    registry.register("bool", Schema::Bool)?;
    registry.register("option<u8>", Schema::option(int(IntKind::U8)))?;
    registry.register("seq<u8>", Schema::seq(int(IntKind::U8)))?;
    Ok(registry)
}

/// 以参考注册表与默认预算构造编解码门面。
pub fn codec() -> anyhow::Result<Codec> {
    Ok(Codec::new(registry()?))
}

fn struct_container_value() -> Value {
    Value::record([
        ("a", Value::U8(FILL)),
        ("b", Value::U16(u16::from(FILL))),
        ("c", Value::U32(u32::from(FILL))),
        ("d", Value::U64(u64::from(FILL))),
    ])
}

fn tuple_container_value() -> Value {
    Value::Tuple(vec![
        Value::U8(FILL),
        struct_container_value(),
        Value::unit_variant(0),
    ])
}

fn container_types_value() -> Value {
    Value::record([
        ("u", Value::Struct(Vec::new())),
        ("e_a", Value::unit_variant(0)),
        ("e_b", Value::tuple_variant(1, [Value::U8(FILL)])),
        (
            "e_c",
            Value::tuple_variant(2, [Value::U8(FILL), struct_container_value()]),
        ),
        (
            "e_d",
            Value::struct_variant(
                3,
                [
                    Field::new("a", FILL),
                    Field::new("b", struct_container_value()),
                ],
            ),
        ),
        ("t", tuple_container_value()),
        ("s", struct_container_value()),
    ])
}

fn primitive_types_value() -> Value {
    Value::record([
        ("u8", Value::U8(u8::MAX)),
        ("u16", Value::U16(u16::MAX)),
        ("u32", Value::U32(u32::MAX)),
        ("u64", Value::U64(u64::MAX)),
        ("u128", Value::U128(u128::MAX)),
        ("usize", Value::Usize(u64::MAX)),
        ("i8_max", Value::I8(i8::MAX)),
        ("i8_min", Value::I8(i8::MIN)),
        ("i16_max", Value::I16(i16::MAX)),
        ("i16_min", Value::I16(i16::MIN)),
        ("i32_max", Value::I32(i32::MAX)),
        ("i32_min", Value::I32(i32::MIN)),
        ("i64_max", Value::I64(i64::MAX)),
        ("i64_min", Value::I64(i64::MIN)),
        ("i128_max", Value::I128(i128::MAX)),
        ("i128_min", Value::I128(i128::MIN)),
        ("isize_max", Value::Isize(i64::MAX)),
        ("isize_min", Value::Isize(i64::MIN)),
        ("f32", Value::F32(123.123)),
        ("f64", Value::F64(123.123)),
        ("bool_true", Value::Bool(true)),
        ("bool_false", Value::Bool(false)),
        ("none_zero", Value::U8(FILL)),
    ])
}

fn filled<T: Copy + Into<Value>>(item: T) -> Vec<Value> {
    vec![item.into(); 10]
}

fn compound_types_value() -> Value {
    Value::record([
        ("static_byte_slice", Value::Array(filled(FILL))),
        ("static_str", Value::string("Hello")),
        ("array", Value::Array(filled(u32::from(FILL)))),
        ("range", Value::range(10u16, 20u16)),
        ("option_some", Value::some(FILL)),
        ("option_none", Value::none()),
        (
            "tuple",
            Value::Tuple(vec![
                Value::U8(FILL),
                struct_container_value(),
                Value::unit_variant(0),
                tuple_container_value(),
            ]),
        ),
    ])
}

fn alloc_types_value() -> Value {
    Value::record([
        ("a", Value::Seq(filled(FILL))),
        ("b", Value::string("Hello")),
        ("c", Value::Map(vec![(Value::U8(FILL), Value::U8(FILL))])),
    ])
}

fn heapless_types_value() -> Value {
    Value::record([
        ("a", Value::Bytes(vec![FILL; 10])),
        ("b", Value::string("Hello")),
        (
            "c",
            Value::Map(vec![(
                Value::U16(u16::from(FILL)),
                Value::U32(u32::from(FILL)),
            )]),
        ),
    ])
}

fn nested_modules_value() -> Value {
    Value::Tuple(vec![Value::U8(FILL), Value::Tuple(vec![Value::U8(FILL)])])
}

fn all_tests_value() -> Value {
    Value::record([
        ("a", container_types_value()),
        ("b", primitive_types_value()),
        ("c", compound_types_value()),
        ("d", alloc_types_value()),
        ("e", heapless_types_value()),
        ("f", nested_modules_value()),
    ])
}

/// 按用例标签返回程序化构造的期望值；未知标签返回 `None`。
pub fn value(label: &str) -> Option<Value> {
    let value = match label {
        "all_types" => all_tests_value(),
        "primitives" => primitive_types_value(),
        "containers" => container_types_value(),
        "compound" => compound_types_value(),
        "collections" => alloc_types_value(),
        "heapless_collections" => heapless_types_value(),
        "nested_modules" => nested_modules_value(),
        "boundary_u8_max" => Value::U8(u8::MAX),
        "boundary_bool_true" => Value::Bool(true),
        "boundary_option_none" => Value::none(),
        "boundary_option_some" => Value::some(5u8),
        "boundary_empty_seq" => Value::Seq(Vec::new()),
        "boundary_i8_negative_one" => Value::I8(-1),
        "boundary_varint_128" => Value::U32(128),
        _ => return None,
    };
    Some(value)
}
