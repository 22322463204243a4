//! 类型 Schema：描述值的形状，不携带任何数据。
//!
//! # 教案定位（Why）
//! - 线格式不写字段名、不写结构体/元组标签，字段与变体的身份完全由 Schema 中的**声明顺序**决定；
//! - 编码器与解码器是同一棵 Schema 树上的镜像遍历，Schema 因此是两者唯一的共享契约。
//!
//! # 契约说明（What）
//! - Schema 由调用方构造一次、跨调用复用；在同一逻辑版本内不得修改；
//! - `Array` 携带固定长度（线上不写长度），`Seq`/`Map`/`String`/`Bytes` 的长度随数据上线；
//! - `Named` 通过 [`SchemaRegistry`](crate::SchemaRegistry) 间接引用已注册类型，用于递归类型。
//!
//! # 设计考量（Trade-offs）
//! - 通过 `serde` 以 `{"kind": .., "of": ..}` 的邻接标签形式序列化，供跨语言工具交换 Schema 描述；
//! - 使用 `Box`/`Vec` 表达递归，不引入引用计数：Schema 构造后只读，克隆成本由调用方按需承担。

use alloc::{borrow::ToOwned, boxed::Box, string::String, vec::Vec};
use core::fmt;

use serde::{Deserialize, Serialize};

/// 整数种类与其声明位宽。
///
/// `Usize`/`Isize` 在线上固定按 64 位处理，与平台指针宽度无关。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntKind {
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `u128`
    U128,
    /// `usize`（线上 64 位）
    Usize,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `i128`
    I128,
    /// `isize`（线上 64 位）
    Isize,
}

impl IntKind {
    /// 全部整数种类，按无符号在前的声明顺序排列。
    pub const ALL: [IntKind; 12] = [
        IntKind::U8,
        IntKind::U16,
        IntKind::U32,
        IntKind::U64,
        IntKind::U128,
        IntKind::Usize,
        IntKind::I8,
        IntKind::I16,
        IntKind::I32,
        IntKind::I64,
        IntKind::I128,
        IntKind::Isize,
    ];

    /// 声明位宽。
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            IntKind::U8 | IntKind::I8 => 8,
            IntKind::U16 | IntKind::I16 => 16,
            IntKind::U32 | IntKind::I32 => 32,
            IntKind::U64 | IntKind::I64 | IntKind::Usize | IntKind::Isize => 64,
            IntKind::U128 | IntKind::I128 => 128,
        }
    }

    /// 是否为有符号整数（线上走 ZigZag）。
    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            IntKind::I8
                | IntKind::I16
                | IntKind::I32
                | IntKind::I64
                | IntKind::I128
                | IntKind::Isize
        )
    }

    /// Rust 风格的类型名。
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            IntKind::U8 => "u8",
            IntKind::U16 => "u16",
            IntKind::U32 => "u32",
            IntKind::U64 => "u64",
            IntKind::U128 => "u128",
            IntKind::Usize => "usize",
            IntKind::I8 => "i8",
            IntKind::I16 => "i16",
            IntKind::I32 => "i32",
            IntKind::I64 => "i64",
            IntKind::I128 => "i128",
            IntKind::Isize => "isize",
        }
    }
}

impl fmt::Display for IntKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 递归的值形状描述。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum Schema {
    /// 单元值（unit struct / `()`），线上零字节。
    Unit,
    /// 单字节布尔。
    Bool,
    /// 定宽整数，无符号直接 varint，有符号先 ZigZag。
    Int(IntKind),
    /// 非零整数，线上形式与 [`Schema::Int`] 相同，零值被拒绝。
    NonZero(IntKind),
    /// 4 字节小端 IEEE-754。
    F32,
    /// 8 字节小端 IEEE-754。
    F64,
    /// varint 字节长度 + UTF-8。
    String,
    /// varint 字节长度 + 原始字节。
    Bytes,
    /// 定长数组，线上无长度前缀。
    Array {
        /// 元素形状。
        item: Box<Schema>,
        /// 固定元素数。
        len: usize,
    },
    /// 变长序列，varint 元素数 + 元素。
    Seq(Box<Schema>),
    /// 可选值，标签字节 `0x00`/`0x01` + 负载。
    Option(Box<Schema>),
    /// 异构有序元组，线上无前缀无标签。
    Tuple(Vec<Schema>),
    /// 键值对序列，varint 对数 + 按插入顺序的 (键, 值)。
    Map {
        /// 键形状。
        key: Box<Schema>,
        /// 值形状。
        value: Box<Schema>,
    },
    /// 区间 `start..end`，线上等同于二元组 `(start, end)`。
    Range(Box<Schema>),
    /// 具名结构体，字段按声明顺序编码，不写字段名。
    Struct(StructSchema),
    /// 标签联合，varint 变体索引 + 变体负载。
    Enum(EnumSchema),
    /// 引用注册表中的命名类型。
    Named(String),
}

impl Schema {
    /// 定宽整数。
    #[must_use]
    pub const fn int(kind: IntKind) -> Self {
        Schema::Int(kind)
    }

    /// 非零整数。
    #[must_use]
    pub const fn non_zero(kind: IntKind) -> Self {
        Schema::NonZero(kind)
    }

    /// 定长数组。
    #[must_use]
    pub fn array(item: Schema, len: usize) -> Self {
        Schema::Array {
            item: Box::new(item),
            len,
        }
    }

    /// 变长序列。
    #[must_use]
    pub fn seq(item: Schema) -> Self {
        Schema::Seq(Box::new(item))
    }

    /// 可选值。
    #[must_use]
    pub fn option(item: Schema) -> Self {
        Schema::Option(Box::new(item))
    }

    /// 元组。
    #[must_use]
    pub fn tuple(items: impl IntoIterator<Item = Schema>) -> Self {
        Schema::Tuple(items.into_iter().collect())
    }

    /// 键值映射。
    #[must_use]
    pub fn map(key: Schema, value: Schema) -> Self {
        Schema::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// 区间。
    #[must_use]
    pub fn range(bound: Schema) -> Self {
        Schema::Range(Box::new(bound))
    }

    /// 命名类型引用。
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Schema::Named(name.into())
    }

    /// 用于诊断信息的简短形状标签。
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match self {
            Schema::Unit => "unit",
            Schema::Bool => "bool",
            Schema::Int(kind) => kind.name(),
            Schema::NonZero(_) => "non_zero",
            Schema::F32 => "f32",
            Schema::F64 => "f64",
            Schema::String => "string",
            Schema::Bytes => "bytes",
            Schema::Array { .. } => "array",
            Schema::Seq(_) => "seq",
            Schema::Option(_) => "option",
            Schema::Tuple(_) => "tuple",
            Schema::Map { .. } => "map",
            Schema::Range(_) => "range",
            Schema::Struct(_) => "struct",
            Schema::Enum(_) => "enum",
            Schema::Named(_) => "named",
        }
    }
}

impl From<StructSchema> for Schema {
    fn from(value: StructSchema) -> Self {
        Schema::Struct(value)
    }
}

impl From<EnumSchema> for Schema {
    fn from(value: EnumSchema) -> Self {
        Schema::Enum(value)
    }
}

impl From<IntKind> for Schema {
    fn from(value: IntKind) -> Self {
        Schema::Int(value)
    }
}

/// 结构体或结构体型变体中的一个字段。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// 字段名，仅用于构造与诊断，不上线。
    pub name: String,
    /// 字段形状。
    pub schema: Schema,
}

impl FieldSchema {
    /// 构造字段描述。
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// 具名结构体的 Schema。
///
/// # 契约（What）
/// - `fields` 的顺序即线上顺序；交换两个字段的声明顺序会改变同一逻辑值的编码字节；
/// - `name` 仅用于注册与诊断。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructSchema {
    /// 类型名。
    pub name: String,
    /// 按声明顺序排列的字段。
    pub fields: Vec<FieldSchema>,
}

impl StructSchema {
    /// 创建没有字段的结构体描述。
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// 追加字段（链式）。
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.fields.push(FieldSchema::new(name, schema.into()));
        self
    }

    /// 按名称查找字段位置。
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }
}

/// 枚举变体的负载形状。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "fields", rename_all = "snake_case")]
pub enum VariantShape {
    /// 无负载。
    Unit,
    /// 元组型负载，按元组编码。
    Tuple(Vec<Schema>),
    /// 结构体型负载，按结构体编码。
    Struct(Vec<FieldSchema>),
}

/// 单个枚举变体。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSchema {
    /// 变体名。
    pub name: String,
    /// 负载形状。
    pub shape: VariantShape,
}

/// 标签联合的 Schema。
///
/// # 契约（What）
/// - 变体索引即声明顺序（从 0 开始）；解码索引 `k` 必然选中第 `k` 个声明的变体；
/// - 索引在线上按 32 位 varint 编码。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumSchema {
    /// 类型名。
    pub name: String,
    /// 按声明顺序排列的变体。
    pub variants: Vec<VariantSchema>,
}

impl EnumSchema {
    /// 创建没有变体的枚举描述。
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
        }
    }

    /// 追加无负载变体。
    #[must_use]
    pub fn unit_variant(self, name: impl Into<String>) -> Self {
        self.variant(name, VariantShape::Unit)
    }

    /// 追加元组型变体。
    #[must_use]
    pub fn tuple_variant(
        self,
        name: impl Into<String>,
        items: impl IntoIterator<Item = Schema>,
    ) -> Self {
        self.variant(name, VariantShape::Tuple(items.into_iter().collect()))
    }

    /// 追加结构体型变体。
    #[must_use]
    pub fn struct_variant(
        self,
        name: impl Into<String>,
        fields: impl IntoIterator<Item = FieldSchema>,
    ) -> Self {
        self.variant(name, VariantShape::Struct(fields.into_iter().collect()))
    }

    fn variant(mut self, name: impl Into<String>, shape: VariantShape) -> Self {
        self.variants.push(VariantSchema {
            name: name.into(),
            shape,
        });
        self
    }

    /// 按名称查找变体索引。
    pub fn variant_index(&self, name: &str) -> Option<u32> {
        self.variants
            .iter()
            .position(|variant| variant.name == name)
            .and_then(|index| u32::try_from(index).ok())
    }

    /// 按索引取变体。
    pub fn variant_at(&self, index: u32) -> Option<&VariantSchema> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.variants.get(index))
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Int(kind) => f.write_str(kind.name()),
            Schema::NonZero(kind) => write!(f, "non_zero<{kind}>"),
            Schema::Array { item, len } => write!(f, "[{item}; {len}]"),
            Schema::Seq(item) => write!(f, "seq<{item}>"),
            Schema::Option(item) => write!(f, "option<{item}>"),
            Schema::Map { key, value } => write!(f, "map<{key}, {value}>"),
            Schema::Range(bound) => write!(f, "range<{bound}>"),
            Schema::Tuple(items) => {
                f.write_str("(")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Schema::Struct(strukt) => write!(f, "struct {}", strukt.name),
            Schema::Enum(enumeration) => write!(f, "enum {}", enumeration.name),
            Schema::Named(name) => f.write_str(name),
            other => f.write_str(other.kind_label()),
        }
    }
}

/// 便于 `FieldSchema` 列表的字面量构造。
pub fn fields<const N: usize>(items: [(&str, Schema); N]) -> Vec<FieldSchema> {
    items
        .into_iter()
        .map(|(name, schema)| FieldSchema::new(name.to_owned(), schema))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn serde_form_is_adjacently_tagged() {
        let schema = Schema::option(Schema::int(IntKind::U8));
        let json = serde_json::to_string(&schema).expect("序列化 Schema");
        assert_eq!(json, r#"{"kind":"option","of":{"kind":"int","of":"u8"}}"#);
        assert_eq!(
            serde_json::to_string(&Schema::Unit).expect("序列化单元"),
            r#"{"kind":"unit"}"#
        );
    }

    #[test]
    fn serde_round_trip_keeps_every_kind() {
        let schema = Schema::tuple([
            Schema::Unit,
            Schema::Bool,
            Schema::non_zero(IntKind::I16),
            Schema::F64,
            Schema::Bytes,
            Schema::array(Schema::F32, 3),
            Schema::seq(Schema::String),
            Schema::map(Schema::int(IntKind::U32), Schema::named("Node")),
            Schema::range(Schema::int(IntKind::Usize)),
            Schema::Struct(StructSchema::new("S").field("a", IntKind::U64)),
            Schema::Enum(
                EnumSchema::new("E")
                    .unit_variant("A")
                    .tuple_variant("B", [Schema::Bool])
                    .struct_variant("C", fields([("x", Schema::int(IntKind::I8))])),
            ),
        ]);
        let json = serde_json::to_string(&schema).expect("序列化 Schema");
        let back: Schema = serde_json::from_str(&json).expect("反序列化 Schema");
        assert_eq!(back, schema);
        assert!(serde_json::from_str::<Schema>(r#"{"kind":"int","of":"u7"}"#).is_err());
    }

    #[test]
    fn int_kind_widths() {
        assert_eq!(IntKind::U8.bits(), 8);
        assert_eq!(IntKind::Usize.bits(), 64);
        assert_eq!(IntKind::I128.bits(), 128);
        assert!(IntKind::Isize.is_signed());
        assert!(!IntKind::U128.is_signed());
        assert_eq!(IntKind::ALL.iter().filter(|k| k.is_signed()).count(), 6);
    }

    #[test]
    fn enum_indices_follow_declaration_order() {
        let schema = EnumSchema::new("EnumContainer")
            .unit_variant("A")
            .tuple_variant("B", [Schema::int(IntKind::U8)])
            .struct_variant("D", fields([("a", Schema::int(IntKind::U8))]));
        assert_eq!(schema.variant_index("A"), Some(0));
        assert_eq!(schema.variant_index("D"), Some(2));
        assert_eq!(schema.variant_index("Z"), None);
        assert_eq!(schema.variant_at(1).map(|v| v.name.as_str()), Some("B"));
        assert!(schema.variant_at(3).is_none());
    }

    #[test]
    fn display_is_compact() {
        let schema = Schema::tuple([
            Schema::seq(Schema::int(IntKind::U8)),
            Schema::option(Schema::String),
            Schema::array(Schema::Bool, 3),
        ]);
        assert_eq!(schema.to_string(), "(seq<u8>, option<string>, [bool; 3])");
    }
}
