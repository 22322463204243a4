//! 显式标签值模型。
//!
//! # 教案定位（Why）
//! - 编解码核心只需要一个"可识别的值抽象"，不绑定任何语言的对象模型；
//! - 以显式枚举表达每一种线格式种类，构造时即可对照 Schema 校验，不依赖隐式类型转换。
//!
//! # 契约说明（What）
//! - 整数按声明宽度分别建模，`Usize`/`Isize` 以 64 位承载；
//! - `Struct` 保存字段名，仅用于构造与诊断，线上只认顺序；
//! - `Map` 保留插入顺序，允许重复键：唯一性是生产方约定而非编解码不变量；
//! - `Enum` 保存变体索引（声明顺序，从 0 开始）与负载。

use alloc::{borrow::ToOwned, boxed::Box, string::String, vec::Vec};

use crate::{
    error::CodecError,
    registry::SchemaRegistry,
    schema::{EnumSchema, IntKind, Schema, StructSchema, VariantShape},
};

/// 运行期值。
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// 单元值。
    Unit,
    /// 布尔。
    Bool(bool),
    /// `u8`
    U8(u8),
    /// `u16`
    U16(u16),
    /// `u32`
    U32(u32),
    /// `u64`
    U64(u64),
    /// `u128`
    U128(u128),
    /// `usize`，以 64 位承载。
    Usize(u64),
    /// `i8`
    I8(i8),
    /// `i16`
    I16(i16),
    /// `i32`
    I32(i32),
    /// `i64`
    I64(i64),
    /// `i128`
    I128(i128),
    /// `isize`，以 64 位承载。
    Isize(i64),
    /// `f32`
    F32(f32),
    /// `f64`
    F64(f64),
    /// UTF-8 字符串。
    String(String),
    /// 原始字节。
    Bytes(Vec<u8>),
    /// 定长数组。
    Array(Vec<Value>),
    /// 变长序列。
    Seq(Vec<Value>),
    /// 可选值。
    Option(Option<Box<Value>>),
    /// 元组。
    Tuple(Vec<Value>),
    /// 有序键值对。
    Map(Vec<(Value, Value)>),
    /// 区间 `start..end`。
    Range {
        /// 起点（含）。
        start: Box<Value>,
        /// 终点（不含）。
        end: Box<Value>,
    },
    /// 结构体字段，按声明顺序。
    Struct(Vec<Field>),
    /// 枚举值。
    Enum(EnumValue),
}

/// 结构体字段值。
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    /// 字段名。
    pub name: String,
    /// 字段值。
    pub value: Value,
}

impl Field {
    /// 构造字段。
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// 枚举值：变体索引 + 负载。
#[derive(Clone, Debug, PartialEq)]
pub struct EnumValue {
    /// 声明顺序中的变体索引。
    pub index: u32,
    /// 变体负载。
    pub payload: Payload,
}

/// 枚举变体负载。
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// 无负载。
    Unit,
    /// 元组型负载。
    Tuple(Vec<Value>),
    /// 结构体型负载。
    Struct(Vec<Field>),
}

/// 宽度无关的整数表示，编解码器在叶子上统一处理。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Int {
    Unsigned(u128),
    Signed(i128),
}

impl Int {
    pub(crate) fn is_zero(self) -> bool {
        matches!(self, Int::Unsigned(0) | Int::Signed(0))
    }
}

impl Value {
    /// `Some(value)`。
    pub fn some(value: impl Into<Value>) -> Self {
        Value::Option(Some(Box::new(value.into())))
    }

    /// `None`。
    #[must_use]
    pub const fn none() -> Self {
        Value::Option(None)
    }

    /// 字符串值。
    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    /// 区间值。
    pub fn range(start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Value::Range {
            start: Box::new(start.into()),
            end: Box::new(end.into()),
        }
    }

    /// 无负载枚举值。
    #[must_use]
    pub const fn unit_variant(index: u32) -> Self {
        Value::Enum(EnumValue {
            index,
            payload: Payload::Unit,
        })
    }

    /// 元组型枚举值。
    pub fn tuple_variant(index: u32, items: impl IntoIterator<Item = Value>) -> Self {
        Value::Enum(EnumValue {
            index,
            payload: Payload::Tuple(items.into_iter().collect()),
        })
    }

    /// 结构体型枚举值。
    pub fn struct_variant(index: u32, fields: impl IntoIterator<Item = Field>) -> Self {
        Value::Enum(EnumValue {
            index,
            payload: Payload::Struct(fields.into_iter().collect()),
        })
    }

    /// 以 `(名称, 值)` 对构造结构体值，不做 Schema 校验。
    pub fn record<N: Into<String>>(fields: impl IntoIterator<Item = (N, Value)>) -> Self {
        Value::Struct(
            fields
                .into_iter()
                .map(|(name, value)| Field::new(name, value))
                .collect(),
        )
    }

    /// 按目标整数种类构造值，超出宽度返回 [`CodecError::IntegerOverflow`]。
    pub fn from_unsigned(kind: IntKind, value: u128) -> Result<Self, CodecError> {
        Self::from_int(kind, Int::Unsigned(value))
    }

    /// 按目标整数种类构造值，超出宽度返回 [`CodecError::IntegerOverflow`]。
    pub fn from_signed(kind: IntKind, value: i128) -> Result<Self, CodecError> {
        Self::from_int(kind, Int::Signed(value))
    }

    pub(crate) fn from_int(kind: IntKind, value: Int) -> Result<Self, CodecError> {
        let overflow = |_| CodecError::IntegerOverflow { bits: kind.bits() };
        let value = match value {
            Int::Unsigned(raw) => match kind {
                IntKind::U8 => Value::U8(u8::try_from(raw).map_err(overflow)?),
                IntKind::U16 => Value::U16(u16::try_from(raw).map_err(overflow)?),
                IntKind::U32 => Value::U32(u32::try_from(raw).map_err(overflow)?),
                IntKind::U64 => Value::U64(u64::try_from(raw).map_err(overflow)?),
                IntKind::U128 => Value::U128(raw),
                IntKind::Usize => Value::Usize(u64::try_from(raw).map_err(overflow)?),
                _ => {
                    let signed = i128::try_from(raw).map_err(overflow)?;
                    return Self::from_int(kind, Int::Signed(signed));
                }
            },
            Int::Signed(raw) => match kind {
                IntKind::I8 => Value::I8(i8::try_from(raw).map_err(overflow)?),
                IntKind::I16 => Value::I16(i16::try_from(raw).map_err(overflow)?),
                IntKind::I32 => Value::I32(i32::try_from(raw).map_err(overflow)?),
                IntKind::I64 => Value::I64(i64::try_from(raw).map_err(overflow)?),
                IntKind::I128 => Value::I128(raw),
                IntKind::Isize => Value::Isize(i64::try_from(raw).map_err(overflow)?),
                _ => {
                    let unsigned = u128::try_from(raw).map_err(overflow)?;
                    return Self::from_int(kind, Int::Unsigned(unsigned));
                }
            },
        };
        Ok(value)
    }

    /// 整数值的种类与宽度无关表示；非整数返回 `None`。
    pub(crate) fn as_int(&self) -> Option<(IntKind, Int)> {
        let parts = match *self {
            Value::U8(v) => (IntKind::U8, Int::Unsigned(u128::from(v))),
            Value::U16(v) => (IntKind::U16, Int::Unsigned(u128::from(v))),
            Value::U32(v) => (IntKind::U32, Int::Unsigned(u128::from(v))),
            Value::U64(v) => (IntKind::U64, Int::Unsigned(u128::from(v))),
            Value::U128(v) => (IntKind::U128, Int::Unsigned(v)),
            Value::Usize(v) => (IntKind::Usize, Int::Unsigned(u128::from(v))),
            Value::I8(v) => (IntKind::I8, Int::Signed(i128::from(v))),
            Value::I16(v) => (IntKind::I16, Int::Signed(i128::from(v))),
            Value::I32(v) => (IntKind::I32, Int::Signed(i128::from(v))),
            Value::I64(v) => (IntKind::I64, Int::Signed(i128::from(v))),
            Value::I128(v) => (IntKind::I128, Int::Signed(v)),
            Value::Isize(v) => (IntKind::Isize, Int::Signed(i128::from(v))),
            _ => return None,
        };
        Some(parts)
    }

    /// 用于诊断信息的简短形状标签。
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        if let Some((kind, _)) = self.as_int() {
            return kind.name();
        }
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Seq(_) => "seq",
            Value::Option(_) => "option",
            Value::Tuple(_) => "tuple",
            Value::Map(_) => "map",
            Value::Range { .. } => "range",
            Value::Struct(_) => "struct",
            Value::Enum(_) => "enum",
            _ => "int",
        }
    }

    /// 校验值是否符合 `schema`（命名类型经 `registry` 解析）。
    ///
    /// 校验与编码共享同一遍历，因此与真实编码的判定完全一致。
    pub fn conforms_to(&self, schema: &Schema, registry: &SchemaRegistry) -> Result<(), CodecError> {
        let config = crate::CodecConfig::default();
        let mut scratch = Vec::new();
        crate::encoder::Encoder::new(&mut scratch, registry, &config).encode(schema, self)
    }
}

impl StructSchema {
    /// 按名称构造并校验结构体值。
    ///
    /// # 教案式说明
    /// - **Why**：动态语言常以关键字参数拼装对象；此处改为构造即校验，字段缺失或多余在构造时就暴露；
    /// - **How**：按声明顺序逐个认领字段，顺序无关；随后对整体执行一次 [`Value::conforms_to`]；
    /// - **What**：返回的 `Value::Struct` 字段顺序与 Schema 声明一致。
    pub fn instantiate<N: AsRef<str>>(
        &self,
        registry: &SchemaRegistry,
        fields: impl IntoIterator<Item = (N, Value)>,
    ) -> Result<Value, CodecError> {
        let ordered = order_fields(&self.fields, fields)?;
        let value = Value::Struct(ordered);
        value.conforms_to(&Schema::Struct(self.clone()), registry)?;
        Ok(value)
    }
}

impl EnumSchema {
    /// 按变体名构造并校验枚举值。
    ///
    /// `payload` 的形状需与变体声明一致；结构体型负载内的字段可以任意顺序给出。
    pub fn instantiate(
        &self,
        registry: &SchemaRegistry,
        variant: &str,
        payload: Payload,
    ) -> Result<Value, CodecError> {
        let index = self
            .variant_index(variant)
            .ok_or_else(|| CodecError::mismatch(alloc::format!("variant of {}", self.name), variant))?;
        let payload = match (&self.variants[index as usize].shape, payload) {
            (VariantShape::Struct(declared), Payload::Struct(given)) => Payload::Struct(
                order_fields(declared, given.into_iter().map(|f| (f.name, f.value)))?,
            ),
            (_, other) => other,
        };
        let value = Value::Enum(EnumValue { index, payload });
        value.conforms_to(&Schema::Enum(self.clone()), registry)?;
        Ok(value)
    }
}

fn order_fields<N: AsRef<str>>(
    declared: &[crate::schema::FieldSchema],
    given: impl IntoIterator<Item = (N, Value)>,
) -> Result<Vec<Field>, CodecError> {
    let mut slots: Vec<Option<Value>> = declared.iter().map(|_| None).collect();
    for (name, value) in given {
        let name = name.as_ref();
        let position = declared
            .iter()
            .position(|field| field.name == name)
            .ok_or_else(|| CodecError::mismatch("declared field", name))?;
        if slots[position].replace(value).is_some() {
            return Err(CodecError::mismatch("distinct field", name));
        }
    }
    declared
        .iter()
        .zip(slots)
        .map(|(field, slot)| {
            slot.map(|value| Field {
                name: field.name.to_owned(),
                value,
            })
            .ok_or_else(|| CodecError::mismatch(field.name.to_owned(), "missing field"))
        })
        .collect()
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from_scalar!(
    bool => Bool,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    f32 => F32,
    f64 => F64,
    String => String,
);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fields;

    fn container() -> StructSchema {
        StructSchema::new("StructContainer")
            .field("a", IntKind::U8)
            .field("b", IntKind::U16)
    }

    #[test]
    fn from_int_narrows_with_overflow_check() {
        assert_eq!(Value::from_unsigned(IntKind::U8, 255), Ok(Value::U8(255)));
        assert_eq!(
            Value::from_unsigned(IntKind::U8, 256),
            Err(CodecError::IntegerOverflow { bits: 8 })
        );
        assert_eq!(Value::from_signed(IntKind::I8, -128), Ok(Value::I8(-128)));
        assert_eq!(
            Value::from_signed(IntKind::U16, -1),
            Err(CodecError::IntegerOverflow { bits: 16 })
        );
        assert_eq!(Value::from_signed(IntKind::U16, 7), Ok(Value::U16(7)));
    }

    #[test]
    fn instantiate_orders_fields_by_declaration() {
        let registry = SchemaRegistry::default();
        let value = container()
            .instantiate(&registry, [("b", Value::U16(2)), ("a", Value::U8(1))])
            .expect("字段齐全");
        assert_eq!(
            value,
            Value::Struct(alloc::vec![Field::new("a", 1u8), Field::new("b", 2u16)])
        );
    }

    #[test]
    fn instantiate_rejects_missing_unknown_and_mistyped() {
        let registry = SchemaRegistry::default();
        let schema = container();
        assert!(matches!(
            schema.instantiate(&registry, [("a", Value::U8(1))]),
            Err(CodecError::SchemaMismatch { .. })
        ));
        assert!(matches!(
            schema.instantiate(
                &registry,
                [("a", Value::U8(1)), ("b", Value::U16(2)), ("c", Value::U8(3))]
            ),
            Err(CodecError::SchemaMismatch { .. })
        ));
        assert!(matches!(
            schema.instantiate(&registry, [("a", Value::U8(1)), ("b", Value::Bool(true))]),
            Err(CodecError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn enum_instantiate_by_variant_name() {
        let registry = SchemaRegistry::default();
        let schema = EnumSchema::new("E")
            .unit_variant("A")
            .struct_variant("D", fields([("a", IntKind::U8.into()), ("b", Schema::Bool)]));
        let value = schema
            .instantiate(
                &registry,
                "D",
                Payload::Struct(alloc::vec![Field::new("b", true), Field::new("a", 9u8)]),
            )
            .expect("合法变体");
        assert_eq!(
            value,
            Value::struct_variant(1, [Field::new("a", 9u8), Field::new("b", true)])
        );
        assert!(schema.instantiate(&registry, "Z", Payload::Unit).is_err());
        assert!(
            schema
                .instantiate(&registry, "A", Payload::Tuple(alloc::vec![Value::U8(1)]))
                .is_err()
        );
    }
}
