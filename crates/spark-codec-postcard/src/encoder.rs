//! 基于 Schema 的编码器。
//!
//! # 教案定位（Why）
//! - 编码是 Schema 树上的前序遍历：每遇到一个节点，就按节点种类把对应的值写入输出；
//! - 遍历过程中同时完成值形状校验，线上不会出现任何"半对齐"的字节。
//!
//! # 线格式（What）
//! - `Unit` 零字节；`Bool` 单字节 `0x00`/`0x01`；
//! - 无符号整数直接 varint，有符号整数先 ZigZag 再 varint；
//! - `F32`/`F64` 为小端 IEEE-754 原始位；
//! - `String`/`Bytes`/`Seq`/`Map` 先写 32 位 varint 长度再写内容；`Array`、`Tuple`、`Struct`、`Range` 不写长度；
//! - `Option` 写标签字节后按需写负载；`Enum` 写 32 位 varint 变体索引后写负载。
//!
//! # 注意事项（Gotchas）
//! - [`Encoder`] 直接写入调用方的缓冲，出错时缓冲中可能残留部分字节；
//!   需要"要么全写要么不写"语义时使用 [`Codec::encode_into`](crate::Codec::encode_into)。

use alloc::format;

use bytes::BufMut;

use crate::{
    config::CodecConfig,
    error::CodecError,
    registry::SchemaRegistry,
    schema::{EnumSchema, FieldSchema, IntKind, Schema, StructSchema, VariantShape},
    value::{EnumValue, Field, Int, Payload, Value},
    varint, zigzag,
};

/// 长度前缀与枚举索引的线上位宽。
pub(crate) const LENGTH_BITS: u32 = 32;

/// 把 [`Value`] 按 [`Schema`] 写入 `BufMut` 的遍历器。
pub struct Encoder<'a, B: BufMut> {
    out: &'a mut B,
    registry: &'a SchemaRegistry,
    config: &'a CodecConfig,
    depth: u16,
    written: usize,
}

impl<'a, B: BufMut> Encoder<'a, B> {
    /// 创建编码器。
    pub fn new(out: &'a mut B, registry: &'a SchemaRegistry, config: &'a CodecConfig) -> Self {
        Self {
            out,
            registry,
            config,
            depth: 0,
            written: 0,
        }
    }

    /// 已写入的字节数。
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// 编码一个值。
    ///
    /// # 调用契约（What）
    /// - **前置条件**：`value` 的形状与 `schema` 一致，命名类型已在注册表中；
    /// - **错误**：形状不符返回 [`CodecError::SchemaMismatch`]；整数越宽返回 [`CodecError::IntegerOverflow`]；
    ///   枚举索引越界返回 [`CodecError::InvalidEnumVariant`]；NonZero 为零返回 [`CodecError::InvalidNonZero`]。
    pub fn encode(&mut self, schema: &Schema, value: &Value) -> Result<(), CodecError> {
        match schema {
            Schema::Unit => match value {
                Value::Unit => Ok(()),
                other => Err(mismatch(schema, other)),
            },
            Schema::Bool => match value {
                Value::Bool(flag) => {
                    self.put_byte(u8::from(*flag));
                    Ok(())
                }
                other => Err(mismatch(schema, other)),
            },
            Schema::Int(kind) => self.encode_int(*kind, schema, value, false),
            Schema::NonZero(kind) => self.encode_int(*kind, schema, value, true),
            Schema::F32 => match value {
                Value::F32(float) => {
                    self.put_slice(&float.to_le_bytes());
                    Ok(())
                }
                other => Err(mismatch(schema, other)),
            },
            Schema::F64 => match value {
                Value::F64(float) => {
                    self.put_slice(&float.to_le_bytes());
                    Ok(())
                }
                other => Err(mismatch(schema, other)),
            },
            Schema::String => match value {
                Value::String(text) => self.put_prefixed(text.as_bytes()),
                other => Err(mismatch(schema, other)),
            },
            Schema::Bytes => match value {
                Value::Bytes(bytes) => self.put_prefixed(bytes),
                other => Err(mismatch(schema, other)),
            },
            Schema::Named(name) => {
                let registry = self.registry;
                let resolved = registry.resolve(name)?;
                self.enter()?;
                let result = self.encode(resolved, value);
                self.depth -= 1;
                result
            }
            container => {
                self.enter()?;
                let result = self.encode_container(container, value);
                self.depth -= 1;
                result
            }
        }
    }

    fn encode_container(&mut self, schema: &Schema, value: &Value) -> Result<(), CodecError> {
        match (schema, value) {
            (Schema::Array { item, len }, Value::Array(items)) => {
                if items.len() != *len {
                    return Err(CodecError::mismatch(
                        format!("array of {len}"),
                        format!("array of {}", items.len()),
                    ));
                }
                items.iter().try_for_each(|element| self.encode(item, element))
            }
            (Schema::Seq(item), Value::Seq(items)) => {
                self.put_len(items.len())?;
                items.iter().try_for_each(|element| self.encode(item, element))
            }
            (Schema::Option(item), Value::Option(inner)) => match inner {
                None => {
                    self.put_byte(0x00);
                    Ok(())
                }
                Some(inner) => {
                    self.put_byte(0x01);
                    self.encode(item, inner)
                }
            },
            (Schema::Tuple(items), Value::Tuple(values)) => self.encode_tuple(items, values),
            (Schema::Map { key, value: val }, Value::Map(entries)) => {
                self.put_len(entries.len())?;
                entries.iter().try_for_each(|(k, v)| {
                    self.encode(key, k)?;
                    self.encode(val, v)
                })
            }
            (Schema::Range(bound), Value::Range { start, end }) => {
                self.encode(bound, start)?;
                self.encode(bound, end)
            }
            (Schema::Struct(StructSchema { fields, .. }), Value::Struct(values)) => {
                self.encode_fields(fields, values)
            }
            (Schema::Enum(enumeration), Value::Enum(enum_value)) => {
                self.encode_enum(enumeration, enum_value)
            }
            (schema, other) => Err(mismatch(schema, other)),
        }
    }

    fn encode_tuple(&mut self, schemas: &[Schema], values: &[Value]) -> Result<(), CodecError> {
        if schemas.len() != values.len() {
            return Err(CodecError::mismatch(
                format!("tuple of {}", schemas.len()),
                format!("tuple of {}", values.len()),
            ));
        }
        schemas
            .iter()
            .zip(values)
            .try_for_each(|(schema, value)| self.encode(schema, value))
    }

    fn encode_fields(&mut self, schemas: &[FieldSchema], values: &[Field]) -> Result<(), CodecError> {
        if schemas.len() != values.len() {
            return Err(CodecError::mismatch(
                format!("{} field(s)", schemas.len()),
                format!("{} field(s)", values.len()),
            ));
        }
        for (declared, field) in schemas.iter().zip(values) {
            if declared.name != field.name {
                return Err(CodecError::mismatch(
                    format!("field `{}`", declared.name),
                    format!("field `{}`", field.name),
                ));
            }
            self.encode(&declared.schema, &field.value)?;
        }
        Ok(())
    }

    fn encode_enum(&mut self, schema: &EnumSchema, value: &EnumValue) -> Result<(), CodecError> {
        let variant = schema
            .variant_at(value.index)
            .ok_or(CodecError::InvalidEnumVariant {
                index: value.index,
                variants: schema.variants.len(),
            })?;
        self.put_varint(u128::from(value.index), LENGTH_BITS)?;
        match (&variant.shape, &value.payload) {
            (VariantShape::Unit, Payload::Unit) => Ok(()),
            (VariantShape::Tuple(items), Payload::Tuple(values)) => self.encode_tuple(items, values),
            (VariantShape::Struct(fields), Payload::Struct(values)) => {
                self.encode_fields(fields, values)
            }
            (shape, payload) => Err(CodecError::mismatch(
                format!("{} variant `{}`", shape_label(shape), variant.name),
                format!("{} payload", payload_label(payload)),
            )),
        }
    }

    fn encode_int(
        &mut self,
        kind: IntKind,
        schema: &Schema,
        value: &Value,
        non_zero: bool,
    ) -> Result<(), CodecError> {
        let Some((found, int)) = value.as_int() else {
            return Err(mismatch(schema, value));
        };
        if found != kind {
            return Err(mismatch(schema, value));
        }
        if non_zero && int.is_zero() {
            return Err(CodecError::InvalidNonZero { kind: kind.name() });
        }
        let raw = match int {
            Int::Unsigned(raw) => raw,
            Int::Signed(raw) => zigzag::encode(raw),
        };
        self.put_varint(raw, kind.bits())
    }

    fn enter(&mut self) -> Result<(), CodecError> {
        if self.depth >= self.config.max_depth {
            return Err(CodecError::DepthLimitExceeded {
                limit: self.config.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn put_byte(&mut self, byte: u8) {
        self.out.put_u8(byte);
        self.written += 1;
    }

    fn put_slice(&mut self, bytes: &[u8]) {
        self.out.put_slice(bytes);
        self.written += bytes.len();
    }

    fn put_varint(&mut self, value: u128, bits: u32) -> Result<(), CodecError> {
        self.written += varint::encode_into(value, bits, &mut *self.out)?;
        Ok(())
    }

    fn put_len(&mut self, len: usize) -> Result<(), CodecError> {
        let len = u32::try_from(len).map_err(|_| CodecError::IntegerOverflow { bits: LENGTH_BITS })?;
        self.put_varint(u128::from(len), LENGTH_BITS)
    }

    fn put_prefixed(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        self.put_len(bytes.len())?;
        self.put_slice(bytes);
        Ok(())
    }
}

fn mismatch(schema: &Schema, value: &Value) -> CodecError {
    CodecError::mismatch(format!("{schema}"), value.kind_label())
}

fn shape_label(shape: &VariantShape) -> &'static str {
    match shape {
        VariantShape::Unit => "unit",
        VariantShape::Tuple(_) => "tuple",
        VariantShape::Struct(_) => "struct",
    }
}

fn payload_label(payload: &Payload) -> &'static str {
    match payload {
        Payload::Unit => "unit",
        Payload::Tuple(_) => "tuple",
        Payload::Struct(_) => "struct",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{vec, vec::Vec};

    fn encode(schema: &Schema, value: &Value) -> Result<Vec<u8>, CodecError> {
        let registry = SchemaRegistry::default();
        let config = CodecConfig::default();
        let mut out = Vec::new();
        let mut encoder = Encoder::new(&mut out, &registry, &config);
        encoder.encode(schema, value)?;
        assert_eq!(encoder.written(), out.len());
        Ok(out)
    }

    #[test]
    fn leaves() {
        assert_eq!(encode(&Schema::Unit, &Value::Unit), Ok(vec![]));
        assert_eq!(encode(&Schema::Bool, &Value::Bool(true)), Ok(vec![0x01]));
        assert_eq!(
            encode(&Schema::int(IntKind::U8), &Value::U8(255)),
            Ok(vec![0xFF, 0x01])
        );
        assert_eq!(encode(&Schema::int(IntKind::I8), &Value::I8(-1)), Ok(vec![0x01]));
        assert_eq!(
            encode(&Schema::F32, &Value::F32(1.0)),
            Ok(vec![0x00, 0x00, 0x80, 0x3F])
        );
        assert_eq!(
            encode(&Schema::String, &Value::string("hi")),
            Ok(vec![0x02, b'h', b'i'])
        );
    }

    #[test]
    fn option_and_sequences() {
        let schema = Schema::option(Schema::int(IntKind::U8));
        assert_eq!(encode(&schema, &Value::none()), Ok(vec![0x00]));
        assert_eq!(encode(&schema, &Value::some(5u8)), Ok(vec![0x01, 0x05]));

        let seq = Schema::seq(Schema::int(IntKind::U16));
        assert_eq!(encode(&seq, &Value::Seq(vec![])), Ok(vec![0x00]));
        assert_eq!(
            encode(&seq, &Value::Seq(vec![Value::U16(1), Value::U16(300)])),
            Ok(vec![0x02, 0x01, 0xAC, 0x02])
        );
    }

    #[test]
    fn enum_writes_index_then_payload() {
        let schema = Schema::Enum(
            EnumSchema::new("E")
                .unit_variant("A")
                .tuple_variant("B", [Schema::int(IntKind::U8)]),
        );
        assert_eq!(encode(&schema, &Value::unit_variant(0)), Ok(vec![0x00]));
        assert_eq!(
            encode(&schema, &Value::tuple_variant(1, [Value::U8(7)])),
            Ok(vec![0x01, 0x07])
        );
        assert_eq!(
            encode(&schema, &Value::unit_variant(2)),
            Err(CodecError::InvalidEnumVariant {
                index: 2,
                variants: 2
            })
        );
        assert!(matches!(
            encode(&schema, &Value::unit_variant(1)),
            Err(CodecError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn shape_violations_are_reported() {
        assert_eq!(
            encode(&Schema::Bool, &Value::U8(1)),
            Err(CodecError::mismatch("bool", "u8"))
        );
        assert!(matches!(
            encode(&Schema::int(IntKind::U16), &Value::U8(1)),
            Err(CodecError::SchemaMismatch { .. })
        ));
        assert!(matches!(
            encode(
                &Schema::array(Schema::Bool, 2),
                &Value::Array(vec![Value::Bool(true)])
            ),
            Err(CodecError::SchemaMismatch { .. })
        ));
        assert_eq!(
            encode(&Schema::non_zero(IntKind::U32), &Value::U32(0)),
            Err(CodecError::InvalidNonZero { kind: "u32" })
        );
    }

    #[test]
    fn depth_budget_applies() {
        let registry = SchemaRegistry::default();
        let config = CodecConfig::default().with_max_depth(2);
        let schema = Schema::option(Schema::option(Schema::option(Schema::Bool)));
        let value = Value::some(Value::some(Value::some(true)));
        let mut out = Vec::new();
        let err = Encoder::new(&mut out, &registry, &config).encode(&schema, &value);
        assert_eq!(err, Err(CodecError::DepthLimitExceeded { limit: 2 }));
    }
}
