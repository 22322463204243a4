//! 基于 Schema 的解码器。
//!
//! # 教案定位（Why）
//! - 解码是编码的镜像遍历：同一棵 Schema 树决定每一步读取多少字节、如何解释；
//! - 线上没有任何自描述信息，因此解码器对每个标签字节、长度前缀与整数宽度都做严格校验，
//!   一旦偏离立即失败，绝不返回部分结果。
//!
//! # 契约说明（What）
//! - [`Decoder`] 持有输入切片与读游标，[`Decoder::decode`] 每次从游标处读一个完整值；
//! - [`Decoder::consumed`]/[`Decoder::remaining`] 暴露游标状态，供流式场景逐个取值；
//! - [`Decoder::finish`] 用于穷尽式解码，若仍有剩余字节返回 [`CodecError::TrailingBytes`]。
//!
//! # 风险提示（Trade-offs）
//! - 长度前缀来自不可信输入：`String`/`Bytes` 在分配前先确认剩余字节足够；
//! - `Seq`/`Map` 的元素数乘以元素的最小线上宽度不得超过剩余字节；最小宽度为零的元素不消耗输入，
//!   改由 [`CodecConfig::max_zero_sized_len`] 约束；预分配容量另受 [`CodecConfig::max_preallocate`] 约束。

use alloc::{borrow::ToOwned, boxed::Box, vec::Vec};
use core::str;

use crate::{
    config::CodecConfig,
    encoder::LENGTH_BITS,
    error::CodecError,
    registry::SchemaRegistry,
    schema::{EnumSchema, FieldSchema, IntKind, Schema, VariantShape},
    value::{EnumValue, Field, Int, Payload, Value},
    varint, zigzag,
};

/// 在字节切片上按 Schema 读取 [`Value`] 的游标。
#[derive(Debug)]
pub struct Decoder<'de> {
    input: &'de [u8],
    pos: usize,
    registry: &'de SchemaRegistry,
    config: &'de CodecConfig,
    depth: u16,
}

impl<'de> Decoder<'de> {
    /// 创建解码器，游标位于输入开头。
    pub fn new(input: &'de [u8], registry: &'de SchemaRegistry, config: &'de CodecConfig) -> Self {
        Self {
            input,
            pos: 0,
            registry,
            config,
            depth: 0,
        }
    }

    /// 已消费的字节数。
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.pos
    }

    /// 尚未消费的字节。
    #[must_use]
    pub fn remaining(&self) -> &'de [u8] {
        &self.input[self.pos..]
    }

    /// 要求输入已被完全消费。
    pub fn finish(self) -> Result<(), CodecError> {
        match self.input.len() - self.pos {
            0 => Ok(()),
            remaining => Err(CodecError::TrailingBytes { remaining }),
        }
    }

    /// 从游标处解码一个值。
    ///
    /// # 调用契约（What）
    /// - **成功**：游标前移该值的编码长度；
    /// - **失败**：返回首个违反线格式的错误，游标位置不再有意义，调用方应丢弃该解码器。
    pub fn decode(&mut self, schema: &Schema) -> Result<Value, CodecError> {
        match schema {
            Schema::Unit => Ok(Value::Unit),
            Schema::Bool => match self.read_byte()? {
                0x00 => Ok(Value::Bool(false)),
                0x01 => Ok(Value::Bool(true)),
                byte => Err(CodecError::InvalidBool { byte }),
            },
            Schema::Int(kind) => self.decode_int(*kind),
            Schema::NonZero(kind) => {
                let value = self.decode_int(*kind)?;
                match value.as_int() {
                    Some((_, int)) if int.is_zero() => {
                        Err(CodecError::InvalidNonZero { kind: kind.name() })
                    }
                    _ => Ok(value),
                }
            }
            Schema::F32 => {
                let bytes = self.read_array::<4>()?;
                Ok(Value::F32(f32::from_le_bytes(bytes)))
            }
            Schema::F64 => {
                let bytes = self.read_array::<8>()?;
                Ok(Value::F64(f64::from_le_bytes(bytes)))
            }
            Schema::String => {
                let bytes = self.read_prefixed()?;
                let text = str::from_utf8(bytes).map_err(|err| CodecError::Utf8Error {
                    valid_up_to: err.valid_up_to(),
                })?;
                Ok(Value::String(text.to_owned()))
            }
            Schema::Bytes => Ok(Value::Bytes(self.read_prefixed()?.to_vec())),
            Schema::Named(name) => {
                let registry = self.registry;
                let resolved = registry.resolve(name)?;
                self.enter()?;
                let result = self.decode(resolved);
                self.depth -= 1;
                result
            }
            container => {
                self.enter()?;
                let result = self.decode_container(container);
                self.depth -= 1;
                result
            }
        }
    }

    fn decode_container(&mut self, schema: &Schema) -> Result<Value, CodecError> {
        match schema {
            Schema::Array { item, len } => {
                let mut items = Vec::with_capacity(self.config.preallocate(*len));
                for _ in 0..*len {
                    items.push(self.decode(item)?);
                }
                Ok(Value::Array(items))
            }
            Schema::Seq(item) => {
                let item_min = self.min_wire_size(item, 0);
                let len = self.read_count(item_min)?;
                let mut items = Vec::with_capacity(self.config.preallocate(len));
                for _ in 0..len {
                    items.push(self.decode(item)?);
                }
                Ok(Value::Seq(items))
            }
            Schema::Option(item) => match self.read_byte()? {
                0x00 => Ok(Value::Option(None)),
                0x01 => Ok(Value::Option(Some(Box::new(self.decode(item)?)))),
                byte => Err(CodecError::InvalidOptionTag { byte }),
            },
            Schema::Tuple(items) => Ok(Value::Tuple(self.decode_tuple(items)?)),
            Schema::Map { key, value } => {
                let entry = self
                    .min_wire_size(key, 0)
                    .saturating_add(self.min_wire_size(value, 0));
                let len = self.read_count(entry)?;
                let mut entries = Vec::with_capacity(self.config.preallocate(len));
                for _ in 0..len {
                    let k = self.decode(key)?;
                    let v = self.decode(value)?;
                    entries.push((k, v));
                }
                Ok(Value::Map(entries))
            }
            Schema::Range(bound) => {
                let start = self.decode(bound)?;
                let end = self.decode(bound)?;
                Ok(Value::Range {
                    start: Box::new(start),
                    end: Box::new(end),
                })
            }
            Schema::Struct(strukt) => Ok(Value::Struct(self.decode_fields(&strukt.fields)?)),
            Schema::Enum(enumeration) => self.decode_enum(enumeration),
            // 叶子与命名引用已在 `decode` 中处理。
            leaf => self.decode(leaf),
        }
    }

    fn decode_tuple(&mut self, schemas: &[Schema]) -> Result<Vec<Value>, CodecError> {
        schemas.iter().map(|schema| self.decode(schema)).collect()
    }

    fn decode_fields(&mut self, schemas: &[FieldSchema]) -> Result<Vec<Field>, CodecError> {
        schemas
            .iter()
            .map(|field| {
                Ok(Field {
                    name: field.name.clone(),
                    value: self.decode(&field.schema)?,
                })
            })
            .collect()
    }

    fn decode_enum(&mut self, schema: &EnumSchema) -> Result<Value, CodecError> {
        let index = self.read_u32()?;
        let variant = schema
            .variant_at(index)
            .ok_or(CodecError::InvalidEnumVariant {
                index,
                variants: schema.variants.len(),
            })?;
        let payload = match &variant.shape {
            VariantShape::Unit => Payload::Unit,
            VariantShape::Tuple(items) => Payload::Tuple(self.decode_tuple(items)?),
            VariantShape::Struct(fields) => Payload::Struct(self.decode_fields(fields)?),
        };
        Ok(Value::Enum(EnumValue { index, payload }))
    }

    fn decode_int(&mut self, kind: IntKind) -> Result<Value, CodecError> {
        let raw = self.read_varint(kind.bits())?;
        let int = if kind.is_signed() {
            Int::Signed(zigzag::decode(raw))
        } else {
            Int::Unsigned(raw)
        };
        Value::from_int(kind, int)
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

    fn take(&mut self, len: usize) -> Result<&'de [u8], CodecError> {
        let input = self.input;
        let available = input.len() - self.pos;
        if len > available {
            return Err(CodecError::unexpected_end(len, available));
        }
        let bytes = &input[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_byte(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    fn read_varint(&mut self, bits: u32) -> Result<u128, CodecError> {
        let (value, used) = varint::decode(self.remaining(), bits)?;
        self.pos += used;
        Ok(value)
    }

    fn read_u32(&mut self) -> Result<u32, CodecError> {
        let raw = self.read_varint(LENGTH_BITS)?;
        u32::try_from(raw).map_err(|_| CodecError::IntegerOverflow { bits: LENGTH_BITS })
    }

    /// 读取长度前缀，并要求 `len * item_min` 不超过剩余字节。
    fn read_count(&mut self, item_min: usize) -> Result<usize, CodecError> {
        let count = self.read_u32()?;
        self.config.check_len(count)?;
        if item_min == 0 {
            self.config.check_zero_sized_len(count)?;
        }
        let len =
            usize::try_from(count).map_err(|_| CodecError::IntegerOverflow { bits: LENGTH_BITS })?;
        let needed = len.saturating_mul(item_min);
        let available = self.input.len() - self.pos;
        if needed > available {
            return Err(CodecError::unexpected_end(needed, available));
        }
        Ok(len)
    }

    fn read_prefixed(&mut self) -> Result<&'de [u8], CodecError> {
        let len = self.read_count(1)?;
        self.take(len)
    }

    /// 值在线上至少占用的字节数。
    ///
    /// 命名引用超过深度预算或无法解析时按 0 计，交给零宽上限与后续解码报错。
    fn min_wire_size(&self, schema: &Schema, depth: u16) -> usize {
        match schema {
            Schema::Unit => 0,
            Schema::Bool
            | Schema::Int(_)
            | Schema::NonZero(_)
            | Schema::String
            | Schema::Bytes
            | Schema::Seq(_)
            | Schema::Option(_)
            | Schema::Map { .. }
            | Schema::Enum(_) => 1,
            Schema::F32 => 4,
            Schema::F64 => 8,
            Schema::Array { item, len } => len.saturating_mul(self.min_wire_size(item, depth)),
            Schema::Tuple(items) => items
                .iter()
                .fold(0, |sum, item| sum.saturating_add(self.min_wire_size(item, depth))),
            Schema::Range(bound) => self.min_wire_size(bound, depth).saturating_mul(2),
            Schema::Struct(strukt) => strukt.fields.iter().fold(0, |sum, field| {
                sum.saturating_add(self.min_wire_size(&field.schema, depth))
            }),
            Schema::Named(name) => match self.registry.resolve(name) {
                Ok(resolved) if depth < self.config.max_depth => {
                    self.min_wire_size(resolved, depth + 1)
                }
                _ => 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StructSchema;
    use alloc::vec;

    fn decode_all(schema: &Schema, input: &[u8]) -> Result<Value, CodecError> {
        let registry = SchemaRegistry::default();
        let config = CodecConfig::default();
        let mut decoder = Decoder::new(input, &registry, &config);
        let value = decoder.decode(schema)?;
        decoder.finish()?;
        Ok(value)
    }

    #[test]
    fn strict_tag_bytes() {
        assert_eq!(
            decode_all(&Schema::Bool, &[0x02]),
            Err(CodecError::InvalidBool { byte: 0x02 })
        );
        assert_eq!(
            decode_all(&Schema::option(Schema::Bool), &[0x02]),
            Err(CodecError::InvalidOptionTag { byte: 0x02 })
        );
        assert_eq!(
            decode_all(&Schema::option(Schema::int(IntKind::U8)), &[0x01, 0x05]),
            Ok(Value::some(5u8))
        );
    }

    #[test]
    fn signed_values_unzigzag() {
        assert_eq!(decode_all(&Schema::int(IntKind::I8), &[0x01]), Ok(Value::I8(-1)));
        assert_eq!(
            decode_all(&Schema::int(IntKind::I8), &[0xFF, 0x01]),
            Ok(Value::I8(i8::MIN))
        );
        assert_eq!(
            decode_all(&Schema::int(IntKind::Isize), &[0x04]),
            Ok(Value::Isize(2))
        );
    }

    #[test]
    fn string_length_checked_before_allocation() {
        // 长度前缀声明 0x7F 字节，实际只有 1 字节。
        assert_eq!(
            decode_all(&Schema::String, &[0x7F, b'a']),
            Err(CodecError::unexpected_end(0x7F, 1))
        );
        assert_eq!(
            decode_all(&Schema::String, &[0x02, 0xC3, 0x28]),
            Err(CodecError::Utf8Error { valid_up_to: 0 })
        );
    }

    #[test]
    fn enum_index_out_of_range() {
        let schema = Schema::Enum(EnumSchema::new("E").unit_variant("A").unit_variant("B"));
        assert_eq!(decode_all(&schema, &[0x01]), Ok(Value::unit_variant(1)));
        assert_eq!(
            decode_all(&schema, &[0x02]),
            Err(CodecError::InvalidEnumVariant {
                index: 2,
                variants: 2
            })
        );
    }

    #[test]
    fn cursor_reports_progress() {
        let registry = SchemaRegistry::default();
        let config = CodecConfig::default();
        let input = [0x01, 0x02, 0x03];
        let mut decoder = Decoder::new(&input, &registry, &config);
        assert_eq!(decoder.decode(&Schema::int(IntKind::U8)), Ok(Value::U8(1)));
        assert_eq!(decoder.consumed(), 1);
        assert_eq!(decoder.remaining(), &[0x02, 0x03]);
        assert_eq!(
            decoder.finish(),
            Err(CodecError::TrailingBytes { remaining: 2 })
        );
    }

    #[test]
    fn length_budget_rejects_large_prefix() {
        let registry = SchemaRegistry::default();
        let config = CodecConfig::default().with_max_sequence_len(Some(2));
        let input = [0x03, 0x00, 0x00, 0x00];
        let mut decoder = Decoder::new(&input, &registry, &config);
        assert_eq!(
            decoder.decode(&Schema::seq(Schema::Bool)),
            Err(CodecError::LengthLimitExceeded { len: 3, limit: 2 })
        );
    }

    #[test]
    fn element_count_is_bounded_by_remaining_input() {
        // 3 个 u16 元素至少需要 3 字节，输入只剩 2 字节。
        assert_eq!(
            decode_all(&Schema::seq(Schema::int(IntKind::U16)), &[0x03, 0x01, 0x02]),
            Err(CodecError::unexpected_end(3, 2))
        );
        let pairs = Schema::map(Schema::F32, Schema::Bool);
        assert_eq!(
            decode_all(&pairs, &[0x02, 0x00, 0x00, 0x00, 0x00, 0x01]),
            Err(CodecError::unexpected_end(10, 5))
        );
    }

    #[test]
    fn zero_sized_elements_use_dedicated_cap() {
        let registry = SchemaRegistry::default();
        let config = CodecConfig::default().with_max_zero_sized_len(4);
        let units = Schema::seq(Schema::Unit);

        let mut decoder = Decoder::new(&[0x04], &registry, &config);
        assert_eq!(
            decoder.decode(&units),
            Ok(Value::Seq(vec![Value::Unit; 4]))
        );

        let empty = Schema::seq(Schema::Struct(StructSchema::new("Empty")));
        let mut decoder = Decoder::new(&[0x05], &registry, &config);
        assert_eq!(
            decoder.decode(&empty),
            Err(CodecError::LengthLimitExceeded { len: 5, limit: 4 })
        );

        let mut decoder = Decoder::new(&[0x05], &registry, &config);
        assert_eq!(
            decoder.decode(&Schema::map(Schema::Unit, Schema::Tuple(Vec::new()))),
            Err(CodecError::LengthLimitExceeded { len: 5, limit: 4 })
        );
    }

    #[test]
    fn min_wire_size_follows_named_types() {
        let mut registry = SchemaRegistry::new();
        registry
            .register_struct(
                StructSchema::new("Node")
                    .field("value", IntKind::U8)
                    .field("next", Schema::option(Schema::named("Node"))),
            )
            .expect("注册节点");
        registry
            .register("Loop", Schema::tuple([Schema::named("Loop")]))
            .expect("注册自引用");
        let config = CodecConfig::default();
        let decoder = Decoder::new(&[], &registry, &config);
        assert_eq!(decoder.min_wire_size(&Schema::named("Node"), 0), 2);
        assert_eq!(decoder.min_wire_size(&Schema::named("Loop"), 0), 0);
        assert_eq!(decoder.min_wire_size(&Schema::named("Missing"), 0), 0);
        assert_eq!(
            decoder.min_wire_size(&Schema::range(Schema::array(Schema::F32, 3)), 0),
            24
        );
    }

    #[test]
    fn non_zero_rejects_zero_on_decode() {
        assert_eq!(
            decode_all(&Schema::non_zero(IntKind::I16), &[0x00]),
            Err(CodecError::InvalidNonZero { kind: "i16" })
        );
        assert_eq!(
            decode_all(&Schema::seq(Schema::non_zero(IntKind::U8)), &[0x01, 0x07]),
            Ok(Value::Seq(vec![Value::U8(7)]))
        );
    }
}
