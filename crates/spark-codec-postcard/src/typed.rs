//! Rust 原生类型与 (Schema, Value) 之间的桥接。
//!
//! # 教案定位（Why）
//! - 动态值模型适合跨语言工具与 TCK，但业务代码更习惯直接处理 `u32`、`Vec<T>`、`Option<T>`；
//! - [`WireType`] 为常见原生类型给出固定的 Schema 与双向转换，使 `to_vec(42u32)` 这类调用无需手写 Schema。
//!
//! # 契约说明（What）
//! - `T::schema()` 与 `into_value` 产出的值永远一致，编码不会因形状失败；
//! - `from_value` 对形状不符返回 [`CodecError::SchemaMismatch`]，对宽度或零值约束返回对应错误；
//! - `BTreeMap` 解码时若出现重复键，后出现者覆盖先出现者。

use alloc::{boxed::Box, collections::BTreeMap, string::String, vec::Vec};
use core::{
    num::{NonZeroI8, NonZeroI16, NonZeroI32, NonZeroI64, NonZeroI128},
    num::{NonZeroU8, NonZeroU16, NonZeroU32, NonZeroU64, NonZeroU128},
    ops::Range,
};

use crate::{
    codec::Codec,
    error::CodecError,
    schema::{IntKind, Schema},
    value::Value,
};

/// 具有固定线上形状的原生类型。
pub trait WireType: Sized {
    /// 该类型的 Schema。
    fn schema() -> Schema;

    /// 转换为动态值。
    fn into_value(self) -> Value;

    /// 从动态值还原。
    fn from_value(value: Value) -> Result<Self, CodecError>;
}

/// 编码原生值。
pub fn to_vec<T: WireType>(value: T) -> Result<Vec<u8>, CodecError> {
    Codec::default().encode(&T::schema(), &value.into_value())
}

/// 穷尽式解码原生值。
pub fn from_bytes<T: WireType>(input: &[u8]) -> Result<T, CodecError> {
    T::from_value(Codec::default().decode(&T::schema(), input)?)
}

/// 解码一个原生值并返回剩余字节。
pub fn take_from_bytes<T: WireType>(input: &[u8]) -> Result<(T, &[u8]), CodecError> {
    let (value, rest) = Codec::default().take(&T::schema(), input)?;
    Ok((T::from_value(value)?, rest))
}

fn mismatch(expected: &Schema, found: &Value) -> CodecError {
    CodecError::mismatch(alloc::format!("{expected}"), found.kind_label())
}

impl WireType for () {
    fn schema() -> Schema {
        Schema::Unit
    }

    fn into_value(self) -> Value {
        Value::Unit
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Unit => Ok(()),
            other => Err(mismatch(&Self::schema(), &other)),
        }
    }
}

macro_rules! impl_scalar {
    ($($ty:ty => $variant:ident, $schema:expr);* $(;)?) => {
        $(
            impl WireType for $ty {
                fn schema() -> Schema {
                    $schema
                }

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: Value) -> Result<Self, CodecError> {
                    match value {
                        Value::$variant(inner) => Ok(inner),
                        other => Err(mismatch(&Self::schema(), &other)),
                    }
                }
            }
        )*
    };
}

impl_scalar!(
    bool => Bool, Schema::Bool;
    u8 => U8, Schema::Int(IntKind::U8);
    u16 => U16, Schema::Int(IntKind::U16);
    u32 => U32, Schema::Int(IntKind::U32);
    u64 => U64, Schema::Int(IntKind::U64);
    u128 => U128, Schema::Int(IntKind::U128);
    i8 => I8, Schema::Int(IntKind::I8);
    i16 => I16, Schema::Int(IntKind::I16);
    i32 => I32, Schema::Int(IntKind::I32);
    i64 => I64, Schema::Int(IntKind::I64);
    i128 => I128, Schema::Int(IntKind::I128);
    f32 => F32, Schema::F32;
    f64 => F64, Schema::F64;
    String => String, Schema::String;
);

impl WireType for usize {
    fn schema() -> Schema {
        Schema::Int(IntKind::Usize)
    }

    fn into_value(self) -> Value {
        // 支持的目标平台上 usize 不超过 64 位。
        Value::Usize(self as u64)
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Usize(inner) => {
                usize::try_from(inner).map_err(|_| CodecError::IntegerOverflow { bits: usize::BITS })
            }
            other => Err(mismatch(&Self::schema(), &other)),
        }
    }
}

impl WireType for isize {
    fn schema() -> Schema {
        Schema::Int(IntKind::Isize)
    }

    fn into_value(self) -> Value {
        Value::Isize(self as i64)
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Isize(inner) => {
                isize::try_from(inner).map_err(|_| CodecError::IntegerOverflow { bits: isize::BITS })
            }
            other => Err(mismatch(&Self::schema(), &other)),
        }
    }
}

macro_rules! impl_non_zero {
    ($($ty:ty => $variant:ident, $kind:expr);* $(;)?) => {
        $(
            impl WireType for $ty {
                fn schema() -> Schema {
                    Schema::NonZero($kind)
                }

                fn into_value(self) -> Value {
                    Value::$variant(self.get())
                }

                fn from_value(value: Value) -> Result<Self, CodecError> {
                    match value {
                        Value::$variant(inner) => <$ty>::new(inner)
                            .ok_or(CodecError::InvalidNonZero { kind: $kind.name() }),
                        other => Err(mismatch(&Self::schema(), &other)),
                    }
                }
            }
        )*
    };
}

impl_non_zero!(
    NonZeroU8 => U8, IntKind::U8;
    NonZeroU16 => U16, IntKind::U16;
    NonZeroU32 => U32, IntKind::U32;
    NonZeroU64 => U64, IntKind::U64;
    NonZeroU128 => U128, IntKind::U128;
    NonZeroI8 => I8, IntKind::I8;
    NonZeroI16 => I16, IntKind::I16;
    NonZeroI32 => I32, IntKind::I32;
    NonZeroI64 => I64, IntKind::I64;
    NonZeroI128 => I128, IntKind::I128;
);

impl<T: WireType> WireType for Vec<T> {
    fn schema() -> Schema {
        Schema::seq(T::schema())
    }

    fn into_value(self) -> Value {
        Value::Seq(self.into_iter().map(WireType::into_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Seq(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch(&Self::schema(), &other)),
        }
    }
}

impl<T: WireType> WireType for Option<T> {
    fn schema() -> Schema {
        Schema::option(T::schema())
    }

    fn into_value(self) -> Value {
        Value::Option(self.map(|inner| Box::new(inner.into_value())))
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Option(None) => Ok(None),
            Value::Option(Some(inner)) => T::from_value(*inner).map(Some),
            other => Err(mismatch(&Self::schema(), &other)),
        }
    }
}

impl<T: WireType, const N: usize> WireType for [T; N] {
    fn schema() -> Schema {
        Schema::array(T::schema(), N)
    }

    fn into_value(self) -> Value {
        Value::Array(self.into_iter().map(WireType::into_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Array(items) if items.len() == N => {
                let items = items
                    .into_iter()
                    .map(T::from_value)
                    .collect::<Result<Vec<T>, _>>()?;
                items.try_into().map_err(|rest: Vec<T>| {
                    CodecError::mismatch(
                        alloc::format!("array of {N}"),
                        alloc::format!("array of {}", rest.len()),
                    )
                })
            }
            other => Err(mismatch(&Self::schema(), &other)),
        }
    }
}

impl<K: WireType + Ord, V: WireType> WireType for BTreeMap<K, V> {
    fn schema() -> Schema {
        Schema::map(K::schema(), V::schema())
    }

    fn into_value(self) -> Value {
        Value::Map(
            self.into_iter()
                .map(|(k, v)| (k.into_value(), v.into_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => Err(mismatch(&Self::schema(), &other)),
        }
    }
}

impl<T: WireType> WireType for Range<T> {
    fn schema() -> Schema {
        Schema::range(T::schema())
    }

    fn into_value(self) -> Value {
        Value::range(self.start.into_value(), self.end.into_value())
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Range { start, end } => Ok(T::from_value(*start)?..T::from_value(*end)?),
            other => Err(mismatch(&Self::schema(), &other)),
        }
    }
}

macro_rules! impl_tuple {
    ($len:expr => $($name:ident),+) => {
        impl<$($name: WireType),+> WireType for ($($name,)+) {
            fn schema() -> Schema {
                Schema::tuple([$($name::schema()),+])
            }

            #[allow(non_snake_case)]
            fn into_value(self) -> Value {
                let ($($name,)+) = self;
                Value::Tuple(alloc::vec![$($name.into_value()),+])
            }

            fn from_value(value: Value) -> Result<Self, CodecError> {
                match value {
                    Value::Tuple(items) if items.len() == $len => {
                        let mut items = items.into_iter();
                        Ok(($($name::from_value(items.next().unwrap_or(Value::Unit))?,)+))
                    }
                    other => Err(mismatch(&Self::schema(), &other)),
                }
            }
        }
    };
}

impl_tuple!(1 => A);
impl_tuple!(2 => A, B);
impl_tuple!(3 => A, B, C);
impl_tuple!(4 => A, B, C, D);
impl_tuple!(5 => A, B, C, D, E);
impl_tuple!(6 => A, B, C, D, E, F);
