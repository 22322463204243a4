#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

//! `spark-codec-postcard` 提供 postcard 线格式的 Schema 驱动编解码实现。
//!
//! # 教案背景（Why）
//! - postcard 是紧凑的、非自描述的二进制格式：线上不写字段名、不写类型标签、不做对齐，
//!   两端必须共享同一份类型描述才能互通；
//! - 本 crate 把"类型描述"显式化为运行期 [`Schema`]，使任意语言的宿主都能按同一规则生成与参考实现逐字节一致的输出。
//!
//! # 使用概览（How）
//! - 构造 [`Schema`]（或通过 [`WireType`] 从原生类型获得），以 [`Value`] 表达数据；
//! - 调用 [`to_vec`]/[`from_slice`]，或持有 [`Codec`] 以复用 [`SchemaRegistry`] 与 [`CodecConfig`]；
//! - 原生类型的编码入口是 [`typed::to_vec`]，与动态值的 [`to_vec`] 分处两个命名空间；
//! - 底层的 [`varint`] 与 [`zigzag`] 模块公开，供需要逐字段手写协议的调用方直接使用。
//!
//! # 合约说明（What）
//! - 整数：无符号直接 varint，有符号 ZigZag 后 varint；`u8`/`i8` 同样走 varint；`usize`/`isize` 固定按 64 位；
//! - 长度前缀与枚举索引为 32 位 varint；浮点为小端 IEEE-754；
//! - 所有失败通过 [`CodecError`] 返回，附带稳定错误码（见 [`codes`]）。
//!
//! # 风险提示（Trade-offs）
//! - 格式不携带版本信息：Schema 的任何声明顺序变化都会改变字节，跨版本演进需要调用方自行协商；
//! - 关闭 `std` 特性时不提供 TOML 配置加载，其余功能在 `no_std + alloc` 下完整可用。

extern crate alloc;

mod codec;
mod config;
mod decoder;
mod encoder;
mod error;
mod registry;
mod schema;
mod value;

pub mod typed;
pub mod varint;
pub mod zigzag;

pub use crate::{
    codec::{Codec, CodecPhase, from_slice, take_from_slice, to_vec},
    config::{CodecConfig, DEFAULT_MAX_DEPTH, DEFAULT_MAX_PREALLOCATE, DEFAULT_MAX_ZERO_SIZED_LEN},
    decoder::Decoder,
    encoder::Encoder,
    error::{CodecError, codes},
    registry::SchemaRegistry,
    schema::{
        EnumSchema, FieldSchema, IntKind, Schema, StructSchema, VariantSchema, VariantShape, fields,
    },
    typed::{WireType, from_bytes, take_from_bytes},
    value::{EnumValue, Field, Payload, Value},
};
