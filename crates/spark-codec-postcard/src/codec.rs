//! 顶层编解码门面。
//!
//! # 教案定位（Why）
//! - [`Encoder`]/[`Decoder`] 是单趟遍历器，需要调用方自己管理注册表、预算与缓冲；
//!   [`Codec`] 把三者打包成一次调用的门面，并负责"全有或全无"的输出语义与日志；
//! - 所有顶层调用都经过这里，日志字段 `codec.mode` 与错误码的记录只需在一处维护。
//!
//! # 契约说明（What）
//! - [`Codec::encode`]/[`Codec::encode_into`]：失败时不向调用方缓冲追加任何字节；
//! - [`Codec::decode`]：穷尽式，剩余字节返回 [`CodecError::TrailingBytes`]；
//! - [`Codec::take`]：非穷尽式，返回值与剩余切片，适合连续记录的流式读取；
//! - 自由函数 [`to_vec`]/[`from_slice`]/[`take_from_slice`] 使用空注册表与默认预算。
//!
//! # 可观测性（How）
//! - 每次顶层调用成功时发出一条 `trace!`，携带 `codec.mode`、Schema 种类与字节数；
//! - 失败时发出一条 `debug!`，携带稳定错误码 `error.code`；库本身从不安装 Subscriber。

use alloc::vec::Vec;

use bytes::BufMut;
use tracing::{debug, trace};

use crate::{
    config::CodecConfig, decoder::Decoder, encoder::Encoder, error::CodecError,
    registry::SchemaRegistry, schema::Schema, value::Value,
};

/// 编解码阶段，区分 Encode 与 Decode。
///
/// # 契约说明（What）
/// - `Encode`：值序列化为字节的阶段；
/// - `Decode`：字节反序列化为值的阶段；
/// - [`CodecPhase::mode_label`] 返回日志字段 `codec.mode` 的固定取值。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodecPhase {
    /// 编码。
    Encode,
    /// 解码。
    Decode,
}

impl CodecPhase {
    /// `codec.mode` 标签值。
    #[inline]
    #[must_use]
    pub fn mode_label(self) -> &'static str {
        match self {
            CodecPhase::Encode => "encode",
            CodecPhase::Decode => "decode",
        }
    }
}

/// 持有注册表与预算的编解码门面。
#[derive(Clone, Debug, Default)]
pub struct Codec {
    config: CodecConfig,
    registry: SchemaRegistry,
}

impl Codec {
    /// 以默认预算创建。
    #[must_use]
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            config: CodecConfig::default(),
            registry,
        }
    }

    /// 以自定义预算创建，预算非法时返回 [`CodecError::ConfigError`]。
    pub fn with_config(registry: SchemaRegistry, config: CodecConfig) -> Result<Self, CodecError> {
        config.validate()?;
        Ok(Self { config, registry })
    }

    /// 当前预算。
    #[must_use]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// 注册表。
    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// 可变注册表，用于后续追加命名类型。
    pub fn registry_mut(&mut self) -> &mut SchemaRegistry {
        &mut self.registry
    }

    /// 编码为新的字节向量。
    pub fn encode(&self, schema: &Schema, value: &Value) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        self.encode_into(schema, value, &mut out)?;
        Ok(out)
    }

    /// 编码并追加到 `out`，返回追加的字节数。
    ///
    /// 先写入临时缓冲，成功后一次性提交，失败时 `out` 保持原样。
    pub fn encode_into<B: BufMut>(
        &self,
        schema: &Schema,
        value: &Value,
        out: &mut B,
    ) -> Result<usize, CodecError> {
        let mut scratch = Vec::new();
        let outcome = Encoder::new(&mut scratch, &self.registry, &self.config).encode(schema, value);
        match outcome {
            Ok(()) => {
                out.put_slice(&scratch);
                trace!(
                    codec.mode = CodecPhase::Encode.mode_label(),
                    schema = schema.kind_label(),
                    bytes = scratch.len(),
                    "postcard encode completed"
                );
                Ok(scratch.len())
            }
            Err(err) => Err(report(CodecPhase::Encode, schema, err)),
        }
    }

    /// 穷尽式解码：整个输入必须恰好是一个值。
    pub fn decode(&self, schema: &Schema, input: &[u8]) -> Result<Value, CodecError> {
        let mut decoder = Decoder::new(input, &self.registry, &self.config);
        let outcome = decoder
            .decode(schema)
            .and_then(|value| decoder.finish().map(|()| value));
        match outcome {
            Ok(value) => {
                trace!(
                    codec.mode = CodecPhase::Decode.mode_label(),
                    schema = schema.kind_label(),
                    bytes = input.len(),
                    "postcard decode completed"
                );
                Ok(value)
            }
            Err(err) => Err(report(CodecPhase::Decode, schema, err)),
        }
    }

    /// 非穷尽式解码：读取一个值并返回剩余字节。
    pub fn take<'de>(
        &self,
        schema: &Schema,
        input: &'de [u8],
    ) -> Result<(Value, &'de [u8]), CodecError> {
        let mut decoder = Decoder::new(input, &self.registry, &self.config);
        match decoder.decode(schema) {
            Ok(value) => {
                let consumed = decoder.consumed();
                trace!(
                    codec.mode = CodecPhase::Decode.mode_label(),
                    schema = schema.kind_label(),
                    bytes = consumed,
                    remaining = input.len() - consumed,
                    "postcard take completed"
                );
                Ok((value, &input[consumed..]))
            }
            Err(err) => Err(report(CodecPhase::Decode, schema, err)),
        }
    }
}

fn report(phase: CodecPhase, schema: &Schema, err: CodecError) -> CodecError {
    debug!(
        codec.mode = phase.mode_label(),
        schema = schema.kind_label(),
        error.code = err.code(),
        error = %err,
        "postcard codec call failed"
    );
    err
}

/// 使用空注册表与默认预算编码。
pub fn to_vec(schema: &Schema, value: &Value) -> Result<Vec<u8>, CodecError> {
    Codec::default().encode(schema, value)
}

/// 使用空注册表与默认预算穷尽式解码。
pub fn from_slice(schema: &Schema, input: &[u8]) -> Result<Value, CodecError> {
    Codec::default().decode(schema, input)
}

/// 使用空注册表与默认预算读取一个值并返回剩余字节。
pub fn take_from_slice<'de>(
    schema: &Schema,
    input: &'de [u8],
) -> Result<(Value, &'de [u8]), CodecError> {
    Codec::default().take(schema, input)
}
