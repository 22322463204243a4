//! 编解码错误类型定义。
//!
//! # 教案定位（Why）
//! - 线格式不携带任何冗余标签，任何字节偏差都会导致后续解析整体错位，因此每一类失败都必须带着精确语义上报；
//! - 错误枚举与 `encoder`/`decoder` 解耦，使两侧遍历共享同一套诊断词汇，便于 TCK 直接断言具体分支。
//!
//! # 使用契约（What）
//! - [`CodecError`] 的每个分支都是确定性的结构性失败，调用方不应重试，也不会得到部分解码结果；
//! - [`CodecError::code`] 返回稳定的点分错误码（见 [`codes`]），用于日志聚合与跨语言对照；
//! - 所有变体实现 `Clone`/`PartialEq`，测试可直接 `assert_eq!` 比较。

use alloc::string::String;

use thiserror::Error;

use crate::codec::CodecPhase;

/// 稳定错误码集合。
///
/// 命名遵循 `<域>.<阶段>.<原因>` 的三段式约定，与日志字段 `error.code` 一一对应。
pub mod codes {
    /// 输入在解码中途耗尽。
    pub const DECODE_UNEXPECTED_END: &str = "protocol.decode.unexpected_end";
    /// 布尔字节不是 `0x00`/`0x01`。
    pub const DECODE_INVALID_BOOL: &str = "protocol.decode.invalid_bool";
    /// Option 标签字节不是 `0x00`/`0x01`。
    pub const DECODE_INVALID_OPTION_TAG: &str = "protocol.decode.invalid_option_tag";
    /// 枚举变体索引越界。
    pub const INVALID_ENUM_VARIANT: &str = "protocol.codec.invalid_enum_variant";
    /// 字符串负载不是合法 UTF-8。
    pub const DECODE_UTF8: &str = "protocol.decode.utf8";
    /// 整数超出目标位宽。
    pub const INTEGER_OVERFLOW: &str = "protocol.codec.integer_overflow";
    /// 穷尽式解码后仍有剩余字节。
    pub const DECODE_TRAILING_BYTES: &str = "protocol.decode.trailing_bytes";
    /// NonZero 整数出现零值。
    pub const INVALID_NON_ZERO: &str = "protocol.codec.invalid_non_zero";
    /// 值与 Schema 形状不一致。
    pub const ENCODE_SCHEMA_MISMATCH: &str = "protocol.encode.schema_mismatch";
    /// 引用了未注册的命名类型。
    pub const SCHEMA_UNKNOWN_TYPE: &str = "protocol.schema.unknown_type";
    /// 命名类型重复注册。
    pub const SCHEMA_DUPLICATE_TYPE: &str = "protocol.schema.duplicate_type";
    /// 嵌套深度超过配置上限。
    pub const BUDGET_DEPTH_EXCEEDED: &str = "protocol.budget.depth_exceeded";
    /// 长度前缀超过配置上限。
    pub const BUDGET_LENGTH_EXCEEDED: &str = "protocol.budget.length_exceeded";
    /// 配置非法。
    pub const CONFIG_INVALID: &str = "protocol.config.invalid";
}

/// 编码或解码过程中可能出现的全部错误。
///
/// ## 教案解读（Why）
/// - 前七个分支直接对应线格式契约：截断、非法标签字节、越界索引、非法 UTF-8、整数溢出与尾随字节；
/// - 其余分支覆盖 Schema 层（未注册类型、值形状不匹配）与资源预算（深度、长度、配置）。
///
/// ## 契约定义（What）
/// - 触发错误后调用方不得假定输出缓冲或输入游标处于任何中间状态；
/// - 字段只保存整型与短字符串，保证在 `no_std + alloc` 环境中同样可用。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// 读取越过输入末尾。
    #[error("unexpected end of input: needed {needed} byte(s), {available} available")]
    UnexpectedEnd {
        /// 当前步骤至少需要的字节数。
        needed: usize,
        /// 实际剩余的字节数。
        available: usize,
    },
    /// 布尔值字节不在 `{0x00, 0x01}` 之内。
    #[error("invalid bool byte 0x{byte:02x}")]
    InvalidBool {
        /// 读到的原始字节。
        byte: u8,
    },
    /// Option 标签字节不在 `{0x00, 0x01}` 之内。
    #[error("invalid option tag 0x{byte:02x}")]
    InvalidOptionTag {
        /// 读到的原始字节。
        byte: u8,
    },
    /// 枚举变体索引不小于声明的变体数量。
    #[error("enum variant index {index} out of range ({variants} variant(s) declared)")]
    InvalidEnumVariant {
        /// 线上或值中携带的索引。
        index: u32,
        /// Schema 声明的变体数量。
        variants: usize,
    },
    /// 字符串负载不是合法 UTF-8。
    #[error("string payload is not valid utf-8 (valid up to byte {valid_up_to})")]
    Utf8Error {
        /// 合法前缀的长度。
        valid_up_to: usize,
    },
    /// 数值无法放入目标位宽。
    #[error("integer does not fit into a {bits}-bit target")]
    IntegerOverflow {
        /// 目标位宽。
        bits: u32,
    },
    /// 穷尽式解码结束后仍有未消费字节。
    #[error("{remaining} trailing byte(s) after exhaustive decode")]
    TrailingBytes {
        /// 剩余字节数。
        remaining: usize,
    },
    /// NonZero 整数出现零值。
    #[error("zero is not a valid value for non-zero {kind}")]
    InvalidNonZero {
        /// 整数类型名，例如 `u32`。
        kind: &'static str,
    },
    /// 值的形状与 Schema 不一致。
    #[error("value does not match schema: expected {expected}, found {found}")]
    SchemaMismatch {
        /// Schema 期望的形状描述。
        expected: String,
        /// 值实际呈现的形状描述。
        found: String,
    },
    /// `Schema::Named` 引用的类型未注册。
    #[error("unknown named type `{name}`")]
    UnknownType {
        /// 引用的类型名。
        name: String,
    },
    /// 同名类型重复注册。
    #[error("named type `{name}` is already registered")]
    DuplicateType {
        /// 冲突的类型名。
        name: String,
    },
    /// 嵌套深度超过 [`CodecConfig::max_depth`](crate::CodecConfig)。
    #[error("nesting depth limit {limit} exceeded")]
    DepthLimitExceeded {
        /// 生效的深度上限。
        limit: u16,
    },
    /// 序列/映射长度前缀超过 [`CodecConfig::max_sequence_len`](crate::CodecConfig)。
    #[error("length prefix {len} exceeds configured limit {limit}")]
    LengthLimitExceeded {
        /// 线上声明的长度。
        len: u32,
        /// 生效的长度上限。
        limit: u32,
    },
    /// 配置项取值非法。
    #[error("invalid codec configuration: {reason}")]
    ConfigError {
        /// 人类可读的原因。
        reason: String,
    },
}

impl CodecError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnexpectedEnd { .. } => codes::DECODE_UNEXPECTED_END,
            Self::InvalidBool { .. } => codes::DECODE_INVALID_BOOL,
            Self::InvalidOptionTag { .. } => codes::DECODE_INVALID_OPTION_TAG,
            Self::InvalidEnumVariant { .. } => codes::INVALID_ENUM_VARIANT,
            Self::Utf8Error { .. } => codes::DECODE_UTF8,
            Self::IntegerOverflow { .. } => codes::INTEGER_OVERFLOW,
            Self::TrailingBytes { .. } => codes::DECODE_TRAILING_BYTES,
            Self::InvalidNonZero { .. } => codes::INVALID_NON_ZERO,
            Self::SchemaMismatch { .. } => codes::ENCODE_SCHEMA_MISMATCH,
            Self::UnknownType { .. } => codes::SCHEMA_UNKNOWN_TYPE,
            Self::DuplicateType { .. } => codes::SCHEMA_DUPLICATE_TYPE,
            Self::DepthLimitExceeded { .. } => codes::BUDGET_DEPTH_EXCEEDED,
            Self::LengthLimitExceeded { .. } => codes::BUDGET_LENGTH_EXCEEDED,
            Self::ConfigError { .. } => codes::CONFIG_INVALID,
        }
    }

    /// 指出错误只可能出现在哪个阶段；两侧都可能出现时返回 `None`。
    ///
    /// - 截断、非法标签、UTF-8、尾随字节与长度预算只会在解码时出现；
    /// - 形状不匹配只会在编码（或构造校验）时出现；
    /// - 溢出、越界索引、NonZero、命名类型与深度预算两侧共享。
    pub fn phase(&self) -> Option<CodecPhase> {
        match self {
            Self::UnexpectedEnd { .. }
            | Self::InvalidBool { .. }
            | Self::InvalidOptionTag { .. }
            | Self::Utf8Error { .. }
            | Self::TrailingBytes { .. }
            | Self::LengthLimitExceeded { .. } => Some(CodecPhase::Decode),
            Self::SchemaMismatch { .. } => Some(CodecPhase::Encode),
            _ => None,
        }
    }

    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub(crate) fn unexpected_end(needed: usize, available: usize) -> Self {
        Self::UnexpectedEnd { needed, available }
    }
}
