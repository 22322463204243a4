//! 编解码资源预算配置。
//!
//! # 教案定位（Why）
//! - 线格式本身不限制嵌套深度与长度前缀，畸形或恶意输入可以用几个字节声明上亿元素；
//! - 预算与帧大小上限一样属于"外部可调"的防护参数，因此独立成结构体，可由 TOML 文件加载。
//!
//! # 契约说明（What）
//! - `max_depth`：容器嵌套上限（容器节点与命名引用每层计 1），默认 128，必须大于 0；
//! - `max_sequence_len`：解码时 `Seq`/`Map`/`String`/`Bytes` 长度前缀上限，默认不限制；
//! - `max_zero_sized_len`：元素线上最小宽度为零（如 `Unit`、空结构体）时 `Seq`/`Map` 的元素数上限，
//!   默认 65536；这类元素不消耗输入，无法用剩余字节数约束；
//! - `max_preallocate`：按长度前缀预分配容量时的上限，只影响分配策略，不影响结果。
//!
//! # 注意事项（Gotchas）
//! - 预算只约束解码方向的长度前缀；编码方向的长度由调用方持有的值决定，深度预算两侧都生效。

use alloc::string::String;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// 默认嵌套深度上限。
pub const DEFAULT_MAX_DEPTH: u16 = 128;

/// 默认预分配容量上限（元素个数）。
pub const DEFAULT_MAX_PREALLOCATE: usize = 4096;

/// 默认零宽元素序列长度上限。
pub const DEFAULT_MAX_ZERO_SIZED_LEN: u32 = 65_536;

/// 编解码预算。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// 容器嵌套深度上限。
    pub max_depth: u16,
    /// 长度前缀上限；`None` 表示仅受 32 位长度本身约束。
    pub max_sequence_len: Option<u32>,
    /// 零宽元素的 `Seq`/`Map` 元素数上限。
    pub max_zero_sized_len: u32,
    /// 单次预分配的最大元素数。
    pub max_preallocate: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_sequence_len: None,
            max_zero_sized_len: DEFAULT_MAX_ZERO_SIZED_LEN,
            max_preallocate: DEFAULT_MAX_PREALLOCATE,
        }
    }
}

impl CodecConfig {
    /// 设置嵌套深度上限。
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u16) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// 设置长度前缀上限。
    #[must_use]
    pub fn with_max_sequence_len(mut self, max_sequence_len: Option<u32>) -> Self {
        self.max_sequence_len = max_sequence_len;
        self
    }

    /// 设置零宽元素序列长度上限。
    #[must_use]
    pub fn with_max_zero_sized_len(mut self, max_zero_sized_len: u32) -> Self {
        self.max_zero_sized_len = max_zero_sized_len;
        self
    }

    /// 设置预分配上限。
    #[must_use]
    pub fn with_max_preallocate(mut self, max_preallocate: usize) -> Self {
        self.max_preallocate = max_preallocate;
        self
    }

    /// 校验配置。
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.max_depth == 0 {
            return Err(CodecError::ConfigError {
                reason: String::from("max_depth must be greater than zero"),
            });
        }
        Ok(())
    }

    /// 从 TOML 文本解析并校验。
    ///
    /// 未出现的键取默认值，未知键视为错误。
    #[cfg(feature = "std")]
    pub fn from_toml_str(source: &str) -> Result<Self, CodecError> {
        let config: Self = toml::from_str(source).map_err(|err| CodecError::ConfigError {
            reason: String::from(err.message()),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 检查长度前缀是否在预算之内。
    pub(crate) fn check_len(&self, len: u32) -> Result<(), CodecError> {
        match self.max_sequence_len {
            Some(limit) if len > limit => Err(CodecError::LengthLimitExceeded { len, limit }),
            _ => Ok(()),
        }
    }

    /// 检查零宽元素序列的元素数。
    pub(crate) fn check_zero_sized_len(&self, len: u32) -> Result<(), CodecError> {
        let limit = self.max_zero_sized_len;
        if len > limit {
            return Err(CodecError::LengthLimitExceeded { len, limit });
        }
        Ok(())
    }

    /// 按预算截断的预分配容量。
    pub(crate) fn preallocate(&self, len: usize) -> usize {
        len.min(self.max_preallocate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = CodecConfig::default();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.max_sequence_len, None);
        assert!(config.validate().is_ok());
        assert!(config.check_len(u32::MAX).is_ok());
        assert!(config.check_zero_sized_len(DEFAULT_MAX_ZERO_SIZED_LEN).is_ok());
        assert!(config.check_zero_sized_len(DEFAULT_MAX_ZERO_SIZED_LEN + 1).is_err());
    }

    #[test]
    fn zero_depth_is_rejected() {
        let err = CodecConfig::default().with_max_depth(0).validate();
        assert!(matches!(err, Err(CodecError::ConfigError { .. })));
    }

    #[test]
    fn length_budget_is_inclusive() {
        let config = CodecConfig::default().with_max_sequence_len(Some(8));
        assert!(config.check_len(8).is_ok());
        assert_eq!(
            config.check_len(9),
            Err(CodecError::LengthLimitExceeded { len: 9, limit: 8 })
        );
        assert_eq!(config.with_max_preallocate(4).preallocate(100), 4);
    }

    #[cfg(feature = "std")]
    #[test]
    fn toml_overrides_selected_keys() {
        let config = CodecConfig::from_toml_str("max_depth = 16\nmax_sequence_len = 1024\n")
            .expect("合法配置");
        assert_eq!(config.max_depth, 16);
        assert_eq!(config.max_sequence_len, Some(1024));
        assert_eq!(config.max_preallocate, DEFAULT_MAX_PREALLOCATE);

        assert_eq!(config.max_zero_sized_len, DEFAULT_MAX_ZERO_SIZED_LEN);
        let tight = CodecConfig::from_toml_str("max_zero_sized_len = 16").expect("合法配置");
        assert_eq!(tight.max_zero_sized_len, 16);

        assert!(CodecConfig::from_toml_str("max_depth = 0").is_err());
        assert!(CodecConfig::from_toml_str("unknown = 1").is_err());
    }
}
