//! 无符号变长整数（Varint）编解码。
//!
//! # 教案定位（Why）
//! - 所有整数叶子、长度前缀与枚举索引都经过该模块，它是与参考实现逐字节对齐的第一道关口；
//! - 算法与位宽无关：128 位整数与 8 位整数共用同一循环，只有解码目标位宽不同。
//!
//! # 线格式（What）
//! - 每字节承载 7 个有效位，低位组在前；最高位为 1 表示后续仍有字节，为 0 表示结束；
//! - `0` 编码为单字节 `0x00`，`127` 为一个字节，`128` 为 `[0x80, 0x01]`；
//! - 面向 `W` 位目标的 varint 最长 `ceil(W / 7)` 字节，最后一个允许的字节只能携带 `W % 7` 个有效位。
//!
//! # 实现策略（How）
//! - 累加器直接使用原生 `u128`，移位与掩码在单一整型上完成，不需要多肢（limb）拼接；
//! - 编码结果放入内联 `SmallVec`，最长 19 字节，避免为单个整数触发堆分配。

use bytes::BufMut;
use smallvec::SmallVec;

use crate::error::CodecError;

/// 任一宽度下 varint 的最大字节数（`u128` 需要 19 字节）。
pub const MAX_VARINT_LEN: usize = max_len(128);

/// 单个 varint 的内联编码结果。
pub type VarintBytes = SmallVec<[u8; MAX_VARINT_LEN]>;

const PAYLOAD_MASK: u8 = 0x7F;
const CONTINUATION: u8 = 0x80;

/// `bits` 位目标在线上的最大字节数，即 `ceil(bits / 7)`。
#[must_use]
pub const fn max_len(bits: u32) -> usize {
    bits.div_ceil(7) as usize
}

/// 最后一个允许字节中可出现的最大负载值。
const fn max_last_byte(bits: u32) -> u8 {
    match bits % 7 {
        0 => PAYLOAD_MASK,
        rem => (1u8 << rem) - 1,
    }
}

/// 判断 `value` 是否能放入 `bits` 位无符号整数。
#[must_use]
pub const fn fits(value: u128, bits: u32) -> bool {
    bits >= 128 || value >> bits == 0
}

/// 将 `value` 编码为最短 varint。
#[must_use]
pub fn encode(mut value: u128) -> VarintBytes {
    let mut out = VarintBytes::new();
    loop {
        let byte = (value as u8) & PAYLOAD_MASK;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | CONTINUATION);
    }
}

/// 按目标位宽校验后写入 `out`，返回写入的字节数。
///
/// 超出 `bits` 的数值返回 [`CodecError::IntegerOverflow`]，此时 `out` 不会被修改。
pub fn encode_into<B: BufMut>(
    value: u128,
    bits: u32,
    out: &mut B,
) -> Result<usize, CodecError> {
    if !fits(value, bits) {
        return Err(CodecError::IntegerOverflow { bits });
    }
    let encoded = encode(value);
    out.put_slice(&encoded);
    Ok(encoded.len())
}

/// 从 `input` 开头解码一个面向 `bits` 位目标的 varint。
///
/// # 调用契约（What）
/// - **返回值**：`(数值, 消费字节数)`；数值保证 `fits(value, bits)`；
/// - **错误**：终止字节出现前输入耗尽返回 [`CodecError::UnexpectedEnd`]；
///   超过 `max_len(bits)` 字节仍未终止，或最后一个允许字节携带超宽位，返回 [`CodecError::IntegerOverflow`]。
///
/// # 注意事项（Gotchas）
/// - 非最短但仍在宽度内的编码（如 `[0x80, 0x00]`）会被接受，编码端永远只产出最短形式。
pub fn decode(input: &[u8], bits: u32) -> Result<(u128, usize), CodecError> {
    let limit = max_len(bits);
    let mut value: u128 = 0;
    for index in 0..limit {
        let Some(&byte) = input.get(index) else {
            return Err(CodecError::unexpected_end(index + 1, input.len()));
        };
        value |= u128::from(byte & PAYLOAD_MASK) << (7 * index);
        if byte & CONTINUATION == 0 {
            if index + 1 == limit && byte > max_last_byte(bits) {
                return Err(CodecError::IntegerOverflow { bits });
            }
            return Ok((value, index + 1));
        }
    }
    Err(CodecError::IntegerOverflow { bits })
}
