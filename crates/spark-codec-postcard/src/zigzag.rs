//! ZigZag 有符号映射。
//!
//! 将有符号整数映射为无符号整数，使绝对值小的正负数都落在小的无符号区间，
//! 再交给 [`varint`](crate::varint) 紧凑编码：`0 → 0`、`-1 → 1`、`1 → 2`、`-2 → 3` ……
//!
//! 映射在每个宽度上都是双射，包括各宽度的最小值（如 `i8::MIN → 255`）。
//! 宽度无关的入口 [`encode`]/[`decode`] 在符号扩展后的 `i128` 上运算，
//! 按宽度的入口由 [`ZigZag`] trait 提供。

/// 宽度无关的正向映射：`(v << 1) ^ (v >> 127)`。
///
/// 对更窄的类型，先符号扩展到 `i128` 再调用，结果与在原宽度上运算一致。
#[must_use]
pub const fn encode(value: i128) -> u128 {
    (value.wrapping_shl(1) ^ (value >> 127)) as u128
}

/// 宽度无关的逆映射：偶数 `u / 2`，奇数 `-((u + 1) / 2)`。
#[must_use]
pub const fn decode(value: u128) -> i128 {
    ((value >> 1) as i128) ^ -((value & 1) as i128)
}

/// 按声明宽度执行 ZigZag 映射。
pub trait ZigZag: Sized {
    /// 同宽度的无符号类型。
    type Unsigned;

    /// 正向映射。
    fn zigzag(self) -> Self::Unsigned;

    /// 逆映射，对每个无符号输入都有唯一结果。
    fn unzigzag(value: Self::Unsigned) -> Self;
}

macro_rules! impl_zigzag {
    ($($signed:ty => $unsigned:ty),* $(,)?) => {
        $(
            impl ZigZag for $signed {
                type Unsigned = $unsigned;

                #[inline]
                fn zigzag(self) -> $unsigned {
                    ((self << 1) ^ (self >> (<$signed>::BITS - 1))) as $unsigned
                }

                #[inline]
                fn unzigzag(value: $unsigned) -> $signed {
                    ((value >> 1) as $signed) ^ -((value & 1) as $signed)
                }
            }
        )*
    };
}

impl_zigzag!(
    i8 => u8,
    i16 => u16,
    i32 => u32,
    i64 => u64,
    i128 => u128,
    isize => usize,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_magnitudes_interleave() {
        let expected: [(i128, u128); 6] = [(0, 0), (-1, 1), (1, 2), (-2, 3), (2, 4), (-64, 127)];
        for (signed, unsigned) in expected {
            assert_eq!(encode(signed), unsigned);
            assert_eq!(decode(unsigned), signed);
        }
    }

    #[test]
    fn width_minimums_are_exact() {
        assert_eq!(i8::MIN.zigzag(), u8::MAX);
        assert_eq!(i8::MAX.zigzag(), u8::MAX - 1);
        assert_eq!(i8::unzigzag(u8::MAX), i8::MIN);
        assert_eq!(i16::unzigzag(i16::MIN.zigzag()), i16::MIN);
        assert_eq!(i32::unzigzag(i32::MIN.zigzag()), i32::MIN);
        assert_eq!(i64::unzigzag(i64::MIN.zigzag()), i64::MIN);
        assert_eq!(i128::MIN.zigzag(), u128::MAX);
        assert_eq!(i128::unzigzag(u128::MAX), i128::MIN);
        assert_eq!(isize::unzigzag(isize::MIN.zigzag()), isize::MIN);
    }

    #[test]
    fn wide_entry_matches_per_width() {
        for v in [i8::MIN, -1, 0, 1, i8::MAX] {
            assert_eq!(encode(i128::from(v)), u128::from(v.zigzag()));
        }
        for v in [i64::MIN, -300, 300, i64::MAX] {
            assert_eq!(encode(i128::from(v)), u128::from(v.zigzag()));
            assert_eq!(decode(u128::from(v.zigzag())), i128::from(v));
        }
        assert_eq!(encode(i128::MIN), u128::MAX);
        assert_eq!(decode(u128::MAX), i128::MIN);
    }
}
