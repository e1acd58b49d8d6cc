use std::fmt::Display;
use std::iter::FusedIterator;

use num_integer::Integer;
use num_traits::PrimInt;

use crate::error::{CollatzError, Result};

/// 系列生成に使える整数型（u8〜u128 / 符号付き型）
pub trait CollatzInt: PrimInt + Integer + Display {}

impl<T: PrimInt + Integer + Display> CollatzInt for T {}

/// コラッツ写像の1ステップ。偶数なら n/2、奇数なら 3n+1。
/// 3n+1 が型に収まらなければ None。
#[inline]
pub fn collatz_step<T: CollatzInt>(n: T) -> Option<T> {
    let one = T::one();
    let two = one + one;
    if n.is_even() {
        Some(n / two)
    } else {
        let three = two + one;
        n.checked_mul(&three)?.checked_add(&one)
    }
}

/// `child` から1ステップで `parent` に進むか（逆コラッツ1ステップの検査）。
///
/// - `child == 2 * parent`
/// - `parent > 1`, `parent ≡ 1 (mod 3)`, `child == (parent - 1) / 3`, かつ `child` が奇数
///
/// 割り切れない除算はすべて不正な辺として扱う。
pub fn is_valid_edge<T: CollatzInt>(parent: T, child: T) -> bool {
    let one = T::one();
    let two = one + one;
    let three = two + one;

    if parent.checked_mul(&two) == Some(child) {
        return true;
    }
    if parent <= one || child.is_even() {
        return false;
    }
    let (q, r) = (parent - one).div_rem(&three);
    r.is_zero() && q == child
}

/// n から 1 に到達するまでのステップ数（各 ÷2 を1ステップとする標準カウント）
pub fn stopping_time<T: CollatzInt>(n: T) -> Result<u64> {
    let mut seq = SequenceGenerator::new(n)?;
    let emitted = seq.by_ref().count() as u64;
    if let Some(err) = seq.overflow_error() {
        return Err(err);
    }
    Ok(emitted.saturating_sub(1))
}

/// 開始値 n のコラッツ系列を遅延生成するイテレータ。
///
/// 現在値を返してから次の値へ進む。1 を返した次の呼び出しで終了する。
/// 使い切ったインスタンスは再利用できない。
#[derive(Debug, Clone)]
pub struct SequenceGenerator<T = u64> {
    start: T,
    /// 次に返す値。None なら終了済み
    current: Option<T>,
    /// これまでに返した値
    history: Vec<T>,
    overflowed: bool,
}

impl<T: CollatzInt> SequenceGenerator<T> {
    pub fn new(n: T) -> Result<Self> {
        if n < T::one() {
            return Err(CollatzError::InvalidArgument(n.to_string()));
        }
        Ok(SequenceGenerator {
            start: n,
            current: Some(n),
            history: Vec::new(),
            overflowed: false,
        })
    }

    pub fn start(&self) -> T {
        self.start
    }

    /// これまでに返した値（返した順）
    pub fn history(&self) -> &[T] {
        &self.history
    }

    pub fn is_exhausted(&self) -> bool {
        self.current.is_none()
    }

    /// 次の値が型に収まらず、1 に到達する前に打ち切られたか
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// 打ち切られていれば対応するエラーを返す
    pub fn overflow_error(&self) -> Option<CollatzError> {
        if !self.overflowed {
            return None;
        }
        let last = self.history.last().copied().unwrap_or(self.start);
        Some(CollatzError::Overflow {
            start: self.start.to_string(),
            last: last.to_string(),
        })
    }
}

impl<T: CollatzInt> Iterator for SequenceGenerator<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let current = self.current?;
        self.history.push(current);
        self.current = if current == T::one() {
            None
        } else {
            let next = collatz_step(current);
            if next.is_none() {
                self.overflowed = true;
            }
            next
        };
        Some(current)
    }
}

impl<T: CollatzInt> FusedIterator for SequenceGenerator<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_small() {
        assert_eq!(collatz_step(1u64), Some(4));
        assert_eq!(collatz_step(2u64), Some(1));
        assert_eq!(collatz_step(3u64), Some(10));
        assert_eq!(collatz_step(27u64), Some(82));
    }

    #[test]
    fn test_step_overflow() {
        assert_eq!(collatz_step(u64::MAX), None);
        assert_eq!(collatz_step(u64::MAX - 1), Some(u64::MAX / 2));
        assert_eq!(collatz_step(101u8), None);
    }

    #[test]
    fn test_valid_edges() {
        assert!(is_valid_edge(1u64, 2));
        assert!(is_valid_edge(16u64, 5));
        assert!(is_valid_edge(10u64, 3));
        assert!(is_valid_edge(5u64, 10));
        // 1 → 4 の逆向き。系列は 1 で止まるのでマージには現れない
        assert!(is_valid_edge(4u64, 1));
    }

    #[test]
    fn test_invalid_edges() {
        // (1-1)/3 = 0
        assert!(!is_valid_edge(1u64, 0));
        // (13-1)/3 = 4 は偶数なので 13 には進まない
        assert!(!is_valid_edge(13u64, 4));
        // 割り切れない
        assert!(!is_valid_edge(11u64, 3));
        assert!(!is_valid_edge(8u64, 3));
        assert!(!is_valid_edge(8u64, 15));
    }

    #[test]
    fn test_generator_rejects_zero() {
        assert_eq!(
            SequenceGenerator::new(0u64).unwrap_err(),
            CollatzError::InvalidArgument("0".to_string())
        );
        assert!(SequenceGenerator::new(-3i32).is_err());
    }

    #[test]
    fn test_generator_one() {
        let mut seq = SequenceGenerator::new(1u64).unwrap();
        assert_eq!(seq.next(), Some(1));
        assert!(seq.is_exhausted());
        assert_eq!(seq.next(), None);
        assert_eq!(seq.next(), None);
        assert_eq!(seq.history(), &[1]);
    }

    #[test]
    fn test_generator_six() {
        let values: Vec<u64> = SequenceGenerator::new(6u64).unwrap().collect();
        assert_eq!(values, vec![6, 3, 10, 5, 16, 8, 4, 2, 1]);
    }

    #[test]
    fn test_history_tracks_emitted() {
        let mut seq = SequenceGenerator::new(3u64).unwrap();
        seq.next();
        seq.next();
        assert_eq!(seq.history(), &[3, 10]);
        assert!(!seq.is_exhausted());
    }

    #[test]
    fn test_generator_overflow_u8() {
        let mut seq = SequenceGenerator::new(27u8).unwrap();
        let values: Vec<u8> = seq.by_ref().collect();
        assert_eq!(values, vec![27, 82, 41, 124, 62, 31, 94, 47, 142, 71, 214, 107]);
        assert!(seq.overflowed());
        assert!(seq.is_exhausted());
        assert_eq!(
            seq.overflow_error(),
            Some(CollatzError::Overflow { start: "27".to_string(), last: "107".to_string() })
        );
    }

    #[test]
    fn test_stopping_time() {
        assert_eq!(stopping_time(1u64).unwrap(), 0);
        assert_eq!(stopping_time(2u64).unwrap(), 1);
        assert_eq!(stopping_time(6u64).unwrap(), 8);
        assert_eq!(stopping_time(27u64).unwrap(), 111);
        assert!(stopping_time(27u8).is_err());
    }
}
