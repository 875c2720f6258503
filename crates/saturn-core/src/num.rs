// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Costs and the Infinite Sentinel
//!
//! Operator costs, goal distances, and heuristic values are all `Cost`
//! (`i32`). Unreachable goals are represented by the sentinel `INF`, the
//! largest representable value. Arithmetic on heuristic values must treat
//! `INF` as absorbing: a sum containing an infinite term is infinite, and an
//! infinite budget stays infinite when something is subtracted from it.
//!
//! `InfinityArithmetic` provides these semantics for every primitive integer
//! type, with the type's maximum value acting as infinity. Finite sums that
//! would overflow saturate to the maximum, i.e. they also become infinite,
//! which keeps heuristic estimates admissible.

use num_traits::PrimInt;

/// The integer type used for operator costs and heuristic values.
pub type Cost = i32;

/// The infinite cost sentinel: no goal is reachable.
pub const INF: Cost = Cost::MAX;

/// Infinity-absorbing arithmetic where `max_value()` stands for infinity.
pub trait InfinityArithmetic: PrimInt {
    /// The infinite value of this type.
    #[inline(always)]
    fn infinity() -> Self {
        Self::max_value()
    }

    /// Returns `true` if `self` is the infinite value.
    #[inline(always)]
    fn is_infinite(self) -> bool {
        self == Self::max_value()
    }

    /// Adds `rhs`, returning infinity if either operand is infinite.
    ///
    /// The result saturates at infinity when a finite sum overflows.
    #[inline(always)]
    fn left_add(self, rhs: Self) -> Self {
        if self.is_infinite() || rhs.is_infinite() {
            Self::infinity()
        } else {
            self.saturating_add(rhs)
        }
    }

    /// Subtracts a finite `rhs` from a budget; an infinite budget stays
    /// infinite.
    #[inline(always)]
    fn left_sub(self, rhs: Self) -> Self {
        if self.is_infinite() {
            Self::infinity()
        } else {
            debug_assert!(
                !rhs.is_infinite(),
                "called `InfinityArithmetic::left_sub` with an infinite subtrahend on a finite budget"
            );
            self - rhs
        }
    }
}

impl<T: PrimInt> InfinityArithmetic for T {}

/// Sums heuristic values, short-circuiting to infinity on the first
/// infinite term.
#[inline]
pub fn sum_or_infinite<T, I>(values: I) -> T
where
    T: InfinityArithmetic,
    I: IntoIterator<Item = T>,
{
    let mut sum = T::zero();
    for value in values {
        if value.is_infinite() {
            return T::infinity();
        }
        sum = sum.left_add(value);
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inf_is_max() {
        assert_eq!(INF, i32::MAX);
        assert!(INF.is_infinite());
        assert!(!0i32.is_infinite());
        assert_eq!(<Cost as InfinityArithmetic>::infinity(), INF);
    }

    #[test]
    fn test_left_add_is_absorbing() {
        assert_eq!(3i32.left_add(4), 7);
        assert_eq!(INF.left_add(4), INF);
        assert_eq!(4i32.left_add(INF), INF);
        assert_eq!(INF.left_add(INF), INF);
    }

    #[test]
    fn test_left_add_saturates_on_overflow() {
        assert_eq!((INF - 1).left_add(5), INF);
        assert_eq!(200u8.left_add(100), u8::MAX);
    }

    #[test]
    fn test_left_sub_keeps_infinite_budget() {
        assert_eq!(10i32.left_sub(3), 7);
        assert_eq!(INF.left_sub(3), INF);
    }

    #[test]
    fn test_sum_or_infinite() {
        assert_eq!(sum_or_infinite::<Cost, _>([]), 0);
        assert_eq!(sum_or_infinite::<Cost, _>([1, 2, 3]), 6);
        assert_eq!(sum_or_infinite::<Cost, _>([1, INF, 3]), INF);
        assert_eq!(sum_or_infinite([5u64, u64::MAX]), u64::MAX);
    }
}
