use core::fmt::{Debug, Display, LowerHex};
use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not, Shl, Shr};

/// Output word of a GF(2)-linear generator.
///
/// Bit positions used by the reduction engines count from the most
/// significant bit: position 0 is the MSB.
pub trait Word:
    Copy
    + Eq
    + Debug
    + Display
    + LowerHex
    + BitAnd<Output = Self>
    + BitAndAssign
    + BitOr<Output = Self>
    + BitOrAssign
    + BitXor<Output = Self>
    + BitXorAssign
    + Not<Output = Self>
    + Shl<u32, Output = Self>
    + Shr<u32, Output = Self>
{
    const BITS: u32;
    const ZERO: Self;
    const ONE: Self;

    fn count_ones(self) -> u32;
    fn leading_zeros(self) -> u32;
    fn trailing_zeros(self) -> u32;
    fn reverse_bits(self) -> Self;
    fn to_u64(self) -> u64;
    fn from_u64(x: u64) -> Self;

    /// Position of the lowest set bit, counted from the MSB.
    /// `None` for zero.
    #[inline]
    fn pivot_pos(self) -> Option<u32> {
        if self == Self::ZERO {
            None
        } else {
            Some(Self::BITS - 1 - self.trailing_zeros())
        }
    }

    /// A single set bit at position `pos` counted from the MSB.
    #[inline]
    fn bit_from_msb(pos: u32) -> Self {
        debug_assert!(pos < Self::BITS);
        Self::ONE << (Self::BITS - 1 - pos)
    }

    /// Mask covering the `len` most significant bits.
    #[inline]
    fn mask_high(len: u32) -> Self {
        if len == 0 {
            Self::ZERO
        } else if len >= Self::BITS {
            !Self::ZERO
        } else {
            !Self::ZERO << (Self::BITS - len)
        }
    }

    /// Mask covering the `len` least significant bits.
    #[inline]
    fn mask_low(len: u32) -> Self {
        if len == 0 {
            Self::ZERO
        } else if len >= Self::BITS {
            !Self::ZERO
        } else {
            !Self::ZERO >> (Self::BITS - len)
        }
    }
}

macro_rules! impl_word {
    ($t:ty) => {
        impl Word for $t {
            const BITS: u32 = <$t>::BITS;
            const ZERO: Self = 0;
            const ONE: Self = 1;

            #[inline]
            fn count_ones(self) -> u32 {
                <$t>::count_ones(self)
            }
            #[inline]
            fn leading_zeros(self) -> u32 {
                <$t>::leading_zeros(self)
            }
            #[inline]
            fn trailing_zeros(self) -> u32 {
                <$t>::trailing_zeros(self)
            }
            #[inline]
            fn reverse_bits(self) -> Self {
                <$t>::reverse_bits(self)
            }
            #[inline]
            fn to_u64(self) -> u64 {
                self as u64
            }
            #[inline]
            fn from_u64(x: u64) -> Self {
                x as $t
            }
        }
    };
}

impl_word!(u16);
impl_word!(u32);
impl_word!(u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn run_tests() {
        assert_eq!(0x80000002u32.pivot_pos(), Some(30));
        assert_eq!(0x80000000u32.pivot_pos(), Some(0));
        assert_eq!(1u32.pivot_pos(), Some(31));
        assert_eq!(0u32.pivot_pos(), None);
        assert_eq!(u32::bit_from_msb(0), 0x80000000);
        assert_eq!(u32::bit_from_msb(31), 1);
        assert_eq!(u32::mask_high(0), 0);
        assert_eq!(u32::mask_high(1), 0x80000000);
        assert_eq!(u32::mask_high(32), 0xffffffff);
        assert_eq!(u32::mask_low(4), 0xf);
        assert_eq!(u16::mask_high(3), 0xe000);
        assert_eq!(u64::mask_high(64), u64::MAX);
    }
}
