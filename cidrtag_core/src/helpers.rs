//! Bit helpers for fixed-width prefix keys
//!
//! Keys are left-aligned: bit 0 is the most significant bit of the word, so a
//! prefix of length `n` occupies the top `n` bits.

use std::fmt::{Debug, LowerHex};
use std::hash::Hash;

/// Fixed-width unsigned word used as the storage for a prefix.
pub trait KeyBits: Copy + Eq + Hash + Default + Debug + LowerHex + Send + Sync + 'static {
    /// Number of bits in the word.
    const WIDTH: u8;

    /// Mask keeping the top `prefix_len` bits.
    fn mask(prefix_len: u8) -> Self;

    /// Zero every bit past `prefix_len`.
    fn canonical(self, prefix_len: u8) -> Self;

    /// Bit at `index` counted from the most significant end (0 or 1).
    fn get_bit(self, index: u8) -> u8;

    /// Length of the shared leading run of `self` and `other`, capped at `max_len`.
    fn common_prefix_len(self, other: Self, max_len: u8) -> u8;
}

macro_rules! impl_key_bits {
    ($ty:ty, $width:expr) => {
        impl KeyBits for $ty {
            const WIDTH: u8 = $width;

            #[inline]
            fn mask(prefix_len: u8) -> Self {
                if prefix_len == 0 {
                    0
                } else if prefix_len >= $width {
                    !0
                } else {
                    !(!0 >> prefix_len)
                }
            }

            #[inline(always)]
            fn canonical(self, prefix_len: u8) -> Self {
                self & Self::mask(prefix_len)
            }

            #[inline]
            fn get_bit(self, index: u8) -> u8 {
                debug_assert!(index < $width);
                ((self >> ($width - 1 - index)) & 1) as u8
            }

            fn common_prefix_len(self, other: Self, max_len: u8) -> u8 {
                if max_len == 0 {
                    return 0;
                }
                let mask = Self::mask(max_len);
                let diff = (self & mask) ^ (other & mask);
                if diff == 0 {
                    return max_len.min($width);
                }
                (diff.leading_zeros() as u8).min(max_len)
            }
        }
    };
}

impl_key_bits!(u32, 32);
impl_key_bits!(u128, 128);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_edges() {
        assert_eq!(<u32 as KeyBits>::mask(0), 0);
        assert_eq!(<u32 as KeyBits>::mask(1), 0x8000_0000);
        assert_eq!(<u32 as KeyBits>::mask(24), 0xFFFF_FF00);
        assert_eq!(<u32 as KeyBits>::mask(32), u32::MAX);
        assert_eq!(<u128 as KeyBits>::mask(128), u128::MAX);
        assert_eq!(<u128 as KeyBits>::mask(64), (u64::MAX as u128) << 64);
    }

    #[test]
    fn bits_are_counted_from_the_top() {
        let v: u32 = 0b1010_0000 << 24;
        assert_eq!(v.get_bit(0), 1);
        assert_eq!(v.get_bit(1), 0);
        assert_eq!(v.get_bit(2), 1);
        assert_eq!(v.get_bit(31), 0);
        assert_eq!(1u128.get_bit(127), 1);
    }

    #[test]
    fn common_prefix_is_capped() {
        let a: u32 = 0x8000_0000;
        let b: u32 = 0x8100_0000;
        assert_eq!(a.common_prefix_len(b, 32), 7);
        assert_eq!(a.common_prefix_len(b, 4), 4);
        assert_eq!(a.common_prefix_len(a, 32), 32);
        assert_eq!(a.common_prefix_len(0, 0), 0);
        assert_eq!(a.common_prefix_len(0, 32), 0);
    }

    #[test]
    fn canonical_drops_host_bits() {
        assert_eq!(0xC0A8_0101u32.canonical(24), 0xC0A8_0100);
        assert_eq!(0xC0A8_0101u32.canonical(0), 0);
    }
}
