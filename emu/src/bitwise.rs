use std::mem::size_of;
use std::ops::RangeInclusive;

/// Contains some helper methods to manipulate bits,
/// the index (`bit_idx`) is supposed to be from lsb to msb (right to left).
pub trait Bits: Copy {
    /// Zero-extends the value to `u128`.
    fn widen(self) -> u128;

    /// Keeps only the low `size_of::<Self>()` bytes of `value`.
    fn narrow(value: u128) -> Self;

    fn width() -> u8 {
        (size_of::<Self>() * 8) as u8
    }

    fn is_bit_on(self, bit_idx: u8) -> bool {
        debug_assert!(bit_idx < Self::width());
        (self.widen() >> bit_idx) & 1 == 1
    }

    fn get_bit(self, bit_idx: u8) -> bool {
        self.is_bit_on(bit_idx)
    }

    fn set_bit(&mut self, bit_idx: u8, value: bool) {
        debug_assert!(bit_idx < Self::width());
        let mask = 1_u128 << bit_idx;
        let bits = self.widen();
        *self = Self::narrow(if value { bits | mask } else { bits & !mask });
    }

    /// Extracts `bits_range` and moves it down to bit 0.
    fn get_bits(self, bits_range: RangeInclusive<u8>) -> Self {
        let start = *bits_range.start();
        let length = bits_range.len() as u32;
        debug_assert!(start as u32 + length <= u32::from(Self::width()));

        let mask = (1_u128 << length) - 1;
        Self::narrow((self.widen() >> start) & mask)
    }

    /// True when every bit in `bits_range` is set.
    fn are_bits_on(self, bits_range: RangeInclusive<u8>) -> bool {
        bits_range.into_iter().all(|bit_idx| self.is_bit_on(bit_idx))
    }

    /// Returns a sign-extended copy of the value.
    /// `number_of_bits` is how many low bits hold the two's complement value.
    fn sign_extended(self, number_of_bits: u8) -> Self {
        debug_assert!(number_of_bits > 0 && number_of_bits <= Self::width());
        // Move the sign bit up to bit 127 and let the arithmetic shift
        // drag it back down across the upper bits.
        let unused = 128 - u32::from(number_of_bits);
        let value = ((self.widen() << unused) as i128) >> unused;
        Self::narrow(value as u128)
    }
}

macro_rules! impl_bits {
    ($($t:ty),*) => {
        $(
            impl Bits for $t {
                fn widen(self) -> u128 {
                    u128::from(self)
                }

                fn narrow(value: u128) -> Self {
                    value as Self
                }
            }
        )*
    };
}

impl_bits!(u8, u16, u32, u64);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_is_on() {
        let b = 0b1_1001_1101_u32;
        assert!(b.is_bit_on(0));
        assert!(!b.is_bit_on(1));
        assert!(b.is_bit_on(2));
        assert!(b.is_bit_on(3));
        assert!(b.is_bit_on(8));
        assert!(!b.is_bit_on(31));
    }

    #[test]
    fn set_bit() {
        let mut b = 0b110_0110_u32;
        b.set_bit(0, true);
        b.set_bit(1, true);
        b.set_bit(2, false);
        b.set_bit(3, false);
        assert_eq!(b, 0b110_0011);

        b.set_bit(31, true);
        assert_eq!(b, 0x8000_0063);
    }

    #[test]
    fn set_bit_random() {
        let original = rand::random::<u32>();
        let mut copy = 0_u32;
        for i in 0..32 {
            copy.set_bit(i, original.get_bit(i));
        }

        assert_eq!(copy, original);
    }

    #[test]
    #[should_panic]
    fn invalid_index() {
        let b = 0u32;
        b.is_bit_on(32);
    }

    #[test]
    fn get_bits() {
        let b = 0b10_1100_1110_u32;
        assert_eq!(b.get_bits(0..=3), 0b1110);
        assert_eq!(b.get_bits(1..=1), 0b1);
        assert_eq!(b.get_bits(4..=7), 0b1100);
        assert_eq!(b.get_bits(8..=9), 0b10);
        assert_eq!(b.get_bits(0..=31), b);
        assert_eq!(b.get_bits(28..=31), 0b0);
        assert_eq!(0xE283_1001_u32.get_bits(28..=31), 0xE);
    }

    #[test]
    fn are_bits_on() {
        let b = 0b10_1100_1110_u32;
        assert!(!b.are_bits_on(0..=3));
        assert!(b.are_bits_on(1..=3));
    }

    #[test]
    fn check_sign_extended() {
        let a: u32 = 0b1001; // -7 in i4
        assert_eq!(a.sign_extended(4) as i32, -7);

        let positive: u32 = 0b0111;
        assert_eq!(positive.sign_extended(4), 7);

        let branch_offset = 0x00FF_FFFE_u32 << 2;
        assert_eq!(branch_offset.sign_extended(26) as i32, -8);

        assert_eq!(0x80_u8.sign_extended(8), 0x80);
        assert_eq!(u32::from(0x80_u8).sign_extended(8), 0xFFFF_FF80);
    }
}
