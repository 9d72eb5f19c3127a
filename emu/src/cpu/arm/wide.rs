//! 64-bit arithmetic out of 32-bit halves, used by the long multiplies.
//!
//! Values travel as `(hi, lo)` pairs. Products are assembled from four
//! 16x16 partial products with explicit carry propagation between the
//! words.

/// `(hi, lo)` sum of two 64-bit values, wrapping.
#[must_use]
pub fn add_u64(a: (u32, u32), b: (u32, u32)) -> (u32, u32) {
    let (lo, carry) = a.1.overflowing_add(b.1);
    let hi = a.0.wrapping_add(b.0).wrapping_add(u32::from(carry));
    (hi, lo)
}

/// Two's complement addition is the same bit operation as the unsigned one.
#[must_use]
pub fn add_s64(a: (u32, u32), b: (u32, u32)) -> (u32, u32) {
    add_u64(a, b)
}

/// Full 32x32 -> 64 unsigned product.
#[must_use]
pub fn mul_u64(a: u32, b: u32) -> (u32, u32) {
    let (a_hi, a_lo) = (a >> 16, a & 0xFFFF);
    let (b_hi, b_lo) = (b >> 16, b & 0xFFFF);

    // Each partial product fits in 32 bits.
    let lo_lo = a_lo * b_lo;
    let lo_hi = a_lo * b_hi;
    let hi_lo = a_hi * b_lo;
    let hi_hi = a_hi * b_hi;

    let mut result = (hi_hi, lo_lo);
    result = add_u64(result, (lo_hi >> 16, lo_hi << 16));
    result = add_u64(result, (hi_lo >> 16, hi_lo << 16));
    result
}

fn negate(value: (u32, u32)) -> (u32, u32) {
    add_u64((!value.0, !value.1), (0, 1))
}

/// Full 32x32 -> 64 signed product.
#[must_use]
pub fn mul_s64(a: u32, b: u32) -> (u32, u32) {
    let negative = ((a ^ b) >> 31) == 1;
    let magnitude = mul_u64((a as i32).unsigned_abs(), (b as i32).unsigned_abs());
    if negative { negate(magnitude) } else { magnitude }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BOUNDARIES: [u32; 7] = [
        0,
        1,
        0xFFFF,
        0x1_0000,
        0x7FFF_FFFF,
        0x8000_0000,
        0xFFFF_FFFF,
    ];

    fn join(pair: (u32, u32)) -> u64 {
        (u64::from(pair.0) << 32) | u64::from(pair.1)
    }

    fn split(value: u64) -> (u32, u32) {
        ((value >> 32) as u32, value as u32)
    }

    #[test]
    fn unsigned_product_matches_native() {
        let mut values = BOUNDARIES.to_vec();
        values.extend((0..64).map(|_| rand::random::<u32>()));

        for &a in &values {
            for &b in &values {
                assert_eq!(
                    join(mul_u64(a, b)),
                    u64::from(a) * u64::from(b),
                    "{a:#x} * {b:#x}"
                );
            }
        }
    }

    #[test]
    fn signed_product_matches_native() {
        let mut values = BOUNDARIES.to_vec();
        values.extend((0..64).map(|_| rand::random::<u32>()));

        for &a in &values {
            for &b in &values {
                let expected = i64::from(a as i32) * i64::from(b as i32);
                assert_eq!(
                    join(mul_s64(a, b)) as i64,
                    expected,
                    "{a:#x} * {b:#x}"
                );
            }
        }
    }

    #[test]
    fn addition_carries_into_high_word() {
        assert_eq!(add_u64((0, 0xFFFF_FFFF), (0, 1)), (1, 0));
        assert_eq!(add_u64((0xFFFF_FFFF, 0xFFFF_FFFF), (0, 1)), (0, 0));

        for _ in 0..1_000 {
            let a = (u64::from(rand::random::<u32>()) << 32) | u64::from(rand::random::<u32>());
            let b = (u64::from(rand::random::<u32>()) << 32) | u64::from(rand::random::<u32>());
            assert_eq!(join(add_u64(split(a), split(b))), a.wrapping_add(b));
            assert_eq!(
                join(add_s64(split(a), split(b))) as i64,
                (a as i64).wrapping_add(b as i64)
            );
        }
    }
}
