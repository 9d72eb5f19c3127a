//! # ALU and Barrel Shifter
//!
//! Operand2 of a data processing instruction goes through the barrel
//! shifter before reaching the ALU:
//!
//! ```text
//!  I=1:  11-8 rotate │ 7-0 imm8           →  imm8 ROR (2 × rotate)
//!  I=0:  11-7 amount │ 6-5 type │ 0 │ Rm  →  Rm <type> #amount
//!        11-8 Rs     │ 7 (0) │ 6-5 type │ 1 │ Rm  →  Rm <type> Rs[7:0]
//! ```
//!
//! Immediate amounts of zero are special encodings (LSR #32, ASR #32, RRX);
//! register amounts of zero leave both operand and carry untouched.
//!
//! The adder computes carry and overflow the way the ARM datapath does:
//! subtraction is `a + !b + 1`, so the carry flag is the inverted borrow.

use crate::bitwise::Bits;
use crate::cpu::flags::ShiftKind;

#[derive(Debug, Clone, Copy, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ArmModeAluInstruction {
    And = 0x0,
    Eor = 0x1,
    Sub = 0x2,
    Rsb = 0x3,
    Add = 0x4,
    Adc = 0x5,
    Sbc = 0x6,
    Rsc = 0x7,
    Tst = 0x8,
    Teq = 0x9,
    Cmp = 0xA,
    Cmn = 0xB,
    Orr = 0xC,
    Mov = 0xD,
    Bic = 0xE,
    Mvn = 0xF,
}

impl std::fmt::Display for ArmModeAluInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => f.write_str("and"),
            Self::Eor => f.write_str("eor"),
            Self::Sub => f.write_str("sub"),
            Self::Rsb => f.write_str("rsb"),
            Self::Add => f.write_str("add"),
            Self::Adc => f.write_str("adc"),
            Self::Sbc => f.write_str("sbc"),
            Self::Rsc => f.write_str("rsc"),
            Self::Tst => f.write_str("tst"),
            Self::Teq => f.write_str("teq"),
            Self::Cmp => f.write_str("cmp"),
            Self::Cmn => f.write_str("cmn"),
            Self::Orr => f.write_str("orr"),
            Self::Mov => f.write_str("mov"),
            Self::Bic => f.write_str("bic"),
            Self::Mvn => f.write_str("mvn"),
        }
    }
}

impl From<u32> for ArmModeAluInstruction {
    fn from(alu_op_code: u32) -> Self {
        use ArmModeAluInstruction::{
            Adc, Add, And, Bic, Cmn, Cmp, Eor, Mov, Mvn, Orr, Rsb, Rsc, Sbc, Sub, Teq, Tst,
        };
        match alu_op_code & 0xF {
            0x0 => And,
            0x1 => Eor,
            0x2 => Sub,
            0x3 => Rsb,
            0x4 => Add,
            0x5 => Adc,
            0x6 => Sbc,
            0x7 => Rsc,
            0x8 => Tst,
            0x9 => Teq,
            0xA => Cmp,
            0xB => Cmn,
            0xC => Orr,
            0xD => Mov,
            0xE => Bic,
            _ => Mvn,
        }
    }
}

impl ArmModeAluInstruction {
    /// TST, TEQ, CMP and CMN only set flags, they never write Rd.
    #[must_use]
    pub const fn is_test(self) -> bool {
        matches!(self, Self::Tst | Self::Teq | Self::Cmp | Self::Cmn)
    }

    /// MOV and MVN take no first operand.
    #[must_use]
    pub const fn is_move(self) -> bool {
        matches!(self, Self::Mov | Self::Mvn)
    }
}

/// Output of the adder.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArithmeticOpResult {
    pub result: u32,
    pub carry: bool,
    pub overflow: bool,
    pub sign: bool,
    pub zero: bool,
}

impl ArithmeticOpResult {
    fn with_result_flags(mut self) -> Self {
        self.sign = self.result.get_bit(31);
        self.zero = self.result == 0;
        self
    }
}

/// Output of the barrel shifter: the shifted operand and the carry out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ShiftOpResult {
    pub result: u32,
    pub carry: bool,
}

fn add(first_op: u32, second_op: u32) -> ArithmeticOpResult {
    let result = first_op.wrapping_add(second_op);

    let (a, b, r) = (first_op.get_bit(31), second_op.get_bit(31), result.get_bit(31));
    let overflow = (!a && !b && r) || (a && b && !r);

    // Adding the top 31 bits of both operands plus the carry out of bit 0
    // leaves the carry out of bit 31 in bit 31.
    let carry = ((first_op >> 1) + (second_op >> 1) + (first_op & second_op & 1)).get_bit(31);

    ArithmeticOpResult {
        result,
        carry,
        overflow,
        ..Default::default()
    }
}

/// `first_op + second_op + carry_in` with ARM carry and overflow.
///
/// SUB is `adder(a, !b, true)`, RSB is `adder(b, !a, true)`, SBC and RSC
/// pass the C flag as `carry_in`.
#[must_use]
pub fn adder(first_op: u32, second_op: u32, carry_in: bool) -> ArithmeticOpResult {
    let mut op_result = add(first_op, second_op);

    if carry_in {
        let unit = add(op_result.result, 1);
        op_result.result = unit.result;
        op_result.carry ^= unit.carry;
        op_result.overflow ^= unit.overflow;
    }

    op_result.with_result_flags()
}

/// Bit-serial ripple carry adder, slow but obviously correct.
///
/// Overflow is the carry into bit 31 differing from the carry out of it.
#[must_use]
pub fn reference_adder(first_op: u32, second_op: u32, carry_in: bool) -> ArithmeticOpResult {
    let mut result = 0_u32;
    let mut carry = carry_in;
    let mut carry_into_msb = false;

    for bit in 0..32 {
        let a = first_op.get_bit(bit);
        let b = second_op.get_bit(bit);
        if bit == 31 {
            carry_into_msb = carry;
        }
        result.set_bit(bit, a ^ b ^ carry);
        carry = (a && b) || (a && carry) || (b && carry);
    }

    ArithmeticOpResult {
        result,
        carry,
        overflow: carry_into_msb != carry,
        ..Default::default()
    }
    .with_result_flags()
}

/// Immediate operand2: `imm8` rotated right by twice the 4-bit field.
#[must_use]
pub fn immediate_operand(op2: u32) -> u32 {
    let imm = op2.get_bits(0..=7);
    let rotate_amount = op2.get_bits(8..=11);
    imm.rotate_right(rotate_amount * 2)
}

/// Shift with the amount encoded in the instruction (0..=31).
#[must_use]
pub fn shift_by_immediate(kind: ShiftKind, amount: u32, rm: u32, carry: bool) -> ShiftOpResult {
    debug_assert!(amount < 32);
    match (kind, amount) {
        // LSL #0: operand passes through, carry is not affected.
        (ShiftKind::Lsl, 0) => ShiftOpResult { result: rm, carry },
        (ShiftKind::Lsl, _) => ShiftOpResult {
            result: rm << amount,
            carry: rm.get_bit((32 - amount) as u8),
        },
        // LSR #0 encodes LSR #32.
        (ShiftKind::Lsr, 0) => ShiftOpResult {
            result: 0,
            carry: rm.get_bit(31),
        },
        (ShiftKind::Lsr, _) => ShiftOpResult {
            result: rm >> amount,
            carry: rm.get_bit((amount - 1) as u8),
        },
        // ASR #0 encodes ASR #32, which fills with the sign.
        (ShiftKind::Asr, 0) => ShiftOpResult {
            result: ((rm as i32) >> 31) as u32,
            carry: rm.get_bit(31),
        },
        (ShiftKind::Asr, _) => ShiftOpResult {
            result: ((rm as i32) >> amount) as u32,
            carry: rm.get_bit((amount - 1) as u8),
        },
        // ROR #0 encodes RRX.
        (ShiftKind::Ror, 0) => ShiftOpResult {
            result: (rm >> 1) | (u32::from(carry) << 31),
            carry: rm.get_bit(0),
        },
        (ShiftKind::Ror, _) => ShiftOpResult {
            result: rm.rotate_right(amount),
            carry: rm.get_bit((amount - 1) as u8),
        },
    }
}

/// Shift with the amount taken from the bottom byte of Rs.
#[must_use]
pub fn shift_by_register(kind: ShiftKind, amount: u32, rm: u32, carry: bool) -> ShiftOpResult {
    let amount = amount & 0xFF;
    if amount == 0 {
        return ShiftOpResult { result: rm, carry };
    }

    match kind {
        ShiftKind::Lsl => match amount {
            1..=31 => ShiftOpResult {
                result: rm << amount,
                carry: rm.get_bit((32 - amount) as u8),
            },
            32 => ShiftOpResult {
                result: 0,
                carry: rm.get_bit(0),
            },
            _ => ShiftOpResult::default(),
        },
        ShiftKind::Lsr => match amount {
            1..=31 => ShiftOpResult {
                result: rm >> amount,
                carry: rm.get_bit((amount - 1) as u8),
            },
            32 => ShiftOpResult {
                result: 0,
                carry: rm.get_bit(31),
            },
            _ => ShiftOpResult::default(),
        },
        ShiftKind::Asr => match amount {
            1..=31 => ShiftOpResult {
                result: ((rm as i32) >> amount) as u32,
                carry: rm.get_bit((amount - 1) as u8),
            },
            _ => ShiftOpResult {
                result: ((rm as i32) >> 31) as u32,
                carry: rm.get_bit(31),
            },
        },
        ShiftKind::Ror => match amount % 32 {
            // Multiples of 32 leave the value alone but still produce a carry.
            0 => ShiftOpResult {
                result: rm,
                carry: rm.get_bit(31),
            },
            n => ShiftOpResult {
                result: rm.rotate_right(n),
                carry: rm.get_bit((n - 1) as u8),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BOUNDARIES: [u32; 8] = [
        0,
        1,
        2,
        0x7FFF_FFFE,
        0x7FFF_FFFF,
        0x8000_0000,
        0x8000_0001,
        0xFFFF_FFFF,
    ];

    #[test]
    fn test_and_move_groups() {
        let teq = ArmModeAluInstruction::from(9);
        assert_eq!(teq, ArmModeAluInstruction::Teq);
        assert!(teq.is_test());
        assert!(!teq.is_move());
        assert_eq!(teq.to_string(), "teq");

        let mvn = ArmModeAluInstruction::from(15);
        assert!(mvn.is_move());
        assert!(!mvn.is_test());

        assert_eq!(ArmModeAluInstruction::from(2).to_string(), "sub");
    }

    #[test]
    fn adder_matches_reference_on_boundaries() {
        for &a in &BOUNDARIES {
            for &b in &BOUNDARIES {
                for carry_in in [false, true] {
                    assert_eq!(
                        adder(a, b, carry_in),
                        reference_adder(a, b, carry_in),
                        "a={a:#010x} b={b:#010x} c={carry_in}"
                    );
                }
            }
        }
    }

    #[test]
    fn adder_matches_reference_fuzzed() {
        for _ in 0..10_000 {
            let a = rand::random::<u32>();
            let b = rand::random::<u32>();
            let carry_in = rand::random::<bool>();
            assert_eq!(
                adder(a, b, carry_in),
                reference_adder(a, b, carry_in),
                "a={a:#010x} b={b:#010x} c={carry_in}"
            );
        }
    }

    #[test]
    fn adder_matches_native_arithmetic() {
        for _ in 0..1_000 {
            let a = rand::random::<u32>();
            let b = rand::random::<u32>();
            let carry_in = rand::random::<bool>();

            let wide = u64::from(a) + u64::from(b) + u64::from(carry_in);
            let signed = i64::from(a as i32) + i64::from(b as i32) + i64::from(carry_in);
            let r = adder(a, b, carry_in);

            assert_eq!(r.result, wide as u32);
            assert_eq!(r.carry, wide > u64::from(u32::MAX));
            assert_eq!(r.overflow, signed != i64::from(wide as u32 as i32));
        }
    }

    #[test]
    fn subtraction_through_adder() {
        // 5 - 3: no borrow, so C=1
        let r = adder(5, !3, true);
        assert_eq!(r.result, 2);
        assert!(r.carry);
        assert!(!r.overflow);

        // 3 - 5: borrow, so C=0 and the result is negative
        let r = adder(3, !5, true);
        assert_eq!(r.result, (-2_i32) as u32);
        assert!(!r.carry);
        assert!(r.sign);

        // i32::MIN - 1 overflows
        let r = adder(0x8000_0000, !1, true);
        assert_eq!(r.result, 0x7FFF_FFFF);
        assert!(r.overflow);
        assert!(r.carry);

        // x - x is zero with carry set
        let r = adder(0x1234, !0x1234, true);
        assert!(r.zero);
        assert!(r.carry);
    }

    #[test]
    fn immediate_operand_rotation() {
        assert_eq!(immediate_operand(0x001), 1);
        assert_eq!(immediate_operand(0x4FF), 0xFF00_0000);
        assert_eq!(immediate_operand(0xF01), 4);
    }

    #[test]
    fn shifter_edge_table() {
        let v = 0xDEAD_BEEF;

        // LSL #0 keeps operand and carry
        assert_eq!(
            shift_by_immediate(ShiftKind::Lsl, 0, v, true),
            ShiftOpResult {
                result: v,
                carry: true
            }
        );
        assert_eq!(
            shift_by_immediate(ShiftKind::Lsl, 0, v, false),
            ShiftOpResult {
                result: v,
                carry: false
            }
        );

        // LSL #32 from a register
        assert_eq!(
            shift_by_register(ShiftKind::Lsl, 32, v, false),
            ShiftOpResult {
                result: 0,
                carry: true
            }
        );
        assert_eq!(
            shift_by_register(ShiftKind::Lsl, 32, 0x2, true),
            ShiftOpResult {
                result: 0,
                carry: false
            }
        );

        // LSR #0 means LSR #32
        assert_eq!(
            shift_by_immediate(ShiftKind::Lsr, 0, v, false),
            ShiftOpResult {
                result: 0,
                carry: true
            }
        );
        assert_eq!(
            shift_by_immediate(ShiftKind::Lsr, 0, 0x7FFF_FFFF, true),
            ShiftOpResult {
                result: 0,
                carry: false
            }
        );

        // ASR #0 means ASR #32
        assert_eq!(
            shift_by_immediate(ShiftKind::Asr, 0, 0x8000_0000, false),
            ShiftOpResult {
                result: 0xFFFF_FFFF,
                carry: true
            }
        );

        // ROR #0 means RRX
        assert_eq!(
            shift_by_immediate(ShiftKind::Ror, 0, 0x0000_0001, true),
            ShiftOpResult {
                result: 0x8000_0000,
                carry: true
            }
        );
    }

    #[test]
    fn register_shift_large_amounts() {
        let v = 0x8000_0001;

        assert_eq!(
            shift_by_register(ShiftKind::Lsl, 33, v, true),
            ShiftOpResult::default()
        );
        assert_eq!(
            shift_by_register(ShiftKind::Lsr, 32, v, false),
            ShiftOpResult {
                result: 0,
                carry: true
            }
        );
        assert_eq!(
            shift_by_register(ShiftKind::Lsr, 40, v, true),
            ShiftOpResult::default()
        );
        assert_eq!(
            shift_by_register(ShiftKind::Asr, 200, v, false),
            ShiftOpResult {
                result: 0xFFFF_FFFF,
                carry: true
            }
        );
        assert_eq!(
            shift_by_register(ShiftKind::Ror, 32, v, false),
            ShiftOpResult {
                result: v,
                carry: true
            }
        );
        assert_eq!(
            shift_by_register(ShiftKind::Ror, 33, v, false),
            ShiftOpResult {
                result: 0xC000_0000,
                carry: true
            }
        );
    }

    #[test]
    fn register_shift_of_zero_keeps_everything() {
        for kind in [ShiftKind::Lsl, ShiftKind::Lsr, ShiftKind::Asr, ShiftKind::Ror] {
            // Only the bottom byte of Rs counts.
            assert_eq!(
                shift_by_register(kind, 0x100, 0x1234_5678, true),
                ShiftOpResult {
                    result: 0x1234_5678,
                    carry: true
                }
            );
        }
    }
}
