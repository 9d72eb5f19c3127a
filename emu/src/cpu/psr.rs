//! # Current Program Status Register
//!
//! Only the condition flags are modelled. The engine always runs in user
//! mode, so the control byte is never touched and there is no SPSR.
//!
//! ```text
//! 31 30 29 28 27                              0
//! ┌──┬──┬──┬──┬────────────────────────────────┐
//! │N │Z │C │V │ (not modelled, stays zero)     │
//! └──┴──┴──┴──┴────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::arm::alu_instruction::ArithmeticOpResult;
use crate::cpu::condition::Condition;

/// Bits of the PSR writable from user mode.
pub const CONDITION_FLAGS_MASK: u32 = 0xF000_0000;

/// Program Status Register.
///
/// # Example
///
/// ```
/// use emu::cpu::psr::Psr;
///
/// let mut cpsr = Psr::default();
/// cpsr.set_zero_flag(true);
/// assert!(cpsr.zero_flag());
/// assert_eq!(u32::from(cpsr), 0x4000_0000);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Psr(u32);

impl Psr {
    pub(crate) fn can_execute(self, cond: Condition) -> bool {
        use Condition::{AL, CC, CS, EQ, GE, GT, HI, LE, LS, LT, MI, NE, NV, PL, VC, VS};
        match cond {
            EQ => self.zero_flag(),
            NE => !self.zero_flag(),
            CS => self.carry_flag(),
            CC => !self.carry_flag(),
            MI => self.sign_flag(),
            PL => !self.sign_flag(),
            VS => self.overflow_flag(),
            VC => !self.overflow_flag(),
            HI => self.carry_flag() && !self.zero_flag(),
            LS => !self.carry_flag() || self.zero_flag(),
            GE => self.sign_flag() == self.overflow_flag(),
            LT => self.sign_flag() != self.overflow_flag(),
            GT => !self.zero_flag() && (self.sign_flag() == self.overflow_flag()),
            LE => self.zero_flag() || (self.sign_flag() != self.overflow_flag()),
            AL => true,
            NV => false,
        }
    }

    /// N => Bit 31
    #[must_use]
    pub fn sign_flag(self) -> bool {
        self.0.get_bit(31)
    }

    /// Z => Bit 30
    #[must_use]
    pub fn zero_flag(self) -> bool {
        self.0.get_bit(30)
    }

    /// C => Bit 29
    #[must_use]
    pub fn carry_flag(self) -> bool {
        self.0.get_bit(29)
    }

    /// V => Bit 28
    #[must_use]
    pub fn overflow_flag(self) -> bool {
        self.0.get_bit(28)
    }

    pub fn set_sign_flag(&mut self, value: bool) {
        self.0.set_bit(31, value);
    }

    pub fn set_zero_flag(&mut self, value: bool) {
        self.0.set_bit(30, value);
    }

    pub fn set_carry_flag(&mut self, value: bool) {
        self.0.set_bit(29, value);
    }

    pub fn set_overflow_flag(&mut self, value: bool) {
        self.0.set_bit(28, value);
    }

    /// Flags of the logical family: N and Z from the result, C from the
    /// barrel shifter, V untouched.
    pub fn set_logical_flags(&mut self, result: u32, shifter_carry: bool) {
        self.set_sign_flag(result.get_bit(31));
        self.set_zero_flag(result == 0);
        self.set_carry_flag(shifter_carry);
    }

    /// Flags of the arithmetic family, straight from the adder.
    pub fn set_arithmetic_flags(&mut self, op_result: &ArithmeticOpResult) {
        self.set_sign_flag(op_result.sign);
        self.set_zero_flag(op_result.zero);
        self.set_carry_flag(op_result.carry);
        self.set_overflow_flag(op_result.overflow);
    }

    /// Writes the N, Z, C, V nibble of `value`, everything else is kept.
    pub fn set_condition_flags(&mut self, value: u32) {
        self.0 = (self.0 & !CONDITION_FLAGS_MASK) | (value & CONDITION_FLAGS_MASK);
    }
}

impl From<Psr> for u32 {
    fn from(psr: Psr) -> Self {
        psr.0
    }
}

impl From<u32> for Psr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn check_can_execute() {
        let mut psr = Psr::default();
        assert!(psr.can_execute(Condition::AL));
        assert!(psr.can_execute(Condition::NE));
        assert!(!psr.can_execute(Condition::EQ));
        assert!(!psr.can_execute(Condition::NV));

        psr.set_sign_flag(true);
        assert!(psr.can_execute(Condition::LT));
        assert!(!psr.can_execute(Condition::GE));

        psr.set_overflow_flag(true);
        assert!(psr.can_execute(Condition::GE));
        assert!(psr.can_execute(Condition::GT));

        psr.set_zero_flag(true);
        assert!(!psr.can_execute(Condition::GT));
        assert!(psr.can_execute(Condition::LE));
        assert!(psr.can_execute(Condition::LS));
        assert!(!psr.can_execute(Condition::HI));
    }

    #[test]
    fn condition_flags_only() {
        let mut psr = Psr::default();
        psr.set_condition_flags(0xFFFF_FFFF);
        assert_eq!(u32::from(psr), CONDITION_FLAGS_MASK);

        psr.set_condition_flags(0x5000_00D3);
        assert_eq!(u32::from(psr), 0x5000_0000);
        assert!(psr.zero_flag());
        assert!(psr.overflow_flag());
        assert!(!psr.sign_flag());
        assert!(!psr.carry_flag());
    }

    #[test]
    fn logical_flags_keep_overflow() {
        let mut psr = Psr::default();
        psr.set_overflow_flag(true);
        psr.set_logical_flags(0x8000_0000, true);
        assert!(psr.sign_flag());
        assert!(!psr.zero_flag());
        assert!(psr.carry_flag());
        assert!(psr.overflow_flag());
    }
}
