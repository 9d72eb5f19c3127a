//! # Register File
//!
//! - **R0-R12**: General purpose
//! - **R13 (SP)**: Stack pointer (by convention)
//! - **R14 (LR)**: Link register, written by BL
//! - **R15 (PC)**: Program counter. Reads as an operand see the address of
//!   the instruction plus the prefetch; the executors add it, the file
//!   only stores the architectural value.

use serde::{Deserialize, Serialize};

/// Stack pointer by convention, nothing in the core treats it specially.
pub const REG_SP: usize = 0xD;

/// Link Register index (return address for subroutines).
pub const REG_LR: usize = 0xE;

/// Program Counter register index.
pub const REG_PROGRAM_COUNTER: usize = 0xF;

/// The 16 registers visible to user mode code.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers([u32; 16]);

impl Registers {
    pub const fn program_counter(&self) -> u32 {
        self.0[REG_PROGRAM_COUNTER]
    }

    pub const fn set_program_counter(&mut self, new_value: u32) {
        self.0[REG_PROGRAM_COUNTER] = new_value;
    }

    pub const fn advance_program_counter(&mut self, bytes: u32) {
        self.0[REG_PROGRAM_COUNTER] = self.0[REG_PROGRAM_COUNTER].wrapping_add(bytes);
    }

    pub fn set_register_at(&mut self, reg: usize, new_value: u32) {
        assert!(reg <= 15, "Invalid register index: {reg} (0x{reg:X})");
        self.0[reg] = new_value;
    }

    pub fn register_at(&self, reg: usize) -> u32 {
        assert!(reg <= 15, "Invalid register index: {reg} (0x{reg:X})");
        self.0[reg]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn program_counter_wraps() {
        let mut registers = Registers::default();
        registers.set_program_counter(0xFFFF_FFFC);
        registers.advance_program_counter(4);
        assert_eq!(registers.program_counter(), 0);
        assert_eq!(registers.register_at(REG_PROGRAM_COUNTER), 0);
    }

    #[test]
    #[should_panic(expected = "Invalid register index")]
    fn register_out_of_range() {
        let mut registers = Registers::default();
        registers.set_register_at(16, 1);
    }
}
