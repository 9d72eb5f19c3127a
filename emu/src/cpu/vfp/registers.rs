use crate::bitwise::Bits;
use crate::cpu::vfp::instructions::SystemRegister;

/// Number of 32-bit slots in the register file.
pub const NUM_SLOTS: usize = 32;

/// Slots per register bank. Bank 0 holds the scalars of a short vector op.
pub const BANK_SIZE: usize = 8;

const FPSCR_FLAGS_MASK: u32 = 0xF000_0000;

/// VFP register file: 32 singles overlapping 16 doubles, plus the
/// system registers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VfpRegisters {
    slots: [u32; NUM_SLOTS],
    fpscr: u32,
    fpsid: u32,
    fpexc: u32,
}

impl VfpRegisters {
    fn check_slot(index: usize) {
        assert!(index < NUM_SLOTS, "VFP register slot {index} does not exist");
    }

    #[must_use]
    pub fn slot(&self, index: usize) -> u32 {
        Self::check_slot(index);
        self.slots[index]
    }

    pub fn set_slot(&mut self, index: usize, value: u32) {
        Self::check_slot(index);
        self.slots[index] = value;
    }

    #[must_use]
    pub fn single(&self, index: usize) -> f32 {
        f32::from_bits(self.slot(index))
    }

    pub fn set_single(&mut self, index: usize, value: f32) {
        self.set_slot(index, value.to_bits());
    }

    /// The double covering `index`: low word in the even slot, high word
    /// in the odd one.
    #[must_use]
    pub fn double(&self, index: usize) -> f64 {
        let low = index & !1;
        let bits = (u64::from(self.slot(low + 1)) << 32) | u64::from(self.slot(low));
        f64::from_bits(bits)
    }

    pub fn set_double(&mut self, index: usize, value: f64) {
        let low = index & !1;
        let bits = value.to_bits();
        self.set_slot(low, bits as u32);
        self.set_slot(low + 1, (bits >> 32) as u32);
    }

    #[must_use]
    pub const fn fpscr(&self) -> u32 {
        self.fpscr
    }

    pub const fn set_fpscr(&mut self, value: u32) {
        self.fpscr = value;
    }

    /// # Panics
    /// On a system register index that is not FPSID, FPSCR or FPEXC.
    #[must_use]
    pub fn system(&self, register: SystemRegister) -> u32 {
        match register {
            SystemRegister::Fpsid => self.fpsid,
            SystemRegister::Fpscr => self.fpscr,
            SystemRegister::Fpexc => self.fpexc,
            SystemRegister::Unknown(index) => {
                panic!("VFP system register {index} does not exist")
            }
        }
    }

    /// FPSID is read only, writing it is ignored.
    ///
    /// # Panics
    /// On a system register index that is not FPSID, FPSCR or FPEXC.
    pub fn set_system(&mut self, register: SystemRegister, value: u32) {
        match register {
            SystemRegister::Fpsid => {
                tracing::warn!("write of 0x{value:08x} to the read only FPSID ignored");
            }
            SystemRegister::Fpscr => self.fpscr = value,
            SystemRegister::Fpexc => self.fpexc = value,
            SystemRegister::Unknown(index) => {
                panic!("VFP system register {index} does not exist")
            }
        }
    }

    /// FPSCR LEN field plus one.
    #[must_use]
    pub fn vector_length(&self) -> usize {
        self.fpscr.get_bits(16..=18) as usize + 1
    }

    /// FPSCR STRIDE field: `0b11` steps by two registers, anything else by one.
    #[must_use]
    pub fn vector_stride(&self) -> usize {
        if self.fpscr.get_bits(20..=21) == 0b11 {
            2
        } else {
            1
        }
    }

    /// Replaces FPSCR N, Z, C and V.
    pub fn set_compare_flags(&mut self, flags: u32) {
        self.fpscr = (self.fpscr & !FPSCR_FLAGS_MASK) | (flags & FPSCR_FLAGS_MASK);
    }

    #[must_use]
    pub const fn compare_flags(&self) -> u32 {
        self.fpscr & FPSCR_FLAGS_MASK
    }
}
