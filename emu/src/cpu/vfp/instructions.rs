//! VFP (coprocessors 10 and 11) instruction decoding.
//!
//! Register indices are kept as 32-bit slot numbers: a single register
//! `Sx` lives in slot `x`, a double `Dx` spans slots `2x` (low word) and
//! `2x + 1` (high word).

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::flags::LoadStoreKind;

const REGISTER_TRANSFER_MASK: u32 = 0x0f00_0070;
const REGISTER_TRANSFER_OPCODE: u32 = 0x0e00_0010;
const DATA_PROCESSING_MASK: u32 = 0x0f00_0010;
const DATA_PROCESSING_OPCODE: u32 = 0x0e00_0000;
const LOAD_STORE_MASK: u32 = 0x0e00_0000;
const LOAD_STORE_OPCODE: u32 = 0x0c00_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precision {
    /// Coprocessor 10.
    Single,

    /// Coprocessor 11.
    Double,
}

impl Precision {
    fn from_cp_num(op_code: u32) -> Option<Self> {
        match op_code.get_bits(8..=11) {
            10 => Some(Self::Single),
            11 => Some(Self::Double),
            _ => None,
        }
    }

    /// Mnemonic suffix.
    #[must_use]
    pub const fn suffix(self) -> char {
        match self {
            Self::Single => 's',
            Self::Double => 'd',
        }
    }
}

/// Extension operations, selected by the Fn:N field when the opcode is 15.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VfpExtensionOp {
    Fcpy,
    Fabs,
    Fneg,
    Fsqrt,
    Fcmp,
    Fcmpe,
    Fcmpz,
    Fcmpez,
    Fcvt,
    Fuito,
    Fsito,
    Ftoui,
    Ftouiz,
    Ftosi,
    Ftosiz,
    Undefined(u32),
}

impl From<u32> for VfpExtensionOp {
    fn from(selector: u32) -> Self {
        match selector {
            0 => Self::Fcpy,
            1 => Self::Fabs,
            2 => Self::Fneg,
            3 => Self::Fsqrt,
            8 => Self::Fcmp,
            9 => Self::Fcmpe,
            10 => Self::Fcmpz,
            11 => Self::Fcmpez,
            15 => Self::Fcvt,
            16 => Self::Fuito,
            17 => Self::Fsito,
            24 => Self::Ftoui,
            25 => Self::Ftouiz,
            26 => Self::Ftosi,
            27 => Self::Ftosiz,
            other => Self::Undefined(other),
        }
    }
}

impl VfpExtensionOp {
    /// Ops that follow the FPSCR vector length. The rest are always scalar.
    #[must_use]
    pub const fn is_vectorizable(self) -> bool {
        matches!(self, Self::Fcpy | Self::Fabs | Self::Fneg | Self::Fsqrt)
    }

    #[must_use]
    pub const fn is_compare(self) -> bool {
        matches!(self, Self::Fcmp | Self::Fcmpe | Self::Fcmpz | Self::Fcmpez)
    }
}

impl std::fmt::Display for VfpExtensionOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Fcpy => "fcpy",
            Self::Fabs => "fabs",
            Self::Fneg => "fneg",
            Self::Fsqrt => "fsqrt",
            Self::Fcmp => "fcmp",
            Self::Fcmpe => "fcmpe",
            Self::Fcmpz => "fcmpz",
            Self::Fcmpez => "fcmpez",
            Self::Fcvt => "fcvt",
            Self::Fuito => "fuito",
            Self::Fsito => "fsito",
            Self::Ftoui => "ftoui",
            Self::Ftouiz => "ftouiz",
            Self::Ftosi => "ftosi",
            Self::Ftosiz => "ftosiz",
            Self::Undefined(_) => "fext?",
        };
        f.write_str(name)
    }
}

/// Opcode p:q:r:s of a data processing instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VfpDataOp {
    /// fd + fn * fm
    Fmac,
    /// fd - fn * fm
    Fnmac,
    /// -fd + fn * fm
    Fmsc,
    /// -fd - fn * fm
    Fnmsc,
    Fmul,
    Fnmul,
    Fadd,
    Fsub,
    Fdiv,
    Extension(VfpExtensionOp),
    Undefined(u32),
}

impl VfpDataOp {
    fn decode(op_code: u32) -> Self {
        let opcode = (op_code.get_bits(23..=23) << 3)
            | (op_code.get_bits(21..=21) << 2)
            | (op_code.get_bits(20..=20) << 1)
            | op_code.get_bits(6..=6);

        match opcode {
            0 => Self::Fmac,
            1 => Self::Fnmac,
            2 => Self::Fmsc,
            3 => Self::Fnmsc,
            4 => Self::Fmul,
            5 => Self::Fnmul,
            6 => Self::Fadd,
            7 => Self::Fsub,
            8 => Self::Fdiv,
            15 => Self::Extension(VfpExtensionOp::from(fn_index(op_code) as u32)),
            other => Self::Undefined(other),
        }
    }
}

impl std::fmt::Display for VfpDataOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Fmac => "fmac",
            Self::Fnmac => "fnmac",
            Self::Fmsc => "fmsc",
            Self::Fnmsc => "fnmsc",
            Self::Fmul => "fmul",
            Self::Fnmul => "fnmul",
            Self::Fadd => "fadd",
            Self::Fsub => "fsub",
            Self::Fdiv => "fdiv",
            Self::Extension(op) => return write!(f, "{op}"),
            Self::Undefined(_) => "fop?",
        };
        f.write_str(name)
    }
}

/// P:U:W of a load/store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VfpAddressing {
    /// FLDM/FSTM from Rn, no write-back.
    Unindexed,
    /// FLDM/FSTM ascending, Rn += 4 * offset.
    Increment,
    /// FLDM/FSTM below Rn, Rn -= 4 * offset.
    Decrement,
    /// FLD/FST at Rn + 4 * offset.
    PositiveOffset,
    /// FLD/FST at Rn - 4 * offset.
    NegativeOffset,
    Undefined(u32),
}

impl From<u32> for VfpAddressing {
    fn from(op_code: u32) -> Self {
        let mode = (op_code.get_bits(24..=24) << 2)
            | (op_code.get_bits(23..=23) << 1)
            | op_code.get_bits(21..=21);

        match mode {
            0b010 => Self::Unindexed,
            0b011 => Self::Increment,
            0b101 => Self::Decrement,
            0b110 => Self::PositiveOffset,
            0b100 => Self::NegativeOffset,
            other => Self::Undefined(other),
        }
    }
}

impl VfpAddressing {
    #[must_use]
    pub const fn is_multiple(self) -> bool {
        matches!(self, Self::Unindexed | Self::Increment | Self::Decrement)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VfpTransferOp {
    Fmsr,
    Fmrs,
    Fmxr,
    Fmrx,
    Fmdlr,
    Fmrdl,
    Fmdhr,
    Fmrdh,
    Undefined(u32),
}

impl VfpTransferOp {
    fn decode(op_code: u32, precision: Precision) -> Self {
        let opcode = op_code.get_bits(20..=23);
        match (precision, opcode) {
            (Precision::Single, 0) => Self::Fmsr,
            (Precision::Single, 1) => Self::Fmrs,
            (Precision::Single, 14) => Self::Fmxr,
            (Precision::Single, 15) => Self::Fmrx,
            (Precision::Double, 0) => Self::Fmdlr,
            (Precision::Double, 1) => Self::Fmrdl,
            (Precision::Double, 2) => Self::Fmdhr,
            (Precision::Double, 3) => Self::Fmrdh,
            (_, other) => Self::Undefined(other),
        }
    }
}

impl std::fmt::Display for VfpTransferOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Fmsr => "fmsr",
            Self::Fmrs => "fmrs",
            Self::Fmxr => "fmxr",
            Self::Fmrx => "fmrx",
            Self::Fmdlr => "fmdlr",
            Self::Fmrdl => "fmrdl",
            Self::Fmdhr => "fmdhr",
            Self::Fmrdh => "fmrdh",
            Self::Undefined(_) => "fmov?",
        };
        f.write_str(name)
    }
}

/// System registers addressed by Fn:N in FMXR/FMRX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemRegister {
    Fpsid,
    Fpscr,
    Fpexc,
    Unknown(usize),
}

impl From<usize> for SystemRegister {
    fn from(index: usize) -> Self {
        match index {
            0 => Self::Fpsid,
            2 => Self::Fpscr,
            16 => Self::Fpexc,
            other => Self::Unknown(other),
        }
    }
}

impl std::fmt::Display for SystemRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fpsid => f.write_str("fpsid"),
            Self::Fpscr => f.write_str("fpscr"),
            Self::Fpexc => f.write_str("fpexc"),
            Self::Unknown(index) => write!(f, "fpsys{index}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VfpInstruction {
    DataProcessing {
        precision: Precision,
        op: VfpDataOp,
        fd: usize,
        fn_reg: usize,
        fm: usize,
    },
    LoadStore {
        precision: Precision,
        addressing: VfpAddressing,
        load_store: LoadStoreKind,
        rn: usize,
        fd: usize,
        /// In words.
        offset: u32,
    },
    RegisterTransfer {
        precision: Precision,
        op: VfpTransferOp,
        fn_reg: usize,
        rd: usize,
    },
}

fn fn_index(op_code: u32) -> usize {
    ((op_code.get_bits(16..=19) << 1) | op_code.get_bits(7..=7)) as usize
}

fn fd_index(op_code: u32) -> usize {
    ((op_code.get_bits(12..=15) << 1) | op_code.get_bits(22..=22)) as usize
}

fn fm_index(op_code: u32) -> usize {
    ((op_code.get_bits(0..=3) << 1) | op_code.get_bits(5..=5)) as usize
}

impl VfpInstruction {
    /// `None` for class 3 words that are not VFP: other coprocessors and SWI.
    #[must_use]
    pub fn decode(op_code: u32) -> Option<Self> {
        let precision = Precision::from_cp_num(op_code)?;

        if op_code & REGISTER_TRANSFER_MASK == REGISTER_TRANSFER_OPCODE {
            Some(Self::RegisterTransfer {
                precision,
                op: VfpTransferOp::decode(op_code, precision),
                fn_reg: fn_index(op_code),
                rd: op_code.get_bits(12..=15) as usize,
            })
        } else if op_code & DATA_PROCESSING_MASK == DATA_PROCESSING_OPCODE {
            Some(Self::DataProcessing {
                precision,
                op: VfpDataOp::decode(op_code),
                fd: fd_index(op_code),
                fn_reg: fn_index(op_code),
                fm: fm_index(op_code),
            })
        } else if op_code & LOAD_STORE_MASK == LOAD_STORE_OPCODE {
            Some(Self::LoadStore {
                precision,
                addressing: VfpAddressing::from(op_code),
                load_store: op_code.get_bit(20).into(),
                rn: op_code.get_bits(16..=19) as usize,
                fd: fd_index(op_code),
                offset: op_code.get_bits(0..=7),
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_fadds() {
        // fadds s0, s1, s2
        assert_eq!(
            VfpInstruction::decode(0xEE30_0A81),
            Some(VfpInstruction::DataProcessing {
                precision: Precision::Single,
                op: VfpDataOp::Fadd,
                fd: 0,
                fn_reg: 1,
                fm: 2,
            })
        );
    }

    #[test]
    fn decode_extension_ops() {
        // fsqrtd d1, d2
        assert_eq!(
            VfpInstruction::decode(0xEEB1_1BC2),
            Some(VfpInstruction::DataProcessing {
                precision: Precision::Double,
                op: VfpDataOp::Extension(VfpExtensionOp::Fsqrt),
                fd: 2,
                fn_reg: 3,
                fm: 4,
            })
        );

        // fcmpzs s3
        let Some(VfpInstruction::DataProcessing { op, fd, .. }) =
            VfpInstruction::decode(0xEEF5_1A40)
        else {
            panic!("not a data processing instruction");
        };
        assert_eq!(op, VfpDataOp::Extension(VfpExtensionOp::Fcmpz));
        assert_eq!(fd, 3);
    }

    #[test]
    fn decode_load_store() {
        // flds s0, [r1, #8]
        assert_eq!(
            VfpInstruction::decode(0xED91_0A02),
            Some(VfpInstruction::LoadStore {
                precision: Precision::Single,
                addressing: VfpAddressing::PositiveOffset,
                load_store: LoadStoreKind::Load,
                rn: 1,
                fd: 0,
                offset: 2,
            })
        );

        // fstmiad r0!, {d0-d1}
        assert_eq!(
            VfpInstruction::decode(0xECA0_0B04),
            Some(VfpInstruction::LoadStore {
                precision: Precision::Double,
                addressing: VfpAddressing::Increment,
                load_store: LoadStoreKind::Store,
                rn: 0,
                fd: 0,
                offset: 4,
            })
        );
    }

    #[test]
    fn decode_register_transfer() {
        // fmrx r15, fpscr (fmstat)
        assert_eq!(
            VfpInstruction::decode(0xEEF1_FA10),
            Some(VfpInstruction::RegisterTransfer {
                precision: Precision::Single,
                op: VfpTransferOp::Fmrx,
                fn_reg: 2,
                rd: 15,
            })
        );
        assert_eq!(SystemRegister::from(2), SystemRegister::Fpscr);
    }

    #[test]
    fn other_coprocessors_are_not_vfp() {
        assert_eq!(VfpInstruction::decode(0xEF00_0000), None);
        assert_eq!(VfpInstruction::decode(0xEE30_0981), None);
        assert_eq!(VfpInstruction::decode(0xEC00_0100), None);
    }
}
