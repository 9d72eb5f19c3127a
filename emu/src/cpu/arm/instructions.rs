//! # ARM Instruction Decoding
//!
//! A 32-bit word is turned into an [`ArmModeInstruction`] exactly once; the
//! emulator and the disassembler both `match` on the result, so they can
//! never disagree on what a word is.
//!
//! ## Instruction Categories
//!
//! Bits 27-26 select the top level class:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  00  →  Multiply, Multiply Long, CLZ, SWP, Halfword transfer,          │
//! │         PSR transfer, Data Processing                                   │
//! │  01  →  Single Data Transfer (or Undefined)                             │
//! │  10  →  Branch (bit 25 set) or Block Data Transfer                      │
//! │  11  →  Coprocessor / SWI (VFP when compiled in)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Decoding Priority
//!
//! Inside class 00 several masks overlap, so they are tried in order:
//!
//! 1. Multiply            `(i & 0x0fc000f0) == 0x00000090`
//! 2. Multiply Long       `(i & 0x0f8000f0) == 0x00800090`
//! 3. CLZ                 `(i & 0x0ff000f0) == 0x01600010`
//! 4. Single Data Swap    `(i & 0x0fb00ff0) == 0x01000090`
//! 5. Halfword transfer   `(i & 0x0e000090) == 0x00000090` (also matches SWP)
//! 6. PSR transfer        `(i & 0x01900000) == 0x01000000` (TST..CMN with S clear)
//! 7. Data Processing
//!
//! Words that break an encoding rule still decode; the offending fields are
//! kept so the disassembler can describe them and the emulator can refuse
//! them.
//!
//! ## Instruction Encoding Example
//!
//! ```text
//! ADD R1, R3, #1   (0xE2831001)
//!
//! 31-28  27-26  25  24-21  20  19-16  15-12  11-8   7-0
//! [1110] [ 00 ] [1] [0100] [0] [0011] [0001] [0000] [00000001]
//!   ↑       ↑    ↑    ↑     ↑    ↑      ↑      ↑       ↑
//!   │       │    │    │     │    │      │      │       └─ imm8 = 1
//!   │       │    │    │     │    │      │      └───────── rotate = 0
//!   │       │    │    │     │    │      └──────────────── Rd = R1
//!   │       │    │    │     │    └─────────────────────── Rn = R3
//!   │       │    │    │     └──────────────────────────── S = 0
//!   │       │    │    └────────────────────────────────── ADD
//!   │       │    └─────────────────────────────────────── immediate operand
//!   │       └──────────────────────────────────────────── data processing
//!   └──────────────────────────────────────────────────── always
//! ```

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::arm::alu_instruction::ArmModeAluInstruction;
use crate::cpu::flags::{Indexing, LoadStoreKind, Offsetting, ReadWriteKind, ShiftKind};
#[cfg(feature = "vfp")]
use crate::cpu::vfp::instructions::VfpInstruction;

const MULTIPLY_MASK: u32 = 0x0fc0_00f0;
const MULTIPLY_OPCODE: u32 = 0x0000_0090;
const MULTIPLY_LONG_MASK: u32 = 0x0f80_00f0;
const MULTIPLY_LONG_OPCODE: u32 = 0x0080_0090;
const CLZ_MASK: u32 = 0x0ff0_00f0;
const CLZ_OPCODE: u32 = 0x0160_0010;
const SWAP_MASK: u32 = 0x0fb0_0ff0;
const SWAP_OPCODE: u32 = 0x0100_0090;
const HALFWORD_MASK: u32 = 0x0e00_0090;
const HALFWORD_OPCODE: u32 = 0x0000_0090;
const PSR_TRANSFER_MASK: u32 = 0x0190_0000;
const PSR_TRANSFER_OPCODE: u32 = 0x0100_0000;
const UNDEFINED_MASK: u32 = 0x0e00_0010;
const UNDEFINED_OPCODE: u32 = 0x0600_0010;

const MRS_MASK: u32 = 0x0fbf_0fff;
const MRS_OPCODE: u32 = 0x010f_0000;
const MSR_MASK: u32 = 0x0fbf_fff0;
const MSR_OPCODE: u32 = 0x0129_f000;
const MSR_FLAGS_MASK: u32 = 0x0dbf_f000;
const MSR_FLAGS_OPCODE: u32 = 0x0128_f000;

/// Where the barrel shifter takes its amount from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftAmount {
    /// Bits 11-7. Zero has a special meaning for LSR, ASR and ROR.
    Immediate(u32),

    /// Bottom byte of Rs. `reserved_bit` is bit 7, which must be clear.
    Register { rs: usize, reserved_bit: bool },
}

/// `Rm <shift> amount`, the register form of operand2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftedRegister {
    pub rm: usize,
    pub shift_kind: ShiftKind,
    pub amount: ShiftAmount,
}

impl From<u32> for ShiftedRegister {
    fn from(op_code: u32) -> Self {
        let amount = if op_code.get_bit(4) {
            ShiftAmount::Register {
                rs: op_code.get_bits(8..=11) as usize,
                reserved_bit: op_code.get_bit(7),
            }
        } else {
            ShiftAmount::Immediate(op_code.get_bits(7..=11))
        };

        Self {
            rm: op_code.get_bits(0..=3) as usize,
            shift_kind: ShiftKind::from(op_code.get_bits(5..=6)),
            amount,
        }
    }
}

impl ShiftedRegister {
    #[must_use]
    pub const fn shift_by_register(&self) -> bool {
        matches!(self.amount, ShiftAmount::Register { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AluSecondOperandInfo {
    /// `base` rotated right by `2 * rotate`.
    Immediate { base: u32, rotate: u32 },
    Register(ShiftedRegister),
}

impl AluSecondOperandInfo {
    fn decode(op_code: u32) -> Self {
        if op_code.get_bit(25) {
            Self::Immediate {
                base: op_code.get_bits(0..=7),
                rotate: op_code.get_bits(8..=11),
            }
        } else {
            Self::Register(ShiftedRegister::from(op_code))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MsrSourceOperand {
    /// Raw 12-bit operand field, expanded like a data processing immediate.
    Immediate(u32),
    Register(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PsrOpKind {
    /// PSR to register.
    Mrs { rd: usize },

    /// Register to PSR.
    Msr { rm: usize },

    /// Register or immediate to the PSR flag bits.
    MsrFlags { operand: MsrSourceOperand },

    /// TST/TEQ/CMP/CMN with S clear that is none of the above.
    Undefined,
}

impl From<u32> for PsrOpKind {
    fn from(op_code: u32) -> Self {
        if op_code & MRS_MASK == MRS_OPCODE {
            Self::Mrs {
                rd: op_code.get_bits(12..=15) as usize,
            }
        } else if op_code & MSR_MASK == MSR_OPCODE {
            Self::Msr {
                rm: op_code.get_bits(0..=3) as usize,
            }
        } else if op_code & MSR_FLAGS_MASK == MSR_FLAGS_OPCODE {
            let operand = if op_code.get_bit(25) {
                MsrSourceOperand::Immediate(op_code.get_bits(0..=11))
            } else {
                MsrSourceOperand::Register(op_code.get_bits(0..=3) as usize)
            };
            Self::MsrFlags { operand }
        } else {
            Self::Undefined
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmModeMultiplyVariant {
    Mul,
    Mla,
}

impl From<u32> for ArmModeMultiplyVariant {
    fn from(op_code: u32) -> Self {
        if op_code.get_bit(21) { Self::Mla } else { Self::Mul }
    }
}

impl std::fmt::Display for ArmModeMultiplyVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mul => f.write_str("mul"),
            Self::Mla => f.write_str("mla"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmModeMultiplyLongVariant {
    Umull,
    Umlal,
    Smull,
    Smlal,
}

impl From<u32> for ArmModeMultiplyLongVariant {
    fn from(op_code: u32) -> Self {
        match (op_code.get_bit(22), op_code.get_bit(21)) {
            (false, false) => Self::Umull,
            (false, true) => Self::Umlal,
            (true, false) => Self::Smull,
            (true, true) => Self::Smlal,
        }
    }
}

impl ArmModeMultiplyLongVariant {
    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::Smull | Self::Smlal)
    }

    #[must_use]
    pub const fn accumulates(self) -> bool {
        matches!(self, Self::Umlal | Self::Smlal)
    }
}

impl std::fmt::Display for ArmModeMultiplyLongVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Umull => f.write_str("umull"),
            Self::Umlal => f.write_str("umlal"),
            Self::Smull => f.write_str("smull"),
            Self::Smlal => f.write_str("smlal"),
        }
    }
}

/// S and H bits (6-5) of a halfword and signed data transfer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HalfwordTransferKind {
    /// S=0 H=0 is the SWP encoding, reached only when the swap mask failed.
    Swap,
    UnsignedHalfword,
    SignedByte,
    SignedHalfword,
}

impl From<u32> for HalfwordTransferKind {
    fn from(op_code: u32) -> Self {
        match (op_code.get_bit(6), op_code.get_bit(5)) {
            (false, false) => Self::Swap,
            (false, true) => Self::UnsignedHalfword,
            (true, false) => Self::SignedByte,
            (true, true) => Self::SignedHalfword,
        }
    }
}

impl HalfwordTransferKind {
    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::SignedByte | Self::SignedHalfword)
    }

    #[must_use]
    pub const fn is_halfword(self) -> bool {
        matches!(self, Self::UnsignedHalfword | Self::SignedHalfword)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HalfwordDataTransferOffsetKind {
    /// High nibble from bits 11-8, low nibble from bits 3-0.
    Immediate { offset: u32 },
    Register { rm: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SingleDataTransferOffsetInfo {
    /// Unsigned 12-bit offset.
    Immediate { offset: u32 },
    Register(ShiftedRegister),
}

/// Instruction families, as reported by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstructionClass {
    DataProcessing,
    PsrTransfer,
    Multiply,
    MultiplyLong,
    CountLeadingZeros,
    SingleDataSwap,
    HalfwordDataTransfer,
    SingleDataTransfer,
    BlockDataTransfer,
    Branch,
    Undefined,
    Coprocessor,
    Vfp,
}

/// All ARM instruction types after decoding.
///
/// | Variant                | Example Instructions   |
/// |------------------------|------------------------|
/// | `DataProcessing`       | AND, ADD, CMP, MOV     |
/// | `PsrTransfer`          | MRS, MSR               |
/// | `Multiply`             | MUL, MLA               |
/// | `MultiplyLong`         | UMULL, SMLAL           |
/// | `CountLeadingZeros`    | CLZ                    |
/// | `SingleDataSwap`       | SWP, SWPB              |
/// | `HalfwordDataTransfer` | LDRH, STRH, LDRSB      |
/// | `SingleDataTransfer`   | LDR, STRB              |
/// | `BlockDataTransfer`    | LDMIA, STMDB           |
/// | `Branch`               | B, BL                  |
/// | `Vfp`                  | FADDS, FLDD, FMRX      |
#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub enum ArmModeInstruction {
    DataProcessing {
        alu_instruction: ArmModeAluInstruction,
        set_conditions: bool,
        rn: usize,
        destination: usize,
        op2: AluSecondOperandInfo,
    },
    PsrTransfer {
        /// P bit. User mode code may only name the CPSR.
        spsr: bool,
        kind: PsrOpKind,
    },
    Multiply {
        variant: ArmModeMultiplyVariant,
        set_conditions: bool,
        rd: usize,
        rn: usize,
        rs: usize,
        rm: usize,
    },
    MultiplyLong {
        variant: ArmModeMultiplyLongVariant,
        set_conditions: bool,
        rd_hi: usize,
        rd_lo: usize,
        rs: usize,
        rm: usize,
    },
    CountLeadingZeros {
        rd: usize,
        rm: usize,
    },
    SingleDataSwap {
        quantity: ReadWriteKind,
        rn: usize,
        rd: usize,
        rm: usize,
    },
    HalfwordDataTransfer {
        indexing: Indexing,
        offsetting: Offsetting,
        write_back: bool,
        load_store: LoadStoreKind,
        transfer_kind: HalfwordTransferKind,
        rn: usize,
        rd: usize,
        offset: HalfwordDataTransferOffsetKind,
    },
    SingleDataTransfer {
        indexing: Indexing,
        offsetting: Offsetting,
        quantity: ReadWriteKind,
        write_back: bool,
        load_store: LoadStoreKind,
        rn: usize,
        rd: usize,
        offset: SingleDataTransferOffsetInfo,
    },
    BlockDataTransfer {
        indexing: Indexing,
        offsetting: Offsetting,
        /// S bit, privileged modes only.
        load_psr: bool,
        write_back: bool,
        load_store: LoadStoreKind,
        rn: usize,
        register_list: u16,
    },
    Branch {
        link: bool,
        /// Byte offset, sign extended, without the prefetch.
        offset: i32,
    },
    Undefined,
    Coprocessor,
    #[cfg(feature = "vfp")]
    Vfp(VfpInstruction),
}

impl ArmModeInstruction {
    #[must_use]
    pub const fn class(&self) -> InstructionClass {
        match self {
            Self::DataProcessing { .. } => InstructionClass::DataProcessing,
            Self::PsrTransfer { .. } => InstructionClass::PsrTransfer,
            Self::Multiply { .. } => InstructionClass::Multiply,
            Self::MultiplyLong { .. } => InstructionClass::MultiplyLong,
            Self::CountLeadingZeros { .. } => InstructionClass::CountLeadingZeros,
            Self::SingleDataSwap { .. } => InstructionClass::SingleDataSwap,
            Self::HalfwordDataTransfer { .. } => InstructionClass::HalfwordDataTransfer,
            Self::SingleDataTransfer { .. } => InstructionClass::SingleDataTransfer,
            Self::BlockDataTransfer { .. } => InstructionClass::BlockDataTransfer,
            Self::Branch { .. } => InstructionClass::Branch,
            Self::Undefined => InstructionClass::Undefined,
            Self::Coprocessor => InstructionClass::Coprocessor,
            #[cfg(feature = "vfp")]
            Self::Vfp(_) => InstructionClass::Vfp,
        }
    }

    #[must_use]
    pub const fn is_branch(&self) -> bool {
        matches!(self, Self::Branch { .. })
    }

    /// Distance from the branch to its target, prefetch included.
    #[must_use]
    pub const fn branch_offset(&self, prefetch: u32) -> Option<i32> {
        match self {
            Self::Branch { offset, .. } => Some(offset.wrapping_add(prefetch as i32)),
            _ => None,
        }
    }

    fn decode_class_0(op_code: u32) -> Self {
        if op_code & MULTIPLY_MASK == MULTIPLY_OPCODE {
            Self::Multiply {
                variant: ArmModeMultiplyVariant::from(op_code),
                set_conditions: op_code.get_bit(20),
                rd: op_code.get_bits(16..=19) as usize,
                rn: op_code.get_bits(12..=15) as usize,
                rs: op_code.get_bits(8..=11) as usize,
                rm: op_code.get_bits(0..=3) as usize,
            }
        } else if op_code & MULTIPLY_LONG_MASK == MULTIPLY_LONG_OPCODE {
            Self::MultiplyLong {
                variant: ArmModeMultiplyLongVariant::from(op_code),
                set_conditions: op_code.get_bit(20),
                rd_hi: op_code.get_bits(16..=19) as usize,
                rd_lo: op_code.get_bits(12..=15) as usize,
                rs: op_code.get_bits(8..=11) as usize,
                rm: op_code.get_bits(0..=3) as usize,
            }
        } else if op_code & CLZ_MASK == CLZ_OPCODE {
            Self::CountLeadingZeros {
                rd: op_code.get_bits(12..=15) as usize,
                rm: op_code.get_bits(0..=3) as usize,
            }
        } else if op_code & SWAP_MASK == SWAP_OPCODE {
            Self::SingleDataSwap {
                quantity: op_code.get_bit(22).into(),
                rn: op_code.get_bits(16..=19) as usize,
                rd: op_code.get_bits(12..=15) as usize,
                rm: op_code.get_bits(0..=3) as usize,
            }
        } else if op_code & HALFWORD_MASK == HALFWORD_OPCODE {
            let offset = if op_code.get_bit(22) {
                HalfwordDataTransferOffsetKind::Immediate {
                    offset: (op_code.get_bits(8..=11) << 4) | op_code.get_bits(0..=3),
                }
            } else {
                HalfwordDataTransferOffsetKind::Register {
                    rm: op_code.get_bits(0..=3) as usize,
                }
            };

            Self::HalfwordDataTransfer {
                indexing: op_code.get_bit(24).into(),
                offsetting: op_code.get_bit(23).into(),
                write_back: op_code.get_bit(21),
                load_store: op_code.get_bit(20).into(),
                transfer_kind: HalfwordTransferKind::from(op_code),
                rn: op_code.get_bits(16..=19) as usize,
                rd: op_code.get_bits(12..=15) as usize,
                offset,
            }
        } else if op_code & PSR_TRANSFER_MASK == PSR_TRANSFER_OPCODE {
            Self::PsrTransfer {
                spsr: op_code.get_bit(22),
                kind: PsrOpKind::from(op_code),
            }
        } else {
            Self::DataProcessing {
                alu_instruction: ArmModeAluInstruction::from(op_code.get_bits(21..=24)),
                set_conditions: op_code.get_bit(20),
                rn: op_code.get_bits(16..=19) as usize,
                destination: op_code.get_bits(12..=15) as usize,
                op2: AluSecondOperandInfo::decode(op_code),
            }
        }
    }

    fn decode_class_1(op_code: u32) -> Self {
        if op_code & UNDEFINED_MASK == UNDEFINED_OPCODE {
            tracing::debug!("undefined instruction decode: opcode=0x{op_code:08X}");
            return Self::Undefined;
        }

        // Here I=1 means register offset, the opposite of data processing.
        let offset = if op_code.get_bit(25) {
            SingleDataTransferOffsetInfo::Register(ShiftedRegister::from(op_code))
        } else {
            SingleDataTransferOffsetInfo::Immediate {
                offset: op_code.get_bits(0..=11),
            }
        };

        Self::SingleDataTransfer {
            indexing: op_code.get_bit(24).into(),
            offsetting: op_code.get_bit(23).into(),
            quantity: op_code.get_bit(22).into(),
            write_back: op_code.get_bit(21),
            load_store: op_code.get_bit(20).into(),
            rn: op_code.get_bits(16..=19) as usize,
            rd: op_code.get_bits(12..=15) as usize,
            offset,
        }
    }

    fn decode_class_2(op_code: u32) -> Self {
        if op_code.get_bit(25) {
            Self::Branch {
                link: op_code.get_bit(24),
                offset: (op_code.get_bits(0..=23) << 2).sign_extended(26) as i32,
            }
        } else {
            Self::BlockDataTransfer {
                indexing: op_code.get_bit(24).into(),
                offsetting: op_code.get_bit(23).into(),
                load_psr: op_code.get_bit(22),
                write_back: op_code.get_bit(21),
                load_store: op_code.get_bit(20).into(),
                rn: op_code.get_bits(16..=19) as usize,
                register_list: op_code.get_bits(0..=15) as u16,
            }
        }
    }

    #[cfg(feature = "vfp")]
    fn decode_class_3(op_code: u32) -> Self {
        VfpInstruction::decode(op_code).map_or(Self::Coprocessor, Self::Vfp)
    }

    #[cfg(not(feature = "vfp"))]
    const fn decode_class_3(_op_code: u32) -> Self {
        Self::Coprocessor
    }
}

impl From<u32> for ArmModeInstruction {
    fn from(op_code: u32) -> Self {
        match op_code.get_bits(26..=27) {
            0b00 => Self::decode_class_0(op_code),
            0b01 => Self::decode_class_1(op_code),
            0b10 => Self::decode_class_2(op_code),
            _ => Self::decode_class_3(op_code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_add_immediate() {
        assert_eq!(
            ArmModeInstruction::from(0xE283_1001),
            ArmModeInstruction::DataProcessing {
                alu_instruction: ArmModeAluInstruction::Add,
                set_conditions: false,
                rn: 3,
                destination: 1,
                op2: AluSecondOperandInfo::Immediate { base: 1, rotate: 0 },
            }
        );
    }

    #[test]
    fn decode_shift_by_register() {
        // add r2, r1, r15, lsl r3
        let op_code = 0b1110_00_0_0100_0_0001_0010_0011_0001_1111;
        assert_eq!(
            ArmModeInstruction::from(op_code),
            ArmModeInstruction::DataProcessing {
                alu_instruction: ArmModeAluInstruction::Add,
                set_conditions: false,
                rn: 1,
                destination: 2,
                op2: AluSecondOperandInfo::Register(ShiftedRegister {
                    rm: 15,
                    shift_kind: ShiftKind::Lsl,
                    amount: ShiftAmount::Register {
                        rs: 3,
                        reserved_bit: false
                    },
                }),
            }
        );
    }

    #[test]
    fn classification_corpus() {
        let corpus = [
            (0xE283_1001, InstructionClass::DataProcessing),
            (0xE1A0_0001, InstructionClass::DataProcessing),
            (0xE151_0002, InstructionClass::DataProcessing),
            (0xE10F_0000, InstructionClass::PsrTransfer),
            (0xE129_F001, InstructionClass::PsrTransfer),
            (0xE328_F20F, InstructionClass::PsrTransfer),
            (0xE001_0392, InstructionClass::Multiply),
            (0xE021_3392, InstructionClass::Multiply),
            (0xE081_0392, InstructionClass::MultiplyLong),
            (0xE0E1_0392, InstructionClass::MultiplyLong),
            (0xE16F_0F11, InstructionClass::CountLeadingZeros),
            (0xE101_0092, InstructionClass::SingleDataSwap),
            (0xE141_0092, InstructionClass::SingleDataSwap),
            (0xE1D1_00B2, InstructionClass::HalfwordDataTransfer),
            (0xE1D1_00D2, InstructionClass::HalfwordDataTransfer),
            (0xE191_00F2, InstructionClass::HalfwordDataTransfer),
            (0xE591_0004, InstructionClass::SingleDataTransfer),
            (0xE7D1_0002, InstructionClass::SingleDataTransfer),
            (0xE600_0010, InstructionClass::Undefined),
            (0xE8BD_000F, InstructionClass::BlockDataTransfer),
            (0xE92D_4000, InstructionClass::BlockDataTransfer),
            (0xEA00_0010, InstructionClass::Branch),
            (0xEBFF_FFFE, InstructionClass::Branch),
            (0xEF00_0000, InstructionClass::Coprocessor),
            (0xEE00_0100, InstructionClass::Coprocessor),
        ];

        for (op_code, class) in corpus {
            assert_eq!(
                ArmModeInstruction::from(op_code).class(),
                class,
                "0x{op_code:08X}"
            );
        }
    }

    #[test]
    fn swap_wins_over_halfword() {
        // Both masks accept 0xE1010092, swap comes first.
        let op_code = 0xE101_0092;
        assert_eq!(op_code & HALFWORD_MASK, HALFWORD_OPCODE);
        assert_eq!(
            ArmModeInstruction::from(op_code),
            ArmModeInstruction::SingleDataSwap {
                quantity: ReadWriteKind::Word,
                rn: 1,
                rd: 0,
                rm: 2,
            }
        );

        // Same SH=00 pattern with bit 24 clear: the swap mask fails.
        let op_code = 0xE061_0092;
        assert_ne!(op_code & SWAP_MASK, SWAP_OPCODE);
        assert!(matches!(
            ArmModeInstruction::from(op_code),
            ArmModeInstruction::HalfwordDataTransfer {
                transfer_kind: HalfwordTransferKind::Swap,
                ..
            }
        ));
    }

    #[test]
    fn decode_halfword_immediate_offset() {
        // ldrsh r0, [r1, #-0x2A]!
        let op_code = 0xE171_02FA;
        assert_eq!(
            ArmModeInstruction::from(op_code),
            ArmModeInstruction::HalfwordDataTransfer {
                indexing: Indexing::Pre,
                offsetting: Offsetting::Down,
                write_back: true,
                load_store: LoadStoreKind::Load,
                transfer_kind: HalfwordTransferKind::SignedHalfword,
                rn: 1,
                rd: 0,
                offset: HalfwordDataTransferOffsetKind::Immediate { offset: 0x2A },
            }
        );
    }

    #[test]
    fn decode_psr_kinds() {
        assert_eq!(PsrOpKind::from(0xE10F_3000), PsrOpKind::Mrs { rd: 3 });
        assert_eq!(PsrOpKind::from(0xE129_F005), PsrOpKind::Msr { rm: 5 });
        assert_eq!(
            PsrOpKind::from(0xE328_F20F),
            PsrOpKind::MsrFlags {
                operand: MsrSourceOperand::Immediate(0x20F)
            }
        );
        assert_eq!(
            PsrOpKind::from(0xE128_F007),
            PsrOpKind::MsrFlags {
                operand: MsrSourceOperand::Register(7)
            }
        );
        assert_eq!(PsrOpKind::from(0xE100_0000), PsrOpKind::Undefined);
    }

    #[test]
    fn branch_offsets() {
        let forward = ArmModeInstruction::from(0xEA00_0010);
        assert_eq!(
            forward,
            ArmModeInstruction::Branch {
                link: false,
                offset: 0x40
            }
        );
        assert_eq!(forward.branch_offset(8), Some(0x48));

        // b . (offset -8 undoes the prefetch)
        let self_loop = ArmModeInstruction::from(0xEAFF_FFFE);
        assert_eq!(self_loop.branch_offset(8), Some(0));
        assert!(self_loop.is_branch());

        let link = ArmModeInstruction::from(0xEB00_0000);
        assert!(matches!(link, ArmModeInstruction::Branch { link: true, .. }));

        assert_eq!(ArmModeInstruction::from(0xE283_1001).branch_offset(8), None);
    }

    #[test]
    fn decode_block_transfer() {
        // ldmia sp!, {r0-r3}
        assert_eq!(
            ArmModeInstruction::from(0xE8BD_000F),
            ArmModeInstruction::BlockDataTransfer {
                indexing: Indexing::Post,
                offsetting: Offsetting::Up,
                load_psr: false,
                write_back: true,
                load_store: LoadStoreKind::Load,
                rn: 13,
                register_list: 0x000F,
            }
        );
    }

    #[test]
    fn decode_is_total() {
        for _ in 0..10_000 {
            let op_code = rand::random::<u32>();
            let instruction = ArmModeInstruction::from(op_code);
            assert_eq!(instruction.is_branch(), op_code.get_bits(25..=27) == 0b101);
        }
    }
}
