//! # Disassembler
//!
//! Renders one instruction word as text plus a list of notes. Notes
//! describe encodings the emulator would refuse to execute; decoding never
//! fails, whatever the word.
//!
//! ```text
//! 0xE0010291  →  "mul     r1, r1, r2"
//!                "ERROR: source register Rm cannot be the same as the destination"
//! ```
//!
//! The mnemonic (with condition and S suffix) is padded to column 8.

mod listing;
#[cfg(feature = "vfp")]
mod vfp;

use serde::{Deserialize, Serialize};

pub use listing::disassemble_listing;

use crate::config::DisassemblerConfig;
use crate::cpu::arm::alu_instruction::{ArmModeAluInstruction, immediate_operand};
use crate::cpu::arm::instructions::{
    AluSecondOperandInfo, ArmModeInstruction, ArmModeMultiplyLongVariant, ArmModeMultiplyVariant,
    HalfwordDataTransferOffsetKind, HalfwordTransferKind, InstructionClass, MsrSourceOperand,
    PsrOpKind, ShiftAmount, ShiftedRegister, SingleDataTransferOffsetInfo,
};
use crate::cpu::condition::Condition;
use crate::cpu::flags::{Indexing, LoadStoreKind, Offsetting, ReadWriteKind, ShiftKind};
use crate::cpu::registers::REG_PROGRAM_COUNTER;

const MNEMONIC_COLUMN: usize = 8;

/// Text of one decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disassembly {
    pub text: String,

    /// Warnings and errors, separated by a single space. Empty for a
    /// well formed instruction.
    pub notes: String,

    pub class: InstructionClass,
}

/// Stateless apart from its configuration, so one instance can be shared
/// by reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disassembler {
    config: DisassemblerConfig,
}

/// Builds the text and notes of a single instruction.
pub(crate) struct Writer<'a> {
    config: &'a DisassemblerConfig,
    text: String,
    notes: Vec<String>,
}

impl<'a> Writer<'a> {
    const fn new(config: &'a DisassemblerConfig) -> Self {
        Self {
            config,
            text: String::new(),
            notes: Vec::new(),
        }
    }

    pub(crate) const fn config(&self) -> &DisassemblerConfig {
        self.config
    }

    pub(crate) fn push(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn note(&mut self, note: &str) {
        self.notes.push(note.to_owned());
    }

    pub(crate) fn condition(&mut self, condition: Condition) {
        self.text.push_str(&condition.to_string());
        if condition == Condition::NV {
            self.note("condition code NV should never be used (ARM7).");
        }
    }

    /// Pads the mnemonic out to the operand column.
    pub(crate) fn tab(&mut self) {
        while self.text.len() < MNEMONIC_COLUMN {
            self.text.push(' ');
        }
    }

    pub(crate) fn immediate(&mut self, value: i32) {
        let text = if self.config.hex_immediates {
            format!("#0x{value:08x}")
        } else {
            format!("#{value}")
        };
        self.text.push_str(&text);
    }

    fn finish(self, class: InstructionClass) -> Disassembly {
        Disassembly {
            text: self.text,
            notes: self.notes.join(" "),
            class,
        }
    }
}

impl Disassembler {
    #[must_use]
    pub const fn new(config: DisassemblerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &DisassemblerConfig {
        &self.config
    }

    #[must_use]
    pub fn decode(&self, op_code: u32) -> Disassembly {
        let instruction = ArmModeInstruction::from(op_code);
        let condition = Condition::of_instruction(op_code);
        let mut w = Writer::new(&self.config);

        match instruction {
            ArmModeInstruction::DataProcessing {
                alu_instruction,
                set_conditions,
                rn,
                destination,
                op2,
            } => data_processing(
                &mut w,
                condition,
                alu_instruction,
                set_conditions,
                rn,
                destination,
                op2,
            ),
            ArmModeInstruction::PsrTransfer { spsr, kind } => {
                psr_transfer(&mut w, condition, spsr, kind);
            }
            ArmModeInstruction::Multiply {
                variant,
                set_conditions,
                rd,
                rn,
                rs,
                rm,
            } => multiply(&mut w, condition, variant, set_conditions, [rd, rn, rs, rm]),
            ArmModeInstruction::MultiplyLong {
                variant,
                set_conditions,
                rd_hi,
                rd_lo,
                rs,
                rm,
            } => multiply_long(&mut w, condition, variant, set_conditions, [rd_hi, rd_lo, rs, rm]),
            ArmModeInstruction::CountLeadingZeros { rd, rm } => {
                if rd == REG_PROGRAM_COUNTER || rm == REG_PROGRAM_COUNTER {
                    w.note("ERROR: R15 cannot be used as an operand for clz");
                }
                w.push("clz");
                w.condition(condition);
                w.tab();
                w.push(&format!("r{rd}, r{rm}"));
            }
            ArmModeInstruction::SingleDataSwap {
                quantity,
                rn,
                rd,
                rm,
            } => {
                if [rn, rd, rm].contains(&REG_PROGRAM_COUNTER) {
                    w.note("ERROR: R15 cannot be used as an operand for swap");
                }
                w.push("swp");
                w.condition(condition);
                if quantity == ReadWriteKind::Byte {
                    w.push("b");
                }
                w.tab();
                w.push(&format!("r{rd}, r{rm}, [r{rn}]"));
            }
            ArmModeInstruction::HalfwordDataTransfer {
                indexing,
                offsetting,
                write_back,
                load_store,
                transfer_kind,
                rn,
                rd,
                offset,
            } => halfword_transfer(
                &mut w,
                condition,
                (indexing, offsetting, write_back, load_store),
                transfer_kind,
                rn,
                rd,
                offset,
            ),
            ArmModeInstruction::SingleDataTransfer {
                indexing,
                offsetting,
                quantity,
                write_back,
                load_store,
                rn,
                rd,
                offset,
            } => single_transfer(
                &mut w,
                condition,
                (indexing, offsetting, write_back, load_store),
                quantity,
                rn,
                rd,
                offset,
            ),
            ArmModeInstruction::BlockDataTransfer {
                indexing,
                offsetting,
                load_psr,
                write_back,
                load_store,
                rn,
                register_list,
            } => block_transfer(
                &mut w,
                condition,
                (indexing, offsetting, write_back, load_store),
                load_psr,
                rn,
                register_list,
            ),
            ArmModeInstruction::Branch { link, .. } => {
                w.push(if link { "bl" } else { "b" });
                w.condition(condition);
                w.tab();
            }
            ArmModeInstruction::Undefined => w.push("undefined instruction (not emulated)"),
            ArmModeInstruction::Coprocessor => w.push("coprocessor or SWI (not emulated)"),
            #[cfg(feature = "vfp")]
            ArmModeInstruction::Vfp(vfp_instruction) => {
                vfp::write_instruction(&mut w, condition, vfp_instruction);
            }
        }

        w.finish(instruction.class())
    }
}

type TransferBits = (Indexing, Offsetting, bool, LoadStoreKind);

fn data_processing(
    w: &mut Writer<'_>,
    condition: Condition,
    alu_instruction: ArmModeAluInstruction,
    set_conditions: bool,
    rn: usize,
    rd: usize,
    op2: AluSecondOperandInfo,
) {
    w.push(&alu_instruction.to_string());
    w.condition(condition);

    if alu_instruction.is_test() {
        if !set_conditions {
            w.note("warning: S-bit must always be set for this instruction");
        }
    } else if set_conditions {
        w.push("s");
        if rd == REG_PROGRAM_COUNTER {
            w.note("ERROR: S bit with R15 as destination is not allowed in user mode");
        }
    }
    w.tab();

    if alu_instruction.is_test() {
        w.push(&format!("r{rn}, "));
    } else if alu_instruction.is_move() {
        w.push(&format!("r{rd}, "));
    } else {
        w.push(&format!("r{rd}, r{rn}, "));
    }

    match op2 {
        AluSecondOperandInfo::Immediate { base, rotate } => {
            w.immediate(base.rotate_right(rotate * 2) as i32);
        }
        AluSecondOperandInfo::Register(operand) => shifted_register(w, operand),
    }
}

fn shift_name(kind: ShiftKind) -> &'static str {
    match kind {
        ShiftKind::Lsl => "lsl",
        ShiftKind::Lsr => "lsr",
        ShiftKind::Asr => "asr",
        ShiftKind::Ror => "ror",
    }
}

fn shifted_register(w: &mut Writer<'_>, operand: ShiftedRegister) {
    w.push(&format!("r{}", operand.rm));
    let name = shift_name(operand.shift_kind);

    match operand.amount {
        ShiftAmount::Register { rs, reserved_bit } => {
            if rs == REG_PROGRAM_COUNTER {
                w.note("ERROR: shift register cannot be R15");
            }
            if reserved_bit {
                w.note("ERROR: bit 7 of the instruction should be clear");
            }
            w.push(&format!(", {name} r{rs}"));
        }
        ShiftAmount::Immediate(amount) => match (operand.shift_kind, amount) {
            (ShiftKind::Lsl, 0) => {}
            // ROR #0 encodes RRX, LSR #0 and ASR #0 encode a shift by 32.
            (ShiftKind::Ror, 0) => w.push(", rrx"),
            (_, amount) => {
                let amount = if amount == 0 { 32 } else { amount };
                w.push(&format!(", {name} "));
                w.immediate(amount as i32);
            }
        },
    }
}

fn psr_transfer(w: &mut Writer<'_>, condition: Condition, spsr: bool, kind: PsrOpKind) {
    const R15_NOTE: &str = "ERROR: R15 (PC) cannot be used for this instruction";

    if spsr {
        w.note("warning: in the user mode the destination must always be CPSR");
    }

    match kind {
        PsrOpKind::Mrs { rd } => {
            if rd == REG_PROGRAM_COUNTER {
                w.note(R15_NOTE);
            }
            w.push("mrs");
            w.condition(condition);
            w.tab();
            w.push(&format!("r{rd}, CPSR"));
        }
        PsrOpKind::Msr { rm } => {
            if rm == REG_PROGRAM_COUNTER {
                w.note(R15_NOTE);
            }
            w.push("msr");
            w.condition(condition);
            w.tab();
            w.push(&format!("CPSR_flg, r{rm}"));
        }
        PsrOpKind::MsrFlags { operand } => {
            w.push("msr");
            w.condition(condition);
            w.tab();
            w.push("CPSR_flg, ");
            match operand {
                MsrSourceOperand::Immediate(op2) => w.immediate(immediate_operand(op2) as i32),
                MsrSourceOperand::Register(rm) => {
                    if rm == REG_PROGRAM_COUNTER {
                        w.note(R15_NOTE);
                    }
                    w.push(&format!("r{rm}"));
                }
            }
        }
        PsrOpKind::Undefined => w.note("ERROR: undefined PSR transfer instruction"),
    }
}

fn multiply(
    w: &mut Writer<'_>,
    condition: Condition,
    variant: ArmModeMultiplyVariant,
    set_conditions: bool,
    [rd, rn, rs, rm]: [usize; 4],
) {
    if rm == rd {
        w.note("ERROR: source register Rm cannot be the same as the destination");
    }
    if [rd, rn, rs, rm].contains(&REG_PROGRAM_COUNTER) {
        w.note("ERROR: R15 cannot be used");
    }

    w.push(&variant.to_string());
    w.condition(condition);
    if set_conditions {
        w.push("s");
    }
    w.tab();

    match variant {
        ArmModeMultiplyVariant::Mla => w.push(&format!("r{rd}, r{rm}, r{rs}, r{rn}")),
        ArmModeMultiplyVariant::Mul => {
            w.push(&format!("r{rd}, r{rm}, r{rs}"));
            if rn != 0 {
                w.note("ERROR: for MUL Rn should be zero for upwards compatibility (v4)");
            }
        }
    }
}

fn multiply_long(
    w: &mut Writer<'_>,
    condition: Condition,
    variant: ArmModeMultiplyLongVariant,
    set_conditions: bool,
    [rd_hi, rd_lo, rs, rm]: [usize; 4],
) {
    if rm == rd_lo || rm == rd_hi {
        w.note("ERROR: source register Rm cannot be the same as the destination");
    }
    if rd_lo == rd_hi {
        w.note("ERROR: RdHi and RdLo must be different registers");
    }
    if [rd_hi, rd_lo, rs, rm].contains(&REG_PROGRAM_COUNTER) {
        w.note("ERROR: R15 cannot be used");
    }

    w.push(&variant.to_string());
    w.condition(condition);
    if set_conditions {
        w.push("s");
    }
    w.tab();
    w.push(&format!("r{rd_lo}, r{rd_hi}, r{rm}, r{rs}"));
}

/// Signed byte offset as printed, R15 bases include the prefetch.
fn printed_offset(w: &Writer<'_>, offsetting: Offsetting, rn: usize, offset: u32) -> i32 {
    let mut offset = offset as i32;
    if offsetting == Offsetting::Down {
        offset = -offset;
    }
    if rn == REG_PROGRAM_COUNTER {
        offset += w.config().prefetch() as i32;
    }
    offset
}

fn single_transfer(
    w: &mut Writer<'_>,
    condition: Condition,
    (indexing, offsetting, write_back, load_store): TransferBits,
    quantity: ReadWriteKind,
    rn: usize,
    rd: usize,
    offset: SingleDataTransferOffsetInfo,
) {
    w.push(match load_store {
        LoadStoreKind::Load => "ldr",
        LoadStoreKind::Store => "str",
    });
    w.condition(condition);
    if quantity == ReadWriteKind::Byte {
        w.push("b");
    }
    if indexing == Indexing::Post && write_back {
        w.push("t");
        w.note(
            "warning: write-back specified with postindexing (forces nonprivileged mode transfer)",
        );
    }
    w.tab();
    w.push(&format!("r{rd}, [r{rn}"));

    let sign = if offsetting == Offsetting::Down { "-" } else { "" };

    match offset {
        SingleDataTransferOffsetInfo::Register(operand) => {
            if operand.shift_by_register() {
                w.note("ERROR: shift cannot be specified as a register");
            }
            if operand.rm == REG_PROGRAM_COUNTER {
                w.note("ERROR: R15 cannot be used as the offset register");
            }

            match indexing {
                Indexing::Pre => {
                    w.push(&format!(", {sign}"));
                    shifted_register(w, operand);
                    w.push(if write_back { "]!" } else { "]" });
                }
                Indexing::Post => {
                    w.push(&format!("], {sign}"));
                    shifted_register(w, operand);
                }
            }
        }
        SingleDataTransferOffsetInfo::Immediate { offset } => {
            let offset = printed_offset(w, offsetting, rn, offset);
            immediate_offset(w, indexing, write_back, rn, offset);
        }
    }
}

fn immediate_offset(
    w: &mut Writer<'_>,
    indexing: Indexing,
    write_back: bool,
    rn: usize,
    offset: i32,
) {
    match indexing {
        Indexing::Pre if offset != 0 => {
            w.push(", ");
            w.immediate(offset);
            w.push("]");
            if write_back {
                w.push("!");
                if rn == REG_PROGRAM_COUNTER {
                    w.note("ERROR: write-back to R15 is not allowed");
                }
            }
        }
        Indexing::Pre => w.push("]"),
        Indexing::Post => {
            w.push("]");
            if offset != 0 {
                w.push(", ");
                w.immediate(offset);
            }
        }
    }
}

fn halfword_transfer(
    w: &mut Writer<'_>,
    condition: Condition,
    (indexing, offsetting, write_back, load_store): TransferBits,
    transfer_kind: HalfwordTransferKind,
    rn: usize,
    rd: usize,
    offset: HalfwordDataTransferOffsetKind,
) {
    if transfer_kind == HalfwordTransferKind::Swap {
        w.note("ERROR: SWP instruction specified instead of halfword and signed data transfer");
    }

    w.push(match load_store {
        LoadStoreKind::Load => "ldr",
        LoadStoreKind::Store => "str",
    });
    w.condition(condition);

    let store = load_store == LoadStoreKind::Store;
    if transfer_kind.is_signed() {
        w.push("s");
    }
    if transfer_kind.is_halfword() {
        if store && transfer_kind.is_signed() {
            w.note("ERROR: signed halfword store does not exist");
        }
        w.push("h");
    } else {
        if !transfer_kind.is_signed() {
            w.note("ERROR: unsigned byte store should not use halfword and signed transfer");
        }
        if store && transfer_kind.is_signed() {
            w.note("ERROR: signed byte store does not exist");
        }
        w.push("b");
    }

    if indexing == Indexing::Post && write_back {
        w.note("ERROR: write-back specified with postindexing in halfword and signed transfer");
    }

    w.tab();
    w.push(&format!("r{rd}, [r{rn}"));

    match offset {
        HalfwordDataTransferOffsetKind::Register { rm } => {
            if rm == REG_PROGRAM_COUNTER {
                w.note("ERROR: R15 cannot be used as the offset register");
            }
            let sign = if offsetting == Offsetting::Down { "-" } else { "" };
            match indexing {
                Indexing::Pre => {
                    w.push(&format!(", {sign}r{rm}]"));
                    if write_back {
                        w.push("!");
                    }
                }
                Indexing::Post => w.push(&format!("], {sign}r{rm}")),
            }
        }
        HalfwordDataTransferOffsetKind::Immediate { offset } => {
            let offset = printed_offset(w, offsetting, rn, offset);
            immediate_offset(w, indexing, write_back, rn, offset);
        }
    }
}

fn block_transfer(
    w: &mut Writer<'_>,
    condition: Condition,
    (indexing, offsetting, write_back, load_store): TransferBits,
    load_psr: bool,
    rn: usize,
    register_list: u16,
) {
    use crate::bitwise::Bits;

    if load_psr {
        w.note("warning: S-bit can only be used in a privileged mode");
    }
    if rn == REG_PROGRAM_COUNTER {
        w.note("ERROR: R15 cannot be used as the base register");
    }
    if load_store == LoadStoreKind::Store {
        if register_list.get_bit(15) {
            w.note("ERROR: STM of R15 is not emulated");
        }
        if write_back && register_list.get_bit(rn as u8) {
            w.note("ERROR: STM with write-back cannot store its own base");
        }
    }

    w.push(match load_store {
        LoadStoreKind::Load => "ldm",
        LoadStoreKind::Store => "stm",
    });
    w.condition(condition);
    w.push(match offsetting {
        Offsetting::Up => "i",
        Offsetting::Down => "d",
    });
    w.push(match indexing {
        Indexing::Pre => "b",
        Indexing::Post => "a",
    });
    w.tab();
    w.push(&format!("r{rn}"));
    if write_back {
        w.push("!");
    }

    let registers = (0..16_u8)
        .filter(|&reg| register_list.get_bit(reg))
        .map(|reg| format!("r{reg}"))
        .collect::<Vec<_>>();
    if registers.is_empty() {
        w.note("ERROR: no registers to load/store");
    }
    w.push(&format!(", {{{}}}", registers.join(", ")));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Processor;
    use pretty_assertions::assert_eq;

    fn decode(op_code: u32) -> Disassembly {
        Disassembler::default().decode(op_code)
    }

    fn decode_hex(op_code: u32) -> Disassembly {
        Disassembler::new(DisassemblerConfig {
            hex_immediates: true,
            ..Default::default()
        })
        .decode(op_code)
    }

    #[test]
    fn add_smoke_test() {
        let disassembly = decode(0xE283_1001);
        assert_eq!(disassembly.text, "add     r1, r3, #1");
        assert_eq!(disassembly.notes, "");
        assert_eq!(disassembly.class, InstructionClass::DataProcessing);

        let text = decode_hex(0xE283_1001).text;
        assert!(text.contains("add"));
        assert!(text.contains("r1"));
        assert!(text.contains("r3"));
        assert!(text.ends_with("#0x00000001"));
    }

    #[test]
    fn data_processing_forms() {
        assert_eq!(decode(0xE1A0_0001).text, "mov     r0, r1");
        assert_eq!(decode(0xE150_0001).text, "cmp     r0, r1");
        assert_eq!(decode(0x10B0_2001).text, "adcnes  r2, r0, r1");
        assert_eq!(decode(0xE1B0_00A1).text, "movs    r0, r1, lsr #1");
        assert_eq!(decode(0xE1A0_0021).text, "mov     r0, r1, lsr #32");
        assert_eq!(decode(0xE1A0_0061).text, "mov     r0, r1, rrx");
        assert_eq!(decode(0xE081_2413).text, "add     r2, r1, r3, lsl r4");
        assert_eq!(decode(0xE3A0_0102).text, "mov     r0, #-2147483648");
        assert_eq!(decode_hex(0xE3A0_0102).text, "mov     r0, #0x80000000");
    }

    #[test]
    fn register_shift_notes() {
        // add r2, r1, r0, lsl r15
        let disassembly = decode(0b1110_00_0_0100_0_0001_0010_1111_0001_0000);
        assert_eq!(disassembly.notes, "ERROR: shift register cannot be R15");

        assert_eq!(
            decode(0xE1B0_F00E).notes,
            "ERROR: S bit with R15 as destination is not allowed in user mode"
        );
    }

    #[test]
    fn nv_condition_is_noted() {
        let disassembly = decode(0xF283_1001);
        assert_eq!(disassembly.text, "addnv   r1, r3, #1");
        assert_eq!(
            disassembly.notes,
            "condition code NV should never be used (ARM7)."
        );
    }

    #[test]
    fn multiply_restrictions_are_noted() {
        // mul r1, r1, r2
        let disassembly = decode(0xE001_0291);
        assert_eq!(disassembly.text, "mul     r1, r1, r2");
        assert_eq!(
            disassembly.notes,
            "ERROR: source register Rm cannot be the same as the destination"
        );

        // mul r0, r15, r2 with Rn = 3
        let disassembly = decode(0xE000_329F);
        assert_eq!(
            disassembly.notes,
            "ERROR: R15 cannot be used ERROR: for MUL Rn should be zero for upwards compatibility (v4)"
        );

        assert_eq!(decode(0xE020_3291).text, "mla     r0, r1, r2, r3");
        assert_eq!(decode(0xE0F1_0392).text, "smlals  r0, r1, r2, r3");
        assert_eq!(decode(0xE081_0392).notes, "");
    }

    #[test]
    fn psr_transfers() {
        assert_eq!(decode(0xE10F_3000).text, "mrs     r3, CPSR");
        assert_eq!(decode(0xE129_F005).text, "msr     CPSR_flg, r5");
        assert_eq!(
            decode_hex(0xE328_F20F).text,
            "msr     CPSR_flg, #0xf0000000"
        );

        let disassembly = decode(0xE14F_3000);
        assert_eq!(
            disassembly.notes,
            "warning: in the user mode the destination must always be CPSR"
        );

        let disassembly = decode(0xE100_0000);
        assert_eq!(disassembly.text, "");
        assert_eq!(disassembly.notes, "ERROR: undefined PSR transfer instruction");
    }

    #[test]
    fn single_data_transfers() {
        assert_eq!(decode(0xE581_0004).text, "str     r0, [r1, #4]");
        assert_eq!(decode(0xE5B1_2004).text, "ldr     r2, [r1, #4]!");
        assert_eq!(decode(0xE411_3004).text, "ldr     r3, [r1], #-4");
        assert_eq!(decode(0xE591_0000).text, "ldr     r0, [r1]");
        assert_eq!(decode(0xE7D1_4105).text, "ldrb    r4, [r1, r5, lsl #2]");
        assert_eq!(decode(0xE59F_0004).text, "ldr     r0, [r15, #12]");

        let disassembly = decode(0xE4B1_3004);
        assert_eq!(disassembly.text, "ldrt    r3, [r1], #4");
        assert_eq!(
            disassembly.notes,
            "warning: write-back specified with postindexing (forces nonprivileged mode transfer)"
        );
    }

    #[test]
    fn halfword_transfers() {
        assert_eq!(decode(0xE1C1_00B2).text, "strh    r0, [r1, #2]");
        assert_eq!(decode(0xE1D1_20F2).text, "ldrsh   r2, [r1, #2]");
        assert_eq!(decode(0xE191_40D5).text, "ldrsb   r4, [r1, r5]");
        assert_eq!(decode(0xE0D1_30B2).text, "ldrh    r3, [r1], #2");
        assert_eq!(decode(0xE171_02FA).text, "ldrsh   r0, [r1, #-42]!");

        assert_eq!(
            decode(0xE1C1_00F2).notes,
            "ERROR: signed halfword store does not exist"
        );
        assert_eq!(
            decode(0xE1C1_0092).notes,
            "ERROR: SWP instruction specified instead of halfword and signed data transfer \
             ERROR: unsigned byte store should not use halfword and signed transfer"
        );
    }

    #[test]
    fn block_transfers() {
        assert_eq!(decode(0xE92D_000F).text, "stmdb   r13!, {r0, r1, r2, r3}");
        assert_eq!(decode(0xE8BD_8000).text, "ldmia   r13!, {r15}");
        assert_eq!(decode(0xE810_0006).text, "ldmda   r0, {r1, r2}");

        let disassembly = decode(0xE8A0_0000);
        assert_eq!(disassembly.notes, "ERROR: no registers to load/store");

        assert_eq!(
            decode(0xE8A0_0003).notes,
            "ERROR: STM with write-back cannot store its own base"
        );
    }

    #[test]
    fn swap_clz_and_branches() {
        assert_eq!(decode(0xE102_0091).text, "swp     r0, r1, [r2]");
        assert_eq!(decode(0xE142_0091).text, "swpb    r0, r1, [r2]");
        assert_eq!(
            decode(0xE10F_0091).notes,
            "ERROR: R15 cannot be used as an operand for swap"
        );

        assert_eq!(decode(0xE16F_0F11).text, "clz     r0, r1");
        assert_eq!(
            decode(0xE16F_FF1F).notes,
            "ERROR: R15 cannot be used as an operand for clz"
        );

        assert_eq!(decode(0xEA00_0010).text, "b       ");
        assert_eq!(decode(0x0B00_0010).text, "bleq    ");
    }

    #[test]
    fn not_emulated_classes() {
        assert_eq!(
            decode(0xE600_0010).text,
            "undefined instruction (not emulated)"
        );
        assert_eq!(
            decode(0xEF00_0000).text,
            "coprocessor or SWI (not emulated)"
        );
    }

    #[test]
    fn processor_does_not_change_text() {
        let arm8 = Disassembler::new(DisassemblerConfig {
            processor: Processor::Arm8,
            ..Default::default()
        });
        assert_eq!(arm8.decode(0xE283_1001), decode(0xE283_1001));
        assert_eq!(arm8.config().processor, Processor::Arm8);
    }

    #[test]
    fn decoding_is_total() {
        let disassembler = Disassembler::default();
        for _ in 0..10_000 {
            let op_code = rand::random::<u32>();
            let disassembly = disassembler.decode(op_code);
            assert_eq!(
                disassembly.class,
                ArmModeInstruction::from(op_code).class()
            );
        }
    }
}
