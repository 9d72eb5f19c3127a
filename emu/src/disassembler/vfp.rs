use crate::cpu::condition::Condition;
use crate::cpu::flags::LoadStoreKind;
use crate::cpu::registers::REG_PROGRAM_COUNTER;
use crate::cpu::vfp::instructions::{
    Precision, SystemRegister, VfpAddressing, VfpDataOp, VfpExtensionOp, VfpInstruction,
    VfpTransferOp,
};
use crate::cpu::vfp::registers::NUM_SLOTS;

use super::Writer;

const UNDEFINED_TEXT: &str = "undefined VFP instruction (not emulated)";

/// `s<slot>` or `d<slot / 2>`.
fn register(precision: Precision, slot: usize) -> String {
    match precision {
        Precision::Single => format!("s{slot}"),
        Precision::Double => format!("d{}", slot >> 1),
    }
}

fn mnemonic(w: &mut Writer<'_>, name: &str, condition: Condition) {
    w.push(name);
    w.condition(condition);
    w.tab();
}

pub(super) fn write_instruction(
    w: &mut Writer<'_>,
    condition: Condition,
    instruction: VfpInstruction,
) {
    match instruction {
        VfpInstruction::DataProcessing {
            precision,
            op,
            fd,
            fn_reg,
            fm,
        } => data_processing(w, condition, precision, op, (fd, fn_reg, fm)),
        VfpInstruction::LoadStore {
            precision,
            addressing,
            load_store,
            rn,
            fd,
            offset,
        } => load_store_text(w, condition, precision, addressing, load_store, rn, fd, offset),
        VfpInstruction::RegisterTransfer {
            precision: _,
            op,
            fn_reg,
            rd,
        } => register_transfer(w, condition, op, fn_reg, rd),
    }
}

fn data_processing(
    w: &mut Writer<'_>,
    condition: Condition,
    precision: Precision,
    op: VfpDataOp,
    (fd, fn_reg, fm): (usize, usize, usize),
) {
    let suffix = precision.suffix();
    let d = register(precision, fd);
    let m = register(precision, fm);

    let ext = match op {
        VfpDataOp::Undefined(_) | VfpDataOp::Extension(VfpExtensionOp::Undefined(_)) => {
            w.note("ERROR: undefined VFP data processing instruction");
            w.push(UNDEFINED_TEXT);
            return;
        }
        VfpDataOp::Extension(ext) => ext,
        _ => {
            mnemonic(w, &format!("{op}{suffix}"), condition);
            w.push(&format!("{d}, {}, {m}", register(precision, fn_reg)));
            return;
        }
    };

    match ext {
        VfpExtensionOp::Fcmpz | VfpExtensionOp::Fcmpez => {
            mnemonic(w, &format!("{ext}{suffix}"), condition);
            w.push(&d);
        }
        VfpExtensionOp::Fcvt => match precision {
            Precision::Single => {
                mnemonic(w, "fcvtds", condition);
                w.push(&format!("{}, s{fm}", register(Precision::Double, fd)));
            }
            Precision::Double => {
                mnemonic(w, "fcvtsd", condition);
                w.push(&format!("s{fd}, {}", register(Precision::Double, fm)));
            }
        },
        // Integer operands always sit in a single slot.
        VfpExtensionOp::Fuito | VfpExtensionOp::Fsito => {
            mnemonic(w, &format!("{ext}{suffix}"), condition);
            w.push(&format!("{d}, s{fm}"));
        }
        VfpExtensionOp::Ftoui
        | VfpExtensionOp::Ftouiz
        | VfpExtensionOp::Ftosi
        | VfpExtensionOp::Ftosiz => {
            mnemonic(w, &format!("{ext}{suffix}"), condition);
            w.push(&format!("s{fd}, {m}"));
        }
        _ => {
            mnemonic(w, &format!("{ext}{suffix}"), condition);
            w.push(&format!("{d}, {m}"));
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn load_store_text(
    w: &mut Writer<'_>,
    condition: Condition,
    precision: Precision,
    addressing: VfpAddressing,
    load_store: LoadStoreKind,
    rn: usize,
    fd: usize,
    offset: u32,
) {
    let suffix = precision.suffix();
    let prefix = match load_store {
        LoadStoreKind::Load => "fld",
        LoadStoreKind::Store => "fst",
    };

    let (mode, write_back) = match addressing {
        VfpAddressing::PositiveOffset | VfpAddressing::NegativeOffset => {
            mnemonic(w, &format!("{prefix}{suffix}"), condition);
            w.push(&format!("{}, [r{rn}", register(precision, fd)));

            let mut bytes = (offset * 4) as i32;
            if addressing == VfpAddressing::NegativeOffset {
                bytes = -bytes;
            }
            if rn == REG_PROGRAM_COUNTER {
                bytes += w.config().prefetch() as i32;
            }
            if bytes != 0 {
                w.push(", ");
                w.immediate(bytes);
            }
            w.push("]");
            return;
        }
        VfpAddressing::Unindexed => ("ia", false),
        VfpAddressing::Increment => ("ia", true),
        VfpAddressing::Decrement => ("db", true),
        VfpAddressing::Undefined(_) => {
            w.note("ERROR: undefined VFP addressing mode");
            w.push(UNDEFINED_TEXT);
            return;
        }
    };

    if write_back && rn == REG_PROGRAM_COUNTER {
        w.note("ERROR: write-back to R15 is not allowed");
    }

    mnemonic(w, &format!("{prefix}m{mode}{suffix}"), condition);
    w.push(&format!("r{rn}"));
    if write_back {
        w.push("!");
    }

    let first = match precision {
        Precision::Single => fd,
        Precision::Double => fd & !1,
    };
    let words = offset as usize;
    if first + words > NUM_SLOTS {
        w.note("ERROR: register list runs past the last VFP register");
    }

    let registers = match precision {
        Precision::Single => words,
        Precision::Double => words / 2,
    };
    let step = match precision {
        Precision::Single => 1,
        Precision::Double => 2,
    };
    let list = match registers {
        0 => {
            w.note("ERROR: no registers to load/store");
            String::new()
        }
        1 => register(precision, first),
        n => format!(
            "{}-{}",
            register(precision, first),
            register(precision, first + (n - 1) * step)
        ),
    };
    w.push(&format!(", {{{list}}}"));
}

fn register_transfer(
    w: &mut Writer<'_>,
    condition: Condition,
    op: VfpTransferOp,
    fn_reg: usize,
    rd: usize,
) {
    let system = SystemRegister::from(fn_reg);

    if op == VfpTransferOp::Fmrx && rd == REG_PROGRAM_COUNTER {
        if system != SystemRegister::Fpscr {
            w.note("ERROR: only FPSCR can be moved to the CPSR flags");
        }
        w.push("fmstat");
        w.condition(condition);
        return;
    }

    if rd == REG_PROGRAM_COUNTER {
        w.note("ERROR: R15 cannot be used for a VFP register transfer");
    }
    if matches!(op, VfpTransferOp::Fmxr | VfpTransferOp::Fmrx)
        && matches!(system, SystemRegister::Unknown(_))
    {
        w.note("ERROR: unknown VFP system register");
    }

    let double = register(Precision::Double, fn_reg);
    let operands = match op {
        VfpTransferOp::Fmsr => format!("s{fn_reg}, r{rd}"),
        VfpTransferOp::Fmrs => format!("r{rd}, s{fn_reg}"),
        VfpTransferOp::Fmxr => format!("{system}, r{rd}"),
        VfpTransferOp::Fmrx => format!("r{rd}, {system}"),
        VfpTransferOp::Fmdlr | VfpTransferOp::Fmdhr => format!("{double}, r{rd}"),
        VfpTransferOp::Fmrdl | VfpTransferOp::Fmrdh => format!("r{rd}, {double}"),
        VfpTransferOp::Undefined(_) => {
            w.note("ERROR: undefined VFP register transfer");
            w.push(UNDEFINED_TEXT);
            return;
        }
    };

    mnemonic(w, &op.to_string(), condition);
    w.push(&operands);
}
