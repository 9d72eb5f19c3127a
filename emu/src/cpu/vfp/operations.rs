use std::cmp::Ordering;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::cpu::emulator::{Emulator, Flow};
use crate::cpu::flags::LoadStoreKind;
use crate::cpu::registers::REG_PROGRAM_COUNTER;
use crate::cpu::vfp::instructions::{
    Precision, SystemRegister, VfpAddressing, VfpDataOp, VfpExtensionOp, VfpInstruction,
    VfpTransferOp,
};
use crate::cpu::vfp::registers::BANK_SIZE;

const FLAG_N: u32 = 0x8000_0000;
const FLAG_Z: u32 = 0x4000_0000;
const FLAG_C: u32 = 0x2000_0000;
const FLAG_V: u32 = 0x1000_0000;

trait VfpFloat:
    Copy
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    fn sqrt(self) -> Self;
    fn abs(self) -> Self;
}

macro_rules! impl_vfp_float {
    ($($float:ty),*) => {
        $(
            impl VfpFloat for $float {
                fn sqrt(self) -> Self {
                    <$float>::sqrt(self)
                }

                fn abs(self) -> Self {
                    <$float>::abs(self)
                }
            }
        )*
    };
}

impl_vfp_float!(f32, f64);

fn arithmetic<T: VfpFloat>(op: VfpDataOp, d: T, n: T, m: T) -> T {
    match op {
        VfpDataOp::Fmac => d + n * m,
        VfpDataOp::Fnmac => d - n * m,
        VfpDataOp::Fmsc => -d + n * m,
        VfpDataOp::Fnmsc => -d - n * m,
        VfpDataOp::Fmul => n * m,
        VfpDataOp::Fnmul => -(n * m),
        VfpDataOp::Fadd => n + m,
        VfpDataOp::Fsub => n - m,
        VfpDataOp::Fdiv => n / m,
        VfpDataOp::Extension(VfpExtensionOp::Fcpy) => m,
        VfpDataOp::Extension(VfpExtensionOp::Fabs) => m.abs(),
        VfpDataOp::Extension(VfpExtensionOp::Fneg) => -m,
        VfpDataOp::Extension(VfpExtensionOp::Fsqrt) => m.sqrt(),
        VfpDataOp::Extension(_) | VfpDataOp::Undefined(_) => {
            unreachable!("{op} is not an arithmetic operation")
        }
    }
}

/// FPSCR N, Z, C, V for `a` compared with `b`.
fn compare_flags<T: PartialOrd>(a: T, b: T) -> u32 {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => FLAG_N,
        Some(Ordering::Equal) => FLAG_Z | FLAG_C,
        Some(Ordering::Greater) => FLAG_C,
        None => FLAG_C | FLAG_V,
    }
}

/// Next register of a short vector, wrapping inside its bank.
const fn next_in_bank(index: usize, step: usize) -> usize {
    (index & !(BANK_SIZE - 1)) | ((index + step) & (BANK_SIZE - 1))
}

/// `(fd, fn, fm)` slots visited by one data processing instruction, in
/// order. Fn is not a register for extension ops, and an fm in bank 0 is a
/// scalar reused by every element.
fn vector_indices(
    length: usize,
    step: usize,
    extension: bool,
    first: (usize, usize, usize),
) -> Vec<(usize, usize, usize)> {
    std::iter::successors(Some(first), |&(fd, fn_reg, fm)| {
        let fn_reg = if extension { fn_reg } else { next_in_bank(fn_reg, step) };
        let fm = if fm >= BANK_SIZE { next_in_bank(fm, step) } else { fm };
        Some((next_in_bank(fd, step), fn_reg, fm))
    })
    .take(length)
    .collect()
}

const fn words_of(precision: Precision) -> u32 {
    match precision {
        Precision::Single => 1,
        Precision::Double => 2,
    }
}

impl Emulator {
    pub(crate) fn execute_vfp(&mut self, instruction: VfpInstruction) -> Flow {
        match instruction {
            VfpInstruction::DataProcessing {
                precision,
                op,
                fd,
                fn_reg,
                fm,
            } => self.vfp_data_processing(precision, op, fd, fn_reg, fm),
            VfpInstruction::LoadStore {
                precision,
                addressing,
                load_store,
                rn,
                fd,
                offset,
            } => self.vfp_load_store(precision, addressing, load_store, rn, fd, offset),
            VfpInstruction::RegisterTransfer {
                precision: _,
                op,
                fn_reg,
                rd,
            } => self.vfp_register_transfer(op, fn_reg, rd),
        }

        Flow::Continue
    }

    /// Runs `op` over a short vector when FPSCR LEN is above one and the
    /// destination is outside bank 0. An `fm` in bank 0 stays scalar.
    fn vfp_data_processing(
        &mut self,
        precision: Precision,
        op: VfpDataOp,
        fd: usize,
        fn_reg: usize,
        fm: usize,
    ) {
        let extension = match op {
            VfpDataOp::Undefined(opcode) => {
                panic!("undefined VFP data processing opcode {opcode}")
            }
            VfpDataOp::Extension(VfpExtensionOp::Undefined(selector)) => {
                panic!("undefined VFP extension operation {selector}")
            }
            VfpDataOp::Extension(ext) => Some(ext),
            _ => None,
        };

        let vectorizable = extension.is_none_or(VfpExtensionOp::is_vectorizable);
        let length = if vectorizable && fd >= BANK_SIZE {
            self.vfp.vector_length()
        } else {
            1
        };
        let step = self.vfp.vector_stride() * words_of(precision) as usize;

        for (fd, fn_reg, fm) in
            vector_indices(length, step, extension.is_some(), (fd, fn_reg, fm))
        {
            match extension {
                Some(ext) if !ext.is_vectorizable() => {
                    self.vfp_scalar_extension(precision, ext, fd, fm);
                }
                _ => self.vfp_arithmetic(precision, op, fd, fn_reg, fm),
            }
        }
    }

    fn vfp_arithmetic(
        &mut self,
        precision: Precision,
        op: VfpDataOp,
        fd: usize,
        fn_reg: usize,
        fm: usize,
    ) {
        match precision {
            Precision::Single => {
                let result = arithmetic(
                    op,
                    self.vfp.single(fd),
                    self.vfp.single(fn_reg),
                    self.vfp.single(fm),
                );
                self.vfp.set_single(fd, result);
            }
            Precision::Double => {
                let result = arithmetic(
                    op,
                    self.vfp.double(fd),
                    self.vfp.double(fn_reg),
                    self.vfp.double(fm),
                );
                self.vfp.set_double(fd, result);
            }
        }
    }

    /// Compares and conversions. These never take part in a short vector.
    fn vfp_scalar_extension(
        &mut self,
        precision: Precision,
        ext: VfpExtensionOp,
        fd: usize,
        fm: usize,
    ) {
        use VfpExtensionOp::{
            Fcmp, Fcmpe, Fcmpez, Fcmpz, Fcvt, Fsito, Ftosi, Ftosiz, Ftoui, Ftouiz, Fuito,
        };

        match ext {
            Fcmp | Fcmpe | Fcmpz | Fcmpez => {
                let against_zero = matches!(ext, Fcmpz | Fcmpez);
                let flags = match precision {
                    Precision::Single => {
                        let m = if against_zero { 0.0 } else { self.vfp.single(fm) };
                        compare_flags(self.vfp.single(fd), m)
                    }
                    Precision::Double => {
                        let m = if against_zero { 0.0 } else { self.vfp.double(fm) };
                        compare_flags(self.vfp.double(fd), m)
                    }
                };
                self.vfp.set_compare_flags(flags);
            }
            Fcvt => match precision {
                Precision::Single => {
                    let value = f64::from(self.vfp.single(fm));
                    self.vfp.set_double(fd, value);
                }
                Precision::Double => {
                    let value = self.vfp.double(fm) as f32;
                    self.vfp.set_single(fd, value);
                }
            },
            Fuito | Fsito => {
                let raw = self.vfp.slot(fm);
                let value = if ext == Fsito {
                    f64::from(raw as i32)
                } else {
                    f64::from(raw)
                };
                match precision {
                    Precision::Single => self.vfp.set_single(fd, value as f32),
                    Precision::Double => self.vfp.set_double(fd, value),
                }
            }
            Ftoui | Ftouiz | Ftosi | Ftosiz => {
                let value = match precision {
                    Precision::Single => f64::from(self.vfp.single(fm)),
                    Precision::Double => self.vfp.double(fm),
                };
                let value = if matches!(ext, Ftoui | Ftosi) {
                    value.round()
                } else {
                    value.trunc()
                };
                // Out of range values saturate, NaN becomes 0.
                let raw = if matches!(ext, Ftoui | Ftouiz) {
                    value as u32
                } else {
                    value as i32 as u32
                };
                self.vfp.set_slot(fd, raw);
            }
            _ => unreachable!("{ext} is a vector operation"),
        }
    }

    fn vfp_load_store(
        &mut self,
        precision: Precision,
        addressing: VfpAddressing,
        load_store: LoadStoreKind,
        rn: usize,
        fd: usize,
        offset: u32,
    ) {
        let base = self.operand_register(rn, self.config.prefetch());
        let bytes = offset * 4;
        let first = match precision {
            Precision::Single => fd,
            Precision::Double => fd & !1,
        };

        match addressing {
            VfpAddressing::Unindexed => {
                self.vfp_transfer_words(load_store, base, first, offset);
            }
            VfpAddressing::Increment => {
                self.vfp_transfer_words(load_store, base, first, offset);
                self.vfp_write_back(rn, base.wrapping_add(bytes));
            }
            VfpAddressing::Decrement => {
                let start = base.wrapping_sub(bytes);
                self.vfp_transfer_words(load_store, start, first, offset);
                self.vfp_write_back(rn, start);
            }
            VfpAddressing::PositiveOffset => {
                let address = base.wrapping_add(bytes);
                self.vfp_transfer_words(load_store, address, first, words_of(precision));
            }
            VfpAddressing::NegativeOffset => {
                let address = base.wrapping_sub(bytes);
                self.vfp_transfer_words(load_store, address, first, words_of(precision));
            }
            VfpAddressing::Undefined(mode) => {
                panic!("undefined VFP addressing mode 0b{mode:03b}")
            }
        }
    }

    fn vfp_write_back(&mut self, rn: usize, value: u32) {
        assert_ne!(rn, REG_PROGRAM_COUNTER, "write-back to R15 is not allowed");
        self.registers.set_register_at(rn, value);
    }

    /// Moves `count` consecutive words between memory and slots, lowest
    /// slot at the lowest address.
    fn vfp_transfer_words(
        &mut self,
        load_store: LoadStoreKind,
        address: u32,
        first_slot: usize,
        count: u32,
    ) {
        let addresses = (0..count).map(|i| address.wrapping_add(i * 4));
        for (slot, address) in (first_slot..).zip(addresses) {
            match load_store {
                LoadStoreKind::Load => {
                    let word = self.memory.load_word(address);
                    self.vfp.set_slot(slot, word);
                }
                LoadStoreKind::Store => {
                    self.memory.store_word(address, self.vfp.slot(slot));
                }
            }
        }
    }

    fn vfp_register_transfer(&mut self, op: VfpTransferOp, fn_reg: usize, rd: usize) {
        // FMRX to R15 is FMSTAT, every other use of R15 is rejected.
        if op == VfpTransferOp::Fmrx && rd == REG_PROGRAM_COUNTER {
            let register = SystemRegister::from(fn_reg);
            assert_eq!(
                register,
                SystemRegister::Fpscr,
                "only FPSCR can be moved to the CPSR flags"
            );
            self.cpsr.set_condition_flags(self.vfp.compare_flags());
            return;
        }

        assert_ne!(
            rd, REG_PROGRAM_COUNTER,
            "R15 cannot be used for a VFP register transfer"
        );
        let low = fn_reg & !1;

        match op {
            VfpTransferOp::Fmsr => self.vfp.set_slot(fn_reg, self.registers.register_at(rd)),
            VfpTransferOp::Fmrs => self.registers.set_register_at(rd, self.vfp.slot(fn_reg)),
            VfpTransferOp::Fmxr => self
                .vfp
                .set_system(SystemRegister::from(fn_reg), self.registers.register_at(rd)),
            VfpTransferOp::Fmrx => {
                let value = self.vfp.system(SystemRegister::from(fn_reg));
                self.registers.set_register_at(rd, value);
            }
            VfpTransferOp::Fmdlr => self.vfp.set_slot(low, self.registers.register_at(rd)),
            VfpTransferOp::Fmrdl => self.registers.set_register_at(rd, self.vfp.slot(low)),
            VfpTransferOp::Fmdhr => self.vfp.set_slot(low + 1, self.registers.register_at(rd)),
            VfpTransferOp::Fmrdh => self.registers.set_register_at(rd, self.vfp.slot(low + 1)),
            VfpTransferOp::Undefined(opcode) => {
                panic!("undefined VFP register transfer opcode {opcode}")
            }
        }
    }
}
