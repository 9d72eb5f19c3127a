use crate::config::EmulatorConfig;
use crate::cpu::arm::instructions::{ArmModeInstruction, InstructionClass};
use crate::cpu::arm::mode::ArmModeOpcode;
use crate::cpu::condition::Condition;
use crate::cpu::psr::Psr;
use crate::cpu::registers::Registers;
#[cfg(feature = "vfp")]
use crate::cpu::vfp::registers::VfpRegisters;
use crate::disassembler::{Disassembler, Disassembly};
use crate::memory::image::MemoryImage;

pub const SIZE_OF_INSTRUCTION: u32 = 4;

/// What an executor did to the program counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// PC still points at the executed instruction and must advance.
    Continue,

    /// The executor wrote R15.
    Branched,
}

/// Why [`Emulator::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The program counter reached 0.
    Terminated { executed: u64 },

    /// The instruction budget ran out first.
    BudgetExhausted { executed: u64 },
}

impl RunOutcome {
    #[must_use]
    pub const fn executed(self) -> u64 {
        match self {
            Self::Terminated { executed } | Self::BudgetExhausted { executed } => executed,
        }
    }
}

/// ARMv4 user mode core running out of a [`MemoryImage`].
///
/// Execution stops when the program counter becomes 0, so a program is
/// typically entered with LR = 0 and returns with `mov pc, lr`.
pub struct Emulator {
    pub(crate) registers: Registers,
    pub(crate) cpsr: Psr,
    pub(crate) memory: MemoryImage,
    pub(crate) config: EmulatorConfig,

    #[cfg(feature = "vfp")]
    pub(crate) vfp: VfpRegisters,

    tracer: Option<Disassembler>,
    last_disassembly: Option<Disassembly>,
}

impl Emulator {
    /// The image is switched to the configured endianness.
    #[must_use]
    pub fn new(config: EmulatorConfig, mut memory: MemoryImage) -> Self {
        memory.set_endianness(config.endianness);
        let tracer = config
            .trace
            .then(|| Disassembler::new((&config).into()));

        Self {
            registers: Registers::default(),
            cpsr: Psr::default(),
            memory,
            config,
            #[cfg(feature = "vfp")]
            vfp: VfpRegisters::default(),
            tracer,
            last_disassembly: None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    #[must_use]
    pub fn register_at(&self, reg: usize) -> u32 {
        self.registers.register_at(reg)
    }

    pub fn set_register_at(&mut self, reg: usize, value: u32) {
        self.registers.set_register_at(reg, value);
    }

    #[must_use]
    pub const fn cpsr(&self) -> Psr {
        self.cpsr
    }

    /// Only N, Z, C and V are taken from `value`.
    pub fn set_cpsr_flags(&mut self, value: u32) {
        self.cpsr.set_condition_flags(value);
    }

    #[must_use]
    pub const fn memory(&self) -> &MemoryImage {
        &self.memory
    }

    pub const fn memory_mut(&mut self) -> &mut MemoryImage {
        &mut self.memory
    }

    #[cfg(feature = "vfp")]
    #[must_use]
    pub const fn vfp(&self) -> &VfpRegisters {
        &self.vfp
    }

    #[cfg(feature = "vfp")]
    pub const fn vfp_mut(&mut self) -> &mut VfpRegisters {
        &mut self.vfp
    }

    /// Text of the last traced instruction. Always `None` with tracing off.
    #[must_use]
    pub const fn last_disassembly(&self) -> Option<&Disassembly> {
        self.last_disassembly.as_ref()
    }

    fn fetch(&self) -> Option<u32> {
        let pc = self.registers.program_counter();
        assert!(
            pc % SIZE_OF_INSTRUCTION == 0,
            "program counter 0x{pc:08x} is not word aligned"
        );

        (pc != 0).then(|| self.memory.load_word(pc))
    }

    fn trace(&mut self, op_code: &ArmModeOpcode) {
        let Some(tracer) = &self.tracer else {
            return;
        };

        let disassembly = tracer.decode(**op_code);
        tracing::debug!(
            "0x{:08x}: {:08x}  {:<32}{}",
            self.registers.program_counter(),
            **op_code,
            disassembly.text,
            disassembly.notes
        );
        self.last_disassembly = Some(disassembly);
    }

    pub(crate) fn execute_arm(&mut self, op_code: ArmModeOpcode) -> Flow {
        use ArmModeInstruction::{
            BlockDataTransfer, Branch, Coprocessor, CountLeadingZeros, DataProcessing,
            HalfwordDataTransfer, Multiply, MultiplyLong, PsrTransfer, SingleDataSwap,
            SingleDataTransfer, Undefined,
        };

        if op_code.condition == Condition::NV {
            tracing::warn!(
                "condition code NV at 0x{:08x} should never be used, instruction skipped",
                self.registers.program_counter()
            );
            return Flow::Continue;
        }

        if !self.cpsr.can_execute(op_code.condition) {
            return Flow::Continue;
        }

        match op_code.instruction {
            DataProcessing {
                alu_instruction,
                set_conditions,
                rn,
                destination,
                op2,
            } => self.data_processing(alu_instruction, set_conditions, rn, destination, op2),
            PsrTransfer { spsr, kind } => self.psr_transfer(spsr, kind),
            Multiply {
                variant,
                set_conditions,
                rd,
                rn,
                rs,
                rm,
            } => self.multiply(variant, set_conditions, rd, rn, rs, rm),
            MultiplyLong {
                variant,
                set_conditions,
                rd_hi,
                rd_lo,
                rs,
                rm,
            } => self.multiply_long(variant, set_conditions, rd_hi, rd_lo, rs, rm),
            CountLeadingZeros { rd, rm } => self.count_leading_zeros(rd, rm),
            SingleDataSwap {
                quantity,
                rn,
                rd,
                rm,
            } => self.single_data_swap(quantity, rn, rd, rm),
            HalfwordDataTransfer {
                indexing,
                offsetting,
                write_back,
                load_store,
                transfer_kind,
                rn,
                rd,
                offset,
            } => self.half_word_data_transfer(
                indexing,
                offsetting,
                write_back,
                load_store,
                transfer_kind,
                rn,
                rd,
                offset,
            ),
            SingleDataTransfer {
                indexing,
                offsetting,
                quantity,
                write_back,
                load_store,
                rn,
                rd,
                offset,
            } => self.single_data_transfer(
                indexing,
                offsetting,
                quantity,
                write_back,
                load_store,
                rn,
                rd,
                offset,
            ),
            BlockDataTransfer {
                indexing,
                offsetting,
                load_psr,
                write_back,
                load_store,
                rn,
                register_list,
            } => self.block_data_transfer(
                indexing,
                offsetting,
                load_psr,
                write_back,
                load_store,
                rn,
                register_list,
            ),
            Branch { link, offset } => self.branch(link, offset),
            Undefined => panic!("undefined instruction 0x{:08x} (not emulated)", *op_code),
            Coprocessor => panic!("coprocessor or SWI 0x{:08x} (not emulated)", *op_code),
            #[cfg(feature = "vfp")]
            ArmModeInstruction::Vfp(instruction) => self.execute_vfp(instruction),
        }
    }

    /// One fetch-decode-execute cycle.
    ///
    /// Returns the class of the fetched instruction, executed or not, or
    /// `None` when the program counter is 0.
    pub fn step(&mut self) -> Option<InstructionClass> {
        let op_code = ArmModeOpcode::from(self.fetch()?);
        tracing::trace!("{op_code}");
        self.trace(&op_code);

        if self.execute_arm(op_code) == Flow::Continue {
            self.registers.advance_program_counter(SIZE_OF_INSTRUCTION);
        }

        tracing::trace!(
            "pc=0x{:08x} cpsr=0x{:08x}",
            self.registers.program_counter(),
            u32::from(self.cpsr)
        );

        Some(op_code.instruction.class())
    }

    /// Runs from `start` until the program counter becomes 0, or until
    /// `budget` instructions have been executed.
    pub fn run(&mut self, start: u32, budget: Option<u64>) -> RunOutcome {
        tracing::info!(
            "run from 0x{start:08x} ({}, {:?} endian, budget {budget:?})",
            self.config.processor,
            self.config.endianness
        );
        self.registers.set_program_counter(start);

        let mut executed = 0;
        let outcome = loop {
            if budget.is_some_and(|limit| executed >= limit) {
                break RunOutcome::BudgetExhausted { executed };
            }

            if self.step().is_none() {
                break RunOutcome::Terminated { executed };
            }
            executed += 1;
        };

        tracing::info!("run stopped: {outcome:?}");
        outcome
    }
}
