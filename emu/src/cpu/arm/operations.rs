use crate::bitwise::Bits;
use crate::cpu::arm::alu_instruction::{
    adder, immediate_operand, shift_by_immediate, shift_by_register, ArithmeticOpResult,
    ArmModeAluInstruction, ShiftOpResult,
};
use crate::cpu::arm::instructions::{
    AluSecondOperandInfo, ArmModeMultiplyLongVariant, ArmModeMultiplyVariant,
    HalfwordDataTransferOffsetKind, HalfwordTransferKind, MsrSourceOperand, PsrOpKind,
    ShiftAmount, ShiftedRegister, SingleDataTransferOffsetInfo,
};
use crate::cpu::arm::wide::{add_s64, add_u64, mul_s64, mul_u64};
use crate::cpu::emulator::{Emulator, Flow, SIZE_OF_INSTRUCTION};
use crate::cpu::flags::{Indexing, LoadStoreKind, Offsetting, ReadWriteKind};
use crate::cpu::registers::{REG_LR, REG_PROGRAM_COUNTER};

/// Result of an ALU operation before it is written back.
enum AluOutput {
    Logical(u32),
    Arithmetic(ArithmeticOpResult),
}

impl Emulator {
    /// Value of `reg` as an operand: R15 reads ahead of the instruction.
    pub(crate) fn operand_register(&self, reg: usize, pc_offset: u32) -> u32 {
        let value = self.registers.register_at(reg);
        if reg == REG_PROGRAM_COUNTER {
            value.wrapping_add(pc_offset)
        } else {
            value
        }
    }

    /// Value written to memory when `rd` is stored.
    fn store_value(&self, rd: usize) -> u32 {
        self.operand_register(rd, self.config.store_prefetch())
    }

    fn write_loaded(&mut self, rd: usize, value: u32) -> Flow {
        self.registers.set_register_at(rd, value);
        if rd == REG_PROGRAM_COUNTER {
            Flow::Branched
        } else {
            Flow::Continue
        }
    }

    pub(crate) fn shifted_register(&self, operand: ShiftedRegister) -> ShiftOpResult {
        let carry = self.cpsr.carry_flag();
        let prefetch = self.config.prefetch();

        match operand.amount {
            ShiftAmount::Immediate(amount) => shift_by_immediate(
                operand.shift_kind,
                amount,
                self.operand_register(operand.rm, prefetch),
                carry,
            ),
            ShiftAmount::Register { rs, reserved_bit } => {
                assert_ne!(rs, REG_PROGRAM_COUNTER, "shift register cannot be R15");
                assert!(!reserved_bit, "bit 7 of a register shift must be clear");

                // One more cycle passes before Rm is read.
                let rm = self.operand_register(operand.rm, prefetch + SIZE_OF_INSTRUCTION);
                shift_by_register(
                    operand.shift_kind,
                    self.registers.register_at(rs),
                    rm,
                    carry,
                )
            }
        }
    }

    pub(crate) fn operand2(&self, op2: AluSecondOperandInfo) -> ShiftOpResult {
        match op2 {
            // The immediate form leaves the carry alone, rotated or not.
            AluSecondOperandInfo::Immediate { base, rotate } => ShiftOpResult {
                result: base.rotate_right(rotate * 2),
                carry: self.cpsr.carry_flag(),
            },
            AluSecondOperandInfo::Register(operand) => self.shifted_register(operand),
        }
    }

    pub(crate) fn data_processing(
        &mut self,
        alu_instruction: ArmModeAluInstruction,
        set_conditions: bool,
        rn: usize,
        destination: usize,
        op2: AluSecondOperandInfo,
    ) -> Flow {
        use ArmModeAluInstruction::{
            Adc, Add, And, Bic, Cmn, Cmp, Eor, Mov, Mvn, Orr, Rsb, Rsc, Sbc, Sub, Teq, Tst,
        };

        if alu_instruction.is_test() {
            assert!(
                set_conditions,
                "{alu_instruction} must always set the condition codes"
            );
        } else {
            // Would restore the SPSR, which user mode does not have.
            assert!(
                !(set_conditions && destination == REG_PROGRAM_COUNTER),
                "S bit with R15 as destination is not allowed in user mode"
            );
        }

        let pc_offset = match op2 {
            AluSecondOperandInfo::Register(operand) if operand.shift_by_register() => {
                self.config.prefetch() + SIZE_OF_INSTRUCTION
            }
            _ => self.config.prefetch(),
        };
        let op1 = self.operand_register(rn, pc_offset);
        let shifted = self.operand2(op2);
        let op2 = shifted.result;
        let carry = self.cpsr.carry_flag();

        let output = match alu_instruction {
            And | Tst => AluOutput::Logical(op1 & op2),
            Eor | Teq => AluOutput::Logical(op1 ^ op2),
            Orr => AluOutput::Logical(op1 | op2),
            Mov => AluOutput::Logical(op2),
            Bic => AluOutput::Logical(op1 & !op2),
            Mvn => AluOutput::Logical(!op2),
            Sub | Cmp => AluOutput::Arithmetic(adder(op1, !op2, true)),
            Rsb => AluOutput::Arithmetic(adder(op2, !op1, true)),
            Add | Cmn => AluOutput::Arithmetic(adder(op1, op2, false)),
            Adc => AluOutput::Arithmetic(adder(op1, op2, carry)),
            Sbc => AluOutput::Arithmetic(adder(op1, !op2, carry)),
            Rsc => AluOutput::Arithmetic(adder(op2, !op1, carry)),
        };

        let result = match output {
            AluOutput::Logical(result) => {
                if set_conditions {
                    self.cpsr.set_logical_flags(result, shifted.carry);
                }
                result
            }
            AluOutput::Arithmetic(op_result) => {
                if set_conditions {
                    self.cpsr.set_arithmetic_flags(&op_result);
                }
                op_result.result
            }
        };

        if alu_instruction.is_test() {
            return Flow::Continue;
        }

        self.write_loaded(destination, result)
    }

    fn psr_source_register(&self, rm: usize) -> u32 {
        assert_ne!(
            rm, REG_PROGRAM_COUNTER,
            "R15 cannot be used for a PSR transfer"
        );
        self.registers.register_at(rm)
    }

    pub(crate) fn psr_transfer(&mut self, spsr: bool, kind: PsrOpKind) -> Flow {
        if spsr {
            tracing::warn!("PSR transfer names the SPSR, user mode only has the CPSR");
        }

        match kind {
            PsrOpKind::Mrs { rd } => {
                assert_ne!(
                    rd, REG_PROGRAM_COUNTER,
                    "R15 cannot be used for a PSR transfer"
                );
                self.registers.set_register_at(rd, self.cpsr.into());
            }
            PsrOpKind::Msr { rm } => {
                let value = self.psr_source_register(rm);
                self.cpsr.set_condition_flags(value);
            }
            PsrOpKind::MsrFlags { operand } => {
                let value = match operand {
                    MsrSourceOperand::Immediate(op2) => immediate_operand(op2),
                    MsrSourceOperand::Register(rm) => self.psr_source_register(rm),
                };
                self.cpsr.set_condition_flags(value);
            }
            PsrOpKind::Undefined => panic!("undefined PSR transfer instruction"),
        }

        Flow::Continue
    }

    pub(crate) fn multiply(
        &mut self,
        variant: ArmModeMultiplyVariant,
        set_conditions: bool,
        rd: usize,
        rn: usize,
        rs: usize,
        rm: usize,
    ) -> Flow {
        assert_ne!(rd, rm, "multiply destination cannot be the same as Rm");
        assert!(
            ![rd, rn, rs, rm].contains(&REG_PROGRAM_COUNTER),
            "R15 cannot be used by a multiply"
        );

        let mut result = self
            .registers
            .register_at(rm)
            .wrapping_mul(self.registers.register_at(rs));

        match variant {
            ArmModeMultiplyVariant::Mla => {
                result = result.wrapping_add(self.registers.register_at(rn));
            }
            ArmModeMultiplyVariant::Mul => {
                assert_eq!(rn, 0, "MUL expects Rn to be zero");
            }
        }

        self.registers.set_register_at(rd, result);

        // C is meaningless after a multiply and V is kept.
        if set_conditions {
            self.cpsr.set_sign_flag(result.get_bit(31));
            self.cpsr.set_zero_flag(result == 0);
        }

        Flow::Continue
    }

    pub(crate) fn multiply_long(
        &mut self,
        variant: ArmModeMultiplyLongVariant,
        set_conditions: bool,
        rd_hi: usize,
        rd_lo: usize,
        rs: usize,
        rm: usize,
    ) -> Flow {
        assert!(
            rm != rd_hi && rm != rd_lo,
            "multiply destination cannot be the same as Rm"
        );
        assert_ne!(rd_hi, rd_lo, "RdHi and RdLo must be different registers");
        assert!(
            ![rd_hi, rd_lo, rs, rm].contains(&REG_PROGRAM_COUNTER),
            "R15 cannot be used by a multiply"
        );

        let (a, b) = (
            self.registers.register_at(rm),
            self.registers.register_at(rs),
        );
        let accumulator = (
            self.registers.register_at(rd_hi),
            self.registers.register_at(rd_lo),
        );

        let mut result = if variant.is_signed() {
            mul_s64(a, b)
        } else {
            mul_u64(a, b)
        };

        if variant.accumulates() {
            result = if variant.is_signed() {
                add_s64(result, accumulator)
            } else {
                add_u64(result, accumulator)
            };
        }

        let (hi, lo) = result;
        self.registers.set_register_at(rd_hi, hi);
        self.registers.set_register_at(rd_lo, lo);

        if set_conditions {
            self.cpsr.set_sign_flag(hi.get_bit(31));
            self.cpsr.set_zero_flag((hi | lo) == 0);
        }

        Flow::Continue
    }

    pub(crate) fn count_leading_zeros(&mut self, rd: usize, rm: usize) -> Flow {
        assert!(
            rd != REG_PROGRAM_COUNTER && rm != REG_PROGRAM_COUNTER,
            "R15 cannot be used as an operand for clz"
        );

        let zeros = self.registers.register_at(rm).leading_zeros();
        self.registers.set_register_at(rd, zeros);

        Flow::Continue
    }

    pub(crate) fn single_data_swap(
        &mut self,
        quantity: ReadWriteKind,
        rn: usize,
        rd: usize,
        rm: usize,
    ) -> Flow {
        assert!(
            ![rn, rd, rm].contains(&REG_PROGRAM_COUNTER),
            "R15 cannot be used as an operand for swap"
        );

        let address = self.registers.register_at(rn);
        let source = self.registers.register_at(rm);

        let loaded = match quantity {
            ReadWriteKind::Byte => {
                let loaded = self.memory.load_byte(address);
                self.memory.store_byte(address, source);
                loaded
            }
            ReadWriteKind::Word => {
                let loaded = self.memory.load_word(address);
                self.memory.store_word(address, source);
                loaded
            }
        };
        self.registers.set_register_at(rd, loaded);

        Flow::Continue
    }

    /// Effective address of a single or halfword transfer. Write-back to
    /// the base happens here, before the transfer itself.
    fn transfer_address(
        &mut self,
        indexing: Indexing,
        offsetting: Offsetting,
        write_back: bool,
        rn: usize,
        amount: u32,
    ) -> u32 {
        let base = self.registers.register_at(rn);
        let updated = offsetting.apply(base, amount);

        match indexing {
            Indexing::Pre => {
                if write_back {
                    assert_ne!(rn, REG_PROGRAM_COUNTER, "write-back to R15 is not allowed");
                    self.registers.set_register_at(rn, updated);
                }

                if rn == REG_PROGRAM_COUNTER {
                    updated.wrapping_add(self.config.prefetch())
                } else {
                    updated
                }
            }
            Indexing::Post => {
                assert!(!write_back, "write-back must be clear with post-indexing");
                assert_ne!(rn, REG_PROGRAM_COUNTER, "write-back to R15 is not allowed");
                self.registers.set_register_at(rn, updated);
                base
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn single_data_transfer(
        &mut self,
        indexing: Indexing,
        offsetting: Offsetting,
        quantity: ReadWriteKind,
        write_back: bool,
        load_store: LoadStoreKind,
        rn: usize,
        rd: usize,
        offset: SingleDataTransferOffsetInfo,
    ) -> Flow {
        let amount = match offset {
            SingleDataTransferOffsetInfo::Immediate { offset } => offset,
            SingleDataTransferOffsetInfo::Register(operand) => {
                assert!(
                    !operand.shift_by_register(),
                    "transfer offset shift cannot be specified as a register"
                );
                assert_ne!(
                    operand.rm, REG_PROGRAM_COUNTER,
                    "R15 cannot be used as the offset register"
                );
                self.shifted_register(operand).result
            }
        };

        let address = self.transfer_address(indexing, offsetting, write_back, rn, amount);

        match (load_store, quantity) {
            (LoadStoreKind::Load, ReadWriteKind::Byte) => {
                let value = self.memory.load_byte(address);
                self.write_loaded(rd, value)
            }
            (LoadStoreKind::Load, ReadWriteKind::Word) => {
                let value = self.memory.load_word(address);
                self.write_loaded(rd, value)
            }
            (LoadStoreKind::Store, ReadWriteKind::Byte) => {
                self.memory.store_byte(address, self.store_value(rd));
                Flow::Continue
            }
            (LoadStoreKind::Store, ReadWriteKind::Word) => {
                self.memory.store_word(address, self.store_value(rd));
                Flow::Continue
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn half_word_data_transfer(
        &mut self,
        indexing: Indexing,
        offsetting: Offsetting,
        write_back: bool,
        load_store: LoadStoreKind,
        transfer_kind: HalfwordTransferKind,
        rn: usize,
        rd: usize,
        offset: HalfwordDataTransferOffsetKind,
    ) -> Flow {
        assert_ne!(
            transfer_kind,
            HalfwordTransferKind::Swap,
            "S and H both clear encode SWP, not a halfword transfer"
        );

        let amount = match offset {
            HalfwordDataTransferOffsetKind::Immediate { offset } => offset,
            HalfwordDataTransferOffsetKind::Register { rm } => {
                assert_ne!(
                    rm, REG_PROGRAM_COUNTER,
                    "R15 cannot be used as the offset register"
                );
                self.registers.register_at(rm)
            }
        };

        let address = self.transfer_address(indexing, offsetting, write_back, rn, amount);

        match (load_store, transfer_kind) {
            (LoadStoreKind::Load, HalfwordTransferKind::UnsignedHalfword) => {
                let value = self.memory.load_halfword(address);
                self.write_loaded(rd, value)
            }
            (LoadStoreKind::Load, HalfwordTransferKind::SignedHalfword) => {
                let value = self.memory.load_halfword(address).sign_extended(16);
                self.write_loaded(rd, value)
            }
            (LoadStoreKind::Load, HalfwordTransferKind::SignedByte) => {
                let value = self.memory.load_byte(address).sign_extended(8);
                self.write_loaded(rd, value)
            }
            (LoadStoreKind::Store, HalfwordTransferKind::UnsignedHalfword) => {
                self.memory.store_halfword(address, self.store_value(rd));
                Flow::Continue
            }
            (LoadStoreKind::Store, HalfwordTransferKind::SignedHalfword) => {
                panic!("signed halfword store does not exist")
            }
            (LoadStoreKind::Store, HalfwordTransferKind::SignedByte) => {
                panic!("signed byte store does not exist")
            }
            (_, HalfwordTransferKind::Swap) => {
                panic!("S and H both clear encode SWP, not a halfword transfer")
            }
        }
    }

    /// The lowest register always ends up at the lowest address, so the
    /// list is walked upwards or downwards to match the address direction.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn block_data_transfer(
        &mut self,
        indexing: Indexing,
        offsetting: Offsetting,
        load_psr: bool,
        write_back: bool,
        load_store: LoadStoreKind,
        rn: usize,
        register_list: u16,
    ) -> Flow {
        assert!(!load_psr, "S bit can only be used in a privileged mode");
        assert_ne!(
            rn, REG_PROGRAM_COUNTER,
            "R15 cannot be used as the base register"
        );

        let mut address = self.registers.register_at(rn);
        let mut flow = Flow::Continue;

        for step in 0..16_usize {
            let reg = match offsetting {
                Offsetting::Up => step,
                Offsetting::Down => 15 - step,
            };
            if !register_list.get_bit(reg as u8) {
                continue;
            }

            if indexing == Indexing::Pre {
                address = offsetting.apply(address, 4);
            }

            match load_store {
                LoadStoreKind::Load => {
                    let value = self.memory.load_word(address);
                    if self.write_loaded(reg, value) == Flow::Branched {
                        flow = Flow::Branched;
                    }
                }
                LoadStoreKind::Store => {
                    assert_ne!(reg, REG_PROGRAM_COUNTER, "STM of R15 is not emulated");
                    self.memory
                        .store_word(address, self.registers.register_at(reg));
                }
            }

            if indexing == Indexing::Post {
                address = offsetting.apply(address, 4);
            }
        }

        if write_back {
            let base_in_list = register_list.get_bit(rn as u8);
            match load_store {
                // A loaded base wins over the written back one.
                LoadStoreKind::Load => {
                    if !base_in_list {
                        self.registers.set_register_at(rn, address);
                    }
                }
                LoadStoreKind::Store => {
                    assert!(
                        !base_in_list,
                        "STM with write-back cannot store its own base"
                    );
                    self.registers.set_register_at(rn, address);
                }
            }
        }

        flow
    }

    pub(crate) fn branch(&mut self, link: bool, offset: i32) -> Flow {
        let pc = self.registers.program_counter();

        if link {
            self.registers
                .set_register_at(REG_LR, pc.wrapping_add(SIZE_OF_INSTRUCTION));
        }

        let target = pc
            .wrapping_add_signed(offset)
            .wrapping_add(self.config.prefetch());
        assert!(
            target % SIZE_OF_INSTRUCTION == 0,
            "branch target 0x{target:08x} is not word aligned"
        );
        self.registers.set_program_counter(target);

        Flow::Branched
    }
}
