//! # ARM Instruction Set (32-bit)
//!
//! Full-featured instruction set with conditional execution on every instruction.
//!
//! ## Format
//!
//! ```text
//! 31-28   27-25   24-0
//! [Cond] [Format] [Instruction-specific]
//! ```
//!
//! - **Condition (bits 28-31)**: See [`condition`](super::condition)
//! - **Format (bits 25-27)**: Determines instruction category
//!
//! ## Instruction Categories
//!
//! | Bits 27-25 | Category                         | Examples              |
//! |------------|----------------------------------|-----------------------|
//! | 000        | Multiply, CLZ, Swap, Halfword    | MUL, UMULL, SWP, LDRH |
//! | 00x        | Data Processing, PSR transfer    | AND, ADD, CMP, MRS    |
//! | 01x        | Single Data Transfer             | LDR, STR              |
//! | 011 + b4   | Undefined                        |                       |
//! | 100        | Block Data Transfer              | LDM, STM              |
//! | 101        | Branch                           | B, BL                 |
//! | 11x        | Coprocessor, SWI                 | VFP, SWI              |
//!
//! ## Barrel Shifter
//!
//! Operand2 can be shifted at no extra cost: LSL, LSR, ASR, ROR, RRX.
//!
//! ## Submodules
//!
//! - [`instructions`] - Decoding (`From<u32>`)
//! - [`operations`] - Execution
//! - [`alu_instruction`] - ALU ops and barrel shifter
//! - [`mode`] - Opcode wrapper with the bit layout dump
//! - [`wide`] - 64-bit results for the long multiplies

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_lossless)]
pub mod alu_instruction;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::similar_names)]
pub mod instructions;

#[allow(clippy::cast_possible_truncation)]
pub mod mode;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_lossless)]
#[allow(clippy::similar_names)]
pub mod operations;

pub mod wide;
