//! Emulator and disassembler for a hybrid ARM7/ARM8 instruction set with
//! optional VFP support.

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
pub mod bitwise;

pub mod config;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_lossless)]
#[allow(clippy::missing_panics_doc)]
#[allow(clippy::unreadable_literal)]
pub mod cpu;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::unreadable_literal)]
pub mod disassembler;

pub mod error;

#[allow(clippy::missing_panics_doc)]
pub mod memory;
