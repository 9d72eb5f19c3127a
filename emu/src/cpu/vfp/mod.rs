//! # VFP (Vector Floating Point)
//!
//! Coprocessors 10 (single precision) and 11 (double precision).
//!
//! ## Register File
//!
//! ```text
//! slot   0   1   2   3   4 ...  7 | 8 ... 15 | 16 ... 23 | 24 ... 31
//! single s0  s1  s2  s3  s4     s7| s8   s15 | s16   s23 | s24   s31
//! double d0      d1      d2       | d4    d7 | d8    d11 | d12   d15
//!        └──── bank 0 ───────────┘ └ bank 1 ┘ └ bank 2 ─┘ └ bank 3 ─┘
//! ```
//!
//! A data processing op whose destination lies outside bank 0 is repeated
//! FPSCR LEN times, stepping every register by STRIDE and wrapping inside
//! its bank. Bank 0 operands are scalars.
//!
//! ## Submodules
//!
//! - [`instructions`] - Decoding of CDP, LDC/STC and MCR/MRC forms
//! - [`operations`] - Execution
//! - [`registers`] - Register file and FPSCR fields

#[allow(clippy::cast_possible_truncation)]
pub mod instructions;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_precision_loss)]
#[allow(clippy::float_cmp)]
pub mod operations;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::float_cmp)]
pub mod registers;
