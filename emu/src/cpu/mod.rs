pub mod arm;
pub mod condition;
pub mod emulator;

#[allow(clippy::cast_possible_truncation)]
pub mod flags;
pub mod psr;
pub mod registers;

#[cfg(feature = "vfp")]
pub mod vfp;
