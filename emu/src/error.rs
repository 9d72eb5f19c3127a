use thiserror::Error;

/// Errors raised while setting an emulator or a disassembler up.
///
/// Decoding and executing never return these: broken instruction streams
/// either end up as notes (disassembler) or abort (emulator).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmuError {
    #[error("image of {len} bytes is not a whole number of words")]
    ImageNotWordSized { len: usize },

    #[error("image of {len} bytes does not fit the address space at 0x{base:08x}")]
    ImageTooLarge { base: u32, len: usize },

    #[error("address 0x{address:08x} is outside the image [0x{base:08x}, 0x{end:08x})")]
    AddressOutOfRange { address: u32, base: u32, end: u64 },

    #[error("unknown processor `{0}` (expected arm7 or arm8)")]
    UnknownProcessor(String),

    #[error("unknown endianness `{0}` (expected little or big)")]
    UnknownEndianness(String),
}

pub type EmuResult<T> = Result<T, EmuError>;
