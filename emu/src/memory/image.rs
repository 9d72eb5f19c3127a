//! # Memory Image
//!
//! A flat buffer mapped at `base`, holding code and data alike. Multi-byte
//! accesses compose bytes in the configured order:
//!
//! ```text
//!   word 0x11223344 at address A
//!
//!             A     A+1   A+2   A+3
//!   little:  0x44  0x33  0x22  0x11
//!   big:     0x11  0x22  0x33  0x44
//! ```
//!
//! Misaligned halfword/word accesses and addresses outside the buffer are
//! fatal.

use crate::bitwise::Bits;
use crate::config::Endianness;
use crate::error::{EmuError, EmuResult};
use crate::memory::io_device::IoDevice;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryImage {
    base: u32,
    bytes: Vec<u8>,
    endianness: Endianness,
}

impl MemoryImage {
    /// Zero filled image of `size` bytes starting at `base`.
    pub fn new(base: u32, size: usize, endianness: Endianness) -> EmuResult<Self> {
        Self::from_bytes(base, vec![0; size], endianness)
    }

    pub fn from_bytes(base: u32, bytes: Vec<u8>, endianness: Endianness) -> EmuResult<Self> {
        if u64::from(base) + bytes.len() as u64 > 1 << 32 {
            return Err(EmuError::ImageTooLarge {
                base,
                len: bytes.len(),
            });
        }

        Ok(Self {
            base,
            bytes,
            endianness,
        })
    }

    /// Image holding `words` back to back from `base`.
    pub fn from_words(base: u32, words: &[u32], endianness: Endianness) -> EmuResult<Self> {
        let mut image = Self::new(base, words.len() * 4, endianness)?;
        image.load_words(base, words)?;
        Ok(image)
    }

    /// Copies `words` into the image starting at `address`.
    pub fn load_words(&mut self, address: u32, words: &[u32]) -> EmuResult<()> {
        let end = u64::from(address) + words.len() as u64 * 4;
        if !self.contains(address) || end > self.end() {
            return Err(EmuError::AddressOutOfRange {
                address,
                base: self.base,
                end: self.end(),
            });
        }

        for (i, word) in words.iter().enumerate() {
            self.store_word(address + (i as u32) * 4, *word);
        }

        Ok(())
    }

    /// Reads the whole image back as words.
    pub fn words(&self) -> EmuResult<Vec<u32>> {
        if self.bytes.len() % 4 != 0 {
            return Err(EmuError::ImageNotWordSized {
                len: self.bytes.len(),
            });
        }

        Ok((0..self.bytes.len() / 4)
            .map(|i| self.load_word(self.base + (i as u32) * 4))
            .collect())
    }

    #[must_use]
    pub const fn base(&self) -> u32 {
        self.base
    }

    /// One past the last mapped address.
    #[must_use]
    pub fn end(&self) -> u64 {
        u64::from(self.base) + self.bytes.len() as u64
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub const fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub const fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    #[must_use]
    pub fn contains(&self, address: u32) -> bool {
        address >= self.base && u64::from(address) < self.end()
    }

    pub fn assert_in_range(&self, address: u32) {
        assert!(
            self.contains(address),
            "address 0x{address:08x} is outside the memory image [0x{:08x}, 0x{:08x})",
            self.base,
            self.end()
        );
    }

    fn offset(&self, address: u32) -> usize {
        self.assert_in_range(address);
        (address - self.base) as usize
    }

    #[must_use]
    pub fn load_byte(&self, address: u32) -> u32 {
        u32::from(self.read_at(address))
    }

    pub fn store_byte(&mut self, address: u32, value: u32) {
        self.write_at(address, value.get_bits(0..=7) as u8);
    }

    #[must_use]
    pub fn load_halfword(&self, address: u32) -> u32 {
        assert!(
            address & 1 == 0,
            "halfword access at 0x{address:08x} is not aligned"
        );
        let (b0, b1) = (self.load_byte(address), self.load_byte(address + 1));
        match self.endianness {
            Endianness::Little => (b1 << 8) | b0,
            Endianness::Big => (b0 << 8) | b1,
        }
    }

    pub fn store_halfword(&mut self, address: u32, value: u32) {
        assert!(
            address & 1 == 0,
            "halfword access at 0x{address:08x} is not aligned"
        );
        let (low, high) = (value.get_bits(0..=7), value.get_bits(8..=15));
        let (first, second) = match self.endianness {
            Endianness::Little => (low, high),
            Endianness::Big => (high, low),
        };
        self.store_byte(address, first);
        self.store_byte(address + 1, second);
    }

    #[must_use]
    pub fn load_word(&self, address: u32) -> u32 {
        assert!(address & 3 == 0, "word access at 0x{address:08x} is not aligned");
        let offset = self.offset(address);
        self.assert_in_range(address + 3);

        let mut bytes = [0; 4];
        bytes.copy_from_slice(&self.bytes[offset..offset + 4]);
        match self.endianness {
            Endianness::Little => u32::from_le_bytes(bytes),
            Endianness::Big => u32::from_be_bytes(bytes),
        }
    }

    pub fn store_word(&mut self, address: u32, value: u32) {
        assert!(address & 3 == 0, "word access at 0x{address:08x} is not aligned");
        let offset = self.offset(address);
        self.assert_in_range(address + 3);

        let bytes = match self.endianness {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.bytes[offset..offset + 4].copy_from_slice(&bytes);
    }
}

impl IoDevice for MemoryImage {
    type Address = u32;
    type Value = u8;

    fn read_at(&self, address: Self::Address) -> Self::Value {
        self.bytes[self.offset(address)]
    }

    fn write_at(&mut self, address: Self::Address, value: Self::Value) {
        let offset = self.offset(address);
        self.bytes[offset] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn word_round_trip_needs_same_endianness() {
        let mut memory = MemoryImage::new(0x1000, 0x100, Endianness::Little).unwrap();
        let word = 0x1122_3344;

        memory.store_word(0x1010, word);
        assert_eq!(memory.load_word(0x1010), word);

        memory.set_endianness(Endianness::Big);
        assert_ne!(memory.load_word(0x1010), word);
        assert_eq!(memory.load_word(0x1010), 0x4433_2211);
    }

    #[test]
    fn byte_layout() {
        let mut memory = MemoryImage::new(0, 8, Endianness::Big).unwrap();
        memory.store_word(0, 0x1122_3344);
        assert_eq!(memory.load_byte(0), 0x11);
        assert_eq!(memory.load_byte(3), 0x44);
        assert_eq!(memory.load_halfword(2), 0x3344);

        memory.set_endianness(Endianness::Little);
        memory.store_halfword(4, 0xBEEF);
        assert_eq!(memory.read_at(4), 0xEF);
        assert_eq!(memory.read_at(5), 0xBE);
        assert_eq!(memory.load_halfword(4), 0xBEEF);
    }

    #[test]
    fn store_byte_truncates() {
        let mut memory = MemoryImage::new(0x10, 4, Endianness::Little).unwrap();
        memory.store_byte(0x11, 0x1234);
        assert_eq!(memory.load_byte(0x11), 0x34);
        assert_eq!(memory.load_word(0x10), 0x3400);
    }

    #[test]
    fn from_words_and_back() {
        let words = [0xE3A0_0001, 0xE280_0001, 0];
        for endianness in [Endianness::Little, Endianness::Big] {
            let memory = MemoryImage::from_words(0x8000, &words, endianness).unwrap();
            assert_eq!(memory.len(), 12);
            assert_eq!(memory.load_word(0x8004), 0xE280_0001);
            assert_eq!(memory.words().unwrap(), words.to_vec());
        }
    }

    #[test]
    fn load_words_out_of_range() {
        let mut memory = MemoryImage::new(0x100, 8, Endianness::Little).unwrap();
        assert_eq!(
            memory.load_words(0x104, &[1, 2]),
            Err(EmuError::AddressOutOfRange {
                address: 0x104,
                base: 0x100,
                end: 0x108
            })
        );
        assert!(memory.load_words(0x104, &[1]).is_ok());
    }

    #[test]
    fn image_must_fit_address_space() {
        assert!(MemoryImage::new(0xFFFF_FFF0, 0x10, Endianness::Little).is_ok());
        assert!(MemoryImage::new(0xFFFF_FFF0, 0x11, Endianness::Little).is_err());
    }

    #[test]
    fn words_requires_word_sized_image() {
        let memory = MemoryImage::new(0, 6, Endianness::Little).unwrap();
        assert_eq!(
            memory.words(),
            Err(EmuError::ImageNotWordSized { len: 6 })
        );
    }

    #[test]
    #[should_panic(expected = "not aligned")]
    fn misaligned_word() {
        let memory = MemoryImage::new(0, 8, Endianness::Little).unwrap();
        let _ = memory.load_word(2);
    }

    #[test]
    #[should_panic(expected = "outside the memory image")]
    fn out_of_range() {
        let memory = MemoryImage::new(0x100, 8, Endianness::Little).unwrap();
        let _ = memory.load_byte(0x108);
    }
}
