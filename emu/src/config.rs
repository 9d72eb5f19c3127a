//! Construction parameters shared by the emulator and the disassembler.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EmuError;

/// How far R15 reads ahead of the executing instruction.
pub const PREFETCH: u32 = 8;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Processor {
    #[default]
    Arm7,
    Arm8,
}

impl Processor {
    /// Value of R15 seen by a store of R15, relative to the instruction.
    #[must_use]
    pub const fn store_prefetch(self) -> u32 {
        match self {
            Self::Arm7 => 12,
            Self::Arm8 => 8,
        }
    }
}

impl FromStr for Processor {
    type Err = EmuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arm7" => Ok(Self::Arm7),
            "arm8" => Ok(Self::Arm8),
            _ => Err(EmuError::UnknownProcessor(s.to_owned())),
        }
    }
}

impl std::fmt::Display for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arm7 => f.write_str("arm7"),
            Self::Arm8 => f.write_str("arm8"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl FromStr for Endianness {
    type Err = EmuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "little" | "le" => Ok(Self::Little),
            "big" | "be" => Ok(Self::Big),
            _ => Err(EmuError::UnknownEndianness(s.to_owned())),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmulatorConfig {
    pub processor: Processor,
    pub endianness: Endianness,

    /// Disassemble every fetched instruction and log it.
    pub trace: bool,
}

impl EmulatorConfig {
    #[must_use]
    pub const fn prefetch(&self) -> u32 {
        PREFETCH
    }

    #[must_use]
    pub const fn store_prefetch(&self) -> u32 {
        self.processor.store_prefetch()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisassemblerConfig {
    pub processor: Processor,
    pub endianness: Endianness,

    /// Print immediates as `#0x%08x` instead of decimal.
    pub hex_immediates: bool,
}

impl DisassemblerConfig {
    #[must_use]
    pub const fn prefetch(&self) -> u32 {
        PREFETCH
    }

    #[must_use]
    pub const fn store_prefetch(&self) -> u32 {
        self.processor.store_prefetch()
    }
}

impl From<&EmulatorConfig> for DisassemblerConfig {
    /// The tracer always prints decimal immediates.
    fn from(config: &EmulatorConfig) -> Self {
        Self {
            processor: config.processor,
            endianness: config.endianness,
            hex_immediates: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_names() {
        assert_eq!("ARM8".parse::<Processor>(), Ok(Processor::Arm8));
        assert_eq!("arm7".parse::<Processor>(), Ok(Processor::Arm7));
        assert_eq!(
            "arm9".parse::<Processor>(),
            Err(EmuError::UnknownProcessor("arm9".to_owned()))
        );

        assert_eq!("Big".parse::<Endianness>(), Ok(Endianness::Big));
        assert_eq!("le".parse::<Endianness>(), Ok(Endianness::Little));
        assert!("middle".parse::<Endianness>().is_err());
    }

    #[test]
    fn store_prefetch_depends_on_processor() {
        let mut config = EmulatorConfig::default();
        assert_eq!(config.prefetch(), 8);
        assert_eq!(config.store_prefetch(), 12);

        config.processor = Processor::Arm8;
        assert_eq!(config.store_prefetch(), 8);
        assert_eq!(DisassemblerConfig::from(&config).store_prefetch(), 8);
    }
}
