use crate::cpu::arm::instructions::ArmModeInstruction;
use crate::cpu::condition::Condition;

/// A fetched word together with its decoded meaning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmModeOpcode {
    pub instruction: ArmModeInstruction,
    pub condition: Condition,
    pub raw: u32,
}

impl From<u32> for ArmModeOpcode {
    fn from(op_code: u32) -> Self {
        Self {
            instruction: ArmModeInstruction::from(op_code),
            condition: Condition::of_instruction(op_code),
            raw: op_code,
        }
    }
}

impl std::ops::Deref for ArmModeOpcode {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

impl ArmModeOpcode {
    const fn field_layout(&self) -> &'static str {
        match &self.instruction {
            ArmModeInstruction::DataProcessing { .. } => {
                "FMT: |_Cond__|0_0|I|_code__|S|__Rn___|__Rd___|_______operand2________|"
            }
            ArmModeInstruction::PsrTransfer { .. } => {
                "FMT: |_Cond__|0_0|I|1_0|P|x_0|_Field_|__Rd___|_______operand2________|"
            }
            ArmModeInstruction::Multiply { .. } => {
                "FMT: |_Cond__|0_0_0_0_0_0|A|S|__Rd___|__Rn___|__Rs___|1_0_0_1|__Rm___|"
            }
            ArmModeInstruction::MultiplyLong { .. } => {
                "FMT: |_Cond__|0_0_0_0_1|U|A|S|_RdHi__|_RdLo__|__Rs___|1_0_0_1|__Rm___|"
            }
            ArmModeInstruction::CountLeadingZeros { .. } => {
                "FMT: |_Cond__|0_0_0_1_0_1_1_0|1_1_1_1|__Rd___|1_1_1_1|0_0_0_1|__Rm___|"
            }
            ArmModeInstruction::SingleDataSwap { .. } => {
                "FMT: |_Cond__|0_0_0_1_0|B|0_0|__Rn___|__Rd___|0_0_0_0|1_0_0_1|__Rm___|"
            }
            ArmModeInstruction::HalfwordDataTransfer { .. } => {
                "FMT: |_Cond__|0_0_0|P|U|I|W|L|__Rn___|__Rd___|_Offset|1|S|H|1|_Offset|"
            }
            ArmModeInstruction::SingleDataTransfer { .. } => {
                "FMT: |_Cond__|0_1|I|P|U|B|W|L|__Rn___|__Rd___|________Offset_________|"
            }
            ArmModeInstruction::BlockDataTransfer { .. } => {
                "FMT: |_Cond__|1_0_0|P|U|S|W|L|__Rn___|_____________Reg_List__________|"
            }
            ArmModeInstruction::Branch { .. } => {
                "FMT: |_Cond__|1_0_1|L|______________________Offset___________________|"
            }
            ArmModeInstruction::Undefined => {
                "FMT: |_Cond__|0_1_1|___________________xxx___________________|1|_xxx___|"
            }
            ArmModeInstruction::Coprocessor => "FMT: |_Cond__|1_1|",
            #[cfg(feature = "vfp")]
            ArmModeInstruction::Vfp(_) => {
                "FMT: |_Cond__|1_1_1_0|p|D|q|r|__Fn___|__Fd___|1_0_1|z|N|s|M|0|__Fm___|"
            }
        }
    }
}

impl std::fmt::Display for ArmModeOpcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let instruction = format!("INS: {:?}\n", self.instruction);

        let bytes_pos1 = "POS: |..3 ..................2 ..................1 ..................0|\n";
        let bytes_pos2 = "     |1_0_9_8_7_6_5_4_3_2_1_0_9_8_7_6_5_4_3_2_1_0_9_8_7_6_5_4_3_2_1_0|\n";

        let raw_bits = format!("{:032b}", self.raw)
            .chars()
            .map(String::from)
            .collect::<Vec<_>>()
            .join("_");
        let raw_bits = format!("RAW: |{raw_bits}|\n");

        writeln!(
            f,
            "{instruction}{bytes_pos1}{bytes_pos2}{raw_bits}{}",
            self.field_layout()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn opcode_keeps_raw_word() {
        let op_code = ArmModeOpcode::from(0x0283_1001);
        assert_eq!(*op_code, 0x0283_1001);
        assert_eq!(op_code.condition, Condition::EQ);
        assert!(matches!(
            op_code.instruction,
            ArmModeInstruction::DataProcessing { .. }
        ));
    }

    #[test]
    fn display_shows_bit_layout() {
        let text = ArmModeOpcode::from(0xE283_1001).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[3],
            "RAW: |1_1_1_0_0_0_1_0_1_0_0_0_0_0_1_1_0_0_0_1_0_0_0_0_0_0_0_0_0_0_0_1|"
        );
        assert!(lines[4].starts_with("FMT: |_Cond__|0_0|I|"));
    }
}
