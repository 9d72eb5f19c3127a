//! Whole-program listings.
//!
//! Every branch target gets a label `.label<n>`, numbered in the order the
//! branches appear. Comments are `(offset, text)` pairs sorted by offset and
//! are printed above the instruction at that byte offset.
//!
//! ```text
//! .label0:
//!   ;loop
//! 	subs    r0, r0, #1
//! 	bne     .label0
//! ```

use crate::config::DisassemblerConfig;
use crate::cpu::arm::instructions::ArmModeInstruction;

use super::Disassembler;

/// Byte offsets (from the first word) of every branch target, in branch
/// order. Targets may fall outside the program.
fn branch_targets(config: &DisassemblerConfig, words: &[u32]) -> Vec<i64> {
    words
        .iter()
        .enumerate()
        .filter_map(|(index, &word)| {
            ArmModeInstruction::from(word)
                .branch_offset(config.prefetch())
                .map(|offset| i64::from(offset) + index as i64 * 4)
        })
        .collect()
}

#[must_use]
pub fn disassemble_listing(
    config: &DisassemblerConfig,
    words: &[u32],
    comments: &[(u32, String)],
) -> String {
    let disassembler = Disassembler::new(*config);
    let labels = branch_targets(config, words);
    let label_at = |address: i64| labels.iter().position(|&target| target == address);

    let mut comments = comments.iter().peekable();
    let mut listing = String::new();

    for (index, &word) in words.iter().enumerate() {
        let address = index as i64 * 4;

        if let Some(label) = label_at(address) {
            listing.push_str(&format!(".label{label}:\n"));
        }
        // Unaligned offsets never match an instruction.
        while comments.next_if(|(offset, _)| i64::from(*offset) < address).is_some() {}
        while let Some((_, text)) =
            comments.next_if(|(offset, _)| i64::from(*offset) == address)
        {
            listing.push_str(&format!("  ;{text}\n"));
        }

        let disassembly = disassembler.decode(word);
        listing.push('\t');
        listing.push_str(&disassembly.text);

        let target = ArmModeInstruction::from(word)
            .branch_offset(config.prefetch())
            .map(|offset| i64::from(offset) + address);
        if let Some(label) = target.and_then(label_at) {
            listing.push_str(&format!(".label{label}"));
        }

        listing.push_str(&format!("\t\t{}\n", disassembly.notes));
    }

    listing
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn backward_branch_gets_a_label() {
        let words = [
            0xE3A0_0003, // mov r0, #3
            0xE250_0001, // subs r0, r0, #1
            0x1AFF_FFFD, // bne -> subs
        ];
        let comments = vec![(4, "loop".to_owned())];

        let listing = disassemble_listing(&DisassemblerConfig::default(), &words, &comments);
        assert_eq!(
            listing,
            "\tmov     r0, #3\t\t\n\
             .label0:\n\
             \x20 ;loop\n\
             \tsubs    r0, r0, #1\t\t\n\
             \tbne     .label0\t\t\n"
        );
    }

    #[test]
    fn labels_follow_branch_order() {
        let words = [
            0xEA00_0001, // b -> 12
            0xEB00_0000, // bl -> 12
            0xEAFF_FFFC, // b -> 0
            0xE1A0_0000,
        ];
        let listing = disassemble_listing(&DisassemblerConfig::default(), &words, &[]);
        let lines = listing.lines().collect::<Vec<_>>();

        // Both branches to 12 share the first label, the second is never
        // printed as a definition.
        assert_eq!(lines[0], ".label2:");
        assert_eq!(lines[1], "\tb       .label0\t\t");
        assert_eq!(lines[2], "\tbl      .label0\t\t");
        assert_eq!(lines[3], "\tb       .label2\t\t");
        assert_eq!(lines[4], ".label0:");
    }

    #[test]
    fn comments_past_the_end_are_dropped() {
        let comments = vec![
            (0, "first".to_owned()),
            (0, "second".to_owned()),
            (64, "gone".to_owned()),
        ];
        let listing =
            disassemble_listing(&DisassemblerConfig::default(), &[0xE1A0_0000], &comments);
        assert_eq!(listing, "  ;first\n  ;second\n\tmov     r0, r0\t\t\n");
    }

    #[test]
    fn notes_follow_the_text() {
        let listing =
            disassemble_listing(&DisassemblerConfig::default(), &[0xE001_0291], &[]);
        assert_eq!(
            listing,
            "\tmul     r1, r1, r2\t\tERROR: source register Rm cannot be the same as the destination\n"
        );
    }
}
