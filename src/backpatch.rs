use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::encoder::Instruction;
use crate::error::AsmError;

/// Which payload field a label reference fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Byte, // imm8
    Word, // imm16
}

/// A label reference waiting for its address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backpatch {
    pub insn_idx: usize,
    pub label: String,
    pub target: Target,
    /// A byte-sized value packed into `imm16` because `imm8` was already taken.
    /// The byte range check still applies.
    pub word_slot: bool,
}

impl Backpatch {
    pub fn new(insn_idx: usize, label: &str, target: Target) -> Self {
        Self { insn_idx, label: label.to_string(), target, word_slot: false }
    }
}

/// A label definition. `addr` is in words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelAddr {
    pub name: String,
    pub addr: u32,
}

/// First definition of `name`; later duplicates are never consulted.
pub fn lookup<'a>(labels: &'a [LabelAddr], name: &str) -> Option<&'a LabelAddr> {
    labels.iter().find(|l| l.name == name)
}

/// Write every label address into the instruction that referenced it.
pub fn resolve(
    insns: &mut [Instruction],
    labels: &[LabelAddr],
    backpatches: &[Backpatch],
) -> Result<(), AsmError> {
    for bp in backpatches {
        let label = lookup(labels, &bp.label).ok_or_else(|| AsmError::UnknownLabel(bp.label.clone()))?;
        let insn = insns
            .get_mut(bp.insn_idx)
            .ok_or(AsmError::DanglingPatch { insn_idx: bp.insn_idx })?;
        match bp.target {
            Target::Word => insn.imm16 = label.addr as u16,
            Target::Byte => {
                let addr = u8::try_from(label.addr).map_err(|_| AsmError::LabelTooFar {
                    label: label.name.clone(),
                    addr: label.addr,
                })?;
                if bp.word_slot {
                    insn.imm16 = addr as u16;
                } else {
                    insn.imm8 = addr;
                }
            }
        }
        debug!(insn_idx = bp.insn_idx, label = %bp.label, addr = label.addr, kind = ?bp.target, "backpatched");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(name: &str, addr: u32) -> LabelAddr {
        LabelAddr { name: name.into(), addr }
    }

    fn patch(insn_idx: usize, label: &str, target: Target) -> Backpatch {
        Backpatch::new(insn_idx, label, target)
    }

    #[test]
    fn fills_byte_and_word_fields() {
        let mut insns = vec![Instruction::default(); 2];
        let labels = [label("start", 0x12), label("end", 0x345)];
        let bps = [patch(0, "start", Target::Byte), patch(1, "end", Target::Word)];
        resolve(&mut insns, &labels, &bps).unwrap();
        assert_eq!(insns[0].imm8, 0x12);
        assert_eq!(insns[0].imm16, 0);
        assert_eq!(insns[1].imm16, 0x345);
    }

    #[test]
    fn first_definition_wins() {
        let mut insns = vec![Instruction::default()];
        let labels = [label("x", 1), label("x", 9)];
        resolve(&mut insns, &labels, &[patch(0, "x", Target::Word)]).unwrap();
        assert_eq!(insns[0].imm16, 1);
    }

    #[test]
    fn unknown_and_oversized_labels() {
        let mut insns = vec![Instruction::default()];
        assert_eq!(
            resolve(&mut insns, &[], &[patch(0, "nowhere", Target::Word)]),
            Err(AsmError::UnknownLabel("nowhere".into()))
        );
        assert_eq!(
            resolve(&mut insns, &[label("far", 256)], &[patch(0, "far", Target::Byte)]),
            Err(AsmError::LabelTooFar { label: "far".into(), addr: 256 })
        );
        resolve(&mut insns, &[label("near", 255)], &[patch(0, "near", Target::Byte)]).unwrap();
        assert_eq!(insns[0].imm8, 255);
    }

    #[test]
    fn byte_in_word_slot_is_still_range_checked() {
        let mut insns = vec![Instruction { imm8: 1, ..Instruction::default() }];
        let bp = Backpatch { word_slot: true, ..patch(0, "lo", Target::Byte) };
        resolve(&mut insns, &[label("lo", 0x40)], std::slice::from_ref(&bp)).unwrap();
        assert_eq!((insns[0].imm8, insns[0].imm16), (1, 0x40));

        assert_eq!(
            resolve(&mut insns, &[label("lo", 301)], &[bp]),
            Err(AsmError::LabelTooFar { label: "lo".into(), addr: 301 })
        );
    }

    #[test]
    fn patch_past_the_table_is_an_error() {
        let mut insns = Vec::new();
        assert_eq!(
            resolve(&mut insns, &[label("x", 0)], &[patch(0, "x", Target::Word)]),
            Err(AsmError::DanglingPatch { insn_idx: 0 })
        );
    }
}
