use serde::Serialize;
use tracing::debug;

use crate::backpatch::Backpatch;
use crate::error::AsmError;
use crate::isa::{cond, reg};
use crate::operand::{self, Kind, RegImm};

/// One encoded machine instruction.
///
/// `out` is `cond << 4 | dst`; `input` packs the two slot selectors, each a
/// register index or an immediate [`Kind`] tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Instruction {
    pub op: u8,
    pub out: u8,
    #[serde(rename = "in")]
    pub input: u8,
    pub imm8: u8,
    pub imm16: u16,
}

impl Instruction {
    /// Either slot nibble carries the word-immediate tag.
    pub fn has_word_payload(&self) -> bool {
        let tag = Kind::Imm16.tag();
        self.input >> 4 == tag || self.input & 0x0F == tag
    }

    /// Encoded length in words, as the emitter lays it out.
    pub fn words(&self) -> u32 {
        if self.has_word_payload() {
            3
        } else {
            2
        }
    }

    fn set_imm(&mut self, kind: Kind, val: u16) {
        match kind {
            Kind::Imm8 => self.imm8 = val as u8,
            Kind::Imm16 => self.imm16 = val,
            Kind::Reg => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Mov,
    Add,
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub op: Op,
    pub mnemonic: &'static str,
    pub opcode: u8,
    /// Input operands after the destination register.
    pub inputs: usize,
}

pub const TABLE: &[InstrDesc] = &[
    InstrDesc {
        op: Op::Mov,
        mnemonic: "mov",
        opcode: 0x00,
        inputs: 1,
    },
    InstrDesc {
        op: Op::Add,
        mnemonic: "add",
        opcode: 0x12,
        inputs: 2,
    },
];

pub fn lookup(mnemonic: &str) -> Option<&'static InstrDesc> {
    TABLE.iter().find(|d| d.mnemonic == mnemonic)
}

/// Result of encoding one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    pub insn: Instruction,
    /// Word count reported by the slot packer. Differs from
    /// [`Instruction::words`] for `mov` with an immediate source.
    pub legacy_len: u32,
}

/// Encode `mnemonic[.suffix] operands...` as instruction number `insn_idx`.
/// Label operands queue their fix-ups on `backpatches`.
pub fn encode(
    mnemonic: &str,
    operands: &[&str],
    insn_idx: usize,
    backpatches: &mut Vec<Backpatch>,
) -> Result<Encoded, AsmError> {
    let lower = mnemonic.to_ascii_lowercase();
    let (base, suffix) = cond::split_suffix(&lower);
    let flag = cond::code_of(suffix)?;
    let desc = lookup(base).ok_or_else(|| AsmError::UnknownMnemonic(base.to_string()))?;

    let nth = |i: usize| {
        operands.get(i).copied().ok_or_else(|| AsmError::TooFewOperands {
            mnemonic: base.to_string(),
            given: operands.len(),
        })
    };

    let dst_name = nth(0)?;
    let dst = reg::index_of(dst_name).ok_or_else(|| AsmError::MissingRegister(dst_name.to_string()))?;
    nth(desc.inputs)?;

    let mut insn = Instruction {
        op: desc.opcode,
        out: flag << 4 | dst,
        ..Instruction::default()
    };

    let legacy_len = match desc.op {
        Op::Mov => {
            let src = operand::resolve(nth(1)?, insn_idx, backpatches)?;
            set_input(&mut insn, src, None, backpatches)?
        }
        Op::Add => {
            let in1 = operand::resolve(nth(1)?, insn_idx, backpatches)?;
            let in2 = operand::resolve(nth(2)?, insn_idx, backpatches)?;
            set_input(&mut insn, in1, Some(in2), backpatches)?
        }
    };

    debug!(insn_idx, mnemonic = %lower, ?insn, legacy_len, "encoded");
    Ok(Encoded { insn, legacy_len })
}

/// Pack the input slots of `insn` and fill the immediate payloads.
///
/// Returns the slot packer's length: 2 for registers only, the kind tag for a
/// lone immediate, `1 + tag` for register + immediate and 3 for two
/// immediates.
fn set_input(
    insn: &mut Instruction,
    in1: RegImm,
    in2: Option<RegImm>,
    backpatches: &mut [Backpatch],
) -> Result<u32, AsmError> {
    let Some(in2) = in2 else {
        return Ok(if in1.is_reg() {
            insn.input = (in1.val as u8) << 4;
            2
        } else {
            insn.input = in1.kind.tag() << 4;
            insn.set_imm(in1.kind, in1.val);
            in1.kind.tag() as u32
        });
    };

    let len = match (in1.kind, in2.kind) {
        (Kind::Reg, Kind::Reg) => {
            insn.input = (in1.val as u8) << 4 | in2.val as u8;
            2
        }
        (Kind::Reg, imm) => {
            insn.input = (in1.val as u8) << 4 | imm.tag();
            insn.set_imm(imm, in2.val);
            1 + imm.tag() as u32
        }
        (imm, Kind::Reg) => {
            insn.input = imm.tag() << 4 | in2.val as u8;
            insn.set_imm(imm, in1.val);
            1 + imm.tag() as u32
        }
        (Kind::Imm16, Kind::Imm16) => return Err(AsmError::TwoWordImmediates),
        (Kind::Imm8, _) => {
            // the second immediate always takes the word slot, even when byte sized
            insn.input = Kind::Imm8.tag() << 4 | Kind::Imm16.tag();
            insn.set_imm(Kind::Imm8, in1.val);
            insn.set_imm(Kind::Imm16, in2.val);
            if let Some(bp) = in2.patch.and_then(|i| backpatches.get_mut(i)) {
                bp.word_slot = true;
            }
            3
        }
        (Kind::Imm16, Kind::Imm8) => {
            insn.input = Kind::Imm16.tag() << 4 | Kind::Imm8.tag();
            insn.set_imm(Kind::Imm16, in1.val);
            insn.set_imm(Kind::Imm8, in2.val);
            3
        }
    };
    Ok(len)
}
