use serde::Serialize;

use crate::config::OutputMode;
use crate::encoder::Instruction;

/// One instruction with the address the emitter assigns to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    pub addr: u32,
    pub words: u32,
    #[serde(flatten)]
    pub insn: Instruction,
}

/// Lay out `insns` from `origin`. Each instruction takes 2 words, plus one
/// when its `in` byte names a word immediate.
pub fn listing(insns: &[Instruction], origin: u32) -> Vec<ListingEntry> {
    let mut addr = origin;
    insns
        .iter()
        .map(|insn| {
            let entry = ListingEntry { addr, words: insn.words(), insn: *insn };
            addr = addr.wrapping_add(entry.words);
            entry
        })
        .collect()
}

fn fields(insn: &Instruction) -> impl Iterator<Item = String> {
    let tail = insn.has_word_payload().then(|| format!("{:04X}", insn.imm16));
    [insn.op, insn.out, insn.input, insn.imm8]
        .into_iter()
        .map(|b| format!("{b:02X}"))
        .chain(tail)
}

/// Render the hex stream. Compact puts every token on its own line; debug
/// prints one `%08x: `-prefixed line per instruction.
pub fn render(insns: &[Instruction], origin: u32, mode: OutputMode) -> String {
    let mut out = String::new();
    for entry in listing(insns, origin) {
        match mode {
            OutputMode::Compact => {
                for tok in fields(&entry.insn) {
                    out.push_str(&tok);
                    out.push('\n');
                }
            }
            OutputMode::Debug => {
                let toks = fields(&entry.insn).collect::<Vec<_>>();
                out.push_str(&format!("{:08x}: {}\n", entry.addr, toks.join(" ")));
            }
        }
    }
    out
}

pub fn render_json(insns: &[Instruction], origin: u32) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&listing(insns, origin))
}
