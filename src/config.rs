use serde::{Deserialize, Serialize};

/// How the first pass advances the program counter after each instruction.
///
/// Label addresses are taken from this counter, while the emitter always
/// recomputes addresses from the encoded `in` byte. The two only agree under
/// [`PcAdvance::Encoded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PcAdvance {
    /// Length reported by the input-slot packer: `mov` with an immediate
    /// advances by the immediate's kind tag (1 or 2) instead of 2 or 3 words.
    #[default]
    Legacy,
    /// True encoded length: 2 words, plus 1 when a word payload is emitted.
    Encoded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// One token per line, no addresses.
    #[default]
    Compact,
    /// `%08x: ` address prefix, tokens space separated.
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsmConfig {
    pub origin: u32, // in words
    pub pc_advance: PcAdvance,
    pub max_operands: usize,
}

pub const MAX_OPERANDS: usize = 4;

impl Default for AsmConfig {
    fn default() -> Self {
        Self {
            origin: 0,
            pc_advance: PcAdvance::Legacy,
            max_operands: MAX_OPERANDS,
        }
    }
}
