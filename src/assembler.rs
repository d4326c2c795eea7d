use tracing::{debug, info};

use crate::backpatch::{self, Backpatch, LabelAddr};
use crate::config::{AsmConfig, OutputMode, PcAdvance};
use crate::emit::{self, ListingEntry};
use crate::encoder::{self, Instruction};
use crate::error::Error;
use crate::lexer;

/// First-pass state: the instruction table, label table and pending
/// backpatches, all append-only until [`Assembler::finish`].
#[derive(Debug, Clone)]
pub struct Assembler {
    cfg: AsmConfig,
    insns: Vec<Instruction>,
    labels: Vec<LabelAddr>,
    backpatches: Vec<Backpatch>,
    pc: u32,
    line_no: usize,
}

/// A fully resolved program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub origin: u32,
    pub insns: Vec<Instruction>,
    pub labels: Vec<LabelAddr>,
}

impl Assembler {
    pub fn new(cfg: AsmConfig) -> Self {
        Self {
            cfg,
            insns: Vec::new(),
            labels: Vec::new(),
            backpatches: Vec::new(),
            pc: cfg.origin,
            line_no: 0,
        }
    }

    /// Program counter (in words) the next label would be defined at.
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Run one source line through the first pass.
    pub fn feed_line(&mut self, text: &str) -> Result<(), Error> {
        self.line_no += 1;
        let line = lexer::split_line(text, self.cfg.max_operands);

        if let Some(name) = line.label {
            debug!(label = name, addr = self.pc, "label defined");
            self.labels.push(LabelAddr { name: name.to_string(), addr: self.pc });
        }
        let Some(mnemonic) = line.mnemonic else {
            return Ok(());
        };

        // a failed line must not leave its label references behind
        let pending = self.backpatches.len();
        let encoded = encoder::encode(mnemonic, &line.operands, self.insns.len(), &mut self.backpatches)
            .map_err(|source| {
                self.backpatches.truncate(pending);
                Error::Line {
                    line: self.line_no,
                    text: text.trim_end().to_string(),
                    source,
                }
            })?;

        let advance = match self.cfg.pc_advance {
            PcAdvance::Legacy => encoded.legacy_len,
            PcAdvance::Encoded => encoded.insn.words(),
        };
        self.pc = self.pc.wrapping_add(advance);
        self.insns.push(encoded.insn);
        Ok(())
    }

    /// Second pass: patch every label reference.
    pub fn finish(self) -> Result<Program, Error> {
        let Assembler { cfg, mut insns, labels, backpatches, .. } = self;
        backpatch::resolve(&mut insns, &labels, &backpatches).map_err(Error::Resolve)?;
        info!(
            instructions = insns.len(),
            labels = labels.len(),
            backpatches = backpatches.len(),
            "assembled"
        );
        Ok(Program { origin: cfg.origin, insns, labels })
    }
}

/// Assemble a whole source, one item per line.
pub fn assemble<I, S>(lines: I, cfg: AsmConfig) -> Result<Program, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut asm = Assembler::new(cfg);
    for line in lines {
        asm.feed_line(line.as_ref())?;
    }
    asm.finish()
}

impl Program {
    pub fn listing(&self) -> Vec<ListingEntry> {
        emit::listing(&self.insns, self.origin)
    }

    pub fn render(&self, mode: OutputMode) -> String {
        emit::render(&self.insns, self.origin, mode)
    }

    pub fn render_json(&self) -> serde_json::Result<String> {
        emit::render_json(&self.insns, self.origin)
    }

    pub fn label(&self, name: &str) -> Option<u32> {
        backpatch::lookup(&self.labels, name).map(|l| l.addr)
    }
}
