/// Fatal conditions raised while translating a program.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("too few operands for '{mnemonic}': {given}")]
    TooFewOperands { mnemonic: String, given: usize },
    #[error("unknown mnemonic: '{0}'")]
    UnknownMnemonic(String),
    #[error("not a register: '{0}'")]
    MissingRegister(String),
    #[error("unknown flag: '{0}'")]
    UnknownFlag(String),
    #[error("unknown prefix: '{0}'")]
    UnknownPrefix(String),
    #[error("unexpected token after value: '{0}'")]
    UnexpectedToken(String),
    #[error("failed conversion to integer: '{0}'")]
    BadLiteral(String),
    #[error("integer literal out of range: '{0}'")]
    LiteralOutOfRange(String),
    #[error("label requires an explicit size prefix: '{0}'")]
    LabelNeedsPrefix(String),
    #[error("both literals are imm16")]
    TwoWordImmediates,
    #[error("unknown label: {0}")]
    UnknownLabel(String),
    #[error("label cannot fit in a byte: '{label}' -> {addr}")]
    LabelTooFar { label: String, addr: u32 },
    #[error("backpatch refers to missing instruction #{insn_idx}")]
    DanglingPatch { insn_idx: usize },
}

/// An [`AsmError`] with the location it was raised at.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("line {line}: {source} (in `{text}`)")]
    Line {
        line: usize,
        text: String,
        #[source]
        source: AsmError,
    },
    #[error("label resolution failed: {0}")]
    Resolve(#[source] AsmError),
}

impl Error {
    pub fn kind(&self) -> &AsmError {
        match self {
            Error::Line { source, .. } => source,
            Error::Resolve(source) => source,
        }
    }
}
