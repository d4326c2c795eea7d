use tracing::trace;

use crate::backpatch::{Backpatch, Target};
use crate::error::AsmError;
use crate::isa::reg;

/// What an input slot holds. The discriminant is the nibble written for an
/// immediate, so `Imm8` and `Imm16` alias register indices 1 and 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Reg = 0,
    Imm8 = 1,
    Imm16 = 2,
}

impl Kind {
    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// A resolved operand, alive only while its line is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegImm {
    pub kind: Kind,
    /// Register index or immediate value.
    pub val: u16,
    /// Index into the backpatch list when `val` is a placeholder for a label.
    pub patch: Option<usize>,
}

impl RegImm {
    pub fn reg(index: u8) -> Self {
        Self { kind: Kind::Reg, val: index as u16, patch: None }
    }

    pub fn imm(kind: Kind, val: u16) -> Self {
        Self { kind, val, patch: None }
    }

    pub fn is_reg(&self) -> bool {
        self.kind == Kind::Reg
    }
}

fn parse_prefix(prefix: &str) -> Result<Kind, AsmError> {
    if prefix.eq_ignore_ascii_case("byte") {
        Ok(Kind::Imm8)
    } else if prefix.eq_ignore_ascii_case("word") {
        Ok(Kind::Imm16)
    } else {
        Err(AsmError::UnknownPrefix(prefix.to_string()))
    }
}

/// Parse an integer literal with C radix rules (`0x` hex, leading `0` octal,
/// decimal otherwise, optional sign).
///
/// Returns `Ok(None)` when no digits could be read at all, which callers treat
/// as a label. Digits followed by anything else are an error.
pub fn parse_integer(text: &str) -> Result<Option<i64>, AsmError> {
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let hex_body = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_hexdigit()));
    let (radix, body) = match hex_body {
        Some(rest) => (16, rest),
        None if unsigned.starts_with('0') => (8, unsigned),
        None => (10, unsigned),
    };

    let end = body
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(body.len());
    if end == 0 {
        return Ok(None);
    }
    if end != body.len() {
        return Err(AsmError::BadLiteral(text.to_string()));
    }

    let magnitude = i64::from_str_radix(&body[..end], radix)
        .map_err(|_| AsmError::LiteralOutOfRange(text.to_string()))?;
    Ok(Some(if negative { -magnitude } else { magnitude }))
}

/// Resolve one operand to a register or a sized immediate.
///
/// Grammar: `[byte|word] value`. Without a size keyword a register name is
/// tried first. A value that is not a number is a label; it needs a size
/// keyword, and a [`Backpatch`] against `insn_idx` is queued for it.
pub fn resolve(
    operand: &str,
    insn_idx: usize,
    backpatches: &mut Vec<Backpatch>,
) -> Result<RegImm, AsmError> {
    let mut tokens = operand.split_whitespace();
    let first = tokens.next().unwrap_or("");
    let (prefix, value) = match tokens.next() {
        Some(value) => (Some(first), value),
        None => (None, first),
    };
    if let Some(extra) = tokens.next() {
        return Err(AsmError::UnexpectedToken(extra.to_string()));
    }

    if prefix.is_none() {
        if let Some(idx) = reg::index_of(value) {
            trace!(operand, idx, "register operand");
            return Ok(RegImm::reg(idx));
        }
    }

    let forced = prefix.map(parse_prefix).transpose()?;
    match parse_integer(value)? {
        Some(v) => {
            let kind = forced.unwrap_or(if (0..=0xFF).contains(&v) { Kind::Imm8 } else { Kind::Imm16 });
            trace!(operand, value = v, ?kind, "immediate operand");
            Ok(RegImm::imm(kind, v as u16))
        }
        None => {
            let kind = forced.ok_or_else(|| AsmError::LabelNeedsPrefix(value.to_string()))?;
            let target = if kind == Kind::Imm8 { Target::Byte } else { Target::Word };
            backpatches.push(Backpatch::new(insn_idx, value, target));
            trace!(operand, label = value, ?target, "label reference");
            Ok(RegImm { kind, val: 0, patch: Some(backpatches.len() - 1) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve1(op: &str) -> Result<RegImm, AsmError> {
        resolve(op, 0, &mut Vec::new())
    }

    #[test]
    fn c_radix_literals() {
        assert_eq!(parse_integer("42"), Ok(Some(42)));
        assert_eq!(parse_integer("0x2A"), Ok(Some(42)));
        assert_eq!(parse_integer("0X2a"), Ok(Some(42)));
        assert_eq!(parse_integer("052"), Ok(Some(42)));
        assert_eq!(parse_integer("0"), Ok(Some(0)));
        assert_eq!(parse_integer("-1"), Ok(Some(-1)));
        assert_eq!(parse_integer("+7"), Ok(Some(7)));
    }

    #[test]
    fn non_numbers_and_garbage() {
        assert_eq!(parse_integer("loop"), Ok(None));
        assert_eq!(parse_integer("-x"), Ok(None));
        assert_eq!(parse_integer("12ab"), Err(AsmError::BadLiteral("12ab".into())));
        assert_eq!(parse_integer("09"), Err(AsmError::BadLiteral("09".into())));
        assert_eq!(parse_integer("0xg"), Err(AsmError::BadLiteral("0xg".into())));
        assert!(matches!(
            parse_integer("99999999999999999999"),
            Err(AsmError::LiteralOutOfRange(_))
        ));
    }

    #[test]
    fn size_defaults_by_magnitude() {
        assert_eq!(resolve1("0").unwrap().kind, Kind::Imm8);
        assert_eq!(resolve1("255").unwrap().kind, Kind::Imm8);
        assert_eq!(resolve1("256").unwrap().kind, Kind::Imm16);
        assert_eq!(resolve1("65535").unwrap(), RegImm::imm(Kind::Imm16, 0xFFFF));
        assert_eq!(resolve1("-1").unwrap(), RegImm::imm(Kind::Imm16, 0xFFFF));
    }

    #[test]
    fn size_keyword_overrides() {
        assert_eq!(resolve1("word 5").unwrap(), RegImm::imm(Kind::Imm16, 5));
        assert_eq!(resolve1("BYTE 0x10").unwrap(), RegImm::imm(Kind::Imm8, 0x10));
        assert_eq!(resolve1("dword 5"), Err(AsmError::UnknownPrefix("dword".into())));
        assert_eq!(resolve1("word 5 6"), Err(AsmError::UnexpectedToken("6".into())));
    }

    #[test]
    fn registers_only_without_keyword() {
        assert_eq!(resolve1("sp").unwrap(), RegImm::reg(14));
        // with a keyword the name is a label
        let mut bps = Vec::new();
        let ri = resolve("byte a", 3, &mut bps).unwrap();
        assert_eq!(ri, RegImm { kind: Kind::Imm8, val: 0, patch: Some(0) });
        assert_eq!(bps, vec![Backpatch::new(3, "a", Target::Byte)]);
    }

    #[test]
    fn labels_need_keyword() {
        assert_eq!(resolve1("loop"), Err(AsmError::LabelNeedsPrefix("loop".into())));
        let mut bps = Vec::new();
        resolve("word loop", 7, &mut bps).unwrap();
        assert_eq!(bps[0].target, Target::Word);
        assert_eq!(bps[0].insn_idx, 7);
    }
}
