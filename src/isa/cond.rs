use crate::error::AsmError;

pub const NEVER: u8 = 0;
pub const ALWAYS: u8 = 1;

/// Set when the condition tests for a cleared flag.
const NEGATE: u8 = 1;

/// Condition code for a mnemonic suffix (`"z"`, `"nc"`, `"nop"`, ...).
/// `None` means the mnemonic had no suffix.
pub fn code_of(suffix: Option<&str>) -> Result<u8, AsmError> {
    let Some(suffix) = suffix else {
        return Ok(ALWAYS);
    };
    let lower = suffix.to_ascii_lowercase();
    if lower == "nop" {
        return Ok(NEVER);
    }
    let (flag, negate) = match lower.strip_prefix('n') {
        Some(rest) => (rest, NEGATE),
        None => (lower.as_str(), 0),
    };
    let base = match flag {
        "c" => 2,
        "v" => 4,
        "z" => 6,
        "s" => 8,
        _ => return Err(AsmError::UnknownFlag(suffix.to_string())),
    };
    Ok(base | negate)
}

/// Split `add.nz` into `("add", Some("nz"))`.
pub fn split_suffix(mnemonic: &str) -> (&str, Option<&str>) {
    match mnemonic.split_once('.') {
        Some((base, suffix)) => (base, Some(suffix)),
        None => (mnemonic, None),
    }
}
