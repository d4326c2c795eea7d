/// One source line split into its parts. Borrowed from the input line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceLine<'a> {
    pub label: Option<&'a str>,
    pub mnemonic: Option<&'a str>,
    pub operands: Vec<&'a str>,
}

/// Split `line` into `[label:] mnemonic [operand[, operand]*]`.
///
/// A label is recognised when the text before the first `:` is a single
/// token. A line with no mnemonic token yields `mnemonic: None`; it still
/// defines its label, if any. Empty comma fields are skipped and at most
/// `max_operands` operands are kept.
pub fn split_line(line: &str, max_operands: usize) -> SourceLine<'_> {
    let mut rest = line;
    let mut label = None;
    if let Some(colon) = line.find(':') {
        let head = line[..colon].trim();
        if !head.is_empty() && !head.contains(char::is_whitespace) {
            label = Some(head);
            rest = &line[colon + 1..];
        }
    }

    let rest = rest.trim_start();
    let (mnemonic, tail) = match rest.find(char::is_whitespace) {
        Some(end) => (&rest[..end], &rest[end..]),
        None => (rest, ""),
    };
    if mnemonic.is_empty() {
        return SourceLine { label, mnemonic: None, operands: Vec::new() };
    }

    let operands = tail
        .split(',')
        .map(str::trim)
        .filter(|op| !op.is_empty())
        .take(max_operands)
        .collect();

    SourceLine { label, mnemonic: Some(mnemonic), operands }
}
