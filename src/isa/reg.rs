/// Register names in index order.
pub const NAMES: [&str; 16] = [
    "ir1", "ir2", "ir3", "flag", //
    "iv", "a", "b", "c", //
    "d", "e", "mem", "bank", //
    "addr", "ip", "sp", "zr",
];

/// Index (0..16) of a register name, matched case-insensitively.
pub fn index_of(name: &str) -> Option<u8> {
    NAMES
        .iter()
        .position(|r| r.eq_ignore_ascii_case(name))
        .map(|i| i as u8)
}

pub fn name_of(index: u8) -> Option<&'static str> {
    NAMES.get(index as usize).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for (i, name) in NAMES.iter().enumerate() {
            let idx = index_of(name).unwrap();
            assert_eq!(idx as usize, i);
            assert_eq!(name_of(idx), Some(*name));
        }
    }

    #[test]
    fn case_insensitive_and_unknown() {
        assert_eq!(index_of("A"), Some(5));
        assert_eq!(index_of("Sp"), Some(14));
        assert_eq!(index_of("r0"), None);
        assert_eq!(index_of(""), None);
        assert_eq!(name_of(16), None);
    }
}
