//! Recognisers for the value field of an element card.

/// Scale suffixes, longest first so `MEG` and `MIL` win over `M`.
const SCALES: &[&str] = &["MEG", "MIL", "T", "G", "K", "M", "U", "N", "P", "F", ""];

/// Unit tails SPICE tolerates after a number.
const UNITS: &[&str] = &["", "F", "H", "V", "A", "OHM", "OHMS", "Ω", "R", "S", "HZ", "W"];

/// What an element card expects in its value position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Magnitude with optional scale and unit (R, C, L).
    Number,
    /// Magnitude, optionally preceded by `DC` or `AC` (V).
    Source,
    /// Model or subcircuit name (D, Q, X).
    Model,
}

impl ValueKind {
    pub fn for_prefix(prefix: char) -> Self {
        match prefix {
            'V' => ValueKind::Source,
            'D' | 'Q' | 'X' => ValueKind::Model,
            _ => ValueKind::Number,
        }
    }

    pub fn accepts(self, value: &str) -> bool {
        match self {
            ValueKind::Number => is_spice_number(value),
            ValueKind::Source => is_source_value(value),
            ValueKind::Model => is_model_name(value),
        }
    }
}

/// `4.7k`, `100nF`, `1e-3`, `2MEG`, `10µ`, `470Ω` and the like.
pub fn is_spice_number(value: &str) -> bool {
    let value = value.trim();
    let split = numeric_prefix_len(value);
    if split == 0 {
        return false;
    }

    // 'µ'.to_uppercase() is Greek capital mu, so fold the micro signs first.
    let suffix: String = value[split..]
        .chars()
        .map(|c| match c {
            'µ' | 'μ' => 'U',
            'ω' => 'Ω',
            c => c.to_ascii_uppercase(),
        })
        .collect();

    SCALES.iter().any(|scale| {
        suffix
            .strip_prefix(scale)
            .is_some_and(|unit| UNITS.contains(&unit))
    })
}

/// A number, optionally introduced by a `DC` or `AC` keyword.
pub fn is_source_value(value: &str) -> bool {
    let value = value.trim();
    let mut parts = value.splitn(2, char::is_whitespace);
    match (parts.next(), parts.next()) {
        (Some(keyword), Some(rest))
            if keyword.eq_ignore_ascii_case("DC") || keyword.eq_ignore_ascii_case("AC") =>
        {
            is_spice_number(rest)
        }
        _ => is_spice_number(value),
    }
}

/// A single token usable as a `.model` or `.subckt` name, e.g. `1N4148`,
/// `2N3904`, `LM741`.
pub fn is_model_name(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty()
        && value.chars().any(|c| c.is_ascii_alphabetic())
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
}

/// Byte length of the leading `[+-]digits[.digits][e[+-]digits]` run, or 0
/// if there is no mantissa digit.
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let mut digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return 0;
    }

    // Exponent only counts when digits follow; otherwise `E` is left for the suffix.
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > start {
            i = j;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        for ok in [
            "4.7k", "10", "1e-3", "2.2E+6", "-5", ".5", "100nF", "10uF", "10µF", "2MEG", "1Meg",
            "10mil", "1kΩ", "470ohm", "330R", "60Hz", "5V", "20mA", "1F", " 3.3k ",
        ] {
            assert!(is_spice_number(ok), "{ok} should parse");
        }
        for bad in ["", "banana", "k10", "1..2", "4.7 k", "1x", "e5", "-", "1kk", "1e"] {
            assert!(!is_spice_number(bad), "{bad} should not parse");
        }
    }

    #[test]
    fn test_exponent_without_digits_is_not_swallowed() {
        assert_eq!(numeric_prefix_len("1e"), 1);
        assert_eq!(numeric_prefix_len("1e5k"), 3);
        assert_eq!(numeric_prefix_len("+2.5e-1"), 7);
        assert_eq!(numeric_prefix_len("x"), 0);
    }

    #[test]
    fn test_source_values() {
        assert!(is_source_value("9V"));
        assert!(is_source_value("DC 5"));
        assert!(is_source_value("ac 1"));
        assert!(!is_source_value("DC"));
        assert!(!is_source_value("battery"));
    }

    #[test]
    fn test_model_names() {
        assert!(is_model_name("1N4148"));
        assert!(is_model_name("2N3904"));
        assert!(is_model_name("LED_RED"));
        assert!(!is_model_name(""));
        assert!(!is_model_name("123"));
        assert!(!is_model_name("red led"));
    }

    #[test]
    fn test_kind_for_prefix() {
        assert_eq!(ValueKind::for_prefix('R'), ValueKind::Number);
        assert_eq!(ValueKind::for_prefix('V'), ValueKind::Source);
        assert_eq!(ValueKind::for_prefix('X'), ValueKind::Model);
        assert!(ValueKind::Model.accepts("LM741"));
        assert!(!ValueKind::Number.accepts("LM741"));
    }
}
