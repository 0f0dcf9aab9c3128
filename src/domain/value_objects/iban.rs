//! IBAN handling
//!
//! Spanish account numbers are printed on the form split across six boxes.

use serde::Deserialize;

/// A box of the split Spanish IBAN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IbanPart {
    /// `ES`
    Country,
    /// Two IBAN check digits
    Check,
    /// Four-digit entity code
    Entity,
    /// Four-digit branch code
    Branch,
    /// Two national control digits
    Control,
    /// Ten-digit account number
    Account,
}

impl IbanPart {
    fn range(self) -> std::ops::Range<usize> {
        match self {
            IbanPart::Country => 0..2,
            IbanPart::Check => 2..4,
            IbanPart::Entity => 4..8,
            IbanPart::Branch => 8..12,
            IbanPart::Control => 12..14,
            IbanPart::Account => 14..24,
        }
    }
}

/// Strip spaces and dashes and upper-case.
pub fn compact(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}

/// Extract one part of a Spanish IBAN.
///
/// Non-Spanish or short IBANs yield an empty string for every part.
pub fn spanish_part(raw: &str, part: IbanPart) -> String {
    let iban = compact(raw);
    if !iban.is_ascii() || !iban.starts_with("ES") || iban.len() < 24 {
        return String::new();
    }
    iban[part.range()].to_string()
}

/// ISO 13616 mod-97 check.
pub fn is_valid(raw: &str) -> bool {
    let iban = compact(raw);
    if iban.len() < 15 || iban.len() > 34 || !iban.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }
    let (head, tail) = iban.split_at(4);
    if !head[..2].chars().all(|c| c.is_ascii_uppercase()) || !head[2..].chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let mut remainder: u32 = 0;
    for c in tail.chars().chain(head.chars()) {
        let value = match c.to_digit(36) {
            Some(v) => v,
            None => return false,
        };
        let width = if value >= 10 { 100 } else { 10 };
        remainder = (remainder * width + value) % 97;
    }
    remainder == 1
}
