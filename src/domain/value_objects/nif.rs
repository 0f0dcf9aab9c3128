//! Spanish tax identifiers (DNI, NIE, CIF) and postal codes

const CONTROL_LETTERS: &[u8; 23] = b"TRWAGMYFPDXBNJZSQVHLCKE";
const CIF_PREFIXES: &str = "ABCDEFGHJKLMNPQRSUVW";

/// Kind of identifier a value was recognized as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NifKind {
    Dni,
    Nie,
    Cif,
}

fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}

fn control_letter(number: u32) -> char {
    CONTROL_LETTERS[(number % 23) as usize] as char
}

/// Validate a DNI or NIE control letter, or the shape of a CIF.
///
/// Returns the recognized kind, or `None` when the value is not a valid
/// identifier.
pub fn classify(raw: &str) -> Option<NifKind> {
    let nif = normalize(raw);
    if nif.len() != 9 || !nif.is_ascii() {
        return None;
    }
    let first = nif.chars().next()?;
    let last = nif.chars().last()?;
    let middle = &nif[1..8];

    if first.is_ascii_digit() {
        let number: u32 = nif[..8].parse().ok()?;
        return (control_letter(number) == last).then_some(NifKind::Dni);
    }

    if let Some(prefix) = "XYZ".find(first) {
        if !middle.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let number: u32 = format!("{prefix}{middle}").parse().ok()?;
        return (control_letter(number) == last).then_some(NifKind::Nie);
    }

    let cif_shape = CIF_PREFIXES.contains(first)
        && middle.chars().all(|c| c.is_ascii_digit())
        && (last.is_ascii_digit() || ('A'..='J').contains(&last));
    cif_shape.then_some(NifKind::Cif)
}

pub fn is_valid(raw: &str) -> bool {
    classify(raw).is_some()
}

/// Five-digit Spanish postal code.
pub fn is_valid_postal_code(raw: &str) -> bool {
    let code = raw.trim();
    code.len() == 5 && code.chars().all(|c| c.is_ascii_digit())
}
