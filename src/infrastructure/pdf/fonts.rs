//! Standard-14 Helvetica metrics and WinAnsi encoding
//!
//! Only the two faces the overlay uses are covered. Widths are in 1/1000 em
//! and come from the Adobe core font metrics.

use crate::domain::entities::FontFace;

/// Resource names the overlay refers to; the template adapter registers them.
pub const REGULAR_RESOURCE: &str = "CsHelv";
pub const BOLD_RESOURCE: &str = "CsHelvB";

pub fn resource_name(face: FontFace) -> &'static str {
    match face {
        FontFace::Helvetica => REGULAR_RESOURCE,
        FontFace::HelveticaBold => BOLD_RESOURCE,
    }
}

/// Widths of ASCII 32..=126 in Helvetica
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Widths of ASCII 32..=126 in Helvetica-Bold
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn ascii_width(face: FontFace, c: char) -> Option<u16> {
    let code = c as u32;
    if !(32..=126).contains(&code) {
        return None;
    }
    let table = match face {
        FontFace::Helvetica => &HELVETICA,
        FontFace::HelveticaBold => &HELVETICA_BOLD,
    };
    Some(table[(code - 32) as usize])
}

/// Unaccented letter sharing the glyph width of an accented one
fn base_letter(c: char) -> Option<char> {
    Some(match c {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' | 'Ÿ' => 'Y',
        'Š' => 'S',
        'Ž' => 'Z',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'š' => 's',
        'ž' => 'z',
        _ => return None,
    })
}

/// Advance width of `c` in 1/1000 em.
pub fn char_width(face: FontFace, c: char) -> u16 {
    if let Some(width) = ascii_width(face, c) {
        return width;
    }
    // Dotless-i accents are wider than the plain 'i'.
    if matches!(c, 'ì' | 'í' | 'î' | 'ï') {
        return 278;
    }
    if let Some(width) = base_letter(c).and_then(|b| ascii_width(face, b)) {
        return width;
    }
    let bold = face == FontFace::HelveticaBold;
    match c {
        '·' | '\u{a0}' => 278,
        '¡' => 333,
        '¿' => 611,
        'ª' => 370,
        'º' => 365,
        '«' | '»' | '€' | '–' => 556,
        '—' | '…' | '‰' => 1000,
        '•' => 350,
        '‘' | '’' | '‚' => if bold { 278 } else { 222 },
        '“' | '”' | '„' => if bold { 500 } else { 333 },
        '°' => 400,
        '§' => 556,
        'Æ' => 1000,
        'æ' => 889,
        _ => 556,
    }
}

/// Width of `text` at `size` points.
pub fn text_width(face: FontFace, text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(face, c))).sum();
    units as f32 * size / 1000.0
}

/// Encode text as WinAnsi (Windows-1252) bytes.
///
/// Characters outside the code page become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8a,
            '‹' => 0x8b,
            'Œ' => 0x8c,
            'Ž' => 0x8e,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9a,
            '›' => 0x9b,
            'œ' => 0x9c,
            'ž' => 0x9e,
            'Ÿ' => 0x9f,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_widths() {
        assert_eq!(char_width(FontFace::Helvetica, ' '), 278);
        assert_eq!(char_width(FontFace::Helvetica, '0'), 556);
        assert_eq!(char_width(FontFace::Helvetica, 'W'), 944);
        assert_eq!(char_width(FontFace::Helvetica, 'i'), 222);
        assert_eq!(char_width(FontFace::HelveticaBold, 'i'), 278);
        assert_eq!(char_width(FontFace::HelveticaBold, 'X'), 667);
        assert_eq!(char_width(FontFace::Helvetica, '~'), 584);
    }

    #[test]
    fn accented_letters_follow_their_base() {
        assert_eq!(char_width(FontFace::Helvetica, 'Ñ'), 722);
        assert_eq!(char_width(FontFace::Helvetica, 'é'), 556);
        assert_eq!(char_width(FontFace::Helvetica, 'í'), 278);
        assert_eq!(char_width(FontFace::HelveticaBold, 'ç'), 556);
    }

    #[test]
    fn text_width_scales_with_size() {
        // "1.234,56": six digits, one period, one comma
        let width = text_width(FontFace::Helvetica, "1.234,56", 10.0);
        assert!((width - 38.92).abs() < 1e-3, "{width}");
    }

    #[test]
    fn win_ansi_encoding() {
        assert_eq!(encode_win_ansi("Año"), vec![b'A', 0xf1, b'o']);
        assert_eq!(encode_win_ansi("l·l"), vec![b'l', 0xb7, b'l']);
        assert_eq!(encode_win_ansi("5 €"), vec![b'5', b' ', 0x80]);
        assert_eq!(encode_win_ansi("日"), vec![b'?']);
    }
}
