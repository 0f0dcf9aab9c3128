//! Display formatting of resolved values
//!
//! Turns a JSON value into the text painted on the form according to the
//! field's [`Format`]. Absent values never reach this module; the resolver
//! blanks them first.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::entities::Format;
use crate::domain::services::resolver::is_truthy;
use crate::domain::value_objects::amount::{self, round_half_up};

const YES: &str = "Sí";
const NO: &str = "No";

/// Why a value could not be formatted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError(pub String);

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Locale knobs shared by every field of a run
#[derive(Debug, Clone, PartialEq)]
pub struct FormatOptions {
    /// chrono strftime pattern for `date` fields
    pub date_pattern: String,
    /// Fraction digits for `decimal` and `currency`
    pub fraction_digits: u32,
    pub decimal_separator: char,
    /// Grouping character used by `currency`
    pub thousands_separator: char,
    /// Render zero amounts as empty boxes
    pub blank_zero_amounts: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            date_pattern: "%d/%m/%Y".to_string(),
            fraction_digits: 2,
            decimal_separator: ',',
            thousands_separator: '.',
            blank_zero_amounts: true,
        }
    }
}

/// Reject strftime patterns chrono cannot render.
pub fn check_date_pattern(pattern: &str) -> Result<(), String> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(format!("invalid date pattern '{pattern}'"));
    }
    Ok(())
}

/// Coerce any JSON value to plain text.
pub fn raw_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match amount::decimal_from_json(value) {
            Some(d) if n.is_f64() => d.normalize().to_string(),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Parse a number written the way humans write it on Spanish forms.
///
/// `1.234,56`, `1,234.56`, `1234,56` and `12 %` are all understood. A lone
/// dot is a decimal point, so `1.234` reads as 1.234: amounts written back
/// into the tree use that form.
pub fn parse_lenient(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(text) => {
            let mut text: String = text
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '%')
                .collect();
            match (text.rfind(','), text.rfind('.')) {
                (Some(comma), Some(dot)) if comma > dot => {
                    text = text.replace('.', "").replace(',', ".");
                }
                (Some(_), Some(_)) => text = text.replace(',', ""),
                (Some(_), None) => text = text.replace(',', "."),
                _ => {}
            }
            amount::parse_decimal(&text)
        }
        other => amount::decimal_from_json(other),
    }
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    // Accept full timestamps by keeping the calendar date.
    let date_part = match text.char_indices().nth(10) {
        Some((idx, 'T')) | Some((idx, ' ')) => &text[..idx],
        _ => text,
    };
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn group_thousands(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }
    grouped
}

/// Fixed-point text with the configured separators, never scientific.
pub fn fixed_point(value: Decimal, options: &FormatOptions, grouped: bool) -> String {
    let rounded = round_half_up(value, options.fraction_digits);
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text, None),
    };
    let int_part = if grouped {
        group_thousands(&int_part, options.thousands_separator)
    } else {
        int_part
    };

    let mut out = String::new();
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    out.push_str(&int_part);
    if let Some(frac) = frac_part {
        out.push(options.decimal_separator);
        out.push_str(&frac);
    }
    out
}

/// Render a `YYYY-MM-DD` value with a strftime pattern.
pub fn format_date(value: &Value, pattern: &str) -> Result<String, FormatError> {
    let date = parse_date(value).ok_or_else(|| FormatError("expected a YYYY-MM-DD date".to_string()))?;
    let mut out = String::new();
    write!(out, "{}", date.format(pattern)).map_err(|_| FormatError(format!("invalid date pattern '{pattern}'")))?;
    Ok(out)
}

/// Format a present value for display.
pub fn format_value(value: &Value, format: Format, options: &FormatOptions) -> Result<String, FormatError> {
    match format {
        Format::Blank => Ok(String::new()),
        Format::Raw => Ok(raw_text(value)),
        Format::Date => format_date(value, &options.date_pattern),
        Format::BooleanText => Ok(if is_truthy(value) { YES } else { NO }.to_string()),
        Format::Decimal | Format::Currency => {
            let number = parse_lenient(value)
                .ok_or_else(|| FormatError("expected a number".to_string()))?;
            let rounded = round_half_up(number, options.fraction_digits);
            if rounded.is_zero() && options.blank_zero_amounts {
                return Ok(String::new());
            }
            Ok(fixed_point(rounded, options, format == Format::Currency))
        }
        Format::Integer => {
            let number = parse_lenient(value)
                .ok_or_else(|| FormatError("expected an integer".to_string()))?;
            Ok(number.trunc().normalize().to_string())
        }
    }
}
