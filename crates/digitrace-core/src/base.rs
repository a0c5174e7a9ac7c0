//! Numeral base configuration: digit labels, names and display colors.

use serde::Serialize;

use crate::error::{Error, Result};

pub const MIN_BASE: u8 = 2;
pub const MAX_BASE: u8 = 16;

const LABELS: [char; 16] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F',
];

/// Everything a renderer needs to draw one digit alphabet.
///
/// `labels.len() == colors.len() == base` always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseConfig {
    pub base: u8,
    pub name: &'static str,
    pub labels: Vec<String>,
    pub colors: Vec<String>,
}

/// Build the configuration for `base`.
pub fn configure_base(base: u8) -> Result<BaseConfig> {
    check_base(base)?;
    Ok(BaseConfig {
        base,
        name: base_name(base),
        labels: (0..base).map(|d| label(d).to_string()).collect(),
        colors: (0..base).map(|d| color(d, base)).collect(),
    })
}

/// Reject bases outside `2..=16`.
pub fn check_base(base: u8) -> Result<()> {
    if (MIN_BASE..=MAX_BASE).contains(&base) {
        Ok(())
    } else {
        Err(Error::InvalidBase(base))
    }
}

/// Label for a digit value: `0`-`9` then `A`-`F`.
///
/// Values above 15 are not digits in any supported base and map to `?`.
pub fn label(digit: u8) -> char {
    LABELS.get(digit as usize).copied().unwrap_or('?')
}

/// Parse a single digit label (case-insensitive) and check it against `base`.
pub fn parse_digit_label(text: &str, base: u8) -> Result<u8> {
    let trimmed = text.trim();
    let invalid = || Error::InvalidDigit {
        digit: trimmed.to_string(),
        base,
    };
    let mut chars = trimmed.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return Err(invalid());
    };
    let value = c.to_digit(16).ok_or_else(invalid)? as u8;
    if value < base {
        Ok(value)
    } else {
        Err(invalid())
    }
}

/// Conventional name of a base.
pub fn base_name(base: u8) -> &'static str {
    match base {
        2 => "Binary",
        3 => "Ternary",
        4 => "Quaternary",
        5 => "Quinary",
        6 => "Senary",
        7 => "Septenary",
        8 => "Octal",
        9 => "Nonary",
        10 => "Decimal",
        11 => "Undecimal",
        12 => "Duodecimal",
        13 => "Tridecimal",
        14 => "Tetradecimal",
        15 => "Pentadecimal",
        16 => "Hexadecimal",
        _ => "Unsupported",
    }
}

// Hue walks from blue toward cyan and lightness drops 2% per digit, so every
// digit in a base gets a distinct color.
fn color(digit: u8, base: u8) -> String {
    let span = f64::from(base.saturating_sub(1).max(1));
    let hue = 240.0 - f64::from(digit) / span * 60.0;
    let lightness = 60 - 2 * u32::from(digit);
    format!("hsl({hue:.1}, 70%, {lightness}%)")
}
