//! Byte sizes written with unit suffixes ("256MB", "1G", "512kb").

use thiserror::Error;

const KB: usize = 1024;
const MB: usize = 1024 * KB;
const GB: usize = 1024 * MB;

/// Recognized unit suffixes, matched case-insensitively.
const UNITS: [(&str, usize); 6] = [
    ("GB", GB),
    ("MB", MB),
    ("KB", KB),
    ("G", GB),
    ("M", MB),
    ("K", KB),
];

/// A size string that is not a whole number with an optional unit.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid size '{0}' - expected a byte count or a value like '256MB', '1GB', '512KB'")]
pub struct SizeParseError(String);

/// Parse a byte count with an optional, case-insensitive KB/MB/GB suffix.
///
/// ```
/// use streetroute::config::parse_size;
///
/// assert_eq!(parse_size("2048").unwrap(), 2048);
/// assert_eq!(parse_size("256mb").unwrap(), 256 * 1024 * 1024);
/// assert_eq!(parse_size("1 G").unwrap(), 1024 * 1024 * 1024);
/// ```
pub fn parse_size(input: &str) -> Result<usize, SizeParseError> {
    let trimmed = input.trim();
    let upper = trimmed.to_ascii_uppercase();

    let (digits, multiplier) = UNITS
        .iter()
        .find_map(|(suffix, bytes)| upper.strip_suffix(suffix).map(|rest| (rest, *bytes)))
        .unwrap_or((upper.as_str(), 1));

    let digits = digits.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SizeParseError(input.to_string()));
    }

    digits
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(|| SizeParseError(input.to_string()))
}

/// Format a byte count with the largest unit that divides it exactly.
pub fn format_size(bytes: usize) -> String {
    match bytes {
        0 => "0".to_string(),
        b if b % GB == 0 => format!("{}GB", b / GB),
        b if b % MB == 0 => format!("{}MB", b / MB),
        b if b % KB == 0 => format!("{}KB", b / KB),
        b => b.to_string(),
    }
}
