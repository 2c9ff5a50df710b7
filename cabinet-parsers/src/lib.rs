//! Parsers turning raw environment strings into typed values.
//!
//! Every parser is a pure function of its input. Failures carry the canonical
//! `Failed to parse '<raw>' as <kind>` message.

#![warn(missing_docs, clippy::pedantic)]

use cabinet_primitives::ParseError;

/// Result alias for parser output.
pub type ParseResult<T> = Result<T, ParseError>;

const NONE_WORDS: &[&str] = &["none", "null", "nil"];
const TRUE_WORDS: &[&str] = &["y", "yes", "t", "true", "on", "1"];
const FALSE_WORDS: &[&str] = &["n", "no", "f", "false", "off", "0"];

/// Returns the raw string unchanged.
///
/// # Errors
///
/// Never fails; the signature matches the other parsers.
pub fn parse_as_is(raw: &str) -> ParseResult<String> {
    Ok(raw.to_owned())
}

/// Parses `none`, `null` or `nil`, ignoring case.
///
/// # Errors
///
/// Returns a [`ParseError`] for any other input.
pub fn parse_none(raw: &str) -> ParseResult<()> {
    let lowered = raw.to_lowercase();
    if NONE_WORDS.contains(&lowered.as_str()) {
        Ok(())
    } else {
        Err(ParseError::new(raw, "None"))
    }
}

/// Parses common boolean spellings, ignoring case.
///
/// # Errors
///
/// Returns a [`ParseError`] when the input is not a known spelling.
pub fn parse_bool(raw: &str) -> ParseResult<bool> {
    let lowered = raw.to_lowercase();
    if TRUE_WORDS.contains(&lowered.as_str()) {
        Ok(true)
    } else if FALSE_WORDS.contains(&lowered.as_str()) {
        Ok(false)
    } else {
        Err(ParseError::new(raw, "bool"))
    }
}

/// Parses a base-10 integer.
///
/// # Errors
///
/// Returns a [`ParseError`] when the input is not an integer or overflows `i64`.
pub fn parse_int(raw: &str) -> ParseResult<i64> {
    parse_int_radix(raw, 10)
}

/// Parses an integer in `base`.
///
/// Base `0` detects `0x`, `0o` and `0b` prefixes and rejects leading zeros;
/// bases 2, 8 and 16 accept their matching prefix. Single underscores between
/// digits are ignored.
///
/// # Errors
///
/// Returns a [`ParseError`] for malformed input or a base outside `0` and
/// `2..=36`.
pub fn parse_int_radix(raw: &str, base: u32) -> ParseResult<i64> {
    int_from_str(raw, base).ok_or_else(|| {
        if base == 10 {
            ParseError::new(raw, "int")
        } else {
            ParseError::new(raw, format!("int with base {base}"))
        }
    })
}

fn int_from_str(raw: &str, base: u32) -> Option<i64> {
    if base != 0 && !(2..=36).contains(&base) {
        return None;
    }

    let trimmed = raw.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (radix, digits) = split_radix_prefix(unsigned, base);
    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return None;
    }

    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    if !cleaned.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    if base == 0 && radix == 10 && cleaned.starts_with('0') && cleaned.chars().any(|c| c != '0')
    {
        return None;
    }

    let magnitude = i128::from_str_radix(&cleaned, radix).ok()?;
    let signed = if negative { -magnitude } else { magnitude };
    i64::try_from(signed).ok()
}

fn split_radix_prefix(digits: &str, base: u32) -> (u32, &str) {
    let prefix = digits.get(..2).map(str::to_ascii_lowercase);
    let prefixed = match prefix.as_deref() {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };

    match (base, prefixed) {
        (0, Some(radix)) => (radix, &digits[2..]),
        (0, None) => (10, digits),
        (base, Some(radix)) if base == radix => (base, &digits[2..]),
        (base, _) => (base, digits),
    }
}

/// Parses a floating point number, including `inf`, `infinity` and `nan`.
///
/// # Errors
///
/// Returns a [`ParseError`] when the input is not a number.
pub fn parse_float(raw: &str) -> ParseResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ParseError::new(raw, "float"))
}

/// Options for [`parse_str_with`].
#[derive(Clone, Copy, Debug)]
pub struct StrOptions {
    /// Reject strings that are empty after trimming.
    pub not_empty: bool,
    /// Trimming applied before the emptiness check.
    pub trim: fn(&str) -> &str,
}

impl Default for StrOptions {
    fn default() -> Self {
        Self {
            not_empty: true,
            trim: str::trim,
        }
    }
}

/// Trims surrounding whitespace and rejects empty strings.
///
/// # Errors
///
/// Returns a [`ParseError`] when nothing is left after trimming.
pub fn parse_str(raw: &str) -> ParseResult<String> {
    parse_str_with(raw, StrOptions::default())
}

/// Trims with `options.trim` and optionally rejects empty strings.
///
/// # Errors
///
/// Returns a [`ParseError`] when `options.not_empty` is set and nothing is left
/// after trimming.
pub fn parse_str_with(raw: &str, options: StrOptions) -> ParseResult<String> {
    let parsed = (options.trim)(raw);
    if options.not_empty && parsed.is_empty() {
        return Err(ParseError::new(raw, "non-empty str"));
    }
    Ok(parsed.to_owned())
}

/// Splits `raw` on `separator` and parses every element with `subparser`.
///
/// One pair of surrounding parentheses and one trailing separator are
/// stripped first, so `"(a, b,)"` yields two elements.
///
/// # Errors
///
/// Returns a [`ParseError`] embedding the element failure, or when
/// `separator` is empty.
pub fn parse_tuple<T, P>(raw: &str, separator: &str, subparser: P) -> ParseResult<Vec<T>>
where
    P: Fn(&str) -> ParseResult<T>,
{
    if separator.is_empty() {
        return Err(ParseError::new(raw, "tuple"));
    }

    let mut value = raw;
    if let Some(inner) = value.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        value = inner;
    }
    if let Some(stripped) = value.strip_suffix(separator) {
        value = stripped;
    }

    value
        .split(separator)
        .map(&subparser)
        .collect::<ParseResult<Vec<T>>>()
        .map_err(|err| ParseError::nested(value, "tuple", &err))
}
