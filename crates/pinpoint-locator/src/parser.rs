//! The locator grammar, parsed by a hand-written character scanner.
//!
//! Grammar outline (checked in this order):
//!
//! 1. `$help` alone requests help and is otherwise a single value.
//! 2. `$base64:<payload>` decodes the payload (standard or URL alphabet,
//!    padding optional) into a literal single value that is never re-parsed.
//! 3. `(text)` is a literal single value with one paren layer stripped.
//! 4. Otherwise the text splits on commas at parenthesis depth zero into
//!    `name:value`, `name:(value)`, `name(value)`, or bare `name` segments.
//!    In default mode, text with no top-level `:` that does not consist of
//!    `name(value)` groups falls back to a bare single value.
//!
//! All error positions are 1-based character positions into the input.

use base64::alphabet;
use base64::engine::general_purpose::GeneralPurpose;
use base64::engine::{DecodePaddingMode, GeneralPurposeConfig};
use base64::Engine;

use crate::error::{LocatorError, Result};

/// Prefix introducing a base64-encoded literal value.
pub(crate) const BASE64_PREFIX: &str = "$base64:";

/// Reserved token that requests help output instead of an error-only response.
pub(crate) const HELP_TOKEN: &str = "$help";

// Padding is optional in locator text, so both engines decode indifferently.
const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// A dimension value plus whether it was written quoted (parenthesized or as
/// a base64 literal). A quoted `$any` is the literal text, an unquoted one
/// is the wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DimensionValue {
    pub(crate) text: String,
    pub(crate) quoted: bool,
}

impl DimensionValue {
    pub(crate) fn plain(text: impl Into<String>) -> Self {
        DimensionValue {
            text: text.into(),
            quoted: false,
        }
    }
}

/// Raw parse output, consumed by [`crate::Locator`].
#[derive(Debug, Default)]
pub(crate) struct ParsedLocator {
    pub(crate) single_value: Option<String>,
    pub(crate) dimensions: Vec<(String, Vec<DimensionValue>)>,
    pub(crate) help_requested: bool,
}

impl ParsedLocator {
    fn single(value: impl Into<String>) -> Self {
        ParsedLocator {
            single_value: Some(value.into()),
            ..ParsedLocator::default()
        }
    }
}

pub(crate) fn parse(text: &str, extended: bool, custom_names: &[String]) -> Result<ParsedLocator> {
    if text.is_empty() {
        return Err(LocatorError::parse(1, "locator text cannot be empty"));
    }
    if text == HELP_TOKEN {
        let mut parsed = ParsedLocator::single(HELP_TOKEN);
        parsed.help_requested = true;
        return Ok(parsed);
    }
    if let Some(payload) = text.strip_prefix(BASE64_PREFIX) {
        return Ok(ParsedLocator::single(decode_base64(
            payload,
            BASE64_PREFIX.len(),
        )?));
    }

    let chars: Vec<char> = text.chars().collect();
    if chars[0] == '(' {
        return parse_escaped(&chars);
    }

    let names = name_candidates(custom_names);
    if !extended && !has_top_level_colon(&chars) {
        // Bare tokens (`abc`, `123`, `aaa(x`) are single values in default
        // mode; `aaa(x:y)` still parses as dimensions because every segment
        // is a complete name(value) group.
        return match parse_dimensions(&chars, extended, &names) {
            Ok(parsed) => Ok(parsed),
            Err(_) => Ok(ParsedLocator::single(text)),
        };
    }
    parse_dimensions(&chars, extended, &names)
}

/// Custom names plus the always-recognized help token, longest first so the
/// longest whitelisted prefix wins.
fn name_candidates(custom_names: &[String]) -> Vec<String> {
    let mut names: Vec<String> = custom_names.to_vec();
    if !names.iter().any(|n| n == HELP_TOKEN) {
        names.push(HELP_TOKEN.to_string());
    }
    names.sort_by_key(|n| std::cmp::Reverse(n.chars().count()));
    names
}

fn parse_escaped(chars: &[char]) -> Result<ParsedLocator> {
    if chars.len() >= 2 && chars[chars.len() - 1] == ')' {
        let inner: String = chars[1..chars.len() - 1].iter().collect();
        return Ok(ParsedLocator::single(inner));
    }
    match matching_paren(chars, 0) {
        None => Err(LocatorError::parse(1, "could not find matching ')'")),
        Some(close) => Err(LocatorError::parse(
            close + 2,
            "a locator starting with '(' must end with the matching ')'",
        )),
    }
}

fn has_top_level_colon(chars: &[char]) -> bool {
    let mut depth = 0usize;
    for &c in chars {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => return true,
            _ => {}
        }
    }
    false
}

/// Index of the ')' matching the '(' at `open`, honoring nesting.
fn matching_paren(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &c) in chars.iter().enumerate().skip(open) {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_dimensions(
    chars: &[char],
    extended: bool,
    name_candidates: &[String],
) -> Result<ParsedLocator> {
    let mut parsed = ParsedLocator::default();
    let mut pos = 0usize;
    while pos < chars.len() {
        pos = parse_segment(chars, pos, extended, name_candidates, &mut parsed)?;
    }
    Ok(parsed)
}

/// Parses one `name[:value]` segment starting at `start`; returns the index
/// just past the segment's trailing comma (or the end of input).
fn parse_segment(
    chars: &[char],
    start: usize,
    extended: bool,
    name_candidates: &[String],
    out: &mut ParsedLocator,
) -> Result<usize> {
    let (name, after_name) = scan_name(chars, start, extended, name_candidates)?;
    if name == HELP_TOKEN {
        out.help_requested = true;
    }

    if after_name >= chars.len() {
        push_valueless(out, name, start, extended)?;
        return Ok(after_name);
    }
    match chars[after_name] {
        ',' => {
            push_valueless(out, name, start, extended)?;
            Ok(after_name + 1)
        }
        ':' => {
            let value_start = after_name + 1;
            let (value, next) = if value_start < chars.len() && chars[value_start] == '(' {
                paren_value(chars, value_start)?
            } else {
                bare_value(chars, value_start)?
            };
            push_dimension(out, name, value);
            Ok(next)
        }
        '(' => {
            let (value, next) = paren_value(chars, after_name)?;
            push_dimension(out, name, value);
            Ok(next)
        }
        c => Err(LocatorError::parse(
            after_name + 1,
            format!("unexpected character '{c}' after dimension name '{name}'"),
        )),
    }
}

fn scan_name(
    chars: &[char],
    start: usize,
    extended: bool,
    name_candidates: &[String],
) -> Result<(String, usize)> {
    // Whitelisted names are matched verbatim, before the alphabet scan, so
    // they may contain characters the alphabet forbids.
    for candidate in name_candidates {
        let candidate_chars: Vec<char> = candidate.chars().collect();
        let end = start + candidate_chars.len();
        if chars[start..].starts_with(&candidate_chars)
            && (end >= chars.len() || matches!(chars[end], ':' | '(' | ','))
        {
            return Ok((candidate.clone(), end));
        }
    }

    let mut i = start;
    while i < chars.len() && is_name_char(chars[i], extended) {
        i += 1;
    }
    if i == start {
        return Err(LocatorError::parse(
            start + 1,
            format!(
                "invalid dimension name: unexpected character '{}'",
                chars[start]
            ),
        ));
    }
    Ok((chars[start..i].iter().collect(), i))
}

fn is_name_char(c: char, extended: bool) -> bool {
    c.is_ascii_alphanumeric() || (extended && c == '-')
}

/// A value running to the next comma at depth zero. Parentheses group commas;
/// a ')' at depth zero is an ordinary character.
fn bare_value(chars: &[char], start: usize) -> Result<(DimensionValue, usize)> {
    let mut depth = 0usize;
    let mut outer_open = None;
    let mut i = start;
    while i < chars.len() {
        match chars[i] {
            '(' => {
                if depth == 0 {
                    outer_open = Some(i);
                }
                depth += 1;
            }
            ')' if depth > 0 => {
                depth -= 1;
            }
            ',' if depth == 0 => break,
            _ => {}
        }
        i += 1;
    }
    if depth > 0 {
        let open = outer_open.unwrap_or(start);
        return Err(LocatorError::parse(open + 1, "could not find matching ')'"));
    }
    let raw: String = chars[start..i].iter().collect();
    let value = substitute_base64(raw, start, false)?;
    Ok((value, past_comma(chars, i)))
}

/// A parenthesized value: one balanced group with exactly one layer stripped.
/// Only a comma or the end of the text may follow the closing paren.
fn paren_value(chars: &[char], open: usize) -> Result<(DimensionValue, usize)> {
    let close = matching_paren(chars, open)
        .ok_or_else(|| LocatorError::parse(open + 1, "could not find matching ')'"))?;
    if close + 1 < chars.len() && chars[close + 1] != ',' {
        return Err(LocatorError::parse(
            close + 2,
            format!(
                "unexpected character '{}' after the closing ')'",
                chars[close + 1]
            ),
        ));
    }
    let raw: String = chars[open + 1..close].iter().collect();
    let value = substitute_base64(raw, open + 1, true)?;
    Ok((value, past_comma(chars, close + 1)))
}

fn past_comma(chars: &[char], i: usize) -> usize {
    if i < chars.len() {
        i + 1
    } else {
        i
    }
}

fn push_valueless(
    out: &mut ParsedLocator,
    name: String,
    start: usize,
    extended: bool,
) -> Result<()> {
    if !extended && name != HELP_TOKEN {
        return Err(LocatorError::parse(
            start + 1,
            format!("dimension '{name}' requires a value"),
        ));
    }
    push_dimension(out, name, DimensionValue::plain(""));
    Ok(())
}

fn push_dimension(out: &mut ParsedLocator, name: String, value: DimensionValue) {
    match out.dimensions.iter_mut().find(|(n, _)| *n == name) {
        Some((_, values)) => values.push(value),
        None => out.dimensions.push((name, vec![value])),
    }
}

/// Replaces a `$base64:<payload>` value by its decoded text. `offset` is the
/// 0-based character position of `value` within the original locator text.
/// Both parenthesized and base64 values count as quoted: their text is
/// literal, so a quoted `$any` is not the wildcard.
fn substitute_base64(value: String, offset: usize, quoted: bool) -> Result<DimensionValue> {
    match value.strip_prefix(BASE64_PREFIX) {
        Some(payload) => Ok(DimensionValue {
            text: decode_base64(payload, offset + BASE64_PREFIX.len())?,
            quoted: true,
        }),
        None => Ok(DimensionValue {
            text: value,
            quoted,
        }),
    }
}

/// Decodes a base64 payload at 0-based position `offset`. A payload wrapped
/// in one paren pair is unwrapped first; the unwrapped text must then be
/// pure base64, so nested wrapping fails decoding.
fn decode_base64(payload: &str, offset: usize) -> Result<String> {
    let (payload, offset) = match payload
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) => (inner, offset + 1),
        None => (payload, offset),
    };
    let bytes = STANDARD
        .decode(payload)
        .or_else(|_| URL_SAFE.decode(payload))
        .map_err(|e| LocatorError::parse(offset + 1, format!("invalid base64 value: {e}")))?;
    String::from_utf8(bytes).map_err(|_| {
        LocatorError::parse(offset + 1, "base64 value does not decode to UTF-8 text")
    })
}
