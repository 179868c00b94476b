//! QIF format handling
//!
//! This module centralizes the line-level format concerns of the Quicken
//! export format:
//! - splitting a raw line into a one-character directive code and its payload
//! - parsing the `M/D'YY` date format
//! - stripping thousands-separator commas from amount payloads
//! - stripping legacy backtick escaping from memo and check-number payloads
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::ImportError;
use chrono::NaiveDate;

/// One tokenized input line: a directive code and its payload
///
/// Ephemeral — produced per line and consumed immediately by the resolver.
/// Any first character is a legal code; unrecognized codes are ignored
/// downstream rather than rejected here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDirective {
    /// First character of the line
    pub code: char,
    /// Remainder of the line with trailing CR/LF stripped
    pub payload: String,
}

/// Split a raw line into a directive code and payload
///
/// Returns `None` for empty lines (including a bare `\r` left over from
/// CRLF input). There is no error case: every non-empty line tokenizes.
pub fn tokenize(line: &str) -> Option<RawDirective> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let code = line.chars().next()?;
    Some(RawDirective {
        code,
        payload: line[code.len_utf8()..].to_string(),
    })
}

/// Parse a `D` directive payload in Quicken's `M/D'YY` format
///
/// A slash separates month from day and an apostrophe precedes a two-digit
/// year, interpreted as `2000 + YY`. Quicken pads single digits with spaces
/// (`1/ 2'24`), so each component is trimmed before parsing. Four-digit
/// years and other delimiters are not supported.
///
/// # Errors
///
/// Returns [`ImportError::DateParse`] when either delimiter is missing, a
/// component is not a number, or the components do not form a real date.
pub fn parse_qif_date(payload: &str) -> Result<NaiveDate, ImportError> {
    let (month_str, rest) = payload
        .split_once('/')
        .ok_or_else(|| ImportError::date_parse(payload))?;
    let (day_str, year_str) = rest
        .split_once('\'')
        .ok_or_else(|| ImportError::date_parse(payload))?;

    let month: u32 = month_str
        .trim()
        .parse()
        .map_err(|_| ImportError::date_parse(payload))?;
    let day: u32 = day_str
        .trim()
        .parse()
        .map_err(|_| ImportError::date_parse(payload))?;
    let year: i32 = year_str
        .trim()
        .parse()
        .map_err(|_| ImportError::date_parse(payload))?;

    NaiveDate::from_ymd_opt(2000 + year, month, day)
        .ok_or_else(|| ImportError::date_parse(payload))
}

/// Strip thousands-separator commas from an amount payload
///
/// The result is kept as a string in the accumulator; decimal conversion
/// happens only at the persistence boundary.
pub fn strip_commas(payload: &str) -> String {
    payload.replace(',', "")
}

/// Strip backtick characters from a payload
///
/// Legacy escaping artifact in memo and check-number fields.
pub fn strip_backticks(payload: &str) -> String {
    payload.replace('`', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::date("D1/ 2'24", 'D', "1/ 2'24")]
    #[case::amount("U1,234.56", 'U', "1,234.56")]
    #[case::terminator("^", '^', "")]
    #[case::marker("!Type:Bank", '!', "Type:Bank")]
    #[case::split_amount("$100.00", '$', "100.00")]
    #[case::crlf_stripped("PStore\r", 'P', "Store")]
    #[case::unrecognized("Zwhatever", 'Z', "whatever")]
    fn test_tokenize(#[case] line: &str, #[case] code: char, #[case] payload: &str) {
        let directive = tokenize(line).expect("line should tokenize");
        assert_eq!(directive.code, code);
        assert_eq!(directive.payload, payload);
    }

    #[rstest]
    #[case::empty("")]
    #[case::bare_cr("\r")]
    fn test_tokenize_skips_empty_lines(#[case] line: &str) {
        assert!(tokenize(line).is_none());
    }

    #[rstest]
    #[case::plain("1/2'24", 2024, 1, 2)]
    #[case::space_padded("1/ 2'24", 2024, 1, 2)]
    #[case::double_digits("12/31'99", 2099, 12, 31)]
    #[case::leap_day("2/29'24", 2024, 2, 29)]
    fn test_parse_qif_date(
        #[case] payload: &str,
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
    ) {
        let date = parse_qif_date(payload).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(year, month, day).unwrap());
    }

    #[rstest]
    #[case::no_slash("1-2'24")]
    #[case::no_apostrophe("1/2/24")]
    #[case::not_a_number("a/b'cc")]
    #[case::impossible_date("2/30'24")]
    #[case::empty("")]
    fn test_parse_qif_date_rejects_malformed(#[case] payload: &str) {
        let err = parse_qif_date(payload).unwrap_err();
        assert!(matches!(err, ImportError::DateParse { .. }));
    }

    #[rstest]
    #[case::thousands("1,234.56", "1234.56")]
    #[case::millions("-1,234,567.89", "-1234567.89")]
    #[case::plain("100.00", "100.00")]
    fn test_strip_commas(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_commas(input), expected);
    }

    #[test]
    fn test_strip_backticks() {
        assert_eq!(strip_backticks("17`04"), "1704");
        assert_eq!(strip_backticks("plain memo"), "plain memo");
    }

    #[test]
    fn test_four_digit_year_is_taken_literally() {
        // Only two-digit years are supported; a four-digit payload still gets
        // the 2000 offset applied.
        let date = parse_qif_date("1/2'2024").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(4024, 1, 2).unwrap());
    }
}
