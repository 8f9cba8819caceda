//! Duration-string configuration values, e.g. `"2d 12h"` or `"90min"`.
//!
//! Grounded on the source's `TimedeltaParser`: tokenize `\d+<unit>` pairs
//! separated by whitespace and sum them. No fractional amounts, no negative
//! amounts, no implicit unit.

use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)(s|min|h|d|w|mo|y)$").unwrap());

fn unit_seconds(unit: &str) -> u64 {
    match unit {
        "s" => 1,
        "min" => 60,
        "h" => 3600,
        "d" => 86_400,
        "w" => 604_800,
        "mo" => 2_592_000,
        "y" => 31_536_000,
        _ => unreachable!("unit already validated by TOKEN_RE"),
    }
}

/// Parses a whitespace-separated sequence of `<digits><unit>` tokens into a
/// [`Duration`]. Returns `None` if any token fails to match, including an
/// empty string.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut total_seconds: u64 = 0;
    for token in trimmed.split_whitespace() {
        let caps = TOKEN_RE.captures(token)?;
        let amount: u64 = caps[1].parse().ok()?;
        total_seconds = total_seconds.checked_add(amount.checked_mul(unit_seconds(&caps[2]))?)?;
    }
    Some(Duration::from_secs(total_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_token() {
        assert_eq!(parse_duration("90min"), Some(Duration::from_secs(5400)));
    }

    #[test]
    fn multiple_tokens_sum() {
        assert_eq!(parse_duration("2d 12h"), Some(Duration::from_secs(216_000)));
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("   "), None);
    }

    #[test]
    fn rejects_unknown_unit() {
        assert_eq!(parse_duration("5ms"), None);
    }

    #[test]
    fn rejects_malformed_token() {
        assert_eq!(parse_duration("d5"), None);
        assert_eq!(parse_duration("5"), None);
    }
}
