//! Normalization applied by the owning collaborator before a record is saved.

use once_cell::sync::Lazy;
use regex::Regex;

const DEGREE_SIGN: char = '\u{00B0}';

/// A digit followed by a star; the star is the candidate degree sign.
static DIGIT_STAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d\*").expect("digit-star pattern is valid"));

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Replace a `*` written right after a digit and before a word character with
/// a degree sign, e.g. `12*Blg` or `18*C`.
pub fn stars2deg(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    for found in DIGIT_STAR.find_iter(text) {
        let star = found.end() - 1;
        let before_word = text[found.end()..].chars().next().is_some_and(is_word_char);
        out.push_str(&text[copied..star]);
        out.push(if before_word { DEGREE_SIGN } else { '*' });
        copied = found.end();
    }
    out.push_str(&text[copied..]);
    out
}

pub fn bjcp_style(code: Option<&str>, name: Option<&str>) -> Option<String> {
    let joined = format!("{} {}", code.unwrap_or(""), name.unwrap_or(""));
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn full_name(code: Option<&str>, name: &str) -> String {
    match code.filter(|c| !c.is_empty()) {
        Some(code) => format!("#{code} {name}"),
        None => name.to_string(),
    }
}

/// Trimmed text, or `None` when nothing is left.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars2deg() {
        assert_eq!(stars2deg("mash at 67*C for 60'"), "mash at 67°C for 60'");
        assert_eq!(stars2deg("OG 12*Blg"), "OG 12°Blg");
        assert_eq!(stars2deg("a * b"), "a * b");
        assert_eq!(stars2deg("*C"), "*C");
        assert_eq!(stars2deg("12*"), "12*");
        assert_eq!(stars2deg("1*2*3"), "1°2°3");
        assert_eq!(stars2deg("10** strong"), "10** strong");
        assert_eq!(stars2deg("żółć 5*Blg"), "żółć 5°Blg");
    }

    #[test]
    fn test_bjcp_style() {
        assert_eq!(bjcp_style(Some("10A"), Some("Weizen")).as_deref(), Some("10A Weizen"));
        assert_eq!(bjcp_style(Some("10A"), None).as_deref(), Some("10A"));
        assert_eq!(bjcp_style(None, Some(" ")), None);
    }

    #[test]
    fn test_full_name() {
        assert_eq!(full_name(Some("42"), "Pils"), "#42 Pils");
        assert_eq!(full_name(Some(""), "Pils"), "Pils");
        assert_eq!(full_name(None, "Pils"), "Pils");
    }
}
