use std::sync::LazyLock;

use regex::Regex;

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?[0-9]+\.?[0-9]*").unwrap());

/// Outcome of normalizing OCR or HTML text into a number.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedNumber {
    Parsed(f64),
    /// No numeric substring found; keeps the input for diagnostics.
    Unparsed(String),
}

impl NormalizedNumber {
    pub fn value(&self) -> Option<f64> {
        match self {
            NormalizedNumber::Parsed(v) => Some(*v),
            NormalizedNumber::Unparsed(_) => None,
        }
    }
}

/// Decimal commas become points, then the first ASCII `-?[0-9]+\.?[0-9]*` match wins.
pub fn normalize(text: &str) -> NormalizedNumber {
    let dotted = text.replace(',', ".");
    NUMBER_RE
        .find(&dotted)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(NormalizedNumber::Parsed)
        .unwrap_or_else(|| NormalizedNumber::Unparsed(text.to_string()))
}

/// Convenience for optional input (a missing OCR result, an absent element).
pub fn parse_number(text: Option<&str>) -> Option<f64> {
    text.and_then(|t| normalize(t).value())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_comma() {
        assert_eq!(normalize("12,5"), NormalizedNumber::Parsed(12.5));
    }

    #[test]
    fn negative_with_unit() {
        assert_eq!(normalize("-3.2 C").value(), Some(-3.2));
    }

    #[test]
    fn integer() {
        assert_eq!(normalize("7").value(), Some(7.0));
    }

    #[test]
    fn trailing_point() {
        assert_eq!(normalize("15.").value(), Some(15.0));
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(normalize("0,4 mm / 24h").value(), Some(0.4));
        assert_eq!(normalize("x 3 y 4").value(), Some(3.0));
    }

    #[test]
    fn garbage_is_unparsed() {
        assert_eq!(normalize("abc"), NormalizedNumber::Unparsed("abc".to_string()));
        assert_eq!(normalize("").value(), None);
        assert_eq!(normalize("   ").value(), None);
        assert_eq!(normalize("-.,").value(), None);
    }

    #[test]
    fn non_ascii_digits_are_skipped() {
        assert_eq!(normalize("\u{0663}\u{0664} 12,5").value(), Some(12.5));
        assert_eq!(normalize("\u{0967}\u{0968}").value(), None);
    }

    #[test]
    fn missing_input() {
        assert_eq!(parse_number(None), None);
        assert_eq!(parse_number(Some("18,3")), Some(18.3));
    }
}
