//! Lenient parsing for the loosely typed scalar strings a scheduler hands us.

/// Trim, map the literal `null` to empty and drop one pair of surrounding
/// single quotes.
pub fn normalize(raw: &str) -> String {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("null") {
        return String::new();
    }
    let value = if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        &value[1..value.len() - 1]
    } else {
        value
    };
    value.trim().to_string()
}

/// Secrets keep inner whitespace; only wrapping quotes go.
pub fn strip_quotes(raw: &str) -> String {
    raw.trim_matches(|c| c == '\'' || c == '"').to_string()
}

/// Unparsable or negative values become 0.
pub fn parse_count(raw: &str) -> u32 {
    normalize(raw).parse::<u32>().unwrap_or(0)
}

/// `Y`, `YES`, `TRUE` and `1` are true; anything else is false.
pub fn parse_flag(raw: &str) -> bool {
    matches!(
        normalize(raw).to_ascii_uppercase().as_str(),
        "Y" | "YES" | "TRUE" | "1"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_handles_null_and_quotes() {
        assert_eq!(normalize("  NULL "), "");
        assert_eq!(normalize("'*.csv'"), "*.csv");
        assert_eq!(normalize("'"), "'");
        assert_eq!(normalize(" plain "), "plain");
    }

    #[test]
    fn counts_default_to_zero() {
        assert_eq!(parse_count("3"), 3);
        assert_eq!(parse_count(" 7 "), 7);
        assert_eq!(parse_count("abc"), 0);
        assert_eq!(parse_count("-2"), 0);
        assert_eq!(parse_count(""), 0);
    }

    #[test]
    fn flags_default_to_false() {
        for yes in ["Y", "y", "yes", "TRUE", "1", "'Y'"] {
            assert!(parse_flag(yes), "{yes}");
        }
        for no in ["N", "0", "", "maybe", "null"] {
            assert!(!parse_flag(no), "{no}");
        }
    }

    #[test]
    fn strip_quotes_keeps_inner_text() {
        assert_eq!(strip_quotes("\"p a'ss\""), "p a'ss");
    }
}
