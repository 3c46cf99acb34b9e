//! String canonicalization for key and value matching

/// Trim, lower-case, and collapse whitespace runs to a single space
///
/// # Examples
///
/// ```
/// use intake_extractor::normalize;
///
/// assert_eq!(normalize("  Visa   Required?\n"), "visa required?");
/// ```
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Like [`normalize`], but punctuation common in field names counts as whitespace
///
/// # Examples
///
/// ```
/// use intake_extractor::normalize_key;
///
/// assert_eq!(normalize_key("Holds-Master-Degree"), normalize_key("holds master degree?"));
/// assert_eq!(normalize_key("Research_Experience_0"), "research experience 0");
/// ```
pub fn normalize_key(s: &str) -> String {
    let spaced: String = s
        .chars()
        .map(|c| match c {
            '-' | '_' | '?' | ':' | '(' | ')' => ' ',
            other => other,
        })
        .collect();
    normalize(&spaced)
}

/// Value reads as a yes
pub fn is_affirmative(s: &str) -> bool {
    matches!(normalize(s).as_str(), "yes" | "true" | "1" | "y")
}

/// Value reads as a no
pub fn is_negative(s: &str) -> bool {
    matches!(normalize(s).as_str(), "no" | "false" | "0" | "n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("Jane \t  Doe"), "jane doe");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_normalize_key_separators() {
        assert_eq!(normalize_key("Fits mobility rules? (see notes)"), "fits mobility rules see notes");
        assert_eq!(normalize_key("E-Mail"), "e mail");
        assert_eq!(normalize_key("Visa_required"), "visa required");
    }

    #[test]
    fn test_affirmative_and_negative() {
        for yes in ["Yes", " YES ", "true", "1", "y"] {
            assert!(is_affirmative(yes), "{yes} should be affirmative");
            assert!(!is_negative(yes));
        }
        for no in ["No", "false", "0", "N"] {
            assert!(is_negative(no), "{no} should be negative");
            assert!(!is_affirmative(no));
        }
        assert!(!is_affirmative("Unknown"));
        assert!(!is_negative("Unknown"));
        assert!(!is_affirmative("yes, in 2026"));
    }
}
