/// Non-empty lines of a text file
pub fn extract_txt(bytes: &[u8]) -> Vec<String> {
    // Try UTF-8 first, fall back to lossy conversion
    let text = String::from_utf8(bytes.to_vec())
        .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned());

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_simple_text() {
        let lines = extract_txt(b"Hello, world!\nThis is a test file.");
        assert_eq!(lines, vec!["Hello, world!", "This is a test file."]);
    }

    #[test]
    fn extract_utf8_text() {
        let lines = extract_txt("Zoë Müller, Málaga".as_bytes());
        assert_eq!(lines, vec!["Zoë Müller, Málaga"]);
    }

    #[test]
    fn extract_invalid_utf8_is_lossy() {
        let lines = extract_txt(b"caf\xe9 au lait");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("caf"));
    }

    #[test]
    fn drops_blank_lines() {
        assert!(extract_txt(b"  \n\n  ").is_empty());
    }
}
