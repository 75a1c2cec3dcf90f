// Small text helpers shared by request handling

/// Trims and drops blank values.
pub fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToString::to_string)
}

pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_none() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(normalize_optional_text(Some(" Ada ")), Some("Ada".to_string()));
    }

    #[test]
    fn emails_compare_case_insensitively() {
        assert_eq!(normalize_email(" Ada@Example.COM "), "ada@example.com");
    }
}
