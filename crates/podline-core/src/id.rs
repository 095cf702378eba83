// Record identifiers
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Identifier usable as a URL fragment: non-empty, no whitespace, no `#`.
pub fn is_valid_fragment_id(id: &str) -> bool {
    !id.is_empty() && !id.contains('#') && !id.chars().any(char::is_whitespace)
}
