//! Key identifiers

/// Lowercase a key identifier. Keys are compared case-insensitively.
pub fn fold_key(key: char) -> char {
    key.to_lowercase().next().unwrap_or(key)
}

/// Parse user input naming a new key: exactly one visible character after
/// trimming, folded to lowercase.
pub fn parse_key(input: &str) -> Option<char> {
    let mut chars = input.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_control() => Some(fold_key(c)),
        _ => None,
    }
}
