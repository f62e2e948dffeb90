//! Property name -> label name mapping.

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
///
/// Character count and positions are preserved. Applied to label names only,
/// never to label values.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Whether `name` is already in the restricted character set.
pub fn is_sanitized(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
