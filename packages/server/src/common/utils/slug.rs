/// Maximum slug length in characters.
pub const MAX_SLUG_LEN: usize = 100;

/// Generate a URL-friendly slug from a post title.
///
/// Normalization rules:
/// - Convert to lowercase
/// - Drop everything except ASCII letters, digits, whitespace and hyphens
/// - Collapse runs of whitespace/hyphens into a single hyphen
/// - Trim leading/trailing hyphens
/// - Truncate to 100 characters
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for c in title.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_separator = true;
        }
    }

    // Only ASCII is ever pushed, so byte truncation is on a char boundary.
    slug.truncate(MAX_SLUG_LEN);
    let trimmed_len = slug.trim_end_matches('-').len();
    slug.truncate(trimmed_len);
    slug
}
