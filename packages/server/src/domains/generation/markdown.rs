//! Heading cleanup for generated markdown.

/// Shouted lines longer than this are treated as prose, not headings.
const MAX_HEADING_WORDS: usize = 5;

/// Rewrite bare all-caps lines as `##` headings.
///
/// - Blank lines and lines already starting with `#` are kept as-is
/// - An all-uppercase line of at most five words becomes `## Title Case`
/// - Everything else passes through unchanged
pub fn normalize_markdown(content: &str) -> String {
    content
        .split('\n')
        .map(|line| match shouted_heading(line) {
            Some(heading) => format!("## {}", title_case(heading)),
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The trimmed text of a line that reads as an unformatted heading.
fn shouted_heading(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let mut has_cased = false;
    for c in trimmed.chars() {
        if c.is_lowercase() {
            return None;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }

    if has_cased && trimmed.split_whitespace().count() <= MAX_HEADING_WORDS {
        Some(trimmed)
    } else {
        None
    }
}

/// Capitalize the first cased letter of every run, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_cased = false;

    for c in text.chars() {
        if prev_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_cased = c.is_lowercase() || c.is_uppercase();
    }

    out
}
