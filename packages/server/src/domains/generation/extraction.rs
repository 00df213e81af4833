//! Extraction of structured blog fields from raw crew output.
//!
//! The crew is asked for a JSON object with `title`, `content`, `tags` and
//! `meta_description`. When the reply holds one it is used directly. Otherwise
//! the reply is treated as free-form markdown and each field is located by an
//! ordered cascade of patterns; the first pattern that captures wins and a fixed
//! default is used when none does. Extraction never fails outward: any error
//! in the inner routine degrades to [`GenerationResult::fallback`].

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Title used when the output has no recognizable title.
pub const DEFAULT_TITLE: &str = "Latest Developments in Generative AI";

/// Title used when extraction itself fails.
pub const FALLBACK_TITLE: &str = "Generated Blog Post on Generative AI";

/// Tags used when the output has no recognizable tag line.
pub const DEFAULT_TAGS: [&str; 5] = [
    "Generative AI",
    "Artificial Intelligence",
    "Technology",
    "Machine Learning",
    "Innovation",
];

/// Tags used when extraction itself fails.
pub const FALLBACK_TAGS: [&str; 2] = ["Generative AI", "Technology"];

/// Maximum number of tags kept on a post.
pub const MAX_TAGS: usize = 7;

const QUOTE_CHARS: &[char] = &['"', '\'', '“', '”', '‘', '’'];

/// Structured fields parsed from one crew run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub word_count: usize,
    pub meta_description: Option<String>,
}

impl GenerationResult {
    /// Result built from the untouched raw text when extraction fails.
    pub fn fallback(raw: &str) -> Self {
        Self {
            title: FALLBACK_TITLE.to_string(),
            content: raw.to_string(),
            tags: FALLBACK_TAGS.iter().map(|t| t.to_string()).collect(),
            word_count: raw.split_whitespace().count(),
            meta_description: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("crew output is empty")]
    EmptyOutput,

    #[error("invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Ordered list of single-capture patterns.
struct PatternCascade {
    patterns: Vec<Regex>,
}

impl PatternCascade {
    fn compile(sources: &[&str]) -> Result<Self, regex::Error> {
        let patterns = sources
            .iter()
            .map(|source| Regex::new(source))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Capture group 1 of the first pattern that matches.
    fn first_capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.patterns.iter().find_map(|pattern| {
            pattern
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
        })
    }
}

struct ExtractionPatterns {
    heading: PatternCascade,
    title_fallbacks: PatternCascade,
    tags: PatternCascade,
    meta_description: Regex,
    tag_separators: Regex,
}

impl ExtractionPatterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            // `# Title` but never `## Section`
            heading: PatternCascade::compile(&[r"(?m)^#[ \t]+([^\r\n]+)"])?,
            title_fallbacks: PatternCascade::compile(&[
                r"(?i)\btitle:\s*([^\r\n]+)",
                r"(?m)^([A-Z][^.\n]*\b(?:AI|[Tt]echnology|[Ii]ntelligence|[Mm]achine [Ll]earning|[Dd]eep [Ll]earning)\b[^.\n]*)",
            ])?,
            tags: PatternCascade::compile(&[
                r"(?i)\*\*tags:\*\*\s*([^\r\n]+)",
                r"(?i)(?:tags|keywords):\s*([^\r\n]+)",
                r"(?i)(?:suggested tags|relevant tags):\s*([^\r\n]+)",
            ])?,
            meta_description: Regex::new(
                r"(?i)meta[ -]description(?:\*\*)?:(?:\*\*)?\s*([^\r\n]+)",
            )?,
            tag_separators: Regex::new(r"[,;|]")?,
        })
    }
}

lazy_static! {
    static ref PATTERNS: Result<ExtractionPatterns, regex::Error> = ExtractionPatterns::compile();
}

/// Parse raw crew output into a [`GenerationResult`].
///
/// Never fails: on any extraction error the raw text is kept as content with
/// fallback title and tags.
pub fn extract_blog_components(raw: &str) -> GenerationResult {
    match try_extract(raw) {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "Error extracting blog components, using fallback");
            GenerationResult::fallback(raw)
        }
    }
}

fn try_extract(raw: &str) -> Result<GenerationResult, ExtractionError> {
    let patterns = PATTERNS.as_ref().map_err(|e| ExtractionError::Pattern(e.clone()))?;

    let text = raw.trim();
    if text.is_empty() {
        return Err(ExtractionError::EmptyOutput);
    }

    if let Some(result) = extract_json(patterns, text) {
        return Ok(result);
    }

    let title = find_title(patterns, text).unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let tags = patterns
        .tags
        .first_capture(text)
        .map(|line| split_tags(&patterns.tag_separators, line))
        .filter(|tags| !tags.is_empty())
        .unwrap_or_else(default_tags);

    let (meta_description, content) = match patterns.meta_description.captures(text) {
        Some(caps) => {
            let meta = caps
                .get(1)
                .map(|m| clean_meta_description(m.as_str()))
                .filter(|m| !m.is_empty());
            let content = match (&meta, caps.get(0)) {
                (Some(_), Some(label)) => remove_lines(text, label.start(), label.end()),
                _ => text.to_string(),
            };
            (meta, content)
        }
        None => (None, text.to_string()),
    };

    let word_count = count_words(&content);

    debug!(
        title = %title,
        tag_count = tags.len(),
        word_count,
        has_meta = meta_description.is_some(),
        "Extracted blog components"
    );

    Ok(GenerationResult {
        title,
        content,
        tags,
        word_count,
        meta_description,
    })
}

/// Shape of a crew reply written as a JSON object.
#[derive(Debug, Deserialize)]
struct JsonPost {
    #[serde(default)]
    title: Option<String>,
    content: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    meta_description: Option<String>,
}

/// First stage of the cascade: the outermost `{...}` span parsed as a post.
///
/// Returns `None` (falling through to the markdown patterns) when there is no
/// object, it does not parse, or its content is blank.
fn extract_json(patterns: &ExtractionPatterns, text: &str) -> Option<GenerationResult> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }

    let post: JsonPost = match serde_json::from_str(&text[start..=end]) {
        Ok(post) => post,
        Err(e) => {
            debug!(error = %e, "Output is not a JSON post, using markdown patterns");
            return None;
        }
    };

    let content = post.content.trim().to_string();
    if content.is_empty() {
        return None;
    }

    let title = post
        .title
        .as_deref()
        .map(clean_title)
        .filter(|t| !t.is_empty())
        .or_else(|| find_title(patterns, &content))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let mut tags: Vec<String> = post
        .tags
        .iter()
        .map(|tag| tag.trim())
        .filter(|tag| tag.chars().count() > 1)
        .take(MAX_TAGS)
        .map(str::to_string)
        .collect();
    if tags.is_empty() {
        tags = default_tags();
    }

    let meta_description = post
        .meta_description
        .as_deref()
        .map(clean_meta_description)
        .filter(|m| !m.is_empty());

    debug!(title = %title, tag_count = tags.len(), "Extracted blog components from JSON");

    Some(GenerationResult {
        title,
        word_count: count_words(&content),
        content,
        tags,
        meta_description,
    })
}

fn find_title(patterns: &ExtractionPatterns, text: &str) -> Option<String> {
    patterns
        .heading
        .first_capture(text)
        .or_else(|| patterns.title_fallbacks.first_capture(text))
        .map(clean_title)
        .filter(|t| !t.is_empty())
}

fn default_tags() -> Vec<String> {
    DEFAULT_TAGS.iter().map(|t| t.to_string()).collect()
}

/// Drop every line touched by `start..end`, including the trailing newline.
fn remove_lines(text: &str, start: usize, end: usize) -> String {
    let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[end..].find('\n').map_or(text.len(), |i| end + i + 1);

    let mut content = String::with_capacity(text.len());
    content.push_str(&text[..line_start]);
    content.push_str(&text[line_end..]);
    content.trim().to_string()
}

/// Count words after dropping markdown control characters.
pub fn count_words(content: &str) -> usize {
    content
        .chars()
        .filter(|c| !matches!(c, '#' | '*' | '`' | '[' | ']' | '(' | ')'))
        .collect::<String>()
        .split_whitespace()
        .count()
}

fn clean_title(raw: &str) -> String {
    raw.trim().trim_matches(QUOTE_CHARS).trim().to_string()
}

fn clean_meta_description(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| c == '*' || c.is_whitespace())
        .trim_matches(QUOTE_CHARS)
        .trim()
        .to_string()
}

fn split_tags(separators: &Regex, line: &str) -> Vec<String> {
    separators
        .split(line)
        .map(|tag| tag.trim().trim_matches(',').trim())
        .filter(|tag| tag.chars().count() > 1)
        .take(MAX_TAGS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_and_bold_tags() {
        let raw = "# My Title\n\nSome intro text.\n\n**Tags:** a1, b2, c3";
        let result = extract_blog_components(raw);

        assert_eq!(result.title, "My Title");
        assert_eq!(result.tags, vec!["a1", "b2", "c3"]);
        assert_eq!(result.meta_description, None);
    }

    #[test]
    fn test_single_character_tags_dropped() {
        let raw = "# My Title\n**Tags:** a, b, c, rust";
        let result = extract_blog_components(raw);

        assert_eq!(result.tags, vec!["rust"]);
    }

    #[test]
    fn test_single_character_tags_only_falls_back_to_defaults() {
        let raw = "# My Title\n**Tags:** a, b, c";
        let result = extract_blog_components(raw);

        assert_eq!(result.tags, DEFAULT_TAGS.to_vec());
    }

    #[test]
    fn test_section_heading_is_not_a_title() {
        let raw = "## Introduction\nplain body without labels";
        let result = extract_blog_components(raw);

        assert_eq!(result.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_no_structure_uses_defaults() {
        let raw = "just some plain lowercase words without any structure at all";
        let result = extract_blog_components(raw);

        assert_eq!(result.title, DEFAULT_TITLE);
        assert_eq!(result.tags, DEFAULT_TAGS.to_vec());
        assert_eq!(result.content, raw);
        assert_eq!(result.word_count, 10);
    }

    #[test]
    fn test_title_label_fallback_strips_quotes() {
        let raw = "Title: \"Agents That Plan\"\n\nbody text";
        let result = extract_blog_components(raw);

        assert_eq!(result.title, "Agents That Plan");
    }

    #[test]
    fn test_capitalized_ai_line_fallback() {
        let raw = "intro line\nHow Edge AI changes devices\nmore text";
        let result = extract_blog_components(raw);

        assert_eq!(result.title, "How Edge AI changes devices");
    }

    #[test]
    fn test_keywords_label() {
        let raw = "# Post\nKeywords: defi; lending | stablecoins";
        let result = extract_blog_components(raw);

        assert_eq!(result.tags, vec!["defi", "lending", "stablecoins"]);
    }

    #[test]
    fn test_tag_cap() {
        let raw = "# Post\n**Tags:** t1, t2, t3, t4, t5, t6, t7, t8, t9, t10";
        let result = extract_blog_components(raw);

        assert_eq!(result.tags.len(), MAX_TAGS);
        assert_eq!(result.tags.last().map(String::as_str), Some("t7"));
    }

    #[test]
    fn test_meta_description_removed_from_content() {
        let raw = "# Post\n\nBody here.\n\n**Meta Description:** A short summary of the post.\n";
        let result = extract_blog_components(raw);

        assert_eq!(
            result.meta_description.as_deref(),
            Some("A short summary of the post.")
        );
        assert!(!result.content.to_lowercase().contains("meta description"));
        assert!(result.content.contains("Body here."));
    }

    #[test]
    fn test_meta_description_case_insensitive() {
        let raw = "# Post\nmeta description: lower case label";
        let result = extract_blog_components(raw);

        assert_eq!(result.meta_description.as_deref(), Some("lower case label"));
    }

    #[test]
    fn test_word_count_ignores_markdown() {
        assert_eq!(count_words("# Title\n**bold** text here"), 4);
        assert_eq!(count_words("[link](url) `code`"), 2);
        assert_eq!(count_words("## ### ***"), 0);
    }

    #[test]
    fn test_empty_output_uses_fallback() {
        let result = extract_blog_components("   \n  ");

        assert_eq!(result.title, FALLBACK_TITLE);
        assert_eq!(result.tags, FALLBACK_TAGS.to_vec());
        assert_eq!(result.content, "   \n  ");
        assert_eq!(result.word_count, 0);
    }
    #[test]
    fn test_meta_description_on_following_line_removed() {
        let raw = "# Post\n\nBody here.\n\n**Meta Description:**\nA short summary of the post.\n";
        let result = extract_blog_components(raw);

        assert_eq!(
            result.meta_description.as_deref(),
            Some("A short summary of the post.")
        );
        assert!(!result.content.contains("A short summary"));
        assert!(!result.content.contains("Meta Description"));
        assert!(result.content.contains("Body here."));
    }

    #[test]
    fn test_json_object_in_chatter() {
        let raw = r#"Here is the final post:
{"title": "Agents at Work", "content": "Intro paragraph.\n\n## Details\n\nMore text here.", "tags": ["AI", "agents", "x"], "meta_description": "How agents work."}
Let me know if you need changes."#;
        let result = extract_blog_components(raw);

        assert_eq!(result.title, "Agents at Work");
        assert_eq!(result.content, "Intro paragraph.\n\n## Details\n\nMore text here.");
        assert_eq!(result.tags, vec!["AI", "agents"]);
        assert_eq!(result.meta_description.as_deref(), Some("How agents work."));
        assert_eq!(result.word_count, 6);
    }

    #[test]
    fn test_json_without_title_or_tags_uses_defaults() {
        let raw = r#"{"content": "Only a body."}"#;
        let result = extract_blog_components(raw);

        assert_eq!(result.title, DEFAULT_TITLE);
        assert_eq!(result.tags, DEFAULT_TAGS.to_vec());
        assert_eq!(result.meta_description, None);
        assert_eq!(result.content, "Only a body.");
    }

    #[test]
    fn test_malformed_json_uses_markdown_patterns() {
        let raw = "# Markdown Title\n\nThe config is {\"title\": broken}.\n\n**Tags:** rust, serde";
        let result = extract_blog_components(raw);

        assert_eq!(result.title, "Markdown Title");
        assert_eq!(result.tags, vec!["rust", "serde"]);
        assert!(result.content.contains("{\"title\": broken}"));
    }

    #[test]
    fn test_json_with_blank_content_uses_markdown_patterns() {
        let raw = "# Heading Title\n\n{\"title\": \"Ignored\", \"content\": \"  \"}";
        let result = extract_blog_components(raw);

        assert_eq!(result.title, "Heading Title");
    }
}
