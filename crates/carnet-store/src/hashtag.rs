//! Inline hashtag extraction from memo content.
//!
//! Scans free text for `#tag` tokens at word boundaries. Fenced code
//! blocks and inline code are stripped first so `#include` inside a code
//! span does not become a tag; the stripping is a heuristic and does not
//! cover every markdown code construct.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static CODE_BLOCK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[a-zA-Z]*\n.*?```").expect("static regex"));

static INLINE_CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`[^`]+`").expect("static regex"));

// A tag starts with `#` preceded by start-of-text or whitespace; `/` is
// allowed inside for hierarchical tags.
static HASHTAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)#([a-zA-Z0-9_/-]+)").expect("static regex"));

/// Extract `#tag` tokens from memo content.
///
/// Returns deduplicated, sorted tag names with their case preserved.
/// Numeric-only tokens are skipped, and a `#` followed by whitespace (a
/// markdown heading) never matches.
pub fn extract_inline_tags(content: &str) -> Vec<String> {
    let without_code_blocks = CODE_BLOCK_PATTERN.replace_all(content, "");
    let without_inline_code = INLINE_CODE_PATTERN.replace_all(&without_code_blocks, "");

    let mut tags = HashSet::new();
    for cap in HASHTAG_PATTERN.captures_iter(&without_inline_code) {
        if let Some(tag) = cap.get(1) {
            let tag = tag.as_str();
            if tag.chars().all(|c| c.is_numeric()) {
                continue;
            }
            tags.insert(tag.to_string());
        }
    }

    let mut result: Vec<String> = tags.into_iter().collect();
    result.sort();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_basic_tags() {
        let tags = extract_inline_tags("Buy milk #errand and call #family");
        assert_eq!(tags, vec!["errand".to_string(), "family".to_string()]);
    }

    #[test]
    fn test_deduplicates_repeated_tags() {
        let tags = extract_inline_tags("#todo one thing\n#todo another thing");
        assert_eq!(tags, vec!["todo".to_string()]);
    }

    #[test]
    fn test_supports_hierarchical_and_dashed_tags() {
        let tags = extract_inline_tags("see #project/sub and #multi-word_tag");
        assert_eq!(
            tags,
            vec!["multi-word_tag".to_string(), "project/sub".to_string()]
        );
    }

    #[test]
    fn test_skips_fenced_code_blocks() {
        let content = "real #tag\n```c\n#include <stdio.h>\n```\n";
        let tags = extract_inline_tags(content);
        assert_eq!(tags, vec!["tag".to_string()]);
    }

    #[test]
    fn test_skips_inline_code() {
        let tags = extract_inline_tags("use `#pragma once` but keep #cpp");
        assert_eq!(tags, vec!["cpp".to_string()]);
    }

    #[test]
    fn test_heading_is_not_a_tag() {
        let tags = extract_inline_tags("# Heading\n## Subheading\nbody #real");
        assert_eq!(tags, vec!["real".to_string()]);
    }

    #[test]
    fn test_skips_numeric_only_tokens() {
        let tags = extract_inline_tags("issue #123 fixed in #v2");
        assert_eq!(tags, vec!["v2".to_string()]);
    }

    #[test]
    fn test_mid_word_hash_is_not_a_tag() {
        let tags = extract_inline_tags("C#sharp and a#b");
        assert!(tags.is_empty());
    }

    #[test]
    fn test_case_is_preserved() {
        let tags = extract_inline_tags("#Work #work");
        assert_eq!(tags, vec!["Work".to_string(), "work".to_string()]);
    }
}
