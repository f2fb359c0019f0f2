//! String utility functions.
//!
//! Identifier normalization shared by the registry (record ids, file names)
//! and the capability bridge (tool names).

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static DISALLOWED_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9_\-]").unwrap());
static DUPLICATE_HYPHEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());
static DUPLICATE_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").unwrap());

const SEPARATORS: &[char] = &['-', '_'];

/// Maximum length of a registry identifier.
pub const MAX_AGENT_ID_LENGTH: usize = 20;

/// Maximum length of a tool name on the MCP side.
pub const MAX_TOOL_NAME_LENGTH: usize = 64;

/// Normalize arbitrary text into a filesystem- and identifier-safe slug.
///
/// Lowercases, trims, turns whitespace runs into `-`, drops everything
/// outside `[a-z0-9_-]`, collapses repeated separators and strips them from
/// both ends. When `max_length` is given the result is truncated and any
/// separator left dangling by the cut is removed.
///
/// Returns an empty string when nothing usable remains.
///
/// # Arguments
/// * `text` - Arbitrary input text.
/// * `max_length` - Optional upper bound on the output length.
pub fn slugify(text: &str, max_length: Option<usize>) -> String {
    let lowered = text.trim().to_lowercase();

    let hyphenated = WHITESPACE_RUN.replace_all(&lowered, "-");
    let cleaned = DISALLOWED_CHARS.replace_all(&hyphenated, "");
    let collapsed = DUPLICATE_HYPHEN.replace_all(&cleaned, "-");
    let collapsed = DUPLICATE_UNDERSCORE.replace_all(&collapsed, "_");

    let stripped = collapsed.trim_matches(SEPARATORS);

    match max_length {
        // Only ASCII survives the filter, so byte slicing is safe.
        Some(max_len) if stripped.len() > max_len => stripped[..max_len]
            .trim_end_matches(SEPARATORS)
            .to_string(),
        _ => stripped.to_string(),
    }
}
