//! Name normalization for similarity comparison

use std::collections::BTreeSet;

use unicode_normalization::UnicodeNormalization;

/// Normalize a name fragment for comparison
///
/// - Removes diacritics and any other non-ASCII character
/// - Replaces dashes by a space ("A-B" -> "A B")
/// - Replaces a dot that follows a non-blank character by a space ("N." -> "N ")
/// - Collapses whitespace
/// - Converts to uppercase
///
/// Returns `None` when nothing remains.
pub fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // NFKD separates combining marks, which the ASCII filter then drops
    let ascii: String = trimmed.nfkd().filter(char::is_ascii).collect();
    let undashed = replace_dashes(&ascii);
    let undotted = replace_trailing_dots(&undashed);
    let normalized = collapse_whitespace(&undotted).trim().to_ascii_uppercase();

    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Whether every word of the normalized name is a single letter, e.g. "J.-P."
pub fn is_short_name(raw: &str) -> bool {
    match normalize_name(raw) {
        Some(normalized) => normalized.split(' ').all(|word| word.len() == 1),
        None => false,
    }
}

/// Build the set of normalized renderings of a name.
///
/// With `enable_short_names`, every word may appear either in full or as its
/// initial, and the set holds every combination ("STEPHANE MARIE", "STEPHANE M",
/// "S MARIE", "S M"). Without it the set is the normalized name alone.
pub fn normalized_names_for(raw: &str, enable_short_names: bool) -> BTreeSet<String> {
    let mut cases = BTreeSet::new();
    let Some(normalized) = normalize_name(raw) else {
        return cases;
    };

    let mut words = normalized.split(' ');
    if let Some(first) = words.next() {
        cases.insert(first.to_string());
        if enable_short_names {
            cases.insert(initial(first).to_string());
        }
        for word in words {
            cases = extend_with_word(&cases, word, enable_short_names);
        }
    }
    cases
}

fn extend_with_word(cases: &BTreeSet<String>, word: &str, enable_short_names: bool) -> BTreeSet<String> {
    let mut extended = BTreeSet::new();
    for candidate in cases {
        extended.insert(format!("{} {}", candidate, word));
        if enable_short_names {
            extended.insert(format!("{} {}", candidate, initial(word)));
        }
    }
    extended
}

/// First character of an ASCII word
fn initial(word: &str) -> &str {
    &word[..word.len().min(1)]
}

/// `\s*-\s*` -> single space
fn replace_dashes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut after_dash = false;

    for c in s.chars() {
        if c == '-' {
            let kept = result.trim_end().len();
            result.truncate(kept);
            result.push(' ');
            after_dash = true;
        } else if after_dash && c.is_whitespace() {
            continue;
        } else {
            result.push(c);
            after_dash = false;
        }
    }

    result
}

/// `(\S)\.` -> `$1 `, scanning left to right without overlap
fn replace_trailing_dots(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 1);
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        result.push(c);
        if !c.is_whitespace() && chars.peek() == Some(&'.') {
            chars.next();
            result.push(' ');
        }
    }

    result
}

/// Collapse multiple whitespace characters into a single space
fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_space = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            result.push(c);
            prev_was_space = false;
        }
    }

    result
}
