// Template parser for `{{namespace.id.pointer}}` tokens

use regex::Regex;
use std::sync::LazyLock;

use super::ast::{Namespace, Segment, VariableReference};

/// `{{`, optional whitespace, a brace-free interior, optional whitespace, `}}`
static VARIABLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").expect("variable pattern is a valid regex")
});

/// Split `value` into literal text and token matches.
///
/// The output alternates text and matches the way a capturing split does:
/// text segments sit at even positions (empty strings included) and every
/// token interior is passed to `on_match` together with its odd position.
pub fn parse_template_string<T, F>(value: &str, mut on_match: F) -> Vec<Segment<T>>
where
    F: FnMut(&str, usize) -> T,
{
    let mut segments = Vec::new();
    let mut last_end = 0;

    for captures in VARIABLE_PATTERN.captures_iter(value) {
        let (Some(whole), Some(interior)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        segments.push(Segment::Text(value[last_end..whole.start()].to_string()));
        let position = segments.len();
        segments.push(Segment::Match(on_match(interior.as_str().trim(), position)));
        last_end = whole.end();
    }

    segments.push(Segment::Text(value[last_end..].to_string()));
    segments
}

/// Token interiors of `value` in source order
pub fn variable_tokens(value: &str) -> Vec<&str> {
    VARIABLE_PATTERN
        .captures_iter(value)
        .filter_map(|captures| captures.get(1))
        .map(|interior| interior.as_str().trim())
        .collect()
}

/// Split a token interior into namespace, id and pointer. Never fails.
pub fn parse_variable(token: &str) -> VariableReference {
    let source = token.trim();
    let mut reference = VariableReference::new(source.to_string());

    if source.is_empty() {
        return reference;
    }

    let mut segments = source.split('.');

    if let Some(namespace) = segments.next().and_then(Namespace::parse) {
        reference = reference.with_namespace(namespace);
    }

    match segments.next() {
        Some(id) if !id.is_empty() => reference = reference.with_id(id.to_string()),
        _ => return reference,
    }

    let pointer = segments.collect::<Vec<_>>().join(".");
    if !pointer.is_empty() {
        reference = reference.with_pointer(pointer);
    }

    reference
}
