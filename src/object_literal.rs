use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// `name = { ... }` assignment (with optional `var`/`let`/`const`/`window.`).
/// Captures: Group 1 = the object literal
static ASSIGNMENT_REGEX: OnceLock<Regex> = OnceLock::new();

/// `export default { ... }`.
/// Captures: Group 1 = the object literal
static EXPORT_DEFAULT_REGEX: OnceLock<Regex> = OnceLock::new();

/// `"key": "value"` pairs with either quote style.
/// Captures: Group 1 = key, Group 2 = escaped value
static PAIR_REGEX: OnceLock<Regex> = OnceLock::new();

fn assignment_regex() -> &'static Regex {
    ASSIGNMENT_REGEX.get_or_init(|| {
        Regex::new(
            r"(?s)(?:(?:var|let|const)\s+|window\.)?[A-Za-z_$][\w$]*\s*=\s*(\{.*\})\s*;?\s*$",
        )
        .expect("ASSIGNMENT_REGEX pattern is invalid - this is a bug")
    })
}

fn export_default_regex() -> &'static Regex {
    EXPORT_DEFAULT_REGEX.get_or_init(|| {
        Regex::new(r"(?s)export\s+default\s+(\{.*\})\s*;?\s*$")
            .expect("EXPORT_DEFAULT_REGEX pattern is invalid - this is a bug")
    })
}

fn pair_regex() -> &'static Regex {
    PAIR_REGEX.get_or_init(|| {
        Regex::new(r#"["']([^"']+)["']\s*:\s*["']((?:[^"'\\]|\\.)*)["']"#)
            .expect("PAIR_REGEX pattern is invalid - this is a bug")
    })
}

/// Recover the key/value pairs of a translation document.
///
/// The document is a script whose payload is an object literal, e.g.
/// `var translations = { "btn_save": "Save" };`. The literal is parsed as data
/// (JSON5 syntax: unquoted keys, single quotes and trailing commas are fine);
/// nothing in the document is ever executed. When no literal can be parsed,
/// `"key": "value"` pairs are scanned out of the raw text instead.
///
/// Pairs come back in document order. Nested objects are flattened into
/// dot-separated keys; non-string leaves are ignored.
pub fn parse_translation_document(text: &str) -> Vec<(String, String)> {
    if let Some(pairs) = parse_object_literal(text) {
        if !pairs.is_empty() {
            return pairs;
        }
    }
    scan_pairs(text)
}

fn parse_object_literal(text: &str) -> Option<Vec<(String, String)>> {
    let trimmed = text.trim();
    let literal = if trimmed.starts_with('{') {
        trimmed
    } else {
        export_default_regex()
            .captures(trimmed)
            .or_else(|| assignment_regex().captures(trimmed))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())?
    };

    let object: Map<String, Value> = json5::from_str(literal).ok()?;
    let mut pairs = Vec::new();
    flatten(&object, "", &mut pairs);
    Some(pairs)
}

fn flatten(object: &Map<String, Value>, prefix: &str, out: &mut Vec<(String, String)>) {
    for (key, value) in object {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::String(s) => out.push((full_key, s.clone())),
            Value::Object(nested) => flatten(nested, &full_key, out),
            _ => {}
        }
    }
}

/// Fallback: pull quoted pairs straight out of the text
fn scan_pairs(text: &str) -> Vec<(String, String)> {
    pair_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str();
            let value = caps.get(2)?.as_str();
            Some((key.to_string(), unescape(value)))
        })
        .collect()
}

/// Resolve `\"`, `\'`, `\\`, `\n` and `\t`; other escapes are kept as written
fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
