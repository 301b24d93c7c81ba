use regex::{Captures, Regex, RegexSet};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// How a piece of text was found in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextKind {
    /// Markup text between `>` and `<`
    TemplateText,
    /// Single- or double-quoted string literal
    QuotedString,
    /// Back-quoted template literal
    TemplateLiteral,
    /// Value of a known text-bearing attribute (`placeholder="..."`)
    AttributeValue,
    /// Literal argument of a translation call (`$t('...')`)
    I18nCallArgument,
}

/// Heuristic guess of what a piece of text is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageGuess {
    Zh,
    En,
    /// Argument of an existing translation call; may be a key or display text
    Key,
}

/// One instance of extractable text in one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOccurrence {
    pub text: String,
    pub kind: TextKind,
    pub language: LanguageGuess,
    pub file_path: String,
    /// 1-based line number
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
    /// Exact substring matched
    pub raw_match: String,
}

/// Which of the two mutually exclusive scans to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Existing translation-call sites
    Calls,
    /// Untranslated literal text
    RawText,
}

/// A translation-call spelling recognized by extraction and replacement
#[derive(Debug, Clone, Copy)]
pub struct CallAlias {
    /// Regex source matching the callee, e.g. `i18n\.t`
    pub callee: &'static str,
    /// Reject matches preceded by an identifier character, `$` or `.`
    pub guarded: bool,
}

/// `$t(...)`, bare `t(...)` and `i18n.t(...)`, in scan order
pub const CALL_ALIASES: [CallAlias; 3] = [
    CallAlias {
        callee: r"\$t",
        guarded: false,
    },
    CallAlias {
        callee: "t",
        guarded: true,
    },
    CallAlias {
        callee: r"i18n\.t",
        guarded: false,
    },
];

/// CJK Unified Ideographs range used for Chinese detection
const CJK: &str = r"\x{4e00}-\x{9fa5}";

// =============================================================================
// Static regex patterns (compiled once via OnceLock for thread-safe lazy init)
// =============================================================================

static CALL_REGEXES: OnceLock<Vec<(CallAlias, Regex)>> = OnceLock::new();
static RAW_PATTERNS: OnceLock<Vec<RawPattern>> = OnceLock::new();
static ENGLISH_REGEX: OnceLock<Regex> = OnceLock::new();
static EXCLUDE_SET: OnceLock<RegexSet> = OnceLock::new();
static CJK_REGEX: OnceLock<Regex> = OnceLock::new();

struct RawPattern {
    regex: Regex,
    kind: TextKind,
}

/// Call-site regexes: `<callee>(<quote><content><quote> [, args])` with matching quotes.
/// Captures: Group 1 = single-quoted content, Group 2 = double-quoted content
fn call_regexes() -> &'static [(CallAlias, Regex)] {
    CALL_REGEXES.get_or_init(|| {
        CALL_ALIASES
            .iter()
            .map(|alias| {
                let source = format!(
                    r#"{}\(\s*(?:'([^'"]+)'|"([^'"]+)")(?:\s*,\s*[^)]+)?\s*\)"#,
                    alias.callee
                );
                let regex =
                    Regex::new(&source).expect("call-site pattern is invalid - this is a bug");
                (*alias, regex)
            })
            .collect()
    })
}

fn raw_patterns() -> &'static [RawPattern] {
    RAW_PATTERNS.get_or_init(|| {
        let specs = [
            (format!(r">([^<>]*[{CJK}]+[^<>]*)<"), TextKind::TemplateText),
            (format!(r"'([^']*[{CJK}]+[^']*)'"), TextKind::QuotedString),
            (format!(r#""([^"]*[{CJK}]+[^"]*)""#), TextKind::QuotedString),
            (format!(r"`([^`]*[{CJK}]+[^`]*)`"), TextKind::TemplateLiteral),
            (
                format!(
                    r#"(?i)(?:placeholder|title|label|message|content|text)\s*[=:]\s*["']([^"']*[{CJK}]+[^"']*)["']"#
                ),
                TextKind::AttributeValue,
            ),
        ];
        specs
            .into_iter()
            .map(|(source, kind)| RawPattern {
                regex: Regex::new(&source).expect("raw-text pattern is invalid - this is a bug"),
                kind,
            })
            .collect()
    })
}

/// Quoted capitalized English prose
fn english_regex() -> &'static Regex {
    ENGLISH_REGEX.get_or_init(|| {
        Regex::new(r#"["']([A-Z][a-zA-Z\s,.:!?]+[a-zA-Z.!?])["']"#)
            .expect("ENGLISH_REGEX pattern is invalid - this is a bug")
    })
}

fn exclude_set() -> &'static RegexSet {
    EXCLUDE_SET.get_or_init(|| {
        RegexSet::new([
            r"^\s*$",                 // whitespace only
            r"^[0-9.%$¥€£,+\-\s]+$", // numbers and currency
            r"^https?://",            // URLs
            r"^[a-zA-Z]+://",         // other protocol links
            r"^/",                    // absolute paths
            r"^@",
            r"^#",                    // colors, anchors
            r"^[a-zA-Z_]+$",          // bare identifiers
            r"console\.",
            r"import\s",
            r"require\(",
        ])
        .expect("EXCLUDE_SET patterns are invalid - this is a bug")
    })
}

fn cjk_regex() -> &'static Regex {
    CJK_REGEX.get_or_init(|| {
        Regex::new(&format!("[{CJK}]")).expect("CJK_REGEX pattern is invalid - this is a bug")
    })
}

/// Minimum length of an English prose match
const MIN_ENGLISH_LEN: usize = 3;

/// True when `text` contains at least one CJK ideograph
pub fn contains_cjk(text: &str) -> bool {
    cjk_regex().is_match(text)
}

/// `Zh` for text with CJK ideographs, `En` otherwise
pub fn guess_language(text: &str) -> LanguageGuess {
    if contains_cjk(text) {
        LanguageGuess::Zh
    } else {
        LanguageGuess::En
    }
}

/// True for text that should never be reported as translatable
pub fn is_excluded(text: &str) -> bool {
    exclude_set().is_match(text.trim())
}

/// Extract text occurrences from file content.
///
/// Output follows line order, then pattern order, then left-to-right match order.
/// Malformed input never fails; lines without matches contribute nothing.
pub fn extract_texts(content: &str, file_path: &str, mode: ExtractMode) -> Vec<TextOccurrence> {
    let mut texts = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        if is_comment_line(line) {
            continue;
        }
        match mode {
            ExtractMode::Calls => extract_call_sites(line, line_number, file_path, &mut texts),
            ExtractMode::RawText => extract_raw_text(line, line_number, file_path, &mut texts),
        }
    }

    texts
}

fn extract_call_sites(
    line: &str,
    line_number: usize,
    file_path: &str,
    out: &mut Vec<TextOccurrence>,
) {
    for (alias, regex) in call_regexes() {
        for caps in guarded_captures(regex, line, alias.guarded) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let Some(arg) = caps.get(1).or_else(|| caps.get(2)) else {
                continue;
            };
            let key = arg.as_str().trim();
            if key.is_empty() {
                continue;
            }
            out.push(TextOccurrence {
                text: key.to_string(),
                kind: TextKind::I18nCallArgument,
                language: LanguageGuess::Key,
                file_path: file_path.to_string(),
                line: line_number,
                column: column_of(line, whole.start()),
                raw_match: whole.as_str().to_string(),
            });
        }
    }
}

fn extract_raw_text(
    line: &str,
    line_number: usize,
    file_path: &str,
    out: &mut Vec<TextOccurrence>,
) {
    if contains_call_site(line) || is_statement_line(line) {
        return;
    }

    for pattern in raw_patterns() {
        for caps in pattern.regex.captures_iter(line) {
            push_raw(
                &caps,
                pattern.kind,
                LanguageGuess::Zh,
                line,
                line_number,
                file_path,
                out,
            );
        }
    }

    for caps in english_regex().captures_iter(line) {
        let Some(text) = caps.get(1).map(|m| m.as_str().trim()) else {
            continue;
        };
        if text.chars().count() < MIN_ENGLISH_LEN || !text.contains(char::is_whitespace) {
            continue;
        }
        push_raw(
            &caps,
            TextKind::QuotedString,
            LanguageGuess::En,
            line,
            line_number,
            file_path,
            out,
        );
    }
}

fn push_raw(
    caps: &Captures<'_>,
    kind: TextKind,
    language: LanguageGuess,
    line: &str,
    line_number: usize,
    file_path: &str,
    out: &mut Vec<TextOccurrence>,
) {
    let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
        return;
    };
    let text = inner.as_str().trim();
    if text.is_empty() || is_excluded(text) {
        return;
    }
    out.push(TextOccurrence {
        text: text.to_string(),
        kind,
        language,
        file_path: file_path.to_string(),
        line: line_number,
        column: column_of(line, whole.start()),
        raw_match: whole.as_str().to_string(),
    });
}

/// True when the line holds at least one recognized translation call
pub fn contains_call_site(line: &str) -> bool {
    call_regexes()
        .iter()
        .any(|(alias, regex)| !guarded_captures(regex, line, alias.guarded).is_empty())
}

/// All matches of `regex` in `haystack`; guarded matches preceded by an identifier
/// character, `$` or `.` are rejected and the search resumes one character later,
/// so a rejected match never hides a valid one inside it.
pub(crate) fn guarded_captures<'h>(
    regex: &Regex,
    haystack: &'h str,
    guarded: bool,
) -> Vec<Captures<'h>> {
    let mut found = Vec::new();
    let mut pos = 0;

    while pos <= haystack.len() {
        let Some(caps) = regex.captures_at(haystack, pos) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        if guarded && preceded_by_identifier(haystack, whole.start()) {
            pos = next_char_boundary(haystack, whole.start());
            continue;
        }
        pos = if whole.end() > whole.start() {
            whole.end()
        } else {
            next_char_boundary(haystack, whole.start())
        };
        found.push(caps);
    }

    found
}

fn preceded_by_identifier(haystack: &str, index: usize) -> bool {
    haystack[..index]
        .chars()
        .next_back()
        .map(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.')
        .unwrap_or(false)
}

fn next_char_boundary(haystack: &str, index: usize) -> usize {
    index
        + haystack[index..]
            .chars()
            .next()
            .map(char::len_utf8)
            .unwrap_or(1)
}

fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("//") || trimmed.starts_with('*') || trimmed.starts_with("/*")
}

fn is_statement_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("import ") || trimmed.starts_with("console.") || line.contains("require(")
}

fn column_of(line: &str, byte_index: usize) -> usize {
    line[..byte_index].chars().count() + 1
}
