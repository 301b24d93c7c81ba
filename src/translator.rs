use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::AgentResult;
use crate::extractor::{guess_language, LanguageGuess};
use crate::logging;

/// English source text -> English, Chinese and Japanese rows
pub const DEFAULT_PROMPT: &str = r#"You are a professional translator of web application UI copy.
Task: translate every input line of English text into Simplified Chinese and Japanese.
Output CSV only, one row per input line, in the same order as the input:
"<english>","<chinese>","<japanese>"
Rules:
- Wrap every field in double quotes and separate fields with a comma.
- Do not include example rows, headers, explanations or code fences.
- Fix obvious spelling mistakes in the English column.
- Keep special sequences exactly as written, e.g. \n, \t, {0}, {1}.
- In the Chinese and Japanese columns remove spaces around {n} placeholders."#;

/// Chinese source text -> English, Chinese and Japanese rows
pub const CN_TO_EN_PROMPT: &str = r#"You are a professional translator of web application UI copy.
Task: translate every input line of Chinese text into English and Japanese.
Keep the Chinese original in the second column.
Output CSV only, one row per input line, in the same order as the input:
"<english>","<original chinese>","<japanese>"
Rules:
- Wrap every field in double quotes and separate fields with a comma.
- Do not include example rows, headers, explanations or code fences.
- Keep special sequences exactly as written, e.g. \n, \t, {0}, {1}.
- In the English and Japanese columns remove spaces around {n} placeholders."#;

/// Machine-translation backend
pub trait TranslationProvider {
    /// Send `content` under `system_prompt` and return the raw completion text
    fn complete(&self, system_prompt: &str, content: &str) -> AgentResult<String>;
}

/// One text waiting for translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub text: String,
    pub language: LanguageGuess,
}

impl SourceText {
    /// Language from the text itself
    pub fn guessed(text: impl Into<String>) -> Self {
        let text = text.into();
        let language = guess_language(&text);
        Self { text, language }
    }

    fn is_chinese(&self) -> bool {
        match self.language {
            LanguageGuess::Zh => true,
            LanguageGuess::En => false,
            LanguageGuess::Key => guess_language(&self.text) == LanguageGuess::Zh,
        }
    }
}

/// `"en","cn","ja"` triple parsed from a provider response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslatedTriple {
    pub en: String,
    pub cn: String,
    pub ja: String,
}

/// Translation outcome for one source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRow {
    pub original: String,
    pub language: LanguageGuess,
    pub en: String,
    pub cn: String,
    pub ja: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranslationRow {
    /// Row for an item the provider never translated; the source text stays in its own column
    fn failed(item: &SourceText, message: &str) -> Self {
        let chinese = item.is_chinese();
        Self {
            original: item.text.clone(),
            language: if chinese {
                LanguageGuess::Zh
            } else {
                LanguageGuess::En
            },
            en: if chinese {
                String::new()
            } else {
                item.text.clone()
            },
            cn: if chinese {
                item.text.clone()
            } else {
                String::new()
            },
            ja: String::new(),
            error: Some(message.to_string()),
        }
    }

    /// `"en","cn","ja"` with embedded quotes doubled
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{}",
            csv_field(&self.en),
            csv_field(&self.cn),
            csv_field(&self.ja)
        )
    }
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

static CSV_LINE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Three quoted fields; `""` inside a field is an escaped quote
fn csv_line_regex() -> &'static Regex {
    CSV_LINE_REGEX.get_or_init(|| {
        Regex::new(r#""((?:[^"]|"")*)"\s*,\s*"((?:[^"]|"")*)"\s*,\s*"((?:[^"]|"")*)""#)
            .expect("CSV_LINE_REGEX pattern is invalid - this is a bug")
    })
}

/// Parse provider output into triples, one per non-blank line.
///
/// Lines that are not three quoted fields fall back to a plain comma split with
/// quotes stripped. Never fails; missing fields come back empty.
pub fn parse_translation_csv(data: &str) -> Vec<TranslatedTriple> {
    data.trim()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_csv_line)
        .collect()
}

fn parse_csv_line(line: &str) -> TranslatedTriple {
    if let Some(caps) = csv_line_regex().captures(line) {
        let field = |i: usize| {
            caps.get(i)
                .map(|m| m.as_str().replace("\"\"", "\""))
                .unwrap_or_default()
        };
        return TranslatedTriple {
            en: field(1),
            cn: field(2),
            ja: field(3),
        };
    }

    let mut parts = line
        .split(',')
        .map(|part| part.replace('"', "").trim().to_string());
    TranslatedTriple {
        en: parts.next().unwrap_or_default(),
        cn: parts.next().unwrap_or_default(),
        ja: parts.next().unwrap_or_default(),
    }
}

/// Translate one batch: English texts with `english_prompt`, Chinese texts with
/// [`CN_TO_EN_PROMPT`]. Rows come back English group first, each in input order.
/// Items the provider returned no line for are kept with an error.
pub fn translate_texts(
    provider: &dyn TranslationProvider,
    batch: &[SourceText],
    english_prompt: &str,
) -> AgentResult<Vec<TranslationRow>> {
    let (chinese, english): (Vec<&SourceText>, Vec<&SourceText>) =
        batch.iter().partition(|item| item.is_chinese());

    let mut rows = Vec::with_capacity(batch.len());
    for (group, prompt, language) in [
        (english, english_prompt, LanguageGuess::En),
        (chinese, CN_TO_EN_PROMPT, LanguageGuess::Zh),
    ] {
        if group.is_empty() {
            continue;
        }
        let content = group
            .iter()
            .map(|item| item.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let response = provider.complete(prompt, &content)?;
        let mut parsed = parse_translation_csv(&response).into_iter();

        for item in group {
            match parsed.next() {
                Some(triple) => rows.push(TranslationRow {
                    original: item.text.clone(),
                    language,
                    en: triple.en,
                    cn: triple.cn,
                    ja: triple.ja,
                    error: None,
                }),
                None => rows.push(TranslationRow::failed(item, "no translation returned")),
            }
        }
    }

    Ok(rows)
}

/// Batch size and pause between batches
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub size: usize,
    pub delay: Duration,
}

/// Translate in fixed-size batches. A failing batch is logged and each of its
/// items is recorded with the error; later batches still run.
pub fn batch_translate(
    provider: &dyn TranslationProvider,
    texts: &[SourceText],
    english_prompt: &str,
    options: BatchOptions,
) -> Vec<TranslationRow> {
    let size = options.size.max(1);
    let total_batches = texts.len().div_ceil(size);
    let mut rows = Vec::with_capacity(texts.len());

    for (index, batch) in texts.chunks(size).enumerate() {
        let number = index + 1;
        logging::info(&format!(
            "Translating batch {}/{} ({} texts)",
            number,
            total_batches,
            batch.len()
        ));

        match translate_texts(provider, batch, english_prompt) {
            Ok(translated) => rows.extend(translated),
            Err(e) => {
                logging::warn(&format!("Batch {} failed: {}", number, e));
                let message = e.to_string();
                for item in batch {
                    rows.push(TranslationRow::failed(item, &message));
                }
            }
        }

        if number < total_batches && !options.delay.is_zero() {
            std::thread::sleep(options.delay);
        }
    }

    rows
}
