use serde::Serialize;

use crate::dedup::{DedupedEntry, Location};
use crate::dictionary::{Locale, TranslationDictionary};
use crate::error::{AgentError, AgentResult};
use crate::extractor::LanguageGuess;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Disposition {
    /// Text is already a dictionary key
    AlreadyCorrect,
    /// Text is a display value; the call should use its key instead
    NeedsKeyNormalization,
    /// Neither a key nor a known value
    Untranslated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchedVia {
    DirectKey,
    ValueMatchEn,
    ValueMatchCn,
}

/// Resolver verdict for one deduplicated text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedOccurrence {
    pub text: String,
    pub language: LanguageGuess,
    pub disposition: Disposition,
    pub resolved_key: Option<String>,
    pub matched_via: Option<MatchedVia>,
    pub all_candidate_keys: Vec<String>,
    pub en_value: Option<String>,
    pub cn_value: Option<String>,
    pub ja_value: Option<String>,
    pub occurrences: Vec<Location>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSummary {
    pub existing_count: usize,
    pub need_replace_count: usize,
    pub missing_count: usize,
    pub total_keys: usize,
}

/// Entries split by disposition, each bucket in input order
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub existing: Vec<ClassifiedOccurrence>,
    pub need_replace: Vec<ClassifiedOccurrence>,
    pub missing: Vec<ClassifiedOccurrence>,
    pub summary: CheckSummary,
}

/// Classify every entry against the dictionary.
///
/// Refuses to run against an empty dictionary, since every entry would
/// come out untranslated.
pub fn classify(
    entries: &[DedupedEntry],
    dictionary: &TranslationDictionary,
) -> AgentResult<CheckResult> {
    if dictionary.is_empty() {
        return Err(AgentError::missing(
            "translation dictionary is empty; load dictionary sources first",
        ));
    }

    let mut result = CheckResult::default();
    for entry in entries {
        let classified = classify_entry(entry, dictionary);
        match classified.disposition {
            Disposition::AlreadyCorrect => result.existing.push(classified),
            Disposition::NeedsKeyNormalization => result.need_replace.push(classified),
            Disposition::Untranslated => result.missing.push(classified),
        }
    }

    result.summary = CheckSummary {
        existing_count: result.existing.len(),
        need_replace_count: result.need_replace.len(),
        missing_count: result.missing.len(),
        total_keys: entries.len(),
    };
    Ok(result)
}

/// Decide one entry: direct key, then English value, then Chinese value, else untranslated.
pub fn classify_entry(
    entry: &DedupedEntry,
    dictionary: &TranslationDictionary,
) -> ClassifiedOccurrence {
    let text = entry.text.as_str();

    if dictionary.is_known_key(text) {
        return resolved(
            entry,
            dictionary,
            Disposition::AlreadyCorrect,
            text,
            MatchedVia::DirectKey,
            vec![text.to_string()],
        );
    }

    let value_matches = [
        (dictionary.lookup_en(text), MatchedVia::ValueMatchEn),
        (dictionary.lookup_cn(text), MatchedVia::ValueMatchCn),
    ];
    for (candidates, via) in value_matches {
        let Some(candidates) = candidates else {
            continue;
        };
        let (disposition, key) = match candidates.iter().find(|k| k.as_str() != text) {
            Some(key) => (Disposition::NeedsKeyNormalization, key.as_str()),
            None => (Disposition::AlreadyCorrect, text),
        };
        return resolved(
            entry,
            dictionary,
            disposition,
            key,
            via,
            candidates.to_vec(),
        );
    }

    ClassifiedOccurrence {
        text: entry.text.clone(),
        language: entry.language,
        disposition: Disposition::Untranslated,
        resolved_key: None,
        matched_via: None,
        all_candidate_keys: Vec::new(),
        en_value: None,
        cn_value: None,
        ja_value: None,
        occurrences: entry.occurrences.clone(),
    }
}

fn resolved(
    entry: &DedupedEntry,
    dictionary: &TranslationDictionary,
    disposition: Disposition,
    key: &str,
    via: MatchedVia,
    candidates: Vec<String>,
) -> ClassifiedOccurrence {
    let value = |locale: Locale| dictionary.value(locale, key).map(str::to_string);
    ClassifiedOccurrence {
        text: entry.text.clone(),
        language: entry.language,
        disposition,
        resolved_key: Some(key.to_string()),
        matched_via: Some(via),
        all_candidate_keys: candidates,
        en_value: value(Locale::En),
        cn_value: value(Locale::Cn),
        ja_value: value(Locale::Ja),
        occurrences: entry.occurrences.clone(),
    }
}
