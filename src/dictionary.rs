use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

use crate::config::DictionarySource;
use crate::error::{AgentError, AgentResult};
use crate::logging;
use crate::object_literal;

/// Target locales carried by every dictionary source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Cn,
    Ja,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Cn, Locale::Ja];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Cn => "cn",
            Locale::Ja => "ja",
        }
    }

    fn url(self, source: &DictionarySource) -> Option<&str> {
        let url = match self {
            Locale::En => source.en.as_deref(),
            Locale::Cn => source.cn.as_deref(),
            Locale::Ja => source.ja.as_deref(),
        };
        url.map(str::trim).filter(|u| !u.is_empty())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Normalize a display value for reverse-index lookup.
///
/// NFC, full-width `，。！？` and curly quotes folded to ASCII, whitespace runs
/// collapsed to one space, ends trimmed. `lowercase` is only set for English.
pub fn normalize_value(value: &str, lowercase: bool) -> String {
    let folded: String = value
        .nfc()
        .map(|c| match c {
            '，' => ',',
            '。' => '.',
            '！' => '!',
            '？' => '?',
            '“' | '”' => '"',
            '‘' | '’' => '\'',
            other => other,
        })
        .collect();

    let collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    if lowercase {
        collapsed.to_lowercase()
    } else {
        collapsed
    }
}

/// Normalized value -> every key producing it, in discovery order
#[derive(Debug, Clone, Default)]
pub struct ReverseIndex {
    lowercase: bool,
    entries: HashMap<String, Vec<String>>,
}

impl ReverseIndex {
    pub fn new(lowercase: bool) -> Self {
        Self {
            lowercase,
            entries: HashMap::new(),
        }
    }

    /// Append `key` under `value`; blank values are not indexed and a key is listed once per value
    pub fn insert(&mut self, value: &str, key: &str) {
        let normalized = normalize_value(value, self.lowercase);
        if normalized.is_empty() {
            return;
        }
        let keys = self.entries.entry(normalized).or_default();
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    }

    /// Candidate keys for `text`, normalized the same way values were
    pub fn lookup(&self, text: &str) -> Option<&[String]> {
        self.entries
            .get(&normalize_value(text, self.lowercase))
            .map(Vec::as_slice)
            .filter(|keys| !keys.is_empty())
    }

    /// Number of distinct normalized values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Merged remote translations plus the English and Chinese reverse indices
#[derive(Debug, Clone)]
pub struct TranslationDictionary {
    en: HashMap<String, String>,
    cn: HashMap<String, String>,
    ja: HashMap<String, String>,
    en_index: ReverseIndex,
    cn_index: ReverseIndex,
}

impl Default for TranslationDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationDictionary {
    pub fn new() -> Self {
        Self {
            en: HashMap::new(),
            cn: HashMap::new(),
            ja: HashMap::new(),
            en_index: ReverseIndex::new(true),
            cn_index: ReverseIndex::new(false),
        }
    }

    /// Merge one locale document; later writes win in the map, the index only appends
    pub fn merge(&mut self, locale: Locale, pairs: &[(String, String)]) {
        for (key, value) in pairs {
            match locale {
                Locale::En => self.en_index.insert(value, key),
                Locale::Cn => self.cn_index.insert(value, key),
                Locale::Ja => {}
            }
            self.map_mut(locale).insert(key.clone(), value.clone());
        }
    }

    fn map(&self, locale: Locale) -> &HashMap<String, String> {
        match locale {
            Locale::En => &self.en,
            Locale::Cn => &self.cn,
            Locale::Ja => &self.ja,
        }
    }

    fn map_mut(&mut self, locale: Locale) -> &mut HashMap<String, String> {
        match locale {
            Locale::En => &mut self.en,
            Locale::Cn => &mut self.cn,
            Locale::Ja => &mut self.ja,
        }
    }

    pub fn value(&self, locale: Locale, key: &str) -> Option<&str> {
        self.map(locale).get(key).map(String::as_str)
    }

    /// True when `key` exists in any locale
    pub fn is_known_key(&self, key: &str) -> bool {
        self.en.contains_key(key) || self.cn.contains_key(key) || self.ja.contains_key(key)
    }

    pub fn lookup_en(&self, text: &str) -> Option<&[String]> {
        self.en_index.lookup(text)
    }

    pub fn lookup_cn(&self, text: &str) -> Option<&[String]> {
        self.cn_index.lookup(text)
    }

    pub fn locale_len(&self, locale: Locale) -> usize {
        self.map(locale).len()
    }

    /// Size of the known-key universe
    pub fn key_count(&self) -> usize {
        let mut keys: HashSet<&str> = self.en.keys().map(String::as_str).collect();
        keys.extend(self.cn.keys().map(String::as_str));
        keys.extend(self.ja.keys().map(String::as_str));
        keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.en.is_empty() && self.cn.is_empty() && self.ja.is_empty()
    }
}

/// Retrieves a remote document by URL
pub trait DocumentFetcher {
    fn fetch(&self, url: &str) -> AgentResult<String>;
}

/// Outcome of loading one named source
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReport {
    pub name: String,
    pub en_count: usize,
    pub cn_count: usize,
    pub ja_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceReport {
    fn count_mut(&mut self, locale: Locale) -> &mut usize {
        match locale {
            Locale::En => &mut self.en_count,
            Locale::Cn => &mut self.cn_count,
            Locale::Ja => &mut self.ja_count,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedDictionary {
    pub dictionary: TranslationDictionary,
    /// One report per configured source, in configuration order
    pub sources: Vec<SourceReport>,
}

impl LoadedDictionary {
    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources.iter().filter(|s| s.error.is_some())
    }
}

/// Fetch every source in order and merge the ones that loaded completely.
///
/// A source whose documents cannot all be fetched and parsed is reported and
/// skipped. Fails only when no sources are configured or nothing at all loaded.
pub fn load_dictionary(
    sources: &[DictionarySource],
    fetcher: &dyn DocumentFetcher,
) -> AgentResult<LoadedDictionary> {
    if sources.is_empty() {
        return Err(AgentError::missing("no dictionary sources configured"));
    }

    let mut dictionary = TranslationDictionary::new();
    let mut reports = Vec::with_capacity(sources.len());

    for source in sources {
        let mut report = SourceReport {
            name: source.name.clone(),
            ..Default::default()
        };

        match fetch_source(source, fetcher) {
            Ok(documents) => {
                for (locale, pairs) in &documents {
                    *report.count_mut(*locale) = pairs.len();
                    dictionary.merge(*locale, pairs);
                }
                logging::info(&format!(
                    "Loaded source '{}': en={}, cn={}, ja={}",
                    report.name, report.en_count, report.cn_count, report.ja_count
                ));
            }
            Err(e) => {
                logging::warn(&format!("Skipping source '{}': {}", source.name, e));
                report.error = Some(e.to_string());
            }
        }

        reports.push(report);
    }

    if dictionary.is_empty() {
        return Err(AgentError::EmptyDictionary);
    }

    logging::info(&format!(
        "Dictionary ready: {} keys (en={}, cn={}, ja={})",
        dictionary.key_count(),
        dictionary.locale_len(Locale::En),
        dictionary.locale_len(Locale::Cn),
        dictionary.locale_len(Locale::Ja)
    ));

    Ok(LoadedDictionary {
        dictionary,
        sources: reports,
    })
}

fn fetch_source(
    source: &DictionarySource,
    fetcher: &dyn DocumentFetcher,
) -> AgentResult<Vec<(Locale, Vec<(String, String)>)>> {
    let mut documents = Vec::new();

    for locale in Locale::ALL {
        let Some(url) = locale.url(source) else {
            continue;
        };
        logging::debug(&format!("Fetching {} {} from {}", source.name, locale, url));
        let text = fetcher.fetch(url)?;
        let pairs = object_literal::parse_translation_document(&text);
        if pairs.is_empty() {
            return Err(AgentError::EmptyDocument {
                url: url.to_string(),
            });
        }
        documents.push((locale, pairs));
    }

    if documents.is_empty() {
        return Err(AgentError::missing(format!("source '{}' has no locale URLs", source.name)));
    }

    Ok(documents)
}


#[cfg(test)]
mod tests {
    use super::testing::FakeFetcher;
    use super::*;

    fn source(name: &str, en: Option<&str>, cn: Option<&str>) -> DictionarySource {
        DictionarySource {
            name: name.to_string(),
            en: en.map(String::from),
            cn: cn.map(String::from),
            ja: None,
        }
    }

    #[test]
    fn english_normalization_is_case_insensitive() {
        assert_eq!(normalize_value("  Hello   World ", true), "hello world");
        assert_eq!(
            normalize_value("HELLO", true),
            normalize_value("Hello", true)
        );
    }

    #[test]
    fn chinese_normalization_folds_full_width_punctuation_only() {
        assert_eq!(normalize_value("你好，世界。", false), "你好,世界.");
        assert_eq!(normalize_value("“确定”", false), "\"确定\"");
        assert_eq!(normalize_value("Ok", false), "Ok");
    }

    #[test]
    fn reverse_index_keeps_discovery_order_without_duplicates() {
        let mut index = ReverseIndex::new(true);
        index.insert("Hello", "a1");
        index.insert("hello", "a2");
        index.insert("Hello", "a1");
        index.insert("HELLO ", "a3");
        index.insert("   ", "blank");

        assert_eq!(index.lookup("Hello").unwrap(), ["a1", "a2", "a3"]);
        assert_eq!(index.lookup("HELLO").unwrap(), ["a1", "a2", "a3"]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn chinese_lookup_matches_across_punctuation_width() {
        let dictionary = testing::dictionary(&[], &[("msg_ok", "保存成功！")]);
        assert_eq!(dictionary.lookup_cn("保存成功!").unwrap(), ["msg_ok"]);
        assert!(dictionary.lookup_cn("保存成功").is_none());
    }

    #[test]
    fn later_source_wins_in_map_but_index_keeps_both_values() {
        let fetcher = FakeFetcher::default()
            .with("https://a/en.js", "var translations = { k1: 'X' };")
            .with("https://b/en.js", "var translations = { k1: 'Y' };");
        let sources = vec![
            source("A", Some("https://a/en.js"), None),
            source("B", Some("https://b/en.js"), None),
        ];

        let loaded = load_dictionary(&sources, &fetcher).unwrap();
        let dictionary = &loaded.dictionary;

        assert_eq!(dictionary.value(Locale::En, "k1"), Some("Y"));
        assert_eq!(dictionary.lookup_en("X").unwrap(), ["k1"]);
        assert_eq!(dictionary.lookup_en("Y").unwrap(), ["k1"]);
    }

    #[test]
    fn failing_source_is_skipped_and_reported() {
        let fetcher = FakeFetcher::default()
            .with("https://a/en.js", "var translations = { save: 'Save' };")
            .with("https://a/cn.js", "var translations = { save: '保存' };")
            .with("https://b/en.js", "var translations = { other: 'Other' };")
            .with("https://c/en.js", "<html>oops</html>");
        let sources = vec![
            source("A", Some("https://a/en.js"), Some("https://a/cn.js")),
            source("B", Some("https://b/en.js"), Some("https://b/missing.js")),
            source("C", Some("https://c/en.js"), None),
        ];

        let loaded = load_dictionary(&sources, &fetcher).unwrap();

        assert_eq!(loaded.sources.len(), 3);
        assert_eq!(loaded.sources[0].en_count, 1);
        assert_eq!(loaded.sources[0].cn_count, 1);
        assert!(loaded.sources[1].error.as_deref().unwrap().contains("404"));
        assert!(loaded.sources[2]
            .error
            .as_deref()
            .unwrap()
            .contains("No valid translations"));
        assert_eq!(loaded.failed_sources().count(), 2);
        assert!(!loaded.dictionary.is_known_key("other"));
        assert_eq!(loaded.dictionary.value(Locale::Cn, "save"), Some("保存"));
    }

    #[test]
    fn no_sources_is_missing_precondition() {
        let err = load_dictionary(&[], &FakeFetcher::default()).unwrap_err();
        assert!(matches!(err, AgentError::MissingPrecondition(_)));
    }

    #[test]
    fn all_sources_failing_is_empty_dictionary() {
        let sources = vec![source("A", Some("https://a/en.js"), None)];
        let err = load_dictionary(&sources, &FakeFetcher::default()).unwrap_err();
        assert!(matches!(err, AgentError::EmptyDictionary));
    }

    #[test]
    fn known_key_universe_spans_locales() {
        let dictionary = testing::dictionary(&[("a", "A")], &[("b", "乙")]);
        assert!(dictionary.is_known_key("a"));
        assert!(dictionary.is_known_key("b"));
        assert!(!dictionary.is_known_key("A"));
        assert_eq!(dictionary.key_count(), 2);
    }
}
