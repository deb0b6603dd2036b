//! Character n-gram frequency extraction.
//!
//! The corpus is reduced to a lowercase stream of alphabet letters with word
//! gaps removed, then tallied for window widths 1 to 3. Each width becomes one
//! JSON frequency document.

use crate::alphabet::{fold, is_vietnamese_letter};
use crate::config::ExtractorConfig;
use crate::error::{PipelineError, Result};
use crate::io::{pretty_json, read_text, write_atomic, write_atomic_all};
use log::{debug, info};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

pub const MAX_ORDER: usize = 3;
pub const FREQUENCY_DECIMALS: i32 = 4;

/// Rounds to the nearest `decimals`-place decimal, judged on the exact binary
/// value. Exact ties go to the even neighbour, so `round_to(0.0078125, 6)` is
/// `0.007812`.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let places = decimals.max(0) as usize;
    if let Some(scaled) = exact_decimal(value, places + 1) {
        if scaled % 10 == 5 {
            let mut kept = scaled / 10;
            if kept % 2 == 1 {
                kept += 1;
            }
            return value.signum() * kept as f64 / 10f64.powi(places as i32);
        }
    }
    // not a tie: the shortest correctly rounded decimal is unambiguous
    format!("{value:.places$}").parse().unwrap_or(value)
}

/// `|value| * 10^places` when that is an exact integer, `None` otherwise.
fn exact_decimal(value: f64, places: usize) -> Option<u128> {
    if !value.is_finite() || places > 20 {
        return None;
    }
    // scaling by a power of two is exact; an integer result means the value
    // has at most `places` decimal digits
    let shifted = value.abs() * 2f64.powi(places as i32);
    if shifted.fract() != 0.0 || shifted >= 2f64.powi(64) {
        return None;
    }
    (shifted as u128).checked_mul(5u128.checked_pow(places as u32)?)
}

/// Corpus text reduced to lowercase Vietnamese letters, boundaries dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolStream(Vec<char>);

impl SymbolStream {
    pub fn from_text(text: &str) -> Result<Self> {
        let symbols: Vec<char> = text
            .nfc()
            .filter(|&c| is_vietnamese_letter(c))
            .map(fold)
            .collect();
        if symbols.is_empty() {
            return Err(PipelineError::EmptyCorpus);
        }
        Ok(Self(symbols))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_chars(&self) -> &[char] {
        &self.0
    }

    /// Number of width-`k` windows: `len - k + 1`, or zero when too short.
    pub fn window_count(&self, k: usize) -> usize {
        if k == 0 || self.0.len() < k {
            0
        } else {
            self.0.len() - k + 1
        }
    }

    /// Exact window tallies in first-occurrence order.
    pub fn count_windows(&self, k: usize) -> Vec<(String, u64)> {
        let mut index: HashMap<&[char], usize> = HashMap::new();
        let mut counts: Vec<(String, u64)> = Vec::new();
        if k == 0 {
            return counts;
        }
        for window in self.0.windows(k) {
            match index.get(window) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(window, counts.len());
                    counts.push((window.iter().collect(), 1));
                }
            }
        }
        counts
    }
}

impl fmt::Display for SymbolStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.0 {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NgramRecord {
    pub count: u64,
    /// Percentage of all windows of the same width.
    pub frequency: f64,
}

/// N-gram records kept in insertion order through (de)serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Records(Vec<(String, NgramRecord)>);

impl Records {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NgramRecord)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, ngram: &str) -> Option<&NgramRecord> {
        self.0.iter().find(|(k, _)| k == ngram).map(|(_, v)| v)
    }
}

impl FromIterator<(String, NgramRecord)> for Records {
    fn from_iter<I: IntoIterator<Item = (String, NgramRecord)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for Records {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Records {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RecordsVisitor;

        impl<'de> Visitor<'de> for RecordsVisitor {
            type Value = Records;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of n-gram to {count, frequency}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Records, A::Error> {
                let mut seen = HashSet::new();
                let mut records = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, record)) = access.next_entry::<String, NgramRecord>()? {
                    if !seen.insert(key.clone()) {
                        return Err(de::Error::custom(format!("duplicate n-gram {key:?}")));
                    }
                    records.push((key, record));
                }
                Ok(Records(records))
            }
        }

        deserializer.deserialize_map(RecordsVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyDocument {
    pub description: String,
    /// Number of distinct n-grams, not the number of windows.
    pub total_items: usize,
    pub data: Records,
}

impl FrequencyDocument {
    /// Tallies width-`k` windows of `stream` into a document.
    pub fn from_stream(stream: &SymbolStream, k: usize, description: impl Into<String>) -> Self {
        let total = stream.window_count(k);
        let data: Records = stream
            .count_windows(k)
            .into_iter()
            .map(|(ngram, count)| {
                let frequency = round_to(100.0 * count as f64 / total as f64, FREQUENCY_DECIMALS);
                (ngram, NgramRecord { count, frequency })
            })
            .collect();
        Self {
            description: description.into(),
            total_items: data.len(),
            data,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = read_text(path)?;
        Self::from_json(&text, path)
    }

    pub fn from_json(text: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| PipelineError::MalformedDocument {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        pretty_json(self)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, self.to_json()?.as_bytes())
    }

    /// Length of the first key, in chars.
    pub fn ngram_len(&self) -> Option<usize> {
        self.data.iter().next().map(|(k, _)| k.chars().count())
    }

    /// Records sorted by descending frequency, ties in document order.
    pub fn top_items(&self, n: usize) -> Vec<(&str, &NgramRecord)> {
        let mut items: Vec<_> = self.data.iter().collect();
        items.sort_by(|a, b| b.1.frequency.total_cmp(&a.1.frequency));
        items.truncate(n);
        items
    }

    /// Checks `total_items`, key lengths, and that frequencies sum to 100
    /// within `total_items * 5e-5`.
    pub fn check_invariants(&self) -> Result<()> {
        if self.total_items != self.data.len() {
            return Err(PipelineError::InvariantViolation(format!(
                "total_items is {} but data holds {} records",
                self.total_items,
                self.data.len()
            )));
        }
        let Some(len) = self.ngram_len() else {
            return Ok(());
        };
        if let Some((key, _)) = self.data.iter().find(|(k, _)| k.chars().count() != len) {
            return Err(PipelineError::InvariantViolation(format!(
                "n-gram {key:?} differs from length {len}"
            )));
        }
        let sum: f64 = self.data.iter().map(|(_, r)| r.frequency).sum();
        let tolerance = self.data.len() as f64 * 5e-5;
        if (sum - 100.0).abs() > tolerance {
            return Err(PipelineError::InvariantViolation(format!(
                "frequencies sum to {sum}, expected 100 ± {tolerance}"
            )));
        }
        Ok(())
    }
}

pub fn order_label(k: usize) -> &'static str {
    match k {
        1 => "character",
        2 => "character bigram",
        3 => "character trigram",
        _ => "character n-gram",
    }
}

fn describe(k: usize, corpus_words: usize) -> String {
    let size = if corpus_words >= 1000 && corpus_words % 1000 == 0 {
        format!("{}k", corpus_words / 1000)
    } else {
        corpus_words.to_string()
    };
    format!(
        "Vietnamese {} frequencies from {} word corpus",
        order_label(k),
        size
    )
}

/// Documents for widths 1, 2 and 3 of one corpus.
pub fn analyze_text(text: &str, corpus_words: usize) -> Result<Vec<FrequencyDocument>> {
    let stream = SymbolStream::from_text(text)?;
    debug!("symbol stream holds {} characters", stream.len());
    Ok((1..=MAX_ORDER)
        .map(|k| FrequencyDocument::from_stream(&stream, k, describe(k, corpus_words)))
        .collect())
}

/// Reads the corpus and writes the unigram, bigram and trigram documents.
///
/// All three are computed and serialized before any file is written, and
/// either every document is saved or none is.
pub fn extract_frequencies(config: &ExtractorConfig) -> Result<Vec<FrequencyDocument>> {
    let text = read_text(&config.corpus_path)?;
    info!(
        "corpus {} loaded: {} characters",
        config.corpus_path.display(),
        text.chars().count()
    );
    let docs = analyze_text(&text, config.corpus_words)?;

    let paths = [&config.unigram_path, &config.bigram_path, &config.trigram_path];
    let rendered = docs
        .iter()
        .map(FrequencyDocument::to_json)
        .collect::<Result<Vec<_>>>()?;
    let files: Vec<(&Path, &[u8])> = paths
        .iter()
        .zip(&rendered)
        .map(|(path, json)| (path.as_path(), json.as_bytes()))
        .collect();
    write_atomic_all(&files)?;

    for (doc, path) in docs.iter().zip(paths) {
        info!("saved {} items to {}", doc.total_items, path.display());
    }
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use rstest::rstest;

    fn doc(text: &str, k: usize) -> FrequencyDocument {
        let stream = SymbolStream::from_text(text).unwrap();
        FrequencyDocument::from_stream(&stream, k, "test")
    }

    #[test]
    fn test_symbol_stream_drops_boundaries_and_folds_case() {
        let stream = SymbolStream::from_text("ba ba con").unwrap();
        assert_eq!(stream.to_string(), "babacon");
        assert_eq!(stream.len(), 7);

        let stream = SymbolStream::from_text("Tôi, YÊU 123 Việt-Nam! wifi").unwrap();
        assert_eq!(stream.to_string(), "tôiyêuviệtnamii");
    }

    #[test]
    fn test_empty_corpus() {
        assert!(matches!(
            SymbolStream::from_text(""),
            Err(PipelineError::EmptyCorpus)
        ));
        assert!(matches!(
            SymbolStream::from_text(" 12 ,.! fwz"),
            Err(PipelineError::EmptyCorpus)
        ));
    }

    #[test]
    fn test_unigram_counts() {
        let d = doc("ba ba con", 1);
        let counts: Vec<(&str, u64)> = d.data.iter().map(|(k, r)| (k, r.count)).collect();
        assert_eq!(
            counts,
            vec![("b", 2), ("a", 2), ("c", 1), ("o", 1), ("n", 1)]
        );
        assert_eq!(d.total_items, 5);
        assert_eq!(d.data.get("a").unwrap().frequency, 28.5714);
        assert_eq!(d.data.get("c").unwrap().frequency, 14.2857);
    }

    #[test]
    fn test_windows_span_word_gaps() {
        let d = doc("ba ba con", 2);
        let keys: Vec<&str> = d.data.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["ba", "ab", "ac", "co", "on"]);
        assert_eq!(d.data.get("ba").unwrap().count, 2);
        // 6 windows in "babacon"
        assert_eq!(d.data.get("ba").unwrap().frequency, 33.3333);

        let d = doc("ba ba con", 3);
        assert_eq!(d.total_items, 5);
        assert_eq!(d.data.get("bab").unwrap().frequency, 20.0);
    }

    #[test]
    fn test_stream_shorter_than_window() {
        let d = doc("ba", 3);
        assert!(d.data.is_empty());
        assert_eq!(d.total_items, 0);
        d.check_invariants().unwrap();
    }

    #[test]
    fn test_frequencies_sum_to_100() {
        let text = "người việt nam yêu tiếng việt và học tiếng anh mỗi ngày";
        for k in 1..=MAX_ORDER {
            let d = doc(text, k);
            d.check_invariants().unwrap();
            let sum: f64 = d.data.iter().map(|(_, r)| r.frequency).sum();
            assert!(approx_eq!(f64, sum, 100.0, epsilon = d.total_items as f64 * 5e-5));
        }
    }

    #[test]
    fn test_json_keeps_insertion_order() {
        let d = doc("xin chào các bạn", 2);
        let json = d.to_json().unwrap();
        let back = FrequencyDocument::from_json(&json, Path::new("mem.json")).unwrap();
        assert_eq!(back, d);
        assert!(json.contains("\"hà\""));
        assert!(!json.contains("\\u"));
    }

    #[test]
    fn test_json_shape() {
        let json = doc("ba", 1).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["description"], "test");
        assert_eq!(value["total_items"], 2);
        assert_eq!(value["data"]["b"]["count"], 1);
        assert_eq!(value["data"]["a"]["frequency"], 50.0);
    }

    #[test]
    fn test_missing_frequency_is_malformed() {
        let json = r#"{"description": "x", "total_items": 1, "data": {"a": {"count": 3}}}"#;
        let err = FrequencyDocument::from_json(json, Path::new("bad.json")).unwrap_err();
        match err {
            PipelineError::MalformedDocument { reason, .. } => assert!(reason.contains("frequency")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_keys_are_malformed() {
        let json = r#"{"description": "x", "total_items": 2, "data": {
            "a": {"count": 1, "frequency": 50.0},
            "a": {"count": 1, "frequency": 50.0}}}"#;
        assert!(matches!(
            FrequencyDocument::from_json(json, Path::new("dup.json")),
            Err(PipelineError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn test_top_items_is_stable() {
        let d = doc("ba ba con", 1);
        let top: Vec<&str> = d.top_items(3).into_iter().map(|(k, _)| k).collect();
        assert_eq!(top, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_descriptions() {
        let docs = analyze_text("ba ba con", 10_000).unwrap();
        assert_eq!(
            docs[0].description,
            "Vietnamese character frequencies from 10k word corpus"
        );
        assert_eq!(
            docs[2].description,
            "Vietnamese character trigram frequencies from 10k word corpus"
        );
        let docs = analyze_text("ba ba con", 3).unwrap();
        assert_eq!(
            docs[1].description,
            "Vietnamese character bigram frequencies from 3 word corpus"
        );
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to(100.0 * 3.0 / 7.0, 4), 42.8571);
        assert_eq!(round_to(0.6, 6), 0.6);
        assert_eq!(round_to(2.0 / 3.0, 6), 0.666667);
    }

    // 2.675 is stored just below the tie, so it is not one
    #[rstest(
        value,
        decimals,
        expected,
        case(1.0 / 128.0, 6, 0.007812),
        case(127.0 / 128.0, 6, 0.992188),
        case(100.0 / 128.0, 4, 0.7812),
        case(0.125, 2, 0.12),
        case(0.375, 2, 0.38),
        case(2.5, 0, 2.0),
        case(2.675, 2, 2.67),
        case(-0.0078125, 6, -0.007812)
    )]
    fn test_exact_ties_round_to_even(value: f64, decimals: i32, expected: f64) {
        assert_eq!(round_to(value, decimals), expected);
    }
}
