//! Weighted wordlist loading and corpus sampling.
//!
//! The wordlist is a plain `"<word> <count>"` file. Only Vietnamese words of
//! at least two letters enter the distribution; every other line is dropped
//! before any weight is accumulated.

use crate::alphabet::is_vietnamese_word;
use crate::config::SamplerConfig;
use crate::error::{PipelineError, Result};
use crate::io::{open_text, write_atomic};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::BufRead;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

/// Splits `"word count"` on the last whitespace run.
///
/// Returns `None` for blank lines and for anything whose count is not an
/// unsigned integer.
pub fn parse_line(line: &str) -> Option<(String, u64)> {
    let t = line.trim();
    let (word, count) = t.rsplit_once(char::is_whitespace)?;
    let word = word.trim_end();
    if word.is_empty() {
        return None;
    }
    let weight = count.parse::<u64>().ok()?;
    Some((word.nfc().collect(), weight))
}

/// Filtered `(word, weight)` pairs with their cumulative weights.
#[derive(Debug, Clone)]
pub struct WeightedVocabulary {
    words: Vec<String>,
    weights: Vec<u64>,
    cumulative: Vec<u64>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LoadStats {
    pub lines: usize,
    pub malformed: usize,
    pub rejected: usize,
}

impl WeightedVocabulary {
    /// Builds the distribution from already-parsed entries, applying the word
    /// predicate and dropping zero weights.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        let mut words = Vec::new();
        let mut weights = Vec::new();
        let mut cumulative = Vec::new();
        let mut total: u64 = 0;

        for (word, weight) in entries {
            if weight == 0 || !is_vietnamese_word(&word) {
                continue;
            }
            total = total
                .checked_add(weight)
                .ok_or_else(|| PipelineError::Config("total word weight overflows u64".into()))?;
            words.push(word);
            weights.push(weight);
            cumulative.push(total);
        }

        if words.is_empty() {
            return Err(PipelineError::EmptyDistribution);
        }
        Ok(Self {
            words,
            weights,
            cumulative,
        })
    }

    pub fn from_reader<R: BufRead>(reader: R, path: &Path) -> Result<(Self, LoadStats)> {
        let mut stats = LoadStats::default();
        let mut entries = Vec::new();

        for line in reader.lines() {
            let line = line.map_err(|e| PipelineError::io(path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            stats.lines += 1;
            match parse_line(&line) {
                Some(entry) => entries.push(entry),
                None => stats.malformed += 1,
            }
        }

        let parsed = entries.len();
        let vocab = Self::from_entries(entries)?;
        stats.rejected = parsed - vocab.len();
        Ok((vocab, stats))
    }

    pub fn load(path: &Path) -> Result<(Self, LoadStats)> {
        Self::from_reader(open_text(path)?, path)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn total_weight(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.words
            .iter()
            .map(String::as_str)
            .zip(self.weights.iter().copied())
    }

    /// Word at the smallest index whose cumulative weight is `>= r`.
    ///
    /// `r` is expected in `1..=total_weight()`; larger values clamp to the
    /// last word.
    pub fn select(&self, r: u64) -> &str {
        let idx = self.cumulative.partition_point(|&cum| cum < r);
        &self.words[idx.min(self.words.len() - 1)]
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> &str {
        let r = rng.gen_range(1..=self.total_weight());
        self.select(r)
    }

    /// Draws `n` words with replacement and joins them with single spaces.
    pub fn sample_corpus<R: Rng>(&self, rng: &mut R, n: usize) -> String {
        let mut corpus = String::new();
        for i in 0..n {
            if i > 0 {
                corpus.push(' ');
            }
            corpus.push_str(self.sample(rng));
        }
        corpus
    }
}

pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Result of a sampler run.
#[derive(Debug)]
pub struct CorpusSummary {
    pub vocabulary: usize,
    pub words: usize,
    pub chars: usize,
    pub preview: String,
}

/// Loads the wordlist, samples the corpus and writes it to
/// `config.corpus_path`. Nothing is written if loading fails.
pub fn generate_corpus(config: &SamplerConfig) -> Result<CorpusSummary> {
    let (vocab, stats) = WeightedVocabulary::load(&config.wordlist_path)?;
    info!(
        "loaded {} valid words from {} ({} malformed lines, {} rejected words)",
        vocab.len(),
        config.wordlist_path.display(),
        stats.malformed,
        stats.rejected
    );

    let mut rng = make_rng(config.seed);
    let corpus = vocab.sample_corpus(&mut rng, config.target_words);
    write_atomic(&config.corpus_path, corpus.as_bytes())?;
    debug!("wrote corpus to {}", config.corpus_path.display());

    let preview = corpus
        .split(' ')
        .take(50)
        .collect::<Vec<_>>()
        .join(" ");
    Ok(CorpusSummary {
        vocabulary: vocab.len(),
        words: config.target_words,
        chars: corpus.chars().count(),
        preview,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn vocab_of(text: &str) -> Result<(WeightedVocabulary, LoadStats)> {
        WeightedVocabulary::from_reader(Cursor::new(text), Path::new("test.txt"))
    }

    #[test]
    fn test_parse_line_splits_on_last_whitespace() {
        assert_eq!(parse_line("ba 10"), Some(("ba".to_string(), 10)));
        assert_eq!(parse_line("  con\t\t3  "), Some(("con".to_string(), 3)));
        assert_eq!(parse_line("xin chào 5"), Some(("xin chào".to_string(), 5)));
        assert_eq!(parse_line("ba"), None);
        assert_eq!(parse_line("ba ten"), None);
        assert_eq!(parse_line("ba -3"), None);
        assert_eq!(parse_line(""), None);
    }

    #[test]
    fn test_parse_line_normalizes_to_nfc() {
        // "việt" with combining dot below and circumflex
        let decomposed = "vie\u{0323}\u{0302}t 4";
        let (word, _) = parse_line(decomposed).unwrap();
        assert_eq!(word, "việt");
        assert!(is_vietnamese_word(&word));
    }

    #[test]
    fn test_filtering_and_cumulative_weights() {
        let (vocab, stats) = vocab_of("ba 10\na 5\ncon 3").unwrap();
        assert_eq!(vocab.len(), 2);
        assert_eq!(
            vocab.iter().collect::<Vec<_>>(),
            vec![("ba", 10), ("con", 3)]
        );
        assert_eq!(vocab.total_weight(), 13);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.malformed, 0);

        assert_eq!(vocab.select(1), "ba");
        assert_eq!(vocab.select(10), "ba");
        assert_eq!(vocab.select(11), "con");
        assert_eq!(vocab.select(13), "con");
    }

    #[test]
    fn test_rejected_words_carry_no_weight() {
        let (vocab, _) = vocab_of("wifi 1000\nfacebook 50\nnhà 2\nzô 9\n").unwrap();
        assert_eq!(vocab.total_weight(), 2);
        assert!(vocab.contains("nhà"));
        assert!(!vocab.contains("wifi"));
    }

    #[test]
    fn test_zero_weight_is_dropped() {
        let (vocab, _) = vocab_of("ba 0\ncon 4").unwrap();
        assert_eq!(vocab.len(), 1);
        assert_eq!(vocab.select(1), "con");
    }

    #[test]
    fn test_all_malformed_is_empty_distribution() {
        let err = vocab_of("ba\n\nfoo bar\n12\n").unwrap_err();
        assert!(matches!(err, PipelineError::EmptyDistribution));
        let err = vocab_of("").unwrap_err();
        assert!(matches!(err, PipelineError::EmptyDistribution));
    }

    #[test]
    fn test_corpus_words_come_from_vocabulary() {
        let (vocab, _) = vocab_of("tôi 50\nyêu 20\nviệt 10\nnam 10\na 99\nwow 5").unwrap();
        let mut rng = make_rng(Some(7));
        let corpus = vocab.sample_corpus(&mut rng, 500);
        let words: Vec<&str> = corpus.split(' ').collect();
        assert_eq!(words.len(), 500);
        assert!(words.iter().all(|w| vocab.contains(w)));
        assert!(!corpus.ends_with(' '));
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let (vocab, _) = vocab_of("một 3\nhai 2\nba 1").unwrap();
        let a = vocab.sample_corpus(&mut make_rng(Some(42)), 200);
        let b = vocab.sample_corpus(&mut make_rng(Some(42)), 200);
        assert_eq!(a, b);
    }

    #[test]
    fn test_sampling_follows_weights() {
        let (vocab, _) = vocab_of("ba 9\ncon 1").unwrap();
        let mut rng = make_rng(Some(1));
        let corpus = vocab.sample_corpus(&mut rng, 10_000);
        let ba = corpus.split(' ').filter(|w| *w == "ba").count();
        assert!((8_500..=9_500).contains(&ba), "ba drawn {ba} times");
    }

    #[test]
    fn test_zero_target_gives_empty_corpus() {
        let (vocab, _) = vocab_of("ba 1").unwrap();
        assert_eq!(vocab.sample_corpus(&mut make_rng(Some(0)), 0), "");
    }
}
