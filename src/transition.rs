//! Conditional next-character tables built from bigram/trigram documents.

use crate::config::TableConfig;
use crate::error::{PipelineError, Result};
use crate::io::write_atomic;
use crate::ngram::{round_to, FrequencyDocument};
use clap::ValueEnum;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PROBABILITY_DECIMALS: i32 = 6;

/// Largest error a single 6-decimal rounding can introduce.
const ROUNDING_SLACK: f64 = 5e-7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NgramKind {
    Bigram,
    Trigram,
}

impl NgramKind {
    pub fn from_len(len: usize) -> Result<Self> {
        match len {
            2 => Ok(NgramKind::Bigram),
            3 => Ok(NgramKind::Trigram),
            other => Err(PipelineError::UnsupportedNgramLength(other)),
        }
    }

    pub fn width(self) -> usize {
        match self {
            NgramKind::Bigram => 2,
            NgramKind::Trigram => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub next: char,
    pub probability: f64,
}

/// `prefix -> candidates`, prefixes in code-point order, candidates most
/// likely first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionTable {
    pub kind: NgramKind,
    pub entries: Vec<(String, Vec<Candidate>)>,
}

#[derive(Default)]
struct PrefixGroup {
    total: u64,
    // first-occurrence order
    next_counts: Vec<(char, u64)>,
}

impl PrefixGroup {
    /// `None` when the prefix total no longer fits in a `u64`.
    fn add(&mut self, next: char, count: u64) -> Option<()> {
        self.total = self.total.checked_add(count)?;
        // each per-char count is bounded by the total
        match self.next_counts.iter_mut().find(|(c, _)| *c == next) {
            Some((_, n)) => *n += count,
            None => self.next_counts.push((next, count)),
        }
        Some(())
    }
}

impl TransitionTable {
    /// Groups the document's n-grams by their leading `n-1` chars.
    ///
    /// The n-gram length comes from the first key. Probabilities are computed
    /// from raw counts, never from the rounded frequencies.
    pub fn from_document(doc: &FrequencyDocument) -> Result<Self> {
        let len = doc.ngram_len().unwrap_or(0);
        let kind = NgramKind::from_len(len)?;

        // BTreeMap<String> iterates in UTF-8 byte order, which is code-point order.
        let mut groups: BTreeMap<String, PrefixGroup> = BTreeMap::new();
        let mut skipped = 0usize;
        for (ngram, record) in doc.data.iter() {
            let chars: Vec<char> = ngram.chars().collect();
            if chars.len() != len {
                skipped += 1;
                continue;
            }
            let prefix: String = chars[..len - 1].iter().collect();
            let group = groups.entry(prefix).or_default();
            if group.add(chars[len - 1], record.count).is_none() {
                return Err(PipelineError::MalformedDocument {
                    path: "<frequency document>".into(),
                    reason: format!("prefix total overflows u64 at {ngram:?}"),
                });
            }
        }
        if skipped > 0 {
            warn!("skipped {skipped} n-grams whose length differs from {len}");
        }

        let mut entries = Vec::with_capacity(groups.len());
        for (prefix, mut group) in groups {
            if group.total == 0 {
                debug!("prefix {prefix:?} has no occurrences, dropped");
                continue;
            }
            // stable: equal counts keep document order
            group.next_counts.sort_by(|a, b| b.1.cmp(&a.1));
            let total = group.total as f64;
            let candidates = group
                .next_counts
                .into_iter()
                .map(|(next, count)| Candidate {
                    next,
                    probability: round_to(count as f64 / total, PROBABILITY_DECIMALS),
                })
                .collect();
            entries.push((prefix, candidates));
        }

        Ok(Self { kind, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, prefix: &str) -> Option<&[Candidate]> {
        self.entries
            .binary_search_by(|(p, _)| p.as_str().cmp(prefix))
            .ok()
            .map(|i| self.entries[i].1.as_slice())
    }

    pub fn candidate_count(&self) -> usize {
        self.entries.iter().map(|(_, c)| c.len()).sum()
    }

    /// Per prefix: probabilities sum to 1 within `count * 5e-7` and never
    /// increase along the list. Prefixes must be strictly ascending.
    pub fn check_invariants(&self) -> Result<()> {
        for pair in self.entries.windows(2) {
            if pair[0].0 >= pair[1].0 {
                return Err(PipelineError::InvariantViolation(format!(
                    "prefix {:?} is not before {:?}",
                    pair[0].0, pair[1].0
                )));
            }
        }
        for (prefix, candidates) in &self.entries {
            let sum: f64 = candidates.iter().map(|c| c.probability).sum();
            let tolerance = candidates.len() as f64 * ROUNDING_SLACK;
            if (sum - 1.0).abs() > tolerance + f64::EPSILON * candidates.len() as f64 {
                return Err(PipelineError::InvariantViolation(format!(
                    "probabilities after {prefix:?} sum to {sum}, expected 1 ± {tolerance}"
                )));
            }
            if let Some(w) = candidates
                .windows(2)
                .find(|w| w[1].probability > w[0].probability)
            {
                return Err(PipelineError::InvariantViolation(format!(
                    "after {prefix:?}, {:?} ({}) is listed before {:?} ({})",
                    w[0].next, w[0].probability, w[1].next, w[1].probability
                )));
            }
        }
        Ok(())
    }
}

/// Loads an n-gram document, builds its transition table and writes the
/// rendering. Nothing is written when the document is rejected.
///
/// `requested` is the kind named by the caller; the kind detected from the
/// document always wins.
pub fn generate_transition_file(
    config: &TableConfig,
    requested: Option<NgramKind>,
) -> Result<TransitionTable> {
    config.validate()?;
    let doc = FrequencyDocument::load(&config.input_path)?;
    let table = TransitionTable::from_document(&doc)?;
    if let Some(kind) = requested.filter(|k| *k != table.kind) {
        warn!(
            "requested {kind:?} but {} holds {}-grams, building a {:?} table",
            config.input_path.display(),
            table.kind.width(),
            table.kind
        );
    }
    if let Err(e) = table.check_invariants() {
        warn!("{e}");
    }

    let rendered = config
        .format
        .renderer()
        .render_transitions(&table, &config.export_name)?;
    write_atomic(&config.output_path, rendered.as_bytes())?;
    info!(
        "generated {:?} map with {} prefixes into {}",
        table.kind,
        table.len(),
        config.output_path.display()
    );
    Ok(table)
}
