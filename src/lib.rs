//! Character-level n-gram model for Vietnamese text.
//!
//! The pipeline runs in four file-mediated stages:
//!
//! 1. [`sampler`] draws a synthetic corpus from a weighted wordlist.
//! 2. [`ngram`] reduces the corpus to a symbol stream and writes unigram,
//!    bigram and trigram frequency documents.
//! 3. [`transition`] turns a bigram or trigram document into a table of
//!    next-character probabilities.
//! 4. [`flat`] turns the unigram document into a sorted frequency table.
//!
//! Tables are written through a [`render::TableRenderer`].

pub mod alphabet;
pub mod config;
pub mod error;
pub mod flat;
pub mod io;
pub mod ngram;
pub mod render;
pub mod sampler;
pub mod transition;

pub use config::{ExtractorConfig, PipelineConfig, SamplerConfig, TableConfig};
pub use error::{PipelineError, Result};
pub use flat::{generate_frequency_file, FlatFrequencyTable};
pub use ngram::{extract_frequencies, FrequencyDocument, NgramRecord, SymbolStream};
pub use render::{OutputFormat, TableRenderer};
pub use sampler::{generate_corpus, WeightedVocabulary};
pub use transition::{generate_transition_file, Candidate, NgramKind, TransitionTable};

/// Runs every stage in order. Each stage reads only what the previous one
/// wrote to disk.
pub fn run_pipeline(config: &PipelineConfig) -> Result<()> {
    config.validate()?;
    generate_corpus(&config.sampler)?;
    extract_frequencies(&config.extractor)?;
    generate_transition_file(&config.bigram_table, Some(NgramKind::Bigram))?;
    generate_transition_file(&config.trigram_table, Some(NgramKind::Trigram))?;
    generate_frequency_file(&config.char_table)?;
    Ok(())
}
