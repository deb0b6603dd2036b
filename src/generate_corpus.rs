//! Sample a synthetic Vietnamese corpus from a weighted wordlist
//!
//! Usage: cargo run --release --bin generate_corpus -- [wordlist.txt] [corpus.txt] [--words N] [--seed S]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use vi_charmodel::config::{SamplerConfig, DEFAULT_TARGET_WORDS};
use vi_charmodel::generate_corpus;

#[derive(Parser, Debug)]
#[command(about = "Generate a weighted random Vietnamese word corpus")]
struct Args {
    /// `<word> <count>` lines, optionally gzip-compressed
    #[arg(default_value = "text_processing/vietnamese_sample.txt")]
    wordlist: PathBuf,

    /// Where the space-joined corpus is written
    #[arg(default_value = "text_processing/vietnamese_10k_words.txt")]
    corpus: PathBuf,

    /// Number of words to draw
    #[arg(long, default_value_t = DEFAULT_TARGET_WORDS)]
    words: usize,

    /// Seed for a reproducible corpus
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = SamplerConfig {
        wordlist_path: args.wordlist,
        corpus_path: args.corpus,
        target_words: args.words,
        seed: args.seed,
    };

    println!("=== Vietnamese Corpus Generator ===");
    println!("Wordlist: {}", config.wordlist_path.display());
    println!("Target words: {}", config.target_words);

    let summary = generate_corpus(&config)
        .with_context(|| format!("sampling from {}", config.wordlist_path.display()))?;

    println!("\nLoaded {} valid Vietnamese words", summary.vocabulary);
    println!("Generated corpus with {} words", summary.words);
    println!("Total characters: {}", summary.chars);
    println!("Saved to: {}", config.corpus_path.display());
    println!("\nPreview (first 50 words):");
    println!("{}", summary.preview);

    Ok(())
}
