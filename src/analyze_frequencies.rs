//! Character, bigram and trigram frequencies of a Vietnamese corpus
//!
//! Usage: cargo run --release --bin analyze_frequencies -- [corpus.txt] [--out-dir DIR]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use vi_charmodel::config::{ExtractorConfig, DEFAULT_TARGET_WORDS};
use vi_charmodel::ngram::{extract_frequencies, order_label, FrequencyDocument};

#[derive(Parser, Debug)]
#[command(about = "Analyze a Vietnamese corpus into n-gram frequency documents")]
struct Args {
    #[arg(default_value = "text_processing/vietnamese_10k_words.txt")]
    corpus: PathBuf,

    /// Directory for the three JSON documents
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Corpus size quoted in the document descriptions
    #[arg(long, default_value_t = DEFAULT_TARGET_WORDS)]
    corpus_words: usize,
}

fn print_top(doc: &FrequencyDocument, k: usize, n: usize) {
    println!("\nTop {} {}s:", n, order_label(k));
    for (ngram, record) in doc.top_items(n) {
        println!(
            "  '{}': {}% ({} occurrences)",
            ngram, record.frequency, record.count
        );
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = ExtractorConfig {
        corpus_path: args.corpus,
        corpus_words: args.corpus_words,
        ..ExtractorConfig::default()
    };
    if let Some(dir) = &args.out_dir {
        config = config.with_output_dir(dir);
    }

    println!("=== Vietnamese N-gram Frequency Analysis ===");
    println!("Corpus: {}", config.corpus_path.display());

    let docs = extract_frequencies(&config)
        .with_context(|| format!("analyzing {}", config.corpus_path.display()))?;

    println!("\n{}", "=".repeat(50));
    println!("ANALYSIS SUMMARY");
    println!("{}", "=".repeat(50));
    for ((k, doc), n) in (1..).zip(&docs).zip([20, 15, 10]) {
        print_top(doc, k, n);
    }

    println!("\nFiles generated:");
    let paths = [&config.unigram_path, &config.bigram_path, &config.trigram_path];
    for (doc, path) in docs.iter().zip(paths) {
        println!("  - {} ({} items)", path.display(), doc.total_items);
    }

    Ok(())
}
