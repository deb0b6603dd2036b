//! Full pipeline: wordlist -> corpus -> frequency documents -> static maps
//!
//! Usage: cargo run --release -- [--config pipeline.toml] [--seed S] [--print-config]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use vi_charmodel::transition::generate_transition_file;
use vi_charmodel::{
    extract_frequencies, generate_corpus, generate_frequency_file, NgramKind, PipelineConfig,
};

#[derive(Parser, Debug)]
#[command(name = "vi-charmodel")]
#[command(about = "Build Vietnamese character transition tables from a weighted wordlist")]
struct Args {
    /// TOML configuration; defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the sampler seed from the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::load_toml(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if args.seed.is_some() {
        config.sampler.seed = args.seed;
    }
    config.validate()?;

    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    println!("=== Vietnamese Character Model Pipeline ===");

    println!("\n[1/4] Sampling corpus...");
    let summary = generate_corpus(&config.sampler).context("corpus generation")?;
    println!(
        "  {} words from {} valid entries -> {}",
        summary.words,
        summary.vocabulary,
        config.sampler.corpus_path.display()
    );

    println!("\n[2/4] Counting n-grams...");
    let docs = extract_frequencies(&config.extractor).context("frequency analysis")?;
    for doc in &docs {
        println!("  {}: {} items", doc.description, doc.total_items);
    }

    println!("\n[3/4] Building transition maps...");
    for (table_config, kind) in [
        (&config.bigram_table, NgramKind::Bigram),
        (&config.trigram_table, NgramKind::Trigram),
    ] {
        let table = generate_transition_file(table_config, Some(kind))
            .with_context(|| format!("building {}", table_config.output_path.display()))?;
        println!(
            "  {} -> {} prefixes",
            table_config.output_path.display(),
            table.len()
        );
    }

    println!("\n[4/4] Building character frequency map...");
    let table = generate_frequency_file(&config.char_table).context("character map")?;
    println!(
        "  {} -> {} characters",
        config.char_table.output_path.display(),
        table.len()
    );

    println!("\n✓ Done");
    Ok(())
}
