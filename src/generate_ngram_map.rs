//! Compile a bigram/trigram frequency document into a static transition map
//!
//! Usage: cargo run --release --bin generate_ngram_map -- <bigram|trigram> <input.json> <output> <exportName> [--format typescript|rust|json]
//!
//! Examples:
//!   generate_ngram_map bigram text_processing/vietnamese_bigram_frequencies.json generated/vietnameseTransitions.ts vietnameseTransitions
//!   generate_ngram_map trigram text_processing/vietnamese_trigram_frequencies.json generated/vietnameseTrigrams.ts vietnameseTrigrams

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use vi_charmodel::transition::{generate_transition_file, NgramKind};
use vi_charmodel::{OutputFormat, TableConfig};

#[derive(Parser, Debug)]
#[command(about = "Generate a next-character probability map from n-gram frequencies")]
struct Args {
    #[arg(value_enum)]
    ngram_type: NgramKind,
    input_file: PathBuf,
    output_file: PathBuf,
    export_name: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::TypeScript)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = TableConfig::new(args.input_file, args.output_file, args.export_name)
        .with_format(args.format);

    match generate_transition_file(&config, Some(args.ngram_type)) {
        Ok(table) => {
            println!(
                "Generated {:?} map with {} prefixes, {} candidates",
                table.kind,
                table.len(),
                table.candidate_count()
            );
            println!("File: {}", config.output_path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
