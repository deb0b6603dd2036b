//! Compile the character frequency document into a static lookup map
//!
//! Usage: cargo run --release --bin generate_char_freq_map -- [input.json] [output] [exportName] [--format typescript|rust|json]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use vi_charmodel::{generate_frequency_file, OutputFormat, TableConfig};

#[derive(Parser, Debug)]
#[command(about = "Generate a descending character frequency map")]
struct Args {
    #[arg(default_value = "text_processing/vietnamese_character_frequencies.json")]
    input_file: PathBuf,

    #[arg(default_value = "generated/vietnameseCharacterFrequencies.ts")]
    output_file: PathBuf,

    #[arg(default_value = "vietnameseCharacterFrequencies")]
    export_name: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::TypeScript)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = TableConfig::new(args.input_file, args.output_file, args.export_name)
        .with_format(args.format);
    let table = generate_frequency_file(&config)
        .with_context(|| format!("building map from {}", config.input_path.display()))?;

    println!(
        "Generated character frequency map with {} characters",
        table.len()
    );
    println!("File: {}", config.output_path.display());

    println!("\nTop 10 most frequent characters:");
    for (ch, freq) in table.entries.iter().take(10) {
        println!("  '{ch}': {freq}%");
    }
    Ok(())
}
