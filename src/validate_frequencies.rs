//! Frequency document and transition table validation
//!
//! Usage: cargo run --release --bin validate_frequencies -- <doc.json>... [--transitions table.json]...

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use vi_charmodel::io::read_text;
use vi_charmodel::render::parse_json_transitions;
use vi_charmodel::{FrequencyDocument, TransitionTable};

#[derive(Parser, Debug)]
#[command(about = "Check the numeric invariants of generated artifacts")]
struct Args {
    /// Frequency documents written by analyze_frequencies
    documents: Vec<PathBuf>,

    /// Transition tables rendered with `--format json`
    #[arg(long)]
    transitions: Vec<PathBuf>,
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "✓"
    } else {
        "✗"
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    if args.documents.is_empty() && args.transitions.is_empty() {
        eprintln!("Nothing to validate: pass frequency documents and/or --transitions");
        std::process::exit(2);
    }

    let mut failed = 0usize;

    if !args.documents.is_empty() {
        println!("── Frequency documents ──");
    }
    for path in &args.documents {
        let doc = FrequencyDocument::load(path)
            .with_context(|| format!("loading {}", path.display()))?;
        let sum: f64 = doc.data.iter().map(|(_, r)| r.frequency).sum();
        let result = doc.check_invariants();
        println!(
            "  {} items={} sum={:.4} {}",
            path.display(),
            doc.total_items,
            sum,
            mark(result.is_ok())
        );
        if let Err(e) = result {
            println!("    {e}");
            failed += 1;
        }
    }

    if !args.transitions.is_empty() {
        println!("── Transition tables ──");
    }
    for path in &args.transitions {
        let text = read_text(path)?;
        let (name, table): (String, TransitionTable) = parse_json_transitions(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        let result = table.check_invariants();
        println!(
            "  {} ({name}, {:?}) prefixes={} candidates={} {}",
            path.display(),
            table.kind,
            table.len(),
            table.candidate_count(),
            mark(result.is_ok())
        );
        if let Err(e) = result {
            println!("    {e}");
            failed += 1;
        }
    }

    if failed > 0 {
        anyhow::bail!("validation failed for {failed} artifact(s)");
    }
    println!("\nAll checks passed.");
    Ok(())
}
