//! Textual forms of the generated tables.
//!
//! The tables themselves know nothing about output syntax; a renderer turns a
//! table plus an export name into source text for the consuming project.

use crate::error::{PipelineError, Result};
use crate::io::pretty_json;
use crate::flat::FlatFrequencyTable;
use crate::transition::{Candidate, NgramKind, TransitionTable};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

pub trait TableRenderer {
    fn render_transitions(&self, table: &TransitionTable, export_name: &str) -> Result<String>;
    fn render_frequencies(
        &self,
        table: &FlatFrequencyTable,
        export_name: &str,
    ) -> Result<String>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `export const NAME = new Map(...)`
    #[default]
    #[value(name = "typescript", alias = "ts")]
    TypeScript,
    /// `pub static NAME: &[...]`
    Rust,
    Json,
}

impl OutputFormat {
    pub fn renderer(self) -> Box<dyn TableRenderer> {
        match self {
            OutputFormat::TypeScript => Box::new(TypeScriptRenderer),
            OutputFormat::Rust => Box::new(RustRenderer),
            OutputFormat::Json => Box::new(JsonRenderer),
        }
    }
}

fn quote_js(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

pub struct TypeScriptRenderer;

impl TableRenderer for TypeScriptRenderer {
    fn render_transitions(&self, table: &TransitionTable, export_name: &str) -> Result<String> {
        let mut out = String::new();
        out.push_str("/**\n");
        match table.kind {
            NgramKind::Bigram => {
                let _ = writeln!(
                    out,
                    " * Vietnamese character transition probabilities ({export_name})"
                );
                out.push_str(" * Map<firstChar, Map<secondChar, probability>>\n");
            }
            NgramKind::Trigram => {
                let _ = writeln!(
                    out,
                    " * Vietnamese trigram transition probabilities ({export_name})"
                );
                out.push_str(" * Map<prefix, Map<nextChar, probability>>\n");
                out.push_str(
                    " * prefix is a 2-character string, nextChar is the following character\n",
                );
            }
        }
        out.push_str(" */\n\n");
        let _ = writeln!(
            out,
            "export const {export_name} = new Map<string, Map<string, number>>(["
        );

        for (i, (prefix, candidates)) in table.entries.iter().enumerate() {
            let _ = writeln!(out, "  [{}, new Map<string, number>([", quote_js(prefix));
            for (j, c) in candidates.iter().enumerate() {
                let comma = if j + 1 < candidates.len() { "," } else { "" };
                let _ = writeln!(
                    out,
                    "    [{}, {}]{comma}",
                    quote_js(c.next.encode_utf8(&mut [0; 4])),
                    c.probability
                );
            }
            let comma = if i + 1 < table.entries.len() { "," } else { "" };
            let _ = writeln!(out, "  ])]{comma}");
        }
        out.push_str("]);\n");
        Ok(out)
    }

    fn render_frequencies(
        &self,
        table: &FlatFrequencyTable,
        export_name: &str,
    ) -> Result<String> {
        let mut out = String::new();
        out.push_str("/**\n");
        out.push_str(" * Vietnamese single character frequencies\n");
        out.push_str(" * Map<character, frequency> where frequency is percentage (0-100)\n");
        out.push_str(" */\n\n");
        let _ = writeln!(out, "export const {export_name} = new Map<string, number>([");
        for (i, (ch, freq)) in table.entries.iter().enumerate() {
            let comma = if i + 1 < table.entries.len() { "," } else { "" };
            let _ = writeln!(out, "  [{}, {freq}]{comma}", quote_js(ch));
        }
        out.push_str("]);\n");
        Ok(out)
    }
}

/// Static slices, for embedding straight into a Rust crate.
pub struct RustRenderer;

impl TableRenderer for RustRenderer {
    fn render_transitions(&self, table: &TransitionTable, export_name: &str) -> Result<String> {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "/// Vietnamese character {} transition probabilities.",
            match table.kind {
                NgramKind::Bigram => "bigram",
                NgramKind::Trigram => "trigram",
            }
        );
        out.push_str("/// `(prefix, [(next char, probability)])`, most likely first.\n");
        out.push_str("#[allow(non_upper_case_globals)]\n");
        let _ = writeln!(out, "pub static {export_name}: &[(&str, &[(char, f64)])] = &[");
        for (prefix, candidates) in &table.entries {
            let _ = write!(out, "    ({prefix:?}, &[");
            for (j, c) in candidates.iter().enumerate() {
                if j > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "({:?}, {:?})", c.next, c.probability);
            }
            out.push_str("]),\n");
        }
        out.push_str("];\n");
        Ok(out)
    }

    fn render_frequencies(
        &self,
        table: &FlatFrequencyTable,
        export_name: &str,
    ) -> Result<String> {
        let mut out = String::new();
        out.push_str("/// Vietnamese single character frequencies, percent of all characters.\n");
        out.push_str("#[allow(non_upper_case_globals)]\n");
        let _ = writeln!(out, "pub static {export_name}: &[(char, f64)] = &[");
        for (key, freq) in &table.entries {
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                return Err(PipelineError::InvariantViolation(format!(
                    "{key:?} is not a single character"
                )));
            };
            let _ = writeln!(out, "    ({ch:?}, {freq:?}),");
        }
        out.push_str("];\n");
        Ok(out)
    }
}

#[derive(Serialize, Deserialize)]
struct JsonTransitions {
    name: String,
    kind: NgramKind,
    transitions: Vec<(String, Vec<(char, f64)>)>,
}

#[derive(Serialize, Deserialize)]
struct JsonFrequencies {
    name: String,
    frequencies: Vec<(String, f64)>,
}

/// Ordered pair lists; JSON objects would lose the emission order.
pub struct JsonRenderer;

impl TableRenderer for JsonRenderer {
    fn render_transitions(&self, table: &TransitionTable, export_name: &str) -> Result<String> {
        let doc = JsonTransitions {
            name: export_name.to_string(),
            kind: table.kind,
            transitions: table
                .entries
                .iter()
                .map(|(p, cs)| (p.clone(), cs.iter().map(|c| (c.next, c.probability)).collect()))
                .collect(),
        };
        Ok(pretty_json(&doc)? + "\n")
    }

    fn render_frequencies(
        &self,
        table: &FlatFrequencyTable,
        export_name: &str,
    ) -> Result<String> {
        let doc = JsonFrequencies {
            name: export_name.to_string(),
            frequencies: table.entries.clone(),
        };
        Ok(pretty_json(&doc)? + "\n")
    }
}

/// Reads back a table written by [`JsonRenderer`].
pub fn parse_json_transitions(text: &str) -> Result<(String, TransitionTable)> {
    let doc: JsonTransitions =
        serde_json::from_str(text).map_err(|e| PipelineError::MalformedDocument {
            path: "<transition table>".into(),
            reason: e.to_string(),
        })?;
    let entries = doc
        .transitions
        .into_iter()
        .map(|(prefix, cs)| {
            let candidates = cs
                .into_iter()
                .map(|(next, probability)| Candidate { next, probability })
                .collect();
            (prefix, candidates)
        })
        .collect();
    Ok((
        doc.name,
        TransitionTable {
            kind: doc.kind,
            entries,
        },
    ))
}
