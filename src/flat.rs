use crate::config::TableConfig;
use crate::error::Result;
use crate::io::write_atomic;
use crate::ngram::FrequencyDocument;
use log::{info, warn};

/// `character -> frequency` sorted descending, ties in document order.
/// Values are the document's percentages, unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatFrequencyTable {
    pub entries: Vec<(String, f64)>,
}

impl FlatFrequencyTable {
    pub fn from_document(doc: &FrequencyDocument) -> Self {
        if let Some(len) = doc.ngram_len().filter(|&l| l != 1) {
            warn!("flat table built from {len}-grams, expected single characters");
        }
        let mut entries: Vec<(String, f64)> = doc
            .data
            .iter()
            .map(|(k, r)| (k.to_string(), r.frequency))
            .collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1));
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Loads the unigram document and writes its flat rendering.
pub fn generate_frequency_file(config: &TableConfig) -> Result<FlatFrequencyTable> {
    config.validate()?;
    let doc = FrequencyDocument::load(&config.input_path)?;
    let table = FlatFrequencyTable::from_document(&doc);

    let rendered = config
        .format
        .renderer()
        .render_frequencies(&table, &config.export_name)?;
    write_atomic(&config.output_path, rendered.as_bytes())?;
    info!(
        "generated character frequency map with {} characters into {}",
        table.len(),
        config.output_path.display()
    );
    Ok(table)
}
