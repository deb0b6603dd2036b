//! Explicit per-stage configuration.
//!
//! Each stage takes its own paths and knobs; the pipeline runner assembles
//! them from one TOML file. Missing keys fall back to the defaults below.

use crate::error::{PipelineError, Result};
use crate::render::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_TARGET_WORDS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub wordlist_path: PathBuf,
    pub corpus_path: PathBuf,
    pub target_words: usize,
    /// Fixed seed for a reproducible corpus. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            wordlist_path: PathBuf::from("text_processing/vietnamese_sample.txt"),
            corpus_path: PathBuf::from("text_processing/vietnamese_10k_words.txt"),
            target_words: DEFAULT_TARGET_WORDS,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub corpus_path: PathBuf,
    pub unigram_path: PathBuf,
    pub bigram_path: PathBuf,
    pub trigram_path: PathBuf,
    /// Corpus size mentioned in the document descriptions.
    pub corpus_words: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("text_processing/vietnamese_10k_words.txt"),
            unigram_path: PathBuf::from("text_processing/vietnamese_character_frequencies.json"),
            bigram_path: PathBuf::from("text_processing/vietnamese_bigram_frequencies.json"),
            trigram_path: PathBuf::from("text_processing/vietnamese_trigram_frequencies.json"),
            corpus_words: DEFAULT_TARGET_WORDS,
        }
    }
}

impl ExtractorConfig {
    /// Places the three documents under `dir` with their conventional names.
    pub fn with_output_dir(mut self, dir: &Path) -> Self {
        for path in [
            &mut self.unigram_path,
            &mut self.bigram_path,
            &mut self.trigram_path,
        ] {
            if let Some(name) = path.file_name().map(|n| n.to_owned()) {
                *path = dir.join(name);
            }
        }
        self
    }
}

/// Input document, output file and export name of one generated table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TableConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub export_name: String,
    #[serde(default)]
    pub format: OutputFormat,
}

impl TableConfig {
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        export_name: impl Into<String>,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            export_name: export_name.into(),
            format: OutputFormat::default(),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.export_name) {
            return Err(PipelineError::Config(format!(
                "export name {:?} is not a valid identifier",
                self.export_name
            )));
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub sampler: SamplerConfig,
    pub extractor: ExtractorConfig,
    pub bigram_table: TableConfig,
    pub trigram_table: TableConfig,
    pub char_table: TableConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let extractor = ExtractorConfig::default();
        Self {
            bigram_table: TableConfig::new(
                &extractor.bigram_path,
                "generated/vietnameseTransitions.ts",
                "vietnameseTransitions",
            ),
            trigram_table: TableConfig::new(
                &extractor.trigram_path,
                "generated/vietnameseTrigrams.ts",
                "vietnameseTrigrams",
            ),
            char_table: TableConfig::new(
                &extractor.unigram_path,
                "generated/vietnameseCharacterFrequencies.ts",
                "vietnameseCharacterFrequencies",
            ),
            sampler: SamplerConfig::default(),
            extractor,
        }
    }
}

impl PipelineConfig {
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::from_open(path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| PipelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Stages are chained through files, so each consumer must read what its
    /// producer writes.
    pub fn validate(&self) -> Result<()> {
        for table in [&self.bigram_table, &self.trigram_table, &self.char_table] {
            table.validate()?;
        }
        if self.sampler.corpus_path != self.extractor.corpus_path {
            return Err(PipelineError::Config(format!(
                "extractor reads {} but sampler writes {}",
                self.extractor.corpus_path.display(),
                self.sampler.corpus_path.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_consistent() {
        let config = PipelineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.sampler.target_words, 10_000);
        assert_eq!(config.bigram_table.input_path, config.extractor.bigram_path);
        assert_eq!(config.char_table.export_name, "vietnameseCharacterFrequencies");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [sampler]
            target_words = 500
            seed = 9
            "#,
        )
        .unwrap();
        assert_eq!(config.sampler.target_words, 500);
        assert_eq!(config.sampler.seed, Some(9));
        assert_eq!(config.extractor, ExtractorConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PipelineConfig::default();
        let text = config.to_toml_string().unwrap();
        let back = PipelineConfig::from_toml_str(&text).unwrap();
        assert_eq!(back.trigram_table.export_name, "vietnameseTrigrams");
        assert_eq!(back.sampler.corpus_path, config.sampler.corpus_path);
    }

    #[test]
    fn test_mismatched_corpus_path_is_rejected() {
        let err = PipelineConfig::from_toml_str(
            r#"
            [extractor]
            corpus_path = "elsewhere.txt"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_export_name_must_be_identifier() {
        assert!(TableConfig::new("a", "b", "vietnameseTrigrams").validate().is_ok());
        assert!(TableConfig::new("a", "b", "_x1").validate().is_ok());
        assert!(TableConfig::new("a", "b", "1abc").validate().is_err());
        assert!(TableConfig::new("a", "b", "my-table").validate().is_err());
        assert!(TableConfig::new("a", "b", "").validate().is_err());
    }

    #[test]
    fn test_output_dir_keeps_file_names() {
        let config = ExtractorConfig::default().with_output_dir(Path::new("out"));
        assert_eq!(config.bigram_path, PathBuf::from("out/vietnamese_bigram_frequencies.json"));
        assert_eq!(config.corpus_path, ExtractorConfig::default().corpus_path);
    }
}
