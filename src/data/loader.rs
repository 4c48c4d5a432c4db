// ============================================================
// Layer 4 — TSV Sample Loader
// ============================================================
// Reads labelled sequences from a tab-separated text file:
//
//   sequence<TAB>label
//   ACGTTGCA...<TAB>1
//   TTGACCAT...<TAB>0
//
// Blank lines are skipped. The first non-blank line is treated
// as a header when its label column is not a number. Labels
// must be 0 or 1; anything else aborts the load with the line
// number in the error.
//
// Each sequence is run through the SequenceEncoder, so every
// returned sample has exactly input_len token ids.

use anyhow::{bail, Context, Result};
use std::{fs, path::PathBuf};

use crate::data::encoder::SequenceEncoder;
use crate::domain::sample::SequenceSample;
use crate::domain::traits::SampleSource;

/// Loads samples from one TSV file.
/// Implements the SampleSource trait from Layer 3.
pub struct TsvLoader {
    path:    PathBuf,
    encoder: SequenceEncoder,
}

impl TsvLoader {
    pub fn new(path: impl Into<PathBuf>, encoder: SequenceEncoder) -> Self {
        Self { path: path.into(), encoder }
    }

    /// Parse TSV text that has already been read into memory.
    pub fn parse(&self, text: &str) -> Result<Vec<SequenceSample>> {
        let mut samples = Vec::new();
        let mut seen_row = false;

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let line    = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let Some((sequence, label)) = line.split_once('\t') else {
                bail!("line {line_no}: expected `sequence<TAB>label`");
            };

            let label = match label.trim().parse::<u8>() {
                Ok(label @ (0 | 1)) => label,
                Ok(other) => bail!("line {line_no}: label must be 0 or 1, got {other}"),
                // header row
                Err(_) if !seen_row => {
                    seen_row = true;
                    tracing::debug!("Skipping header line {}", line_no);
                    continue;
                }
                Err(_) => bail!("line {line_no}: label '{}' is not a number", label.trim()),
            };
            seen_row = true;

            samples.push(SequenceSample::new(self.encoder.encode(sequence), label));
        }

        Ok(samples)
    }
}

impl SampleSource for TsvLoader {
    fn load_all(&self) -> Result<Vec<SequenceSample>> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read '{}'", self.path.display()))?;

        let samples = self
            .parse(&text)
            .with_context(|| format!("Malformed sample file '{}'", self.path.display()))?;

        let positives = samples.iter().filter(|s| s.label == 1).count();
        tracing::info!(
            "Loaded {} samples from '{}' ({} labelled 1, {} labelled 0)",
            samples.len(),
            self.path.display(),
            positives,
            samples.len() - positives,
        );
        Ok(samples)
    }
}
