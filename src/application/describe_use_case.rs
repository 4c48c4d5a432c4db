// ============================================================
// Layer 2 — DescribeUseCase
// ============================================================
// Builds the model for a given configuration without training
// it and reports what the shape-inference pass measured and how
// many values each parameter tensor holds.

use anyhow::Result;
use burn::module::Module;

use crate::data::encoder::SequenceEncoder;
use crate::ml::{
    backend::{default_device, ComputeBackend},
    model::SequenceCnnConfig,
};

#[derive(Debug, Clone)]
pub struct DescribeConfig {
    pub number_of_classes: usize,
    /// None → size of the DNA vocabulary (<pad> + A C G T N)
    pub vocab_size:        Option<usize>,
    pub embedding_dim:     usize,
    pub input_len:         usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub input_len:       usize,
    pub vocab_size:      usize,
    pub flattened_width: usize,
    /// (name, element count) per learnable tensor
    pub parameters:      Vec<(String, usize)>,
    /// Includes the normalisation running statistics
    pub total_params:    usize,
}

pub struct DescribeUseCase {
    config: DescribeConfig,
}

impl DescribeUseCase {
    pub fn new(config: DescribeConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<ModelSummary> {
        let cfg = &self.config;
        let vocab_size = cfg
            .vocab_size
            .unwrap_or_else(|| SequenceEncoder::dna(cfg.input_len).vocab_size());

        let model = SequenceCnnConfig::new(
            cfg.number_of_classes, vocab_size, cfg.embedding_dim, cfg.input_len,
        )
        .init::<ComputeBackend>(&default_device())?;

        let parameters = model
            .parameter_snapshot()?
            .into_iter()
            .map(|(name, values)| (name, values.len()))
            .collect();

        Ok(ModelSummary {
            input_len:       model.input_len(),
            vocab_size,
            flattened_width: model.flattened_width(),
            parameters,
            total_params:    model.num_params(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(number_of_classes: usize) -> DescribeConfig {
        DescribeConfig { number_of_classes, vocab_size: None, embedding_dim: 8, input_len: 100 }
    }

    #[test]
    fn test_summary_of_default_vocabulary() {
        let summary = DescribeUseCase::new(config(2)).execute().unwrap();

        assert_eq!(summary.vocab_size, 6);
        // 100 → 46 → 19 → 6 positions × 4 channels
        assert_eq!(summary.flattened_width, 24);
        assert_eq!(summary.parameters[0], ("embedding.weight".to_string(), 6 * 8));
        assert!(summary.parameters.contains(&("hidden.weight".to_string(), 24 * 512)));
    }

    #[test]
    fn test_multiclass_is_rejected() {
        let err = DescribeUseCase::new(config(3)).execute().unwrap_err();
        assert!(err.to_string().contains("unsupported configuration"));
    }
}
