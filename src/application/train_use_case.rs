// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a full training run in order:
//
//   Step 1: Prepare the output directory   (Layer 6 - infra)
//   Step 2: Load and encode samples        (Layer 4 - data)
//   Step 3: Pick the validation set        (Layer 4 - data)
//   Step 4: Build the model                (Layer 5 - ml)
//   Step 5: Build data loaders             (Layer 4 - data)
//   Step 6: Run the training loop          (Layer 5 - ml)
//   Step 7: Test pass, if a test file set  (Layer 5 - ml)

use anyhow::{bail, Result};
use burn::module::{AutodiffModule, Module};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{
    dataset::SequenceDataset,
    encoder::SequenceEncoder,
    loader::TsvLoader,
    splitter::split_train_val,
};
use crate::domain::{
    metrics::{PositiveLabel, TestReport},
    sample::SequenceSample,
    traits::SampleSource,
};
use crate::infra::{
    metrics::{EpochMetrics, MetricsLogger},
    run_store::{read_json, RunStore},
};
use crate::ml::{
    backend::{default_device, ComputeBackend, TrainBackend},
    evaluator::test_report,
    model::SequenceCnnConfig,
    trainer::{train, TrainConfig},
};

/// Binary classification is the only supported head.
pub const NUMBER_OF_CLASSES: usize = 2;

// ─── Experiment Configuration ────────────────────────────────────────────────
// Everything needed to repeat a run. Written to
// <output_dir>/run_config.json before training starts and
// accepted back through `train --config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub train_file:     String,
    pub val_file:       Option<String>,
    /// Share of the training file held out for validation when no
    /// val_file is given; 0 disables validation
    pub val_fraction:   f64,
    pub test_file:      Option<String>,
    pub positive_label: u8,
    pub input_len:      usize,
    pub embedding_dim:  usize,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub seed:           u64,
    pub output_dir:     String,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            train_file:     "data/train.tsv".to_string(),
            val_file:       None,
            val_fraction:   0.0,
            test_file:      None,
            positive_label: 1,
            input_len:      200,
            embedding_dim:  32,
            batch_size:     32,
            epochs:         10,
            lr:             1e-3,
            seed:           42,
            output_dir:     "runs/latest".to_string(),
        }
    }
}

impl ExperimentConfig {
    /// Read a JSON configuration; missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let cfg: Self = read_json(path.as_ref())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be > 0");
        }
        if !(0.0..1.0).contains(&self.val_fraction) {
            bail!("val_fraction must be in [0, 1), got {}", self.val_fraction);
        }
        if self.positive_label > 1 {
            bail!("positive_label must be 0 or 1, got {}", self.positive_label);
        }
        Ok(())
    }

    pub fn model_config(&self, vocab_size: usize) -> SequenceCnnConfig {
        SequenceCnnConfig::new(NUMBER_OF_CLASSES, vocab_size, self.embedding_dim, self.input_len)
    }

    pub fn train_config(&self) -> TrainConfig {
        TrainConfig::new(self.epochs)
            .with_batch_size(self.batch_size)
            .with_learning_rate(self.lr)
            .with_seed(self.seed)
    }
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub history: Vec<EpochMetrics>,
    pub test:    Option<TestReport>,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: ExperimentConfig,
}

impl TrainUseCase {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<RunSummary> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Output directory + effective config ───────────────────────
        let store = RunStore::new(&cfg.output_dir)?;
        store.save_config(cfg)?;

        // ── Step 2: Load and encode ───────────────────────────────────────────
        let encoder = SequenceEncoder::dna(cfg.input_len);
        let samples = load(&cfg.train_file, &encoder)?;
        if samples.is_empty() {
            bail!("training file '{}' contains no samples", cfg.train_file);
        }

        // ── Step 3: Validation set ────────────────────────────────────────────
        let (train_samples, val_samples) = match &cfg.val_file {
            Some(path) => (samples, Some(load(path, &encoder)?)),
            None if cfg.val_fraction > 0.0 => {
                let (train, val) = split_train_val(samples, 1.0 - cfg.val_fraction, cfg.seed);
                (train, Some(val))
            }
            None => (samples, None),
        };
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.as_ref().map_or(0, Vec::len)
        );

        // ── Step 4: Model ─────────────────────────────────────────────────────
        let device = default_device();
        let model  = cfg
            .model_config(encoder.vocab_size())
            .init::<TrainBackend>(&device)?;
        tracing::info!(
            "Model ready: flattened width {}, {} parameters",
            model.flattened_width(),
            model.num_params()
        );

        // ── Step 5: Loaders ───────────────────────────────────────────────────
        let train_cfg     = cfg.train_config();
        let train_dataset = SequenceDataset::new(train_samples);
        tracing::info!(
            "Training set: {} labelled 1, {} labelled 0",
            train_dataset.count_label(1),
            train_dataset.count_label(0)
        );
        let train_loader = train_cfg.train_loader::<TrainBackend>(train_dataset, &device);
        let val_loader = val_samples
            .filter(|v| !v.is_empty())
            .map(|v| train_cfg.eval_loader::<ComputeBackend>(SequenceDataset::new(v), &device));

        // ── Step 6: Train ─────────────────────────────────────────────────────
        let logger = MetricsLogger::new(store.dir())?;
        let (model, history) = train(
            model,
            train_loader.as_ref(),
            val_loader.as_deref(),
            &train_cfg,
            Some(&logger),
        )?;

        // ── Step 7: Test ──────────────────────────────────────────────────────
        let test = match &cfg.test_file {
            Some(path) => {
                let dataset = SequenceDataset::new(load(path, &encoder)?);
                let loader  = train_cfg.eval_loader::<ComputeBackend>(dataset, &device);
                let report  = test_report(
                    &model.valid(),
                    loader.iter(),
                    PositiveLabel::from(cfg.positive_label),
                )?;
                store.save_report(&report)?;
                Some(report)
            }
            None => None,
        };

        Ok(RunSummary { history, test })
    }
}

fn load(path: &str, encoder: &SequenceEncoder) -> Result<Vec<SequenceSample>> {
    TsvLoader::new(path, encoder.clone()).load_all()
}
