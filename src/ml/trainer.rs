// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Epoch loop over a Burn DataLoader with a fresh Adam optimiser.
//
// Per batch (model on Autodiff<_>, normalisation in Mode::Train):
//   forward → BCE loss → backward → GradientsParams → optim.step
// Gradients are rebuilt from the loss every batch, so nothing
// has to be zeroed between steps.
//
// After the last batch of an epoch:
//   model.valid()  → same weights on the inner backend
//   aggregate pass over the training batches (batch.inner())
//   aggregate pass over the validation loader, if any
//
// Any error from the data source or the evaluation aborts the
// whole run; there is no early stopping and no checkpointing.

use anyhow::Result;
use burn::{
    data::dataloader::DataLoader,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::sync::Arc;

use crate::data::{
    batcher::{build_loader, SequenceBatch},
    dataset::SequenceDataset,
};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::{
    evaluator::aggregate_pass,
    model::{Mode, SequenceCnn},
};

#[derive(Config, Debug)]
pub struct TrainConfig {
    pub epochs: usize,

    #[config(default = 32)]
    pub batch_size: usize,

    #[config(default = 1e-3)]
    pub learning_rate: f64,

    /// Seed of the training-batch shuffle
    #[config(default = 42)]
    pub seed: u64,

    #[config(default = true)]
    pub shuffle: bool,
}

impl TrainConfig {
    /// Loader over the training set, shuffled when `shuffle` is set.
    pub fn train_loader<B: Backend>(
        &self,
        dataset: SequenceDataset,
        device:  &B::Device,
    ) -> Arc<dyn DataLoader<B, SequenceBatch<B>>> {
        build_loader(dataset, self.batch_size, self.shuffle.then_some(self.seed), device)
    }

    /// Loader for evaluation passes: same batch size, file order.
    pub fn eval_loader<B: Backend>(
        &self,
        dataset: SequenceDataset,
        device:  &B::Device,
    ) -> Arc<dyn DataLoader<B, SequenceBatch<B>>> {
        build_loader(dataset, self.batch_size, None, device)
    }
}

/// Train `model` for `cfg.epochs` epochs and return it together
/// with one EpochMetrics per epoch.
pub fn train<B: AutodiffBackend>(
    mut model:    SequenceCnn<B>,
    train_loader: &dyn DataLoader<B, SequenceBatch<B>>,
    val_loader:   Option<&dyn DataLoader<B::InnerBackend, SequenceBatch<B::InnerBackend>>>,
    cfg:          &TrainConfig,
    logger:       Option<&MetricsLogger>,
) -> Result<(SequenceCnn<B>, Vec<EpochMetrics>)> {
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let mut optim = AdamConfig::new().init();
    let mut history = Vec::with_capacity(cfg.epochs);

    tracing::info!(
        "Training for {} epochs on {} samples (lr={})",
        cfg.epochs, train_loader.num_items(), cfg.learning_rate
    );

    for epoch in 0..cfg.epochs {
        println!("Epoch {epoch}\n-------------------------------");

        // ── Optimisation phase ────────────────────────────────────────────────
        let mut steps = 0usize;
        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.tokens, batch.labels, Mode::Train)?;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(cfg.learning_rate, model, grads);
            steps += 1;
        }
        tracing::debug!("Epoch {}: {} optimizer steps", epoch, steps);

        // ── Evaluation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();

        let (train_loss, train_acc) =
            aggregate_pass(&model_valid, train_loader.iter().map(SequenceBatch::inner))?;
        let mut metrics = EpochMetrics::new(epoch, train_loss, train_acc);

        if let Some(loader) = val_loader {
            let (val_loss, val_acc) = aggregate_pass(&model_valid, loader.iter())?;
            metrics = metrics.with_validation(val_loss, val_acc);
        }
        println!("{}\n", epoch_summary(&metrics));

        tracing::info!(
            "Epoch {}: train_loss={:.6}, train_acc={:.4}, val_loss={:?}, val_acc={:?}",
            epoch, metrics.train_loss, metrics.train_acc, metrics.val_loss, metrics.val_acc
        );

        if let Some(logger) = logger {
            logger.log(&metrics)?;
        }
        history.push(metrics);
    }

    tracing::info!("Training complete!");
    Ok((model, history))
}

/// Console line of one epoch; validation figures are appended to
/// the training ones when present.
fn epoch_summary(m: &EpochMetrics) -> String {
    let mut line = format!(
        "Train metrics: \n Accuracy: {:.1}%, Avg loss: {:.6}",
        100.0 * m.train_acc, m.train_loss
    );
    if let (Some(val_loss), Some(val_acc)) = (m.val_loss, m.val_acc) {
        line.push_str(&format!(
            ", Val accuracy: {:.1}%, Val avg loss: {:.6}",
            100.0 * val_acc, val_loss
        ));
    }
    line
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::SequenceSample;
    use crate::ml::model::SequenceCnnConfig;
    use burn::backend::{Autodiff, NdArray};

    type InnerBackend = NdArray<f32>;
    type TestBackend  = Autodiff<InnerBackend>;

    const LEN: usize = 64;

    fn samples(n: usize) -> Vec<SequenceSample> {
        (0..n)
            .map(|i| {
                let tokens = (0..LEN).map(|j| ((i * 3 + j * (i + 1)) % 6) as u32).collect();
                SequenceSample::new(tokens, (i % 2) as u8)
            })
            .collect()
    }

    fn model() -> SequenceCnn<TestBackend> {
        SequenceCnnConfig::new(2, 6, 4, LEN)
            .init::<TestBackend>(&Default::default())
            .unwrap()
    }

    #[test]
    fn test_zero_epochs_leaves_parameters_unchanged() {
        let device = Default::default();
        let model  = model();
        let before = model.parameter_snapshot().unwrap();

        let cfg    = TrainConfig::new(0).with_batch_size(4);
        let loader = cfg.train_loader::<TestBackend>(SequenceDataset::new(samples(4)), &device);

        let (model, history) = train(model, loader.as_ref(), None, &cfg, None).unwrap();
        assert!(history.is_empty());
        assert_eq!(model.parameter_snapshot().unwrap(), before);
    }

    #[test]
    fn test_one_epoch_changes_every_parameter() {
        let device = Default::default();
        let model  = model();
        let before = model.parameter_snapshot().unwrap();

        // a single batch → exactly one optimizer step
        let cfg    = TrainConfig::new(1).with_batch_size(4);
        let loader = cfg.train_loader::<TestBackend>(SequenceDataset::new(samples(4)), &device);

        let (model, history) = train(model, loader.as_ref(), None, &cfg, None).unwrap();
        assert_eq!(history.len(), 1);

        let after = model.parameter_snapshot().unwrap();
        assert_eq!(after.len(), before.len());
        for ((name, old), (_, new)) in before.iter().zip(after) {
            assert_ne!(old, &new, "{name} did not change");
        }
    }

    #[test]
    fn test_reports_validation_and_logs_every_epoch() {
        let device = Default::default();
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();

        let cfg = TrainConfig::new(2).with_batch_size(3);
        let train_loader = cfg.train_loader::<TestBackend>(SequenceDataset::new(samples(6)), &device);
        let val_loader   = cfg.eval_loader::<InnerBackend>(SequenceDataset::new(samples(4)), &device);

        let (_, history) = train(
            model(),
            train_loader.as_ref(),
            Some(val_loader.as_ref()),
            &cfg,
            Some(&logger),
        )
        .unwrap();

        assert_eq!(history.len(), 2);
        for (epoch, m) in history.iter().enumerate() {
            assert_eq!(m.epoch, epoch);
            assert!(m.train_loss.is_finite());
            assert!((0.0..=1.0).contains(&m.train_acc));
            assert!(m.val_acc.is_some_and(|acc| (0.0..=1.0).contains(&acc)));
        }

        let csv = std::fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_epoch_summary_puts_validation_on_the_train_line() {
        let train_only = EpochMetrics::new(0, 0.5, 0.75);
        assert_eq!(
            epoch_summary(&train_only),
            "Train metrics: \n Accuracy: 75.0%, Avg loss: 0.500000"
        );

        let with_val = train_only.with_validation(0.625, 0.5);
        assert_eq!(
            epoch_summary(&with_val),
            "Train metrics: \n Accuracy: 75.0%, Avg loss: 0.500000, \
             Val accuracy: 50.0%, Val avg loss: 0.625000"
        );
    }

    #[test]
    fn test_empty_training_set_is_an_error() {
        let device = Default::default();
        let cfg    = TrainConfig::new(1).with_batch_size(4);
        let loader = cfg.train_loader::<TestBackend>(SequenceDataset::new(Vec::new()), &device);

        assert!(train(model(), loader.as_ref(), None, &cfg, None).is_err());
    }
}
