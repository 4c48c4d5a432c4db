// ============================================================
// Layer 4 — Sequence Batcher
// ============================================================
// Implements Burn's Batcher trait: a Vec<SequenceSample> becomes
// one SequenceBatch on the requested device.
//
//   tokens  [N, L] Int — every sample is already padded to L
//   labels  [N]    Int — 0 or 1; the model reshapes them to [N, 1]
//
// build_loader wires a batcher and a dataset into a DataLoader.
// Loaders run on the calling thread.

use std::sync::Arc;

use burn::{
    data::dataloader::{batcher::Batcher, DataLoader, DataLoaderBuilder},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::dataset::SequenceDataset;
use crate::domain::sample::SequenceSample;

// ─── SequenceBatch ────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct SequenceBatch<B: Backend> {
    /// Token ids — shape: [batch_size, input_len]
    pub tokens: Tensor<B, 2, Int>,

    /// Class labels — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

impl<B: Backend> SequenceBatch<B> {
    pub fn len(&self) -> usize {
        self.labels.dims()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<B: AutodiffBackend> SequenceBatch<B> {
    /// Same batch on the inner backend, detached from any graph.
    pub fn inner(self) -> SequenceBatch<B::InnerBackend> {
        SequenceBatch {
            tokens: self.tokens.inner(),
            labels: self.labels.inner(),
        }
    }
}

// ─── SequenceBatcher ──────────────────────────────────────────────────────────
#[derive(Clone, Debug, Default)]
pub struct SequenceBatcher;

impl<B: Backend> Batcher<B, SequenceSample, SequenceBatch<B>> for SequenceBatcher {
    fn batch(&self, items: Vec<SequenceSample>, device: &B::Device) -> SequenceBatch<B> {
        let batch_size = items.len();
        let input_len  = items.first().map_or(0, SequenceSample::len);

        // Burn Int tensors are built from i32 slices
        let tokens_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.tokens.iter().map(|&t| t as i32))
            .collect();
        let labels: Vec<i32> = items.iter().map(|s| s.label as i32).collect();

        let tokens = Tensor::<B, 1, Int>::from_ints(tokens_flat.as_slice(), device)
            .reshape([batch_size, input_len]);
        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), device);

        SequenceBatch { tokens, labels }
    }
}

/// DataLoader over `dataset`. Batches are shuffled with `shuffle_seed`
/// when one is given and kept in file order otherwise.
pub fn build_loader<B: Backend>(
    dataset:      SequenceDataset,
    batch_size:   usize,
    shuffle_seed: Option<u64>,
    device:       &B::Device,
) -> Arc<dyn DataLoader<B, SequenceBatch<B>>> {
    let builder = DataLoaderBuilder::new(SequenceBatcher)
        .batch_size(batch_size)
        .set_device(device.clone());

    let builder = match shuffle_seed {
        Some(seed) => builder.shuffle(seed),
        None       => builder,
    };

    builder.build(dataset)
}
