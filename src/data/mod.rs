// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// From a labelled text file to tensor batches:
//
//   sequence<TAB>label file
//       │
//       ▼
//   TsvLoader         → parses rows, validates labels
//       │
//       ▼
//   SequenceEncoder   → characters to fixed-length token ids
//       │
//       ▼
//   split_train_val   → optional seeded validation split
//       │
//       ▼
//   SequenceDataset   → implements Burn's Dataset trait
//       │
//       ▼
//   SequenceBatcher   → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the trainer / evaluator

/// Reads `sequence<TAB>label` files
pub mod loader;

/// Character → token id mapping with padding/truncation
pub mod encoder;

/// Implements Burn's Dataset trait for labelled sequences
pub mod dataset;

/// Implements Burn's Batcher trait and builds DataLoaders
pub mod batcher;

/// Seeded train/validation split
pub mod splitter;
