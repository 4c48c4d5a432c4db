// ============================================================
// genomic_cnn — convolutional binary sequence classifier
// ============================================================
// Layers, outermost first:
//
//   cli          — clap parsing and dispatch
//   application  — train / describe use cases
//   domain       — samples, sample sources, metrics counters
//   data         — TSV loading, encoding, Burn Dataset / Batcher
//   ml           — Burn model, trainer, evaluator, backend choice
//   infra        — run directory, metrics CSV
//   error        — ModelError

#![recursion_limit = "256"]

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod ml;
pub mod infra;
pub mod error;

pub use error::{ModelError, Result};
