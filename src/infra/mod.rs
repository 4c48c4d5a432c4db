// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File output shared by the application layer:
//
//   run_store.rs — the run's output directory: effective
//                  configuration and final test report as JSON
//
//   metrics.rs   — per-epoch loss / accuracy appended to a CSV
//                  file for plotting learning curves

/// Output directory, run configuration and test report persistence
pub mod run_store;

/// Training metrics CSV logger
pub mod metrics;
