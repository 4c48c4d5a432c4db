// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits that describe what the system
// works with. Nothing in here touches Burn, the file system,
// or tensors, so everything is testable on plain slices.
//
//   sample.rs  — one encoded sequence with its binary label
//   traits.rs  — the SampleSource abstraction
//   metrics.rs — loss / accuracy / precision / recall / F1
//                accumulation over an evaluation pass

/// An encoded token sequence and its label
pub mod sample;

/// Core abstractions that the data layer implements
pub mod traits;

/// Evaluation counters and the derived test report
pub mod metrics;
