// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The training pipeline only needs "something that yields
// labelled samples". The TSV loader is the one implementation
// shipped here.

use anyhow::Result;
use crate::domain::sample::SequenceSample;

// ─── SampleSource ─────────────────────────────────────────────────────────────
/// Any component that can produce labelled, encoded samples.
///
/// Implementations:
///   - TsvLoader → `sequence<TAB>label` text files
pub trait SampleSource {
    /// Load every available sample from this source.
    fn load_all(&self) -> Result<Vec<SequenceSample>>;
}
