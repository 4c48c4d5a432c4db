// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn-specific computation lives here. The domain layer
// only ever sees plain f32 slices and counters.
//
//   model.rs     — embedding → 3 × (conv, norm, relu, pool)
//                  → flatten → 512 → 1 → sigmoid, with the
//                  flattened width measured by a dummy pass
//
//   trainer.rs   — epoch loop: Adam steps in Mode::Train, then
//                  loss / accuracy over train and validation sets
//
//   evaluator.rs — the shared no-gradient pass, plus the test
//                  pass with precision / recall / F1
//
//   backend.rs   — compile-time backend choice (NdArray or Wgpu)

/// Sequence CNN architecture and explicit normalisation mode
pub mod model;

/// Training loop
pub mod trainer;

/// Evaluation and test passes
pub mod evaluator;

/// Backend type aliases
pub mod backend;
