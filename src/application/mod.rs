// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal:
// a training run or a model description.
//
// No tensor math here and no argument parsing; only workflow
// coordination between data, ml and infra.

// The training workflow
pub mod train_use_case;

// Build the model and report its shapes
pub mod describe_use_case;
