// ============================================================
// Layer 5 — Backend Selection
// ============================================================
// The compute backend is fixed at compile time. `ndarray` (CPU)
// is the default feature; build with `--features wgpu` to run
// on the GPU instead.
//
//   ComputeBackend — forward passes without gradient tracking
//   TrainBackend   — Autodiff<ComputeBackend>, used by the trainer

#[cfg(feature = "wgpu")]
pub type ComputeBackend = burn::backend::Wgpu;

#[cfg(not(feature = "wgpu"))]
pub type ComputeBackend = burn::backend::NdArray;

pub type TrainBackend = burn::backend::Autodiff<ComputeBackend>;

/// Device of the selected backend.
pub type ComputeDevice = <ComputeBackend as burn::prelude::Backend>::Device;

pub fn default_device() -> ComputeDevice {
    let device = ComputeDevice::default();
    tracing::info!("Using device: {:?}", device);
    device
}
