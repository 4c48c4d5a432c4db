// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch index (0, 1, 2, ...), as printed
//   - train_loss: mean per-batch loss over the training set
//   - train_acc:  fraction of training examples classified correctly
//   - val_loss:   same on the validation set (empty without one)
//   - val_acc:    same on the validation set (empty without one)
//
// Output file: <output_dir>/metrics.csv
//
//   epoch,train_loss,train_acc,val_loss,val_acc
//   0,0.693100,0.512000,0.694200,0.498000
//   1,0.688400,0.587000,,
//
// If val_loss rises while train_loss keeps falling the model is
// overfitting.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

const HEADER: &str = "epoch,train_loss,train_acc,val_loss,val_acc";

/// Loss and accuracy of one epoch, measured after its last
/// optimizer step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,

    /// Mean of the per-batch losses on the training set
    pub train_loss: f64,

    /// Range: [0.0, 1.0]
    pub train_acc: f64,

    pub val_loss: Option<f64>,
    pub val_acc:  Option<f64>,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, train_acc: f64) -> Self {
        Self { epoch, train_loss, train_acc, val_loss: None, val_acc: None }
    }

    pub fn with_validation(mut self, val_loss: f64, val_acc: f64) -> Self {
        self.val_loss = Some(val_loss);
        self.val_acc  = Some(val_acc);
        self
    }

    fn csv_row(&self) -> String {
        let opt = |v: Option<f64>| v.map(|v| format!("{v:.6}")).unwrap_or_default();
        format!(
            "{},{:.6},{:.6},{},{}",
            self.epoch,
            self.train_loss,
            self.train_acc,
            opt(self.val_loss),
            opt(self.val_acc),
        )
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    /// Full path to the CSV file
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");

        // Appending across runs keeps a single header
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(f, "{}", m.csv_row())?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, train_acc={:.4}",
            m.epoch,
            m.train_loss,
            m.train_acc,
        );

        Ok(())
    }

    /// Return the path to the metrics CSV file
    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
