// ============================================================
// Library Error Type
// ============================================================
// Every fallible operation below the CLI returns ModelError.
// The application and CLI layers wrap it in anyhow so they can
// attach file paths and other context.

use thiserror::Error;

/// Which denominator of the test metrics turned out to be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricDenominator {
    /// No example carries the positive label, so recall is undefined.
    Positives,
    /// tp + fp is zero, so precision is undefined.
    PredictedPositives,
    /// precision + recall is zero, so F1 is undefined.
    PrecisionPlusRecall,
}

impl std::fmt::Display for MetricDenominator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MetricDenominator::Positives           => "positive count (recall)",
            MetricDenominator::PredictedPositives  => "tp + fp (precision)",
            MetricDenominator::PrecisionPlusRecall => "precision + recall (f1)",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unsupported configuration: number_of_classes = {number_of_classes}, only binary (2) is implemented")]
    UnsupportedConfiguration { number_of_classes: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("label tensor has {labels} elements but the model produced {predictions} predictions")]
    LabelShape { labels: usize, predictions: usize },

    #[error("evaluation pass saw no examples")]
    EmptyDataset,

    #[error("division by zero while computing metrics: {0} is zero")]
    UndefinedMetric(MetricDenominator),

    #[error("cannot read tensor data: {0}")]
    TensorData(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
