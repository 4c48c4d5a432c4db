// ============================================================
// Layer 3 — Metrics Accumulator
// ============================================================
// Counters collected during one evaluation pass, and the rates
// derived from them once the pass is over.
//
// Per batch we receive the mean loss of that batch, the labels
// and the predicted probabilities (both flattened to f32).
//
//   loss      = Σ batch_mean_loss / number_of_batches
//   accuracy  = #(round(pred) == label) / number_of_examples
//
// With a positive label the pass also tracks soft counts, where
// the probability itself is the vote (no 0.5 threshold):
//
//   positive_label = 1:  tp += y·p        fp += (1 − y)·p
//   positive_label = 0:  tp += (1 − y)(1 − p)   fp += y(1 − p)
//
//   recall    = tp / p
//   precision = tp / (tp + fp)
//   f1        = 2·precision·recall / (precision + recall)
//
// A zero denominator is reported as ModelError::UndefinedMetric;
// this module never produces NaN.

use serde::{Deserialize, Serialize};

use crate::error::{MetricDenominator, ModelError, Result};

/// The class value counted as "positive" for precision / recall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositiveLabel {
    Zero,
    One,
}

impl PositiveLabel {
    pub fn value(self) -> f32 {
        match self {
            PositiveLabel::Zero => 0.0,
            PositiveLabel::One  => 1.0,
        }
    }
}

/// `1` selects [`PositiveLabel::One`]; every other value selects
/// [`PositiveLabel::Zero`].
impl From<u8> for PositiveLabel {
    fn from(v: u8) -> Self {
        if v == 1 { PositiveLabel::One } else { PositiveLabel::Zero }
    }
}

/// Final numbers of a full test pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    pub accuracy:  f64,
    pub f1:        f64,
    pub precision: f64,
    pub recall:    f64,
    /// Mean of the per-batch mean losses
    pub mean_loss: f64,
    pub positives: usize,
    pub tp:        f64,
    pub fp:        f64,
    pub batches:   usize,
    pub correct:   usize,
    pub size:      usize,
}

/// Running counters for a single evaluation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsAccumulator {
    loss_sum:       f64,
    batches:        usize,
    correct:        usize,
    size:           usize,
    positive_label: Option<PositiveLabel>,
    positives:      usize,
    tp:             f64,
    fp:             f64,
}

impl MetricsAccumulator {
    /// Loss and accuracy only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loss and accuracy plus precision / recall tracking.
    pub fn with_positive_label(positive_label: PositiveLabel) -> Self {
        Self { positive_label: Some(positive_label), ..Self::default() }
    }

    /// Fold one batch into the counters.
    ///
    /// `labels` and `predictions` are the flattened `[N, 1]` tensors
    /// of the batch and must have the same length.
    pub fn observe(&mut self, batch_loss: f64, labels: &[f32], predictions: &[f32]) -> Result<()> {
        if labels.len() != predictions.len() {
            return Err(ModelError::LabelShape {
                labels:      labels.len(),
                predictions: predictions.len(),
            });
        }

        self.loss_sum += batch_loss;
        self.batches  += 1;
        self.size     += labels.len();

        // torch.round semantics: halves go to the even neighbour
        self.correct += labels
            .iter()
            .zip(predictions)
            .filter(|&(&y, &p)| p.round_ties_even() == y)
            .count();

        if let Some(positive) = self.positive_label {
            self.positives += labels.iter().filter(|&&y| y == positive.value()).count();

            for (&y, &p) in labels.iter().zip(predictions) {
                let (y, p) = (y as f64, p as f64);
                match positive {
                    PositiveLabel::One => {
                        self.tp += y * p;
                        self.fp += (1.0 - y) * p;
                    }
                    PositiveLabel::Zero => {
                        self.tp += (1.0 - y) * (1.0 - p);
                        self.fp += y * (1.0 - p);
                    }
                }
            }
        }

        Ok(())
    }

    pub fn batches(&self)   -> usize { self.batches }
    pub fn size(&self)      -> usize { self.size }
    pub fn correct(&self)   -> usize { self.correct }
    pub fn positives(&self) -> usize { self.positives }
    pub fn tp(&self)        -> f64   { self.tp }
    pub fn fp(&self)        -> f64   { self.fp }

    /// Sum of per-batch mean losses divided by the number of batches
    /// (not by the number of examples).
    pub fn mean_loss(&self) -> Result<f64> {
        if self.batches == 0 {
            return Err(ModelError::EmptyDataset);
        }
        Ok(self.loss_sum / self.batches as f64)
    }

    /// Fraction of examples whose rounded prediction equals the label.
    pub fn accuracy(&self) -> Result<f64> {
        if self.size == 0 {
            return Err(ModelError::EmptyDataset);
        }
        Ok(self.correct as f64 / self.size as f64)
    }

    /// `(mean_loss_per_batch, accuracy_fraction)`
    pub fn aggregate(&self) -> Result<(f64, f64)> {
        Ok((self.mean_loss()?, self.accuracy()?))
    }

    /// Derive recall, precision and F1. Requires a positive label.
    pub fn finish_test(&self) -> Result<TestReport> {
        if self.positive_label.is_none() {
            return Err(ModelError::InvalidConfig(
                "precision/recall tracking was not enabled for this pass".to_string(),
            ));
        }
        let (mean_loss, accuracy) = self.aggregate()?;

        if self.positives == 0 {
            return Err(ModelError::UndefinedMetric(MetricDenominator::Positives));
        }
        let recall = self.tp / self.positives as f64;

        if self.tp + self.fp == 0.0 {
            return Err(ModelError::UndefinedMetric(MetricDenominator::PredictedPositives));
        }
        let precision = self.tp / (self.tp + self.fp);

        if precision + recall == 0.0 {
            return Err(ModelError::UndefinedMetric(MetricDenominator::PrecisionPlusRecall));
        }
        let f1 = 2.0 * precision * recall / (precision + recall);

        Ok(TestReport {
            accuracy,
            f1,
            precision,
            recall,
            mean_loss,
            positives: self.positives,
            tp:        self.tp,
            fp:        self.fp,
            batches:   self.batches,
            correct:   self.correct,
            size:      self.size,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const EPS: f64 = 1e-6;

    fn run(positive: PositiveLabel, labels: &[f32], preds: &[f32]) -> MetricsAccumulator {
        let mut acc = MetricsAccumulator::with_positive_label(positive);
        acc.observe(0.5, labels, preds).unwrap();
        acc
    }

    #[test]
    fn test_soft_counts_positive_one() {
        let acc = run(PositiveLabel::One, &[1.0, 1.0, 0.0, 0.0], &[0.9, 0.2, 0.8, 0.1]);
        let r   = acc.finish_test().unwrap();

        assert_eq!(r.positives, 2);
        assert_abs_diff_eq!(r.tp, 1.1, epsilon = EPS);
        assert_abs_diff_eq!(r.fp, 0.9, epsilon = EPS);
        assert_abs_diff_eq!(r.recall, 0.55, epsilon = EPS);
        assert_abs_diff_eq!(r.precision, 0.55, epsilon = EPS);
        assert_abs_diff_eq!(r.f1, 0.55, epsilon = EPS);
        // 0.9 → 1 ✓, 0.2 → 0 ✗, 0.8 → 1 ✗, 0.1 → 0 ✓
        assert_eq!(r.correct, 2);
        assert_abs_diff_eq!(r.accuracy, 0.5, epsilon = EPS);
    }

    #[test]
    fn test_positive_zero_uses_complementary_formula() {
        let labels = [1.0, 1.0, 0.0, 0.0];
        let preds  = [0.9, 0.6, 0.3, 0.1];

        let one  = run(PositiveLabel::One,  &labels, &preds).finish_test().unwrap();
        let zero = run(PositiveLabel::Zero, &labels, &preds).finish_test().unwrap();

        // positive = 1: tp = 0.9 + 0.6, fp = 0.3 + 0.1
        assert_abs_diff_eq!(one.tp, 1.5, epsilon = EPS);
        assert_abs_diff_eq!(one.fp, 0.4, epsilon = EPS);
        assert_abs_diff_eq!(one.f1, 10.0 / 13.0, epsilon = EPS);

        // positive = 0: tp = 0.7 + 0.9, fp = 0.1 + 0.4
        assert_eq!(zero.positives, 2);
        assert_abs_diff_eq!(zero.tp, 1.6, epsilon = EPS);
        assert_abs_diff_eq!(zero.fp, 0.5, epsilon = EPS);
        assert_abs_diff_eq!(zero.recall, 0.8, epsilon = EPS);
        assert_abs_diff_eq!(zero.precision, 16.0 / 21.0, epsilon = EPS);
        assert_abs_diff_eq!(zero.f1, 32.0 / 41.0, epsilon = EPS);

        assert!((one.f1 - zero.f1).abs() > 1e-3);
    }

    #[test]
    fn test_loss_is_averaged_per_batch_not_per_example() {
        let mut acc = MetricsAccumulator::new();
        acc.observe(1.0, &[1.0, 0.0, 1.0], &[0.7, 0.2, 0.6]).unwrap();
        acc.observe(3.0, &[0.0], &[0.9]).unwrap();

        let (loss, accuracy) = acc.aggregate().unwrap();
        assert_abs_diff_eq!(loss, 2.0, epsilon = EPS);
        assert_abs_diff_eq!(accuracy, 0.75, epsilon = EPS);
        assert_eq!(acc.batches(), 2);
        assert_eq!(acc.size(), 4);
    }

    #[test]
    fn test_rounding_ties_go_to_even() {
        let mut acc = MetricsAccumulator::new();
        acc.observe(0.0, &[0.0, 1.0], &[0.5, 0.5]).unwrap();
        assert_eq!(acc.correct(), 1);
    }

    #[test]
    fn test_no_positive_examples_is_an_error() {
        let acc = run(PositiveLabel::One, &[0.0, 0.0], &[0.3, 0.4]);
        assert!(matches!(
            acc.finish_test(),
            Err(ModelError::UndefinedMetric(MetricDenominator::Positives))
        ));
    }

    #[test]
    fn test_zero_predicted_positive_mass_is_an_error() {
        let acc = run(PositiveLabel::One, &[1.0, 0.0], &[0.0, 0.0]);
        assert!(matches!(
            acc.finish_test(),
            Err(ModelError::UndefinedMetric(MetricDenominator::PredictedPositives))
        ));
    }

    #[test]
    fn test_zero_precision_and_recall_is_an_error() {
        let acc = run(PositiveLabel::One, &[1.0, 0.0], &[0.0, 0.7]);
        assert!(matches!(
            acc.finish_test(),
            Err(ModelError::UndefinedMetric(MetricDenominator::PrecisionPlusRecall))
        ));
    }

    #[test]
    fn test_empty_pass() {
        let acc = MetricsAccumulator::with_positive_label(PositiveLabel::One);
        assert!(matches!(acc.aggregate(), Err(ModelError::EmptyDataset)));
        assert!(matches!(acc.finish_test(), Err(ModelError::EmptyDataset)));
    }

    #[test]
    fn test_mismatched_lengths() {
        let mut acc = MetricsAccumulator::new();
        let err = acc.observe(0.1, &[1.0, 0.0], &[0.5]).unwrap_err();
        assert!(matches!(err, ModelError::LabelShape { labels: 2, predictions: 1 }));
    }

    #[test]
    fn test_finish_requires_positive_label() {
        let mut acc = MetricsAccumulator::new();
        acc.observe(0.1, &[1.0], &[0.9]).unwrap();
        assert!(matches!(acc.finish_test(), Err(ModelError::InvalidConfig(_))));
    }

    #[test]
    fn test_positive_label_from_u8() {
        assert_eq!(PositiveLabel::from(1), PositiveLabel::One);
        assert_eq!(PositiveLabel::from(0), PositiveLabel::Zero);
        assert_eq!(PositiveLabel::from(7), PositiveLabel::Zero);
    }
}
