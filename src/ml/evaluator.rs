// ============================================================
// Layer 5 — Evaluation Pass
// ============================================================
// One routine runs the model over a whole batch source with
// normalisation in Mode::Eval and feeds a MetricsAccumulator:
//
//   evaluate        — the shared pass (optionally tracking p/tp/fp)
//   aggregate_pass  — (mean loss per batch, accuracy), used by the trainer
//   test_report     — full report with precision / recall / F1
//   test            — (accuracy, f1)
//
// Callers pass a model on a non-autodiff backend (`model.valid()`
// during training), so no gradient graph is built here.

use burn::prelude::*;

use crate::data::batcher::SequenceBatch;
use crate::domain::metrics::{MetricsAccumulator, PositiveLabel, TestReport};
use crate::error::Result;
use crate::ml::model::{host, Mode, SequenceCnn};

/// Run the model over every batch and accumulate loss, correctness
/// and, when `positive_label` is set, the soft tp / fp counts.
pub fn evaluate<B, I>(
    model:          &SequenceCnn<B>,
    batches:        I,
    positive_label: Option<PositiveLabel>,
) -> Result<MetricsAccumulator>
where
    B: Backend,
    I: IntoIterator<Item = SequenceBatch<B>>,
{
    let mut acc = match positive_label {
        Some(label) => MetricsAccumulator::with_positive_label(label),
        None        => MetricsAccumulator::new(),
    };

    for batch in batches {
        let labels = host(batch.labels.clone().float())?;
        let (loss, probabilities) = model.forward_loss(batch.tokens, batch.labels, Mode::Eval)?;

        let batch_loss: f64 = loss.into_scalar().elem::<f64>();
        let predictions = host(probabilities)?;
        acc.observe(batch_loss, &labels, &predictions)?;

        tracing::debug!(
            "Eval batch {}: loss={:.6}, size={}",
            acc.batches(), batch_loss, labels.len()
        );
    }

    Ok(acc)
}

/// (mean loss per batch, accuracy fraction) over all batches.
pub fn aggregate_pass<B, I>(model: &SequenceCnn<B>, batches: I) -> Result<(f64, f64)>
where
    B: Backend,
    I: IntoIterator<Item = SequenceBatch<B>>,
{
    evaluate(model, batches, None)?.aggregate()
}

/// Full test pass. Prints the diagnostic lines and returns the
/// complete report.
pub fn test_report<B, I>(
    model:          &SequenceCnn<B>,
    batches:        I,
    positive_label: PositiveLabel,
) -> Result<TestReport>
where
    B: Backend,
    I: IntoIterator<Item = SequenceBatch<B>>,
{
    let acc = evaluate(model, batches, Some(positive_label))?;

    println!("p: {}, tp: {:.4}, fp: {:.4}", acc.positives(), acc.tp(), acc.fp());
    let report = acc.finish_test()?;

    println!("recall: {:.4}, precision: {:.4}", report.recall, report.precision);
    println!(
        "num_batches: {}, correct: {}, size: {}",
        report.batches, report.correct, report.size
    );
    println!("{}\n", report_summary(&report));
    tracing::info!(
        "Test pass: accuracy={:.4}, f1={:.4}, loss={:.6}",
        report.accuracy, report.f1, report.mean_loss
    );

    Ok(report)
}

/// Console line of a test pass. Accuracy is printed as a fraction.
fn report_summary(report: &TestReport) -> String {
    format!(
        "Test metrics: \n Accuracy: {:.6}, F1 score: {:.6}, Avg loss: {:.6}",
        report.accuracy, report.f1, report.mean_loss
    )
}

/// Full test pass returning (accuracy, f1).
pub fn test<B, I>(
    model:          &SequenceCnn<B>,
    batches:        I,
    positive_label: PositiveLabel,
) -> Result<(f64, f64)>
where
    B: Backend,
    I: IntoIterator<Item = SequenceBatch<B>>,
{
    let report = test_report(model, batches, positive_label)?;
    Ok((report.accuracy, report.f1))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MetricDenominator, ModelError};
    use crate::ml::model::SequenceCnnConfig;
    use approx::assert_relative_eq;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    const LEN: usize = 64;

    fn model() -> SequenceCnn<TestBackend> {
        SequenceCnnConfig::new(2, 6, 4, LEN)
            .init::<TestBackend>(&Default::default())
            .unwrap()
    }

    fn batch(seeds: &[i32], labels: &[i32]) -> SequenceBatch<TestBackend> {
        let device = Default::default();
        let flat: Vec<i32> = seeds
            .iter()
            .flat_map(|&s| (0..LEN as i32).map(move |i| (i * s + s) % 6))
            .collect();
        SequenceBatch {
            tokens: Tensor::<TestBackend, 1, Int>::from_ints(flat.as_slice(), &device)
                .reshape([seeds.len(), LEN]),
            labels: Tensor::<TestBackend, 1, Int>::from_ints(labels, &device),
        }
    }

    #[test]
    fn test_accuracy_is_a_fraction() {
        let model = model();
        let batches = vec![batch(&[1, 2, 3], &[1, 0, 1]), batch(&[4, 5], &[0, 0])];

        let (loss, accuracy) = aggregate_pass(&model, batches).unwrap();
        assert!(loss.is_finite());
        assert!((0.0..=1.0).contains(&accuracy), "accuracy={accuracy}");
    }

    #[test]
    fn test_counts_batches_and_examples() {
        let model = model();
        let batches = vec![batch(&[1, 2, 3], &[1, 0, 1]), batch(&[4, 5], &[0, 0])];

        let acc = evaluate(&model, batches, Some(PositiveLabel::One)).unwrap();
        assert_eq!(acc.batches(), 2);
        assert_eq!(acc.size(), 5);
        assert_eq!(acc.positives(), 2);
        assert!(acc.correct() <= 5);
    }

    #[test]
    fn test_loss_is_averaged_over_batches() {
        let model = model();
        let first  = aggregate_pass(&model, vec![batch(&[1, 2, 3], &[1, 0, 1])]).unwrap().0;
        let second = aggregate_pass(&model, vec![batch(&[4], &[0])]).unwrap().0;

        let both = aggregate_pass(
            &model,
            vec![batch(&[1, 2, 3], &[1, 0, 1]), batch(&[4], &[0])],
        )
        .unwrap()
        .0;
        assert_relative_eq!(both, (first + second) / 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_no_positive_examples_is_an_error() {
        let model = model();
        let err = test(&model, vec![batch(&[1, 2], &[0, 0])], PositiveLabel::One).unwrap_err();
        assert!(matches!(
            err,
            ModelError::UndefinedMetric(MetricDenominator::Positives)
        ));
    }

    #[test]
    fn test_report_is_consistent_with_pair() {
        let model = model();
        let batches = || vec![batch(&[1, 2, 3, 4], &[1, 0, 1, 0])];

        let report = test_report(&model, batches(), PositiveLabel::One).unwrap();
        let (accuracy, f1) = test(&model, batches(), PositiveLabel::One).unwrap();

        assert_relative_eq!(report.accuracy, accuracy);
        assert_relative_eq!(report.f1, f1);
        assert!(f1 > 0.0 && f1 <= 1.0);
    }

    #[test]
    fn test_report_summary_prints_accuracy_as_fraction() {
        let report = TestReport {
            accuracy:  0.75,
            f1:        0.5,
            precision: 0.5,
            recall:    0.5,
            mean_loss: 0.625,
            positives: 2,
            tp:        1.0,
            fp:        1.0,
            batches:   1,
            correct:   3,
            size:      4,
        };
        assert_eq!(
            report_summary(&report),
            "Test metrics: \n Accuracy: 0.750000, F1 score: 0.500000, Avg loss: 0.625000"
        );
    }

    #[test]
    fn test_empty_source_is_an_error() {
        let model = model();
        let err = aggregate_pass(&model, Vec::<SequenceBatch<TestBackend>>::new()).unwrap_err();
        assert!(matches!(err, ModelError::EmptyDataset));
    }

    #[test]
    fn test_label_count_mismatch_is_an_error() {
        let model = model();
        let err = aggregate_pass(&model, vec![batch(&[1, 2], &[1])]).unwrap_err();
        assert!(matches!(err, ModelError::LabelShape { labels: 1, predictions: 2 }));
    }
}
