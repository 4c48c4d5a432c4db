use burn::data::dataset::Dataset;

use crate::domain::sample::SequenceSample;

/// In-memory labelled sequences, exposed to Burn's DataLoader.
pub struct SequenceDataset {
    samples: Vec<SequenceSample>,
}

impl SequenceDataset {
    pub fn new(samples: Vec<SequenceSample>) -> Self { Self { samples } }

    /// Number of samples carrying `label`.
    pub fn count_label(&self, label: u8) -> usize {
        self.samples.iter().filter(|s| s.label == label).count()
    }
}

impl Dataset<SequenceSample> for SequenceDataset {
    fn get(&self, index: usize) -> Option<SequenceSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_access() {
        let ds = SequenceDataset::new(vec![
            SequenceSample::new(vec![1, 2], 1),
            SequenceSample::new(vec![5, 0], 0),
            SequenceSample::new(vec![3, 3], 1),
        ]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.count_label(1), 2);
        assert_eq!(ds.get(1).unwrap().label, 0);
        assert!(ds.get(3).is_none());
    }
}
