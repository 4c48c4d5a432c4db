// ============================================================
// Layer 3 — SequenceSample Domain Type
// ============================================================
// One training or evaluation example: a fixed-length vector of
// token ids (already encoded and padded to the model's
// input_len) and a binary class label.

use serde::{Deserialize, Serialize};

/// A single labelled example ready for batching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSample {
    /// Token ids in `[0, vocab_size)`, length == model input_len
    pub tokens: Vec<u32>,

    /// Binary class label, 0 or 1
    pub label: u8,
}

impl SequenceSample {
    pub fn new(tokens: Vec<u32>, label: u8) -> Self {
        Self { tokens, label }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len() {
        let s = SequenceSample::new(vec![1, 4, 2, 0], 1);
        assert_eq!(s.len(), 4);
        assert!(!s.is_empty());
        assert!(SequenceSample::new(vec![], 0).is_empty());
    }
}
