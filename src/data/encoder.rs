// ============================================================
// Layer 4 — Sequence Encoder
// ============================================================
// Maps a nucleotide string to a fixed-length vector of token ids.
//
//   id 0      → <pad>
//   id 1..=k  → the alphabet symbols, in order (default A C G T N)
//
// Matching is case-insensitive. Characters outside the alphabet
// map to the last symbol (N for the default alphabet); whitespace
// is dropped. Sequences longer than input_len are truncated,
// shorter ones are right-padded with <pad>.

use anyhow::{bail, Result};

pub const PAD_ID: u32 = 0;
pub const DNA_ALPHABET: &str = "ACGTN";

#[derive(Debug, Clone)]
pub struct SequenceEncoder {
    alphabet:  Vec<char>,
    input_len: usize,
}

impl SequenceEncoder {
    /// Encoder over a custom alphabet. The last symbol doubles as
    /// the fallback for unknown characters, so at least one symbol
    /// is required.
    pub fn new(alphabet: &str, input_len: usize) -> Result<Self> {
        let alphabet: Vec<char> = alphabet
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if alphabet.is_empty() {
            bail!("alphabet must contain at least one symbol");
        }
        Ok(Self { alphabet, input_len })
    }

    pub fn dna(input_len: usize) -> Self {
        Self { alphabet: DNA_ALPHABET.chars().collect(), input_len }
    }

    /// Number of distinct ids, <pad> included.
    pub fn vocab_size(&self) -> usize {
        self.alphabet.len() + 1
    }

    pub fn input_len(&self) -> usize {
        self.input_len
    }

    fn token_id(&self, c: char) -> u32 {
        let c = c.to_ascii_uppercase();
        let index = self
            .alphabet
            .iter()
            .position(|&a| a == c)
            .unwrap_or(self.alphabet.len().saturating_sub(1));
        index as u32 + 1
    }

    /// Encode one sequence to exactly `input_len` ids.
    pub fn encode(&self, sequence: &str) -> Vec<u32> {
        let mut ids: Vec<u32> = sequence
            .chars()
            .filter(|c| !c.is_whitespace())
            .take(self.input_len)
            .map(|c| self.token_id(c))
            .collect();
        ids.resize(self.input_len, PAD_ID);
        ids
    }
}
