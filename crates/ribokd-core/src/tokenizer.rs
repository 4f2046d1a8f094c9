//! A nucleotide tokenizer that maps RNA sequences to integer-coded tensors.
//!
//! The vocabulary is the fixed four-letter alphabet A/C/G/U. Any character
//! outside the alphabet is a hard error, propagated to the caller.
use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};

/// Alphabet order defines the integer codes: A=0, C=1, G=2, U=3.
const ALPHABET: [char; 4] = ['A', 'C', 'G', 'U'];

pub struct RnaTokenizer {
    device: Device,
}

impl RnaTokenizer {
    pub fn new(device: Device) -> Self {
        Self { device }
    }

    pub fn vocab_size(&self) -> usize {
        ALPHABET.len()
    }

    pub fn token_to_id(&self, nt: char) -> Result<i64> {
        ALPHABET
            .iter()
            .position(|&c| c == nt)
            .map(|i| i as i64)
            .ok_or_else(|| anyhow!("Unknown nucleotide {nt:?}: expected one of A/C/G/U"))
    }

    pub fn id_to_token(&self, id: i64) -> Result<char> {
        usize::try_from(id)
            .ok()
            .and_then(|i| ALPHABET.get(i).copied())
            .ok_or_else(|| anyhow!("Token id {id} out of range for the A/C/G/U vocabulary"))
    }

    /// Encode a sequence into a 1-D i64 tensor of token ids.
    pub fn encode(&self, sequence: &str) -> Result<Tensor> {
        let ids = sequence
            .chars()
            .map(|nt| self.token_to_id(nt))
            .collect::<Result<Vec<i64>>>()?;
        Tensor::new(ids, &self.device).map_err(|e| anyhow!("Failed to create tensor: {e}"))
    }

    /// Decode token ids back into a sequence string.
    pub fn decode(&self, ids: &[i64]) -> Result<String> {
        ids.iter().map(|&id| self.id_to_token(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_roundtrip() -> Result<()> {
        let tokenizer = RnaTokenizer::new(Device::Cpu);
        for seq in ["A", "ACGU", "GGGGAAAACCCC", "UACGUACGUACG"] {
            let encoded = tokenizer.encode(seq)?;
            let ids: Vec<i64> = encoded.to_vec1()?;
            assert_eq!(tokenizer.decode(&ids)?, seq);
        }
        Ok(())
    }

    #[test]
    fn test_fixed_mapping() -> Result<()> {
        let tokenizer = RnaTokenizer::new(Device::Cpu);
        let ids: Vec<i64> = tokenizer.encode("ACGU")?.to_vec1()?;
        assert_eq!(ids, vec![0, 1, 2, 3]);
        Ok(())
    }

    #[test]
    fn test_unknown_nucleotide_fails() {
        let tokenizer = RnaTokenizer::new(Device::Cpu);
        assert!(tokenizer.encode("ACGN").is_err());
        assert!(tokenizer.encode("acgu").is_err());
        assert!(tokenizer.decode(&[0, 4]).is_err());
    }
}
