//! Index-based access to (sequence, label) samples backed by a polars table.
use anyhow::{anyhow, bail, Context, Result};
use candle_core::{Device, Tensor};
use polars::prelude::*;

use crate::tokenizer::RnaTokenizer;

/// Scaled logKd labels, in this column order.
pub const LABEL_COLUMNS: [&str; 2] = ["logkd_lig_scaled", "logkd_nolig_scaled"];

/// One test/train sample: an integer-coded sequence and its two labels.
pub struct Sample {
    /// 1-D i64 tensor of nucleotide token ids.
    pub sequence: Tensor,
    /// 2-element f32 tensor: `[logkd_lig_scaled, logkd_nolig_scaled]`.
    pub labels: Tensor,
}

/// Wraps an in-memory prediction table and tokenizes rows on access.
pub struct RnaDataset {
    data: DataFrame,
    tokenizer: RnaTokenizer,
    device: Device,
}

impl RnaDataset {
    /// Wrap a table. Requires a `sequence` column and both label columns.
    pub fn new(data: DataFrame, device: Device) -> Result<Self> {
        for col in std::iter::once("sequence").chain(LABEL_COLUMNS) {
            if data.column(col).is_err() {
                bail!("Dataset table is missing required column {col:?}");
            }
        }
        Ok(Self {
            data,
            tokenizer: RnaTokenizer::new(device.clone()),
            device,
        })
    }

    pub fn len(&self) -> usize {
        self.data.height()
    }

    pub fn is_empty(&self) -> bool {
        self.data.height() == 0
    }

    /// Tokenize and label the row at `idx`.
    ///
    /// Fails on out-of-bounds access, null cells, or any sequence character
    /// outside A/C/G/U.
    pub fn get(&self, idx: usize) -> Result<Sample> {
        let sequence = self
            .data
            .column("sequence")?
            .str()?
            .get(idx)
            .ok_or_else(|| anyhow!("No sequence at row {idx}"))?;
        let tokens = self
            .tokenizer
            .encode(sequence)
            .with_context(|| format!("Failed to tokenize row {idx}"))?;

        let mut labels = [0f32; 2];
        for (slot, col) in labels.iter_mut().zip(LABEL_COLUMNS) {
            *slot = self
                .data
                .column(col)?
                .cast(&DataType::Float64)?
                .f64()?
                .get(idx)
                .ok_or_else(|| anyhow!("Missing {col} at row {idx}"))? as f32;
        }
        let labels = Tensor::new(&labels, &self.device)?;

        Ok(Sample {
            sequence: tokens,
            labels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> DataFrame {
        df!(
            "sequence" => ["ACGU", "GGCC"],
            "logkd_lig_scaled" => [0.25f64, -0.5],
            "logkd_nolig_scaled" => [0.75f64, 1.5],
        )
        .unwrap()
    }

    #[test]
    fn test_len_and_get() -> Result<()> {
        let ds = RnaDataset::new(fixture(), Device::Cpu)?;
        assert_eq!(ds.len(), 2);

        let sample = ds.get(0)?;
        let ids: Vec<i64> = sample.sequence.to_vec1()?;
        assert_eq!(ids, vec![0, 1, 2, 3]);
        let labels: Vec<f32> = sample.labels.to_vec1()?;
        assert_eq!(labels, vec![0.25, 0.75]);
        Ok(())
    }

    #[test]
    fn test_missing_label_column_rejected() {
        let df = df!("sequence" => ["ACGU"]).unwrap();
        assert!(RnaDataset::new(df, Device::Cpu).is_err());
    }

    #[test]
    fn test_bad_alphabet_is_hard_error() {
        let df = df!(
            "sequence" => ["ACGN"],
            "logkd_lig_scaled" => [0.0f64],
            "logkd_nolig_scaled" => [0.0f64],
        )
        .unwrap();
        let ds = RnaDataset::new(df, Device::Cpu).unwrap();
        assert!(ds.get(0).is_err());
    }
}
