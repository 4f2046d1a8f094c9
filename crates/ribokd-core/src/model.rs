//! Sequence-to-affinity regression model.
//!
//! `LogKd` maps a batch of integer-coded RNA sequences to two scalars per
//! sequence: predicted logKd with ligand and without. Embedding over the
//! 4-letter vocabulary, mean pooling over sequence length, and a two-layer
//! head.
use anyhow::Result;
use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{embedding, linear, Embedding, Linear, VarBuilder};
use serde::{Deserialize, Serialize};

use crate::checkpoint::Checkpoint;

/// Anything that predicts a fixed-width affinity output per sequence.
///
/// Output shape is `[batch, 2]`, positionally (ligand-bound, ligand-free).
pub trait AffinityModel {
    fn predict(&self, sequences: &Tensor) -> candle_core::Result<Tensor>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogKdConfig {
    pub vocab_size: usize,
    pub hidden_size: usize,
    pub num_outputs: usize,
}

impl Default for LogKdConfig {
    fn default() -> Self {
        Self {
            vocab_size: 4,
            hidden_size: 64,
            num_outputs: 2,
        }
    }
}

#[derive(Debug)]
pub struct LogKd {
    embedding: Embedding,
    hidden: Linear,
    head: Linear,
}

impl LogKd {
    pub fn load(vb: VarBuilder, cfg: &LogKdConfig) -> candle_core::Result<Self> {
        let embedding = embedding(cfg.vocab_size, cfg.hidden_size, vb.pp("embedding"))?;
        let hidden = linear(cfg.hidden_size, cfg.hidden_size, vb.pp("hidden"))?;
        let head = linear(cfg.hidden_size, cfg.num_outputs, vb.pp("head"))?;
        Ok(Self {
            embedding,
            hidden,
            head,
        })
    }

    /// Rebuild the model from a loaded checkpoint's tensors.
    ///
    /// Uses the config embedded in the checkpoint metadata, falling back to
    /// defaults for checkpoints written without one.
    pub fn from_checkpoint(checkpoint: &Checkpoint, device: &Device) -> Result<Self> {
        let cfg = checkpoint.meta.model_config.clone().unwrap_or_default();
        let vb = VarBuilder::from_tensors(checkpoint.model.clone(), DType::F32, device);
        Ok(Self::load(vb, &cfg)?)
    }

    /// `[batch, seq_len]` token ids → `[batch, num_outputs]` predictions.
    pub fn forward(&self, sequences: &Tensor) -> candle_core::Result<Tensor> {
        let x = self.embedding.forward(sequences)?;
        let x = x.mean(1)?;
        let x = self.hidden.forward(&x)?.relu()?;
        self.head.forward(&x)
    }
}

impl AffinityModel for LogKd {
    fn predict(&self, sequences: &Tensor) -> candle_core::Result<Tensor> {
        self.forward(sequences)
    }
}
