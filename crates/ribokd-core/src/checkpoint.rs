//! Single-file training checkpoints.
//!
//! A checkpoint is one safetensors file holding the model tensors (prefixed
//! `model.`), optional optimizer tensors (prefixed `optim.`), and a JSON
//! metadata blob in the safetensors header: epoch, current and historical
//! losses, best loss so far, optional scheduler state, and optional model
//! config. Saving is atomic (tempfile + rename) and does no read-back
//! validation.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use candle_core::{Device, Tensor};
use serde::{Deserialize, Serialize};

use crate::model::LogKdConfig;
use crate::schedule::CosineSchedule;

const META_KEY: &str = "meta";
const MODEL_PREFIX: &str = "model.";
const OPTIM_PREFIX: &str = "optim.";

/// Scalar training state saved alongside the tensors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMeta {
    /// Zero-based epoch index. Displayed 1-indexed in logs.
    pub epoch: usize,
    pub train_loss: f64,
    pub val_loss: f64,
    pub best_loss: f64,
    pub train_losses: Vec<f64>,
    pub val_losses: Vec<f64>,
    /// Scheduler state; serializes as null when training ran without one.
    #[serde(default)]
    pub scheduler: Option<CosineSchedule>,
    /// Model hyperparameters, so inference can rebuild the architecture.
    #[serde(default)]
    pub model_config: Option<LogKdConfig>,
}

impl CheckpointMeta {
    /// Epoch as shown to users (1-indexed).
    pub fn display_epoch(&self) -> usize {
        self.epoch + 1
    }
}

/// A checkpoint read back from disk.
pub struct Checkpoint {
    pub meta: CheckpointMeta,
    /// Model tensors with the `model.` prefix stripped.
    pub model: HashMap<String, Tensor>,
    /// Optimizer tensors with the `optim.` prefix stripped. Empty when the
    /// checkpoint was saved without optimizer state.
    pub optimizer: HashMap<String, Tensor>,
}

/// Save a checkpoint to `path`, returning the path written.
///
/// The file is written next to its destination and renamed into place so a
/// crashed save never leaves a truncated checkpoint behind.
pub fn save_checkpoint(
    path: &Path,
    meta: &CheckpointMeta,
    model: &HashMap<String, Tensor>,
    optimizer: Option<&HashMap<String, Tensor>>,
) -> Result<PathBuf> {
    let mut tensors: HashMap<String, &Tensor> = HashMap::new();
    for (name, tensor) in model {
        tensors.insert(format!("{MODEL_PREFIX}{name}"), tensor);
    }
    if let Some(optimizer) = optimizer {
        for (name, tensor) in optimizer {
            tensors.insert(format!("{OPTIM_PREFIX}{name}"), tensor);
        }
    }

    let header = HashMap::from([(META_KEY.to_string(), serde_json::to_string(meta)?)]);

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    safetensors::serialize_to_file(
        tensors.iter().map(|(name, tensor)| (name.as_str(), *tensor)),
        &Some(header),
        tmp.path(),
    )
    .with_context(|| format!("Failed to serialize checkpoint {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("Failed to move checkpoint into place at {}", path.display()))?;

    Ok(path.to_path_buf())
}

/// Load a checkpoint, placing tensors on `device`.
pub fn load_checkpoint(path: &Path, device: &Device) -> Result<Checkpoint> {
    let buffer =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let (_, header) = safetensors::SafeTensors::read_metadata(&buffer)
        .with_context(|| format!("Not a safetensors checkpoint: {}", path.display()))?;
    let meta_json = header
        .metadata()
        .as_ref()
        .and_then(|m| m.get(META_KEY))
        .ok_or_else(|| anyhow!("Checkpoint {} has no {META_KEY} entry", path.display()))?;
    let meta: CheckpointMeta = serde_json::from_str(meta_json)
        .with_context(|| format!("Corrupt checkpoint metadata in {}", path.display()))?;

    let mut model = HashMap::new();
    let mut optimizer = HashMap::new();
    for (name, tensor) in candle_core::safetensors::load_buffer(&buffer, device)? {
        if let Some(stripped) = name.strip_prefix(MODEL_PREFIX) {
            model.insert(stripped.to_string(), tensor);
        } else if let Some(stripped) = name.strip_prefix(OPTIM_PREFIX) {
            optimizer.insert(stripped.to_string(), tensor);
        }
    }

    Ok(Checkpoint {
        meta,
        model,
        optimizer,
    })
}
