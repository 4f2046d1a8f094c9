//! Test-set inference from a saved checkpoint.
//!
//! Loads a checkpoint, rebuilds the model through a caller-supplied closure,
//! and runs one fixed-order pass over the test table. No gradient graph is
//! ever built. Each sample yields two outputs, positionally (ligand-bound,
//! ligand-free); these are appended to a copy of the input table together
//! with the average criterion loss when one was supplied.
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use candle_core::Tensor;
use polars::prelude::*;

use crate::checkpoint::{load_checkpoint, Checkpoint, CheckpointMeta};
use crate::dataset::RnaDataset;
use crate::model::AffinityModel;
use crate::table::write_json_table;

/// Prediction columns appended to the output table.
pub const LIG_PRED_COLUMN: &str = "log_kfold_est_lig_Z";
pub const NOLIG_PRED_COLUMN: &str = "log_kfold_est_nolig_Z";
pub const TEST_LOSS_COLUMN: &str = "test_loss";

/// A loss taking (predictions, labels) and returning a tensor; reduced to its
/// mean per batch.
pub type Criterion<'a> = &'a dyn Fn(&Tensor, &Tensor) -> candle_core::Result<Tensor>;

/// Mean squared error, the default criterion.
pub fn mse_criterion(predictions: &Tensor, labels: &Tensor) -> candle_core::Result<Tensor> {
    candle_nn::loss::mse(predictions, labels)
}

pub struct InferenceOptions {
    pub batch_size: usize,
    pub device: candle_core::Device,
    pub save_predictions: bool,
    /// Where to write predictions. Defaults to the checkpoint's directory.
    pub output_dir: Option<PathBuf>,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            batch_size: 1,
            device: candle_core::Device::Cpu,
            save_predictions: true,
            output_dir: None,
        }
    }
}

pub struct InferenceOutput {
    /// Copy of the input table with prediction columns appended.
    pub predictions: DataFrame,
    /// Mean criterion loss over batches; `None` without a criterion or batches.
    pub test_loss: Option<f64>,
    /// Metadata of the checkpoint that produced the predictions.
    pub meta: CheckpointMeta,
    /// Where predictions were written, when saving was enabled.
    pub output_path: Option<PathBuf>,
}

/// Run inference over `test_df` using the model stored at `checkpoint_path`.
///
/// `build_model` receives the loaded checkpoint and constructs the model from
/// its tensors; this keeps the runner independent of any one architecture.
pub fn run_inference<M: AffinityModel>(
    checkpoint_path: &Path,
    test_df: &DataFrame,
    build_model: impl FnOnce(&Checkpoint) -> Result<M>,
    criterion: Option<Criterion>,
    opts: &InferenceOptions,
) -> Result<InferenceOutput> {
    if opts.batch_size == 0 {
        bail!("batch_size must be at least 1");
    }

    tracing::info!(checkpoint = %checkpoint_path.display(), "Loading checkpoint");
    let checkpoint = load_checkpoint(checkpoint_path, &opts.device)?;
    let meta = checkpoint.meta.clone();
    tracing::info!(
        epoch = meta.display_epoch(),
        train_loss = meta.train_loss,
        val_loss = meta.val_loss,
        best_loss = meta.best_loss,
        "Checkpoint information"
    );
    let model = build_model(&checkpoint)?;

    let dataset = RnaDataset::new(test_df.clone(), opts.device.clone())?;
    let n = dataset.len();
    tracing::info!(samples = n, batch_size = opts.batch_size, "Running inference on test data");

    let mut lig_preds: Vec<f64> = Vec::with_capacity(n);
    let mut nolig_preds: Vec<f64> = Vec::with_capacity(n);
    let mut loss_sum = 0.0;
    let mut num_batches = 0usize;

    for start in (0..n).step_by(opts.batch_size) {
        let end = (start + opts.batch_size).min(n);
        let mut sequences = Vec::with_capacity(end - start);
        let mut labels = Vec::with_capacity(end - start);
        for idx in start..end {
            let sample = dataset.get(idx)?;
            sequences.push(sample.sequence);
            labels.push(sample.labels);
        }
        let batch = Tensor::stack(&sequences, 0)?;
        let labels = Tensor::stack(&labels, 0)?;

        let output = model.predict(&batch)?;
        let dims = output.dims();
        if dims != [end - start, 2].as_slice() {
            bail!(
                "Model output shape {dims:?} does not match expected [{}, 2]",
                end - start
            );
        }

        if let Some(criterion) = criterion {
            let loss = criterion(&output, &labels)?.mean_all()?;
            loss_sum += loss.to_scalar::<f32>()? as f64;
            num_batches += 1;
        }

        for row in output.to_vec2::<f32>()? {
            lig_preds.push(row[0] as f64);
            nolig_preds.push(row[1] as f64);
        }
    }

    // Mean over batches, guarded against an empty test set.
    let test_loss = (num_batches > 0).then(|| loss_sum / num_batches as f64);
    if let Some(loss) = test_loss {
        tracing::info!(avg_test_loss = format!("{loss:.4}"), "Inference finished");
    }

    let mut predictions = test_df.clone();
    predictions.with_column(Series::new(LIG_PRED_COLUMN.into(), lig_preds))?;
    predictions.with_column(Series::new(NOLIG_PRED_COLUMN.into(), nolig_preds))?;
    if let Some(loss) = test_loss {
        predictions.with_column(Series::new(TEST_LOSS_COLUMN.into(), vec![loss; n]))?;
    }

    let output_path = if opts.save_predictions {
        let dir = match &opts.output_dir {
            Some(dir) => dir.clone(),
            None => checkpoint_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        let stem = checkpoint_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("checkpoint");
        let path = dir.join(format!("RS_{stem}_Z.json"));
        write_json_table(&path, &mut predictions)?;
        tracing::info!(path = %path.display(), "Predictions saved");
        Some(path)
    } else {
        None
    };

    Ok(InferenceOutput {
        predictions,
        test_loss,
        meta,
        output_path,
    })
}
