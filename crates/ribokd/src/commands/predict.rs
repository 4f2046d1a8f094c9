use std::path::{Path, PathBuf};

use anyhow::Result;
use candle_core::Device;
use ribokd_core::{
    mse_criterion, read_json_table, run_inference, Criterion, InferenceOptions, LogKd,
};

pub fn execute(
    checkpoint: &Path,
    test_data: &Path,
    output_dir: Option<PathBuf>,
    batch_size: usize,
    with_loss: bool,
) -> Result<()> {
    let test_df = read_json_table(test_data)?;
    let opts = InferenceOptions {
        batch_size,
        device: Device::Cpu,
        save_predictions: true,
        output_dir,
    };
    let criterion: Option<Criterion> = if with_loss { Some(&mse_criterion) } else { None };

    let output = run_inference(
        checkpoint,
        &test_df,
        |ckpt| LogKd::from_checkpoint(ckpt, &Device::Cpu),
        criterion,
        &opts,
    )?;

    println!("Testing complete: {} samples", output.predictions.height());
    if let Some(loss) = output.test_loss {
        println!("Average test loss: {loss:.4}");
    }
    if let Some(path) = output.output_path {
        println!("Predictions saved to {}", path.display());
    }
    Ok(())
}
