use std::path::Path;

use anyhow::{Context, Result};
use candle_core::Device;
use polars::prelude::*;
use ribokd_core::{load_checkpoint, read_json_table};
use ribokd_plot::{logkd_histograms, loss_curves, Format, HistogramStyle, LossCurveStyle};

const FORMATS: [Format; 2] = [Format::Svg, Format::Png];

pub fn histograms(input: &Path, output: &Path, bins: usize) -> Result<()> {
    let df = read_json_table(input)?;
    let lig = column_values(&df, "logkd_lig")?;
    let nolig = column_values(&df, "logkd_nolig")?;

    let style = HistogramStyle {
        bins,
        ..Default::default()
    };
    for path in logkd_histograms(&lig, &nolig, &style, output, &FORMATS)? {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

pub fn losses(checkpoint: &Path, output: &Path) -> Result<()> {
    let ckpt = load_checkpoint(checkpoint, &Device::Cpu)?;
    let style = LossCurveStyle::default();
    for path in loss_curves(
        &ckpt.meta.train_losses,
        &ckpt.meta.val_losses,
        &style,
        output,
        &FORMATS,
    )? {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    Ok(df
        .column(name)
        .with_context(|| format!("Input table has no {name} column"))?
        .cast(&DataType::Float64)?
        .f64()?
        .into_no_null_iter()
        .collect())
}
