//! Figure generation using plotters.
//!
//! Each figure renders through one generic draw path and is emitted per
//! requested output format (SVG and/or PNG).
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use plotters::coord::Shift;
use plotters::prelude::*;

/// Output image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Svg,
    Png,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Svg => "svg",
            Format::Png => "png",
        }
    }
}

/// Styling for the side-by-side logKd histograms.
pub struct HistogramStyle {
    pub width: u32,
    pub height: u32,
    pub bins: usize,
    pub lig_color: RGBColor,
    pub nolig_color: RGBColor,
}

impl Default for HistogramStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 500,
            bins: 30,
            // #2E86AB and #A23B72
            lig_color: RGBColor(0x2e, 0x86, 0xab),
            nolig_color: RGBColor(0xa2, 0x3b, 0x72),
        }
    }
}

/// Styling for the train/val loss-history plot.
pub struct LossCurveStyle {
    pub width: u32,
    pub height: u32,
    pub train_color: RGBColor,
    pub val_color: RGBColor,
}

impl Default for LossCurveStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 500,
            train_color: BLUE,
            val_color: RED,
        }
    }
}

/// Plot side-by-side histograms of ligand-bound and ligand-free logKd values.
///
/// Writes `out_base` with one extension per requested format and returns the
/// paths written.
pub fn logkd_histograms(
    lig: &[f64],
    nolig: &[f64],
    style: &HistogramStyle,
    out_base: &Path,
    formats: &[Format],
) -> Result<Vec<PathBuf>> {
    let size = (style.width, style.height);
    let mut written = Vec::with_capacity(formats.len());
    for format in formats {
        let path = out_base.with_extension(format.extension());
        match format {
            Format::Svg => {
                let root = SVGBackend::new(&path, size).into_drawing_area();
                draw_histograms(&root, lig, nolig, style)?;
            }
            Format::Png => {
                let root = BitMapBackend::new(&path, size).into_drawing_area();
                draw_histograms(&root, lig, nolig, style)?;
            }
        }
        written.push(path);
    }
    Ok(written)
}

/// Plot training and validation loss histories as line series.
pub fn loss_curves(
    train: &[f64],
    val: &[f64],
    style: &LossCurveStyle,
    out_base: &Path,
    formats: &[Format],
) -> Result<Vec<PathBuf>> {
    let size = (style.width, style.height);
    let mut written = Vec::with_capacity(formats.len());
    for format in formats {
        let path = out_base.with_extension(format.extension());
        match format {
            Format::Svg => {
                let root = SVGBackend::new(&path, size).into_drawing_area();
                draw_loss_curves(&root, train, val, style)?;
            }
            Format::Png => {
                let root = BitMapBackend::new(&path, size).into_drawing_area();
                draw_loss_curves(&root, train, val, style)?;
            }
        }
        written.push(path);
    }
    Ok(written)
}

fn draw_histograms<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    lig: &[f64],
    nolig: &[f64],
    style: &HistogramStyle,
) -> Result<()> {
    root.fill(&WHITE).map_err(|e| anyhow!("{e}"))?;
    if lig.is_empty() && nolig.is_empty() {
        root.draw(&Text::new(
            "No logKd data",
            (20, 20),
            ("sans-serif", 20).into_font().color(&BLACK),
        ))
        .map_err(|e| anyhow!("{e}"))?;
        root.present().map_err(|e| anyhow!("{e}"))?;
        return Ok(());
    }

    let panels = root.split_evenly((1, 2));
    draw_one_histogram(&panels[0], lig, style.lig_color, "log(Kd) lig", style.bins)?;
    draw_one_histogram(
        &panels[1],
        nolig,
        style.nolig_color,
        "log(Kd) no_lig",
        style.bins,
    )?;
    root.present().map_err(|e| anyhow!("{e}"))?;
    Ok(())
}

fn draw_one_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    values: &[f64],
    color: RGBColor,
    label: &str,
    bins: usize,
) -> Result<()> {
    let (min, bin_width, counts) = bin_counts(values, bins);
    let max_count = counts.iter().copied().max().unwrap_or(0) as f64;
    let max = min + bin_width * bins as f64;

    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(min..max, 0.0..max_count * 1.1 + 1.0)
        .map_err(|e| anyhow!("{e}"))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(label)
        .y_desc("Frequency")
        .draw()
        .map_err(|e| anyhow!("{e}"))?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, &count)| {
            let x0 = min + i as f64 * bin_width;
            Rectangle::new(
                [(x0, 0.0), (x0 + bin_width, count as f64)],
                color.filled(),
            )
        }))
        .map_err(|e| anyhow!("{e}"))?;
    Ok(())
}

fn draw_loss_curves<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    train: &[f64],
    val: &[f64],
    style: &LossCurveStyle,
) -> Result<()> {
    root.fill(&WHITE).map_err(|e| anyhow!("{e}"))?;
    if train.is_empty() && val.is_empty() {
        root.draw(&Text::new(
            "No loss history",
            (20, 20),
            ("sans-serif", 20).into_font().color(&BLACK),
        ))
        .map_err(|e| anyhow!("{e}"))?;
        root.present().map_err(|e| anyhow!("{e}"))?;
        return Ok(());
    }

    let epochs = train.len().max(val.len()).max(2) as f64;
    let (min, max) = train
        .iter()
        .chain(val.iter())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let pad = ((max - min) * 0.1).max(1e-6);

    let mut chart = ChartBuilder::on(root)
        .caption("Training history", ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(1.0..epochs, (min - pad)..(max + pad))
        .map_err(|e| anyhow!("{e}"))?;

    chart
        .configure_mesh()
        .x_desc("Epoch")
        .y_desc("Loss")
        .draw()
        .map_err(|e| anyhow!("{e}"))?;

    for (values, color, name) in [
        (train, style.train_color, "train"),
        (val, style.val_color, "val"),
    ] {
        if values.is_empty() {
            continue;
        }
        chart
            .draw_series(LineSeries::new(
                values
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| ((i + 1) as f64, v)),
                &color,
            ))
            .map_err(|e| anyhow!("{e}"))?
            .label(name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .draw()
        .map_err(|e| anyhow!("{e}"))?;
    root.present().map_err(|e| anyhow!("{e}"))?;
    Ok(())
}

/// Bin values into equal-width buckets; returns (min, bin width, counts).
fn bin_counts(values: &[f64], bins: usize) -> (f64, f64, Vec<u32>) {
    let bins = bins.max(1);
    let (mut min, mut max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if values.is_empty() {
        return (0.0, 1.0, vec![0; bins]);
    }
    if min == max {
        min -= 0.5;
        max += 0.5;
    }
    let width = (max - min) / bins as f64;
    let mut counts = vec![0u32; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    (min, width, counts)
}
