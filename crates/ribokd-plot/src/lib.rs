//! ribokd-plot
//!
//! Presentation-only figure generation for compiled logKd tables and training
//! loss histories. All styling is passed per call through explicit config
//! structs; nothing mutates process-wide state.
mod figures;

pub use figures::{logkd_histograms, loss_curves, Format, HistogramStyle, LossCurveStyle};
