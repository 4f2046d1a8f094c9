//! ribokd-core
//!
//! - compiles per-model riboswitch prediction archives into one wide table.
//! - tokenizes nucleotide sequences into ML-ready tensors.
//! - saves/loads training checkpoints and runs test-set inference.
//!
mod checkpoint;
mod compile;
mod dataset;
mod inference;
mod model;
mod schedule;
mod table;
mod tokenizer;

pub use checkpoint::{load_checkpoint, save_checkpoint, Checkpoint, CheckpointMeta};
pub use compile::{compile_z_metadata, discover_archives, ModelColumns, DEFAULT_METADATA_COLS};
pub use dataset::{RnaDataset, Sample, LABEL_COLUMNS};
pub use inference::{
    mse_criterion, run_inference, Criterion, InferenceOptions, InferenceOutput, LIG_PRED_COLUMN,
    NOLIG_PRED_COLUMN, TEST_LOSS_COLUMN,
};
pub use model::{AffinityModel, LogKd, LogKdConfig};
pub use schedule::CosineSchedule;
pub use table::{read_json_table, write_json_table};
pub use tokenizer::RnaTokenizer;
