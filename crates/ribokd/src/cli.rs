use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands;

#[derive(Parser)]
#[command(name = "ribokd", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile per-model *_Z.json.zip prediction archives into one wide table.
    Compile {
        /// Directory containing _Z.json.zip files.
        data_directory: PathBuf,
        /// Output JSON filename.
        #[arg(long, default_value = "compiled_Z_metadata.json")]
        output: PathBuf,
        /// Metadata columns to keep from the first archive (comma separated).
        #[arg(long, value_delimiter = ',')]
        metadata_cols: Option<Vec<String>>,
    },
    /// Run test-set inference from a checkpoint and save predictions.
    Predict {
        /// Path to the checkpoint file.
        #[arg(long)]
        checkpoint: PathBuf,
        /// JSON test table with sequence and scaled logKd label columns.
        #[arg(long)]
        test_data: PathBuf,
        /// Directory for predictions (default: the checkpoint's directory).
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[arg(long, default_value_t = 1)]
        batch_size: usize,
        /// Also compute the mean-squared-error test loss against the labels.
        #[arg(long)]
        with_loss: bool,
    },
    /// Render figures from compiled tables or checkpoints.
    #[command(subcommand)]
    Plot(PlotCommands),
}

#[derive(Subcommand)]
enum PlotCommands {
    /// Side-by-side histograms of the logkd_lig / logkd_nolig columns.
    Histograms {
        /// JSON table containing logkd_lig and logkd_nolig columns.
        #[arg(long)]
        input: PathBuf,
        /// Output path base; .svg and .png are written next to it.
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = 30)]
        bins: usize,
    },
    /// Train/val loss-history curves from a checkpoint.
    Losses {
        #[arg(long)]
        checkpoint: PathBuf,
        /// Output path base; .svg and .png are written next to it.
        #[arg(long)]
        output: PathBuf,
    },
}

impl Cli {
    pub fn execute(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Compile {
                data_directory,
                output,
                metadata_cols,
            } => commands::compile::execute(&data_directory, &output, metadata_cols),
            Commands::Predict {
                checkpoint,
                test_data,
                output_dir,
                batch_size,
                with_loss,
            } => commands::predict::execute(&checkpoint, &test_data, output_dir, batch_size, with_loss),
            Commands::Plot(PlotCommands::Histograms {
                input,
                output,
                bins,
            }) => commands::plot::histograms(&input, &output, bins),
            Commands::Plot(PlotCommands::Losses { checkpoint, output }) => {
                commands::plot::losses(&checkpoint, &output)
            }
        }
    }
}
