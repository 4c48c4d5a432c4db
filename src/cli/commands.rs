// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `describe`, and all
// their flags. Defaults mirror ExperimentConfig::default().

use clap::{Args, Subcommand};

use crate::application::{
    describe_use_case::DescribeConfig,
    train_use_case::{ExperimentConfig, NUMBER_OF_CLASSES},
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the classifier on a `sequence<TAB>label` file
    Train(TrainArgs),

    /// Build the model and print its measured shapes and parameter counts
    Describe(DescribeArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Training samples, one `sequence<TAB>label` per line
    #[arg(long, required_unless_present = "config")]
    pub train_file: Option<String>,

    /// Separate validation file
    #[arg(long, conflicts_with = "val_fraction")]
    pub val_file: Option<String>,

    /// Hold out this share of the training file for validation
    #[arg(long, default_value_t = 0.0)]
    pub val_fraction: f64,

    /// Test file; precision / recall / F1 are reported after training
    #[arg(long)]
    pub test_file: Option<String>,

    /// Class treated as positive in the test metrics
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub positive_label: u8,

    /// Sequences are truncated or padded to this many tokens
    #[arg(long, default_value_t = 200)]
    pub input_len: usize,

    #[arg(long, default_value_t = 32)]
    pub embedding_dim: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Seed for the validation split and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Receives run_config.json, metrics.csv and test_report.json
    #[arg(long, default_value = "runs/latest")]
    pub output_dir: String,

    /// Load every setting from a JSON ExperimentConfig instead
    #[arg(long)]
    pub config: Option<String>,
}

/// Convert CLI TrainArgs into the application-layer ExperimentConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for ExperimentConfig {
    fn from(a: TrainArgs) -> Self {
        ExperimentConfig {
            train_file:     a.train_file.unwrap_or_default(),
            val_file:       a.val_file,
            val_fraction:   a.val_fraction,
            test_file:      a.test_file,
            positive_label: a.positive_label,
            input_len:      a.input_len,
            embedding_dim:  a.embedding_dim,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            seed:           a.seed,
            output_dir:     a.output_dir,
        }
    }
}

/// All arguments for the `describe` command
#[derive(Args, Debug)]
pub struct DescribeArgs {
    #[arg(long, default_value_t = 200)]
    pub input_len: usize,

    #[arg(long, default_value_t = 32)]
    pub embedding_dim: usize,

    /// Defaults to the DNA vocabulary (<pad> A C G T N)
    #[arg(long)]
    pub vocab_size: Option<usize>,

    #[arg(long, default_value_t = NUMBER_OF_CLASSES)]
    pub number_of_classes: usize,
}

impl From<DescribeArgs> for DescribeConfig {
    fn from(a: DescribeArgs) -> Self {
        DescribeConfig {
            number_of_classes: a.number_of_classes,
            vocab_size:        a.vocab_size,
            embedding_dim:     a.embedding_dim,
            input_len:         a.input_len,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("genomic-cnn").chain(args.iter().copied()))
    }

    #[test]
    fn test_train_flags_map_to_config() {
        let cli = parse(&["train", "--train-file", "a.tsv", "--epochs", "3", "--positive-label", "0"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };

        let cfg = ExperimentConfig::from(args);
        assert_eq!(cfg.train_file, "a.tsv");
        assert_eq!(cfg.epochs, 3);
        assert_eq!(cfg.positive_label, 0);
        assert_eq!(cfg.input_len, ExperimentConfig::default().input_len);
    }

    #[test]
    fn test_train_requires_a_source() {
        assert!(parse(&["train"]).is_err());
        assert!(parse(&["train", "--config", "run.json"]).is_ok());
        assert!(parse(&["train", "--train-file", "a.tsv", "--positive-label", "2"]).is_err());
        assert!(parse(&[
            "train", "--train-file", "a.tsv", "--val-file", "v.tsv", "--val-fraction", "0.2",
        ])
        .is_err());
    }

    #[test]
    fn test_describe_defaults() {
        let cli = parse(&["describe"]).unwrap();
        let Commands::Describe(args) = cli.command else { panic!("expected describe") };

        let cfg = DescribeConfig::from(args);
        assert_eq!(cfg.number_of_classes, 2);
        assert_eq!(cfg.vocab_size, None);
    }
}
