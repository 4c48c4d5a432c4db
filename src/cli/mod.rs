// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2.
//
//   1. `train`    — trains, validates and optionally tests
//   2. `describe` — builds the model and prints its shapes

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, DescribeArgs, TrainArgs};

use crate::application::{
    describe_use_case::DescribeUseCase,
    train_use_case::{ExperimentConfig, TrainUseCase},
};

#[derive(Parser, Debug)]
#[command(
    name = "genomic-cnn",
    version,
    about = "Train a convolutional binary classifier on nucleotide sequences."
)]
pub struct Cli {
    /// The subcommand to run (train or describe)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route the subcommand to its use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Describe(args) => run_describe(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            tracing::info!("Reading run configuration from '{}'", path);
            ExperimentConfig::from_file(path)?
        }
        None => args.into(),
    };
    tracing::info!("Starting training on '{}'", config.train_file);

    let output_dir = config.output_dir.clone();
    let summary = TrainUseCase::new(config).execute()?;

    if let Some(report) = &summary.test {
        println!("Test accuracy: {:.4}, F1: {:.4}", report.accuracy, report.f1);
    }
    println!("Training complete. Results written to '{output_dir}'.");
    Ok(())
}

fn run_describe(args: DescribeArgs) -> Result<()> {
    let summary = DescribeUseCase::new(args.into()).execute()?;

    println!("input_len:       {}", summary.input_len);
    println!("vocab_size:      {}", summary.vocab_size);
    println!("flattened width: {}", summary.flattened_width);
    println!();
    for (name, count) in &summary.parameters {
        println!("  {name:<16} {count:>10}");
    }
    println!();
    println!("total parameters: {}", summary.total_params);
    Ok(())
}
