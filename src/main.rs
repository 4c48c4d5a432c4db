use anyhow::Result;
use clap::Parser;
use genomic_cnn::cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("genomic_cnn=info".parse()?),
        )
        .init();

    Cli::parse().run()
}
