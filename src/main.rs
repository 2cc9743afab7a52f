// The binary only parses arguments and installs logging; every exercise
// lives in the library (src/exercises/).
mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("nn_exercises=info")),
        )
        .with_target(false)
        .init();

    Cli::parse().run()
}
