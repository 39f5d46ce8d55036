//! Bundle builder CLI.
//!
//! Reads model and station CSVs and writes `summary.json` and
//! `timeseries.json` under the data root for each region.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use bundle_builder::BuildArgs;

fn main() -> Result<()> {
    let args = BuildArgs::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let generated = bundle_builder::run(&args).context("Bundle generation failed")?;
    for path in &generated {
        println!("Wrote {}", path.display());
    }
    println!("Generated {} bundle file(s)", generated.len());
    Ok(())
}
