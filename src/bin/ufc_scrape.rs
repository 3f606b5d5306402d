// src/bin/ufc_scrape.rs
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};

use ufc_scrape::{cli::{self, Cli}, core::HttpClient, log};

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();
    log::init(args.log_file.as_deref()).wrap_err("could not set up logging")?;

    let net = HttpClient::new()?;
    let summary = cli::run(&args, &net)
        .wrap_err_with(|| format!("{} scrape failed", args.source.dir_name()))?;

    tracing::info!(
        mode = ?summary.mode,
        new_rows = summary.new_rows,
        total_rows = summary.total_rows,
        fetch_failures = summary.fetch_failures,
        assemble_failures = summary.assemble_failures,
        written = ?summary.written,
        "done"
    );
    Ok(())
}
