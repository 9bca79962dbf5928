#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `gsd`: collects IDL data from GSD ion implanter log files into one CSV.
//!
//! Every value not given as a flag is prompted for interactively, so the
//! tool can be run without arguments. Uses `indicatif-log-bridge` (via
//! [`gsd_cli_utils::init_logger`]) so log lines and the progress bar never
//! fight for the terminal.

mod interactive;

use std::path::PathBuf;

use clap::Parser;
use gsd_batch::discover::scan_directory;
use gsd_batch::output::{failure_list_path, validate_output_name, write_csv, write_failure_list};
use gsd_batch::run_batch;
use gsd_cli_utils::IndicatifProgress;
use gsd_idl::Extractor;
use gsd_idl::config::FieldSpecs;

#[derive(Parser)]
#[command(name = "gsd", about = "GSD implanter log parser")]
struct Cli {
    /// Directory containing the GSD log files (prompted when omitted)
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Output CSV name without extension, e.g. `output2` writes `output2.csv`
    #[arg(long)]
    output: Option<String>,
    /// TOML capture settings with `scalar_fields` / `table_fields` lists.
    /// Without it, `gsd_config_01.txt` / `gsd_config_02.txt` in the current
    /// directory are used when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Start the extraction without asking for confirmation
    #[arg(long)]
    yes: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = gsd_cli_utils::init_logger();
    let cli = Cli::parse();

    interactive::print_banner();

    let specs = match &cli.config {
        Some(path) => FieldSpecs::from_toml_file(path)?,
        None => FieldSpecs::discover(&std::env::current_dir()?)?,
    };
    let extractor = Extractor::new(&specs)?;

    let dir = match cli.dir {
        Some(dir) => dir,
        None => interactive::ask_for_directory()?,
    };

    let discovery = scan_directory(&dir)?;
    interactive::print_discovery(&discovery);
    if discovery.reports.is_empty() {
        return Ok(());
    }

    let output = match cli.output {
        Some(name) => validate_output_name(&name, &dir)?,
        None => interactive::ask_for_output_name(&dir)?,
    };

    if !cli.yes && !interactive::confirm_proceed()? {
        println!("Extraction aborted");
        return Ok(());
    }

    log::info!(
        "Extracting {} file(s) from {} into {output}",
        discovery.reports.len(),
        dir.display()
    );

    let progress = IndicatifProgress::files_bar(&multi, "Extracting");
    let outcome = run_batch(&dir, &discovery.reports, &extractor, &progress);

    println!();
    println!("EXTRACTION COMPLETED");
    println!();

    let csv_path = dir.join(&output);
    if outcome.records.is_empty() {
        println!("None of the IDL files could be extracted.");
    } else {
        let rows = write_csv(&csv_path, &outcome.records)?;
        println!("Wrote {rows} row(s) to {}", csv_path.display());
    }

    if !outcome.failures.is_empty() {
        let failed_path = failure_list_path(&csv_path);
        write_failure_list(&failed_path, &outcome.failures)?;
        interactive::print_failures(&outcome.failures, &failed_path);
    }

    println!("{}", outcome.summary());

    Ok(())
}
