//! Terminal prompts and listings for the `gsd` binary.
//!
//! Uses `dialoguer` for input so invalid answers are re-prompted in place.

use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input};
use gsd_batch::FailedDocument;
use gsd_batch::discover::Discovery;
use gsd_batch::output::validate_output_name;

const BANNER: &str = r"
     __ __ _        _  __ _____    __    _  _  _  __ __ _
    /__(_ | \   |  / \/__|_  | |  |_    |_)|_||_)(_ |_ |_)
    \_|__)|_/   |__\_/\_||  _|_|__|__   |  | || \__)|__| |
";

pub fn print_banner() {
    println!("{BANNER}");
}

/// Prompts for the log directory. An empty answer (or `none`) selects the
/// current directory.
///
/// # Errors
///
/// Returns an error if the terminal prompt fails.
pub fn ask_for_directory() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let answer: String = Input::new()
        .with_prompt("Directory containing GSD log files (ENTER for current directory)")
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), &'static str> {
            let input = input.trim();
            if is_current_dir_answer(input) || Path::new(input).is_dir() {
                Ok(())
            } else {
                Err("Directory not accepted. Enter a valid directory or 'none' for the current one.")
            }
        })
        .interact_text()?;

    let answer = answer.trim();
    if is_current_dir_answer(answer) {
        Ok(std::env::current_dir()?)
    } else {
        Ok(PathBuf::from(answer))
    }
}

fn is_current_dir_answer(input: &str) -> bool {
    input.is_empty() || input.eq_ignore_ascii_case("none")
}

/// Prompts for an output name until it is valid, returning `<name>.csv`.
///
/// # Errors
///
/// Returns an error if the terminal prompt fails.
pub fn ask_for_output_name(dir: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let name: String = Input::new()
        .with_prompt("Output .csv file name (without extension)")
        .validate_with(|input: &String| validate_output_name(input, dir).map(|_| ()))
        .interact_text()?;

    println!("Output file name accepted");

    Ok(validate_output_name(&name, dir)?)
}

/// Asks whether to start the extraction.
///
/// # Errors
///
/// Returns an error if the terminal prompt fails.
pub fn confirm_proceed() -> Result<bool, dialoguer::Error> {
    Confirm::new()
        .with_prompt("Proceed with extraction?")
        .default(true)
        .interact()
}

/// Lists the report files found and the files dismissed by extension.
pub fn print_discovery(discovery: &Discovery) {
    if discovery.reports.is_empty() {
        println!("No valid IDL files found in directory.");
    } else {
        for name in &discovery.reports {
            println!("{name}");
        }
        println!();
        println!("{} IDL files have been found.", discovery.reports.len());
    }

    if !discovery.dismissed.is_empty() {
        println!();
        for name in &discovery.dismissed {
            println!("{name}");
        }
        println!();
        println!("{} non-IDL files dismissed.", discovery.dismissed.len());
    }
    println!();
}

pub fn print_failures(failures: &[FailedDocument], written_to: &Path) {
    println!();
    println!("The parser failed to extract {} file(s):", failures.len());
    println!();
    for failure in failures {
        println!("{:<24} {}", failure.file_name, failure.reason);
    }
    println!();
    println!("Failed file names written to {}", written_to.display());
}
