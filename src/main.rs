//! sba - Skyblock asset host command-line tool

use std::process::ExitCode;

use skyblock_assets::cli;

fn main() -> ExitCode {
    cli::run()
}
