use clap::Parser;
use peakscreen::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
