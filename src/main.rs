use clap::Parser;
use scaneq::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
