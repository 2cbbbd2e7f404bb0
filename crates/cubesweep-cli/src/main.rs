//! cubesweep CLI entry point

mod cli;

fn main() {
    cli::run();
}
