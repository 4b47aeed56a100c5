//! Provides the main entry point to the program.
use autodengue::cli::run_cli;
use human_panic::setup_panic;

fn main() -> anyhow::Result<()> {
    setup_panic!();

    run_cli()
}
