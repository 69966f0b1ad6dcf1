// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging, dispatch.
// - Returns `anyhow::Result` so any error is printed to stderr and the
//   process exits non-zero.

use clap::Parser;
use immich_planner::cli::{self, Cli};
use immich_planner::logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    cli::run(cli)
}
