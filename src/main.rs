// Entrypoint for the CLI application.
// Keeps `main` small: parse arguments and hand them to the UI flow, which
// reports partial progress before any error reaches here.

use clap::Parser;
use optionbank_cli::{config::Args, ui};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    ui::run(args)
}
