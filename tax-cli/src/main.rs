use std::io;

use clap::Parser;
use tracing::debug;

use tax_cli::cli::Cli;
use tax_cli::{commands, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.log_level.as_deref(), cli.log_file.as_deref())?;
    debug!(backend = %cli.backend, db = %cli.db, "starting");

    commands::run(cli, &mut io::stdout()).await
}
