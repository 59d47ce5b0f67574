use std::process;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use releaser::cli::orchestration::{self, Dependencies};
use releaser::cli::Cli;
use releaser::ui;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "releaser=debug"
    } else {
        "releaser=warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let project_root =
        std::env::current_dir().context("cannot determine the working directory")?;
    let deps = Dependencies::for_project(project_root, cli.config.as_deref());

    if let Err(e) = orchestration::run(&cli, &deps) {
        ui::display_error(&e.to_string());
        process::exit(1);
    }
    Ok(())
}
