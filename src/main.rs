use anyhow::{Context, Result};
use clap::Parser;
use rr::budget::HostBudget;
use rr::cli::Cli;
use rr::config::Config;
use rr::supervisor::SystemExecutor;
use rr::{listfile, randomize, runner};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = Config::from_cli(&args, &HostBudget::new(args.margin))?;

    // positional arguments first, then list files in the order given
    let mut tokens = args.args;
    listfile::extend_from_lists(&mut tokens, &args.list)
        .context("Failed to load argument lists")?;

    let mut rng = randomize::entropy_rng();
    let exit = runner::run(
        tokens,
        &config,
        &mut rng,
        &mut SystemExecutor,
        std::io::stdout().lock(),
    )?;
    exit.terminate()
}
