//! cellgrid - Cell Grid Formula Engine
//!
//! Command-line shell over the grid and expression engine. Sheets are stored
//! as XML; expressions are evaluated with optional variable bindings.

use clap::Parser;
use cellgrid::presentation::{execute_command, Cli};
use std::io;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    let mut stdout = io::stdout().lock();
    if let Err(e) = execute_command(&cli, &mut stdout) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Installs a stderr subscriber whose level follows the `-d` count.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(filter);

    tracing_subscriber::registry().with(fmt_layer).init();
    tracing::debug!(?filter, "logging initialised");
}
