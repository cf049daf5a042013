use std::process::ExitCode;

use clap::Parser;
use pagluz::api::{Cli, Command, render_report, run_http_server};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => {
            if let Err(e) = run_http_server(args.addr()).await {
                tracing::error!(error = %e, "server error");
                return ExitCode::FAILURE;
            }
        }
        Command::Simulate(args) => match render_report(args) {
            Ok(report) => print!("{report}"),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        },
    }
    ExitCode::SUCCESS
}
