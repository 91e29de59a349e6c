use crate::batch::{run_export, run_report, ExportArgs, ReportArgs};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use test_prioritizer::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Test Prioritizer",
    about = "Score manual tests and rank them as automation candidates",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Render a priority report from a test CSV
    Report(ReportArgs),
    /// Re-score a test CSV and write it back in rank order
    Export(ExportArgs),
    /// Score a built-in sample set and print its report
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args),
        Command::Export(args) => run_export(args),
        Command::Demo(args) => run_demo(args),
    }
}
