use crate::infra::{build_service, InMemoryTestRepository};
use chrono::Local;
use clap::{Args, ValueEnum};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use test_prioritizer::config::AppConfig;
use test_prioritizer::error::AppError;
use test_prioritizer::telemetry;
use test_prioritizer::workflows::prioritization::PrioritizationService;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum ReportFormat {
    #[default]
    Text,
    Html,
    Markdown,
    Json,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Test CSV to score
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Output format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub(crate) format: ReportFormat,
    /// Write the report here instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Test CSV to score
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Destination for the ranked CSV
    #[arg(long)]
    pub(crate) output: PathBuf,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let service = load_from_csv(&args.input)?;
    let rendered = render(&service, args.format)?;
    write_output(args.output.as_deref(), &rendered)
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let service = load_from_csv(&args.input)?;
    let mut writer = BufWriter::new(File::create(&args.output)?);
    let exported = service.export_csv(&mut writer)?;
    writer.flush()?;
    info!(exported, path = %args.output.display(), "ranked csv written");
    Ok(())
}

fn load_from_csv(path: &Path) -> Result<PrioritizationService<InMemoryTestRepository>, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, config.environment)?;

    let service = build_service(&config.prioritization)?;
    let reader = BufReader::new(File::open(path)?);
    let imported = service.import_csv(reader, true)?;
    info!(imported, path = %path.display(), "tests loaded from csv");
    Ok(service)
}

pub(crate) fn render(
    service: &PrioritizationService<InMemoryTestRepository>,
    format: ReportFormat,
) -> Result<String, AppError> {
    let generated_at = Local::now().naive_local();
    let rendered = match format {
        ReportFormat::Text => service.report_text(generated_at)?,
        ReportFormat::Html => service.report_html(generated_at)?,
        ReportFormat::Markdown => service.report_markdown(generated_at)?,
        ReportFormat::Json => {
            let summary = service.report()?.summary();
            serde_json::to_string_pretty(&summary).map_err(std::io::Error::from)?
        }
    };
    Ok(rendered)
}

fn write_output(output: Option<&Path>, rendered: &str) -> Result<(), AppError> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            info!(path = %path.display(), bytes = rendered.len(), "report written");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
