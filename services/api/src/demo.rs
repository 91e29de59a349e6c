use crate::batch::{render, ReportFormat};
use crate::infra::build_service;
use clap::Args;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use test_prioritizer::config::AppConfig;
use test_prioritizer::error::AppError;
use test_prioritizer::telemetry;
use test_prioritizer::workflows::prioritization::{FactorRegistry, TestRecordDraft};
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Output format for the sample report
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub(crate) format: ReportFormat,
    /// Also write the sample set as a ranked CSV, ready for `report --input`
    #[arg(long)]
    pub(crate) write_csv: Option<PathBuf>,
}

struct SampleTest {
    ticket: &'static str,
    section: &'static str,
    name: &'static str,
    /// Reference catalog order: regression, impact, effort, complexity,
    /// framework, angular, repetitive.
    values: [u32; 7],
    automatable: bool,
}

const SAMPLES: &[SampleTest] = &[
    SampleTest {
        ticket: "QA-101",
        section: "Login",
        name: "Verify that user can log in with valid credentials",
        values: [5, 5, 5, 5, 5, 5, 5],
        automatable: true,
    },
    SampleTest {
        ticket: "QA-102",
        section: "Login",
        name: "Check if login fails with invalid password",
        values: [5, 5, 3, 5, 5, 3, 5],
        automatable: true,
    },
    SampleTest {
        ticket: "QA-117",
        section: "Login",
        name: "Ensure two-factor authentication works",
        values: [3, 5, 3, 1, 3, 3, 3],
        automatable: true,
    },
    SampleTest {
        ticket: "QA-204",
        section: "Checkout",
        name: "Validate user can complete purchase",
        values: [5, 5, 5, 3, 3, 5, 5],
        automatable: true,
    },
    SampleTest {
        ticket: "QA-211",
        section: "Checkout",
        name: "Confirm refund process functions correctly",
        values: [3, 3, 5, 3, 3, 1, 3],
        automatable: true,
    },
    SampleTest {
        ticket: "QA-215",
        section: "Checkout",
        name: "Test that invoice is generated correctly",
        values: [4, 5, 2, 1, 3, 0, 2],
        automatable: true,
    },
    SampleTest {
        ticket: "QA-302",
        section: "Cart",
        name: "Verify that cart total is calculated correctly",
        values: [5, 3, 3, 5, 5, 5, 5],
        automatable: true,
    },
    SampleTest {
        ticket: "QA-309",
        section: "Cart",
        name: "Check if cart abandonment email is triggered",
        values: [1, 3, 3, 1, 1, 1, 1],
        automatable: true,
    },
    SampleTest {
        ticket: "QA-405",
        section: "Reports",
        name: "Ensure report can be exported to PDF",
        values: [3, 3, 3, 3, 1, 1, 1],
        automatable: true,
    },
    SampleTest {
        ticket: "QA-412",
        section: "Reports",
        name: "Validate report comparison feature works",
        values: [1, 1, 1, 1, 1, 1, 1],
        automatable: true,
    },
    SampleTest {
        ticket: "QA-503",
        section: "Notifications",
        name: "Confirm push notifications work on mobile devices",
        values: [3, 5, 5, 1, 1, 1, 3],
        automatable: false,
    },
    SampleTest {
        ticket: "QA-511",
        section: "Notifications",
        name: "Test that notification sound settings work",
        values: [1, 1, 3, 1, 1, 1, 1],
        automatable: false,
    },
];

/// The built-in sample set as drafts against the reference catalog.
pub(crate) fn sample_drafts() -> Vec<TestRecordDraft> {
    let registry = FactorRegistry::reference();
    SAMPLES
        .iter()
        .map(|sample| TestRecordDraft {
            ticket_id: Some(sample.ticket.to_string()),
            name: sample.name.to_string(),
            section: Some(sample.section.to_string()),
            description: format!("{} regression check", sample.section),
            factor_values: registry
                .factors()
                .iter()
                .map(|factor| factor.key.clone())
                .zip(sample.values)
                .collect::<BTreeMap<_, _>>(),
            yesno_answers: BTreeMap::new(),
            automatable: sample.automatable,
        })
        .collect()
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, config.environment)?;

    // Sample values are expressed against the reference catalog.
    let mut prioritization = config.prioritization.clone();
    prioritization.factor_catalog = None;
    let service = build_service(&prioritization)?;

    for draft in sample_drafts() {
        service.add(draft)?;
    }

    println!("{}", render(&service, args.format)?);

    if let Some(path) = args.write_csv {
        let mut writer = BufWriter::new(File::create(&path)?);
        let exported = service.export_csv(&mut writer)?;
        writer.flush()?;
        info!(exported, path = %path.display(), "sample csv written");
    }

    Ok(())
}
