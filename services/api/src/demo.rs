use crate::infra::InMemoryIntakeStore;
use crate::server::spawn_local;
use chrono::NaiveDate;
use clap::Args;
use dorm_intake::config::AppConfig;
use dorm_intake::error::AppError;
use dorm_intake::telemetry;
use dorm_intake::workflows::facility::{ReportField, ReportOutcome, SingleShotReport};
use dorm_intake::workflows::form::{FieldValue, Notification};
use dorm_intake::workflows::intake::{
    schema_for, AdvanceOutcome, Field, FormWizard, Section, SubmissionOutcome,
};
use dorm_intake::workflows::presentation::Presentation;
use dorm_intake::workflows::submission::{HttpSubmissionClient, SubmissionClient};
use std::sync::Arc;
use std::time::Instant;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Backend to submit to. Defaults to an in-process backend on a loopback port.
    #[arg(long)]
    pub(crate) backend_url: Option<String>,
    /// Student identifier used by the scripted applicant.
    #[arg(long, default_value = "st-2024-0042")]
    pub(crate) student_id: String,
    /// Render with the dark theme flag set.
    #[arg(long)]
    pub(crate) dark_mode: bool,
    /// Fire timers immediately instead of waiting out their delays.
    #[arg(long)]
    pub(crate) no_wait: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Dormitory block, e.g. "C"
    #[arg(long)]
    pub(crate) block: String,
    /// Room number
    #[arg(long)]
    pub(crate) room: String,
    /// What is wrong
    #[arg(long)]
    pub(crate) description: String,
    /// Optional issue category (plumbing, electrical, ...)
    #[arg(long)]
    pub(crate) category: Option<String>,
    /// Backend to submit to. Defaults to INTAKE_BACKEND_URL.
    #[arg(long)]
    pub(crate) backend_url: Option<String>,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        backend_url,
        student_id,
        dark_mode,
        no_wait,
    } = args;

    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let local_store = match backend_url {
        Some(url) => {
            config.backend.base_url = url;
            None
        }
        None => {
            let store = Arc::new(InMemoryIntakeStore::default());
            let addr = spawn_local(store.clone()).await?;
            config.backend.base_url = format!("http://{addr}");
            Some(store)
        }
    };
    let client = Arc::new(HttpSubmissionClient::new(&config.backend)?);
    let presentation = Presentation::english(dark_mode);

    println!("Dormitory application intake demo");
    println!("- Backend: {}", client.base_url());

    let mut wizard = FormWizard::new(client.clone(), presentation.clone(), config.timings);
    match wizard.load_existing(&student_id, Instant::now()).await {
        Ok(Some(reference)) => println!(
            "- Existing application {} found (editable: {}); submitting will update it",
            reference.record_id, reference.editable
        ),
        Ok(None) => println!("- No prior application for {student_id}; a new one will be created"),
        Err(err) => println!("- Lookup unavailable: {err}"),
    }

    println!("\nFirst attempt: continue with an empty personal section");
    if let AdvanceOutcome::Blocked(missing) = wizard.advance(Instant::now())? {
        println!("  Blocked on {}", missing.label);
    }
    print_notification("  ", wizard.notification());
    wizard.dismiss_notification();

    println!("\nFilling each section and continuing");
    for section in Section::ordered() {
        for spec in schema_for(section).fields {
            wizard.set_field(spec.field, demo_value(spec.field, &student_id))?;
        }
        match wizard.advance(Instant::now())? {
            AdvanceOutcome::Moved(next) => {
                println!("  {} complete -> {}", section.label(), next.label())
            }
            AdvanceOutcome::AwaitingConfirmation => {
                println!("  {} complete -> confirmation", section.label())
            }
            AdvanceOutcome::Blocked(missing) => {
                println!("  {} blocked on {}", section.label(), missing.label);
                return Ok(());
            }
        }
    }

    let outcome = wizard.confirm_submit().await?;
    report_submission(&outcome, wizard.notification());
    match serde_json::to_string_pretty(&wizard.view()) {
        Ok(json) => println!("  Wizard view:\n{json}"),
        Err(err) => println!("  Wizard view unavailable: {err}"),
    }

    settle_timers(&mut wizard, no_wait).await;
    println!(
        "  After timers: phase {}, draft empty: {}",
        wizard.phase(),
        wizard.draft().is_empty()
    );

    println!("\nSecond attempt with the same student id and no lookup");
    let mut repeat = FormWizard::new(client.clone(), presentation.clone(), config.timings);
    for section in Section::ordered() {
        for spec in schema_for(section).required_fields() {
            repeat.set_field(spec.field, demo_value(spec.field, &student_id))?;
        }
        repeat.advance(Instant::now())?;
    }
    let outcome = repeat.confirm_submit().await?;
    report_submission(&outcome, repeat.notification());
    repeat.teardown();

    println!("\nReturning applicant: lookup first, then update");
    let mut returning = FormWizard::new(client.clone(), presentation.clone(), config.timings);
    if let Some(reference) = returning.load_existing(&student_id, Instant::now()).await? {
        println!("  Found record {}", reference.record_id);
        returning.set_field(Field::Phone, "+90 555 010 4455")?;
        for _ in Section::ordered() {
            returning.advance(Instant::now())?;
        }
        let outcome = returning.confirm_submit().await?;
        report_submission(&outcome, returning.notification());
    }
    settle_timers(&mut returning, no_wait).await;

    println!("\nFacility issue report");
    let mut report = SingleShotReport::new(client, presentation, config.timings);
    report.set_field(ReportField::Block, "C");
    report.set_field(ReportField::Room, "214");
    report.set_field(ReportField::Description, "Radiator leaks onto the floor");
    let outcome = report.submit(Instant::now()).await;
    print_report_outcome(&outcome);
    print_notification("  ", report.notification());
    report.teardown();

    if let Some(store) = local_store {
        println!(
            "\nLocal backend now holds {} application(s) and {} facility request(s)",
            store.application_count(),
            store.requests().len()
        );
    }

    Ok(())
}

pub(crate) async fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        block,
        room,
        description,
        category,
        backend_url,
    } = args;

    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    if let Some(url) = backend_url {
        config.backend.base_url = url;
    }

    let client = Arc::new(HttpSubmissionClient::new(&config.backend)?);
    let mut report = SingleShotReport::new(client, Presentation::english(false), config.timings);
    report.set_field(ReportField::Block, block);
    report.set_field(ReportField::Room, room);
    report.set_field(ReportField::Description, description);
    if let Some(category) = category {
        report.set_field(ReportField::Category, category);
    }

    let outcome = report.submit(Instant::now()).await;
    print_report_outcome(&outcome);
    print_notification("", report.notification());
    report.teardown();
    Ok(())
}

fn report_submission(outcome: &SubmissionOutcome, notification: Option<&Notification>) {
    match outcome {
        SubmissionOutcome::Accepted(receipt) => println!(
            "  Submission accepted: {:?} record {}",
            receipt.action, receipt.record_id
        ),
        SubmissionOutcome::Failed(err) => println!("  Submission failed: {err}"),
    }
    print_notification("  ", notification);
}

fn print_report_outcome(outcome: &ReportOutcome) {
    match outcome {
        ReportOutcome::Blocked(missing) => println!("Report blocked on {}", missing.label),
        ReportOutcome::Submitted {
            record_id: Some(id),
        } => println!("Report filed as {id}"),
        ReportOutcome::Submitted { record_id: None } => {
            println!("Report acknowledged; the backend did not store it (see logs)")
        }
    }
}

fn print_notification(indent: &str, notification: Option<&Notification>) {
    if let Some(notification) = notification {
        println!(
            "{indent}[{:?}] {}",
            notification.kind, notification.message
        );
    }
}

/// Run every pending timer, sleeping until each deadline unless `no_wait`.
async fn settle_timers<C>(wizard: &mut FormWizard<C>, no_wait: bool)
where
    C: SubmissionClient + ?Sized,
{
    while let Some(deadline) = wizard.next_deadline() {
        if no_wait {
            wizard.tick(deadline);
        } else {
            tokio::time::sleep_until(deadline.into()).await;
            wizard.tick(Instant::now());
        }
    }
}

fn demo_value(field: Field, student_id: &str) -> FieldValue {
    match field {
        Field::StudentId => student_id.into(),
        Field::DateOfBirth => demo_date(2005, 3, 14),
        Field::EnrollmentDate => demo_date(2024, 9, 16),
        other => demo_text(other).into(),
    }
}

fn demo_date(year: i32, month: u32, day: u32) -> FieldValue {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(FieldValue::from)
        .unwrap_or_else(|| format!("{year:04}-{month:02}-{day:02}").into())
}

fn demo_text(field: Field) -> &'static str {
    match field {
        Field::FullName => "Leyla Aksoy",
        Field::Email => "leyla.aksoy@student.example.edu",
        Field::Phone => "+90 555 010 2030",
        Field::Gender => "female",
        Field::Nationality => "Turkish",
        Field::Address | Field::FamilyAddress => "12 Harbor Street, Izmir",
        Field::Faculty => "Engineering",
        Field::Department => "Computer Engineering",
        Field::ProgramLevel => "undergraduate",
        Field::YearOfStudy => "2",
        Field::Gpa => "3.4",
        Field::SchoolName => "Karsiyaka Science High School",
        Field::SchoolCity => "Izmir",
        Field::GraduationYear => "2023",
        Field::ExamScore => "452.1",
        Field::GuardianName => "Murat Aksoy",
        Field::GuardianRelationship => "father",
        Field::GuardianPhone => "+90 555 010 9999",
        Field::HouseholdSize => "4",
        Field::StudentId | Field::DateOfBirth | Field::EnrollmentDate => "",
    }
}
