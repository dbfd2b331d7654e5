use crate::infra::{parse_locale, seeded_store, LoggingMailDispatcher};
use chrono::Utc;
use clap::Args;
use hireboard::config::HiringConfig;
use hireboard::error::AppError;
use hireboard::workflows::hiring::{
    messages, Actor, ApplicationRecord, Decision, EmployeeDirectory, EmployeeId,
    HiringWorkflowService, Locale, MemoryHiringStore, PositionId, TransitionOutcome,
    WorkflowError,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Locale used for messages and decision mails (en or id).
    #[arg(long, value_parser = parse_locale)]
    pub(crate) locale: Option<Locale>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let locale = args.locale.unwrap_or_default();
    let config = HiringConfig {
        locale,
        ..HiringConfig::default()
    };

    let store = Arc::new(seeded_store(Utc::now()));
    let mail = Arc::new(LoggingMailDispatcher::default());
    let service = HiringWorkflowService::from_config(store.clone(), mail.clone(), &config);

    let ayu = Actor::job_seeker("user-ayu");
    let budi = Actor::job_seeker("user-budi");
    let hr = Actor::hr("user-hr-nusantara", "nusantara");
    let admin = Actor::admin("user-admin");
    let backend = PositionId("backend-engineer".to_string());

    println!("Application workflow demo");

    println!("\n1. Ayu applies to Backend Engineer");
    let application = service.apply(&ayu, &backend)?;
    print_record(&application);

    println!("\n2. Ayu applies again before review");
    report_failure(service.apply(&ayu, &backend), locale);

    println!("\n3. HR accepts Ayu's application");
    let outcome = service.transition(&hr, &application.id, Decision::Accepted)?;
    print_outcome(&outcome, locale);
    print_affiliation(&store, "emp-ayu")?;

    println!("\n4. Budi is accepted at Rimba, then rejected for QA Analyst at Nusantara");
    let at_rimba = service.apply(&budi, &PositionId("fleet-planner".to_string()))?;
    service.transition(&admin, &at_rimba.id, Decision::Accepted)?;
    print_affiliation(&store, "emp-budi")?;
    let at_nusantara = service.apply(&budi, &PositionId("qa-analyst".to_string()))?;
    let outcome = service.transition(&hr, &at_nusantara.id, Decision::Rejected)?;
    print_outcome(&outcome, locale);
    print_affiliation(&store, "emp-budi")?;
    println!("  note: rejection clears the affiliation even though the Rimba acceptance stands");

    println!("\n5. Ayu applies to the closed Data Engineer posting");
    report_failure(
        service.apply(&ayu, &PositionId("data-engineer".to_string())),
        locale,
    );

    println!("\n6. Admin deletes Ayu's accepted application");
    let removed = service.delete(&admin, &application.id)?;
    println!("  - removed {}", removed.id.0);
    print_affiliation(&store, "emp-ayu")?;

    println!("\nMail outbox");
    for message in mail.sent() {
        println!("  - to {} | {}", message.to, message.subject);
    }

    Ok(())
}

fn print_record(record: &ApplicationRecord) {
    println!(
        "  - {} | employee {} | position {} | {} | applied {}",
        record.id.0,
        record.employee_id.0,
        record.position_id.0,
        record.applying_status.label(),
        record.apply_date.format("%Y-%m-%d %H:%M")
    );
}

fn print_outcome(outcome: &TransitionOutcome, locale: Locale) {
    print_record(outcome.application());
    let message = if outcome.notification_delivered() {
        messages::transition_saved_message(locale)
    } else {
        messages::notification_failed_message(locale)
    };
    println!("  {message}");
}

fn report_failure(result: Result<ApplicationRecord, WorkflowError>, locale: Locale) {
    match result {
        Ok(record) => print_record(&record),
        Err(err) => println!(
            "  refused [{}]: {}",
            err.kind().code(),
            messages::failure_message(err.kind(), locale)
        ),
    }
}

fn print_affiliation(store: &MemoryHiringStore, employee: &str) -> Result<(), AppError> {
    let affiliation = store
        .find_employee(&EmployeeId(employee.to_string()))
        .map_err(WorkflowError::from)?
        .and_then(|employee| employee.company_id)
        .map(|company| company.0)
        .unwrap_or_else(|| "none".to_string());
    println!("  affiliation of {employee}: {affiliation}");
    Ok(())
}
