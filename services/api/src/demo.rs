use crate::infra::{
    seed_default_admin, InMemoryInterestStore, InMemoryOpeningStore, InMemorySelectionStore,
    InMemoryUserStore,
};
use clap::Args;
use placement_cell::error::AppError;
use placement_cell::portal::domain::{CgpaCriterion, StudentRecord, UserId};
use placement_cell::portal::repository::UserStore;
use placement_cell::portal::{OpeningDraft, PortalServices};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Graduating batch used for the demo cohort (defaults to 2025)
    #[arg(long)]
    pub(crate) batch: Option<String>,
    /// Skip the selection/placement portion of the demo
    #[arg(long)]
    pub(crate) skip_selections: bool,
}

type DemoServices = PortalServices<
    InMemoryUserStore,
    InMemoryOpeningStore,
    InMemorySelectionStore,
    InMemoryInterestStore,
>;

fn demo_student(id: &str, name: &str, branch: &str, batch: &str, cgpa: f64) -> StudentRecord {
    StudentRecord {
        id: UserId(id.to_string()),
        name: name.to_string(),
        email: format!("{id}@students.example.edu"),
        enrolment_no: format!("0801-{id}"),
        branch: branch.to_string(),
        batch: batch.to_string(),
        cgpa,
        is_admin: false,
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let batch = args.batch.unwrap_or_else(|| "2025".to_string());

    let users = Arc::new(InMemoryUserStore::default());
    let openings = Arc::new(InMemoryOpeningStore::default());
    let selections = Arc::new(InMemorySelectionStore::default());
    let interests = Arc::new(InMemoryInterestStore::default());

    let admin = match seed_default_admin(users.as_ref()) {
        Ok(admin) => admin,
        Err(err) => {
            println!("Could not seed the admin account: {err}");
            return Ok(());
        }
    };

    for student in [
        demo_student("s001", "Ishaan Rao", "CSE", &batch, 8.4),
        demo_student("s002", "Meera Pillai", "CSE", &batch, 6.9),
        demo_student("s003", "Rohan Gupta", "ECE", &batch, 7.8),
    ] {
        if let Err(err) = users.insert(student) {
            println!("Could not seed demo student: {err}");
            return Ok(());
        }
    }

    let services: Arc<DemoServices> = Arc::new(PortalServices::new(
        users,
        openings,
        selections,
        interests,
    ));

    println!("Placement portal demo (batch {batch})");
    println!("Signed-in admin: {} <{}>", admin.name, admin.email);

    let globex = match services.openings.add_opening(
        &admin.id,
        OpeningDraft {
            company_name: "Globex".to_string(),
            offer_type: "Full Time".to_string(),
            batch: batch.clone(),
            branches_allowed: vec!["CSE".to_string(), "ECE".to_string()],
            cgpa_criteria: vec![CgpaCriterion {
                branch: "CSE".to_string(),
                minimum_cgpa: "7.5".to_string(),
            }],
            application_deadline: None,
            test_date: None,
            additional_info: "On-campus drive".to_string(),
        },
    ) {
        Ok(record) => record,
        Err(err) => {
            println!("Could not post the Globex opening: {err}");
            return Ok(());
        }
    };
    let initech = match services.openings.add_opening(
        &admin.id,
        OpeningDraft {
            company_name: "Initech".to_string(),
            offer_type: "Internship".to_string(),
            batch: batch.clone(),
            branches_allowed: vec!["CSE".to_string()],
            cgpa_criteria: Vec::new(),
            application_deadline: None,
            test_date: None,
            additional_info: String::new(),
        },
    ) {
        Ok(record) => record,
        Err(err) => {
            println!("Could not post the Initech opening: {err}");
            return Ok(());
        }
    };
    println!(
        "\nPosted openings: {} ({}) and {} ({})",
        globex.company_name, globex.id.0, initech.company_name, initech.id.0
    );

    println!("\nStudents declare interest in {}", globex.company_name);
    let declarations = [
        ("s001", true, None),
        ("s002", true, None),
        ("s003", false, Some("Preparing for higher studies".to_string())),
    ];
    for (student, is_interested, reason) in declarations {
        let user_id = UserId(student.to_string());
        match services
            .interest
            .express_interest(&user_id, &globex.id.0, is_interested, reason)
        {
            Ok(ack) => println!(
                "- {student}: interested={is_interested} eligible={} -> {}",
                ack.verdict.is_eligible, ack.message
            ),
            Err(err) => println!("- {student}: rejected -> {err}"),
        }
    }

    match services
        .interest
        .opening_statistics(&admin.id, &globex.id.0)
    {
        Ok(statistics) => {
            println!("\nStatistics for {}", globex.company_name);
            println!("- interested: {}", statistics.total_interested);
            println!("- not interested: {}", statistics.total_not_interested);
            println!(
                "- eligible and interested: {}",
                statistics.eligible_and_interested
            );
            for user in &statistics.interested_users {
                println!(
                    "  - {} ({}) {} / {}",
                    user.name, user.enrolment_no, user.branch, user.batch
                );
            }
        }
        Err(err) => println!("Statistics unavailable: {err}"),
    }

    if args.skip_selections {
        return Ok(());
    }

    println!("\nPlacement round: {} hires Ishaan Rao", globex.company_name);
    if let Err(err) =
        services
            .selections
            .add_selections(&admin.id, &globex.id.0, &["0801-s001".to_string()])
    {
        println!("Could not record the selection: {err}");
        return Ok(());
    }

    match services.interest.express_interest(
        &UserId("s001".to_string()),
        &initech.id.0,
        true,
        None,
    ) {
        Ok(_) => println!("Unexpected: a placed student recorded new interest"),
        Err(err) => println!("Ishaan tries {} next: {err}", initech.company_name),
    }

    match services.selections.list_selections() {
        Ok(views) => {
            println!("\nSelection board");
            for view in views {
                println!(
                    "- {} ({}) -> {} [{}]",
                    view.student.name,
                    view.student.enrolment_no,
                    view.company.company_name,
                    view.company.offer_type
                );
            }
        }
        Err(err) => println!("Selections unavailable: {err}"),
    }

    match services
        .selections
        .student_status(&admin.id, "0801-s002", Some(&globex.id.0))
    {
        Ok(status) => println!(
            "\nStatus check for {}: placed={} applied={}",
            status.student_name, status.is_placed, status.has_applied
        ),
        Err(err) => println!("Status check failed: {err}"),
    }

    Ok(())
}
