use super::common::{admin, fixture, opening, student, Fixture};
use crate::portal::domain::UserId;
use crate::portal::repository::{OpeningStore, SelectionStore, UserStore};
use crate::portal::service::PortalError;

fn seeded() -> Fixture {
    let fx = fixture();
    fx.users.insert(admin("adm-1")).expect("seed admin");
    fx.users
        .insert(student("u-1", "CSE", "2023", 8.0))
        .expect("seed user");
    fx.users
        .insert(student("u-2", "ECE", "2023", 7.2))
        .expect("seed user");
    fx.openings
        .insert(opening("op-1", "Globex", "2023", &["CSE", "ECE"], &[]))
        .expect("seed opening");
    fx.openings
        .insert(opening("op-2", "Initech", "2023", &["CSE"], &[]))
        .expect("seed opening");
    fx
}

fn acting() -> UserId {
    UserId("adm-1".to_string())
}

#[test]
fn admin_records_selections_by_enrolment_number() {
    let fx = seeded();
    let inserted = fx
        .services
        .selections
        .add_selections(
            &acting(),
            "op-1",
            &["EN-u-1".to_string(), "EN-u-2".to_string()],
        )
        .expect("selections added");

    assert_eq!(inserted, 2);
    assert!(fx
        .selections
        .find_for_student(&UserId("u-1".to_string()))
        .expect("lookup")
        .is_some());
}

#[test]
fn a_student_cannot_be_placed_twice() {
    let fx = seeded();
    fx.services
        .selections
        .add_selections(&acting(), "op-1", &["EN-u-1".to_string()])
        .expect("first placement");

    match fx
        .services
        .selections
        .add_selections(&acting(), "op-2", &["EN-u-1".to_string()])
    {
        Err(PortalError::AlreadyPlaced { reason }) => {
            assert!(reason.contains("EN-u-1"));
        }
        other => panic!("expected placement conflict, got {other:?}"),
    }
}

#[test]
fn unknown_enrolment_aborts_before_any_write() {
    let fx = seeded();
    match fx.services.selections.add_selections(
        &acting(),
        "op-1",
        &["EN-u-1".to_string(), "EN-ghost".to_string()],
    ) {
        Err(PortalError::UnknownEnrolment(enrolment)) => {
            assert_eq!(enrolment, "EN-ghost");
        }
        other => panic!("expected unknown enrolment, got {other:?}"),
    }
    // The resolvable student was not placed either.
    assert!(fx
        .selections
        .find_for_student(&UserId("u-1".to_string()))
        .expect("lookup")
        .is_none());
}

#[test]
fn blank_enrolment_numbers_are_rejected() {
    let fx = seeded();
    match fx
        .services
        .selections
        .add_selections(&acting(), "op-1", &["".to_string()])
    {
        Err(PortalError::Validation(message)) => {
            assert!(message.contains("Enrolment No"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    match fx.services.selections.add_selections(&acting(), "op-1", &[]) {
        Err(PortalError::Validation(_)) => {}
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn selection_mutations_require_an_admin() {
    let fx = seeded();
    match fx.services.selections.add_selections(
        &UserId("u-1".to_string()),
        "op-1",
        &["EN-u-2".to_string()],
    ) {
        Err(PortalError::Forbidden(_)) => {}
        other => panic!("expected forbidden, got {other:?}"),
    }
}

#[test]
fn listing_joins_students_and_companies_newest_first() {
    let fx = seeded();
    fx.services
        .selections
        .add_selections(&acting(), "op-1", &["EN-u-1".to_string()])
        .expect("first placement");
    fx.services
        .selections
        .add_selections(&acting(), "op-2", &["EN-u-2".to_string()])
        .expect("second placement");

    let views = fx.services.selections.list_selections().expect("list");
    assert_eq!(views.len(), 2);
    assert!(views[0].updated_at >= views[1].updated_at);
    let companies: Vec<&str> = views
        .iter()
        .map(|view| view.company.company_name.as_str())
        .collect();
    assert!(companies.contains(&"Globex"));
    assert!(companies.contains(&"Initech"));
    assert!(views
        .iter()
        .any(|view| view.student.enrolment_no == "EN-u-1"));
}

#[test]
fn delete_revokes_a_placement() {
    let fx = seeded();
    fx.services
        .selections
        .add_selections(&acting(), "op-1", &["EN-u-1".to_string()])
        .expect("placement");
    let views = fx.services.selections.list_selections().expect("list");
    let id = views[0].id.0.clone();

    fx.services
        .selections
        .delete_selection(&acting(), &id)
        .expect("revoked");
    assert!(fx
        .selections
        .find_for_student(&UserId("u-1".to_string()))
        .expect("lookup")
        .is_none());

    match fx.services.selections.delete_selection(&acting(), &id) {
        Err(PortalError::SelectionNotFound) => {}
        other => panic!("expected selection not found, got {other:?}"),
    }
}

#[test]
fn student_status_reports_placement_and_application() {
    let fx = seeded();
    fx.services
        .interest
        .express_interest(&UserId("u-1".to_string()), "op-1", true, None)
        .expect("interest");
    fx.services
        .selections
        .add_selections(&acting(), "op-2", &["EN-u-2".to_string()])
        .expect("placement");

    let applied = fx
        .services
        .selections
        .student_status(&acting(), "EN-u-1", Some("op-1"))
        .expect("status");
    assert!(!applied.is_placed);
    assert!(applied.has_applied);
    assert_eq!(applied.student_name, "Student u-1");

    let placed = fx
        .services
        .selections
        .student_status(&acting(), "EN-u-2", Some("op-1"))
        .expect("status");
    assert!(placed.is_placed);
    assert!(!placed.has_applied);

    match fx
        .services
        .selections
        .student_status(&acting(), "EN-ghost", None)
    {
        Err(PortalError::StudentNotFound) => {}
        other => panic!("expected student not found, got {other:?}"),
    }
}

#[test]
fn applied_and_shortlisted_split_by_opening() {
    let fx = seeded();
    fx.services
        .interest
        .express_interest(&UserId("u-1".to_string()), "op-1", true, None)
        .expect("interest");
    fx.services
        .selections
        .add_selections(&acting(), "op-1", &["EN-u-2".to_string()])
        .expect("placement");

    let result = fx
        .services
        .selections
        .applied_and_shortlisted(&acting(), "op-1")
        .expect("split");

    assert_eq!(result.applied.len(), 1);
    assert_eq!(result.applied[0].enrolment_no, "EN-u-1");
    assert_eq!(result.shortlisted.len(), 1);
    assert_eq!(result.shortlisted[0].enrolment_no, "EN-u-2");
}
