//! Integration tests for request-level workout actions.

use chrono::{NaiveDate, TimeZone, Utc};
use lifttrack::actions::{
    self, ActionOutcome, EditDefaults, EditPage, Rejection, WorkoutForm,
};
use lifttrack::{Database, UserId, WorkoutAccess};
use uuid::Uuid;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_create_requires_user() {
    let db = Database::open_in_memory().unwrap();
    let access = WorkoutAccess::utc(&db);
    let form = WorkoutForm::new(Some("Leg Day"), "2024-03-01T09:00:00Z");

    let outcome = actions::create_workout(&access, None, &form).unwrap();

    assert_eq!(outcome, ActionOutcome::Rejected(Rejection::Unauthorized));
    assert_eq!(db.count_workouts(&UserId::new("anyone")).unwrap(), 0);
}

#[test]
fn test_validation_runs_before_authentication() {
    let db = Database::open_in_memory().unwrap();
    let access = WorkoutAccess::utc(&db);
    let form = WorkoutForm::new(None, "not a date");

    let outcome = actions::create_workout(&access, None, &form).unwrap();

    match outcome.rejection() {
        Some(Rejection::Invalid(errors)) => {
            assert_eq!(errors.field("startedAt").len(), 1);
        }
        other => panic!("Expected validation rejection, got {:?}", other),
    }
}

#[test]
fn test_create_normalizes_empty_name() {
    let db = Database::open_in_memory().unwrap();
    let access = WorkoutAccess::utc(&db);
    let user = UserId::new("user_1");
    let form = WorkoutForm::new(Some(""), "2024-03-01T09:00:00Z");

    let workout = actions::create_workout(&access, Some(&user), &form)
        .unwrap()
        .success()
        .expect("Create should succeed");

    assert!(workout.name.is_none());
    assert_eq!(
        workout.started_at,
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    );
}

#[test]
fn test_update_through_action() {
    let db = Database::open_in_memory().unwrap();
    let access = WorkoutAccess::utc(&db);
    let user = UserId::new("user_1");

    let created = actions::create_workout(
        &access,
        Some(&user),
        &WorkoutForm::new(Some("Push"), "2024-03-01T09:00:00Z"),
    )
    .unwrap()
    .success()
    .unwrap();

    let outcome = actions::update_workout(
        &access,
        Some(&user),
        &created.id.to_string(),
        &WorkoutForm::new(None, "2024-03-01T11:30:00Z"),
    )
    .unwrap();
    assert_eq!(outcome, ActionOutcome::Success(true));

    let fetched = access
        .get_workout_by_id_for_user(&user, &created.id)
        .unwrap()
        .unwrap();
    // Absent name leaves the stored one alone
    assert_eq!(fetched.name.as_deref(), Some("Push"));
    assert_eq!(
        fetched.started_at,
        Utc.with_ymd_and_hms(2024, 3, 1, 11, 30, 0).unwrap()
    );
}

#[test]
fn test_update_foreign_or_malformed_id_is_noop() {
    let db = Database::open_in_memory().unwrap();
    let access = WorkoutAccess::utc(&db);
    let owner = UserId::new("U1");
    let intruder = UserId::new("U2");

    let created = actions::create_workout(
        &access,
        Some(&owner),
        &WorkoutForm::new(Some("Leg Day"), "2024-03-01T09:00:00Z"),
    )
    .unwrap()
    .success()
    .unwrap();

    let form = WorkoutForm::new(Some("hack"), "2024-03-01T09:00:00Z");
    let foreign =
        actions::update_workout(&access, Some(&intruder), &created.id.to_string(), &form).unwrap();
    assert_eq!(foreign, ActionOutcome::Success(false));

    let malformed = actions::update_workout(&access, Some(&owner), "not-a-uuid", &form).unwrap();
    assert_eq!(malformed, ActionOutcome::Success(false));

    let fetched = access
        .get_workout_by_id_for_user(&owner, &created.id)
        .unwrap()
        .unwrap();
    assert_eq!(fetched.name.as_deref(), Some("Leg Day"));
}

#[test]
fn test_update_requires_user() {
    let db = Database::open_in_memory().unwrap();
    let access = WorkoutAccess::utc(&db);
    let form = WorkoutForm::new(Some("x"), "2024-03-01T09:00:00Z");

    let outcome =
        actions::update_workout(&access, None, &Uuid::new_v4().to_string(), &form).unwrap();
    assert_eq!(outcome, ActionOutcome::Rejected(Rejection::Unauthorized));
}

#[test]
fn test_edit_page_states() {
    let db = Database::open_in_memory().unwrap();
    let access = WorkoutAccess::utc(&db);
    let owner = UserId::new("U1");

    let named = actions::create_workout(
        &access,
        Some(&owner),
        &WorkoutForm::new(Some("Leg Day"), "2024-03-01T09:05:42Z"),
    )
    .unwrap()
    .success()
    .unwrap();
    let id = named.id.to_string();

    assert_eq!(
        actions::load_edit_page(&access, None, &id).unwrap(),
        EditPage::Unauthorized
    );
    assert_eq!(
        actions::load_edit_page(&access, Some(&UserId::new("U2")), &id).unwrap(),
        EditPage::NotFound
    );
    assert_eq!(
        actions::load_edit_page(&access, Some(&owner), "garbage").unwrap(),
        EditPage::NotFound
    );

    match actions::load_edit_page(&access, Some(&owner), &id).unwrap() {
        EditPage::Found { workout, defaults } => {
            assert_eq!(workout, named);
            assert_eq!(
                defaults,
                EditDefaults {
                    name: "Leg Day".to_string(),
                    started_at: "2024-03-01T09:05".to_string(),
                }
            );
        }
        other => panic!("Expected workout, got {:?}", other),
    }
}

#[test]
fn test_edit_defaults_for_unnamed_workout() {
    let db = Database::open_in_memory().unwrap();
    let access = WorkoutAccess::utc(&db);
    let owner = UserId::new("U1");

    let unnamed = actions::create_workout(
        &access,
        Some(&owner),
        &WorkoutForm::new(None, "2024-03-01T09:00:00Z"),
    )
    .unwrap()
    .success()
    .unwrap();

    match actions::load_edit_page(&access, Some(&owner), &unnamed.id.to_string()).unwrap() {
        EditPage::Found { workout, defaults } => {
            assert_eq!(defaults.name, "");
            assert_eq!(workout.title(), "Untitled Workout");
        }
        other => panic!("Expected workout, got {:?}", other),
    }
}

#[test]
fn test_dashboard_selects_date_and_sorts() {
    let db = Database::open_in_memory().unwrap();
    let access = WorkoutAccess::utc(&db);
    let user = UserId::new("U1");

    for (name, started) in [
        ("Evening", "2024-03-01T19:00:00Z"),
        ("Morning", "2024-03-01T07:00:00Z"),
        ("Tomorrow", "2024-03-02T07:00:00Z"),
    ] {
        actions::create_workout(&access, Some(&user), &WorkoutForm::new(Some(name), started))
            .unwrap();
    }

    let dashboard = actions::load_dashboard(
        &access,
        Some(&user),
        Some("2024-03-01"),
        ymd(2030, 1, 1),
    )
    .unwrap()
    .success()
    .unwrap();

    assert_eq!(dashboard.date, ymd(2024, 3, 1));
    assert_eq!(dashboard.display_date(), "1st Mar 2024");
    let names: Vec<&str> = dashboard.workouts.iter().map(|w| w.title()).collect();
    assert_eq!(names, vec!["Morning", "Evening"]);
}

#[test]
fn test_dashboard_falls_back_to_today() {
    let db = Database::open_in_memory().unwrap();
    let access = WorkoutAccess::utc(&db);
    let user = UserId::new("U1");

    actions::create_workout(
        &access,
        Some(&user),
        &WorkoutForm::new(Some("Today"), "2024-03-02T12:00:00Z"),
    )
    .unwrap();

    for param in [None, Some("02/03/2024")] {
        let dashboard = actions::load_dashboard(&access, Some(&user), param, ymd(2024, 3, 2))
            .unwrap()
            .success()
            .unwrap();
        assert_eq!(dashboard.date, ymd(2024, 3, 2));
        assert_eq!(dashboard.workouts.len(), 1);
    }
}

#[test]
fn test_dashboard_requires_user() {
    let db = Database::open_in_memory().unwrap();
    let access = WorkoutAccess::utc(&db);

    let outcome = actions::load_dashboard(&access, None, None, ymd(2024, 3, 2)).unwrap();
    assert!(!outcome.is_success());
    assert_eq!(outcome.rejection(), Some(&Rejection::Unauthorized));
}

#[test]
fn test_dashboard_echoes_date_param() {
    let db = Database::open_in_memory().unwrap();
    let access = WorkoutAccess::utc(&db);
    let user = UserId::new("U1");

    let selected = actions::load_dashboard(&access, Some(&user), Some(" 2024-03-01 "), ymd(2030, 1, 1))
        .unwrap()
        .success()
        .unwrap();
    assert_eq!(selected.date_param(), "2024-03-01");

    let fallback = actions::load_dashboard(&access, Some(&user), Some("-262143-01-01"), ymd(2024, 3, 2))
        .unwrap()
        .success()
        .unwrap();
    assert_eq!(fallback.date_param(), "2024-03-02");
    assert!(fallback.workouts.is_empty());
}
