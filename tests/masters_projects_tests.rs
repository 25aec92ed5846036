mod common;
use common::{actor, add_project, add_user, log_minutes, memory_pool, seed_june};
use rworklog::core::master::MasterLogic;
use rworklog::core::project::ProjectLogic;
use rworklog::errors::AppError;
use rworklog::models::master::{MasterKind, MasterPatch, NewMasterRecord};
use rworklog::models::page::PageRequest;
use rworklog::models::project::{NewProject, ProjectFilter, ProjectPatch};
use rworklog::utils::date::today;

#[test]
fn test_duplicate_management_no_conflicts() {
    let mut pool = memory_pool();
    let admin = actor(&add_user(&mut pool, "admin", true));
    add_project(&mut pool, &admin, "DUP-1", "");

    let err = ProjectLogic::create(&mut pool, &admin, NewProject::with_management_no("DUP-1"))
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let other = add_project(&mut pool, &admin, "DUP-2", "");
    let rename = ProjectPatch {
        management_no: Some("DUP-1".into()),
        ..ProjectPatch::default()
    };
    let err = ProjectLogic::update(&mut pool, &admin, other, &rename).unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[test]
fn test_project_validation() {
    let mut pool = memory_pool();
    let admin = actor(&add_user(&mut pool, "admin", true));

    let blank = ProjectLogic::create(&mut pool, &admin, NewProject::with_management_no("  "));
    assert!(matches!(blank.unwrap_err(), AppError::Validation(_)));

    let negative = NewProject {
        estimated_hours: Some(-1),
        ..NewProject::with_management_no("NEG-1")
    };
    let err = ProjectLogic::create(&mut pool, &admin, negative).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn test_any_user_may_maintain_projects() {
    let mut pool = memory_pool();
    let worker = actor(&add_user(&mut pool, "worker", false));

    let id = add_project(&mut pool, &worker, "OPEN-1", "M-1");
    let patch = ProjectPatch {
        tonnage: Some("350t".into()),
        ..ProjectPatch::default()
    };
    let view = ProjectLogic::update(&mut pool, &worker, id, &patch).unwrap();
    assert_eq!(view.project.tonnage.as_deref(), Some("350t"));
    assert_eq!(view.project.created_by, Some(worker.user_id));
}

#[test]
fn test_master_reference_must_match_kind() {
    let mut pool = memory_pool();
    let admin = actor(&add_user(&mut pool, "admin", true));
    let category = MasterLogic::create(
        &mut pool,
        &admin,
        MasterKind::WorkCategory,
        &NewMasterRecord::named("Design"),
    )
    .unwrap();

    let wrong = NewProject {
        progress_id: Some(category.id),
        ..NewProject::with_management_no("REF-1")
    };
    let err = ProjectLogic::create(&mut pool, &admin, wrong).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let missing = NewProject {
        inquiry_id: Some(4040),
        ..NewProject::with_management_no("REF-2")
    };
    let err = ProjectLogic::create(&mut pool, &admin, missing).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let right = NewProject {
        work_category_id: Some(category.id),
        ..NewProject::with_management_no("REF-3")
    };
    let view = ProjectLogic::create(&mut pool, &admin, right).unwrap();
    assert_eq!(view.work_category_name.as_deref(), Some("Design"));
}

#[test]
fn test_progress_triggers_fill_dates() {
    let mut pool = memory_pool();
    let admin = actor(&add_user(&mut pool, "admin", true));

    let started = MasterLogic::create(
        &mut pool,
        &admin,
        MasterKind::Progress,
        &NewMasterRecord {
            start_date_trigger: true,
            ..NewMasterRecord::named("In progress")
        },
    )
    .unwrap();
    let done = MasterLogic::create(
        &mut pool,
        &admin,
        MasterKind::Progress,
        &NewMasterRecord {
            completion_trigger: true,
            ..NewMasterRecord::named("Done")
        },
    )
    .unwrap();

    let plain = add_project(&mut pool, &admin, "TRG-1", "");
    let view = ProjectLogic::get(&mut pool, plain).unwrap();
    assert!(view.project.start_date.is_none());

    let to_started = ProjectPatch {
        progress_id: Some(started.id),
        ..ProjectPatch::default()
    };
    let view = ProjectLogic::update(&mut pool, &admin, plain, &to_started).unwrap();
    assert_eq!(view.project.start_date, Some(today()));
    assert!(view.project.completion_date.is_none());
    assert_eq!(view.progress_name.as_deref(), Some("In progress"));

    let to_done = ProjectPatch {
        progress_id: Some(done.id),
        ..ProjectPatch::default()
    };
    let view = ProjectLogic::update(&mut pool, &admin, plain, &to_done).unwrap();
    assert_eq!(view.project.completion_date, Some(today()));

    // created straight into a triggering status
    let direct = NewProject {
        progress_id: Some(started.id),
        ..NewProject::with_management_no("TRG-2")
    };
    let view = ProjectLogic::create(&mut pool, &admin, direct).unwrap();
    assert_eq!(view.project.start_date, Some(today()));
}

#[test]
fn test_soft_delete_keeps_history() {
    let mut pool = memory_pool();
    let june = seed_june(&mut pool);

    ProjectLogic::delete(&mut pool, &june.alice, june.project_id).unwrap();

    let active = ProjectLogic::list(&mut pool, &ProjectFilter::default(), PageRequest::default())
        .unwrap();
    assert_eq!(active.total, 0);

    let all = ProjectFilter {
        include_inactive: true,
        ..ProjectFilter::default()
    };
    let page = ProjectLogic::list(&mut pool, &all, PageRequest::default()).unwrap();
    assert_eq!(page.total, 1);
    assert!(!page.items[0].project.is_active);
    assert_eq!(page.items[0].actual_hours, 180);

    let view = ProjectLogic::get(&mut pool, june.project_id).unwrap();
    assert!(!view.project.is_active);

    assert!(matches!(
        ProjectLogic::delete(&mut pool, &june.alice, 555).unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[test]
fn test_project_list_filters() {
    let mut pool = memory_pool();
    let admin = actor(&add_user(&mut pool, "admin", true));
    for (no, machine) in [("NEX-001", "M-1"), ("NEX-002", "M-2"), ("OLD-900", "X-1")] {
        add_project(&mut pool, &admin, no, machine);
    }

    let nex = ProjectFilter {
        management_no: Some("NEX".into()),
        ..ProjectFilter::default()
    };
    let page = ProjectLogic::list(&mut pool, &nex, PageRequest::default()).unwrap();
    assert_eq!(page.total, 2);
    // newest first
    assert_eq!(page.items[0].project.management_no, "NEX-002");

    let machine = ProjectFilter {
        machine_no: Some("X-".into()),
        ..ProjectFilter::default()
    };
    let page = ProjectLogic::list(&mut pool, &machine, PageRequest::default()).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].project.management_no, "OLD-900");
}

#[test]
fn test_actual_hours_is_derived() {
    let mut pool = memory_pool();
    let admin = actor(&add_user(&mut pool, "admin", true));
    let p = add_project(&mut pool, &admin, "ACT-1", "");
    assert_eq!(ProjectLogic::get(&mut pool, p).unwrap().actual_hours, 0);

    log_minutes(&mut pool, &admin, p, "2024-01-10", 50);
    log_minutes(&mut pool, &admin, p, "2024-02-10", 70);
    assert_eq!(ProjectLogic::get(&mut pool, p).unwrap().actual_hours, 120);
}

#[test]
fn test_master_mutations_require_admin() {
    let mut pool = memory_pool();
    let admin = actor(&add_user(&mut pool, "admin", true));
    let worker = actor(&add_user(&mut pool, "worker", false));

    let err = MasterLogic::create(
        &mut pool,
        &worker,
        MasterKind::Inquiry,
        &NewMasterRecord::named("Waiting"),
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Permission(_)));

    let rec = MasterLogic::create(
        &mut pool,
        &admin,
        MasterKind::Inquiry,
        &NewMasterRecord::named("Waiting"),
    )
    .unwrap();

    let patch = MasterPatch {
        name: Some("Answered".into()),
        ..MasterPatch::default()
    };
    assert!(matches!(
        MasterLogic::update(&mut pool, &worker, MasterKind::Inquiry, rec.id, &patch).unwrap_err(),
        AppError::Permission(_)
    ));
    assert!(matches!(
        MasterLogic::delete(&mut pool, &worker, MasterKind::Inquiry, rec.id).unwrap_err(),
        AppError::Permission(_)
    ));

    let renamed =
        MasterLogic::update(&mut pool, &admin, MasterKind::Inquiry, rec.id, &patch).unwrap();
    assert_eq!(renamed.name, "Answered");
}

#[test]
fn test_master_validation() {
    let mut pool = memory_pool();
    let admin = actor(&add_user(&mut pool, "admin", true));

    let bad_color = NewMasterRecord {
        color: Some("red".into()),
        ..NewMasterRecord::named("Urgent")
    };
    let err = MasterLogic::create(&mut pool, &admin, MasterKind::Progress, &bad_color).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let trigger_on_category = NewMasterRecord {
        start_date_trigger: true,
        ..NewMasterRecord::named("Assembly")
    };
    let err = MasterLogic::create(&mut pool, &admin, MasterKind::WorkCategory, &trigger_on_category)
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let good = NewMasterRecord {
        color: Some("#1A2b3C".into()),
        ..NewMasterRecord::named("Urgent")
    };
    MasterLogic::create(&mut pool, &admin, MasterKind::Progress, &good).unwrap();
}

#[test]
fn test_master_names_unique_per_kind() {
    let mut pool = memory_pool();
    let admin = actor(&add_user(&mut pool, "admin", true));
    let name = NewMasterRecord::named("Standard");

    MasterLogic::create(&mut pool, &admin, MasterKind::WorkCategory, &name).unwrap();
    let err = MasterLogic::create(&mut pool, &admin, MasterKind::WorkCategory, &name).unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    MasterLogic::create(&mut pool, &admin, MasterKind::MachineSeries, &name).unwrap();
}

#[test]
fn test_master_delete_deactivates() {
    let mut pool = memory_pool();
    let admin = actor(&add_user(&mut pool, "admin", true));

    let first = MasterLogic::create(
        &mut pool,
        &admin,
        MasterKind::MachineSeries,
        &NewMasterRecord {
            sort_order: 2,
            display_name: Some("NEX Series".into()),
            ..NewMasterRecord::named("NEX")
        },
    )
    .unwrap();
    MasterLogic::create(
        &mut pool,
        &admin,
        MasterKind::MachineSeries,
        &NewMasterRecord {
            sort_order: 1,
            ..NewMasterRecord::named("TX")
        },
    )
    .unwrap();

    let listed = MasterLogic::list(&mut pool, MasterKind::MachineSeries, false).unwrap();
    let names: Vec<&str> = listed.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["TX", "NEX"]);

    MasterLogic::delete(&mut pool, &admin, MasterKind::MachineSeries, first.id).unwrap();

    let active = MasterLogic::list(&mut pool, MasterKind::MachineSeries, false).unwrap();
    assert_eq!(active.len(), 1);
    let all = MasterLogic::list(&mut pool, MasterKind::MachineSeries, true).unwrap();
    assert_eq!(all.len(), 2);

    let kept = MasterLogic::get(&mut pool, MasterKind::MachineSeries, first.id).unwrap();
    assert!(!kept.is_active);
    assert_eq!(kept.display_name.as_deref(), Some("NEX Series"));
}

#[test]
fn test_master_lookup_is_scoped_by_kind() {
    let mut pool = memory_pool();
    let admin = actor(&add_user(&mut pool, "admin", true));
    let rec = MasterLogic::create(
        &mut pool,
        &admin,
        MasterKind::Progress,
        &NewMasterRecord::named("Planned"),
    )
    .unwrap();

    let err = MasterLogic::get(&mut pool, MasterKind::Inquiry, rec.id).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn test_master_kind_slugs() {
    for kind in MasterKind::ALL {
        assert_eq!(MasterKind::from_slug(kind.slug()), Some(kind));
        assert_eq!(MasterKind::from_db_str(kind.to_db_str()), Some(kind));
    }
    assert_eq!(MasterKind::from_slug("shinchoku"), Some(MasterKind::Progress));
    assert_eq!(MasterKind::from_slug("unknown"), None);
}
