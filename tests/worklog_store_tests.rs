mod common;
use chrono::NaiveTime;
use common::{actor, add_project, add_user, date, log_minutes, memory_pool, month, new_log, seed_june};
use rworklog::core::worklog::WorkLogLogic;
use rworklog::db::log::load_log;
use rworklog::errors::AppError;
use rworklog::models::page::PageRequest;
use rworklog::models::worklog::{NewWorkLog, WorkLogFilter, WorkLogPatch};

fn hm(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

#[test]
fn test_create_stores_owner_and_fields() {
    let mut pool = memory_pool();
    let june = seed_june(&mut pool);

    let input = NewWorkLog {
        start_time: Some(hm("09:00")),
        end_time: Some(hm("10:30")),
        work_content: Some("drawing check".into()),
        ..new_log(june.project_id, "2024-06-05", 90)
    };
    let wl = WorkLogLogic::create(&mut pool, &june.bob, input).unwrap();

    let stored = WorkLogLogic::get(&mut pool, wl.id).unwrap();
    assert_eq!(stored.user_id, june.bob.user_id);
    assert_eq!(stored.work_date, date("2024-06-05"));
    assert_eq!(stored.start_time, Some(hm("09:00")));
    assert_eq!(stored.end_time, Some(hm("10:30")));
    assert_eq!(stored.duration_minutes, 90);
    assert_eq!(stored.work_content.as_deref(), Some("drawing check"));
}

#[test]
fn test_out_of_range_duration_is_rejected() {
    let mut pool = memory_pool();
    let june = seed_june(&mut pool);

    for minutes in [0, -15, 24 * 60 + 1, i64::MAX / 2 + 1] {
        let err = WorkLogLogic::create(
            &mut pool,
            &june.alice,
            new_log(june.project_id, "2024-06-05", minutes),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

#[test]
fn test_end_must_follow_start() {
    let mut pool = memory_pool();
    let june = seed_june(&mut pool);

    let same = NewWorkLog {
        start_time: Some(hm("10:00")),
        end_time: Some(hm("10:00")),
        ..new_log(june.project_id, "2024-06-05", 30)
    };
    let err = WorkLogLogic::create(&mut pool, &june.alice, same).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let backwards = NewWorkLog {
        start_time: Some(hm("11:00")),
        end_time: Some(hm("10:00")),
        ..new_log(june.project_id, "2024-06-05", 30)
    };
    let err = WorkLogLogic::create(&mut pool, &june.alice, backwards).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn test_unknown_project_is_rejected() {
    let mut pool = memory_pool();
    let june = seed_june(&mut pool);

    let err = WorkLogLogic::create(&mut pool, &june.alice, new_log(9999, "2024-06-05", 30))
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let patch = WorkLogPatch {
        project_id: Some(9999),
        ..WorkLogPatch::default()
    };
    let logs = WorkLogLogic::list_by_project(&mut pool, june.project_id).unwrap();
    let err = WorkLogLogic::update(&mut pool, &june.alice, logs[0].id, &patch).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn test_only_owner_or_admin_may_change() {
    let mut pool = memory_pool();
    let june = seed_june(&mut pool);
    let alice_log = log_minutes(&mut pool, &june.alice, june.project_id, "2024-06-07", 20);

    let patch = WorkLogPatch {
        duration_minutes: Some(25),
        ..WorkLogPatch::default()
    };

    let err = WorkLogLogic::update(&mut pool, &june.bob, alice_log.id, &patch).unwrap_err();
    assert!(matches!(err, AppError::Permission(_)));
    let err = WorkLogLogic::delete(&mut pool, &june.bob, alice_log.id).unwrap_err();
    assert!(matches!(err, AppError::Permission(_)));

    let updated = WorkLogLogic::update(&mut pool, &june.alice, alice_log.id, &patch).unwrap();
    assert_eq!(updated.duration_minutes, 25);
    assert_eq!(updated.user_id, june.alice.user_id);

    WorkLogLogic::delete(&mut pool, &june.admin, alice_log.id).unwrap();
    let err = WorkLogLogic::get(&mut pool, alice_log.id).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn test_update_validates_resulting_record() {
    let mut pool = memory_pool();
    let june = seed_june(&mut pool);
    let wl = log_minutes(&mut pool, &june.alice, june.project_id, "2024-06-07", 20);

    let patch = WorkLogPatch {
        duration_minutes: Some(0),
        ..WorkLogPatch::default()
    };
    let err = WorkLogLogic::update(&mut pool, &june.alice, wl.id, &patch).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let still = WorkLogLogic::get(&mut pool, wl.id).unwrap();
    assert_eq!(still.duration_minutes, 20);
}

#[test]
fn test_missing_log_is_not_found() {
    let mut pool = memory_pool();
    let june = seed_june(&mut pool);

    assert!(matches!(
        WorkLogLogic::get(&mut pool, 777).unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        WorkLogLogic::delete(&mut pool, &june.admin, 777).unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        WorkLogLogic::update(&mut pool, &june.admin, 777, &WorkLogPatch::default()).unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[test]
fn test_list_paginates_newest_first() {
    let mut pool = memory_pool();
    let admin = actor(&add_user(&mut pool, "admin", true));
    let p = add_project(&mut pool, &admin, "PAGE-1", "");

    for day in 1..=25 {
        log_minutes(&mut pool, &admin, p, &format!("2024-03-{day:02}"), 10);
    }

    let filter = WorkLogFilter {
        project_id: Some(p),
        ..WorkLogFilter::default()
    };

    let first = WorkLogLogic::list(&mut pool, &filter, PageRequest::new(None, Some(10)).unwrap())
        .unwrap();
    assert_eq!(first.total, 25);
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.items[0].work_date, date("2024-03-25"));

    let last = WorkLogLogic::list(&mut pool, &filter, PageRequest::new(Some(3), Some(10)).unwrap())
        .unwrap();
    assert_eq!(last.items.len(), 5);
    assert_eq!(last.page, 3);
    assert_eq!(last.items[4].work_date, date("2024-03-01"));

    let beyond = WorkLogLogic::list(&mut pool, &filter, PageRequest::new(Some(9), Some(10)).unwrap())
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 25);
}

#[test]
fn test_list_filters_by_user_and_month() {
    let mut pool = memory_pool();
    let june = seed_june(&mut pool);
    log_minutes(&mut pool, &june.alice, june.project_id, "2024-07-01", 45);

    let alice_june = WorkLogFilter {
        user_id: Some(june.alice.user_id),
        month: Some(month("2024-06")),
        ..WorkLogFilter::default()
    };
    let page = WorkLogLogic::list(&mut pool, &alice_june, PageRequest::default()).unwrap();
    assert_eq!(page.total, 2);

    let by_day = WorkLogFilter {
        work_date: Some(date("2024-06-30")),
        ..WorkLogFilter::default()
    };
    let page = WorkLogLogic::list(&mut pool, &by_day, PageRequest::default()).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].user_id, june.bob.user_id);
}

#[test]
fn test_page_request_bounds() {
    assert!(PageRequest::new(Some(0), None).is_err());
    assert!(PageRequest::new(None, Some(0)).is_err());
    assert!(PageRequest::new(None, Some(101)).is_err());

    let ok = PageRequest::new(Some(2), Some(100)).unwrap();
    assert_eq!(ok.offset(), 100);
    assert_eq!(PageRequest::default().per_page, 20);
}

#[test]
fn test_page_whose_offset_overflows_is_rejected() {
    let err = PageRequest::new(Some(i64::MAX), Some(20)).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let last = PageRequest::new(Some(i64::MAX / 100 + 1), Some(100)).unwrap();
    assert_eq!(last.offset(), i64::MAX / 100 * 100);
}

#[test]
fn test_full_day_is_the_longest_log() {
    let mut pool = memory_pool();
    let june = seed_june(&mut pool);

    let wl = WorkLogLogic::create(
        &mut pool,
        &june.alice,
        new_log(june.project_id, "2024-06-07", 24 * 60),
    )
    .unwrap();
    assert_eq!(wl.duration_minutes, 1440);

    let patch = WorkLogPatch {
        duration_minutes: Some(1441),
        ..WorkLogPatch::default()
    };
    let err = WorkLogLogic::update(&mut pool, &june.alice, wl.id, &patch).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn test_storage_rejects_oversized_duration() {
    let mut pool = memory_pool();
    let june = seed_june(&mut pool);

    let res = pool.conn.execute(
        "INSERT INTO worklogs (project_id, user_id, work_date, duration_minutes, created_at, updated_at)
         VALUES (?1, ?2, '2024-06-08', 1441, datetime('now'), datetime('now'))",
        rusqlite::params![june.project_id, june.alice.user_id],
    );
    assert!(res.is_err());
}

#[test]
fn test_month_and_project_listings() {
    let mut pool = memory_pool();
    let june = seed_june(&mut pool);
    log_minutes(&mut pool, &june.bob, june.project_id, "2024-05-31", 5);

    let in_june = WorkLogLogic::list_by_month(&mut pool, &month("2024-06")).unwrap();
    assert_eq!(in_june.len(), 3);

    let all = WorkLogLogic::list_by_project(&mut pool, june.project_id).unwrap();
    let dates: Vec<_> = all.iter().map(|w| w.work_date).collect();
    assert_eq!(
        dates,
        vec![
            date("2024-05-31"),
            date("2024-06-03"),
            date("2024-06-17"),
            date("2024-06-30")
        ]
    );
}

#[test]
fn test_mutations_are_audited() {
    let mut pool = memory_pool();
    let june = seed_june(&mut pool);
    let wl = log_minutes(&mut pool, &june.alice, june.project_id, "2024-06-08", 15);

    let patch = WorkLogPatch {
        work_content: Some("rework".into()),
        ..WorkLogPatch::default()
    };
    WorkLogLogic::update(&mut pool, &june.alice, wl.id, &patch).unwrap();
    WorkLogLogic::delete(&mut pool, &june.alice, wl.id).unwrap();

    let target = format!("worklog {}", wl.id);
    let ops: Vec<String> = load_log(&pool.conn)
        .unwrap()
        .into_iter()
        .filter(|(_, _, _, t, _)| *t == target)
        .map(|(_, _, op, _, _)| op)
        .collect();
    assert_eq!(ops, vec!["add", "edit", "del"]);
}
