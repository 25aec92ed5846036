mod common;
use common::{init_cli_db, rwl, setup_test_db};
use predicates::prelude::*;
use predicates::str::contains;

/// Database with an admin, a regular user and NEX-001 carrying 180 minutes in June 2024.
fn seeded_db(name: &str) -> String {
    let db_path = setup_test_db(name);
    init_cli_db(&db_path);

    rwl()
        .args(["--db", &db_path, "user", "add", "boss", "--admin"])
        .assert()
        .success();
    rwl()
        .args(["--db", &db_path, "user", "add", "alice", "--email", "alice@example.com"])
        .assert()
        .success();
    rwl()
        .args(["--db", &db_path, "project", "add", "NEX-001", "--machine-no", "M-100", "--as", "boss"])
        .assert()
        .success();

    for (date, minutes) in [("2024-06-03", "60"), ("2024-06-17", "90"), ("2024-06-30", "30")] {
        rwl()
            .args([
                "--db", &db_path, "worklog", "add", "--project", "NEX-001", "--date", date,
                "--minutes", minutes, "--as", "alice",
            ])
            .assert()
            .success();
    }
    db_path
}

#[test]
fn test_init_creates_database() {
    let db_path = setup_test_db("cli_init");

    rwl()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    assert!(std::path::Path::new(&db_path).exists());
}

#[test]
fn test_user_add_list_and_token() {
    let db_path = setup_test_db("cli_users");
    init_cli_db(&db_path);

    rwl()
        .args(["--db", &db_path, "user", "add", "boss", "--admin"])
        .assert()
        .success()
        .stdout(contains("Added admin 'boss'"));

    rwl()
        .args(["--db", &db_path, "user", "add", "boss"])
        .assert()
        .failure();

    rwl()
        .args(["--db", &db_path, "user", "list"])
        .assert()
        .success()
        .stdout(contains("boss").and(contains("admin")));

    let out = rwl()
        .args(["--db", &db_path, "user", "token", "boss"])
        .output()
        .expect("run user token");
    assert!(out.status.success());
    let token = String::from_utf8(out.stdout).unwrap();
    assert_eq!(token.trim().split('.').count(), 3);
}

#[test]
fn test_token_needs_secret() {
    let db_path = setup_test_db("cli_token_secret");
    init_cli_db(&db_path);
    rwl()
        .args(["--db", &db_path, "user", "add", "boss", "--admin"])
        .assert()
        .success();

    rwl()
        .env("RWORKLOG_JWT_SECRET", "")
        .args(["--db", &db_path, "user", "token", "boss"])
        .assert()
        .failure()
        .stderr(contains("jwt_secret"));
}

#[test]
fn test_disabled_user_gets_no_token() {
    let db_path = setup_test_db("cli_disable");
    init_cli_db(&db_path);
    rwl()
        .args(["--db", &db_path, "user", "add", "temp"])
        .assert()
        .success();

    rwl()
        .args(["--db", &db_path, "user", "disable", "temp"])
        .assert()
        .success();
    rwl()
        .args(["--db", &db_path, "user", "token", "temp"])
        .assert()
        .failure();

    rwl()
        .args(["--db", &db_path, "user", "enable", "temp"])
        .assert()
        .success();
    rwl()
        .args(["--db", &db_path, "user", "token", "temp"])
        .assert()
        .success();
}

#[test]
fn test_preview_shows_month_totals() {
    let db_path = seeded_db("cli_preview");

    rwl()
        .args(["--db", &db_path, "preview", "--month", "2024-06"])
        .assert()
        .success()
        .stdout(
            contains("NEX-001")
                .and(contains("M-100"))
                .and(contains("180"))
                .and(contains("open")),
        );

    rwl()
        .args(["--db", &db_path, "worklog", "list", "--month", "2024-06"])
        .assert()
        .success()
        .stdout(contains("Total: 03:00"));

    rwl()
        .args(["--db", &db_path, "project", "list"])
        .assert()
        .success()
        .stdout(contains("NEX-001").and(contains("03:00")));
}

#[test]
fn test_close_flow() {
    let db_path = seeded_db("cli_close");

    rwl()
        .args(["--db", &db_path, "close", "--month", "2024-06", "--as", "alice"])
        .assert()
        .failure()
        .stderr(contains("Permission denied"));

    rwl()
        .args(["--db", &db_path, "close", "--month", "2024-06", "--as", "boss"])
        .assert()
        .success()
        .stdout(contains("Month 2024-06 closed by boss"));

    rwl()
        .args(["--db", &db_path, "close", "--month", "2024-06", "--as", "boss"])
        .assert()
        .failure()
        .stderr(contains("already closed"));

    rwl()
        .args([
            "--db", &db_path, "worklog", "add", "--project", "NEX-001", "--date", "2024-06-10",
            "--minutes", "15", "--as", "alice",
        ])
        .assert()
        .failure()
        .stderr(contains("2024-06 is closed"));

    // July is still open
    rwl()
        .args([
            "--db", &db_path, "worklog", "add", "--project", "NEX-001", "--date", "2024-07-01",
            "--minutes", "15", "--as", "alice",
        ])
        .assert()
        .success();

    rwl()
        .args(["--db", &db_path, "preview", "--month", "2024-06"])
        .assert()
        .success()
        .stdout(contains("closed"));
}

#[test]
fn test_worklog_add_validation() {
    let db_path = seeded_db("cli_worklog_validation");

    rwl()
        .args([
            "--db", &db_path, "worklog", "add", "--project", "NOPE-1", "--date", "2024-06-10",
            "--minutes", "15", "--as", "alice",
        ])
        .assert()
        .failure()
        .stderr(contains("unknown project"));

    rwl()
        .args([
            "--db", &db_path, "worklog", "add", "--project", "NEX-001", "--date", "2024-06-10",
            "--minutes", "0", "--as", "alice",
        ])
        .assert()
        .failure();

    rwl()
        .args([
            "--db", &db_path, "worklog", "add", "--project", "NEX-001", "--date", "2024-06-10",
            "--minutes", "30", "--in", "10:00", "--out", "09:00", "--as", "alice",
        ])
        .assert()
        .failure()
        .stderr(contains("end_time"));

    rwl()
        .args([
            "--db", &db_path, "worklog", "add", "--project", "NEX-001", "--date", "2024-06-10",
            "--minutes", "15", "--as", "ghost",
        ])
        .assert()
        .failure();
}

#[test]
fn test_invalid_month_is_rejected() {
    let db_path = setup_test_db("cli_bad_month");
    init_cli_db(&db_path);

    for bad in ["2024-6", "2024-13", "24-06", "june"] {
        rwl()
            .args(["--db", &db_path, "preview", "--month", bad])
            .assert()
            .failure()
            .stderr(contains("Validation error"));
    }
}

#[test]
fn test_db_info_and_migrate() {
    let db_path = seeded_db("cli_db_info");

    rwl()
        .args(["--db", &db_path, "db", "--info"])
        .assert()
        .success()
        .stdout(contains("Work logs:").and(contains("2024-06-03")));

    rwl()
        .args(["--db", &db_path, "db", "--migrate"])
        .assert()
        .success()
        .stdout(contains("0 applied"));

    rwl()
        .args(["--db", &db_path, "db", "--check"])
        .assert()
        .success()
        .stdout(contains("Integrity check passed"));
}

#[test]
fn test_log_print_shows_audit_trail() {
    let db_path = seeded_db("cli_log");
    rwl()
        .args(["--db", &db_path, "close", "--month", "2024-06", "--as", "boss"])
        .assert()
        .success();

    rwl()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(
            contains("Internal log")
                .and(contains("migration_applied"))
                .and(contains("2024-06")),
        );
}
