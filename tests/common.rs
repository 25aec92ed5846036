#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::NaiveDate;
use rworklog::core::project::ProjectLogic;
use rworklog::core::user::UserLogic;
use rworklog::core::worklog::WorkLogLogic;
use rworklog::db::initialize::init_db;
use rworklog::db::pool::DbPool;
use rworklog::models::month::MonthKey;
use rworklog::models::project::NewProject;
use rworklog::models::user::{Actor, User};
use rworklog::models::worklog::{NewWorkLog, WorkLog};
use std::env;
use std::fs;
use std::path::PathBuf;

pub const TEST_SECRET: &str = "rworklog-test-secret";

pub fn rwl() -> Command {
    let mut cmd = cargo_bin_cmd!("rworklog");
    cmd.env("RWORKLOG_JWT_SECRET", TEST_SECRET);
    cmd
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rworklog.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    fs::remove_file(format!("{db_path}-wal")).ok();
    fs::remove_file(format!("{db_path}-shm")).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// `init` a file database through the CLI (test mode: config untouched)
pub fn init_cli_db(db_path: &str) {
    rwl()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

/// Fresh in-memory database with the full schema.
pub fn memory_pool() -> DbPool {
    let pool = DbPool::open_in_memory().expect("open in-memory db");
    init_db(&pool.conn).expect("init db");
    pool
}

pub fn add_user(pool: &mut DbPool, name: &str, admin: bool) -> User {
    UserLogic::add(pool, name, &format!("{name}@example.com"), admin).expect("add user")
}

pub fn actor(user: &User) -> Actor {
    Actor::from(user)
}

pub fn add_project(pool: &mut DbPool, by: &Actor, management_no: &str, machine_no: &str) -> i64 {
    let input = NewProject {
        machine_no: Some(machine_no.to_string()),
        ..NewProject::with_management_no(management_no)
    };
    ProjectLogic::create(pool, by, input)
        .expect("create project")
        .project
        .id
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

pub fn month(s: &str) -> MonthKey {
    MonthKey::parse(s).expect("valid test month")
}

pub fn new_log(project_id: i64, work_date: &str, minutes: i64) -> NewWorkLog {
    NewWorkLog {
        project_id,
        work_date: date(work_date),
        start_time: None,
        end_time: None,
        duration_minutes: minutes,
        work_content: None,
    }
}

pub fn log_minutes(
    pool: &mut DbPool,
    by: &Actor,
    project_id: i64,
    work_date: &str,
    minutes: i64,
) -> WorkLog {
    WorkLogLogic::create(pool, by, new_log(project_id, work_date, minutes)).expect("create log")
}

/// The June 2024 fixture: NEX-001, 180 minutes by two users.
pub struct June {
    pub admin: Actor,
    pub alice: Actor,
    pub bob: Actor,
    pub project_id: i64,
}

pub fn seed_june(pool: &mut DbPool) -> June {
    let admin = actor(&add_user(pool, "admin", true));
    let alice = actor(&add_user(pool, "alice", false));
    let bob = actor(&add_user(pool, "bob", false));

    let project_id = add_project(pool, &admin, "NEX-001", "M-100");
    log_minutes(pool, &alice, project_id, "2024-06-03", 60);
    log_minutes(pool, &alice, project_id, "2024-06-17", 90);
    log_minutes(pool, &bob, project_id, "2024-06-30", 30);

    June {
        admin,
        alice,
        bob,
        project_id,
    }
}
