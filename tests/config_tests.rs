mod common;
use common::temp_out;
use rworklog::config::Config;
use rworklog::core::config::ConfigLogic;
use rworklog::errors::AppError;
use std::fs;

#[test]
fn test_yaml_defaults() {
    let cfg = Config::from_yaml_str("database: /tmp/ledger.sqlite\n").unwrap();
    assert_eq!(cfg.database, "/tmp/ledger.sqlite");
    assert_eq!(cfg.bind_address, "127.0.0.1:8080");
    assert_eq!(cfg.token_ttl_minutes, 30);
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.jwt_secret.is_empty());
    assert!(!cfg.csv_bom);
}

#[test]
fn test_yaml_full() {
    let yaml = "database: /srv/ledger.sqlite\n\
                bind_address: 0.0.0.0:9000\n\
                jwt_secret: s3cret\n\
                token_ttl_minutes: 120\n\
                log_level: debug\n\
                csv_bom: true\n";
    let cfg = Config::from_yaml_str(yaml).unwrap();
    assert_eq!(cfg.bind_address, "0.0.0.0:9000");
    assert_eq!(cfg.jwt_secret, "s3cret");
    assert_eq!(cfg.token_ttl_minutes, 120);
    assert!(cfg.csv_bom);
}

#[test]
fn test_yaml_without_database_is_rejected() {
    let err = Config::from_yaml_str("log_level: info\n").unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn test_check_reports_blocking_settings() {
    let path = temp_out("config_check_bad", "conf");
    fs::write(
        &path,
        "database: /tmp/x.sqlite\njwt_secret: ''\nbind_address: nowhere\n",
    )
    .unwrap();
    assert!(matches!(
        ConfigLogic::check(&path).unwrap_err(),
        AppError::Config(_)
    ));

    let good = temp_out("config_check_good", "conf");
    fs::write(&good, "database: /tmp/x.sqlite\njwt_secret: abc\n").unwrap();
    ConfigLogic::check(&good).unwrap();

    fs::remove_file(&path).ok();
    fs::remove_file(&good).ok();
}
