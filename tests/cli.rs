use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn dumpkeeper(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dumpkeeper").unwrap();
    cmd.env("DUMPKEEPER_DIR", dir.path())
        .env_remove("DUMPKEEPER_PASSPHRASE")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_history_empty() {
    let dir = TempDir::new().unwrap();
    dumpkeeper(&dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups found."));
}

#[test]
fn test_create_history_read() {
    let dir = TempDir::new().unwrap();

    dumpkeeper(&dir)
        .args(["create", "users", "--id", "20240101120000"])
        .write_stdin("data")
        .assert()
        .success()
        .stdout(predicate::str::contains("db-bkp-20240101120000-users.gz"));

    assert!(dir
        .path()
        .join("backups/db-bkp-20240101120000-users.gz")
        .exists());

    dumpkeeper(&dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("Jan 01, 2024 at 12:00:00"));

    dumpkeeper(&dir)
        .args(["read", "db-bkp-20240101120000-users.gz"])
        .assert()
        .success()
        .stdout("data");
}

#[test]
fn test_create_from_file_and_read_to_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("dump.sql");
    let output = dir.path().join("restored.sql");
    std::fs::write(&input, "INSERT INTO orders VALUES (1);").unwrap();

    dumpkeeper(&dir)
        .args(["create", "orders", "--id", "20240101120000", "--file"])
        .arg(&input)
        .assert()
        .success();

    dumpkeeper(&dir)
        .args(["read", "db-bkp-20240101120000-orders.gz", "--output"])
        .arg(&output)
        .assert()
        .success();

    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "INSERT INTO orders VALUES (1);"
    );
}

#[test]
fn test_read_missing_fails() {
    let dir = TempDir::new().unwrap();
    dumpkeeper(&dir)
        .args(["read", "db-bkp-20240101120000-users.gz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_create_rejects_bad_id() {
    let dir = TempDir::new().unwrap();
    dumpkeeper(&dir)
        .args(["create", "users", "--id", "tomorrow"])
        .write_stdin("data")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid backup id"));
}

#[test]
fn test_remove_unknown_id() {
    let dir = TempDir::new().unwrap();
    dumpkeeper(&dir)
        .args(["remove", "20990101000000"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Invalid id"));
}

#[test]
fn test_remove_requires_force() {
    let dir = TempDir::new().unwrap();
    dumpkeeper(&dir)
        .args(["create", "users", "--id", "20240101120000"])
        .write_stdin("data")
        .assert()
        .success();

    let artifact = dir.path().join("backups/db-bkp-20240101120000-users.gz");

    dumpkeeper(&dir)
        .args(["remove", "20240101120000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));
    assert!(artifact.exists());

    dumpkeeper(&dir)
        .args(["remove", "20240101120000", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted"));
    assert!(!artifact.exists());
}

#[test]
fn test_prune() {
    let dir = TempDir::new().unwrap();
    for id in ["20240101000000", "20240102000000", "20240103000000"] {
        dumpkeeper(&dir)
            .args(["create", "users", "--id", id])
            .write_stdin("data")
            .assert()
            .success();
    }

    dumpkeeper(&dir)
        .args(["prune", "--keep", "1", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 file(s)."));

    assert!(dir
        .path()
        .join("backups/db-bkp-20240103000000-users.gz")
        .exists());
    assert!(!dir
        .path()
        .join("backups/db-bkp-20240101000000-users.gz")
        .exists());
}

#[test]
fn test_ftp_fallback_is_transparent() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{ "ftp": { "server": "127.0.0.1", "user": "backup", "password": "wrong",
                      "path": "/dumps", "port": 1, "connect_timeout_secs": 2 } }"#,
    )
    .unwrap();

    dumpkeeper(&dir)
        .args(["create", "users", "--id", "20240101120000"])
        .write_stdin("data")
        .assert()
        .success()
        .stderr(predicate::str::contains("falling back to local"))
        .stderr(predicate::str::contains("wrong").not());

    assert!(dir
        .path()
        .join("backups/db-bkp-20240101120000-users.gz")
        .exists());
}

#[test]
fn test_config_command() {
    let dir = TempDir::new().unwrap();
    dumpkeeper(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("db-bkp"))
        .stdout(predicate::str::contains("not configured"));
}

#[test]
fn test_history_files_with_global_verbose() {
    let dir = TempDir::new().unwrap();
    dumpkeeper(&dir)
        .args(["create", "users", "--id", "20240101120000"])
        .write_stdin("data")
        .assert()
        .success();

    dumpkeeper(&dir)
        .args(["-v", "history", "--files"])
        .assert()
        .success()
        .stdout(predicate::str::contains("  db-bkp-20240101120000-users.gz"))
        .stdout(predicate::str::contains("Total: 1 backup(s)"));
}

#[test]
fn test_prune_preview_matches_deletion_with_undated_id() {
    let dir = TempDir::new().unwrap();
    for id in ["20240101000000", "20240102000000"] {
        dumpkeeper(&dir)
            .args(["create", "a", "--id", id])
            .write_stdin("data")
            .assert()
            .success();
    }
    let undated = dir.path().join("backups/db-bkp-99999999999999-a.gz");
    std::fs::write(&undated, b"").unwrap();

    dumpkeeper(&dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("99999999999999"))
        .stdout(predicate::str::contains("unknown date"));

    dumpkeeper(&dir)
        .args(["prune", "--keep", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("20240101000000"))
        .stdout(predicate::str::contains("20240102000000").not())
        .stdout(predicate::str::contains("99999999999999").not());

    dumpkeeper(&dir)
        .args(["prune", "--keep", "1", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 1 file(s)."));

    assert!(dir.path().join("backups/db-bkp-20240102000000-a.gz").exists());
    assert!(!dir.path().join("backups/db-bkp-20240101000000-a.gz").exists());
    assert!(undated.exists());
}
