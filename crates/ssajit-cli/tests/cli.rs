use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SCALE: &str = r"
function %scale(i64, i64) -> i64 {
    v0 = mul p0, 3:i64
    v1 = add v0, p1
    return v1
}
";

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn ssajit() -> Command {
    Command::cargo_bin("ssajit").unwrap()
}

#[test]
fn test_run_prints_result() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "scale.ssa", SCALE);

    ssajit()
        .arg("run")
        .arg(&input)
        .args(["2", "5"])
        .assert()
        .success()
        .stdout("11\n");

    ssajit()
        .arg("run")
        .arg(&input)
        .args(["-4", "1"])
        .assert()
        .success()
        .stdout("-11\n");
}

#[test]
fn test_run_rejects_wrong_argument_count() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "scale.ssa", SCALE);

    ssajit()
        .arg("run")
        .arg(&input)
        .arg("2")
        .assert()
        .failure()
        .stderr(predicate::str::contains("expects 2 argument(s), got 1"));
}

#[test]
fn test_check_valid_and_invalid() {
    let dir = TempDir::new().unwrap();
    let good = write(&dir, "good.ssa", SCALE);
    let bad = write(
        &dir,
        "bad.ssa",
        "function (i64) -> i64 {\n    v0 = add p0, v1\n    return v0\n}\n",
    );

    ssajit()
        .arg("check")
        .arg(&good)
        .assert()
        .success()
        .stdout(predicate::str::contains("VALID"));

    ssajit()
        .arg("check")
        .arg(&bad)
        .assert()
        .failure()
        .stdout(predicate::str::contains("INVALID"))
        .stdout(predicate::str::contains("Use before definition"));
}

#[test]
fn test_check_reports_unsupported_operator() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "sub.ssa",
        "function (i64, i64) -> i64 {\n    v0 = sub p0, p1\n    return v0\n}\n",
    );

    ssajit()
        .arg("check")
        .arg(&input)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unsupported construct: operator `sub`"));
}

#[test]
fn test_check_reports_unsupported_operator_in_json() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "sub.json",
        r#"{
            "name": "f",
            "params": ["i64", "i64"],
            "result": "i64",
            "statements": [
                { "Call": { "op": "sub", "operands": [{ "Param": 0 }, { "Param": 1 }] } },
                { "Return": { "Ssa": 0 } }
            ]
        }"#,
    );

    ssajit()
        .arg("check")
        .arg(&input)
        .assert()
        .failure()
        .stdout(predicate::str::contains("INVALID"))
        .stdout(predicate::str::contains("Unsupported construct: operator `sub`"));
}

#[test]
fn test_print_round_trips_json() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "scale.ssa", SCALE);

    let output = ssajit()
        .arg("print")
        .arg(&input)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = write(&dir, "scale.json", &String::from_utf8(output.stdout).unwrap());
    ssajit()
        .arg("print")
        .arg(&json)
        .arg("--no-color")
        .assert()
        .success()
        .stdout(predicate::str::contains("v0 = mul p0, 3:i64"));

    ssajit()
        .arg("run")
        .arg(&json)
        .args(["2", "5"])
        .assert()
        .success()
        .stdout("11\n");
}

#[test]
fn test_clif_shows_backend_ir() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "scale.ssa", SCALE);

    ssajit()
        .arg("clif")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("iadd"));
}

#[test]
fn test_config_file_is_applied() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "scale.ssa", SCALE);
    let config = write(&dir, "config.json", r#"{ "opt_level": "none", "verify": true }"#);
    let broken = write(&dir, "broken.json", "{ nope");

    ssajit()
        .arg("--config")
        .arg(&config)
        .arg("run")
        .arg(&input)
        .args(["1", "1"])
        .assert()
        .success()
        .stdout("4\n");

    ssajit()
        .arg("--config")
        .arg(&broken)
        .arg("run")
        .arg(&input)
        .args(["1", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn test_unsupported_type_fails_compilation() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "narrow.ssa",
        "function (i32) -> i64 {\n    v0 = add p0, p0\n    return v0\n}\n",
    );

    ssajit()
        .arg("run")
        .arg(&input)
        .arg("1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported type: i32"));
}
