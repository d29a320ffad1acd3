use std::fs;

use assert_cmd::Command;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("student-early-warning").unwrap();
    cmd.env("RUST_LOG", "warn").env_remove("EARLY_WARNING_THRESHOLDS");
    cmd
}

#[test]
fn sample_then_export_at_risk() {
    let dir = tempfile::tempdir().unwrap();
    let students = dir.path().join("students.csv");
    let at_risk = dir.path().join("at_risk.csv");

    cli()
        .args(["sample", "--out"])
        .arg(&students)
        .assert()
        .success();

    cli()
        .args(["export", "--polarity", "0.1", "--csv"])
        .arg(&students)
        .arg("--out")
        .arg(&at_risk)
        .assert()
        .success();

    let exported = fs::read_to_string(&at_risk).unwrap();
    let ids: Vec<&str> = exported
        .lines()
        .skip(1)
        .map(|line| line.split(',').next().unwrap())
        .collect();
    assert_eq!(ids, ["3", "5", "8", "9", "12", "13", "14", "18", "19"]);
    assert!(exported.lines().skip(1).all(|line| line.ends_with("Advisor Follow-up")));
}

#[test]
fn bad_rows_are_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let students = dir.path().join("students.csv");
    fs::write(
        &students,
        "Student_ID,GPA,Attendance_%,LMS_Logins,Financial_Risk,Messages\n\
         A1,1.8,60,5,1,I might drop out soon.\n\
         A2,n/a,90,20,0,All good\n\
         A3,3.5,95,30,0,Feeling great about the course!\n",
    )
    .unwrap();

    let output = cli()
        .args(["score", "--csv"])
        .arg(&students)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("- Student A1 (High risk, score 4"));
    assert!(stdout.contains("- Student A3 (Low risk, score 0"));
    assert!(stdout.contains("Scored 2 students"));
    assert!(stdout.contains("skipped A2: student A2: GPA is not numeric ('n/a')"));
}

fn listed_ids(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter_map(|line| line.strip_prefix("- Student "))
        .map(|rest| rest.split(' ').next().unwrap().to_string())
        .collect()
}

#[test]
fn score_keeps_input_order_unless_ranked() {
    let output = cli()
        .args(["score", "--polarity", "0", "--alerts-only"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        listed_ids(&output.stdout),
        ["3", "5", "8", "9", "12", "13", "14", "18", "19"]
    );

    let output = cli()
        .args(["score", "--polarity", "0", "--alerts-only", "--rank"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        listed_ids(&output.stdout),
        ["3", "8", "13", "14", "18", "19", "5", "9", "12"]
    );
}

#[test]
fn report_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.md");

    cli()
        .args(["report", "--polarity", "0", "--limit", "2", "--out"])
        .arg(&out)
        .assert()
        .success();

    let report = fs::read_to_string(&out).unwrap();
    assert!(report.contains("for sample cohort"));
    assert!(report.contains("- Advisor alerts: 9"));
    assert!(report.contains("- ... and 7 more"));
}

#[test]
fn invalid_thresholds_fail_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let thresholds = dir.path().join("thresholds.json");
    fs::write(&thresholds, r#"{ "high_at": 9 }"#).unwrap();

    let output = cli()
        .args(["score", "--thresholds"])
        .arg(&thresholds)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("high_at"));
}
