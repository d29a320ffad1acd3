use std::io::Read;
use std::path::Path;

use anyhow::Context;

use crate::error::RecordError;
use crate::models::{RawStudentRow, StudentRecord};

pub const REQUIRED_COLUMNS: [&str; 5] = [
    "Student_ID",
    "GPA",
    "Attendance_%",
    "LMS_Logins",
    "Financial_Risk",
];

pub const MESSAGE_COLUMN: &str = "Messages";

pub fn read_csv(csv_path: &Path) -> anyhow::Result<Vec<Result<StudentRecord, RecordError>>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    read_records(file).with_context(|| format!("failed to read {}", csv_path.display()))
}

/// Parse student rows. Only a missing or unreadable header fails the whole
/// input; anything wrong with a single row is reported for that row.
pub fn read_records<R: Read>(input: R) -> anyhow::Result<Vec<Result<StudentRecord, RecordError>>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers().context("missing header row")?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .collect();
    if !missing.is_empty() {
        anyhow::bail!("missing required columns: {}", missing.join(", "));
    }
    if !headers.iter().any(|header| header == MESSAGE_COLUMN) {
        tracing::warn!("no {MESSAGE_COLUMN} column; every message is treated as empty");
    }

    let mut records = Vec::new();
    for (index, result) in reader.deserialize::<RawStudentRow>().enumerate() {
        let record = match result {
            Ok(raw) => StudentRecord::try_from(raw),
            Err(err) => Err(RecordError::Unreadable {
                // header is line 1
                line: err.position().map_or(index as u64 + 2, |pos| pos.line()),
                message: err.to_string(),
            }),
        };
        if let Err(err) = &record {
            tracing::warn!(error = %err, "skipping student row");
        }
        records.push(record);
    }

    Ok(records)
}

/// Demonstration cohort used when no file is supplied.
pub fn sample_records() -> Vec<StudentRecord> {
    let rows: [(f64, f64, i64, bool, &str); 20] = [
        (2.9, 80.0, 10, true, "I\u{2019}m struggling with my assignments."),
        (3.5, 95.0, 30, false, "Feeling great about the course!"),
        (1.8, 60.0, 5, true, "I might drop out soon."),
        (3.0, 85.0, 15, false, "The class is okay, a bit hard."),
        (2.2, 70.0, 8, true, "Too expensive. Don\u{2019}t think I can continue."),
        (2.7, 75.0, 12, true, "Having some issues but trying my best."),
        (3.8, 98.0, 40, false, "Loving the experience!"),
        (1.9, 65.0, 6, true, "Need help ASAP."),
        (2.3, 72.0, 9, true, "I\u{2019}m lost in the lectures."),
        (3.1, 90.0, 20, false, "Things are going well."),
        (3.6, 97.0, 35, false, "This is a fun course!"),
        (2.5, 68.0, 7, true, "Kinda stressed lately."),
        (1.7, 50.0, 4, true, "I don\u{2019}t want to do this anymore."),
        (2.0, 60.0, 5, true, "Overwhelmed and frustrated."),
        (3.4, 96.0, 33, false, "Really interesting content!"),
        (2.8, 78.0, 11, true, "Trying to stay on top of things."),
        (3.2, 89.0, 23, false, "Motivated and focused."),
        (2.1, 67.0, 7, true, "It\u{2019}s tough managing everything."),
        (1.6, 55.0, 3, true, "I\u{2019}m burnt out."),
        (2.9, 85.0, 17, false, "Doing alright overall."),
    ];

    rows.iter()
        .enumerate()
        .map(
            |(index, (gpa, attendance_pct, lms_logins, financial_risk, message))| StudentRecord {
                student_id: (index + 1).to_string(),
                gpa: *gpa,
                attendance_pct: *attendance_pct,
                lms_logins: *lms_logins,
                financial_risk: *financial_risk,
                message: message.to_string(),
            },
        )
        .collect()
}

pub fn write_sample_csv(out: &Path) -> anyhow::Result<usize> {
    let mut writer = csv::Writer::from_path(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    writer.write_record(REQUIRED_COLUMNS.iter().copied().chain([MESSAGE_COLUMN]))?;

    let records = sample_records();
    for record in &records {
        writer.write_record([
            record.student_id.clone(),
            record.gpa.to_string(),
            record.attendance_pct.to_string(),
            record.lms_logins.to_string(),
            u8::from(record.financial_risk).to_string(),
            record.message.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(records.len())
}
