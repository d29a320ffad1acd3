use std::io::Write;

use serde::Serialize;

use crate::models::ScoredStudent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

pub const ALERT_FOLLOW_UP: &str = "Advisor Follow-up";
pub const ALERT_OK: &str = "OK";

/// Flat row using the same column names as the input file, extended with
/// the scoring columns.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Student_ID")]
    student_id: &'a str,
    #[serde(rename = "GPA")]
    gpa: f64,
    #[serde(rename = "Attendance_%")]
    attendance_pct: f64,
    #[serde(rename = "LMS_Logins")]
    lms_logins: i64,
    #[serde(rename = "Financial_Risk")]
    financial_risk: u8,
    #[serde(rename = "Messages")]
    message: &'a str,
    #[serde(rename = "Risk_Score")]
    risk_score: u8,
    #[serde(rename = "Dropout_Risk")]
    dropout_risk: String,
    #[serde(rename = "Sentiment_Score")]
    sentiment_score: f64,
    #[serde(rename = "Sentiment")]
    sentiment: String,
    #[serde(rename = "Recommendations")]
    recommendations: String,
    #[serde(rename = "Alert")]
    alert: &'static str,
}

impl<'a> From<&'a ScoredStudent> for ExportRow<'a> {
    fn from(student: &'a ScoredStudent) -> Self {
        let record = &student.record;
        let result = &student.result;
        Self {
            student_id: &record.student_id,
            gpa: record.gpa,
            attendance_pct: record.attendance_pct,
            lms_logins: record.lms_logins,
            financial_risk: u8::from(record.financial_risk),
            message: &record.message,
            risk_score: result.risk_score,
            dropout_risk: result.dropout_risk.to_string(),
            sentiment_score: result.sentiment_score,
            sentiment: result.sentiment.to_string(),
            recommendations: result
                .recommendations
                .iter()
                .map(|tag| tag.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            alert: if result.alert { ALERT_FOLLOW_UP } else { ALERT_OK },
        }
    }
}

pub fn write_csv<W: Write>(out: W, students: &[&ScoredStudent]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    if students.is_empty() {
        // serde only emits headers alongside the first row
        writer.write_record([
            "Student_ID",
            "GPA",
            "Attendance_%",
            "LMS_Logins",
            "Financial_Risk",
            "Messages",
            "Risk_Score",
            "Dropout_Risk",
            "Sentiment_Score",
            "Sentiment",
            "Recommendations",
            "Alert",
        ])?;
    }
    for student in students {
        writer.serialize(ExportRow::from(*student))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(mut out: W, students: &[&ScoredStudent]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut out, students)?;
    out.flush()?;
    Ok(())
}

pub fn write_export<W: Write>(
    out: W,
    format: ExportFormat,
    students: &[&ScoredStudent],
) -> anyhow::Result<()> {
    match format {
        ExportFormat::Csv => write_csv(out, students),
        ExportFormat::Json => write_json(out, students),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ResultFilter;
    use crate::models::{SentimentResult, StudentRecord};
    use crate::risk::ScoringEngine;

    fn student(id: &str, gpa: f64, at_risk: bool, polarity: f64) -> ScoredStudent {
        let record = StudentRecord {
            student_id: id.to_string(),
            gpa,
            attendance_pct: if at_risk { 60.0 } else { 90.0 },
            lms_logins: if at_risk { 5 } else { 25 },
            financial_risk: at_risk,
            message: "Need help, please".to_string(),
        };
        let result =
            ScoringEngine::default().score(&record, &SentimentResult::from_polarity(polarity));
        ScoredStudent { record, result }
    }

    #[test]
    fn csv_uses_input_columns_plus_scores() {
        let students = [student("3", 1.8, true, -0.2)];
        let refs: Vec<&ScoredStudent> = students.iter().collect();
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &refs).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Student_ID,GPA,Attendance_%,LMS_Logins,Financial_Risk,Messages,Risk_Score,\
Dropout_Risk,Sentiment_Score,Sentiment,Recommendations,Alert"
        );
        assert_eq!(
            lines.next().unwrap(),
            "3,1.8,60.0,5,1,\"Need help, please\",4,High,-0.2,Negative,\
Academic tutoring; Attendance counseling; LMS engagement support; \
Financial aid check-in; Mental health referral,Advisor Follow-up"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn empty_csv_still_has_header() {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &[]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("Student_ID,GPA,"));
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn at_risk_export_excludes_ok_students() {
        let students = [
            student("1", 3.9, false, 0.5),
            student("2", 3.9, true, 0.5),
            student("3", 3.9, false, -0.5),
        ];
        let at_risk = ResultFilter::at_risk().apply(&students);
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &at_risk).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let ids: Vec<&str> = text
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();
        assert_eq!(ids, ["2", "3"]);
        assert!(!text.contains(",OK"));
    }

    #[test]
    fn json_keeps_alert_as_bool() {
        let students = [student("5", 3.9, true, -0.1)];
        let refs: Vec<&ScoredStudent> = students.iter().collect();
        let mut buffer = Vec::new();
        write_export(&mut buffer, ExportFormat::Json, &refs).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(value[0]["record"]["student_id"], "5");
        assert_eq!(value[0]["result"]["alert"], true);
        assert_eq!(value[0]["result"]["dropout_risk"], "High");
        assert_eq!(value[0]["result"]["sentiment"], "Negative");
        assert_eq!(
            value[0]["result"]["recommendations"][0],
            "Attendance counseling"
        );
    }
}
