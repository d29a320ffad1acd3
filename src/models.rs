use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::risk;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    pub student_id: String,
    pub gpa: f64,
    pub attendance_pct: f64,
    pub lms_logins: i64,
    pub financial_risk: bool,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
pub enum DropoutRisk {
    Low,
    Medium,
    High,
}

impl DropoutRisk {
    pub const ALL: [DropoutRisk; 3] = [DropoutRisk::High, DropoutRisk::Medium, DropoutRisk::Low];
}

impl fmt::Display for DropoutRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DropoutRisk::Low => "Low",
            DropoutRisk::Medium => "Medium",
            DropoutRisk::High => "High",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
pub enum SentimentLabel {
    Positive,
    Negative,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Positive => f.write_str("Positive"),
            SentimentLabel::Negative => f.write_str("Negative"),
        }
    }
}

// Fields stay private so the label is always derived from the polarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentResult {
    polarity: f64,
    label: SentimentLabel,
}

impl SentimentResult {
    pub fn from_polarity(polarity: f64) -> Self {
        Self {
            polarity,
            label: risk::classify_sentiment(polarity),
        }
    }

    pub fn polarity(&self) -> f64 {
        self.polarity
    }

    pub fn label(&self) -> SentimentLabel {
        self.label
    }
}

// Declared in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Recommendation {
    #[serde(rename = "Academic tutoring")]
    AcademicTutoring,
    #[serde(rename = "Attendance counseling")]
    AttendanceCounseling,
    #[serde(rename = "LMS engagement support")]
    LmsEngagementSupport,
    #[serde(rename = "Financial aid check-in")]
    FinancialAidCheckIn,
    #[serde(rename = "Mental health referral")]
    MentalHealthReferral,
}

impl Recommendation {
    pub const ALL: [Recommendation; 5] = [
        Recommendation::AcademicTutoring,
        Recommendation::AttendanceCounseling,
        Recommendation::LmsEngagementSupport,
        Recommendation::FinancialAidCheckIn,
        Recommendation::MentalHealthReferral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::AcademicTutoring => "Academic tutoring",
            Recommendation::AttendanceCounseling => "Attendance counseling",
            Recommendation::LmsEngagementSupport => "LMS engagement support",
            Recommendation::FinancialAidCheckIn => "Financial aid check-in",
            Recommendation::MentalHealthReferral => "Mental health referral",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringResult {
    pub risk_score: u8,
    pub dropout_risk: DropoutRisk,
    pub sentiment: SentimentLabel,
    pub sentiment_score: f64,
    pub recommendations: Vec<Recommendation>,
    pub alert: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredStudent {
    pub record: StudentRecord,
    pub result: ScoringResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedRecord {
    pub student_id: String,
    pub error: RecordError,
}

impl From<RecordError> for FailedRecord {
    fn from(error: RecordError) -> Self {
        Self {
            student_id: error.record_label(),
            error,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub scored: Vec<ScoredStudent>,
    pub failed: Vec<FailedRecord>,
}

impl BatchOutcome {
    pub fn extend(&mut self, other: BatchOutcome) {
        self.scored.extend(other.scored);
        self.failed.extend(other.failed);
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStudentRow {
    #[serde(rename = "Student_ID")]
    pub student_id: String,
    #[serde(rename = "GPA")]
    pub gpa: String,
    #[serde(rename = "Attendance_%")]
    pub attendance_pct: String,
    #[serde(rename = "LMS_Logins")]
    pub lms_logins: String,
    #[serde(rename = "Financial_Risk")]
    pub financial_risk: String,
    #[serde(rename = "Messages", default)]
    pub message: Option<String>,
}

impl TryFrom<RawStudentRow> for StudentRecord {
    type Error = RecordError;

    fn try_from(row: RawStudentRow) -> Result<Self, Self::Error> {
        let invalid = |field: &'static str, value: &str| RecordError::InvalidRecord {
            student_id: row.student_id.clone(),
            field,
            value: value.to_string(),
        };

        let gpa = parse_real(&row.gpa).ok_or_else(|| invalid("GPA", &row.gpa))?;
        let attendance_pct = parse_real(row.attendance_pct.trim_end_matches('%'))
            .ok_or_else(|| invalid("Attendance_%", &row.attendance_pct))?;
        let lms_logins =
            parse_count(&row.lms_logins).ok_or_else(|| invalid("LMS_Logins", &row.lms_logins))?;
        let financial_risk = parse_flag(&row.financial_risk)
            .ok_or_else(|| invalid("Financial_Risk", &row.financial_risk))?;

        Ok(StudentRecord {
            student_id: row.student_id,
            gpa,
            attendance_pct,
            lms_logins,
            financial_risk,
            message: row.message.unwrap_or_default(),
        })
    }
}

fn parse_real(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

fn parse_count(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(count) = value.parse::<i64>() {
        return Some(count);
    }
    // Spreadsheet exports often write counts as "12.0".
    let real = value.parse::<f64>().ok()?;
    if real.is_finite() && real.fract() == 0.0 {
        Some(real as i64)
    } else {
        None
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    let value = value.trim();
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" => return Some(true),
        "false" | "no" => return Some(false),
        _ => {}
    }
    let real = value.parse::<f64>().ok()?;
    Some(!real.is_nan() && real != 0.0)
}
