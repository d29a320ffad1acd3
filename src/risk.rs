use crate::config::Thresholds;
use crate::models::{
    DropoutRisk, Recommendation, ScoringResult, SentimentLabel, SentimentResult, StudentRecord,
};

type RecordPredicate = fn(&StudentRecord, &Thresholds) -> bool;

// In recommendation order.
const RISK_RULES: [(Recommendation, RecordPredicate); 4] = [
    (Recommendation::AcademicTutoring, low_gpa),
    (Recommendation::AttendanceCounseling, low_attendance),
    (Recommendation::LmsEngagementSupport, low_engagement),
    (Recommendation::FinancialAidCheckIn, financial_risk),
];

const SENTIMENT_RULE: (Recommendation, SentimentLabel) =
    (Recommendation::MentalHealthReferral, SentimentLabel::Negative);

// Comparisons against NaN are false, so a malformed number never adds risk.
fn low_gpa(record: &StudentRecord, thresholds: &Thresholds) -> bool {
    record.gpa < thresholds.gpa_below
}

fn low_attendance(record: &StudentRecord, thresholds: &Thresholds) -> bool {
    record.attendance_pct < thresholds.attendance_below
}

fn low_engagement(record: &StudentRecord, thresholds: &Thresholds) -> bool {
    record.lms_logins < thresholds.lms_logins_below
}

fn financial_risk(record: &StudentRecord, _thresholds: &Thresholds) -> bool {
    record.financial_risk
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoringEngine {
    thresholds: Thresholds,
}

impl ScoringEngine {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn evaluate_risk(&self, record: &StudentRecord) -> (u8, DropoutRisk) {
        let risk_score = RISK_RULES
            .iter()
            .filter(|(_, applies)| applies(record, &self.thresholds))
            .count() as u8;
        (risk_score, self.dropout_tier(risk_score))
    }

    pub fn dropout_tier(&self, risk_score: u8) -> DropoutRisk {
        if risk_score >= self.thresholds.high_at {
            DropoutRisk::High
        } else if risk_score >= self.thresholds.medium_at {
            DropoutRisk::Medium
        } else {
            DropoutRisk::Low
        }
    }

    pub fn build_recommendations(
        &self,
        record: &StudentRecord,
        sentiment: SentimentLabel,
    ) -> Vec<Recommendation> {
        let (sentiment_tag, trigger) = SENTIMENT_RULE;
        RISK_RULES
            .iter()
            .filter(|(_, applies)| applies(record, &self.thresholds))
            .map(|(tag, _)| *tag)
            .chain((sentiment == trigger).then_some(sentiment_tag))
            .collect()
    }

    pub fn score(&self, record: &StudentRecord, sentiment: &SentimentResult) -> ScoringResult {
        let (risk_score, dropout_risk) = self.evaluate_risk(record);
        let label = sentiment.label();

        ScoringResult {
            risk_score,
            dropout_risk,
            sentiment: label,
            sentiment_score: sentiment.polarity(),
            recommendations: self.build_recommendations(record, label),
            alert: build_alert(dropout_risk, label),
        }
    }
}

pub fn classify_sentiment(polarity: f64) -> SentimentLabel {
    if polarity < 0.0 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Positive
    }
}

pub fn build_alert(dropout_risk: DropoutRisk, sentiment: SentimentLabel) -> bool {
    dropout_risk == DropoutRisk::High || sentiment == SentimentLabel::Negative
}
