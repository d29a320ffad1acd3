use crate::models::{DropoutRisk, ScoredStudent, SentimentLabel};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultFilter {
    pub dropout_risk: Option<DropoutRisk>,
    pub sentiment: Option<SentimentLabel>,
    pub alerts_only: bool,
}

impl ResultFilter {
    /// Students flagged for advisor follow-up.
    pub fn at_risk() -> Self {
        Self {
            alerts_only: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, student: &ScoredStudent) -> bool {
        let result = &student.result;
        self.dropout_risk.map_or(true, |tier| result.dropout_risk == tier)
            && self.sentiment.map_or(true, |label| result.sentiment == label)
            && (!self.alerts_only || result.alert)
    }

    pub fn apply<'a>(&self, students: &'a [ScoredStudent]) -> Vec<&'a ScoredStudent> {
        students.iter().filter(|student| self.matches(student)).collect()
    }

    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(tier) = self.dropout_risk {
            parts.push(format!("{tier} dropout risk"));
        }
        if let Some(label) = self.sentiment {
            parts.push(format!("{label} sentiment"));
        }
        if self.alerts_only {
            parts.push("advisor alerts".to_string());
        }
        if parts.is_empty() {
            "all students".to_string()
        } else {
            parts.join(", ")
        }
    }
}
