use std::fmt::Write;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::filter::ResultFilter;
use crate::models::{BatchOutcome, DropoutRisk, Recommendation, ScoredStudent, SentimentLabel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskMix {
    pub tiers: Vec<(DropoutRisk, usize)>,
    pub positive: usize,
    pub negative: usize,
    pub alerts: usize,
}

pub fn summarize_risk(students: &[ScoredStudent]) -> RiskMix {
    let tiers = DropoutRisk::ALL
        .iter()
        .map(|tier| {
            let count = students
                .iter()
                .filter(|s| s.result.dropout_risk == *tier)
                .count();
            (*tier, count)
        })
        .collect();
    let negative = students
        .iter()
        .filter(|s| s.result.sentiment == SentimentLabel::Negative)
        .count();

    RiskMix {
        tiers,
        positive: students.len() - negative,
        negative,
        alerts: students.iter().filter(|s| s.result.alert).count(),
    }
}

/// Count of each recommendation in canonical order, zeros included.
pub fn recommendation_demand(students: &[ScoredStudent]) -> Vec<(Recommendation, usize)> {
    Recommendation::ALL
        .iter()
        .map(|tag| {
            let count = students
                .iter()
                .filter(|s| s.result.recommendations.contains(tag))
                .count();
            (*tag, count)
        })
        .collect()
}

/// Highest risk first; the sort is stable so ties keep input order.
pub fn rank_by_risk<'a>(students: &[&'a ScoredStudent]) -> Vec<&'a ScoredStudent> {
    let mut ranked = students.to_vec();
    ranked.sort_by(|a, b| b.result.risk_score.cmp(&a.result.risk_score));
    ranked
}

pub struct ReportContext<'a> {
    pub source: &'a str,
    pub filter: ResultFilter,
    pub limit: usize,
    pub generated_at: DateTime<Utc>,
    pub run_id: Uuid,
}

pub fn build_report(context: &ReportContext<'_>, outcome: &BatchOutcome) -> String {
    let mix = summarize_risk(&outcome.scored);
    let demand = recommendation_demand(&outcome.scored);
    let flagged = rank_by_risk(&context.filter.apply(&outcome.scored));

    let mut output = String::new();

    let _ = writeln!(output, "# Student Success Early Warning Report");
    let _ = writeln!(
        output,
        "Generated {} for {} (run {})",
        context.generated_at.format("%Y-%m-%d %H:%M UTC"),
        context.source,
        context.run_id
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Mix");

    if outcome.scored.is_empty() {
        let _ = writeln!(output, "No students scored in this run.");
    } else {
        let _ = writeln!(output, "- Students scored: {}", outcome.scored.len());
        for (tier, count) in &mix.tiers {
            let _ = writeln!(output, "- {tier} dropout risk: {count}");
        }
        let _ = writeln!(
            output,
            "- Sentiment: {} positive, {} negative",
            mix.positive, mix.negative
        );
        let _ = writeln!(output, "- Advisor alerts: {}", mix.alerts);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommendation Demand");

    if demand.iter().all(|(_, count)| *count == 0) {
        let _ = writeln!(output, "No recommendations issued.");
    } else {
        for (tag, count) in demand.iter().filter(|(_, count)| *count > 0) {
            let _ = writeln!(output, "- {tag}: {count}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Students: {}", context.filter.describe());

    if flagged.is_empty() {
        let _ = writeln!(output, "No students match this view.");
    } else {
        for student in flagged.iter().take(context.limit) {
            let _ = writeln!(output, "- {}", describe_student(student));
        }
        if flagged.len() > context.limit {
            let _ = writeln!(
                output,
                "- ... and {} more",
                flagged.len() - context.limit
            );
        }
    }

    if !outcome.failed.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Skipped Records");
        for failed in &outcome.failed {
            let _ = writeln!(output, "- {}: {}", failed.student_id, failed.error);
        }
    }

    output
}

/// One-line summary shared by the report and the `score` command.
pub fn describe_student(student: &ScoredStudent) -> String {
    let record = &student.record;
    let result = &student.result;
    let recommendations = if result.recommendations.is_empty() {
        "no recommendations".to_string()
    } else {
        result
            .recommendations
            .iter()
            .map(Recommendation::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "Student {} ({} risk, score {}, {} sentiment {:.2}){}: {}",
        record.student_id,
        result.dropout_risk,
        result.risk_score,
        result.sentiment,
        result.sentiment_score,
        if result.alert { " [advisor follow-up]" } else { "" },
        recommendations
    )
}
