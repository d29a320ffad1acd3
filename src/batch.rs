use std::sync::Arc;

use crate::error::RecordError;
use crate::models::{BatchOutcome, FailedRecord, ScoredStudent, SentimentResult, StudentRecord};
use crate::risk::ScoringEngine;
use crate::sentiment::PolarityAnalyzer;

pub type RecordResult = Result<StudentRecord, RecordError>;

pub fn score_batch(
    rows: Vec<RecordResult>,
    engine: &ScoringEngine,
    analyzer: &dyn PolarityAnalyzer,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for row in rows {
        match row {
            Ok(record) => {
                let sentiment = SentimentResult::from_polarity(analyzer.polarity(&record.message));
                let result = engine.score(&record, &sentiment);
                tracing::debug!(
                    student_id = %record.student_id,
                    risk_score = result.risk_score,
                    dropout_risk = %result.dropout_risk,
                    alert = result.alert,
                    "scored student"
                );
                outcome.scored.push(ScoredStudent { record, result });
            }
            Err(err) => outcome.failed.push(FailedRecord::from(err)),
        }
    }

    outcome
}

/// Score contiguous chunks on blocking workers and stitch them back together
/// in input order.
pub async fn score_batch_parallel(
    rows: Vec<RecordResult>,
    engine: ScoringEngine,
    analyzer: Arc<dyn PolarityAnalyzer>,
    workers: usize,
) -> anyhow::Result<BatchOutcome> {
    let workers = workers.clamp(1, rows.len().max(1));
    let chunk_size = rows.len().div_ceil(workers).max(1);

    let mut chunks = Vec::with_capacity(rows.len().div_ceil(chunk_size));
    let mut rows = rows.into_iter().peekable();
    while rows.peek().is_some() {
        chunks.push(rows.by_ref().take(chunk_size).collect::<Vec<_>>());
    }

    let handles: Vec<_> = chunks
        .into_iter()
        .map(|chunk| {
            let analyzer = Arc::clone(&analyzer);
            tokio::task::spawn_blocking(move || score_batch(chunk, &engine, analyzer.as_ref()))
        })
        .collect();

    let mut outcome = BatchOutcome::default();
    for handle in handles {
        outcome.extend(handle.await?);
    }

    tracing::info!(
        scored = outcome.scored.len(),
        failed = outcome.failed.len(),
        workers,
        "batch scored"
    );
    Ok(outcome)
}
