use thiserror::Error;

/// A single record that could not be turned into a scorable student.
///
/// These never abort a batch; they are collected next to the scored results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("student {student_id}: {field} is not numeric ('{value}')")]
    InvalidRecord {
        student_id: String,
        field: &'static str,
        value: String,
    },
    #[error("line {line}: {message}")]
    Unreadable { line: u64, message: String },
}

impl RecordError {
    /// Identifier shown to the caller for a failed record.
    pub fn record_label(&self) -> String {
        match self {
            RecordError::InvalidRecord { student_id, .. } => student_id.clone(),
            RecordError::Unreadable { line, .. } => format!("line {line}"),
        }
    }
}
