use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Rule thresholds shared by every record in a batch.
///
/// Loaded once before scoring starts; the engine owns a copy, so a batch
/// never observes a change mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// GPA strictly below this counts as an academic risk.
    pub gpa_below: f64,
    /// Attendance percentage strictly below this counts as a risk.
    pub attendance_below: f64,
    /// LMS login count strictly below this counts as a risk.
    pub lms_logins_below: i64,
    /// Lowest risk score classified as Medium.
    pub medium_at: u8,
    /// Lowest risk score classified as High.
    pub high_at: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            gpa_below: 2.5,
            attendance_below: 70.0,
            lms_logins_below: 10,
            medium_at: 2,
            high_at: 3,
        }
    }
}

/// Validate thresholds, returning every problem at once.
pub fn validate_thresholds(thresholds: &Thresholds) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if !thresholds.gpa_below.is_finite() {
        errors.push("gpa_below: must be a finite number".to_string());
    }
    if !thresholds.attendance_below.is_finite() {
        errors.push("attendance_below: must be a finite number".to_string());
    }
    if thresholds.medium_at == 0 {
        errors.push("medium_at: must be at least 1".to_string());
    }
    if thresholds.medium_at > thresholds.high_at {
        errors.push(format!(
            "medium_at: {} is above high_at {}",
            thresholds.medium_at, thresholds.high_at
        ));
    }
    if thresholds.high_at > 4 {
        errors.push(format!(
            "high_at: {} is unreachable, the risk score tops out at 4",
            thresholds.high_at
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Load thresholds from a JSON file, or fall back to the built-in defaults.
pub fn load_thresholds(path: Option<&Path>) -> anyhow::Result<Thresholds> {
    let Some(path) = path else {
        return Ok(Thresholds::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read thresholds file {}", path.display()))?;
    let thresholds: Thresholds = serde_json::from_str(&content)
        .with_context(|| format!("invalid thresholds JSON in {}", path.display()))?;

    if let Err(errors) = validate_thresholds(&thresholds) {
        anyhow::bail!(
            "invalid thresholds in {}:\n  {}",
            path.display(),
            errors.join("\n  ")
        );
    }

    tracing::debug!(?thresholds, path = %path.display(), "loaded thresholds");
    Ok(thresholds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_hand_authored_constants() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.gpa_below, 2.5);
        assert_eq!(thresholds.attendance_below, 70.0);
        assert_eq!(thresholds.lms_logins_below, 10);
        assert_eq!(thresholds.medium_at, 2);
        assert_eq!(thresholds.high_at, 3);
        assert!(validate_thresholds(&thresholds).is_ok());
    }

    #[test]
    fn partial_json_takes_defaults() {
        let thresholds: Thresholds = serde_json::from_str(r#"{ "gpa_below": 2.0 }"#).unwrap();
        assert_eq!(thresholds.gpa_below, 2.0);
        assert_eq!(thresholds.attendance_below, 70.0);
        assert_eq!(thresholds.high_at, 3);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = serde_json::from_str::<Thresholds>(r#"{ "gpa": 2.0 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn collects_all_errors() {
        let thresholds = Thresholds {
            medium_at: 4,
            high_at: 5,
            gpa_below: f64::NAN,
            ..Thresholds::default()
        };
        let errors = validate_thresholds(&thresholds).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("gpa_below"));
        assert!(errors[1].contains("high_at"));
    }

    #[test]
    fn load_without_path_uses_defaults() {
        assert_eq!(load_thresholds(None).unwrap(), Thresholds::default());
    }

    #[test]
    fn load_rejects_inverted_tiers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thresholds.json");
        std::fs::write(&path, r#"{ "medium_at": 3, "high_at": 2 }"#).unwrap();

        let err = load_thresholds(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("medium_at"));
    }

    #[test]
    fn load_reads_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thresholds.json");
        std::fs::write(&path, r#"{ "lms_logins_below": 5 }"#).unwrap();

        let thresholds = load_thresholds(Some(&path)).unwrap();
        assert_eq!(thresholds.lms_logins_below, 5);
        assert_eq!(thresholds.gpa_below, 2.5);
    }
}
