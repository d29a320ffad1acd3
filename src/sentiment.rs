//! Message polarity collaborators.
//!
//! The scoring engine only consumes a polarity; anything that can turn text
//! into a number in [-1, 1] can stand in here.

/// Turns free text into a polarity in [-1.0, 1.0].
pub trait PolarityAnalyzer: Send + Sync {
    fn polarity(&self, text: &str) -> f64;
}

/// Always reports the same polarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPolarity(pub f64);

impl PolarityAnalyzer for FixedPolarity {
    fn polarity(&self, _text: &str) -> f64 {
        self.0
    }
}

/// Small word-list analyzer tuned for short student check-in messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconAnalyzer;

const NEGATION_WINDOW: usize = 3;
const NEGATION_SCALE: f64 = -0.5;

impl PolarityAnalyzer for LexiconAnalyzer {
    fn polarity(&self, text: &str) -> f64 {
        let normalized = text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'");
        let mut total = 0.0;
        let mut hits = 0usize;
        let mut multiplier = 1.0;
        let mut negation_left = 0usize;

        for token in normalized
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|token| !token.is_empty())
        {
            if is_negator(token) {
                negation_left = NEGATION_WINDOW;
                continue;
            }
            if let Some(boost) = intensifier(token) {
                multiplier *= boost;
                continue;
            }

            match word_polarity(token) {
                Some(value) => {
                    let mut value = value * multiplier;
                    if negation_left > 0 {
                        value *= NEGATION_SCALE;
                    }
                    total += value;
                    hits += 1;
                    multiplier = 1.0;
                    negation_left = 0;
                }
                None => {
                    negation_left = negation_left.saturating_sub(1);
                }
            }
        }

        if hits == 0 {
            return 0.0;
        }
        (total / hits as f64).clamp(-1.0, 1.0)
    }
}

fn is_negator(token: &str) -> bool {
    matches!(
        token,
        "not"
            | "no"
            | "never"
            | "don't"
            | "dont"
            | "doesn't"
            | "didn't"
            | "isn't"
            | "wasn't"
            | "can't"
            | "cannot"
            | "won't"
            | "aren't"
    )
}

fn intensifier(token: &str) -> Option<f64> {
    match token {
        "very" | "really" | "super" => Some(1.3),
        "so" | "too" => Some(1.2),
        "extremely" | "incredibly" => Some(1.5),
        "kinda" | "somewhat" | "slightly" => Some(0.6),
        _ => None,
    }
}

fn word_polarity(token: &str) -> Option<f64> {
    let value = match token {
        "great" | "excellent" | "amazing" | "awesome" => 0.8,
        "loving" | "love" | "loved" => 0.6,
        "best" => 1.0,
        "fun" | "enjoy" | "enjoying" => 0.4,
        "good" | "well" | "nice" | "happy" => 0.6,
        "interesting" | "motivated" | "focused" | "excited" | "confident" => 0.5,
        "okay" | "ok" | "alright" | "fine" => 0.2,
        "helpful" | "clear" | "progress" => 0.3,
        "struggling" | "struggle" | "issues" | "problems" => -0.4,
        "hard" | "tough" | "difficult" => -0.3,
        "lost" | "confused" | "behind" => -0.4,
        "stressed" | "anxious" | "worried" | "tired" => -0.5,
        "overwhelmed" | "frustrated" | "exhausted" => -0.6,
        "burnt" | "burned" | "hopeless" | "awful" | "terrible" => -0.8,
        "expensive" | "broke" | "afford" => -0.4,
        "drop" | "quit" | "fail" | "failing" => -0.5,
        "bad" | "sad" | "hate" => -0.7,
        "asap" | "help" => -0.1,
        _ => return None,
    };
    Some(value)
}
