use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::pool::Policy;
use crate::session::quiz::{Mode, QuizSession};

pub const ENCOURAGEMENT: &str =
    "Learning is like rowing upstream: not to advance is to drop back. Keep practicing every day!";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionReport {
    pub right: u32,
    pub wrong: u32,
    pub attempts: usize,
    /// Right answers as a percentage of attempts.
    pub accuracy: f64,
    pub policy: Policy,
    pub mode: Mode,
    /// Words still drawable when the report was taken.
    #[serde(default)]
    pub remaining: usize,
    #[serde(default)]
    pub missed: Vec<String>,
    pub finished_at: DateTime<Utc>,
}

impl SessionReport {
    pub fn from_session(session: &QuizSession) -> Self {
        Self {
            right: session.right(),
            wrong: session.wrong(),
            attempts: session.attempts(),
            accuracy: (session.success_ratio() * 100.0).clamp(0.0, 100.0),
            policy: session.policy(),
            mode: session.mode(),
            remaining: session.pool().len(),
            missed: session.missed().map(|e| e.foreign.clone()).collect(),
            finished_at: Utc::now(),
        }
    }

    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("You were tested on {} words", self.attempts),
            format!("right: {}", self.right),
            format!("wrong: {}", self.wrong),
            format!("accuracy: {:.1}%", self.accuracy),
            ENCOURAGEMENT.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::engine::collection::WordCollection;
    use crate::engine::word::WordEntry;
    use crate::session::pool::{DrillPool, FULL_RANGE};
    use crate::session::quiz::QuizSettings;

    #[test]
    fn test_report_from_session() {
        let book = WordCollection::from_entries(
            "t",
            vec![WordEntry::new("cat", "猫"), WordEntry::new("dog", "狗")],
        );
        let mut pool = DrillPool::new();
        pool.add_range(&book, FULL_RANGE);
        let mut quiz = QuizSession::with_rng(
            pool,
            QuizSettings {
                policy: Policy::Sequential,
                ..QuizSettings::default()
            },
            SmallRng::seed_from_u64(0),
        );
        quiz.submit("cat").unwrap();
        quiz.advance();
        quiz.submit("dgo").unwrap();

        let report = SessionReport::from_session(&quiz);
        assert_eq!(report.right, 1);
        assert_eq!(report.wrong, 1);
        assert_eq!(report.attempts, 2);
        assert!((report.accuracy - 50.0).abs() < 1e-9);
        assert_eq!(report.missed, vec!["dog".to_string()]);
        assert!(report.summary_lines()[3].contains("50.0%"));
    }

    #[test]
    fn test_report_without_attempts() {
        let quiz = QuizSession::with_rng(
            DrillPool::new(),
            QuizSettings::default(),
            SmallRng::seed_from_u64(0),
        );
        let report = SessionReport::from_session(&quiz);
        assert_eq!(report.accuracy, 0.0);
    }

    #[test]
    fn test_report_json_defaults() {
        let json = r#"{"right":1,"wrong":0,"attempts":1,"accuracy":100.0,
            "policy":"random","mode":"spelling","finished_at":"2024-01-01T00:00:00Z"}"#;
        let report: SessionReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.remaining, 0);
        assert!(report.missed.is_empty());
    }
}
