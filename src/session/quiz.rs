use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::engine::word::WordEntry;
use crate::error::DrillError;
use crate::session::pool::{DrillPool, Policy};

/// Literal answer that marks a word as known in recognition mode.
pub const KNOWN_ANSWER: &str = "y";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Native term shown, foreign term typed.
    #[default]
    Spelling,
    /// Foreign term shown, user self-reports whether they know it.
    Recognition,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Spelling => "spelling",
            Mode::Recognition => "recognition",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "spell" | "spelling" => Some(Mode::Spelling),
            "recognize" | "recognition" | "interpret" => Some(Mode::Recognition),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizSettings {
    pub policy: Policy,
    pub mode: Mode,
    pub max_attempts: usize,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            policy: Policy::default(),
            mode: Mode::default(),
            max_attempts: 1000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Prompting,
    /// The last spelling answer was wrong; `expected` must be retyped.
    AwaitingRetry { expected: String },
    Finished,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Wrong { expected: WordEntry, first_miss: bool },
    RetryAccepted,
    RetryMismatch { expected: String },
    Recognized { entry: WordEntry, known: bool },
}

impl Outcome {
    /// Whether the caller should advance to the next prompt.
    pub fn advances(&self) -> bool {
        matches!(
            self,
            Outcome::Correct | Outcome::RetryAccepted | Outcome::Recognized { .. }
        )
    }
}

/// One drill run over an owned pool.
pub struct QuizSession {
    pool: DrillPool,
    policy: Policy,
    mode: Mode,
    max_attempts: usize,
    phase: Phase,
    current: Option<WordEntry>,
    right: u32,
    wrong: u32,
    wrong_seen: BTreeMap<String, WordEntry>,
    rng: SmallRng,
}

impl QuizSession {
    /// Start a session and present the first prompt.
    pub fn with_rng(pool: DrillPool, settings: QuizSettings, rng: SmallRng) -> Self {
        let mut session = Self {
            pool,
            policy: settings.policy,
            mode: settings.mode,
            max_attempts: settings.max_attempts.max(1),
            phase: Phase::Prompting,
            current: None,
            right: 0,
            wrong: 0,
            wrong_seen: BTreeMap::new(),
            rng,
        };
        session.advance();
        session
    }

    /// Move to the next prompt, or finish when attempts are used up or the
    /// pool is exhausted. A pending retry is abandoned.
    pub fn advance(&mut self) -> Option<&WordEntry> {
        if self.phase == Phase::Finished {
            return None;
        }
        if self.attempts() >= self.max_attempts {
            self.finish();
            return None;
        }
        match self.pool.next(self.policy, &mut self.rng).cloned() {
            Some(entry) => {
                self.current = Some(entry);
                self.phase = Phase::Prompting;
                self.current.as_ref()
            }
            None => {
                self.finish();
                None
            }
        }
    }

    pub fn submit(&mut self, answer: &str) -> Result<Outcome, DrillError> {
        if self.phase == Phase::Finished {
            return Err(DrillError::SessionFinished);
        }
        let Some(current) = self.current.clone() else {
            return Err(DrillError::SessionFinished);
        };
        let outcome = match self.mode {
            Mode::Spelling => self.check_spelling(current, answer),
            Mode::Recognition => self.check_recognition(current, answer),
        };
        Ok(outcome)
    }

    fn check_spelling(&mut self, current: WordEntry, answer: &str) -> Outcome {
        if let Phase::AwaitingRetry { expected } = &self.phase {
            if answer != expected.as_str() {
                return Outcome::RetryMismatch {
                    expected: expected.clone(),
                };
            }
            self.pool.on_answered(self.policy, answer, false);
            self.phase = Phase::Prompting;
            return Outcome::RetryAccepted;
        }

        if answer == current.foreign {
            if !self.wrong_seen.contains_key(current.key()) {
                self.right += 1;
            }
            self.pool.on_answered(self.policy, answer, true);
            return Outcome::Correct;
        }

        let first_miss = self.record_miss(&current);
        self.phase = Phase::AwaitingRetry {
            expected: current.foreign.clone(),
        };
        Outcome::Wrong {
            expected: current,
            first_miss,
        }
    }

    fn check_recognition(&mut self, current: WordEntry, answer: &str) -> Outcome {
        let known = answer == KNOWN_ANSWER;
        if known {
            self.right += 1;
        } else {
            self.record_miss(&current);
        }
        // Recognition never re-asks, so every answer passes the word.
        self.pool.on_answered(self.policy, current.key(), true);
        Outcome::Recognized {
            entry: current,
            known,
        }
    }

    /// Count a miss once per word per run.
    fn record_miss(&mut self, entry: &WordEntry) -> bool {
        if self.wrong_seen.contains_key(entry.key()) {
            return false;
        }
        self.wrong_seen
            .insert(entry.key().to_string(), entry.clone());
        self.wrong += 1;
        true
    }

    /// Switching to sequential restarts the walk from the first word.
    pub fn set_policy(&mut self, policy: Policy) {
        if policy == self.policy {
            return;
        }
        self.policy = policy;
        if policy == Policy::Sequential {
            self.pool.reset_cursor();
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn set_max_attempts(&mut self, max_attempts: usize) -> Result<(), DrillError> {
        if max_attempts == 0 {
            return Err(DrillError::InvalidMaxAttempts(max_attempts.to_string()));
        }
        self.max_attempts = max_attempts;
        Ok(())
    }

    /// New run over `pool`: counters and misses are cleared.
    pub fn restart(&mut self, pool: DrillPool) {
        self.pool = pool;
        self.right = 0;
        self.wrong = 0;
        self.wrong_seen.clear();
        self.current = None;
        self.phase = Phase::Prompting;
        self.advance();
    }

    /// Swap the pool but keep the running score.
    pub fn replace_pool(&mut self, pool: DrillPool) {
        self.pool = pool;
        if self.phase != Phase::Finished {
            self.advance();
        }
    }

    pub fn quit(&mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        self.phase = Phase::Finished;
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn current(&self) -> Option<&WordEntry> {
        self.current.as_ref()
    }

    /// The term shown to the user for the current word.
    pub fn prompt_text(&self) -> Option<&str> {
        let current = self.current.as_ref()?;
        Some(match self.mode {
            Mode::Spelling => &current.native,
            Mode::Recognition => &current.foreign,
        })
    }

    pub fn pending_retry(&self) -> Option<&str> {
        match &self.phase {
            Phase::AwaitingRetry { expected } => Some(expected),
            _ => None,
        }
    }

    pub fn right(&self) -> u32 {
        self.right
    }

    pub fn wrong(&self) -> u32 {
        self.wrong
    }

    pub fn attempts(&self) -> usize {
        (self.right + self.wrong) as usize
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn pool(&self) -> &DrillPool {
        &self.pool
    }

    /// Words missed at least once this run, by foreign term.
    pub fn missed(&self) -> impl Iterator<Item = &WordEntry> {
        self.wrong_seen.values()
    }

    /// Share of right answers, 0.0 before any attempt.
    pub fn success_ratio(&self) -> f64 {
        let attempts = self.attempts();
        if attempts == 0 {
            return 0.0;
        }
        self.right as f64 / attempts as f64
    }
}
