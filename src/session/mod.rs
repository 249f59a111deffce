pub mod pool;
pub mod quiz;
pub mod result;

pub use pool::{DrillPool, FULL_RANGE, Policy};
pub use quiz::{Mode, Outcome, Phase, QuizSession, QuizSettings};
pub use result::SessionReport;
