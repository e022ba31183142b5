pub mod interval;
pub mod configuration;
pub mod evaluation;

pub use interval::Interval;
pub use configuration::Configuration;
pub use evaluation::{EvaluationResult, Visibility};

/// A point in wall-clock time.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
