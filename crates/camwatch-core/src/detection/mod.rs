pub mod baseline;
pub mod engine;

pub use baseline::Baseline;
pub use engine::{Action, ChangeDetector, Evaluation};
