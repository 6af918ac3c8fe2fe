pub mod evaluator;
pub mod model;

pub use evaluator::{assess, evaluate, Evaluation, Verdict};
pub use model::Condition;
