pub mod batch;
pub mod loaders;
pub mod request;
pub mod result;
pub mod rubric;

pub use batch::{BatchGradingRequest, BatchGradingResult, BatchItemResult, BatchSubmission};
pub use loaders::{load_grading_job, GradingJob};
pub use request::{GradingRequest, GradingStrategy, StrategyInfo};
pub use result::{CriterionScore, GradingResult};
pub use rubric::{GradingRubric, RubricCriterion};
