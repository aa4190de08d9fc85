pub mod cot;
pub mod evaluator_optimizer;
pub mod few_shot_cot;
pub mod grader;
pub mod reasoning_trace;
pub mod voting;

pub use cot::CotGrader;
pub use evaluator_optimizer::EvaluatorOptimizerGrader;
pub use few_shot_cot::FewShotCotGrader;
pub use grader::{validate_request, validate_rubric, Grader, Graders};
pub use voting::VotingGrader;
