pub mod evaluator;
pub mod field_aliases;
pub mod optimizer;
pub mod response_parser;
pub mod result_builder;
pub mod voting_system;

pub use evaluator::Evaluator;
pub use optimizer::{Critique, CritiqueIssue, Optimizer};
pub use response_parser::{extract_json, parse_grading_response, validate_grading_response};
pub use result_builder::{build_result, finalize, ResultContext};
pub use voting_system::{aggregate_votes, merge_feedback, voter_temperatures, Vote, VoteAggregate};
