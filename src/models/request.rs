//! 评分请求与评分策略标识

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;
use crate::models::rubric::GradingRubric;

/// 评分策略（封闭枚举）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradingStrategy {
    /// 单次逐步推理
    #[default]
    Cot,
    /// 带示例的逐步推理
    FewShotCot,
    /// 多路并行投票
    Voting,
    /// 评估者-优化者迭代
    EvaluatorOptimizer,
}

/// 策略说明（名称、描述、速度、成本、准确度）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrategyInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub speed: &'static str,
    pub cost: &'static str,
    pub accuracy: &'static str,
}

impl GradingStrategy {
    pub const ALL: [GradingStrategy; 4] = [
        GradingStrategy::Cot,
        GradingStrategy::FewShotCot,
        GradingStrategy::Voting,
        GradingStrategy::EvaluatorOptimizer,
    ];

    /// 获取标识符
    pub fn as_str(self) -> &'static str {
        match self {
            GradingStrategy::Cot => "cot",
            GradingStrategy::FewShotCot => "few_shot_cot",
            GradingStrategy::Voting => "voting",
            GradingStrategy::EvaluatorOptimizer => "evaluator_optimizer",
        }
    }

    pub fn describe(self) -> StrategyInfo {
        match self {
            GradingStrategy::Cot => StrategyInfo {
                name: "Chain-of-Thought",
                description: "Instructs LLM to reason step-by-step before grading",
                speed: "Fast",
                cost: "Low",
                accuracy: "Good",
            },
            GradingStrategy::FewShotCot => StrategyInfo {
                name: "Few-Shot Chain-of-Thought",
                description: "Provides grading examples to teach the LLM patterns",
                speed: "Fast",
                cost: "Medium",
                accuracy: "Better",
            },
            GradingStrategy::Voting => StrategyInfo {
                name: "Voting/Parallelization",
                description: "Generates multiple independent grades and aggregates with voting",
                speed: "Slower",
                cost: "High",
                accuracy: "Best",
            },
            GradingStrategy::EvaluatorOptimizer => StrategyInfo {
                name: "Evaluator-Optimizer",
                description: "Two-agent iterative refinement with critique and improvement",
                speed: "Slower",
                cost: "High",
                accuracy: "Best",
            },
        }
    }
}

impl fmt::Display for GradingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradingStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GradingStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s.trim())
            .ok_or_else(|| {
                let available: Vec<&str> = GradingStrategy::ALL.iter().map(|s| s.as_str()).collect();
                AppError::invalid_request(format!(
                    "未知的评分策略 '{}'，可选: {}",
                    s,
                    available.join(", ")
                ))
            })
    }
}

/// 评分请求
///
/// 一个请求只产生一个评分结果，在整个评分流程中只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingRequest {
    pub problem_description: String,
    pub reference_solution: String,
    pub rubric: GradingRubric,
    pub student_code: String,
    #[serde(default)]
    pub grading_strategy: GradingStrategy,
}

impl GradingRequest {
    pub fn new(
        problem_description: impl Into<String>,
        reference_solution: impl Into<String>,
        rubric: GradingRubric,
        student_code: impl Into<String>,
        grading_strategy: GradingStrategy,
    ) -> Self {
        Self {
            problem_description: problem_description.into(),
            reference_solution: reference_solution.into(),
            rubric,
            student_code: student_code.into(),
            grading_strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_round_trip_names() {
        for strategy in GradingStrategy::ALL {
            assert_eq!(strategy.as_str().parse::<GradingStrategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_unknown_strategy_is_caller_error() {
        let err = "majority".parse::<GradingStrategy>().unwrap_err();
        assert!(err.is_caller_error());
        assert!(err.to_string().contains("evaluator_optimizer"));
    }

    #[test]
    fn test_strategy_serde_spelling() {
        let json = serde_json::to_string(&GradingStrategy::FewShotCot).unwrap();
        assert_eq!(json, "\"few_shot_cot\"");
        let parsed: GradingStrategy = serde_json::from_str("\"evaluator_optimizer\"").unwrap();
        assert_eq!(parsed, GradingStrategy::EvaluatorOptimizer);
    }

    #[test]
    fn test_request_defaults_to_cot() {
        let json = r#"{
            "problem_description": "max of two ints",
            "reference_solution": "int m(int a,int b){return a>b?a:b;}",
            "student_code": "int m(int a,int b){return a;}",
            "rubric": {"criteria": [{"name": "Correctness", "description": "works", "max_points": 10.0}], "total_points": 10.0}
        }"#;
        let request: GradingRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.grading_strategy, GradingStrategy::Cot);
        assert!(request.rubric.criteria[0].evaluation_guidelines.is_none());
    }
}
