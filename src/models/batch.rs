//! 批量评分的请求与结果

use serde::{Deserialize, Serialize};

use crate::models::request::{GradingRequest, GradingStrategy};
use crate::models::result::GradingResult;
use crate::models::rubric::GradingRubric;

/// 批量评分中的单个提交
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSubmission {
    pub filename: String,
    pub student_code: String,
}

/// 批量评分请求：共享题目、参考答案、评分标准和策略
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchGradingRequest {
    pub problem_description: String,
    pub reference_solution: String,
    pub rubric: GradingRubric,
    #[serde(default)]
    pub grading_strategy: GradingStrategy,
    pub submissions: Vec<BatchSubmission>,
}

impl BatchGradingRequest {
    /// 为单个提交构建独立的评分请求
    pub fn request_for(&self, submission: &BatchSubmission) -> GradingRequest {
        GradingRequest::new(
            self.problem_description.clone(),
            self.reference_solution.clone(),
            self.rubric.clone(),
            submission.student_code.clone(),
            self.grading_strategy,
        )
    }
}

/// 单个提交的评分结果，成功时带 result，失败时带 error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItemResult {
    pub filename: String,
    #[serde(default)]
    pub result: Option<GradingResult>,
    #[serde(default)]
    pub error: Option<String>,
}

impl BatchItemResult {
    pub fn ok(filename: impl Into<String>, result: GradingResult) -> Self {
        Self {
            filename: filename.into(),
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            result: None,
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_some()
    }
}

/// 批量评分结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchGradingResult {
    pub count: usize,
    pub ok: usize,
    pub results: Vec<BatchItemResult>,
}

impl BatchGradingResult {
    pub fn from_items(results: Vec<BatchItemResult>) -> Self {
        Self {
            count: results.len(),
            ok: results.iter().filter(|r| r.is_ok()).count(),
            results,
        }
    }

    pub fn failed(&self) -> usize {
        self.count - self.ok
    }
}
