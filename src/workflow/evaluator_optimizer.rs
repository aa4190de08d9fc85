//! 评估者-优化者迭代评分
//!
//! 有界循环，评估者调用次数不超过 `max_iterations`：
//! 1. 评估者给出初始评分
//! 2. 优化者审查：认可则结束；有问题且还有次数则由评估者修订；否则结束
//! 3. 最终评分经结果构建器规范化，推理记录保留每一轮的评分与审查意见

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::clients::LlmClient;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::result::percentage_of;
use crate::models::{GradingRequest, GradingResult, GradingStrategy};
use crate::services::field_aliases::{as_number, response_field};
use crate::services::{build_result, Evaluator, Optimizer, ResultContext};
use crate::workflow::grader::{validate_request, Grader};
use crate::workflow::reasoning_trace::{format_iteration_trace, IterationRecord};

/// 评估者-优化者评分
pub struct EvaluatorOptimizerGrader {
    evaluator: Evaluator,
    optimizer: Optimizer,
    max_iterations: usize,
}

impl EvaluatorOptimizerGrader {
    pub fn new(client: Arc<dyn LlmClient>, config: &Config) -> Self {
        Self {
            evaluator: Evaluator::new(client.clone(), config),
            optimizer: Optimizer::new(client, config),
            max_iterations: config.evaluator_optimizer_max_iterations,
        }
    }

    fn record(grade: &Map<String, Value>, request: &GradingRequest) -> IterationRecord {
        let total_score = response_field(grade, "total_score")
            .and_then(as_number)
            .unwrap_or(0.0);
        let percentage = response_field(grade, "percentage")
            .and_then(as_number)
            .unwrap_or_else(|| percentage_of(total_score, request.rubric.total_points));
        IterationRecord {
            total_score,
            percentage,
            critique: None,
        }
    }
}

#[async_trait]
impl Grader for EvaluatorOptimizerGrader {
    fn strategy(&self) -> GradingStrategy {
        GradingStrategy::EvaluatorOptimizer
    }

    async fn grade(&self, request: &GradingRequest) -> AppResult<GradingResult> {
        validate_request(request)?;
        info!(
            "🚀 使用评估者-优化者策略评分 (最多 {} 轮)",
            self.max_iterations
        );

        // 初始评分失败直接返回
        let mut current = self.evaluator.evaluate(request).await?;
        let mut history = vec![Self::record(&current, request)];
        let mut evaluator_calls = 1;

        for iteration in 1..self.max_iterations {
            debug!("第 {} 轮: 优化者审查评分", iteration);
            let critique = match self.optimizer.critique(request, &current).await {
                Ok(critique) => critique,
                Err(e) => {
                    warn!("⚠️ 优化者审查失败，保留当前评分: {}", e);
                    break;
                }
            };
            if let Some(last) = history.last_mut() {
                last.critique = Some(critique.clone());
            }

            if critique.approved {
                info!("✓ 第 {} 轮评分获得优化者认可", iteration);
                break;
            }
            if !critique.has_issues() || evaluator_calls >= self.max_iterations {
                debug!("没有可修订的问题或已用完迭代次数，结束迭代");
                break;
            }

            debug!("第 {} 轮: 评估者根据 {} 个问题修订评分", iteration, critique.issues_found.len());
            match self.evaluator.refine(request, &current, &critique).await {
                Ok(refined) => {
                    current = refined;
                    evaluator_calls += 1;
                    history.push(Self::record(&current, request));
                }
                Err(e) => {
                    warn!("⚠️ 评估者修订失败，保留当前评分: {}", e);
                    break;
                }
            }
        }

        info!("✓ 评估者-优化者流程结束，共 {} 轮评分", history.len());

        let trace = format_iteration_trace(&history, self.max_iterations);
        let ctx = ResultContext {
            request,
            strategy: self.strategy(),
            model_used: self.evaluator.model_name(),
        };
        let result = build_result(&current, ctx, Some(trace));

        info!(
            "✓ [{}] 最终评分: {:.1}/{:.1} ({:.1}%)",
            result.grading_strategy, result.final_score, result.total_points, result.percentage
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::scripted::ScriptedClient;
    use crate::error::AppError;
    use crate::models::{GradingRubric, RubricCriterion};
    use crate::prompts::templates::{EVALUATOR_SYSTEM_PROMPT, OPTIMIZER_SYSTEM_PROMPT};

    fn request() -> GradingRequest {
        let rubric = GradingRubric::new(vec![RubricCriterion::new("Correctness", "c", 10.0)], 10.0);
        GradingRequest::new("p", "r", rubric, "s", GradingStrategy::EvaluatorOptimizer)
    }

    fn grade(score: f64) -> String {
        format!(
            r#"{{"breakdown": [{{"criterion_name": "Correctness", "points_awarded": {score}, "max_points": 10, "feedback": "f"}}], "total_score": {score}, "overall_feedback": "o"}}"#
        )
    }

    fn rejection() -> String {
        r#"{"approved": false, "issues_found": [{"criterion": "Correctness", "issue": "too high", "suggested_score": 5, "reasoning": "bug"}], "overall_assessment": "no", "confidence": 0.7}"#.to_string()
    }

    fn approval() -> String {
        r#"{"approved": true, "issues_found": [], "overall_assessment": "fair", "confidence": 0.9}"#.to_string()
    }

    fn calls(client: &ScriptedClient, system_prompt: &str) -> usize {
        client
            .requests()
            .iter()
            .filter(|r| r.system_prompt == system_prompt)
            .count()
    }

    fn config(max_iterations: usize) -> Config {
        Config {
            evaluator_optimizer_max_iterations: max_iterations,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_never_approved_stops_at_budget() {
        let client = Arc::new(ScriptedClient::new([
            grade(9.0),
            rejection(),
            grade(7.0),
            rejection(),
            grade(5.0),
        ]));
        let grader = EvaluatorOptimizerGrader::new(client.clone(), &config(3));

        let result = grader.grade(&request()).await.unwrap();
        assert_eq!(calls(&client, EVALUATOR_SYSTEM_PROMPT), 3);
        assert_eq!(calls(&client, OPTIMIZER_SYSTEM_PROMPT), 2);
        assert_eq!(result.final_score, 5.0);
        assert_eq!(result.grading_strategy, GradingStrategy::EvaluatorOptimizer);

        let trace = result.reasoning_trace.unwrap();
        assert!(trace.starts_with("## Evaluator-Optimizer Workflow (3 iterations)"));
        assert!(trace.contains("### Iteration 1\n**Grade:** 9.0 (90%)"));
        assert!(trace.contains("### Iteration 3\n**Grade:** 5.0 (50%)"));
        assert!(trace.contains("  - Correctness: 5 (too high)"));
    }

    #[tokio::test]
    async fn test_first_critique_approves() {
        let client = Arc::new(ScriptedClient::new([grade(8.0), approval()]));
        let grader = EvaluatorOptimizerGrader::new(client.clone(), &config(3));

        let result = grader.grade(&request()).await.unwrap();
        assert_eq!(calls(&client, EVALUATOR_SYSTEM_PROMPT), 1);
        assert_eq!(calls(&client, OPTIMIZER_SYSTEM_PROMPT), 1);
        assert_eq!(result.final_score, 8.0);
        assert!(result.reasoning_trace.unwrap().contains("- Approved: true"));
    }

    #[tokio::test]
    async fn test_not_approved_without_issues_stops() {
        let client = Arc::new(ScriptedClient::new([
            grade(6.0),
            r#"{"approved": false, "issues_found": []}"#.to_string(),
        ]));
        let grader = EvaluatorOptimizerGrader::new(client.clone(), &config(3));

        grader.grade(&request()).await.unwrap();
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_single_iteration_budget_skips_critique() {
        let client = Arc::new(ScriptedClient::new([grade(4.0)]));
        let grader = EvaluatorOptimizerGrader::new(client.clone(), &config(1));

        let result = grader.grade(&request()).await.unwrap();
        assert_eq!(client.call_count(), 1);
        assert_eq!(result.final_score, 4.0);
    }

    #[tokio::test]
    async fn test_optimizer_failure_keeps_grade() {
        let client = Arc::new(ScriptedClient::new([grade(7.0)]));
        client.push_failure();
        let grader = EvaluatorOptimizerGrader::new(client.clone(), &config(3));

        let result = grader.grade(&request()).await.unwrap();
        assert_eq!(result.final_score, 7.0);
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_initial_failure_propagates() {
        let client = Arc::new(ScriptedClient::new(["not a grade"]));
        let grader = EvaluatorOptimizerGrader::new(client, &config(3));
        let err = grader.grade(&request()).await.unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }
}
