//! 评分结果构建
//!
//! 把解析后的响应（字段位置和键名都可能不一致）规范化为 [`GradingResult`]。
//! 评分标准是唯一可信的总分来源；结构问题只记录警告，尽量返回结果

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::result::percentage_of;
use crate::models::{CriterionScore, GradingRequest, GradingResult, GradingStrategy};
use crate::services::field_aliases::{as_number, as_text, field, response_field};

/// 评分项缺少反馈时使用的占位文本
pub const MISSING_FEEDBACK: &str = "No feedback provided.";
/// 缺少总体反馈时使用的占位文本
pub const MISSING_OVERALL_FEEDBACK: &str = "No overall feedback provided.";

/// 构建评分结果所需的上下文
#[derive(Debug, Clone, Copy)]
pub struct ResultContext<'a> {
    pub request: &'a GradingRequest,
    pub strategy: GradingStrategy,
    pub model_used: &'a str,
}

/// 解析单个评分项
///
/// 缺少名称的项返回 `None`
pub fn build_criterion_score(
    item: &Map<String, Value>,
    request: &GradingRequest,
) -> Option<CriterionScore> {
    let Some(name) = field(item, "criterion_name").and_then(as_text) else {
        let shown = Value::Object(item.clone());
        warn!("⚠️ 评分项缺少名称，已忽略: {}", shown);
        return None;
    };
    let rubric_criterion = request.rubric.criterion(name);
    if rubric_criterion.is_none() {
        warn!("⚠️ 评分项 '{}' 不在评分标准中 ({})", name, request.rubric.summary());
    }

    let points_awarded = field(item, "points_awarded").and_then(as_number).unwrap_or_else(|| {
        warn!("⚠️ 评分项 '{}' 缺少得分，按 0 分处理", name);
        0.0
    });

    let max_points = field(item, "max_points")
        .and_then(as_number)
        .filter(|max| *max > 0.0)
        .or_else(|| rubric_criterion.map(|c| c.max_points))
        .unwrap_or_else(|| {
            warn!("⚠️ 评分项 '{}' 无法确定满分，使用得分代替", name);
            points_awarded.max(0.0)
        });

    if points_awarded < 0.0 || points_awarded > max_points {
        warn!(
            "⚠️ 评分项 '{}' 得分 {} 超出范围 [0, {}]",
            name, points_awarded, max_points
        );
    }

    let feedback = match field(item, "feedback").and_then(as_text) {
        Some(feedback) => feedback.to_string(),
        None => {
            warn!("⚠️ 评分项 '{}' 缺少反馈", name);
            MISSING_FEEDBACK.to_string()
        }
    };

    Some(CriterionScore {
        criterion_name: name.to_string(),
        points_awarded,
        max_points,
        feedback,
    })
}

/// 把解析后的响应规范化为评分结果
pub fn build_result(
    response: &Map<String, Value>,
    ctx: ResultContext<'_>,
    reasoning_trace: Option<String>,
) -> GradingResult {
    let breakdown: Vec<CriterionScore> = response_field(response, "breakdown")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .filter_map(|item| build_criterion_score(item, ctx.request))
                .collect()
        })
        .unwrap_or_default();
    if breakdown.is_empty() {
        warn!("⚠️ 响应中没有可用的评分项");
    }

    let breakdown_sum: f64 = breakdown.iter().map(|c| c.points_awarded).sum();
    let final_score = response_field(response, "total_score")
        .and_then(as_number)
        .unwrap_or_else(|| {
            debug!("响应缺少 total_score，使用各项得分之和 {}", breakdown_sum);
            breakdown_sum
        });

    let overall_feedback = build_overall_feedback(response);

    assemble(final_score, breakdown, overall_feedback, response, ctx, reasoning_trace)
}

/// 读取总体反馈（顶层优先）
pub fn build_overall_feedback(response: &Map<String, Value>) -> String {
    match response_field(response, "overall_feedback").and_then(as_text) {
        Some(feedback) => feedback.to_string(),
        None => {
            warn!("⚠️ 响应缺少总体反馈");
            MISSING_OVERALL_FEEDBACK.to_string()
        }
    }
}

/// 用已经确定的得分与评分项构建结果（投票策略直接使用）
pub fn finalize(
    final_score: f64,
    breakdown: Vec<CriterionScore>,
    overall_feedback: String,
    ctx: ResultContext<'_>,
    reasoning_trace: Option<String>,
) -> GradingResult {
    assemble(
        final_score,
        breakdown,
        overall_feedback,
        &Map::new(),
        ctx,
        reasoning_trace,
    )
}

fn assemble(
    final_score: f64,
    breakdown: Vec<CriterionScore>,
    overall_feedback: String,
    response: &Map<String, Value>,
    ctx: ResultContext<'_>,
    reasoning_trace: Option<String>,
) -> GradingResult {
    let total_points = ctx.request.rubric.total_points;

    // 以评分标准的总分为准
    let reported_total = response_field(response, "total_possible").and_then(as_number);
    let overridden = match reported_total {
        Some(reported) if (reported - total_points).abs() >= 0.01 => {
            warn!(
                "⚠️ 模型给出的总分 {} 与评分标准总分 {} 不一致，以评分标准为准",
                reported, total_points
            );
            true
        }
        _ => false,
    };

    let percentage = match response_field(response, "percentage").and_then(as_number) {
        Some(reported) if !overridden => reported,
        _ => percentage_of(final_score, total_points),
    };

    let result = GradingResult {
        final_score,
        total_points,
        percentage,
        breakdown,
        overall_feedback,
        grading_strategy: ctx.strategy,
        model_used: ctx.model_used.to_string(),
        timestamp: Utc::now(),
        reasoning_trace,
    };

    if !result.validate_score() {
        warn!(
            "⚠️ 各项得分之和 {:.2} 与总得分 {:.2} 不一致",
            result.breakdown_sum(),
            result.final_score
        );
    }
    if !result.validate_percentage() {
        warn!(
            "⚠️ 百分比 {:.1}% 与总得分 {:.2}/{:.2} 不一致",
            result.percentage, result.final_score, result.total_points
        );
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GradingRubric, RubricCriterion};
    use serde_json::json;

    fn request() -> GradingRequest {
        let rubric = GradingRubric::new(
            vec![
                RubricCriterion::new("Correctness", "works", 5.0),
                RubricCriterion::new("Quality", "clean", 3.0),
                RubricCriterion::new("Efficiency", "fast", 2.0),
            ],
            10.0,
        );
        GradingRequest::new("p", "r", rubric, "s", GradingStrategy::Cot)
    }

    fn build(response: Value, request: &GradingRequest) -> GradingResult {
        let ctx = ResultContext {
            request,
            strategy: GradingStrategy::Cot,
            model_used: "test-model",
        };
        build_result(response.as_object().unwrap(), ctx, None)
    }

    #[test]
    fn test_canonical_shape() {
        let request = request();
        let result = build(
            json!({
                "breakdown": [
                    {"criterion_name": "Correctness", "points_awarded": 4, "max_points": 5, "feedback": "ok"},
                    {"criterion_name": "Quality", "points_awarded": 2, "max_points": 3, "feedback": "ok"},
                    {"criterion_name": "Efficiency", "points_awarded": 2, "max_points": 2, "feedback": "ok"}
                ],
                "total_score": 8,
                "total_possible": 10,
                "percentage": 80,
                "overall_feedback": "Good"
            }),
            &request,
        );
        assert_eq!(result.final_score, 8.0);
        assert_eq!(result.percentage, 80.0);
        assert_eq!(result.breakdown.len(), 3);
        assert_eq!(result.model_used, "test-model");
        assert!(result.validate_score());
    }

    #[test]
    fn test_wrapped_legacy_shape() {
        let request = request();
        let result = build(
            json!({
                "final_grade": {
                    "breakdown": [
                        {"criterion": "Correctness", "score": "5", "max_score": 5, "feedback": "great"},
                        {"criterion": "Quality", "score": 3, "max_score": 3, "feedback": "clean"}
                    ],
                    "total_score": 8,
                    "overall_feedback": "Nice"
                }
            }),
            &request,
        );
        assert_eq!(result.breakdown[0].criterion_name, "Correctness");
        assert_eq!(result.breakdown[0].points_awarded, 5.0);
        assert_eq!(result.overall_feedback, "Nice");
        assert_eq!(result.percentage, 80.0);
    }

    #[test]
    fn test_nameless_item_is_skipped() {
        let request = request();
        let result = build(
            json!({
                "breakdown": [
                    {"points_awarded": 5, "max_points": 5, "feedback": "who?"},
                    {"criterion_name": "Quality", "points_awarded": 3, "max_points": 3, "feedback": "ok"}
                ],
                "overall_feedback": "x"
            }),
            &request,
        );
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].criterion_name, "Quality");
        assert_eq!(result.final_score, 3.0);
    }

    #[test]
    fn test_rubric_total_overrides_model_total() {
        let request = request();
        let result = build(
            json!({
                "breakdown": [{"criterion_name": "Correctness", "points_awarded": 5, "max_points": 5, "feedback": "ok"}],
                "total_score": 5,
                "total_possible": 20,
                "percentage": 25,
                "overall_feedback": "x"
            }),
            &request,
        );
        assert_eq!(result.total_points, 10.0);
        assert_eq!(result.percentage, 50.0);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let request = request();
        let result = build(
            json!({
                "breakdown": [
                    {"criterion_name": "Correctness", "points_awarded": 3},
                    {"criterion_name": "Quality", "points_awarded": 1.5, "max_points": 0, "feedback": "  "}
                ]
            }),
            &request,
        );
        assert_eq!(result.final_score, 4.5);
        assert_eq!(result.breakdown[0].max_points, 5.0);
        assert_eq!(result.breakdown[1].max_points, 3.0);
        assert_eq!(result.breakdown[1].feedback, MISSING_FEEDBACK);
        assert_eq!(result.overall_feedback, MISSING_OVERALL_FEEDBACK);
        assert_eq!(result.percentage, 45.0);
    }

    #[test]
    fn test_criterion_evaluations_fallback() {
        let request = request();
        let result = build(
            json!({
                "reasoning": {
                    "criterion_evaluations": [
                        {"criterion_name": "Efficiency", "analysis": "...", "points_awarded": 1, "max_points": 2, "feedback": "meh"}
                    ]
                },
                "total_score": 1,
                "overall_feedback": "x"
            }),
            &request,
        );
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].criterion_name, "Efficiency");
    }

    #[test]
    fn test_unnamed_item_is_skipped() {
        let request = request();
        let result = build(
            json!({"breakdown": [{"points_awarded": 1}], "total_score": 1, "overall_feedback": "x"}),
            &request,
        );
        assert!(result.breakdown.is_empty());
        assert_eq!(result.final_score, 1.0);
    }
}
