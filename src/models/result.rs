//! 评分结果

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::request::GradingStrategy;

/// 单个评分项的得分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion_name: String,
    pub points_awarded: f64,
    pub max_points: f64,
    pub feedback: String,
}

/// 完整的评分结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    pub final_score: f64,
    /// 始终等于请求中评分标准的总分
    pub total_points: f64,
    /// 0-100
    pub percentage: f64,
    pub breakdown: Vec<CriterionScore>,
    pub overall_feedback: String,
    pub grading_strategy: GradingStrategy,
    pub model_used: String,
    pub timestamp: DateTime<Utc>,
    /// 策略的推理记录，仅用于审计
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_trace: Option<String>,
}

impl GradingResult {
    /// 各项得分之和是否等于总得分（误差 0.01）
    pub fn validate_score(&self) -> bool {
        (self.breakdown_sum() - self.final_score).abs() < 0.01
    }

    /// 百分比是否与总得分一致（误差 0.1）
    pub fn validate_percentage(&self) -> bool {
        if self.total_points <= 0.0 {
            return false;
        }
        let expected = self.final_score / self.total_points * 100.0;
        (expected - self.percentage).abs() < 0.1
    }

    pub fn breakdown_sum(&self) -> f64 {
        self.breakdown.iter().map(|c| c.points_awarded).sum()
    }
}

/// 计算百分比，总分不为正时返回 0
pub fn percentage_of(score: f64, total: f64) -> f64 {
    if total > 0.0 {
        score / total * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(scores: &[f64], final_score: f64, percentage: f64) -> GradingResult {
        GradingResult {
            final_score,
            total_points: 10.0,
            percentage,
            breakdown: scores
                .iter()
                .enumerate()
                .map(|(i, s)| CriterionScore {
                    criterion_name: format!("C{}", i),
                    points_awarded: *s,
                    max_points: 5.0,
                    feedback: "ok".to_string(),
                })
                .collect(),
            overall_feedback: "fine".to_string(),
            grading_strategy: GradingStrategy::Cot,
            model_used: "gpt-4o".to_string(),
            timestamp: Utc::now(),
            reasoning_trace: None,
        }
    }

    #[test]
    fn test_validate_score() {
        assert!(result(&[4.5, 3.0], 7.5, 75.0).validate_score());
        assert!(!result(&[4.5, 3.0], 8.0, 80.0).validate_score());
    }

    #[test]
    fn test_validate_percentage() {
        assert!(result(&[4.5, 3.0], 7.5, 75.05).validate_percentage());
        assert!(!result(&[4.5, 3.0], 7.5, 80.0).validate_percentage());
    }

    #[test]
    fn test_reasoning_trace_omitted_when_absent() {
        let json = serde_json::to_value(result(&[1.0], 1.0, 10.0)).unwrap();
        assert!(json.get("reasoning_trace").is_none());
        assert_eq!(json["grading_strategy"], "cot");
    }

    #[test]
    fn test_percentage_of() {
        assert_eq!(percentage_of(5.0, 10.0), 50.0);
        assert_eq!(percentage_of(5.0, 0.0), 0.0);
    }
}
