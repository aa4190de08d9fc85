//! 评分标准

use serde::{Deserialize, Serialize};

/// 总分与各项满分之和允许的误差
pub const RUBRIC_TOLERANCE: f64 = 0.01;

/// 评分标准中的单个评分项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricCriterion {
    /// 评分项名称（在同一评分标准内唯一）
    pub name: String,
    pub description: String,
    /// 满分（> 0）
    pub max_points: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_guidelines: Option<String>,
}

impl RubricCriterion {
    pub fn new(name: impl Into<String>, description: impl Into<String>, max_points: f64) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            max_points,
            evaluation_guidelines: None,
        }
    }

    pub fn with_guidelines(mut self, guidelines: impl Into<String>) -> Self {
        self.evaluation_guidelines = Some(guidelines.into());
        self
    }
}

/// 评分标准
///
/// 构造时不做检查，评分前必须调用 [`GradingRubric::validate_total`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingRubric {
    pub criteria: Vec<RubricCriterion>,
    pub total_points: f64,
}

impl GradingRubric {
    pub fn new(criteria: Vec<RubricCriterion>, total_points: f64) -> Self {
        Self {
            criteria,
            total_points,
        }
    }

    /// 各项满分之和
    pub fn criteria_sum(&self) -> f64 {
        self.criteria.iter().map(|c| c.max_points).sum()
    }

    /// 总分是否等于各项满分之和（误差 0.01）
    pub fn validate_total(&self) -> bool {
        (self.criteria_sum() - self.total_points).abs() < RUBRIC_TOLERANCE
    }

    /// 按名称查找评分项
    pub fn criterion(&self, name: &str) -> Option<&RubricCriterion> {
        self.criteria.iter().find(|c| c.name == name)
    }

    /// 用于错误信息的评分项摘要，例如 `Correctness(5), Quality(3)`
    pub fn summary(&self) -> String {
        self.criteria
            .iter()
            .map(|c| format!("{}({})", c.name, c.max_points))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rubric(points: &[f64], total: f64) -> GradingRubric {
        let criteria = points
            .iter()
            .enumerate()
            .map(|(i, p)| RubricCriterion::new(format!("C{}", i), "desc", *p))
            .collect();
        GradingRubric::new(criteria, total)
    }

    #[test]
    fn test_validate_total_exact() {
        assert!(rubric(&[5.0, 3.0, 2.0], 10.0).validate_total());
    }

    #[test]
    fn test_validate_total_within_tolerance() {
        assert!(rubric(&[3.333, 3.333, 3.333], 10.0).validate_total());
        assert!(!rubric(&[3.3, 3.3, 3.3], 10.0).validate_total());
    }

    #[test]
    fn test_validate_total_mismatch() {
        assert!(!rubric(&[5.0, 3.0], 10.0).validate_total());
    }

    #[test]
    fn test_summary_and_lookup() {
        let r = GradingRubric::new(
            vec![
                RubricCriterion::new("Correctness", "works", 5.0),
                RubricCriterion::new("Quality", "clean", 3.0).with_guidelines("naming"),
            ],
            8.0,
        );
        assert_eq!(r.summary(), "Correctness(5), Quality(3)");
        assert_eq!(r.criterion("Quality").unwrap().max_points, 3.0);
        assert!(r.criterion("Efficiency").is_none());
    }
}
