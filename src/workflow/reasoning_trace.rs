//! 推理记录
//!
//! 只用于审计，不参与计分

use serde_json::{Map, Value};

use crate::services::field_aliases::{as_number, as_text, field};
use crate::services::Critique;

/// 把模型的推理过程整理成可读文本
///
/// 依次为：题目理解、参考答案分析、学生代码分析、逐项评估。
/// 响应中没有 `reasoning` 时返回 `None`
pub fn format_reasoning_trace(response: &Map<String, Value>) -> Option<String> {
    let reasoning = response.get("reasoning").and_then(Value::as_object)?;
    let mut parts: Vec<String> = Vec::new();

    let sections = [
        ("understanding", "## Problem Understanding"),
        ("reference_analysis", "## Reference Solution Analysis"),
        ("code_analysis", "## Student Code Analysis"),
    ];
    for (key, heading) in sections {
        if let Some(text) = reasoning.get(key).and_then(as_text) {
            parts.push(heading.to_string());
            parts.push(text.to_string());
            parts.push(String::new());
        }
    }

    if let Some(evaluations) = reasoning.get("criterion_evaluations").and_then(Value::as_array) {
        parts.push("## Criterion-by-Criterion Evaluation".to_string());
        for evaluation in evaluations.iter().filter_map(Value::as_object) {
            let name = field(evaluation, "criterion_name")
                .and_then(as_text)
                .unwrap_or("Unknown");
            let points = field(evaluation, "points_awarded").and_then(as_number).unwrap_or(0.0);
            let max = field(evaluation, "max_points").and_then(as_number).unwrap_or(0.0);
            let analysis = field(evaluation, "analysis").and_then(as_text).unwrap_or_default();

            parts.push(format!("\n### {} ({}/{})", name, points, max));
            parts.push(analysis.to_string());
        }
    }

    if parts.is_empty() {
        return None;
    }
    Some(parts.join("\n"))
}

/// 评估者-优化者的一轮记录
#[derive(Debug, Clone)]
pub struct IterationRecord {
    pub total_score: f64,
    pub percentage: f64,
    /// 本轮评分收到的审查意见（最后一轮可能没有）
    pub critique: Option<Critique>,
}

/// 整理评估者-优化者的完整协商过程
pub fn format_iteration_trace(history: &[IterationRecord], max_iterations: usize) -> String {
    let mut parts = vec![
        format!(
            "## Evaluator-Optimizer Workflow ({} iterations)\n",
            history.len()
        ),
        format!("Max iterations: {}\n", max_iterations),
    ];

    for (i, record) in history.iter().enumerate() {
        parts.push(format!("\n### Iteration {}", i + 1));
        parts.push(format!(
            "**Grade:** {:.1} ({:.0}%)",
            record.total_score, record.percentage
        ));

        let Some(critique) = &record.critique else {
            continue;
        };
        parts.push(format!(
            "\n**Optimizer Review:**\n- Approved: {}\n- Confidence: {:.0}%\n- Issues found: {}",
            critique.approved,
            critique.confidence * 100.0,
            critique.issues_found.len()
        ));
        for issue in &critique.issues_found {
            let criterion = if issue.criterion.is_empty() {
                "Unknown"
            } else {
                issue.criterion.as_str()
            };
            let suggested = issue
                .suggested_score
                .map(|score| score.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            parts.push(format!("  - {}: {} ({})", criterion, suggested, issue.issue));
        }
    }

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::CritiqueIssue;
    use serde_json::json;

    #[test]
    fn test_reasoning_sections_in_order() {
        let response = json!({
            "reasoning": {
                "code_analysis": "uses a loop",
                "understanding": "find max",
                "reference_analysis": "ternary",
                "criterion_evaluations": [
                    {"criterion_name": "Correctness", "analysis": "all cases", "points_awarded": 4.5, "max_points": 5}
                ]
            }
        });
        let trace = format_reasoning_trace(response.as_object().unwrap()).unwrap();
        assert_eq!(
            trace,
            "## Problem Understanding\nfind max\n\n\
             ## Reference Solution Analysis\nternary\n\n\
             ## Student Code Analysis\nuses a loop\n\n\
             ## Criterion-by-Criterion Evaluation\n\n### Correctness (4.5/5)\nall cases"
        );
    }

    #[test]
    fn test_no_reasoning() {
        let response = json!({"breakdown": []});
        assert!(format_reasoning_trace(response.as_object().unwrap()).is_none());
    }

    #[test]
    fn test_iteration_trace() {
        let history = vec![
            IterationRecord {
                total_score: 9.0,
                percentage: 90.0,
                critique: Some(Critique {
                    approved: false,
                    issues_found: vec![CritiqueIssue {
                        criterion: "Correctness".to_string(),
                        issue: "misses overflow".to_string(),
                        suggested_score: Some(3.0),
                        reasoning: String::new(),
                    }],
                    overall_assessment: "too generous".to_string(),
                    confidence: 0.85,
                }),
            },
            IterationRecord {
                total_score: 7.0,
                percentage: 70.0,
                critique: None,
            },
        ];
        let trace = format_iteration_trace(&history, 3);
        assert!(trace.starts_with("## Evaluator-Optimizer Workflow (2 iterations)\n\nMax iterations: 3\n"));
        assert!(trace.contains("### Iteration 1\n**Grade:** 9.0 (90%)"));
        assert!(trace.contains("- Approved: false\n- Confidence: 85%\n- Issues found: 1"));
        assert!(trace.contains("  - Correctness: 3 (misses overflow)"));
        assert!(trace.contains("### Iteration 2\n**Grade:** 7.0 (70%)"));
    }
}
