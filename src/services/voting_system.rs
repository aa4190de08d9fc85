//! 投票聚合
//!
//! 每个评分项：中位数只用于挑选反馈，公布的得分取平均数。
//! 没有任何投票者评到的评分项直接从结果中去掉，不补 0 分

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::{CriterionScore, GradingRubric};
use crate::services::field_aliases::{as_number, as_text, field, response_field};

/// 反馈入选范围：与中位数相差不超过该值
pub const FEEDBACK_MEDIAN_WINDOW: f64 = 0.5;
/// 没有可用反馈时的占位文本
pub const CONSENSUS_PLACEHOLDER: &str = "Consensus evaluation";

/// 单个投票者解析成功的评分
#[derive(Debug, Clone)]
pub struct Vote {
    /// 投票者序号（从 0 开始，对应其温度）
    pub voter: usize,
    pub response: Map<String, Value>,
}

/// 投票聚合结果
#[derive(Debug, Clone, PartialEq)]
pub struct VoteAggregate {
    pub breakdown: Vec<CriterionScore>,
    pub final_score: f64,
    pub overall_feedback: String,
}

/// 为 N 个投票者在温度区间内线性分配温度
///
/// 第 i 个投票者的温度为 `min + i * (max - min) / (N - 1)`，只有一个投票者时取 `min`
pub fn voter_temperatures(num_voters: usize, (min, max): (f32, f32)) -> Vec<f32> {
    if num_voters <= 1 {
        return vec![min; num_voters];
    }
    let step = (max - min) / (num_voters - 1) as f32;
    (0..num_voters).map(|i| min + i as f32 * step).collect()
}

/// 中位数（偶数个取中间两个的平均），空输入返回 `None`
pub fn median(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn mean(scores: &[f64]) -> f64 {
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// 合并反馈
///
/// 去掉空白和重复项（保持先后顺序）；没有剩余返回占位文本，
/// 剩一条原样返回，多条时取前两条用空格拼接
pub fn merge_feedback<I, S>(feedback: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut unique: Vec<String> = Vec::new();
    for item in feedback {
        let item = item.as_ref();
        if item.trim().is_empty() || unique.iter().any(|seen| seen == item) {
            continue;
        }
        unique.push(item.to_string());
        if unique.len() == 2 {
            break;
        }
    }

    match unique.len() {
        0 => CONSENSUS_PLACEHOLDER.to_string(),
        _ => unique.join(" "),
    }
}

/// 单个评分项收到的投票：(得分, 反馈)
type Ballots = Vec<(f64, String)>;

fn collect_ballots(votes: &[Vote]) -> HashMap<String, Ballots> {
    let mut ballots: HashMap<String, Ballots> = HashMap::new();

    for vote in votes {
        let Some(items) = response_field(&vote.response, "breakdown").and_then(Value::as_array)
        else {
            debug!("投票者 {} 的响应中没有评分项", vote.voter + 1);
            continue;
        };

        for item in items.iter().filter_map(Value::as_object) {
            let Some(name) = field(item, "criterion_name").and_then(as_text) else {
                continue;
            };
            let score = field(item, "points_awarded").and_then(as_number).unwrap_or(0.0);
            let feedback = field(item, "feedback")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            ballots
                .entry(name.to_string())
                .or_default()
                .push((score, feedback));
        }
    }

    ballots
}

/// 聚合所有投票
///
/// 结果的评分项顺序与评分标准一致，满分取自评分标准
pub fn aggregate_votes(votes: &[Vote], rubric: &GradingRubric) -> VoteAggregate {
    let ballots = collect_ballots(votes);
    let mut breakdown = Vec::with_capacity(rubric.criteria.len());

    for criterion in &rubric.criteria {
        let Some(entries) = ballots.get(&criterion.name).filter(|e| !e.is_empty()) else {
            warn!("⚠️ 评分项 '{}' 没有收到任何投票，已从结果中去掉", criterion.name);
            continue;
        };

        let scores: Vec<f64> = entries.iter().map(|(score, _)| *score).collect();
        let Some(median_score) = median(&scores) else {
            continue;
        };
        let mean_score = mean(&scores);

        let feedback = merge_feedback(
            entries
                .iter()
                .filter(|(score, _)| (score - median_score).abs() <= FEEDBACK_MEDIAN_WINDOW)
                .map(|(_, feedback)| feedback.as_str()),
        );

        debug!(
            "{}: 中位数={:.1}, 平均数={:.1}, 票数={}",
            criterion.name,
            median_score,
            mean_score,
            scores.len()
        );

        breakdown.push(CriterionScore {
            criterion_name: criterion.name.clone(),
            points_awarded: mean_score,
            max_points: criterion.max_points,
            feedback,
        });
    }

    let final_score = breakdown.iter().map(|c| c.points_awarded).sum();

    // 总体反馈：顶层优先，其次 final_grade
    let overall_feedback = merge_feedback(
        votes
            .iter()
            .filter_map(|vote| response_field(&vote.response, "overall_feedback"))
            .filter_map(as_text),
    );

    VoteAggregate {
        breakdown,
        final_score,
        overall_feedback,
    }
}
