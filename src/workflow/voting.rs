//! 投票评分
//!
//! N 个投票者使用同一份逐步推理提示词，温度在区间内线性分布，并发请求。
//! 单个投票者调用失败或响应无法解析只会被丢弃，不影响其他投票者

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::clients::{CompletionRequest, LlmClient};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{GradingRequest, GradingResult, GradingStrategy};
use crate::prompts::build_prompt;
use crate::prompts::templates::{COT_SYSTEM_PROMPT, COT_USER_PROMPT_TEMPLATE};
use crate::services::{aggregate_votes, extract_json, finalize, voter_temperatures, ResultContext, Vote};
use crate::workflow::grader::{validate_request, Grader};

/// 投票者输出 token 上限
pub const VOTER_MAX_TOKENS: u32 = 3000;

/// 投票评分
pub struct VotingGrader {
    client: Arc<dyn LlmClient>,
    num_voters: usize,
    temperature_range: (f32, f32),
}

impl VotingGrader {
    pub fn new(client: Arc<dyn LlmClient>, config: &Config) -> Self {
        Self {
            client,
            num_voters: config.voting_num_voters,
            temperature_range: config.voting_temperature_range(),
        }
    }

    /// 并发收集所有投票者的评分，丢弃失败的投票者
    async fn collect_votes(&self, request: &GradingRequest) -> AppResult<Vec<Vote>> {
        let user_prompt = build_prompt(request, COT_USER_PROMPT_TEMPLATE)?;
        let temperatures = voter_temperatures(self.num_voters, self.temperature_range);
        debug!("投票者温度: {:?}", temperatures);

        let requests: Vec<CompletionRequest> = temperatures
            .iter()
            .map(|&temperature| {
                CompletionRequest::json(
                    COT_SYSTEM_PROMPT,
                    user_prompt.clone(),
                    temperature,
                    VOTER_MAX_TOKENS,
                )
            })
            .collect();

        // 返回值与请求顺序一致，序号即投票者编号
        let responses = self.client.complete_many(&requests).await;

        let mut votes = Vec::with_capacity(responses.len());
        for (voter, response) in responses.into_iter().enumerate() {
            let text = match response {
                Ok(text) => text,
                Err(e) => {
                    warn!("⚠️ 投票者 {} 调用失败，已丢弃: {}", voter + 1, e);
                    continue;
                }
            };
            match extract_json(&text) {
                Ok(parsed) => {
                    debug!("投票者 {} 的评分解析成功", voter + 1);
                    votes.push(Vote {
                        voter,
                        response: parsed,
                    });
                }
                Err(e) => warn!("⚠️ 投票者 {} 的响应无法解析，已丢弃: {}", voter + 1, e),
            }
        }

        Ok(votes)
    }
}

#[async_trait]
impl Grader for VotingGrader {
    fn strategy(&self) -> GradingStrategy {
        GradingStrategy::Voting
    }

    async fn grade(&self, request: &GradingRequest) -> AppResult<GradingResult> {
        validate_request(request)?;
        info!("🚀 使用投票策略评分，投票者数量: {}", self.num_voters);

        let votes = self.collect_votes(request).await?;
        if votes.is_empty() {
            return Err(AppError::NoValidGrades {
                voters: self.num_voters,
            });
        }
        info!("✓ 收到 {}/{} 个有效评分", votes.len(), self.num_voters);

        let aggregate = aggregate_votes(&votes, &request.rubric);
        if aggregate.breakdown.is_empty() {
            warn!("⚠️ 所有有效评分都没有覆盖评分标准中的任何一项");
            return Err(AppError::NoValidGrades {
                voters: self.num_voters,
            });
        }

        let (min, max) = self.temperature_range;
        let trace = format!(
            "Aggregated from {} independent graders using median voting (temperature range: {}-{})",
            votes.len(),
            min,
            max
        );
        let ctx = ResultContext {
            request,
            strategy: self.strategy(),
            model_used: self.client.model_name(),
        };
        let result = finalize(
            aggregate.final_score,
            aggregate.breakdown,
            aggregate.overall_feedback,
            ctx,
            Some(trace),
        );

        info!(
            "✓ [{}] 投票聚合完成: {:.1}/{:.1} ({:.1}%)",
            result.grading_strategy, result.final_score, result.total_points, result.percentage
        );
        Ok(result)
    }
}
