//! 评估者 - 给出评分，并根据审查意见修订评分

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::clients::{CompletionRequest, LlmClient};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::GradingRequest;
use crate::prompts::templates::{
    EVALUATOR_GRADE_PROMPT_TEMPLATE, EVALUATOR_REFINE_PROMPT_TEMPLATE, EVALUATOR_SYSTEM_PROMPT,
};
use crate::prompts::{build_prompt, build_prompt_with};
use crate::services::optimizer::Critique;
use crate::services::response_parser::parse_grading_response;

/// 评估者
pub struct Evaluator {
    client: Arc<dyn LlmClient>,
    temperature: f32,
}

impl Evaluator {
    pub const MAX_TOKENS: u32 = 3000;

    pub fn new(client: Arc<dyn LlmClient>, config: &Config) -> Self {
        Self {
            client,
            temperature: config.evaluator_temperature,
        }
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// 首次评分
    pub async fn evaluate(&self, request: &GradingRequest) -> AppResult<Map<String, Value>> {
        debug!("评估者开始首次评分");
        let prompt = build_prompt(request, EVALUATOR_GRADE_PROMPT_TEMPLATE)?;
        self.send(prompt).await
    }

    /// 根据审查意见修订评分
    ///
    /// 上一次评分与审查意见都以 JSON 原样嵌入提示词
    pub async fn refine(
        &self,
        request: &GradingRequest,
        previous_grade: &Map<String, Value>,
        critique: &Critique,
    ) -> AppResult<Map<String, Value>> {
        debug!("评估者根据审查意见修订评分");
        let previous = serde_json::to_string_pretty(previous_grade).unwrap_or_default();
        let critique = serde_json::to_string_pretty(critique).unwrap_or_default();
        let prompt = build_prompt_with(
            request,
            EVALUATOR_REFINE_PROMPT_TEMPLATE,
            &[
                ("previous_grade", previous.as_str()),
                ("critique", critique.as_str()),
            ],
        )?;
        self.send(prompt).await
    }

    async fn send(&self, prompt: String) -> AppResult<Map<String, Value>> {
        let completion = CompletionRequest::json(
            EVALUATOR_SYSTEM_PROMPT,
            prompt,
            self.temperature,
            Self::MAX_TOKENS,
        );
        let response = self.client.complete(&completion).await?;
        Ok(parse_grading_response(&response)?)
    }
}
