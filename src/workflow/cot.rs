//! 单次逐步推理评分
//!
//! 一次 LLM 调用：理解题目 → 分析参考答案 → 分析学生代码 → 逐项评估 → 求和

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::clients::{CompletionRequest, LlmClient};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{GradingRequest, GradingResult, GradingStrategy};
use crate::prompts::build_prompt;
use crate::prompts::templates::{COT_SYSTEM_PROMPT, COT_USER_PROMPT_TEMPLATE};
use crate::services::{build_result, parse_grading_response, ResultContext};
use crate::workflow::grader::{validate_request, Grader};
use crate::workflow::reasoning_trace::format_reasoning_trace;

/// 单次调用评分使用的提示词与采样参数
pub(crate) struct SinglePass<'a> {
    pub strategy: GradingStrategy,
    pub system_prompt: &'a str,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// 发送一次请求并把响应规范化为评分结果
pub(crate) async fn grade_single_pass(
    client: &dyn LlmClient,
    request: &GradingRequest,
    pass: SinglePass<'_>,
) -> AppResult<GradingResult> {
    let completion = CompletionRequest::json(
        pass.system_prompt,
        pass.user_prompt,
        pass.temperature,
        pass.max_tokens,
    );
    let response = client.complete(&completion).await?;
    debug!("收到 LLM 响应，长度: {} 字符", response.len());

    let parsed = parse_grading_response(&response)?;
    let trace = format_reasoning_trace(&parsed);
    let ctx = ResultContext {
        request,
        strategy: pass.strategy,
        model_used: client.model_name(),
    };
    let result = build_result(&parsed, ctx, trace);

    info!(
        "✓ [{}] 评分完成: {:.1}/{:.1} ({:.1}%)",
        pass.strategy, result.final_score, result.total_points, result.percentage
    );
    Ok(result)
}

/// 逐步推理评分
pub struct CotGrader {
    client: Arc<dyn LlmClient>,
    temperature: f32,
    max_tokens: u32,
}

impl CotGrader {
    pub fn new(client: Arc<dyn LlmClient>, config: &Config) -> Self {
        Self {
            client,
            temperature: config.cot_temperature,
            max_tokens: config.cot_max_tokens,
        }
    }
}

#[async_trait]
impl Grader for CotGrader {
    fn strategy(&self) -> GradingStrategy {
        GradingStrategy::Cot
    }

    async fn grade(&self, request: &GradingRequest) -> AppResult<GradingResult> {
        validate_request(request)?;
        info!("🚀 使用逐步推理策略评分");

        let pass = SinglePass {
            strategy: self.strategy(),
            system_prompt: COT_SYSTEM_PROMPT,
            user_prompt: build_prompt(request, COT_USER_PROMPT_TEMPLATE)?,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        grade_single_pass(self.client.as_ref(), request, pass).await
    }
}
