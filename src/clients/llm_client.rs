//! LLM 能力抽象
//!
//! 评分策略只依赖这个 trait：给出 system + user 提示词和采样参数，拿回响应文本。
//! 重试、鉴权、超时都属于具体实现，核心不做重试。

use async_trait::async_trait;
use futures::future::join_all;

use crate::error::LlmError;

/// 一次补全请求
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// 要求模型只输出 JSON 对象
    pub json_mode: bool,
}

impl CompletionRequest {
    /// JSON 模式的请求（所有评分调用都使用 JSON 模式）
    pub fn json(
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            temperature,
            max_tokens,
            json_mode: true,
        }
    }
}

/// LLM 客户端
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 模型名称，写入评分结果的 `model_used`
    fn model_name(&self) -> &str;

    /// 发送单个补全请求
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;

    /// 并发发送多个请求
    ///
    /// 所有请求同时发出，等待全部结束；返回值与输入一一对应，
    /// 单个请求失败只会在对应位置留下 `Err`
    async fn complete_many(&self, requests: &[CompletionRequest]) -> Vec<Result<String, LlmError>> {
        join_all(requests.iter().map(|request| self.complete(request))).await
    }
}
