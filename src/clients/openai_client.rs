//! OpenAI 兼容的 LLM 客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::clients::llm_client::{CompletionRequest, LlmClient};
use crate::config::Config;
use crate::error::LlmError;

/// 基于 async-openai 的 LLM 客户端
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl OpenAiClient {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config) -> Self {
        Self::with_model(config, config.llm_model_name.clone())
    }

    /// 创建使用指定模型的客户端
    pub fn with_model(config: &Config, model_name: impl Into<String>) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: model_name.into(),
        }
    }

    fn build_messages(
        &self,
        request: &CompletionRequest,
    ) -> Result<Vec<ChatCompletionRequestMessage>, LlmError> {
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(request.system_prompt.as_str())
            .build()
            .map_err(build_failed)?;

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(request.user_prompt.as_str())
            .build()
            .map_err(build_failed)?;

        Ok(vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ])
    }
}

fn build_failed(e: impl std::error::Error + Send + Sync + 'static) -> LlmError {
    LlmError::RequestBuildFailed {
        source: Box::new(e),
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        debug!(
            "调用 LLM API，模型: {}, 温度: {:.2}, 用户消息长度: {} 字符",
            self.model_name,
            request.temperature,
            request.user_prompt.len()
        );

        let messages = self.build_messages(request)?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model_name)
            .messages(messages)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens);
        if request.json_mode {
            args.response_format(ResponseFormat::JsonObject);
        }
        let chat_request = args.build().map_err(build_failed)?;

        // 调用 API
        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            LlmError::ApiCallFailed {
                model: self.model_name.clone(),
                source: Box::new(e),
            }
        })?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let choice = response.choices.first().ok_or_else(|| LlmError::EmptyResponse {
            model: self.model_name.clone(),
        })?;
        let content = choice
            .message
            .content
            .clone()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_client() -> OpenAiClient {
        let config = Config {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or_default(),
            ..Config::default()
        };
        OpenAiClient::new(&config)
    }

    #[test]
    fn test_model_name_from_config() {
        let config = Config {
            llm_model_name: "gpt-4o-mini".to_string(),
            ..Config::default()
        };
        assert_eq!(OpenAiClient::new(&config).model_name(), "gpt-4o-mini");
        assert_eq!(OpenAiClient::with_model(&config, "o3").model_name(), "o3");
    }

    #[test]
    fn test_build_messages() {
        let client = create_test_client();
        let request = CompletionRequest::json("system", "user", 0.3, 100);
        let messages = client.build_messages(&request).unwrap();
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::User(_)));
    }

    /// 测试 LLM API 连接性（JSON 模式）
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_json_mode_completion -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_json_mode_completion() {
        let _ = tracing_subscriber::fmt::try_init();

        let client = create_test_client();
        let request = CompletionRequest::json(
            "You reply with a JSON object only.",
            "Return {\"ok\": true}",
            0.0,
            50,
        );

        let response = client.complete(&request).await.expect("LLM 调用失败");
        println!("LLM 响应: {}", response);
        assert!(response.contains("ok"));
    }
}
