//! 测试用的脚本化 LLM 客户端
//!
//! 按顺序返回预先设定的响应，并记录收到的每个请求

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::clients::llm_client::{CompletionRequest, LlmClient};
use crate::error::LlmError;

pub(crate) struct ScriptedClient {
    responses: Mutex<VecDeque<Option<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub(crate) fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Some(r.into())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 下一次调用返回 API 错误
    pub(crate) fn push_failure(&self) {
        self.responses.lock().unwrap().push_back(None);
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    fn model_name(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.responses.lock().unwrap().pop_front() {
            Some(Some(response)) => Ok(response),
            _ => Err(LlmError::ApiCallFailed {
                model: "scripted-model".to_string(),
                source: "scripted failure".into(),
            }),
        }
    }
}
