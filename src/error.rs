use thiserror::Error;

/// 应用程序错误类型
///
/// 所有评分操作都返回这个类型，调用方（批处理 / 上层服务）负责把它映射成用户可读的信息
#[derive(Debug, Error)]
pub enum AppError {
    /// 请求无效（评分标准不一致、必填文本为空等），属于调用方错误，不重试
    #[error("请求无效: {0}")]
    InvalidRequest(String),
    /// LLM 传输层错误
    #[error(transparent)]
    Llm(#[from] LlmError),
    /// LLM 返回内容无法解析
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// 提示词模板错误
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// 投票策略：没有任何一个投票者给出可用的评分
    #[error("没有收到任何有效评分 (投票者数量: {voters})")]
    NoValidGrades { voters: usize },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 构建请求失败
    #[error("构建 LLM 请求失败: {source}")]
    RequestBuildFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回结果为空
    #[error("LLM返回结果为空 (模型: {model})")]
    EmptyResponse { model: String },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// 响应解析错误
#[derive(Debug, Error)]
pub enum ParseError {
    /// 三种 JSON 提取方式均失败
    #[error("无法从 LLM 响应中提取有效的 JSON: {preview}")]
    UnparsableResponse { preview: String },
}

/// 提示词模板错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// 模板引用了未提供的字段
    #[error("模板引用了未提供的字段: {field}")]
    MissingField { field: String },
    /// 模板中存在未闭合的花括号
    #[error("模板在位置 {position} 处存在未闭合的花括号")]
    UnbalancedBrace { position: usize },
}

/// 配置错误
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// 配置项取值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    Invalid { field: String, reason: String },
    /// 未设置 API 密钥
    #[error("未设置 LLM API 密钥 (LLM_API_KEY / OPENAI_API_KEY)")]
    MissingApiKey,
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建请求无效错误
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        AppError::InvalidRequest(reason.into())
    }

    /// 是否为调用方错误（不应重试）
    pub fn is_caller_error(&self) -> bool {
        matches!(self, AppError::InvalidRequest(_) | AppError::Template(_))
    }
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transparent_display() {
        let err: AppError = ParseError::UnparsableResponse {
            preview: "not json".to_string(),
        }
        .into();
        assert!(err.to_string().contains("not json"));
        assert!(!err.is_caller_error());
    }

    #[test]
    fn test_caller_errors() {
        assert!(AppError::invalid_request("empty code").is_caller_error());
        let template: AppError = TemplateError::MissingField {
            field: "examples".to_string(),
        }
        .into();
        assert!(template.is_caller_error());
    }

    #[test]
    fn test_grading_errors_convert() {
        let llm: AppError = LlmError::EmptyContent {
            model: "gpt-4o".to_string(),
        }
        .into();
        assert!(matches!(llm, AppError::Llm(_)));
        assert!(llm.to_string().contains("gpt-4o"));

        let voting = AppError::NoValidGrades { voters: 5 };
        assert!(voting.to_string().contains('5'));
        assert!(!voting.is_caller_error());
    }
}
