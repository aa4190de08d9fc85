//! 优化者 - 审查评分的质量
//!
//! 给定请求与当前评分，返回审查意见：是否通过、发现的问题、总体评价、置信度

use std::fmt;
use std::sync::Arc;

use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::clients::{CompletionRequest, LlmClient};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::GradingRequest;
use crate::prompts::build_prompt_with;
use crate::prompts::templates::{OPTIMIZER_CRITIQUE_PROMPT_TEMPLATE, OPTIMIZER_SYSTEM_PROMPT};
use crate::services::response_parser::extract_json;

/// 未给出置信度时的默认值
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// 审查中指出的单个问题
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CritiqueIssue {
    #[serde(default)]
    pub criterion: String,
    #[serde(default)]
    pub issue: String,
    /// 建议分数；模型可能给出数字、数字字符串或其他内容
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub suggested_score: Option<f64>,
    #[serde(default)]
    pub reasoning: String,
}

/// 优化者的审查意见
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Critique {
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub issues_found: Vec<CritiqueIssue>,
    #[serde(default)]
    pub overall_assessment: String,
    #[serde(default = "default_confidence", deserialize_with = "deserialize_confidence")]
    pub confidence: f64,
}

impl Default for Critique {
    fn default() -> Self {
        Self {
            approved: false,
            issues_found: Vec::new(),
            overall_assessment: String::new(),
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl Critique {
    /// 从解析后的响应读取审查意见
    ///
    /// 结构无法识别时视为"未通过且没有问题"，迭代随之结束
    pub fn from_response(response: Map<String, Value>) -> Self {
        serde_json::from_value(Value::Object(response)).unwrap_or_else(|e| {
            warn!("⚠️ 无法读取审查意见，按未通过且无问题处理: {}", e);
            Critique::default()
        })
    }

    /// 是否发现了需要修订的问题
    pub fn has_issues(&self) -> bool {
        !self.issues_found.is_empty() && !self.approved
    }
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

fn deserialize_confidence<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_lenient_number(deserializer)?.unwrap_or(DEFAULT_CONFIDENCE))
}

// 数字、数字字符串返回 Some，其余任何内容返回 None
fn deserialize_lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientNumberVisitor;

    impl<'de> Visitor<'de> for LenientNumberVisitor {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or a numeric string")
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value as f64))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value as f64))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value.trim().parse().ok())
        }

        fn visit_bool<E>(self, _value: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(None)
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(None)
        }
    }

    deserializer.deserialize_any(LenientNumberVisitor)
}

/// 优化者
pub struct Optimizer {
    client: Arc<dyn LlmClient>,
    temperature: f32,
}

impl Optimizer {
    pub const MAX_TOKENS: u32 = 2000;

    pub fn new(client: Arc<dyn LlmClient>, config: &Config) -> Self {
        Self {
            client,
            temperature: config.optimizer_temperature,
        }
    }

    /// 审查当前评分
    ///
    /// # 参数
    /// - `request`: 评分请求
    /// - `grade`: 评估者给出的当前评分（解析后的响应）
    pub async fn critique(
        &self,
        request: &GradingRequest,
        grade: &Map<String, Value>,
    ) -> AppResult<Critique> {
        debug!("优化者开始审查评分");

        let current_grade = serde_json::to_string_pretty(grade).unwrap_or_default();
        let prompt = build_prompt_with(
            request,
            OPTIMIZER_CRITIQUE_PROMPT_TEMPLATE,
            &[("current_grade", current_grade.as_str())],
        )?;

        let completion = CompletionRequest::json(
            OPTIMIZER_SYSTEM_PROMPT,
            prompt,
            self.temperature,
            Self::MAX_TOKENS,
        );
        let response = self.client.complete(&completion).await?;
        let critique = Critique::from_response(extract_json(&response)?);

        debug!(
            "审查完成，通过: {}, 问题数: {}, 置信度: {:.2}",
            critique.approved,
            critique.issues_found.len(),
            critique.confidence
        );
        Ok(critique)
    }
}
