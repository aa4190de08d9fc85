//! 带示例的逐步推理评分
//!
//! 与单次逐步推理流程相同，提示词前面加入三个固定的完整评分示例

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::clients::LlmClient;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{GradingRequest, GradingResult, GradingStrategy};
use crate::prompts::templates::{FEW_SHOT_SYSTEM_PROMPT, FEW_SHOT_USER_PROMPT_TEMPLATE};
use crate::prompts::{build_prompt_with, format_few_shot_examples};
use crate::workflow::cot::{grade_single_pass, SinglePass};
use crate::workflow::grader::{validate_request, Grader};

/// 带示例的逐步推理评分
pub struct FewShotCotGrader {
    client: Arc<dyn LlmClient>,
    temperature: f32,
    max_tokens: u32,
    /// 格式化后的示例，构造时生成一次
    examples: String,
}

impl FewShotCotGrader {
    pub fn new(client: Arc<dyn LlmClient>, config: &Config) -> Self {
        Self {
            client,
            temperature: config.cot_temperature,
            max_tokens: config.few_shot_max_tokens,
            examples: format_few_shot_examples(),
        }
    }
}

#[async_trait]
impl Grader for FewShotCotGrader {
    fn strategy(&self) -> GradingStrategy {
        GradingStrategy::FewShotCot
    }

    async fn grade(&self, request: &GradingRequest) -> AppResult<GradingResult> {
        validate_request(request)?;
        info!("🚀 使用带示例的逐步推理策略评分");

        let user_prompt = build_prompt_with(
            request,
            FEW_SHOT_USER_PROMPT_TEMPLATE,
            &[("examples", self.examples.as_str())],
        )?;
        let pass = SinglePass {
            strategy: self.strategy(),
            system_prompt: FEW_SHOT_SYSTEM_PROMPT,
            user_prompt,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        grade_single_pass(self.client.as_ref(), request, pass).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::scripted::ScriptedClient;
    use crate::models::{GradingRubric, RubricCriterion};

    const RESPONSE: &str = r#"```json
{
  "breakdown": [{"criterion_name": "Design", "points_awarded": 2, "max_points": 4, "feedback": "Partial."}],
  "total_score": 2,
  "total_possible": 4,
  "percentage": 50,
  "overall_feedback": "Needs more methods."
}
```"#;

    fn request(problem: &str) -> GradingRequest {
        let rubric = GradingRubric::new(vec![RubricCriterion::new("Design", "d", 4.0)], 4.0);
        GradingRequest::new(problem, "ref", rubric, "code", GradingStrategy::FewShotCot)
    }

    #[tokio::test]
    async fn test_examples_are_identical_across_problems() {
        let client = Arc::new(ScriptedClient::new([RESPONSE, RESPONSE]));
        let grader = FewShotCotGrader::new(client.clone(), &Config::default());

        let first = grader.grade(&request("Implement a queue")).await.unwrap();
        grader.grade(&request("Sort a linked list")).await.unwrap();

        assert_eq!(first.grading_strategy, GradingStrategy::FewShotCot);
        assert_eq!(first.final_score, 2.0);
        assert!(first.reasoning_trace.is_none());

        let sent = client.requests();
        let examples = format_few_shot_examples();
        for request in &sent {
            assert!(request.user_prompt.starts_with("# EXAMPLES OF GRADING PROCESS"));
            assert!(request.user_prompt.contains(&examples));
            assert_eq!(request.max_tokens, 3500);
            assert_eq!(request.system_prompt, FEW_SHOT_SYSTEM_PROMPT);
        }
        assert!(sent[0].user_prompt.contains("Implement a queue"));
        assert!(sent[1].user_prompt.contains("Sort a linked list"));
    }
}
