//! 评分策略 - 流程层
//!
//! 核心职责：定义"一份提交"的完整评分流程
//!
//! 四种策略共享同一个契约 `grade(request) -> result`，内部算法各不相同：
//! - `cot`: 单次逐步推理
//! - `few_shot_cot`: 注入固定示例后单次推理
//! - `voting`: N 路并行投票后聚合
//! - `evaluator_optimizer`: 评估者与优化者迭代协商

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::clients::LlmClient;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{GradingRequest, GradingResult, GradingRubric, GradingStrategy};
use crate::workflow::{CotGrader, EvaluatorOptimizerGrader, FewShotCotGrader, VotingGrader};

/// 评分策略
#[async_trait]
pub trait Grader: Send + Sync {
    /// 策略标识，写入结果的 `grading_strategy`
    fn strategy(&self) -> GradingStrategy;

    /// 为单个请求评分
    ///
    /// 不做重试：LLM 调用失败、响应无法解析都直接返回给调用方
    async fn grade(&self, request: &GradingRequest) -> AppResult<GradingResult>;
}

/// 评分前检查请求
///
/// - 题目、参考答案、学生代码不能为空
/// - 评分标准见 [`validate_rubric`]
pub fn validate_request(request: &GradingRequest) -> AppResult<()> {
    let required = [
        ("problem_description", &request.problem_description),
        ("reference_solution", &request.reference_solution),
        ("student_code", &request.student_code),
    ];
    for (name, text) in required {
        if text.trim().is_empty() {
            return Err(AppError::invalid_request(format!("{} 不能为空", name)));
        }
    }

    validate_rubric(&request.rubric)
}

/// 检查评分标准本身是否一致
///
/// 至少一项，名称不重复，满分与总分为正，总分等于各项满分之和
pub fn validate_rubric(rubric: &GradingRubric) -> AppResult<()> {
    if rubric.criteria.is_empty() {
        return Err(AppError::invalid_request("评分标准至少需要一个评分项"));
    }
    if rubric.total_points <= 0.0 {
        return Err(AppError::invalid_request(format!(
            "评分标准总分必须为正数: {}",
            rubric.total_points
        )));
    }

    let mut seen = HashSet::new();
    for criterion in &rubric.criteria {
        if criterion.max_points <= 0.0 {
            return Err(AppError::invalid_request(format!(
                "评分项 '{}' 的满分必须为正数: {}",
                criterion.name, criterion.max_points
            )));
        }
        if !seen.insert(criterion.name.as_str()) {
            return Err(AppError::invalid_request(format!(
                "评分项名称重复: '{}'",
                criterion.name
            )));
        }
    }

    if !rubric.validate_total() {
        return Err(AppError::invalid_request(format!(
            "评分标准总分 {} 与各项满分之和 {} 不一致 ({})",
            rubric.total_points,
            rubric.criteria_sum(),
            rubric.summary()
        )));
    }

    Ok(())
}

/// 四种评分策略的集合
pub struct Graders {
    cot: CotGrader,
    few_shot_cot: FewShotCotGrader,
    voting: VotingGrader,
    evaluator_optimizer: EvaluatorOptimizerGrader,
}

impl Graders {
    /// 所有策略共享同一个 LLM 客户端
    pub fn new(client: Arc<dyn LlmClient>, config: &Config) -> Self {
        Self {
            cot: CotGrader::new(client.clone(), config),
            few_shot_cot: FewShotCotGrader::new(client.clone(), config),
            voting: VotingGrader::new(client.clone(), config),
            evaluator_optimizer: EvaluatorOptimizerGrader::new(client, config),
        }
    }

    /// 按策略标识选择评分策略
    pub fn get(&self, strategy: GradingStrategy) -> &dyn Grader {
        match strategy {
            GradingStrategy::Cot => &self.cot,
            GradingStrategy::FewShotCot => &self.few_shot_cot,
            GradingStrategy::Voting => &self.voting,
            GradingStrategy::EvaluatorOptimizer => &self.evaluator_optimizer,
        }
    }
}
