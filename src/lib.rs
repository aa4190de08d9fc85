//! # Code Grader
//!
//! 使用大语言模型为编程作业自动评分的 Rust 库和命令行程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构，上层只依赖下层：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - LLM 能力抽象，只暴露"发提示词、拿文本"
//! - `LlmClient` - 评分策略唯一依赖的 trait
//! - `OpenAiClient` - OpenAI 兼容接口的实现（JSON 模式）
//!
//! ### ② 业务能力层（Services）
//! - `prompts/` - 提示词模板、示例评分、模板渲染
//! - `services/` - 响应解析、结果构建、投票聚合、评估者与优化者
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一份提交"的完整评分流程，每种策略一个实现
//! - `CotGrader` / `FewShotCotGrader` - 单次推理
//! - `VotingGrader` - 多个投票者并发评分，各项取平均分，反馈取自接近中位数的投票者
//! - `EvaluatorOptimizerGrader` - 评估者与优化者迭代修订
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/grading_service` - 按策略分发，批量并发评分
//! - `orchestrator/batch_processor` - 批量任务执行器，管理文件和统计
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{CompletionRequest, LlmClient, OpenAiClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{
    BatchGradingRequest, BatchGradingResult, BatchItemResult, BatchSubmission, CriterionScore,
    GradingRequest, GradingResult, GradingRubric, GradingStrategy, RubricCriterion,
};
pub use orchestrator::{App, GradingService};
pub use workflow::{Grader, Graders};
