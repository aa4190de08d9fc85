//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责策略分发和批量调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `grading_service` - 评分服务
//! - 按 `grading_strategy` 选择评分策略（`grade`）
//! - 批量评分：共享题目和评分标准，逐个提交独立评分（`grade_batch`）
//! - 控制并发数量（Semaphore），结果保持输入顺序
//! - 单个提交失败只记录错误，不中断整批
//!
//! ### `batch_processor` - 批量任务执行器
//! - 管理应用生命周期（初始化、运行）
//! - 加载 TOML 任务文件
//! - 写出 JSON 评分结果
//! - 输出全局统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理评分任务文件)
//!     ↓
//! grading_service (处理 Vec<BatchSubmission>)
//!     ↓
//! workflow::Grader (处理单个 GradingRequest)
//!     ↓
//! services (能力层：prompt / parse / build / vote / critique)
//!     ↓
//! clients (LLM 能力)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管文件和统计，grading_service 管分发和并发
//! 2. **向下依赖**：编排层 → workflow → services → clients
//! 3. **无业务逻辑**：只做调度和统计，不做具体评分判断

pub mod batch_processor;
pub mod grading_service;

// 重新导出主要类型
pub use batch_processor::App;
pub use grading_service::GradingService;
