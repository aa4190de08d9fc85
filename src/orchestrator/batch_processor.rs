//! 批量任务执行器 - 编排层
//!
//! ## 职责
//!
//! 本模块是命令行程序的入口，负责一次批量评分任务的完整生命周期。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：输出启动信息、创建 LLM 客户端和评分服务
//! 2. **任务加载**：读取 TOML 任务文件（共享题目、评分标准、提交列表）
//! 3. **批量评分**：委托 `GradingService::grade_batch`
//! 4. **结果输出**：把 `BatchGradingResult` 写成 JSON 文件
//! 5. **全局统计**：汇总成功、失败和平均得分率
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个提交的细节
//! - **客户端所有者**：唯一创建 LLM 客户端的模块，测试时可注入替身

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};

use crate::clients::{LlmClient, OpenAiClient};
use crate::config::Config;
use crate::models::{load_grading_job, BatchGradingResult};
use crate::orchestrator::GradingService;
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    service: GradingService,
}

impl App {
    /// 初始化应用（使用 OpenAI 兼容接口）
    pub async fn initialize(config: Config) -> Result<Self> {
        let client = OpenAiClient::new(&config);
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// 使用指定的 LLM 客户端初始化
    pub fn with_client(config: Config, client: Arc<dyn LlmClient>) -> Self {
        logging::log_startup(&config);
        let service = GradingService::new(client, &config);
        Self { config, service }
    }

    /// 评分服务
    pub fn service(&self) -> &GradingService {
        &self.service
    }

    /// 运行应用主逻辑
    ///
    /// # 返回
    /// 有提交时返回批量评分结果；任务文件没有任何提交时返回 `None`
    pub async fn run(&self) -> Result<Option<BatchGradingResult>> {
        info!("\n📁 正在加载评分任务...");
        let job_path = Path::new(&self.config.job_file);
        let batch = load_grading_job(job_path).await?;

        if batch.submissions.is_empty() {
            warn!("⚠️ 任务文件中没有待评分的提交，程序结束");
            return Ok(None);
        }
        logging::log_job_loaded(&self.config.job_file, batch.submissions.len());

        let result = self.service.grade_batch(batch).await?;

        self.write_results(&result).await?;
        logging::print_final_stats(&result, &self.config.output_file);

        Ok(Some(result))
    }

    /// 写出评分结果
    async fn write_results(&self, result: &BatchGradingResult) -> Result<()> {
        let json = serde_json::to_string_pretty(result).context("序列化评分结果失败")?;
        fs::write(&self.config.output_file, json)
            .await
            .with_context(|| format!("无法写入结果文件: {}", self.config.output_file))?;
        Ok(())
    }
}
