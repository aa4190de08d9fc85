//! 评分服务 - 编排层
//!
//! 单个请求按策略分发；批量请求并发评分，单个失败不影响整批

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::clients::LlmClient;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{BatchGradingRequest, BatchGradingResult, BatchItemResult, GradingRequest, GradingResult};
use crate::utils::logging;
use crate::workflow::{validate_rubric, Graders};

/// 评分服务
///
/// 可以廉价 clone，clone 之间共享同一组评分策略
#[derive(Clone)]
pub struct GradingService {
    graders: Arc<Graders>,
    max_concurrent: usize,
}

impl GradingService {
    pub fn new(client: Arc<dyn LlmClient>, config: &Config) -> Self {
        Self {
            graders: Arc::new(Graders::new(client, config)),
            max_concurrent: config.max_concurrent_submissions.max(1),
        }
    }

    /// 按请求中的策略评分
    pub async fn grade(&self, request: &GradingRequest) -> AppResult<GradingResult> {
        self.graders.get(request.grading_strategy).grade(request).await
    }

    /// 批量评分
    ///
    /// 共享的评分标准先统一检查（不一致直接返回错误）；
    /// 每个提交作为独立请求评分，最多 `max_concurrent` 个同时进行，结果保持输入顺序
    pub async fn grade_batch(&self, batch: BatchGradingRequest) -> AppResult<BatchGradingResult> {
        validate_rubric(&batch.rubric)?;

        let total = batch.submissions.len();
        logging::log_batch_start(total, self.max_concurrent, batch.grading_strategy);

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles = Vec::with_capacity(total);

        for (idx, submission) in batch.submissions.iter().enumerate() {
            let index = idx + 1;
            let request = batch.request_for(submission);
            let service = self.clone();
            let semaphore = semaphore.clone();
            let filename = submission.filename.clone();

            let handle = tokio::spawn(async move {
                // 信号量不会被关闭，拿到的许可在任务结束时释放
                let _permit = semaphore.acquire_owned().await.ok();
                info!("[提交 {}/{}] 📝 开始评分", index, total);
                service.grade(&request).await
            });
            handles.push((index, filename, handle));
        }

        // 按提交顺序等待
        let mut items = Vec::with_capacity(total);
        for (index, filename, handle) in handles {
            let item = match handle.await {
                Ok(Ok(result)) => {
                    logging::log_item_complete(index, total, &filename, &result);
                    BatchItemResult::ok(filename, result)
                }
                Ok(Err(e)) => {
                    error!("[提交 {}/{}] ❌ {} 评分失败: {}", index, total, filename, e);
                    BatchItemResult::failed(filename, e.to_string())
                }
                Err(e) => {
                    error!("[提交 {}/{}] ❌ {} 任务执行失败: {}", index, total, filename, e);
                    BatchItemResult::failed(filename, e.to_string())
                }
            };
            items.push(item);
        }

        Ok(BatchGradingResult::from_items(items))
    }
}
