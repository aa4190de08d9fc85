use crate::models::batch::{BatchGradingRequest, BatchSubmission};
use crate::models::request::GradingStrategy;
use crate::models::rubric::GradingRubric;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 视为学生代码的文件扩展名
const SUBMISSION_EXTENSIONS: &[&str] = &["cpp", "cc", "cxx", "c", "h", "hpp", "txt"];

/// 批量评分任务文件（TOML）
#[derive(Debug, Clone, Deserialize)]
pub struct GradingJob {
    pub problem_description: String,
    pub reference_solution: String,
    pub rubric: GradingRubric,
    #[serde(default)]
    pub grading_strategy: GradingStrategy,
    /// 直接写在任务文件里的提交
    #[serde(default)]
    pub submissions: Vec<BatchSubmission>,
    /// 存放学生代码的目录（相对于任务文件）
    #[serde(default)]
    pub submissions_dir: Option<String>,
}

impl GradingJob {
    /// 转换为批量评分请求，目录中的提交排在内联提交之后
    pub fn into_batch_request(self, dir_submissions: Vec<BatchSubmission>) -> BatchGradingRequest {
        let mut submissions = self.submissions;
        submissions.extend(dir_submissions);

        BatchGradingRequest {
            problem_description: self.problem_description,
            reference_solution: self.reference_solution,
            rubric: self.rubric,
            grading_strategy: self.grading_strategy,
            submissions,
        }
    }
}

/// 从 TOML 文件加载评分任务并转换为 BatchGradingRequest
pub async fn load_grading_job(job_file_path: &Path) -> Result<BatchGradingRequest> {
    let content = fs::read_to_string(job_file_path)
        .await
        .with_context(|| format!("无法读取任务文件: {}", job_file_path.display()))?;

    let job: GradingJob = toml::from_str(&content)
        .with_context(|| format!("无法解析任务文件: {}", job_file_path.display()))?;

    let dir_submissions = match &job.submissions_dir {
        Some(dir) => {
            let base = job_file_path.parent().unwrap_or_else(|| Path::new("."));
            load_submissions_from_dir(&base.join(dir)).await?
        }
        None => Vec::new(),
    };

    let request = job.into_batch_request(dir_submissions);
    tracing::info!(
        "成功加载评分任务: {} 个提交, 策略 {}",
        request.submissions.len(),
        request.grading_strategy
    );

    Ok(request)
}

/// 从文件夹中加载所有学生代码文件（按文件名排序）
pub async fn load_submissions_from_dir(folder: &Path) -> Result<Vec<BatchSubmission>> {
    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder.display());
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    let mut entries = fs::read_dir(folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_submission = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| SUBMISSION_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if path.is_file() && is_submission {
            paths.push(path);
        }
    }
    paths.sort();

    let mut submissions = Vec::with_capacity(paths.len());
    for path in paths {
        let filename = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        match fs::read_to_string(&path).await {
            Ok(student_code) => {
                tracing::debug!("正在加载提交: {}", filename);
                submissions.push(BatchSubmission {
                    filename,
                    student_code,
                });
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(submissions)
}
