/// 日志工具模块
///
/// 负责 tracing 订阅器的初始化，以及批量评分过程中的格式化输出
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{BatchGradingResult, GradingResult, GradingStrategy};

/// 初始化日志
///
/// `RUST_LOG` 优先，未设置时使用 `default_level`；重复初始化会被忽略
///
/// # 参数
/// - `default_level`: 默认日志级别，如 `info`、`debug`
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 代码自动评分");
    info!("🤖 模型: {} ({})", config.llm_model_name, config.llm_api_base_url);
    info!("📊 最大并发数: {}", config.max_concurrent_submissions);
    if config.verbose_logging {
        info!(
            "🗳️ 投票者: {} (温度 {}-{})",
            config.voting_num_voters, config.voting_temperature_min, config.voting_temperature_max
        );
        info!("🔁 评估-优化最多 {} 轮", config.evaluator_optimizer_max_iterations);
    }
    info!("{}", "=".repeat(60));
}

/// 记录任务加载信息
///
/// # 参数
/// - `job_file`: 任务文件路径
/// - `total`: 提交总数
pub fn log_job_loaded(job_file: &str, total: usize) {
    info!("✓ 已加载任务文件: {}", job_file);
    info!("📄 共 {} 份待评分的提交\n", total);
}

/// 记录批量评分开始信息
pub fn log_batch_start(total: usize, max_concurrent: usize, strategy: GradingStrategy) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始批量评分: {} 份提交", total);
    let info = strategy.describe();
    info!("🧭 评分策略: {} ({}, 成本 {})", info.name, strategy, info.cost);
    info!("📋 最多同时评分 {} 份", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录单个提交完成信息
pub fn log_item_complete(index: usize, total: usize, filename: &str, result: &GradingResult) {
    info!(
        "[提交 {}/{}] ✅ {}: {:.1}/{:.1} ({:.1}%)",
        index, total, filename, result.final_score, result.total_points, result.percentage
    );
}

/// 打印最终统计信息
///
/// # 参数
/// - `result`: 批量评分结果
/// - `output_file`: 结果输出文件路径
pub fn print_final_stats(result: &BatchGradingResult, output_file: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部评分完成统计");
    info!("完成时间: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", result.ok, result.count);
    info!("❌ 失败: {}", result.failed());
    if let Some(average) = average_percentage(result) {
        info!("📈 平均得分率: {:.1}%", average);
    }
    for item in result.results.iter().filter(|item| !item.is_ok()) {
        info!(
            "  ❌ {}: {}",
            item.filename,
            truncate_text(item.error.as_deref().unwrap_or_default(), 120)
        );
    }
    info!("{}", "=".repeat(60));
    info!("\n评分结果已保存至: {}", output_file);
}

/// 成功提交的平均得分率
fn average_percentage(result: &BatchGradingResult) -> Option<f64> {
    let percentages: Vec<f64> = result
        .results
        .iter()
        .filter_map(|item| item.result.as_ref())
        .map(|r| r.percentage)
        .collect();
    if percentages.is_empty() {
        return None;
    }
    Some(percentages.iter().sum::<f64>() / percentages.len() as f64)
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 超长时截断并追加 `...`
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
