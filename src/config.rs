use std::str::FromStr;

use crate::error::ConfigError;

/// 程序配置
///
/// 进程启动时构建一次，按引用传给各个评分策略，不存在全局单例
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 单次推理策略 (cot / few_shot_cot) ---
    pub cot_temperature: f32,
    pub cot_max_tokens: u32,
    pub few_shot_max_tokens: u32,
    // --- 投票策略 ---
    pub voting_num_voters: usize,
    pub voting_temperature_min: f32,
    pub voting_temperature_max: f32,
    // --- 评估-优化策略 ---
    pub evaluator_optimizer_max_iterations: usize,
    pub evaluator_temperature: f32,
    pub optimizer_temperature: f32,
    // --- 批处理 ---
    /// 同时评分的提交数量
    pub max_concurrent_submissions: usize,
    /// 批处理任务文件（TOML）
    pub job_file: String,
    /// 评分结果输出文件（JSON）
    pub output_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 日志级别（RUST_LOG 优先）
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o".to_string(),
            cot_temperature: 0.3,
            cot_max_tokens: 3000,
            few_shot_max_tokens: 3500,
            voting_num_voters: 5,
            voting_temperature_min: 0.3,
            voting_temperature_max: 0.7,
            evaluator_optimizer_max_iterations: 3,
            evaluator_temperature: 0.3,
            optimizer_temperature: 0.4,
            max_concurrent_submissions: 4,
            job_file: "grading_job.toml".to_string(),
            output_file: "grading_results.json".to_string(),
            verbose_logging: false,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_key: std::env::var("LLM_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .unwrap_or(default.llm_api_key),
            llm_api_base_url: env_or("LLM_API_BASE_URL", default.llm_api_base_url),
            llm_model_name: env_or("LLM_MODEL_NAME", default.llm_model_name),
            cot_temperature: env_parse_or("COT_TEMPERATURE", default.cot_temperature),
            cot_max_tokens: env_parse_or("COT_MAX_TOKENS", default.cot_max_tokens),
            few_shot_max_tokens: env_parse_or("FEW_SHOT_MAX_TOKENS", default.few_shot_max_tokens),
            voting_num_voters: env_parse_or("VOTING_NUM_VOTERS", default.voting_num_voters),
            voting_temperature_min: env_parse_or(
                "VOTING_TEMPERATURE_MIN",
                default.voting_temperature_min,
            ),
            voting_temperature_max: env_parse_or(
                "VOTING_TEMPERATURE_MAX",
                default.voting_temperature_max,
            ),
            evaluator_optimizer_max_iterations: env_parse_or(
                "EVALUATOR_OPTIMIZER_MAX_ITERATIONS",
                default.evaluator_optimizer_max_iterations,
            ),
            evaluator_temperature: env_parse_or(
                "EVALUATOR_TEMPERATURE",
                default.evaluator_temperature,
            ),
            optimizer_temperature: env_parse_or(
                "OPTIMIZER_TEMPERATURE",
                default.optimizer_temperature,
            ),
            max_concurrent_submissions: env_parse_or(
                "MAX_CONCURRENT_SUBMISSIONS",
                default.max_concurrent_submissions,
            ),
            job_file: env_or("GRADING_JOB_FILE", default.job_file),
            output_file: env_or("GRADING_OUTPUT_FILE", default.output_file),
            verbose_logging: env_parse_or("VERBOSE_LOGGING", default.verbose_logging),
            log_level: env_or("LOG_LEVEL", default.log_level),
        }
    }

    /// 检查各项参数的取值范围
    ///
    /// 不检查 API 密钥，见 [`Config::require_api_key`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.voting_num_voters == 0 {
            return Err(ConfigError::invalid("voting_num_voters", "至少需要 1 个投票者"));
        }
        if self.evaluator_optimizer_max_iterations == 0 {
            return Err(ConfigError::invalid(
                "evaluator_optimizer_max_iterations",
                "至少需要 1 次迭代",
            ));
        }
        if self.max_concurrent_submissions == 0 {
            return Err(ConfigError::invalid("max_concurrent_submissions", "并发数必须大于 0"));
        }
        if self.cot_max_tokens == 0 || self.few_shot_max_tokens == 0 {
            return Err(ConfigError::invalid("max_tokens", "输出 token 上限必须大于 0"));
        }

        let temperatures = [
            ("cot_temperature", self.cot_temperature),
            ("voting_temperature_min", self.voting_temperature_min),
            ("voting_temperature_max", self.voting_temperature_max),
            ("evaluator_temperature", self.evaluator_temperature),
            ("optimizer_temperature", self.optimizer_temperature),
        ];
        for (field, value) in temperatures {
            if !(0.0..=2.0).contains(&value) {
                return Err(ConfigError::invalid(field, format!("温度 {} 超出范围 [0, 2]", value)));
            }
        }
        if self.voting_temperature_min > self.voting_temperature_max {
            return Err(ConfigError::invalid(
                "voting_temperature_min",
                format!(
                    "最低温度 {} 大于最高温度 {}",
                    self.voting_temperature_min, self.voting_temperature_max
                ),
            ));
        }

        Ok(())
    }

    /// 真实调用 LLM 前必须设置 API 密钥
    pub fn require_api_key(&self) -> Result<(), ConfigError> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }

    /// 投票温度区间
    pub fn voting_temperature_range(&self) -> (f32, f32) {
        (self.voting_temperature_min, self.voting_temperature_max)
    }
}

/// 读取字符串环境变量，未设置时使用默认值
fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

/// 读取并解析环境变量，未设置或无法解析时使用默认值
fn env_parse_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.voting_num_voters, 5);
        assert_eq!(config.evaluator_optimizer_max_iterations, 3);
        assert_eq!(config.voting_temperature_range(), (0.3, 0.7));
    }

    #[test]
    fn test_missing_api_key() {
        let config = Config::default();
        assert_eq!(config.require_api_key(), Err(ConfigError::MissingApiKey));

        let config = Config {
            llm_api_key: "sk-test".to_string(),
            ..Config::default()
        };
        assert!(config.require_api_key().is_ok());
    }

    #[test]
    fn test_inverted_temperature_range() {
        let config = Config {
            voting_temperature_min: 0.9,
            voting_temperature_max: 0.2,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "voting_temperature_min"
        ));
    }

    #[test]
    fn test_zero_voters_rejected() {
        let config = Config {
            voting_num_voters: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_helpers() {
        std::env::set_var("CODE_GRADER_TEST_VOTERS", " 7 ");
        std::env::set_var("CODE_GRADER_TEST_BAD", "many");
        std::env::set_var("CODE_GRADER_TEST_MODEL", "gpt-4o-mini");

        assert_eq!(env_parse_or("CODE_GRADER_TEST_VOTERS", 5usize), 7);
        assert_eq!(env_parse_or("CODE_GRADER_TEST_BAD", 5usize), 5);
        assert_eq!(env_parse_or("CODE_GRADER_TEST_UNSET", 0.3f32), 0.3);
        assert_eq!(env_or("CODE_GRADER_TEST_MODEL", "gpt-4o".to_string()), "gpt-4o-mini");
        assert_eq!(env_or("CODE_GRADER_TEST_UNSET", "gpt-4o".to_string()), "gpt-4o");
    }
}
