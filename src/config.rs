use crate::error::{AppResult, ConfigError, LlmError};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时评分的提交数量
    pub max_concurrent_submissions: usize,
    /// 题库文件（参考答案）
    pub questions_file: String,
    /// 待评分提交的 TOML 文件目录
    pub submissions_folder: String,
    /// 评分结果输出文件（每行一条 JSON）
    pub results_file: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 单段代码的最大字符数，超出部分在评分前截断（0 表示不限制）
    pub max_input_chars: usize,
    /// 排行榜显示人数
    pub leaderboard_size: usize,
    // --- LLM 创意评分配置 ---
    pub enable_ai_scoring: bool,
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_submissions: 8,
            questions_file: "questions.toml".to_string(),
            submissions_folder: "submissions".to_string(),
            results_file: "results.jsonl".to_string(),
            output_log_file: "output.txt".to_string(),
            verbose_logging: false,
            max_input_chars: 20_000,
            leaderboard_size: 10,
            enable_ai_scoring: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.groq.com/openai/v1".to_string(),
            llm_model_name: "llama-3.3-70b-versatile".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取配置，缺失或无法解析时使用默认值
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse().ok());
        Self {
            max_concurrent_submissions: parsed("MAX_CONCURRENT_SUBMISSIONS").unwrap_or(default.max_concurrent_submissions),
            questions_file: lookup("QUESTIONS_FILE").unwrap_or(default.questions_file),
            submissions_folder: lookup("SUBMISSIONS_FOLDER").unwrap_or(default.submissions_folder),
            results_file: lookup("RESULTS_FILE").unwrap_or(default.results_file),
            output_log_file: lookup("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            verbose_logging: lookup("VERBOSE_LOGGING").and_then(|v| v.trim().parse().ok()).unwrap_or(default.verbose_logging),
            max_input_chars: parsed("MAX_INPUT_CHARS").unwrap_or(default.max_input_chars),
            leaderboard_size: parsed("LEADERBOARD_SIZE").unwrap_or(default.leaderboard_size),
            enable_ai_scoring: lookup("ENABLE_AI_SCORING").and_then(|v| v.trim().parse().ok()).unwrap_or(default.enable_ai_scoring),
            llm_api_key: lookup("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: lookup("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: lookup("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
        }
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> AppResult<()> {
        if self.max_concurrent_submissions == 0 {
            return Err(ConfigError::Invalid {
                var_name: "MAX_CONCURRENT_SUBMISSIONS".to_string(),
                value: "0".to_string(),
                reason: "并发数必须大于 0".to_string(),
            }
            .into());
        }

        if self.enable_ai_scoring && self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::Missing {
                var_name: "LLM_API_KEY".to_string(),
                reason: LlmError::MissingApiKey.to_string(),
            }
            .into());
        }

        Ok(())
    }
}
