use thiserror::Error;

use crate::models::QuestionRef;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 题库 / 提交存储错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: BoxError,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: BoxError,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: BoxError,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 缺少必填配置
    #[error("缺少配置 {var_name}: {reason}")]
    Missing { var_name: String, reason: String },
    /// 配置值不合法
    #[error("配置 {var_name} 的值 '{value}' 不合法: {reason}")]
    Invalid {
        var_name: String,
        value: String,
        reason: String,
    },
}

/// 题库 / 提交存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 找不到对应题目
    #[error("找不到题目: {0}")]
    QuestionNotFound(QuestionRef),
    /// 题库中存在重复的题目
    #[error("题库中存在重复的 {what}: {value}")]
    DuplicateQuestion { what: &'static str, value: String },
    /// 结果序列化失败
    #[error("结果序列化失败: {0}")]
    SerializeFailed(#[source] serde_json::Error),
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 未配置 API Key
    #[error("未配置 LLM API Key")]
    MissingApiKey,
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: BoxError,
    },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 返回内容中没有 JSON
    #[error("LLM返回格式不正确: {response}")]
    InvalidFormat { response: String },
    /// JSON 解析失败
    #[error("无法解析LLM返回的JSON ({response}): {source}")]
    JsonParseFailed {
        response: String,
        #[source]
        source: serde_json::Error,
    },
    /// 分数不合法
    #[error("LLM返回的分数不合法: {score}")]
    InvalidScore { score: f64 },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Store(StoreError::SerializeFailed(err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建 TOML 解析错误
    pub fn toml_parse_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建目录不存在错误
    pub fn directory_not_found(path: impl Into<String>) -> Self {
        AppError::File(FileError::DirectoryNotFound { path: path.into() })
    }

    /// 创建题目不存在错误
    pub fn question_not_found(question: QuestionRef) -> Self {
        AppError::Store(StoreError::QuestionNotFound(question))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = AppError::question_not_found(QuestionRef::ByRound(3));
        assert_eq!(err.to_string(), "存储错误: 找不到题目: 第 3 轮");

        let err = AppError::Llm(LlmError::InvalidScore { score: 120.0 });
        assert_eq!(err.to_string(), "LLM错误: LLM返回的分数不合法: 120");
    }

    #[test]
    fn test_source_chain_is_preserved() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = AppError::file_read_failed("questions.toml", io);
        let file_err = err.source().expect("file error source");
        assert!(file_err.to_string().contains("questions.toml"));
        assert_eq!(file_err.source().map(|e| e.to_string()), Some("gone".to_string()));
    }
}
