//! LLM 服务 - 业务能力层
//!
//! 只负责"LLM 创意评分"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Groq, Azure 等）

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};
use crate::models::CreativityScore;

const JUDGE_SYSTEM_MESSAGE: &str = "You are an expert web development judge. Evaluate HTML/CSS code based on: creativity (35%), design aesthetics (25%), code quality (10%), responsiveness potential (15%), and innovation (15%). Return ONLY a JSON object with format: {\"score\": <number 0-100>, \"feedback\": \"<1-2 sentence brief evaluation>\"}";

const DEFAULT_FEEDBACK: &str = "Creative code!";

/// LLM 原始返回
#[derive(Debug, Deserialize)]
struct RawCreativity {
    score: f64,
    #[serde(default)]
    feedback: Option<String>,
}

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API 给提交代码打创意分
/// - 提供通用的 LLM 调用接口
/// - 不关心评分记录如何保存
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.7)
            .max_tokens(150u32)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }

    /// 给一份提交打创意分
    ///
    /// # 参数
    /// - `html`: 提交的 HTML
    /// - `css`: 提交的 CSS
    pub async fn evaluate_creativity(&self, html: &str, css: &str) -> Result<CreativityScore> {
        let user_message = build_user_message(html, css);
        let response = self
            .send_to_llm(&user_message, Some(JUDGE_SYSTEM_MESSAGE))
            .await?;
        let creativity = parse_creativity_response(&response)?;
        debug!("LLM 创意分: {}", creativity.score);
        Ok(creativity)
    }
}

fn build_user_message(html: &str, css: &str) -> String {
    format!(
        "Evaluate this code and provide a creativity score out of 100:\n\nHTML:\n{}\n\nCSS:\n{}",
        html, css
    )
}

/// 响应中第一个 `{...}`（非贪婪，可跨行）
fn json_object_pattern() -> AppResult<&'static Regex> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\{[\s\S]*?\}"))
        .as_ref()
        .map_err(|e| AppError::Other(e.to_string()))
}

/// 解析 LLM 返回的创意分
///
/// 取响应中第一个 `{...}`，分数四舍五入后必须落在 0-100 之间；
/// 没有评语时使用默认评语。
pub fn parse_creativity_response(response: &str) -> AppResult<CreativityScore> {
    let json = json_object_pattern()?
        .find(response)
        .ok_or_else(|| LlmError::InvalidFormat {
            response: response.to_string(),
        })?
        .as_str();

    let raw: RawCreativity =
        serde_json::from_str(json).map_err(|source| LlmError::JsonParseFailed {
            response: json.to_string(),
            source,
        })?;

    let score = raw.score.round();
    if !score.is_finite() || !(0.0..=100.0).contains(&score) {
        return Err(LlmError::InvalidScore { score: raw.score }.into());
    }

    let feedback = raw
        .feedback
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FEEDBACK.to_string());

    Ok(CreativityScore {
        score: score as u8,
        feedback,
    })
}
