use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::question::{Question, QuestionRef};
use crate::scoring::{CodePair, ScoreResult};

/// 一份待评分的提交（编辑器中的 HTML / CSS 快照）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub player_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
    /// 作答的题目
    pub question: QuestionRef,
    #[serde(default)]
    pub html_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_code: Option<String>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

impl Submission {
    pub fn code(&self) -> CodePair<'_> {
        CodePair::new(&self.html_code, self.css_code.as_deref())
    }

    pub fn with_file_path(mut self, file_path: String) -> Self {
        self.file_path = Some(file_path);
        self
    }
}

/// LLM 给出的创意分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreativityScore {
    pub score: u8,
    pub feedback: String,
}

/// 评分记录的附加信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionMetadata {
    pub html_length: usize,
    pub css_length: usize,
    pub scored_by: String,
    pub similarity: ScoreResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creativity: Option<CreativityScore>,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "userCollege", default, skip_serializing_if = "Option::is_none")]
    pub user_college: Option<String>,
    /// RFC 3339 时间戳
    pub timestamp: String,
}

/// 写入结果存储的评分记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub player_name: String,
    pub score: u8,
    pub description: String,
    pub html_code: String,
    pub css_code: String,
    pub question_id: Uuid,
    pub roundno: u32,
    pub metadata: SubmissionMetadata,
}

impl SubmissionRecord {
    /// 根据评分结果组装记录
    ///
    /// `score` 始终取相似度得分；有创意分时 `description` 使用 LLM 的评语。
    pub fn new(
        submission: &Submission,
        question: &Question,
        similarity: ScoreResult,
        creativity: Option<CreativityScore>,
    ) -> Self {
        let scored_by = if creativity.is_some() {
            "similarity+AI"
        } else {
            "similarity"
        };
        let description = creativity
            .as_ref()
            .map(|c| c.feedback.clone())
            .unwrap_or_else(|| similarity.details.clone());
        let css_code = submission.css_code.clone().unwrap_or_default();

        Self {
            id: Uuid::new_v4(),
            player_name: submission.player_name.clone(),
            score: similarity.score,
            description,
            html_code: submission.html_code.clone(),
            metadata: SubmissionMetadata {
                html_length: submission.html_code.chars().count(),
                css_length: css_code.chars().count(),
                scored_by: scored_by.to_string(),
                similarity,
                creativity,
                user_name: submission.player_name.clone(),
                user_college: submission.college.clone(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
            css_code,
            question_id: question.id,
            roundno: question.roundno,
        }
    }
}
