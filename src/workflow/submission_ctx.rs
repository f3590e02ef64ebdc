//! 提交处理上下文
//!
//! 封装"我正在处理第几份提交、是谁交的、答的哪道题"这一信息

use std::fmt::Display;

use crate::models::QuestionRef;

/// 提交处理上下文
#[derive(Debug, Clone)]
pub struct SubmissionCtx {
    /// 提交索引（仅用于日志显示，从1开始）
    pub submission_index: usize,

    /// 选手名称
    pub player_name: String,

    /// 作答的题目
    pub question: QuestionRef,
}

impl SubmissionCtx {
    /// 创建新的提交上下文
    pub fn new(submission_index: usize, player_name: String, question: QuestionRef) -> Self {
        Self {
            submission_index,
            player_name,
            question,
        }
    }
}

impl Display for SubmissionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[提交 {} | {} | {}]",
            self.submission_index, self.player_name, self.question
        )
    }
}
