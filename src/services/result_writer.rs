//! 结果写入服务 - 业务能力层
//!
//! 只负责"把评分记录追加到结果文件"能力，不关心流程

use std::fs::OpenOptions;
use std::io::Write;

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::SubmissionRecord;

/// 结果写入服务
///
/// 职责：
/// - 每条记录写成一行 JSON
/// - 文件不存在时自动创建
/// - 多个任务并发写入时逐条串行
pub struct ResultWriter {
    results_file_path: String,
    lock: Mutex<()>,
}

impl ResultWriter {
    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            results_file_path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// 追加一条评分记录
    pub async fn append(&self, record: &SubmissionRecord) -> AppResult<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        debug!(
            "写入评分记录: {} | 第 {} 轮 | {} 分",
            record.player_name, record.roundno, record.score
        );

        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.results_file_path)
            .map_err(|e| AppError::file_write_failed(&self.results_file_path, e))?;

        file.write_all(line.as_bytes())
            .map_err(|e| AppError::file_write_failed(&self.results_file_path, e))?;

        Ok(())
    }
}
