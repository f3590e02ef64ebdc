use crate::error::AppError;
use crate::models::question::{Question, QuestionBank};
use crate::models::submission::Submission;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 题库文件结构：若干 `[[questions]]` 表
#[derive(Debug, Deserialize)]
struct QuestionFile {
    #[serde(default)]
    questions: Vec<Question>,
}

/// 从 TOML 文件加载题库
pub async fn load_question_bank(toml_file_path: &Path) -> Result<QuestionBank> {
    let path = toml_file_path.display().to_string();
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(&path, e))?;

    let file: QuestionFile =
        toml::from_str(&content).map_err(|e| AppError::toml_parse_failed(&path, e))?;

    let bank = QuestionBank::new(file.questions)
        .with_context(|| format!("题库内容不合法: {}", toml_file_path.display()))?;

    Ok(bank)
}

/// 从 TOML 文件加载单份提交
pub async fn load_submission(toml_file_path: &Path) -> Result<Submission> {
    let path = toml_file_path.display().to_string();
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(&path, e))?;

    let submission: Submission =
        toml::from_str(&content).map_err(|e| AppError::toml_parse_failed(&path, e))?;

    Ok(submission.with_file_path(toml_file_path.to_string_lossy().to_string()))
}

/// 从文件夹中加载所有提交，按文件名排序
///
/// 无法解析的文件会被跳过并记录警告
pub async fn load_all_submissions(folder_path: &str) -> Result<Vec<Submission>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(AppError::directory_not_found(folder_path).into());
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut submissions = Vec::with_capacity(toml_files.len());
    for path in toml_files {
        tracing::debug!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_submission(&path).await {
            Ok(submission) => submissions.push(submission),
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(submissions)
}
