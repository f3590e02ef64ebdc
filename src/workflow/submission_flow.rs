//! 提交评分流程 - 流程层
//!
//! 核心职责：定义"一份提交"的完整评分流程
//!
//! 流程顺序：
//! 1. 在题库中找到参考答案
//! 2. 截断超长的提交代码 → 相似度评分
//! 3. AI 创意评分（可选，失败不影响记录）
//! 4. 写入结果文件

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::models::{CreativityScore, Question, QuestionBank, Submission, SubmissionRecord};
use crate::scoring::{compare_with_breakdown, CodePair, ScoreResult, SimilarityBreakdown};
use crate::services::input_guard::exceeds_limit;
use crate::services::{bound_input, LlmService, ResultWriter};
use crate::workflow::submission_ctx::SubmissionCtx;

/// 提交评分流程
///
/// - 编排单份提交的评分流程
/// - 不关心批次与并发
/// - 只依赖题库和业务能力（services）
pub struct SubmissionFlow {
    bank: Arc<QuestionBank>,
    llm_service: Option<LlmService>,
    result_writer: ResultWriter,
    max_input_chars: usize,
    verbose_logging: bool,
}

impl SubmissionFlow {
    /// 创建新的评分流程
    pub fn new(config: &Config, bank: Arc<QuestionBank>) -> Self {
        Self {
            bank,
            llm_service: config.enable_ai_scoring.then(|| LlmService::new(config)),
            result_writer: ResultWriter::with_path(&config.results_file),
            max_input_chars: config.max_input_chars,
            verbose_logging: config.verbose_logging,
        }
    }

    pub async fn run(&self, submission: &Submission, ctx: &SubmissionCtx) -> Result<SubmissionRecord> {
        // ========== 1. 查找参考答案 ==========
        let question = self
            .bank
            .resolve(&submission.question)
            .ok_or_else(|| AppError::question_not_found(submission.question))?;

        info!(
            "{} 🔍 对照参考答案: 第 {} 轮 {}",
            ctx, question.roundno, question.title
        );

        // ========== 2. 相似度评分 ==========
        let similarity = self.score_similarity(question, submission, ctx).await?;

        if similarity.is_degraded() {
            warn!("{} ⚠️ 相似度无法计算，记为 0 分", ctx);
        } else {
            info!(
                "{} ✓ 相似度得分: {} ({})",
                ctx, similarity.score, similarity.details
            );
        }

        // ========== 3. AI 创意评分 ==========
        let creativity = self.score_creativity(submission, ctx).await;

        // ========== 4. 写入结果 ==========
        let record = SubmissionRecord::new(submission, question, similarity, creativity);
        self.result_writer
            .append(&record)
            .await
            .with_context(|| format!("{} 写入评分结果失败", ctx))?;

        Ok(record)
    }

    /// 相似度评分（在阻塞线程中计算）
    ///
    /// 只截断提交的代码，参考答案来自题库，按原样参与比较。
    async fn score_similarity(
        &self,
        question: &Question,
        submission: &Submission,
        ctx: &SubmissionCtx,
    ) -> Result<ScoreResult> {
        let reference = question.reference();
        let submitted = submission.code();

        let reference_html = reference.html.to_string();
        let reference_css = reference.css.to_string();
        let submitted_html = self.bounded(submitted.html, ctx, "提交 HTML");
        let submitted_css = self.bounded(submitted.css, ctx, "提交 CSS");

        let (similarity, breakdown) = tokio::task::spawn_blocking(move || {
            compare_with_breakdown(
                CodePair::new(&reference_html, Some(reference_css.as_str())),
                CodePair::new(&submitted_html, Some(submitted_css.as_str())),
            )
        })
        .await
        .with_context(|| format!("{} 评分任务执行失败", ctx))?;

        if let Some(breakdown) = breakdown.filter(|_| self.verbose_logging) {
            self.log_breakdown(ctx, &breakdown);
        }

        Ok(similarity)
    }

    /// AI 创意评分，失败时返回 None
    async fn score_creativity(
        &self,
        submission: &Submission,
        ctx: &SubmissionCtx,
    ) -> Option<CreativityScore> {
        let llm_service = self.llm_service.as_ref()?;

        info!("{} 🤖 正在请求 AI 创意评分...", ctx);
        let code = submission.code();
        let html = self.bounded(code.html, ctx, "提交 HTML");
        let css = self.bounded(code.css, ctx, "提交 CSS");

        match llm_service.evaluate_creativity(&html, &css).await {
            Ok(creativity) => {
                info!(
                    "{} ✓ AI 创意分: {} ({})",
                    ctx, creativity.score, creativity.feedback
                );
                Some(creativity)
            }
            Err(e) => {
                warn!("{} ⚠️ AI 创意评分失败，仅记录相似度得分: {:#}", ctx, e);
                None
            }
        }
    }

    fn bounded(&self, text: &str, ctx: &SubmissionCtx, label: &str) -> String {
        if exceeds_limit(text, self.max_input_chars) {
            warn!(
                "{} ⚠️ {} 超过 {} 字符，已截断",
                ctx, label, self.max_input_chars
            );
        }
        bound_input(text, self.max_input_chars).to_string()
    }

    // ========== 日志辅助方法 ==========

    fn log_breakdown(&self, ctx: &SubmissionCtx, breakdown: &SimilarityBreakdown) {
        info!(
            "{}   文本 {:.3} | 结构 {:.3} | HTML {:.3} | CSS {:.3}",
            ctx, breakdown.text, breakdown.tag, breakdown.html, breakdown.css
        );
    }
}
