//! 批量评分处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量提交的评分和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、创建日志文件、加载题库
//! 2. **批量加载**：扫描并加载所有待评分的提交（`Vec<Submission>`）
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：将提交分批次处理，每批完成后再开始下一批
//! 5. **全局统计**：汇总所有提交的评分结果并输出排行榜

use crate::config::Config;
use crate::models::{load_all_submissions, load_question_bank, Submission, SubmissionRecord};
use crate::utils::logging::{
    init_log_file, log_batch_complete, log_batch_start, log_startup, log_submissions_loaded,
    print_final_stats, print_leaderboard,
};
use crate::workflow::{SubmissionCtx, SubmissionFlow};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<SubmissionFlow>,
}

/// 一次运行的统计结果
#[derive(Debug, Default)]
pub struct RunSummary {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
    pub records: Vec<SubmissionRecord>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;

        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(config.max_concurrent_submissions, config.enable_ai_scoring);

        // 加载题库
        info!("\n📁 正在加载题库: {}", config.questions_file);
        let bank = load_question_bank(Path::new(&config.questions_file)).await?;
        if bank.is_empty() {
            warn!("⚠️ 题库为空，所有提交都将无法评分");
        } else {
            info!("✓ 题库共 {} 道题目", bank.len());
        }

        let flow = Arc::new(SubmissionFlow::new(&config, Arc::new(bank)));

        Ok(Self { config, flow })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunSummary> {
        // 加载所有待评分的提交
        let submissions = self.load_submissions().await?;

        if submissions.is_empty() {
            warn!("⚠️ 没有找到待评分的提交，程序结束");
            return Ok(RunSummary::default());
        }

        log_submissions_loaded(submissions.len(), self.config.max_concurrent_submissions);

        // 处理所有提交
        let summary = self.process_all_submissions(submissions).await?;

        // 输出最终统计
        print_final_stats(
            summary.success,
            summary.failed,
            summary.total,
            &self.config.results_file,
        );
        print_leaderboard(&build_leaderboard(
            &summary.records,
            self.config.leaderboard_size,
        ));

        Ok(summary)
    }

    /// 加载提交
    async fn load_submissions(&self) -> Result<Vec<Submission>> {
        info!("\n📁 正在扫描待评分的提交...");
        load_all_submissions(&self.config.submissions_folder).await
    }

    /// 处理所有提交
    async fn process_all_submissions(&self, submissions: Vec<Submission>) -> Result<RunSummary> {
        let batch_size = self.config.max_concurrent_submissions;
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total = submissions.len();
        let total_batches = total.div_ceil(batch_size);
        let mut summary = RunSummary {
            total,
            ..Default::default()
        };

        // 分批处理
        for (batch_idx, batch) in submissions.chunks(batch_size).enumerate() {
            let batch_start = batch_idx * batch_size;
            let batch_num = batch_idx + 1;

            log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_start + batch.len(),
                total,
            );

            // 处理本批
            let (records, failed) = self
                .process_batch(batch, batch_start, semaphore.clone())
                .await?;

            log_batch_complete(batch_num, records.len(), batch.len());

            summary.success += records.len();
            summary.failed += failed;
            summary.records.extend(records);
        }

        Ok(summary)
    }

    /// 处理单个批次，返回成功的记录和失败数量
    async fn process_batch(
        &self,
        batch: &[Submission],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<(Vec<SubmissionRecord>, usize)> {
        let mut handles = Vec::with_capacity(batch.len());

        // 为本批创建并发任务
        for (idx, submission) in batch.iter().enumerate() {
            let submission_index = batch_start + idx + 1;
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .context("并发控制信号量已关闭")?;
            let flow = Arc::clone(&self.flow);
            let submission = submission.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let ctx = SubmissionCtx::new(
                    submission_index,
                    submission.player_name.clone(),
                    submission.question,
                );
                flow.run(&submission, &ctx).await.map_err(|e| {
                    error!("{} ❌ 评分过程中发生错误: {:#}", ctx, e);
                    e
                })
            });
            handles.push((submission_index, handle));
        }

        // 等待本批所有任务完成
        let mut records = Vec::new();
        let mut failed = 0;

        for (submission_index, handle) in handles {
            match handle.await {
                Ok(Ok(record)) => records.push(record),
                Ok(Err(_)) => failed += 1,
                Err(e) => {
                    error!("[提交 {}] 任务执行失败: {}", submission_index, e);
                    failed += 1;
                }
            }
        }

        Ok((records, failed))
    }
}

/// 排行榜：按分数降序，同分按选手名升序，取前 `size` 名
pub fn build_leaderboard(records: &[SubmissionRecord], size: usize) -> Vec<&SubmissionRecord> {
    let mut ranked: Vec<&SubmissionRecord> = records.iter().collect();
    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.player_name.cmp(&b.player_name))
    });
    ranked.truncate(size);
    ranked
}
