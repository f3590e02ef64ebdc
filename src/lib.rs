//! # Code Judge
//!
//! 一个用于批量评判前端代码挑战提交的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构，外加一个纯计算的评分引擎：
//!
//! ### ⓪ 评分引擎（Scoring）
//! - `scoring/` - 确定性的 HTML/CSS 相似度评分，不做任何 I/O
//! - `Normalizer` - 去注释、折叠空白、转小写
//! - `TagExtractor` - 提取开标签名序列
//! - `SimilarityScorer` - 加权组合，输出 0..=100 的分数
//!
//! ### ① 数据层（Models）
//! - `models/` - 题库、提交与评分记录，以及 TOML 加载器
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单份提交
//! - `input_guard` - 输入长度限制
//! - `LlmService` - AI 创意评分能力
//! - `ResultWriter` - 写 results.jsonl 能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一份提交"的完整评分流程
//! - `SubmissionCtx` - 上下文封装（提交序号 + 选手 + 题目）
//! - `SubmissionFlow` - 流程编排（查题 → 相似度 → AI → 记录）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量评分处理器，管理并发与排行榜
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod scoring;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Question, QuestionBank, QuestionRef, Submission, SubmissionRecord};
pub use orchestrator::{build_leaderboard, App, RunSummary};
pub use scoring::{compare_outputs, try_compare_outputs, ScoreResult, ScoringError};
pub use workflow::{SubmissionCtx, SubmissionFlow};
