//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量评分和流程调度。
//!
//! ### `batch_processor` - 批量评分处理器
//! - 管理应用生命周期（初始化、运行）
//! - 加载题库与全部提交（Vec<Submission>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计与排行榜
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<Submission>)
//!     ↓
//! workflow::SubmissionFlow (处理单份提交)
//!     ↓
//! services (能力层：input_guard / llm / result_writer)
//!     ↓
//! scoring (纯计算：相似度评分引擎)
//! ```

pub mod batch_processor;

// 重新导出主要类型
pub use batch_processor::{build_leaderboard, App, RunSummary};
