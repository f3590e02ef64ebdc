//! 代码相似度评分引擎
//!
//! 纯计算模块：不做 I/O，不持有可变状态，可并行调用。
//!
//! - `normalize` - HTML / CSS 文本规范化
//! - `tag_sequence` - HTML 开始标签序列提取
//! - `levenshtein` - 编辑距离与相似度
//! - `composer` - 组合上述结果，给出 0-100 的综合分

pub mod composer;
pub mod levenshtein;
pub mod normalize;
pub mod tag_sequence;

pub use composer::{
    compare_outputs, compare_with_breakdown, try_compare_outputs, CodePair, ScoreResult, ScoringError,
    SimilarityBreakdown, SimilarityScorer, DEGRADED_DETAILS,
};
pub use levenshtein::{levenshtein, similarity};
pub use normalize::Normalizer;
pub use tag_sequence::TagExtractor;
