//! 编辑距离与相似度
//!
//! 按字符计算 Levenshtein 距离（插入、删除、替换代价均为 1），区分大小写。

/// 计算两个字符串的 Levenshtein 距离（以字符为单位）
pub fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    strsim::levenshtein(a, b)
}

/// 由编辑距离得到的相似度，范围 [0, 1]
///
/// 两个空字符串视为完全相同，返回 1。
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}
