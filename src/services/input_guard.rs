//! 输入长度限制 - 业务能力层
//!
//! 评分引擎本身不限制输入长度，编辑距离的代价随长度平方增长，
//! 因此在调用引擎之前按字符数截断。

/// 把文本截断到最多 `max_chars` 个字符，`max_chars == 0` 表示不限制
pub fn bound_input(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return text;
    }
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// 是否会被截断
pub fn exceeds_limit(text: &str, max_chars: usize) -> bool {
    max_chars != 0 && text.chars().nth(max_chars).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_input_untouched() {
        assert_eq!(bound_input("<p>hi</p>", 100), "<p>hi</p>");
        assert!(!exceeds_limit("<p>hi</p>", 9));
    }

    #[test]
    fn test_truncates_on_char_boundary() {
        assert_eq!(bound_input("标题标签", 2), "标题");
        assert_eq!(bound_input("abcdef", 3), "abc");
        assert!(exceeds_limit("abcdef", 3));
    }

    #[test]
    fn test_zero_disables_limit() {
        let long = "x".repeat(50_000);
        assert_eq!(bound_input(&long, 0).len(), 50_000);
        assert!(!exceeds_limit(&long, 0));
    }
}
