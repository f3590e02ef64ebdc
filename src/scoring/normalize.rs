//! 文本规范化
//!
//! 把 HTML / CSS 源码整理成便于比较的单行小写形式

use regex::Regex;

/// HTML 注释（非贪婪，可跨行）
pub(crate) const HTML_COMMENT_PATTERN: &str = r"<!--[\s\S]*?-->";

/// 空白字符集，与浏览器中正则 `\s` 和 `String.prototype.trim` 的定义一致
///
/// 包含 U+FEFF（BOM），不包含 U+0085（NEL）。
pub(crate) const WHITESPACE_CLASS: &str =
    r"[\t\n\x0B\x0C\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}]";

/// 是否属于 [`WHITESPACE_CLASS`]
pub(crate) fn is_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r' | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// 文本规范化器
///
/// HTML 会先去掉注释，CSS 不去注释，两者都会折叠空白、去掉首尾空白并转成小写。
#[derive(Debug, Clone)]
pub struct Normalizer {
    comment: Regex,
    whitespace: Regex,
}

impl Normalizer {
    /// 编译规范化所需的正则
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            comment: Regex::new(HTML_COMMENT_PATTERN)?,
            whitespace: Regex::new(&format!("{}+", WHITESPACE_CLASS))?,
        })
    }

    /// 规范化 HTML：去注释 → 折叠空白 → trim → 小写
    pub fn html(&self, raw: &str) -> String {
        let without_comments = self.comment.replace_all(raw, "");
        self.collapse(&without_comments)
    }

    /// 规范化 CSS：折叠空白 → trim → 小写
    ///
    /// 注意：CSS 的 `/* */` 注释不会被去掉
    pub fn css(&self, raw: &str) -> String {
        self.collapse(raw)
    }

    fn collapse(&self, text: &str) -> String {
        self.whitespace
            .replace_all(text, " ")
            .trim_matches(is_whitespace)
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new().unwrap()
    }

    #[test]
    fn test_html_strips_multiline_comments() {
        let n = normalizer();
        let raw = "<p>a</p><!-- first\n second -->\n<P>B</P><!--x-->";
        assert_eq!(n.html(raw), "<p>a</p> <p>b</p>");
    }

    #[test]
    fn test_html_comments_are_non_greedy() {
        let n = normalizer();
        assert_eq!(n.html("<!--a--><i>keep</i><!--b-->"), "<i>keep</i>");
    }

    #[test]
    fn test_collapse_whitespace_and_trim() {
        let n = normalizer();
        assert_eq!(n.html("  \t<div>\n\n  Hello   World </div>\r\n"), "<div> hello world </div>");
    }

    #[test]
    fn test_css_keeps_comments() {
        let n = normalizer();
        assert_eq!(
            n.css("/* header */\nH1 {\n  color: RED;\n}"),
            "/* header */ h1 { color: red; }"
        );
    }

    #[test]
    fn test_byte_order_mark_counts_as_whitespace() {
        let n = normalizer();
        assert_eq!(n.html("\u{feff}<p>x</p>"), "<p>x</p>");
        assert_eq!(n.css("a\u{feff}\u{3000}b\u{feff}"), "a b");
    }

    #[test]
    fn test_next_line_is_not_whitespace() {
        let n = normalizer();
        assert_eq!(n.css("a\u{85}b"), "a\u{85}b");
        assert_eq!(n.css("\u{85}a "), "\u{85}a");
        assert!(!is_whitespace('\u{85}'));
        assert!(is_whitespace('\u{2007}'));
    }

    #[test]
    fn test_empty_input() {
        let n = normalizer();
        assert_eq!(n.html(""), "");
        assert_eq!(n.css("   \n\t "), "");
    }
}
