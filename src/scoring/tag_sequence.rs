//! 标签序列提取
//!
//! 只保留文档里开始标签的名字，忽略属性、文本、注释以及 script/style 的内容，
//! 用来衡量两份 HTML 的结构是否一致。

use regex::Regex;

use super::normalize::{HTML_COMMENT_PATTERN, WHITESPACE_CLASS};

// 标签名只做 ASCII 大小写折叠
const SCRIPT_PATTERN: &str = r"<(?i-u:script)[\s\S]*?</(?i-u:script)>";
const STYLE_PATTERN: &str = r"<(?i-u:style)[\s\S]*?</(?i-u:style)>";

/// `<` + 可选空白 + 标签名 + (空白 | `>` | `/`)
fn open_tag_pattern() -> String {
    format!(r"<{ws}*([A-Za-z0-9-]+)(?:{ws}|>|/)", ws = WHITESPACE_CLASS)
}

/// 标签序列提取器
#[derive(Debug, Clone)]
pub struct TagExtractor {
    comment: Regex,
    script: Regex,
    style: Regex,
    open_tag: Regex,
}

impl TagExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            comment: Regex::new(HTML_COMMENT_PATTERN)?,
            script: Regex::new(SCRIPT_PATTERN)?,
            style: Regex::new(STYLE_PATTERN)?,
            open_tag: Regex::new(&open_tag_pattern())?,
        })
    }

    /// 提取标签序列
    ///
    /// 按文档顺序返回小写标签名，以单个空格连接；没有标签时返回空字符串。
    /// 自闭合标签和 void 标签与普通开始标签一样计入，结束标签不计入。
    pub fn extract(&self, raw: &str) -> String {
        let cleaned = self.comment.replace_all(raw, "");
        let cleaned = self.script.replace_all(&cleaned, "");
        let cleaned = self.style.replace_all(&cleaned, "");

        self.open_tag
            .captures_iter(&cleaned)
            .filter_map(|caps| caps.get(1))
            .map(|name| name.as_str().to_lowercase())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
