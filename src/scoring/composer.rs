//! 评分组合器
//!
//! 把规范化、标签序列和编辑距离三部分组合成最终的 [`ScoreResult`]。
//!
//! 权重固定：
//! - HTML 相似度 = 0.5 × 文本相似度 + 0.5 × 标签序列相似度
//! - 综合分 = 0.75 × HTML 相似度 + 0.25 × CSS 相似度

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use super::levenshtein::similarity;
use super::normalize::Normalizer;
use super::tag_sequence::TagExtractor;

pub const TEXT_WEIGHT: f64 = 0.5;
pub const TAG_WEIGHT: f64 = 0.5;
pub const HTML_WEIGHT: f64 = 0.75;
pub const CSS_WEIGHT: f64 = 0.25;

/// 计算失败时写入 `details` 的固定内容
pub const DEGRADED_DETAILS: &str = "error computing similarity";

/// 评分引擎内部错误
#[derive(Debug, Clone, Error)]
pub enum ScoringError {
    /// 正则表达式编译失败
    #[error("正则表达式编译失败: {0}")]
    Pattern(#[from] regex::Error),
    /// 计算过程中发生 panic
    #[error("相似度计算过程中发生异常: {0}")]
    Panicked(String),
    /// 计算结果不是有限数值
    #[error("相似度计算结果不是有限数值 ({0})")]
    NonFinite(&'static str),
}

/// 一组 HTML / CSS 代码（参考答案或提交）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodePair<'a> {
    pub html: &'a str,
    pub css: &'a str,
}

impl<'a> CodePair<'a> {
    /// 缺失的 CSS 按空字符串处理
    pub fn new(html: &'a str, css: Option<&'a str>) -> Self {
        Self {
            html,
            css: css.unwrap_or_default(),
        }
    }
}

/// 评分结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    /// 综合分 0-100
    pub score: u8,
    /// HTML 相似度 0-1
    pub html_similarity: f64,
    /// CSS 相似度 0-1
    pub css_similarity: f64,
    pub details: String,
}

impl ScoreResult {
    /// 计算失败时返回的全零结果
    pub fn degraded() -> Self {
        Self {
            score: 0,
            html_similarity: 0.0,
            css_similarity: 0.0,
            details: DEGRADED_DETAILS.to_string(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.details == DEGRADED_DETAILS
    }
}

/// 各项相似度的明细（未截断到 [0, 1]）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityBreakdown {
    pub text: f64,
    pub tag: f64,
    pub html: f64,
    pub css: f64,
    pub combined: f64,
}

impl SimilarityBreakdown {
    fn ensure_finite(&self) -> Result<(), ScoringError> {
        let fields = [
            ("text", self.text),
            ("tag", self.tag),
            ("html", self.html),
            ("css", self.css),
            ("combined", self.combined),
        ];
        match fields.iter().find(|(_, value)| !value.is_finite()) {
            Some((name, _)) => Err(ScoringError::NonFinite(*name)),
            None => Ok(()),
        }
    }
}

/// 相似度评分器
///
/// 持有编译好的正则，无内部可变状态，可在多个线程间共享。
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    normalizer: Normalizer,
    tags: TagExtractor,
}

impl SimilarityScorer {
    pub fn new() -> Result<Self, ScoringError> {
        Ok(Self {
            normalizer: Normalizer::new()?,
            tags: TagExtractor::new()?,
        })
    }

    /// 进程内共享的评分器
    pub fn shared() -> Result<&'static Self, ScoringError> {
        static SCORER: OnceLock<Result<SimilarityScorer, ScoringError>> = OnceLock::new();
        SCORER.get_or_init(Self::new).as_ref().map_err(Clone::clone)
    }

    /// 计算各项相似度明细
    pub fn breakdown(&self, reference: CodePair<'_>, submitted: CodePair<'_>) -> SimilarityBreakdown {
        let text = similarity(
            &self.normalizer.html(reference.html),
            &self.normalizer.html(submitted.html),
        );
        let tag = similarity(
            &self.tags.extract(reference.html),
            &self.tags.extract(submitted.html),
        );
        let html = TEXT_WEIGHT * text + TAG_WEIGHT * tag;

        let css = similarity(
            &self.normalizer.css(reference.css),
            &self.normalizer.css(submitted.css),
        );
        let combined = clamp_unit(HTML_WEIGHT * html + CSS_WEIGHT * css);

        SimilarityBreakdown {
            text,
            tag,
            html,
            css,
            combined,
        }
    }

    /// 计算评分，内部异常以 [`ScoringError`] 返回
    pub fn try_score(
        &self,
        reference: CodePair<'_>,
        submitted: CodePair<'_>,
    ) -> Result<ScoreResult, ScoringError> {
        self.try_score_with_breakdown(reference, submitted)
            .map(|(result, _)| result)
    }

    /// 计算评分，同时返回本次计算的各项明细
    pub fn try_score_with_breakdown(
        &self,
        reference: CodePair<'_>,
        submitted: CodePair<'_>,
    ) -> Result<(ScoreResult, SimilarityBreakdown), ScoringError> {
        let breakdown = panic::catch_unwind(AssertUnwindSafe(|| {
            self.breakdown(reference, submitted)
        }))
        .map_err(|payload| ScoringError::Panicked(panic_message(payload.as_ref())))?;

        breakdown.ensure_finite()?;

        debug!(
            "相似度明细: text={:.3} tag={:.3} html={:.3} css={:.3} combined={:.3}",
            breakdown.text, breakdown.tag, breakdown.html, breakdown.css, breakdown.combined
        );

        let result = ScoreResult {
            score: (breakdown.combined * 100.0).round() as u8,
            html_similarity: clamp_unit(breakdown.html),
            css_similarity: clamp_unit(breakdown.css),
            details: format!(
                "htmlSim={} cssSim={} combined={}",
                fixed3(breakdown.html),
                fixed3(breakdown.css),
                fixed3(breakdown.combined)
            ),
        };
        Ok((result, breakdown))
    }
}

/// 比较参考答案与提交代码，返回可直接展示的评分结果
///
/// 纯函数：相同输入必然得到相同输出，不会返回错误，也不会把异常抛给调用方。
///
/// # 示例
/// ```
/// use code_judge::scoring::compare_outputs;
///
/// let result = compare_outputs("<p>x</p>", Some("p{color:red}"), "<p>x</p>", Some("p{color:red}"));
/// assert_eq!(result.score, 100);
/// ```
pub fn compare_outputs(
    reference_html: &str,
    reference_css: Option<&str>,
    submitted_html: &str,
    submitted_css: Option<&str>,
) -> ScoreResult {
    try_compare_outputs(reference_html, reference_css, submitted_html, submitted_css)
        .unwrap_or_else(degrade)
}

/// 与 [`compare_outputs`] 相同，但把内部异常以错误形式返回
pub fn try_compare_outputs(
    reference_html: &str,
    reference_css: Option<&str>,
    submitted_html: &str,
    submitted_css: Option<&str>,
) -> Result<ScoreResult, ScoringError> {
    SimilarityScorer::shared()?.try_score(
        CodePair::new(reference_html, reference_css),
        CodePair::new(submitted_html, submitted_css),
    )
}

/// 评分并返回明细，失败时返回降级结果且没有明细
pub fn compare_with_breakdown(
    reference: CodePair<'_>,
    submitted: CodePair<'_>,
) -> (ScoreResult, Option<SimilarityBreakdown>) {
    match SimilarityScorer::shared()
        .and_then(|scorer| scorer.try_score_with_breakdown(reference, submitted))
    {
        Ok((result, breakdown)) => (result, Some(breakdown)),
        Err(err) => (degrade(err), None),
    }
}

fn degrade(err: ScoringError) -> ScoreResult {
    error!("❌ 相似度计算失败，返回降级结果: {}", err);
    ScoreResult::degraded()
}

/// 保留三位小数，恰好在中点时向上进位
fn fixed3(value: f64) -> String {
    format!("{:.3}", (value * 1000.0).round() / 1000.0)
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "未知异常".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_identity_scores_full_marks() {
        let html = "<main><h1 class=\"t\">Title</h1><p>Body text</p></main>";
        let css = "main { display: grid; }\nh1 { color: #333; }";
        let result = compare_outputs(html, Some(css), html, Some(css));
        assert_eq!(result.score, 100);
        assert_eq!(result.html_similarity, 1.0);
        assert_eq!(result.css_similarity, 1.0);
        assert_eq!(result.details, "htmlSim=1.000 cssSim=1.000 combined=1.000");
    }

    #[test]
    fn test_both_empty_is_perfect() {
        let result = compare_outputs("", Some(""), "", Some(""));
        assert_eq!(result.score, 100);
        assert_eq!(result.html_similarity, 1.0);
        assert_eq!(result.css_similarity, 1.0);
    }

    #[test]
    fn test_absent_css_equals_empty_css() {
        let with_none = compare_outputs("<p>a</p>", None, "<p>a</p>", None);
        let with_empty = compare_outputs("<p>a</p>", Some(""), "<p>a</p>", Some(""));
        assert_eq!(with_none, with_empty);
        assert_eq!(with_none.score, 100);
    }

    #[test]
    fn test_whitespace_runs_collapse_to_same_text() {
        let result = compare_outputs("<div>  A\n\t</div>", None, "<div>\nA   </div>", None);
        assert_eq!(result.score, 100);
        assert_eq!(result.html_similarity, 1.0);
    }

    #[test]
    fn test_whitespace_collapses_to_one_space_not_zero() {
        // "<div>a</div>" 与 "<div> a </div>" 文本相差两个空格，结构一致
        let result = compare_outputs("<div>A</div>", Some(""), "<div>   A   </div>", Some(""));
        assert_close(result.html_similarity, 0.5 * (1.0 - 2.0 / 14.0) + 0.5);
        assert_eq!(result.css_similarity, 1.0);
        assert_eq!(result.score, 95);
    }

    #[test]
    fn test_html_comments_are_ignored() {
        let result = compare_outputs("<p>x</p>", Some(""), "<!--note--><p>x</p>", Some(""));
        assert_eq!(result.score, 100);
        assert_eq!(result.html_similarity, 1.0);
    }

    #[test]
    fn test_css_comments_are_not_ignored() {
        let result = compare_outputs("", Some("p{color:red}"), "", Some("/*c*/p{color:red}"));
        assert!(result.css_similarity < 1.0);
        assert_close(result.css_similarity, 12.0 / 17.0);
        assert_eq!(result.html_similarity, 1.0);
        assert_eq!(result.score, 93);
    }

    #[test]
    fn test_fixed_html_css_weighting() {
        let html = "<section><p>same</p></section>";
        let result = compare_outputs(html, Some("abc"), html, Some("xyz"));
        assert_eq!(result.html_similarity, 1.0);
        assert_eq!(result.css_similarity, 0.0);
        assert_eq!(result.score, 75);
        assert_eq!(result.details, "htmlSim=1.000 cssSim=0.000 combined=0.750");
    }

    #[test]
    fn test_structure_and_text_split() {
        let scorer = SimilarityScorer::new().unwrap();
        let breakdown = scorer.breakdown(
            CodePair::new("<div>A</div>", None),
            CodePair::new("<div>B</div>", None),
        );
        assert_eq!(breakdown.tag, 1.0);
        assert!(breakdown.text < 1.0);
        assert_close(breakdown.text, 11.0 / 12.0);

        let result = compare_outputs("<div>A</div>", None, "<div>B</div>", None);
        assert!(result.html_similarity < 1.0);
        assert_close(result.html_similarity, 0.5 + 0.5 * 11.0 / 12.0);
    }

    #[test]
    fn test_score_matches_weighted_formula() {
        let cases = [
            ("<ul><li>1</li><li>2</li></ul>", "li{margin:0}", "<ol><li>1</li></ol>", "li { margin: 4px }"),
            ("<h1>Hi</h1>", "", "<h2>Hello there</h2><p>x</p>", "h2{}"),
            ("<table><tr><td>a</td></tr></table>", "td{}", "", ""),
        ];
        for (rh, rc, sh, sc) in cases {
            let result = compare_outputs(rh, Some(rc), sh, Some(sc));
            let combined = (HTML_WEIGHT * result.html_similarity + CSS_WEIGHT * result.css_similarity)
                .clamp(0.0, 1.0);
            assert_eq!(result.score, (combined * 100.0).round() as u8);
        }
    }

    #[test]
    fn test_malformed_inputs_stay_in_range() {
        let inputs = [
            ("<div><span>", "", "</div></span>", "}}}"),
            ("<", "{", "", ""),
            ("", "", "<p>only one side</p>", "p{}"),
            ("<<<>>>< / >", "/* unterminated", "<!-- never closed <b>", "@media {"),
            ("<script>alert(1)", "", "<style>", "\u{0}"),
        ];
        for (rh, rc, sh, sc) in inputs {
            let result = compare_outputs(rh, Some(rc), sh, Some(sc));
            assert!(result.score <= 100);
            assert!((0.0..=1.0).contains(&result.html_similarity));
            assert!((0.0..=1.0).contains(&result.css_similarity));
            assert!(!result.is_degraded());
        }
    }

    #[test]
    fn test_one_side_empty_scores_low() {
        let result = compare_outputs("<p>reference</p>", Some("p{}"), "", Some(""));
        assert_eq!(result.html_similarity, 0.0);
        assert_eq!(result.css_similarity, 0.0);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_deterministic() {
        let a = compare_outputs("<div><p>x</p></div>", Some("p{}"), "<div><b>y</b></div>", Some("b{}"));
        let b = compare_outputs("<div><p>x</p></div>", Some("p{}"), "<div><b>y</b></div>", Some("b{}"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_degraded_result_shape() {
        let degraded = ScoreResult::degraded();
        assert_eq!(degraded.score, 0);
        assert_eq!(degraded.html_similarity, 0.0);
        assert_eq!(degraded.css_similarity, 0.0);
        assert_eq!(degraded.details, DEGRADED_DETAILS);
        assert!(degraded.is_degraded());
        assert_eq!(degrade(ScoringError::NonFinite("combined")), degraded);
    }

    #[test]
    fn test_non_finite_breakdown_is_rejected() {
        let breakdown = SimilarityBreakdown {
            text: 1.0,
            tag: f64::NAN,
            html: 0.5,
            css: 1.0,
            combined: 0.6,
        };
        assert!(matches!(breakdown.ensure_finite(), Err(ScoringError::NonFinite("tag"))));
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
    }

    #[test]
    fn test_details_round_half_up() {
        // 16 个字符、距离 11：cssSim 恰好是 0.3125
        let result = compare_outputs("", Some("abcdefghijklmnop"), "", Some("abcdeXXXXXXXXXXX"));
        assert_close(result.css_similarity, 0.3125);
        assert_eq!(result.details, "htmlSim=1.000 cssSim=0.313 combined=0.828");
        assert_eq!(result.score, 83);

        assert_eq!(fixed3(0.0625), "0.063");
        assert_eq!(fixed3(1.0), "1.000");
        assert_eq!(fixed3(0.0), "0.000");
    }

    #[test]
    fn test_byte_order_mark_and_next_line() {
        let result = compare_outputs("<p>x</p>", Some(""), "\u{feff}<p>x</p>", Some(""));
        assert_eq!(result.score, 100);
        assert_eq!(result.html_similarity, 1.0);

        let result = compare_outputs("<p>x</p>", Some("a\u{85}b"), "<p>x</p>", Some("a b"));
        assert_close(result.css_similarity, 2.0 / 3.0);
        assert_eq!(result.score, 92);
        assert_eq!(result.details, "htmlSim=1.000 cssSim=0.667 combined=0.917");
    }

    #[test]
    fn test_breakdown_comes_with_the_same_score() {
        let reference = CodePair::new("<ul><li>a</li></ul>", Some("li{}"));
        let submitted = CodePair::new("<ol><li>b</li></ol>", Some("li {}"));
        let (result, breakdown) = compare_with_breakdown(reference, submitted);
        let breakdown = breakdown.unwrap();

        assert_eq!(result, compare_outputs(reference.html, Some(reference.css), submitted.html, Some(submitted.css)));
        assert_close(result.html_similarity, breakdown.html);
        assert_close(result.css_similarity, breakdown.css);
        assert_eq!(result.score, (breakdown.combined * 100.0).round() as u8);
    }

    #[test]
    fn test_score_result_json_shape() {
        let result = compare_outputs("<p>x</p>", None, "<p>x</p>", None);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["score"], 100);
        assert_eq!(json["htmlSimilarity"], 1.0);
        assert_eq!(json["cssSimilarity"], 1.0);
        assert!(json["details"].is_string());
    }
}
