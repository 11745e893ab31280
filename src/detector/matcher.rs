//! 技术匹配器：对单个技术规则与单次观测做纯谓词判定

use std::collections::HashMap;

use crate::compiler::{CompiledPattern, CompiledTechRule};
use crate::extractor::{ExtractedTags, HtmlExtractor};
use crate::utils::HeaderConverter;

/// 单次观测的信号集合
///
/// 每次检测调用构建一次：头键统一小写，HTML只提取一遍标签，
/// 之后对全部技术规则复用，与逐技术重复提取的结果等价
#[derive(Debug, Clone)]
pub struct PageSignals<'a> {
    pub url: &'a str,
    pub headers: Option<HashMap<String, String>>,
    pub html: Option<&'a str>,
    pub tags: ExtractedTags,
}

impl<'a> PageSignals<'a> {
    /// 从原始观测（url、可选头、可选HTML）构建信号集合
    pub fn collect(
        url: &'a str,
        headers: Option<&HashMap<String, String>>,
        html: Option<&'a str>,
    ) -> Self {
        let headers = headers.map(HeaderConverter::normalize);
        let tags = html.map(HtmlExtractor::extract).unwrap_or_default();
        Self { url, headers, html, tags }
    }
}

/// 技术匹配器
pub struct TechMatcher;

impl TechMatcher {
    /// 判定单个技术规则是否命中观测
    ///
    /// 五类信号组之间取或：URL、Header、HTML、Script、Meta
    /// 任一组命中即为阳性。组内除Header外模式之间也取或；
    /// Header组是子集语义：规则要求的每个头都必须存在且值命中，
    /// 缺一个即整组失败
    pub fn evaluate(rule: &CompiledTechRule, signals: &PageSignals<'_>) -> bool {
        Self::matches_url(rule, signals)
            || Self::matches_headers(rule, signals)
            || Self::matches_html(rule, signals)
            || Self::matches_script(rule, signals)
            || Self::matches_meta(rule, signals)
    }

    fn matches_url(rule: &CompiledTechRule, signals: &PageSignals<'_>) -> bool {
        Self::any_match(&rule.url_patterns, signals.url)
    }

    /// Header子集语义：所有要求的头同时满足才算命中
    fn matches_headers(rule: &CompiledTechRule, signals: &PageSignals<'_>) -> bool {
        if rule.header_patterns.is_empty() {
            return false;
        }
        let Some(headers) = &signals.headers else {
            return false;
        };

        rule.header_patterns.iter().all(|(name, patterns)| {
            headers
                .get(name)
                .is_some_and(|value| Self::any_match(patterns, value))
        })
    }

    fn matches_html(rule: &CompiledTechRule, signals: &PageSignals<'_>) -> bool {
        signals
            .html
            .is_some_and(|html| Self::any_match(&rule.html_patterns, html))
    }

    /// script模式同时检查 script-src 与 link-href 两类提取值
    fn matches_script(rule: &CompiledTechRule, signals: &PageSignals<'_>) -> bool {
        signals
            .tags
            .script_srcs
            .iter()
            .chain(signals.tags.link_hrefs.iter())
            .any(|src| Self::any_match(&rule.script_patterns, src))
    }

    /// Meta组内取或：任一要求的meta名存在且content命中即为阳性
    fn matches_meta(rule: &CompiledTechRule, signals: &PageSignals<'_>) -> bool {
        rule.meta_patterns.iter().any(|(name, patterns)| {
            signals
                .tags
                .meta_tags
                .get(name)
                .is_some_and(|content| Self::any_match(patterns, content))
        })
    }

    #[inline]
    fn any_match(patterns: &[CompiledPattern], input: &str) -> bool {
        patterns.iter().any(|pattern| pattern.is_match(input))
    }
}
