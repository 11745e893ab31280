//! HTML标签提取器
//! 负责从HTML中提取script-src、link-href和meta标签
//!
//! 轻量正则扫描，不构建DOM；属性顺序、引号风格（' 或 "）、
//! 标签与属性名大小写均可容忍，畸形标记既不修正也不报错，
//! 扫描到什么就用什么

use std::collections::HashMap;
use once_cell::sync::Lazy;
use regex::Regex;

/// script 标签的 src 属性值
static RE_SCRIPT_SRC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<script[^>]*?\ssrc\s*=\s*["']([^"']+)["']"#).unwrap()
});
/// link 标签的 href 属性值
static RE_LINK_HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<link[^>]*?\shref\s*=\s*["']([^"']+)["']"#).unwrap()
});
/// 完整 meta 标签
static RE_META_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<meta[^>]*>").unwrap());
/// meta 标签内的 name / http-equiv 属性
static RE_META_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s(?:name|http-equiv)\s*=\s*["']([^"']*)["']"#).unwrap()
});
/// meta 标签内的 content 属性
static RE_META_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\scontent\s*=\s*["']([^"']*)["']"#).unwrap()
});

/// HTML提取结果
#[derive(Debug, Clone, Default)]
pub struct ExtractedTags {
    /// script 标签的 src 值（文档顺序）
    pub script_srcs: Vec<String>,
    /// link 标签的 href 值（文档顺序）
    pub link_hrefs: Vec<String>,
    /// meta 名称（小写）-> content，同名后出现者覆盖先出现者
    pub meta_tags: HashMap<String, String>,
}

/// HTML标签提取器
pub struct HtmlExtractor;

impl HtmlExtractor {
    /// 从HTML字符串提取标签
    pub fn extract(html: &str) -> ExtractedTags {
        let mut tags = ExtractedTags::default();

        // 1. script-src
        for caps in RE_SCRIPT_SRC.captures_iter(html) {
            if let Some(src) = caps.get(1) {
                tags.script_srcs.push(src.as_str().to_string());
            }
        }

        // 2. link-href
        for caps in RE_LINK_HREF.captures_iter(html) {
            if let Some(href) = caps.get(1) {
                tags.link_hrefs.push(href.as_str().to_string());
            }
        }

        // 3. meta：先截取完整标签再分别取属性，属性顺序无关
        for tag in RE_META_TAG.find_iter(html) {
            let fragment = tag.as_str();
            let name = RE_META_NAME
                .captures(fragment)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_lowercase());
            let content = RE_META_CONTENT
                .captures(fragment)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string());

            if let (Some(name), Some(content)) = (name, content) {
                tags.meta_tags.insert(name, content);
            }
        }

        tags
    }
}
