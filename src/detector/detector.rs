//! 检测器核心：对规则库逐技术匹配，汇总为分类->技术名的检测结果

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::matcher::{PageSignals, TechMatcher};
use crate::compiler::{CompiledRuleLibrary, RuleCompiler};
use crate::config::GlobalConfig;
use crate::error::RbwResult;
use crate::fetcher::PageFetcher;
use crate::rule::{DetectionResult, RuleLibrary, RuleLoader};
use crate::utils::DetectionUpdater;

/// 技术检测器
///
/// 编译后的规则库构建一次即只读，经 `Arc` 在克隆实例间共享；
/// 每次 `detect` 自行分配结果，互不干扰，可跨线程并发调用
#[derive(Debug, Clone)]
pub struct TechDetector {
    compiled_lib: Arc<CompiledRuleLibrary>,
    fetcher: PageFetcher,
}

impl TechDetector {
    /// 创建检测器（按配置加载规则库并编译）
    pub async fn new(config: GlobalConfig) -> RbwResult<Self> {
        let rule_lib = RuleLoader::load(&config).await?;
        Self::from_rule_library(&rule_lib, config)
    }

    /// 从已就绪的原始规则库创建检测器
    ///
    /// 供调用方自行决定规则来源（如 `RuleLoader::update` 拉取的最新库）
    pub fn from_rule_library(rule_lib: &RuleLibrary, config: GlobalConfig) -> RbwResult<Self> {
        let compiled_lib = RuleCompiler::compile(rule_lib)?;
        let fetcher = PageFetcher::new(&config)?;
        Ok(Self {
            compiled_lib: Arc::new(compiled_lib),
            fetcher,
        })
    }

    /// 编译后的规则库（只读共享句柄）
    pub fn library(&self) -> Arc<CompiledRuleLibrary> {
        Arc::clone(&self.compiled_lib)
    }

    /// 核心检测接口：对一次观测（url + 可选头 + 可选HTML）做技术判定
    ///
    /// 观测允许残缺：仅头、仅HTML、或只有URL时各信号组
    /// 按可用信号各自判定。技术按名称字典序遍历，结果可复现
    pub fn detect(
        &self,
        url: &str,
        headers: Option<&HashMap<String, String>>,
        html: Option<&str>,
    ) -> DetectionResult {
        let signals = PageSignals::collect(url, headers, html);

        let mut result = DetectionResult::new();
        for (tech_name, rule) in self.compiled_lib.technologies() {
            if TechMatcher::evaluate(rule, &signals) {
                debug!("技术命中：{}", tech_name);
                DetectionUpdater::add_detected(&mut result, tech_name, &self.compiled_lib);
            }
        }
        result
    }

    /// 抓取目标页面后检测
    ///
    /// 抓取失败不致命：告警后降级为仅URL检测，始终返回尽力而为的结果
    pub async fn detect_url(&self, url: &str) -> DetectionResult {
        match self.fetcher.fetch(url).await {
            Ok(page) => self.detect(url, Some(&page.headers), Some(&page.html)),
            Err(e) => {
                warn!("页面抓取失败，降级为仅URL检测：{}，原因：{}", url, e);
                self.detect(url, None, None)
            }
        }
    }

    /// 已持有HTML时的检测：仅以HEAD请求补齐响应头
    ///
    /// HEAD失败同样不致命，降级为 URL + HTML 检测
    pub async fn detect_with_html(&self, url: &str, html: &str) -> DetectionResult {
        match self.fetcher.fetch_headers(url).await {
            Ok(headers) => self.detect(url, Some(&headers), Some(html)),
            Err(e) => {
                warn!("响应头获取失败，仅用HTML检测：{}，原因：{}", url, e);
                self.detect(url, None, Some(html))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use crate::rule::RuleLoader;

    fn detector_with(raw_rules: &str) -> TechDetector {
        let rule_lib = RuleLoader::parse_rule_json(raw_rules).unwrap();
        TechDetector::from_rule_library(&rule_lib, ConfigManager::get_default()).unwrap()
    }

    fn sample_detector() -> TechDetector {
        detector_with(
            r#"{
                "categories": {
                    "1": { "name": "cms" },
                    "11": { "name": "blogs" },
                    "22": { "name": "web-servers" },
                    "27": { "name": "programming-languages" },
                    "34": { "name": "databases" }
                },
                "apps": {
                    "Nginx": {
                        "cats": [22],
                        "headers": { "Server": "nginx(?:/([\\d.]+))?\\;version:\\1" }
                    },
                    "WordPress": {
                        "cats": [1, 11],
                        "url": "/wp-(?:content|includes)/",
                        "meta": { "generator": "^WordPress" },
                        "implies": ["PHP", "MySQL"]
                    },
                    "PHP": {
                        "cats": [27],
                        "headers": { "X-Powered-By": "^PHP" }
                    },
                    "MySQL": { "cats": [34] }
                }
            }"#,
        )
    }

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_detect_by_server_header() {
        // 端到端场景：仅 Server 头，结果含 web-servers: [Nginx]
        let detector = sample_detector();
        let observed = headers(&[("Server", "nginx/1.18.0")]);

        let result = detector.detect("http://example.com", Some(&observed), None);

        assert_eq!(result["web-servers"], vec!["Nginx".to_string()]);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_detect_by_meta_generator_with_implies() {
        // 端到端场景：generator meta 命中 WordPress，连带推导 PHP 与 MySQL
        let detector = sample_detector();
        let html = r#"<html><head><meta name="generator" content="WordPress 5.9"></head></html>"#;

        let result = detector.detect("http://example.com", None, Some(html));

        assert_eq!(result["cms"], vec!["WordPress".to_string()]);
        assert_eq!(result["blogs"], vec!["WordPress".to_string()]);
        assert_eq!(result["programming-languages"], vec!["PHP".to_string()]);
        assert_eq!(result["databases"], vec!["MySQL".to_string()]);
    }

    #[test]
    fn test_detect_nothing_yields_empty_result() {
        // 端到端场景：无任何信号命中时结果为空映射
        let detector = sample_detector();

        let result = detector.detect("http://example.com", None, None);

        assert!(result.is_empty());
    }

    #[test]
    fn test_detect_is_idempotent() {
        // 测试场景：相同输入重复检测结果一致
        let detector = sample_detector();
        let observed = headers(&[("Server", "nginx"), ("X-Powered-By", "PHP/8.1")]);
        let html = r#"<meta name="generator" content="WordPress 6.0">"#;

        let first = detector.detect("http://example.com/wp-content/x", Some(&observed), Some(html));
        let second = detector.detect("http://example.com/wp-content/x", Some(&observed), Some(html));

        assert_eq!(first, second);
    }

    #[test]
    fn test_detect_no_duplicates_across_signal_groups() {
        // 测试场景：同一技术经URL与meta双重命中、再被推导触达，仍只出现一次
        let detector = sample_detector();
        let observed = headers(&[("X-Powered-By", "PHP/8.1")]);
        let html = r#"<meta name="generator" content="WordPress 6.0">"#;

        let result =
            detector.detect("http://example.com/wp-content/x", Some(&observed), Some(html));

        for techs in result.values() {
            let mut deduped = techs.clone();
            deduped.dedup();
            assert_eq!(*techs, deduped);
        }
        assert_eq!(result["programming-languages"], vec!["PHP".to_string()]);
    }

    #[test]
    fn test_category_keys_sorted() {
        // 测试场景：结果分类键按字典序，快照稳定
        let detector = sample_detector();
        let html = r#"<meta name="generator" content="WordPress 6.0">"#;

        let result = detector.detect("http://example.com", None, Some(html));
        let categories: Vec<&str> = result.keys().map(String::as_str).collect();

        let mut sorted = categories.clone();
        sorted.sort();
        assert_eq!(categories, sorted);
    }
}
