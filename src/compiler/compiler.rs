//! 规则编译器核心
//! 仅负责将原始规则编译为可执行的正则模式

use std::collections::HashMap;
use std::time::Instant;
use regex::RegexBuilder;
use tracing::{debug, error};

use super::pattern::{CompiledPattern, CompiledTechRule, CompiledRuleLibrary};
use crate::rule::{RuleLibrary, TechRule};
use crate::error::{RbwResult, RsbuiltwithError};

/// 元数据分隔符：`\;` 之后为 Wappalyzer 风格的 version/confidence 附加段，
/// 与匹配判定无关，编译前剥离
const METADATA_DELIMITER: &str = r"\;";

/// 规则编译器
pub struct RuleCompiler;

impl RuleCompiler {
    /// 编译规则库
    ///
    /// # 参数
    /// * `rule_lib` - 反序列化后的原始规则库
    ///
    /// # 返回
    /// * 编译后的规则库；任一模式语法非法或分类ID未定义时整体失败，
    ///   不产出部分可用的规则库
    pub fn compile(rule_lib: &RuleLibrary) -> RbwResult<CompiledRuleLibrary> {
        let start = Instant::now();

        // 1. 构建分类映射（ID -> 名称），键为十进制字符串
        let mut category_map = HashMap::with_capacity(rule_lib.category_rules.len());
        for (raw_id, cat_rule) in &rule_lib.category_rules {
            let id = raw_id.parse::<u32>().map_err(|_| {
                RsbuiltwithError::RuleParseError(format!("分类键无法解析为数字：{}", raw_id))
            })?;
            category_map.insert(id, cat_rule.name.clone());
        }

        // 2. 编译每个技术规则
        let mut compiled_tech_rules = HashMap::with_capacity(rule_lib.tech_rules.len());
        let mut compile_stats = CompileStats::default();
        for (tech_name, tech_rule) in &rule_lib.tech_rules {
            // 2.1 先校验分类引用，引用未定义分类时拒绝整库
            for cat_id in &tech_rule.category_ids {
                if !category_map.contains_key(cat_id) {
                    error!("技术 {} 引用未定义分类 {}", tech_name, cat_id);
                    return Err(RsbuiltwithError::UnknownCategoryError(*cat_id));
                }
            }

            let compiled_tech = Self::compile_tech_rule(tech_name, tech_rule, &mut compile_stats)?;
            compiled_tech_rules.insert(tech_name.clone(), compiled_tech);
        }

        // 3. 输出编译统计
        debug!("规则编译完成，总耗时{:?}", start.elapsed());
        debug!(
            "编译统计：URL模式{}条、HTML模式{}条、Script模式{}条、Header模式{}条、Meta模式{}条",
            compile_stats.url_count,
            compile_stats.html_count,
            compile_stats.script_count,
            compile_stats.header_count,
            compile_stats.meta_count
        );

        Ok(CompiledRuleLibrary::new(compiled_tech_rules, category_map))
    }

    /// 编译单个技术规则
    fn compile_tech_rule(
        tech_name: &str,
        tech_rule: &TechRule,
        stats: &mut CompileStats,
    ) -> RbwResult<CompiledTechRule> {
        let url_patterns = Self::compile_pattern_list(tech_name, "url", &tech_rule.url)?;
        let html_patterns = Self::compile_pattern_list(tech_name, "html", &tech_rule.html)?;
        let script_patterns = Self::compile_pattern_list(tech_name, "script", &tech_rule.script)?;
        let meta_patterns = Self::compile_keyed_patterns(tech_name, "meta", &tech_rule.meta)?;
        let header_patterns = Self::compile_keyed_patterns(tech_name, "headers", &tech_rule.headers)?;

        stats.url_count += url_patterns.len();
        stats.html_count += html_patterns.len();
        stats.script_count += script_patterns.len();
        stats.meta_count += meta_patterns.values().map(Vec::len).sum::<usize>();
        stats.header_count += header_patterns.values().map(Vec::len).sum::<usize>();

        Ok(CompiledTechRule {
            category_ids: tech_rule.category_ids.clone(),
            url_patterns,
            html_patterns,
            script_patterns,
            meta_patterns,
            header_patterns,
            // implies 目标作为查找键使用，其自带的元数据后缀一并剥离
            implies: tech_rule
                .implies
                .iter()
                .map(|target| strip_metadata(target).to_string())
                .collect(),
        })
    }

    /// 编译列表型模式（url/html/script）
    fn compile_pattern_list(
        tech_name: &str,
        field: &'static str,
        raw_patterns: &[String],
    ) -> RbwResult<Vec<CompiledPattern>> {
        raw_patterns
            .iter()
            .map(|raw| Self::compile_single_pattern(tech_name, field, raw))
            .collect()
    }

    /// 编译键值对型模式（meta/headers），键统一转小写与观测侧归一化对齐
    fn compile_keyed_patterns(
        tech_name: &str,
        field: &'static str,
        raw_patterns: &HashMap<String, Vec<String>>,
    ) -> RbwResult<HashMap<String, Vec<CompiledPattern>>> {
        let mut keyed_patterns = HashMap::with_capacity(raw_patterns.len());
        for (key, patterns) in raw_patterns {
            keyed_patterns.insert(
                key.to_lowercase(),
                Self::compile_pattern_list(tech_name, field, patterns)?,
            );
        }
        Ok(keyed_patterns)
    }

    /// 编译单个正则模式
    ///
    /// 剥离 `\;` 元数据后缀后按大小写不敏感编译；
    /// 语法非法时报 `InvalidPatternError`，由调用方作为致命错误传播
    pub fn compile_single_pattern(
        tech_name: &str,
        field: &'static str,
        raw_pattern: &str,
    ) -> RbwResult<CompiledPattern> {
        let effective = strip_metadata(raw_pattern);
        let regex = RegexBuilder::new(effective)
            .case_insensitive(true)
            .build()
            .map_err(|e| RsbuiltwithError::InvalidPatternError {
                tech: tech_name.to_string(),
                field,
                source: e,
            })?;
        Ok(CompiledPattern::new(regex))
    }
}

/// 截断第一个 `\;` 之后的元数据段
fn strip_metadata(raw: &str) -> &str {
    match raw.split_once(METADATA_DELIMITER) {
        Some((head, _)) => head,
        None => raw,
    }
}

/// 编译统计信息
#[derive(Debug, Clone, Default)]
struct CompileStats {
    url_count: usize,
    html_count: usize,
    script_count: usize,
    header_count: usize,
    meta_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::model::CategoryRule;

    fn library_with(apps: Vec<(&str, TechRule)>, cats: Vec<(&str, &str)>) -> RuleLibrary {
        let mut rule_lib = RuleLibrary::default();
        for (id, name) in cats {
            rule_lib
                .category_rules
                .insert(id.to_string(), CategoryRule { name: name.to_string() });
        }
        for (name, rule) in apps {
            rule_lib.tech_rules.insert(name.to_string(), rule);
        }
        rule_lib
    }

    #[test]
    fn test_metadata_suffix_stripped_before_compile() {
        // 测试场景：\;version: 后缀剥离后才参与匹配
        let pattern = RuleCompiler::compile_single_pattern(
            "WordPress",
            "html",
            r"WordPress\;version:\1",
        )
        .unwrap();

        assert!(pattern.is_match("WordPress 5.0 theme"));
        assert_eq!(pattern.describe(), "WordPress");
    }

    #[test]
    fn test_confidence_suffix_stripped() {
        // 测试场景：\;confidence: 后缀同样剥离
        let pattern = RuleCompiler::compile_single_pattern(
            "Varnish",
            "headers",
            r"varnish\;confidence:50",
        )
        .unwrap();
        assert!(pattern.is_match("Varnish/6.0"));
    }

    #[test]
    fn test_patterns_compile_case_insensitive() {
        // 测试场景：nginx 模式命中 Nginx/1.18.0
        let pattern = RuleCompiler::compile_single_pattern("Nginx", "headers", "nginx").unwrap();
        assert!(pattern.is_match("Nginx/1.18.0"));
        assert!(pattern.is_match("NGINX"));
    }

    #[test]
    fn test_empty_pattern_matches_anything() {
        // 测试场景：空模式表示仅要求信号存在
        let pattern = RuleCompiler::compile_single_pattern("Cloudflare", "headers", "").unwrap();
        assert!(pattern.is_match("7d2f1a0b8c-LAX"));
        assert!(pattern.is_match(""));
    }

    #[test]
    fn test_invalid_pattern_is_fatal() {
        // 测试场景：非法正则语法整库编译失败
        let rule_lib = library_with(
            vec![(
                "Broken",
                TechRule {
                    category_ids: vec![1],
                    html: vec!["(unclosed".to_string()],
                    ..Default::default()
                },
            )],
            vec![("1", "cms")],
        );

        let result = RuleCompiler::compile(&rule_lib);
        assert!(matches!(
            result,
            Err(RsbuiltwithError::InvalidPatternError { field: "html", .. })
        ));
    }

    #[test]
    fn test_unknown_category_is_fatal() {
        // 测试场景：引用未定义分类ID整库编译失败
        let rule_lib = library_with(
            vec![(
                "Orphan",
                TechRule { category_ids: vec![99], ..Default::default() },
            )],
            vec![("1", "cms")],
        );

        let result = RuleCompiler::compile(&rule_lib);
        assert!(matches!(result, Err(RsbuiltwithError::UnknownCategoryError(99))));
    }

    #[test]
    fn test_malformed_category_key_is_fatal() {
        // 测试场景：分类键不是十进制数字时报解析错误
        let rule_lib = library_with(vec![], vec![("abc", "broken")]);
        let result = RuleCompiler::compile(&rule_lib);
        assert!(matches!(result, Err(RsbuiltwithError::RuleParseError(_))));
    }

    #[test]
    fn test_implies_targets_suffix_stripped() {
        // 测试场景：implies 目标的 \; 后缀剥离为纯查找键
        let rule_lib = library_with(
            vec![
                (
                    "WooCommerce",
                    TechRule {
                        category_ids: vec![6],
                        html: vec!["woocommerce".to_string()],
                        implies: vec![r"WordPress\;confidence:100".to_string()],
                        ..Default::default()
                    },
                ),
                (
                    "WordPress",
                    TechRule { category_ids: vec![1], ..Default::default() },
                ),
            ],
            vec![("1", "cms"), ("6", "ecommerce")],
        );

        let compiled = RuleCompiler::compile(&rule_lib).unwrap();
        assert_eq!(
            compiled.tech_rule("WooCommerce").unwrap().implies,
            vec!["WordPress".to_string()]
        );
    }

    #[test]
    fn test_keyed_pattern_names_lowercased() {
        // 测试场景：meta/headers 键编译时统一小写
        let rule_lib = library_with(
            vec![(
                "Nginx",
                TechRule {
                    category_ids: vec![22],
                    headers: [("Server".to_string(), vec!["nginx".to_string()])]
                        .into_iter()
                        .collect(),
                    ..Default::default()
                },
            )],
            vec![("22", "web-servers")],
        );

        let compiled = RuleCompiler::compile(&rule_lib).unwrap();
        let rule = compiled.tech_rule("Nginx").unwrap();
        assert!(rule.header_patterns.contains_key("server"));
        assert!(!rule.header_patterns.contains_key("Server"));
    }

    #[test]
    fn test_technologies_iterate_in_lexicographic_order() {
        // 测试场景：遍历顺序与插入顺序无关，按名称字典序
        let rule_lib = library_with(
            vec![
                ("Zulu", TechRule { category_ids: vec![1], ..Default::default() }),
                ("Alpha", TechRule { category_ids: vec![1], ..Default::default() }),
                ("Mango", TechRule { category_ids: vec![1], ..Default::default() }),
            ],
            vec![("1", "cms")],
        );

        let compiled = RuleCompiler::compile(&rule_lib).unwrap();
        let names: Vec<&str> = compiled.technologies().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Alpha", "Mango", "Zulu"]);
    }
}
