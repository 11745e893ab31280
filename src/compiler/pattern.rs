//! 编译后模式模型
//! 正则编译后的结构

use std::collections::HashMap;
use regex::Regex;

/// 编译后的正则模式
///
/// 原始签名中 `\;` 之后的元数据段已在编译前剥离，
/// 剩余部分按大小写不敏感编译。
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
}

impl CompiledPattern {
    pub(crate) fn new(regex: Regex) -> Self {
        Self { regex }
    }

    /// 简单匹配判断
    #[inline]
    pub fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }

    /// 规则描述（编译后的正则原文，用于日志与调试）
    pub fn describe(&self) -> &str {
        self.regex.as_str()
    }
}

/// 技术编译后的规则
#[derive(Debug, Clone, Default)]
pub struct CompiledTechRule {
    pub category_ids: Vec<u32>,
    pub url_patterns: Vec<CompiledPattern>,
    pub html_patterns: Vec<CompiledPattern>,
    pub script_patterns: Vec<CompiledPattern>,
    pub meta_patterns: HashMap<String, Vec<CompiledPattern>>,
    pub header_patterns: HashMap<String, Vec<CompiledPattern>>,
    pub implies: Vec<String>,
}

/// 编译后的规则库
///
/// 构建完成后只读，可安全地跨线程共享；
/// `tech_names` 在构建时按字典序排好，保证遍历顺序稳定可复现。
#[derive(Debug, Clone, Default)]
pub struct CompiledRuleLibrary {
    tech_patterns: HashMap<String, CompiledTechRule>,
    category_map: HashMap<u32, String>, // 分类ID -> 分类名称
    tech_names: Vec<String>,
}

impl CompiledRuleLibrary {
    pub(crate) fn new(
        tech_patterns: HashMap<String, CompiledTechRule>,
        category_map: HashMap<u32, String>,
    ) -> Self {
        let mut tech_names: Vec<String> = tech_patterns.keys().cloned().collect();
        tech_names.sort();
        Self {
            tech_patterns,
            category_map,
            tech_names,
        }
    }

    /// 按技术名字典序遍历全部编译规则
    pub fn technologies(&self) -> impl Iterator<Item = (&str, &CompiledTechRule)> + '_ {
        self.tech_names
            .iter()
            .filter_map(|name| self.tech_patterns.get(name).map(|rule| (name.as_str(), rule)))
    }

    /// 按名称查找技术规则
    pub fn tech_rule(&self, name: &str) -> Option<&CompiledTechRule> {
        self.tech_patterns.get(name)
    }

    /// 分类ID -> 分类名称
    pub fn category_name(&self, id: u32) -> Option<&str> {
        self.category_map.get(&id).map(String::as_str)
    }

    /// 技术规则总数
    pub fn len(&self) -> usize {
        self.tech_patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tech_patterns.is_empty()
    }
}
