//! 规则数据模型定义
//! 仅存储规则数据，无任何业务逻辑，支持序列化/反序列化

use std::collections::{BTreeMap, HashMap};
use serde::{Deserialize, Deserializer, Serialize};

/// 检测结果：分类名 -> 去重后的技术名列表（分类键按字典序）
pub type DetectionResult = BTreeMap<String, Vec<String>>;

/// 技术规则定义（从 Wappalyzer 风格 JSON 解析）
///
/// 持久化格式中 url/html/script/implies 以及 meta/headers 的值
/// 既可能是单个字符串也可能是字符串数组，反序列化时统一归一化
/// 为 Vec，下游不再区分形态。
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TechRule {
    #[serde(rename = "cats", default)]
    pub category_ids: Vec<u32>,

    // 检测规则
    #[serde(default, deserialize_with = "one_or_many")]
    pub url: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub html: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub script: Vec<String>,
    #[serde(default, deserialize_with = "keyed_one_or_many")]
    pub meta: HashMap<String, Vec<String>>,
    #[serde(default, deserialize_with = "keyed_one_or_many")]
    pub headers: HashMap<String, Vec<String>>,

    // 关联规则
    #[serde(default, deserialize_with = "one_or_many")]
    pub implies: Vec<String>,
}

/// 分类规则定义（从 Wappalyzer 风格 JSON 解析）
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CategoryRule {
    #[serde(default)]
    pub name: String,
}

/// 完整规则库
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RuleLibrary {
    #[serde(rename = "categories", default)]
    pub category_rules: HashMap<String, CategoryRule>,
    #[serde(rename = "apps", default)]
    pub tech_rules: HashMap<String, TechRule>,
}

// ======== 单值/列表归一化 ========

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(one) => vec![one],
            OneOrMany::Many(many) => many,
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(OneOrMany::deserialize(deserializer)?.into())
}

fn keyed_one_or_many<'de, D>(deserializer: D) -> Result<HashMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = HashMap::<String, OneOrMany>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(key, value)| (key, value.into())).collect())
}
