//! HTTP头转换工具
//! 将reqwest的HeaderMap与调用方传入的头映射统一为小写键的HashMap

use std::collections::HashMap;
use reqwest::header::HeaderMap;

/// HTTP头转换器
pub struct HeaderConverter;

impl HeaderConverter {
    /// 归一化调用方传入的头映射，键转小写，值原样保留
    pub fn normalize(headers: &HashMap<String, String>) -> HashMap<String, String> {
        headers
            .iter()
            .map(|(name, value)| (name.to_lowercase(), value.clone()))
            .collect()
    }

    /// 将reqwest的HeaderMap转为HashMap
    /// 同名头只保留首个值，非UTF-8的值按空字符串处理
    pub fn from_header_map(headers: &HeaderMap) -> HashMap<String, String> {
        let mut converted = HashMap::new();
        for (name, value) in headers.iter() {
            converted
                .entry(name.as_str().to_lowercase())
                .or_insert_with(|| value.to_str().unwrap_or("").to_string());
        }
        converted
    }
}
