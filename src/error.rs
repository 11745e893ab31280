//! 全局错误类型定义

use thiserror::Error;
use regex::Error as RegexError;
use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum RsbuiltwithError {
    // 规则相关错误
    #[error("规则加载失败：{0}")]
    RuleLoadError(String),
    #[error("规则缓存失败：{0}")]
    RuleCacheError(String),
    #[error("规则解析失败：{0}")]
    RuleParseError(String),

    // 编译相关错误（加载阶段致命，规则库整体拒绝）
    #[error("正则模式编译失败 [{tech}.{field}]：{source}")]
    InvalidPatternError {
        tech: String,
        field: &'static str,
        #[source]
        source: RegexError,
    },
    #[error("未知分类ID：{0}")]
    UnknownCategoryError(u32),

    // 检测相关错误
    #[error("检测器未初始化")]
    DetectorNotInitialized,
    #[error("未知推导目标技术：{0}")]
    UnknownImplicationError(String),

    // 网络相关错误
    #[error("页面抓取失败：{0}")]
    FetchError(#[from] reqwest::Error),

    // 序列化/反序列化错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),
    #[error("MessagePack序列化/反序列化失败：{0}")]
    MsgPackError(String),

    // 基础错误
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
    #[error("URL解析失败：{0}")]
    UrlError(#[from] UrlParseError),
}

// 全局Result类型
pub type RbwResult<T> = Result<T, RsbuiltwithError>;
