//! 全局配置管理,存储所有可配置项

use std::path::PathBuf;

/// 默认规则更新地址（AliasIO Wappalyzer 原始 apps.json）
pub const DEFAULT_RULE_UPDATE_URL: &str =
    "https://raw.githubusercontent.com/AliasIO/Wappalyzer/master/src/apps.json";

/// 全局配置
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    // 本地规则文件路径（设置后优先于缓存与内置规则）
    pub rule_path: Option<PathBuf>,
    // 规则缓存路径
    pub rule_cache_path: PathBuf,
    // 远程规则更新URL
    pub rule_update_url: String,
    // HTTP User-Agent
    pub user_agent: String,
    // 超时配置（单位：秒）
    pub http_timeout: u64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            rule_path: None,
            rule_cache_path: PathBuf::from("builtwith_rules.mp"),
            rule_update_url: DEFAULT_RULE_UPDATE_URL.to_string(),
            user_agent: "rsbuiltwith/0.1.0".to_string(),
            http_timeout: 30,
        }
    }
}

/// 配置管理器（单例）
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: GlobalConfig::default(),
        }
    }

    pub fn rule_path(mut self, path: PathBuf) -> Self {
        self.config.rule_path = Some(path);
        self
    }

    pub fn rule_cache_path(mut self, path: PathBuf) -> Self {
        self.config.rule_cache_path = path;
        self
    }

    pub fn rule_update_url(mut self, url: String) -> Self {
        self.config.rule_update_url = url;
        self
    }

    pub fn user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    pub fn http_timeout(mut self, timeout: u64) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}

impl Default for CustomConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
