//! 规则加载管理器
//! 负责按 本地文件 -> 本地缓存 -> 内置规则 的顺序加载规则库，
//! 并支持从远程地址拉取更新

use std::path::Path;
use reqwest::Client;
use tracing::{debug, warn};

use super::model::RuleLibrary;
use super::cache::RuleCacheManager;
use crate::error::{RbwResult, RsbuiltwithError};
use crate::config::GlobalConfig;

/// 内置规则库（随二进制分发，离线开箱即用）
const EMBEDDED_RULES: &str = include_str!("../../data/apps.json");

/// 规则加载管理器
pub struct RuleLoader;

impl RuleLoader {
    /// 加载规则库
    ///
    /// # 参数
    /// * `config` - 全局配置，`rule_path` 设置时只读该文件
    ///
    /// # 返回
    /// * 原始规则库；显式规则文件的解析错误为致命错误，
    ///   缓存损坏仅告警并回退到内置规则
    pub async fn load(config: &GlobalConfig) -> RbwResult<RuleLibrary> {
        // 1. 显式指定的本地规则文件优先，出错即终止
        if let Some(rule_path) = &config.rule_path {
            let rule_lib = Self::load_from_file(rule_path).await?;
            debug!("从本地规则文件加载成功：{}", rule_path.display());
            return Ok(rule_lib);
        }

        // 2. 本地缓存次之，不存在或损坏时降级
        match RuleCacheManager::load_from_cache(config).await {
            Ok(rule_lib) => {
                debug!("从本地缓存加载规则库成功");
                return Ok(rule_lib);
            }
            Err(e) => {
                debug!("本地缓存不可用：{}，回退到内置规则库", e);
            }
        }

        // 3. 内置规则库兜底
        let rule_lib = Self::parse_rule_json(EMBEDDED_RULES)?;
        debug!("内置规则库加载成功，技术规则数：{}", rule_lib.tech_rules.len());
        Ok(rule_lib)
    }

    /// 从本地JSON文件加载规则库
    pub async fn load_from_file(path: &Path) -> RbwResult<RuleLibrary> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            RsbuiltwithError::RuleLoadError(format!("读取规则文件 {} 失败：{}", path.display(), e))
        })?;
        Self::parse_rule_json(&content)
    }

    /// 加载内置规则库
    pub fn load_embedded() -> RbwResult<RuleLibrary> {
        Self::parse_rule_json(EMBEDDED_RULES)
    }

    /// 解析规则JSON文本
    pub fn parse_rule_json(content: &str) -> RbwResult<RuleLibrary> {
        serde_json::from_str::<RuleLibrary>(content)
            .map_err(|e| RsbuiltwithError::RuleParseError(e.to_string()))
    }

    /// 从远程地址拉取最新规则库并刷新本地缓存
    pub async fn update(config: &GlobalConfig) -> RbwResult<RuleLibrary> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout))
            .build()?;

        debug!("开始拉取远程规则库：{}", config.rule_update_url);
        let response = client
            .get(&config.rule_update_url)
            .header("User-Agent", &config.user_agent)
            .header("Accept-Encoding", "gzip, deflate")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RsbuiltwithError::RuleLoadError(format!(
                "URL {} 返回状态码 {}",
                config.rule_update_url,
                response.status()
            )));
        }

        let body = response.text().await?;
        let rule_lib = Self::parse_rule_json(&body)?;
        debug!("远程规则库拉取成功，技术规则数：{}", rule_lib.tech_rules.len());

        // 缓存写入失败不阻断更新
        if let Err(e) = RuleCacheManager::save_to_cache(config, &rule_lib).await {
            warn!("规则库缓存到本地失败：{}", e);
        } else {
            debug!("远程规则库已缓存到本地");
        }

        Ok(rule_lib)
    }
}
