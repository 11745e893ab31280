//! 全局检测器单例管理
use once_cell::sync::Lazy;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::detector::TechDetector;
use crate::config::{ConfigManager, GlobalConfig};
use crate::error::{RbwResult, RsbuiltwithError};
use crate::rule::DetectionResult;

/// 全局检测器实例
static GLOBAL_DETECTOR: Lazy<Arc<OnceCell<TechDetector>>> = Lazy::new(|| {
    Arc::new(OnceCell::new())
});

/// 初始化全局检测器（默认配置）
pub async fn init_builtwith() -> RbwResult<()> {
    init_builtwith_with_config(ConfigManager::get_default()).await
}

/// 带自定义配置初始化全局检测器
///
/// 重复初始化为幂等空操作，首次成功后配置不再变化
pub async fn init_builtwith_with_config(config: GlobalConfig) -> RbwResult<()> {
    if GLOBAL_DETECTOR.get().is_some() {
        return Ok(());
    }

    let detector = TechDetector::new(config).await?;
    GLOBAL_DETECTOR.set(detector).map_err(|_| {
        RsbuiltwithError::DetectorNotInitialized
    })?;

    Ok(())
}

/// 获取全局检测器
pub fn get_global_detector() -> RbwResult<&'static TechDetector> {
    GLOBAL_DETECTOR.get()
        .ok_or(RsbuiltwithError::DetectorNotInitialized)
}

/// 便捷入口：用全局检测器抓取并检测单个URL
///
/// 须先调用 `init_builtwith` 完成初始化
pub async fn builtwith(url: &str) -> RbwResult<DetectionResult> {
    let detector = get_global_detector()?;
    Ok(detector.detect_url(url).await)
}
