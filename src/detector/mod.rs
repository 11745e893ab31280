//! 检测模块：技术检测核心逻辑
pub mod global;
pub mod matcher;
pub mod detector;

// 导出核心接口
pub use self::global::{builtwith, init_builtwith, init_builtwith_with_config, get_global_detector};
pub use self::matcher::{PageSignals, TechMatcher};
pub use self::detector::TechDetector;
