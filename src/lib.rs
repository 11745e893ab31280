//! rsbuiltwith - Rust builtwith网站技术栈指纹识别库

// 导出全局错误类型
pub use self::error::{RsbuiltwithError, RbwResult};

// 导出配置模块
pub use self::config::{GlobalConfig, ConfigManager, CustomConfigBuilder};

// 导出规则模块核心接口
pub use self::rule::{
    CategoryRule, DetectionResult, RuleLibrary, TechRule,
    RuleLoader, RuleCacheManager
};

// 导出提取模块核心接口
pub use self::extractor::{ExtractedTags, HtmlExtractor};

// 导出工具模块核心接口
pub use self::utils::{DetectionUpdater, HeaderConverter};

// 导出编译模块核心接口
pub use self::compiler::{
    CompiledPattern, CompiledTechRule, CompiledRuleLibrary, RuleCompiler
};

// 导出抓取模块核心接口
pub use self::fetcher::{FetchedPage, PageFetcher};

// 导出检测模块核心接口（含便捷的全局单例入口）
pub use self::detector::{
    TechDetector,
    PageSignals,
    TechMatcher,
    builtwith,
    init_builtwith,
    init_builtwith_with_config,
    get_global_detector,
};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod rule;
pub mod extractor;
pub mod utils;
pub mod compiler;
pub mod detector;
pub mod fetcher;
