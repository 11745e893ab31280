//! 工具模块：检测结果更新与HTTP头归一化
pub mod detection_updater;
pub mod header_converter;

// 导出核心接口
pub use self::detection_updater::DetectionUpdater;
pub use self::header_converter::HeaderConverter;
