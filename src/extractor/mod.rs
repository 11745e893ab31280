//! 提取模块：从HTML中提取可供匹配的标签信号

pub mod html_extractor;

pub use self::html_extractor::{ExtractedTags, HtmlExtractor};
