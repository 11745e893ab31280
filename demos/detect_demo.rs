//! rsbuiltwith 离线检测演示程序
//! 功能说明：
//! 1. 演示规则库加载与编译流程（内置规则库，无需网络）
//! 2. 展示多维度指纹识别能力（Header/URL/HTML检测与关联推导）
//! 3. 包含耗时统计与结构化JSON结果输出
//!
//! 运行命令：
//! cargo run --example detect_demo

use std::collections::HashMap;
use std::error::Error;
use std::time::Instant;

use serde_json::to_string_pretty;
use tracing_subscriber::EnvFilter;

use rsbuiltwith::{ConfigManager, RuleLoader, TechDetector};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // ========== 1. 日志系统初始化 ==========
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    // ========== 2. 初始化检测器（内置规则库） ==========
    let rule_lib = RuleLoader::load_embedded()?;
    let detector = TechDetector::from_rule_library(&rule_lib, ConfigManager::get_default())?;

    // ========== 3. 构造离线观测数据 ==========
    let url = "http://demo.example.com/wp-content/themes/demo/index.php";
    let mut headers = HashMap::new();
    headers.insert("Server".to_string(), "nginx/1.18.0".to_string());
    headers.insert("X-Powered-By".to_string(), "PHP/8.1.2".to_string());
    let html = r#"<!DOCTYPE html>
<html>
<head>
    <meta name="generator" content="WordPress 5.9">
    <link rel="stylesheet" href="/wp-content/themes/demo/style.css">
    <script src="/wp-includes/js/jquery/jquery.min.js"></script>
</head>
<body>demo</body>
</html>"#;

    // ========== 4. 执行检测（含耗时统计） ==========
    let start = Instant::now();
    let result = detector.detect(url, Some(&headers), Some(html));
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    // ========== 5. 输出结构化检测结果 ==========
    println!("检测完成，耗时 {:.3} 毫秒", elapsed_ms);
    println!("{}", to_string_pretty(&result)?);

    Ok(())
}
