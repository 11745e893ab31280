//! rsbuiltwith 命令行入口
//! 对若干目标URL抓取并打印技术栈检测结果

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rsbuiltwith::{ConfigManager, RuleLoader, TechDetector};

/// 网站技术栈指纹识别工具
#[derive(Debug, Parser)]
#[command(name = "rsbuiltwith", version, about = "识别网站所用的技术栈（CMS、框架、Web服务器等）")]
struct Cli {
    /// 待检测的目标URL（至少一个）
    #[arg(required = true, value_name = "URL")]
    urls: Vec<String>,

    /// 本地规则库JSON文件路径（优先于缓存与内置规则）
    #[arg(long, value_name = "PATH")]
    rules: Option<PathBuf>,

    /// 检测前先从远程地址拉取最新规则库
    #[arg(long)]
    update: bool,

    /// 以JSON格式输出检测结果
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut builder = ConfigManager::custom();
    if let Some(rules) = cli.rules {
        builder = builder.rule_path(rules);
    }
    let config = builder.build();

    // 规则来源：--update 时拉取远程最新库，否则按常规顺序加载
    let rule_lib = if cli.update {
        RuleLoader::update(&config).await?
    } else {
        RuleLoader::load(&config).await?
    };
    let detector = TechDetector::from_rule_library(&rule_lib, config)?;

    // 单个URL的抓取问题在检测层内部降级，不中断后续URL
    for url in &cli.urls {
        let result = detector.detect_url(url).await;

        if cli.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", url);
            for (category, techs) in &result {
                println!("{}: [{}]", category, techs.join(", "));
            }
            if result.is_empty() {
                println!("(未识别出任何技术)");
            }
        }
    }

    Ok(())
}
