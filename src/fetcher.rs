//! 页面抓取器
//! 负责目标页面的GET/HEAD请求，产出小写键响应头与解码后的HTML正文

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::GlobalConfig;
use crate::error::RbwResult;
use crate::utils::HeaderConverter;

/// 一次抓取的产出
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    /// 响应头（键已小写）
    pub headers: HashMap<String, String>,
    /// 解码后的HTML正文
    pub html: String,
}

/// 页面抓取器
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// 按全局配置创建抓取器（User-Agent与超时取自配置）
    pub fn new(config: &GlobalConfig) -> RbwResult<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.http_timeout))
            .build()?;
        Ok(Self { client })
    }

    /// GET目标页面，返回响应头与正文
    pub async fn fetch(&self, url: &str) -> RbwResult<FetchedPage> {
        let target = Url::parse(url)?;
        let response = self.client.get(target).send().await?;

        let headers = HeaderConverter::from_header_map(response.headers());
        let html = response.text().await?;
        debug!("页面抓取完成：{}，正文{}字节", url, html.len());

        Ok(FetchedPage { headers, html })
    }

    /// HEAD请求仅取响应头（调用方已持有HTML时使用）
    pub async fn fetch_headers(&self, url: &str) -> RbwResult<HashMap<String, String>> {
        let target = Url::parse(url)?;
        let response = self.client.head(target).send().await?;
        Ok(HeaderConverter::from_header_map(response.headers()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use crate::error::RsbuiltwithError;

    #[tokio::test]
    async fn test_invalid_url_is_fetch_side_error() {
        // 测试场景：非法URL在抓取侧报错，由检测层降级处理
        let fetcher = PageFetcher::new(&ConfigManager::get_default()).unwrap();
        let result = fetcher.fetch("not a url").await;
        assert!(matches!(result, Err(RsbuiltwithError::UrlError(_))));
    }
}
