//! 客户端配置
//!
//! 后端地址与日志级别均在构建时注入（`option_env!`），浏览器端没有运行时环境变量。

use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;

/// 这些是默认值，如果构建时没有设置对应环境变量，则使用这些值
pub const DEFAULT_API_BASE: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// 会话令牌在持久化存储中的键
pub const TOKEN_STORAGE_KEY: &str = "token";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub log_level: LevelFilter,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }

    /// 读取构建时注入的 `HELPDESK_API_BASE` / `HELPDESK_LOG_LEVEL`
    pub fn from_build_env() -> Self {
        Self::from_values(option_env!("HELPDESK_API_BASE"), option_env!("HELPDESK_LOG_LEVEL"))
    }

    fn from_values(base: Option<&str>, level: Option<&str>) -> Self {
        let base = base.filter(|b| !b.trim().is_empty()).unwrap_or(DEFAULT_API_BASE);
        let log_level = level
            .and_then(|l| LevelFilter::from_str(l.trim()).ok())
            .unwrap_or(DEFAULT_LOG_LEVEL);
        Self {
            log_level,
            ..Self::new(base.trim())
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}
