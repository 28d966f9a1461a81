//! 浏览器端 API 客户端装配
//!
//! 核心库的 `HelpdeskApi` 与浏览器的 fetch / LocalStorage 实现组合在一起。

use helpdesk::{ClientConfig, HelpdeskApi, SessionResolver};

use crate::web::{BrowserSession, WebHttpClient};

pub type WebApi = HelpdeskApi<WebHttpClient, BrowserSession>;
pub type WebResolver = SessionResolver<WebHttpClient, BrowserSession>;

/// 使用构建时配置创建 API 客户端
pub fn client(config: ClientConfig) -> WebApi {
    log::debug!("[Api] backend at {}", config.base_url);
    HelpdeskApi::new(config, WebHttpClient, BrowserSession)
}
