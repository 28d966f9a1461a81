use futures::future::{self, Either};
use futures::pin_mut;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use crate::error::{HelpdeskError, HelpdeskResult};

pub use helpdesk_shared::protocol::HttpMethod;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// 通用 HTTP 请求结构
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
    /// 由传输层负责执行的超时
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 空响应体按 JSON `null` 处理，使 `()` 响应可以正常解析
    pub fn json<T: DeserializeOwned>(&self) -> HelpdeskResult<T> {
        let body = if self.body.trim().is_empty() {
            "null"
        } else {
            &self.body
        };
        serde_json::from_str(body).map_err(|e| HelpdeskError::Decode(e.to_string()))
    }
}

/// HTTP 客户端特性 (Trait)
/// 使用 async_trait 以支持异步调用，(?Send) 是因为浏览器环境下的 future 不是 Send 的
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> HelpdeskResult<HttpResponse>;
}

/// 让整个请求（包括读取响应体）与计时器竞争
///
/// 计时器先完成时返回 `HelpdeskError::Timeout`，调用方负责取消底层请求。
pub async fn race_timeout<F, T, D>(work: F, timer: D, timeout: Duration) -> HelpdeskResult<T>
where
    F: Future<Output = HelpdeskResult<T>>,
    D: Future<Output = ()>,
{
    pin_mut!(work, timer);
    match future::select(work, timer).await {
        Either::Left((res, _)) => res,
        Either::Right(_) => Err(HelpdeskError::Timeout(timeout)),
    }
}

// =========================================================
// 测试替身 (Test Double)
// =========================================================

#[cfg(test)]
pub use mock::MockHttpClient;
