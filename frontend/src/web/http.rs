//! HTTP 传输层
//!
//! 使用 `web_sys::fetch` 实现核心库的 `HttpClient`。
//! 整个请求（含读取响应体）与 `TimeoutFuture` 竞争，超时后用 `AbortController` 取消请求。

use gloo_timers::future::TimeoutFuture;
use helpdesk::{HelpdeskError, HelpdeskResult, HttpClient, HttpRequest, HttpResponse, race_timeout};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Headers, Request, RequestInit, Response};

/// 浏览器 fetch 客户端
#[derive(Debug, Clone, Copy, Default)]
pub struct WebHttpClient;

fn js_error(context: &str, err: JsValue) -> HelpdeskError {
    let detail = err.as_string().unwrap_or_else(|| format!("{:?}", err));
    HelpdeskError::Transport(format!("{}: {}", context, detail))
}

impl WebHttpClient {
    fn build_request(req: &HttpRequest, controller: &AbortController) -> HelpdeskResult<Request> {
        let headers = Headers::new().map_err(|e| js_error("创建 Headers 失败", e))?;
        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| js_error("设置 Header 失败", e))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());
        opts.set_signal(Some(&controller.signal()));

        if let Some(body) = &req.body {
            opts.set_body(&JsValue::from_str(body));
        }

        Request::new_with_str_and_init(&req.url, &opts).map_err(|e| js_error("请求构建失败", e))
    }

    async fn read_body(response: &Response) -> HelpdeskResult<String> {
        let promise = response.text().map_err(|e| js_error("读取响应失败", e))?;
        let text = JsFuture::from(promise)
            .await
            .map_err(|e| js_error("读取响应失败", e))?;
        Ok(text.as_string().unwrap_or_default())
    }
}

#[async_trait::async_trait(?Send)]
impl HttpClient for WebHttpClient {
    async fn send(&self, req: HttpRequest) -> HelpdeskResult<HttpResponse> {
        let controller = AbortController::new().map_err(|e| js_error("创建 AbortController 失败", e))?;
        let request = Self::build_request(&req, &controller)?;

        let window = web_sys::window()
            .ok_or_else(|| HelpdeskError::Transport("无法获取 window 对象".to_string()))?;

        let exchange = async {
            let resp_value = JsFuture::from(window.fetch_with_request(&request))
                .await
                .map_err(|e| js_error("网络错误", e))?;
            let response: Response = resp_value
                .dyn_into()
                .map_err(|e| js_error("Response 类型转换失败", e))?;
            let status = response.status();
            let body = Self::read_body(&response).await?;
            Ok::<_, HelpdeskError>(HttpResponse { status, body })
        };

        let result = match req.timeout {
            Some(timeout) => {
                let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
                race_timeout(exchange, TimeoutFuture::new(millis), timeout).await
            }
            None => exchange.await,
        };

        match &result {
            Ok(resp) => log::debug!("[Http] {} {} -> {}", req.method.as_str(), req.url, resp.status),
            Err(HelpdeskError::Timeout(_)) => {
                controller.abort();
                log::warn!("[Http] {} {} timed out", req.method.as_str(), req.url);
            }
            Err(_) => {}
        }
        result
    }
}
