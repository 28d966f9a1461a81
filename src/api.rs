use crate::cascade::{CascadeLevel, CatalogSource, FetchRequest};
use crate::config::ClientConfig;
use crate::error::{HelpdeskError, HelpdeskResult};
use crate::request::{HttpClient, HttpRequest};
use crate::session::SessionStore;
use helpdesk_shared::protocol::{
    ApiRequest, CategoryOptionsRequest, ChangePasswordRequest, CreateTicketRequest,
    CreateTicketResponse, CurrentUserRequest, GetTicketRequest, ItemOptionsRequest,
    ListTicketsRequest, ListUsersRequest, LoginRequest, LoginResponse, SubCategoryOptionsRequest,
    TicketActionRequest,
};
use helpdesk_shared::{
    BEARER_PREFIX, CategoryNode, HEADER_AUTHORIZATION, Ticket, TicketListView, TicketType, User,
};

// =========================================================
// REST 客户端
// =========================================================

/// 工单系统后端的类型化客户端
///
/// 每次请求时从 `SessionStore` 读取令牌并附加 `Authorization: Bearer`，
/// 因此登录 / 注销后无需重建客户端。
#[derive(Clone, Debug)]
pub struct HelpdeskApi<C, S> {
    config: ClientConfig,
    client: C,
    session: S,
}

impl<C: HttpClient, S: SessionStore> HelpdeskApi<C, S> {
    pub fn new(config: ClientConfig, client: C, session: S) -> Self {
        Self {
            config,
            client,
            session,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// 发送一个类型化请求
    ///
    /// 401 统一映射为 `HelpdeskError::Unauthorized`，其余非 2xx 为 `Status`。
    pub async fn send<R: ApiRequest>(&self, req: &R) -> HelpdeskResult<R::Response> {
        let path = req.path();
        let url = self.config.url(&path);
        let mut http = HttpRequest::new(&url, R::METHOD)
            .with_header("Accept", "application/json")
            .with_timeout(self.config.timeout);

        if R::AUTHENTICATED {
            if let Some(token) = self.session.token() {
                http = http.with_header(HEADER_AUTHORIZATION, &format!("{}{}", BEARER_PREFIX, token));
            }
        }

        if let Some(body) = req.body() {
            let json =
                serde_json::to_string(body).map_err(|e| HelpdeskError::Encode(e.to_string()))?;
            http = http
                .with_header("Content-Type", "application/json")
                .with_body(json);
        }

        let res = self.client.send(http).await.inspect_err(|e| {
            log::warn!("[Api] {} {} failed: {}", R::METHOD.as_str(), path, e);
        })?;

        if res.status == 401 {
            log::info!("[Api] {} {} rejected with 401", R::METHOD.as_str(), path);
            return Err(HelpdeskError::Unauthorized);
        }
        if !res.ok() {
            return Err(HelpdeskError::Status {
                status: res.status,
                message: error_message(&res.body),
            });
        }
        res.json::<R::Response>()
    }

    // --- 下拉数据 ---

    pub async fn categories(&self, ticket_type: TicketType) -> HelpdeskResult<Vec<CategoryNode>> {
        self.send(&CategoryOptionsRequest { ticket_type }).await
    }

    pub async fn sub_categories(&self, category_id: &str) -> HelpdeskResult<Vec<CategoryNode>> {
        self.send(&SubCategoryOptionsRequest {
            category_id: category_id.to_string(),
        })
        .await
    }

    pub async fn items(&self, subcategory_id: &str) -> HelpdeskResult<Vec<CategoryNode>> {
        self.send(&ItemOptionsRequest {
            subcategory_id: subcategory_id.to_string(),
        })
        .await
    }

    // --- 工单 ---

    pub async fn create_ticket(
        &self,
        req: &CreateTicketRequest,
    ) -> HelpdeskResult<CreateTicketResponse> {
        self.send(req).await
    }

    pub async fn ticket(&self, ticket_id: &str) -> HelpdeskResult<Ticket> {
        self.send(&GetTicketRequest {
            ticket_id: ticket_id.to_string(),
        })
        .await
    }

    pub async fn act_on_ticket(&self, req: &TicketActionRequest) -> HelpdeskResult<()> {
        self.send(req).await.map(|_| ())
    }

    pub async fn tickets(&self, view: TicketListView) -> HelpdeskResult<Vec<Ticket>> {
        self.send(&ListTicketsRequest { view }).await
    }

    // --- 用户 ---

    pub async fn current_user(&self) -> HelpdeskResult<User> {
        self.send(&CurrentUserRequest).await
    }

    pub async fn login(&self, email: &str, password: &str) -> HelpdeskResult<LoginResponse> {
        self.send(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await
    }

    pub async fn change_password(&self, req: &ChangePasswordRequest) -> HelpdeskResult<()> {
        self.send(req).await.map(|_| ())
    }

    pub async fn users(&self) -> HelpdeskResult<Vec<User>> {
        self.send(&ListUsersRequest).await
    }
}

#[async_trait::async_trait(?Send)]
impl<C: HttpClient, S: SessionStore> CatalogSource for HelpdeskApi<C, S> {
    async fn fetch_options(&self, request: &FetchRequest) -> HelpdeskResult<Vec<CategoryNode>> {
        match request.level {
            CascadeLevel::Category => self.categories(request.ticket_type).await,
            CascadeLevel::Subcategory => self.sub_categories(&request.parent_id).await,
            CascadeLevel::Item => self.items(&request.parent_id).await,
        }
    }
}

/// 从错误响应体中提取可读信息：优先 JSON 的 `message` / `error` 字段
fn error_message(body: &str) -> String {
    const MAX_LEN: usize = 200;

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    let text = body.trim();
    if text.is_empty() {
        "request failed".to_string()
    } else {
        text.chars().take(MAX_LEN).collect()
    }
}

// =========================================================
// 单元测试 (Unit Tests)
// =========================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{HttpMethod, MockHttpClient};
    use crate::session::MemorySessionStore;
    use helpdesk_shared::{Priority, TicketAction};
    use serde_json::json;

    const BASE: &str = "http://helpdesk.test";

    fn setup(token: Option<&str>) -> (MockHttpClient, HelpdeskApi<MockHttpClient, MemorySessionStore>) {
        let client = MockHttpClient::new();
        let session = token
            .map(MemorySessionStore::with_token)
            .unwrap_or_default();
        let api = HelpdeskApi::new(ClientConfig::new(BASE), client.clone(), session);
        (client, api)
    }

    #[tokio::test]
    async fn test_bearer_token_attached() {
        let (client, api) = setup(Some("tok-1"));
        client.mock_response(
            &format!("{}/tickets/drop/category?type=Incident", BASE),
            200,
            json!([{ "id": 1, "label": "Network" }]),
        );

        let categories = api.categories(TicketType::Incident).await.unwrap();
        assert_eq!(categories, vec![CategoryNode::new("1", "Network")]);

        let req = client.last_request().unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.header("Authorization"), Some("Bearer tok-1"));
        assert_eq!(req.timeout, Some(crate::config::DEFAULT_TIMEOUT));
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn test_login_sends_no_bearer() {
        let (client, api) = setup(Some("stale"));
        client.mock_response(&format!("{}/user/login", BASE), 200, json!({ "token": "fresh" }));

        let res = api.login("a@corp.example", "pw").await.unwrap();
        assert_eq!(res.token, "fresh");

        let req = client.last_request().unwrap();
        assert_eq!(req.header("Authorization"), None);
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({ "email": "a@corp.example", "password": "pw" }));
    }

    #[tokio::test]
    async fn test_401_maps_to_unauthorized() {
        let (client, api) = setup(Some("expired"));
        client.mock_response(&format!("{}/user/basic", BASE), 401, json!({ "message": "jwt expired" }));

        let err = api.current_user().await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_server_error_message_extracted() {
        let (client, api) = setup(Some("t"));
        client.mock_response(
            &format!("{}/tickets/create", BASE),
            422,
            json!({ "message": "query too short" }),
        );

        let req = CreateTicketRequest {
            query: "x".into(),
            priority: Priority::Low,
            category: "Network".into(),
            sub_category: "VPN".into(),
            item: "VPN not connecting".into(),
            ticket_type: TicketType::Incident,
            attachment_id: None,
            user_id: None,
        };
        let err = api.create_ticket(&req).await.unwrap_err();
        assert_eq!(
            err,
            HelpdeskError::Status {
                status: 422,
                message: "query too short".into()
            }
        );
    }

    #[tokio::test]
    async fn test_empty_body_decodes_as_unit() {
        let (client, api) = setup(Some("t"));
        client.push_raw(&format!("{}/tickets/55", BASE), 204, "");

        api.act_on_ticket(&TicketActionRequest {
            ticket_id: "55".into(),
            action: TicketAction::Resolve,
            remark: Some("Replaced cable".into()),
        })
        .await
        .unwrap();

        let req = client.last_request().unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({ "action": "resolve", "remark": "Replaced cable" }));
    }

    #[tokio::test]
    async fn test_action_accepts_json_acknowledgement() {
        let (client, api) = setup(Some("t"));
        client.mock_response(
            &format!("{}/tickets/55", BASE),
            200,
            json!({ "message": "Ticket approved" }),
        );

        api.act_on_ticket(&TicketActionRequest {
            ticket_id: "55".into(),
            action: TicketAction::Approve,
            remark: None,
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_change_password_accepts_json_acknowledgement() {
        let (client, api) = setup(Some("t"));
        client.mock_response(
            &format!("{}/user/change-password", BASE),
            200,
            json!({ "ok": true }),
        );

        api.change_password(&ChangePasswordRequest {
            old_password: "old-secret".into(),
            new_password: "new-secret".into(),
        })
        .await
        .unwrap();
        assert_eq!(client.request_count(), 1);
    }

    #[tokio::test]
    async fn test_users_lists_everyone_without_filter() {
        let (client, api) = setup(Some("t"));
        client.mock_response(
            &format!("{}/user/all", BASE),
            200,
            json!([{ "id": 7, "name": "Asha", "email": "asha@corp.example", "role": "head" }]),
        );

        let users = api.users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "7");

        let req = client.last_request().unwrap();
        assert_eq!(req.url, format!("{}/user/all", BASE));
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.body, None);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let (client, api) = setup(None);
        client.mock_error(
            &format!("{}/tickets/list?view=queue", BASE),
            HelpdeskError::Timeout(crate::config::DEFAULT_TIMEOUT),
        );

        let err = api.tickets(TicketListView::Queue).await.unwrap_err();
        assert!(matches!(err, HelpdeskError::Timeout(_)));
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(error_message(""), "request failed");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(r#"{"error":"nope"}"#), "nope");
    }
}
