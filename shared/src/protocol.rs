use crate::{CategoryNode, Priority, Ticket, TicketAction, TicketListView, TicketType, User};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest {
    /// JSON body sent with the request (`()` for body-less requests).
    type Body: Serialize;
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// Whether the bearer token must be attached.
    const AUTHENTICATED: bool = true;

    /// The URL path including any query string.
    fn path(&self) -> String;

    fn body(&self) -> Option<&Self::Body> {
        None
    }
}

/// RFC 3986 unreserved characters stay literal, everything else is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a single path segment or query value.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, encode_component(v)))
        .collect::<Vec<_>>()
        .join("&");
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}

// =========================================================
// Dropdown catalog
// =========================================================

/// Level-1 options filtered by ticket type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOptionsRequest {
    pub ticket_type: TicketType,
}

impl ApiRequest for CategoryOptionsRequest {
    type Body = ();
    type Response = Vec<CategoryNode>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        with_query("/tickets/drop/category", &[("type", self.ticket_type.as_str())])
    }
}

/// Subcategories under one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubCategoryOptionsRequest {
    pub category_id: String,
}

impl ApiRequest for SubCategoryOptionsRequest {
    type Body = ();
    type Response = Vec<CategoryNode>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        with_query("/tickets/drop/sub-category", &[("id", &self.category_id)])
    }
}

/// Items under one subcategory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOptionsRequest {
    pub subcategory_id: String,
}

impl ApiRequest for ItemOptionsRequest {
    type Body = ();
    type Response = Vec<CategoryNode>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        with_query("/tickets/drop/item", &[("id", &self.subcategory_id)])
    }
}

// =========================================================
// Tickets
// =========================================================

/// Create a ticket. Category fields carry labels, not ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub query: String,
    pub priority: Priority,
    pub category: String,
    pub sub_category: String,
    pub item: String,
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_id: Option<String>,
    /// Raise on behalf of another user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketResponse {
    #[serde(deserialize_with = "crate::id::deserialize")]
    pub ticket_no: String,
}

impl ApiRequest for CreateTicketRequest {
    type Body = Self;
    type Response = CreateTicketResponse;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/tickets/create".to_string()
    }

    fn body(&self) -> Option<&Self> {
        Some(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetTicketRequest {
    pub ticket_id: String,
}

impl ApiRequest for GetTicketRequest {
    type Body = ();
    type Response = Ticket;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/tickets/{}", encode_component(&self.ticket_id))
    }
}

/// Approve / reject / resolve a ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketActionRequest {
    #[serde(skip)]
    pub ticket_id: String,
    pub action: TicketAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl ApiRequest for TicketActionRequest {
    type Body = Self;
    /// 成功时响应体内容不重要，任意 JSON（或空体）都视为成功
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("/tickets/{}", encode_component(&self.ticket_id))
    }

    fn body(&self) -> Option<&Self> {
        Some(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTicketsRequest {
    pub view: TicketListView,
}

impl ApiRequest for ListTicketsRequest {
    type Body = ();
    type Response = Vec<Ticket>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        with_query("/tickets/list", &[("view", self.view.as_str())])
    }
}

// =========================================================
// Users
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUserRequest;

impl ApiRequest for CurrentUserRequest {
    type Body = ();
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/user/basic".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

impl ApiRequest for LoginRequest {
    type Body = Self;
    type Response = LoginResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const AUTHENTICATED: bool = false;

    fn path(&self) -> String {
        "/user/login".to_string()
    }

    fn body(&self) -> Option<&Self> {
        Some(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

impl ApiRequest for ChangePasswordRequest {
    type Body = Self;
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/user/change-password".to_string()
    }

    fn body(&self) -> Option<&Self> {
        Some(self)
    }
}

/// Admin: list every user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListUsersRequest;

impl ApiRequest for ListUsersRequest {
    type Body = ();
    type Response = Vec<User>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/user/all".to_string()
    }
}
