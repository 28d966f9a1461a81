//! 工单系统客户端核心
//!
//! 与平台无关的部分，浏览器前端与测试共用：
//! - `request` / `api`: HTTP 抽象与类型化 REST 客户端
//! - `session` / `auth`: 令牌存储与会话解析
//! - `cascade`: 分类 → 子分类 → 条目 级联选择
//! - `access`: 基于角色的路由访问控制
//! - `ticket` / `workflow`: 工单提交与审批流程

pub mod access;
pub mod api;
pub mod auth;
pub mod cascade;
pub mod config;
pub mod error;
pub mod request;
pub mod session;
pub mod ticket;
pub mod workflow;

pub use helpdesk_shared as shared;

pub use access::{Decision, RoleSet, authorize};
pub use api::HelpdeskApi;
pub use auth::{AuthStatus, PasswordChange, SessionResolver};
pub use cascade::{
    CascadeLevel, CascadeState, CatalogSource, FetchRequest, LevelStatus, LoadingFlags,
    SelectionLabels, SelectionResolver,
};
pub use config::ClientConfig;
pub use error::{ErrorKind, HelpdeskError, HelpdeskResult};
pub use request::{HttpClient, HttpMethod, HttpRequest, HttpResponse, race_timeout};
pub use session::{MemorySessionStore, SessionStore};
pub use ticket::{TicketDraft, prepare_ticket, submit_ticket};
pub use workflow::{ActionForm, TicketStage, available_actions};
