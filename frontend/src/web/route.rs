//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、路径以及允许访问的角色。

use std::fmt::Display;

use helpdesk::shared::Role;
use helpdesk::shared::protocol::encode_component;
use helpdesk::{AuthStatus, Decision, RoleSet};
use percent_encoding::percent_decode_str;

const EVERYONE: RoleSet = RoleSet::ALL;
const APPROVERS: RoleSet = RoleSet::of(&[Role::Head, Role::It, Role::Admin]);
const IT_STAFF: RoleSet = RoleSet::of(&[Role::It, Role::Admin]);
const ADMINS: RoleSet = RoleSet::of(&[Role::Admin]);

/// 导航栏中出现的路由（按显示顺序）
const NAV_ROUTES: [AppRoute; 5] = [
    AppRoute::Dashboard,
    AppRoute::NewTicket,
    AppRoute::Approvals,
    AppRoute::Queue,
    AppRoute::Users,
];

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 登录页面 (默认路由)
    #[default]
    Login,
    /// 我提交的工单
    Dashboard,
    NewTicket,
    /// 工单详情，携带工单 id
    TicketDetail(String),
    /// 待我审批
    Approvals,
    /// IT 处理队列
    Queue,
    /// 用户管理
    Users,
    ChangePassword,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" | "/login" => Self::Login,
            "/dashboard" => Self::Dashboard,
            "/tickets/new" => Self::NewTicket,
            "/approvals" => Self::Approvals,
            "/queue" => Self::Queue,
            "/admin/users" => Self::Users,
            "/account/password" => Self::ChangePassword,
            other => match other.strip_prefix("/tickets/") {
                Some(id) if !id.is_empty() && !id.contains('/') => {
                    let id = percent_decode_str(id).decode_utf8_lossy().into_owned();
                    Self::TicketDetail(id)
                }
                _ => Self::NotFound,
            },
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Login => "/".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::NewTicket => "/tickets/new".to_string(),
            Self::TicketDetail(id) => format!("/tickets/{}", encode_component(id)),
            Self::Approvals => "/approvals".to_string(),
            Self::Queue => "/queue".to_string(),
            Self::Users => "/admin/users".to_string(),
            Self::ChangePassword => "/account/password".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// 导航栏 / 页面标题
    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Dashboard => "My tickets",
            Self::NewTicket => "New ticket",
            Self::TicketDetail(_) => "Ticket",
            Self::Approvals => "Approvals",
            Self::Queue => "IT queue",
            Self::Users => "Users",
            Self::ChangePassword => "Change password",
            Self::NotFound => "Not found",
        }
    }

    /// **核心守卫配置：允许访问该路由的角色；`None` 表示公开页面**
    pub fn allowed_roles(&self) -> Option<RoleSet> {
        match self {
            Self::Login | Self::NotFound => None,
            Self::Dashboard | Self::NewTicket | Self::TicketDetail(_) | Self::ChangePassword => {
                Some(EVERYONE)
            }
            Self::Approvals => Some(APPROVERS),
            Self::Queue => Some(IT_STAFF),
            Self::Users => Some(ADMINS),
        }
    }

    /// 针对当前会话的访问决策
    pub fn access(&self, status: &AuthStatus) -> Decision {
        match self.allowed_roles() {
            None => Decision::Allow,
            Some(roles) => status.authorize(roles),
        }
    }

    /// 定义已认证用户是否应该离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login)
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从登录页）
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }

    /// 当前用户可见的导航链接
    pub fn nav_links(status: &AuthStatus) -> Vec<AppRoute> {
        NAV_ROUTES
            .into_iter()
            .filter(|route| route.access(status).is_allowed())
            .collect()
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}
