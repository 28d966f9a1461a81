//! 工单系统前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义与访问角色（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `auth`: 会话状态管理
//! - `components`: UI 组件层

mod api;
mod auth;
mod components {
    pub mod change_password;
    mod icons;
    pub mod layout;
    pub mod login;
    mod navbar;
    pub mod new_ticket;
    pub mod status;
    pub mod ticket_detail;
    pub mod ticket_list;
    mod ticket_table;
    pub mod toast;
    pub mod users;
}

use helpdesk::shared::TicketListView;
use helpdesk::{ClientConfig, Decision};
use leptos::prelude::*;

use crate::auth::{AuthContext, init_auth};
use crate::components::change_password::ChangePasswordPage;
use crate::components::layout::Shell;
use crate::components::login::LoginPage;
use crate::components::new_ticket::NewTicketPage;
use crate::components::status::{ForbiddenPage, LoadingScreen, NotFoundPage};
use crate::components::ticket_detail::TicketDetailPage;
use crate::components::ticket_list::TicketListPage;
use crate::components::toast::{Notifier, Toast};
use crate::components::users::UsersPage;

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装（fetch / LocalStorage / console），
// 以减小 WASM 二进制体积。
pub(crate) mod web {
    mod http;
    pub mod logger;
    pub mod route;
    pub mod router;
    mod storage;

    pub use http::WebHttpClient;
    pub use storage::BrowserSession;
}

pub use web::logger::init as init_logger;

use web::route::AppRoute;
use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 与访问决策返回对应的视图组件。
fn route_matcher(route: AppRoute, decision: Decision) -> AnyView {
    match decision {
        Decision::Allow => {}
        // 未登录时路由服务正在重定向，解析中时等待
        Decision::Pending | Decision::DenyUnauthenticated => {
            return view! { <LoadingScreen /> }.into_any();
        }
        Decision::DenyForbidden => {
            return view! { <Shell><ForbiddenPage /></Shell> }.into_any();
        }
    }

    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::NotFound => view! { <NotFoundPage /> }.into_any(),
        AppRoute::Dashboard => view! {
            <Shell><TicketListPage list=TicketListView::Raised /></Shell>
        }
        .into_any(),
        AppRoute::NewTicket => view! { <Shell><NewTicketPage /></Shell> }.into_any(),
        AppRoute::TicketDetail(id) => view! {
            <Shell><TicketDetailPage ticket_id=id /></Shell>
        }
        .into_any(),
        AppRoute::Approvals => view! {
            <Shell><TicketListPage list=TicketListView::Approvals /></Shell>
        }
        .into_any(),
        AppRoute::Queue => view! {
            <Shell><TicketListPage list=TicketListView::Queue /></Shell>
        }
        .into_any(),
        AppRoute::Users => view! { <Shell><UsersPage /></Shell> }.into_any(),
        AppRoute::ChangePassword => view! { <Shell><ChangePasswordPage /></Shell> }.into_any(),
    }
}

#[component]
pub fn App(config: ClientConfig) -> impl IntoView {
    // 1. 创建认证上下文与全局通知
    let auth_ctx = AuthContext::new(config);
    provide_context(auth_ctx);
    provide_context(Notifier::new());

    // 2. 用存储的令牌解析会话（完成前受保护页面显示加载状态）
    init_auth(&auth_ctx);

    // 3. 获取会话状态信号，用于注入路由服务（解耦！）
    let auth = auth_ctx.status_signal();

    view! {
        <Toast />
        // 4. 路由器组件：注入会话信号实现守卫
        <Router auth=auth>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
