//! 认证模块
//!
//! 管理会话状态，与路由系统解耦。
//! 路由服务通过注入的会话状态信号来检查访问权限。

use std::sync::Arc;

use helpdesk::shared::User;
use helpdesk::{AuthStatus, ClientConfig, HelpdeskError, HelpdeskResult, PasswordChange};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{self, WebApi, WebResolver};

/// 认证上下文
///
/// 会话状态信号与解析器，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// 会话状态（只读）
    pub status: ReadSignal<AuthStatus>,
    set_status: WriteSignal<AuthStatus>,
    resolver: StoredValue<Arc<WebResolver>>,
}

impl AuthContext {
    pub fn new(config: ClientConfig) -> Self {
        let (status, set_status) = signal(AuthStatus::Pending);
        let resolver = StoredValue::new(Arc::new(WebResolver::new(api::client(config))));
        Self {
            status,
            set_status,
            resolver,
        }
    }

    /// 获取会话状态信号（用于路由服务注入）
    pub fn status_signal(&self) -> Signal<AuthStatus> {
        let status = self.status;
        Signal::derive(move || status.get())
    }

    /// 当前登录用户（响应式）
    pub fn user(&self) -> Option<User> {
        self.status.with(|s| s.user().cloned())
    }

    /// 供视图发起请求的 API 客户端
    pub fn api(&self) -> WebApi {
        self.resolver.with_value(|r| r.api().clone())
    }

    fn resolver(&self) -> Arc<WebResolver> {
        self.resolver.get_value()
    }

    /// 视图请求失败时调用：401 会使会话过期，路由随后自动跳转登录页
    ///
    /// 返回是否发生了过期。
    pub fn handle_error(&self, err: &HelpdeskError) -> bool {
        let expired = self.resolver().expire_if_unauthorized(err);
        if expired {
            self.set_status.set(AuthStatus::Anonymous);
        }
        expired
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 初始化会话状态
///
/// 用 LocalStorage 中的令牌换取用户资料；完成之前状态保持 `Pending`。
pub fn init_auth(ctx: &AuthContext) {
    let ctx = *ctx;
    spawn_local(async move {
        let status = ctx.resolver().resolve().await;
        ctx.set_status.set(status);
    });
}

/// 登录并保存令牌
pub async fn login(ctx: &AuthContext, email: String, password: String) -> HelpdeskResult<User> {
    let user = ctx.resolver().login(&email, &password).await?;
    ctx.set_status.set(AuthStatus::Authenticated(user.clone()));
    Ok(user)
}

/// 注销并清除令牌
///
/// 导航将由路由服务的会话状态监听自动处理。
pub fn logout(ctx: &AuthContext) {
    ctx.resolver().logout();
    ctx.set_status.set(AuthStatus::Anonymous);
}

pub async fn change_password(ctx: &AuthContext, change: PasswordChange) -> HelpdeskResult<()> {
    let result = ctx.resolver().change_password(&change).await;
    if let Err(e) = &result {
        ctx.handle_error(e);
    }
    result
}
