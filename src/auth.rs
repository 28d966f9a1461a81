//! 认证会话解析
//!
//! 启动时用存储的令牌换取当前用户资料，作为“谁已登录”的唯一来源。
//! 同一令牌只解析一次；登录 / 注销（令牌变化）后才会重新解析。

use std::sync::{Mutex, PoisonError};

use helpdesk_shared::User;
use helpdesk_shared::protocol::ChangePasswordRequest;

use crate::api::HelpdeskApi;
use crate::error::{HelpdeskError, HelpdeskResult};
use crate::request::HttpClient;
use crate::session::SessionStore;

pub const MIN_PASSWORD_LEN: usize = 8;

/// 会话状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthStatus {
    /// 尚未完成解析
    #[default]
    Pending,
    Anonymous,
    Authenticated(User),
}

impl AuthStatus {
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthStatus::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthStatus::Authenticated(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, AuthStatus::Pending)
    }
}

/// 会话解析器
///
/// 缓存以“解析时使用的令牌”为键，令牌不变则直接返回缓存结果，不发起请求。
pub struct SessionResolver<C, S> {
    api: HelpdeskApi<C, S>,
    resolved: Mutex<Option<(Option<String>, AuthStatus)>>,
}

impl<C: HttpClient, S: SessionStore> SessionResolver<C, S> {
    pub fn new(api: HelpdeskApi<C, S>) -> Self {
        Self {
            api,
            resolved: Mutex::new(None),
        }
    }

    pub fn api(&self) -> &HelpdeskApi<C, S> {
        &self.api
    }

    /// 最近一次解析结果；从未解析或令牌已变化时为 `Pending`
    pub fn status(&self) -> AuthStatus {
        let token = self.api.session().token();
        self.cached_for(&token).unwrap_or_default()
    }

    pub async fn resolve(&self) -> AuthStatus {
        let token = self.api.session().token();
        if let Some(status) = self.cached_for(&token) {
            return status;
        }

        let status = match token {
            None => AuthStatus::Anonymous,
            Some(_) => match self.api.current_user().await {
                Ok(user) => {
                    log::info!("[Auth] session resolved for {} ({})", user.email, user.role);
                    AuthStatus::Authenticated(user)
                }
                Err(HelpdeskError::Unauthorized) => {
                    log::info!("[Auth] stored token rejected, clearing session");
                    self.api.session().clear();
                    AuthStatus::Anonymous
                }
                Err(e) => {
                    // 暂时性故障：保留令牌
                    log::warn!("[Auth] could not resolve session: {}", e);
                    AuthStatus::Anonymous
                }
            },
        };

        self.remember(status.clone());
        status
    }

    /// 丢弃缓存，下一次 `resolve` 会重新请求
    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    /// 登录：换取令牌、保存并加载用户资料
    pub async fn login(&self, email: &str, password: &str) -> HelpdeskResult<User> {
        let email = email.trim();
        if email.is_empty() {
            return Err(HelpdeskError::invalid("email", "is required"));
        }
        if password.is_empty() {
            return Err(HelpdeskError::invalid("password", "is required"));
        }

        let res = self.api.login(email, password).await?;
        self.api.session().set_token(&res.token);

        match self.api.current_user().await {
            Ok(user) => {
                self.remember(AuthStatus::Authenticated(user.clone()));
                log::info!("[Auth] signed in as {}", user.email);
                Ok(user)
            }
            Err(e) => {
                if e.is_unauthorized() {
                    self.api.session().clear();
                }
                self.invalidate();
                Err(e)
            }
        }
    }

    pub fn logout(&self) {
        self.api.session().clear();
        self.remember(AuthStatus::Anonymous);
        log::info!("[Auth] signed out");
    }

    /// 任意接口返回 401 时调用：清除令牌并视为已注销
    ///
    /// 返回是否发生了过期处理。
    pub fn expire_if_unauthorized(&self, err: &HelpdeskError) -> bool {
        if !err.is_unauthorized() {
            return false;
        }
        log::warn!("[Auth] session expired mid-session");
        self.logout();
        true
    }

    /// 修改密码；不改变内存中的用户资料
    pub async fn change_password(&self, change: &PasswordChange) -> HelpdeskResult<()> {
        let req = change.validate()?;
        self.api.change_password(&req).await
    }

    fn cached_for(&self, token: &Option<String>) -> Option<AuthStatus> {
        self.lock()
            .as_ref()
            .filter(|(key, _)| key == token)
            .map(|(_, status)| status.clone())
    }

    fn remember(&self, status: AuthStatus) {
        let token = self.api.session().token();
        *self.lock() = Some((token, status));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<(Option<String>, AuthStatus)>> {
        self.resolved.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 修改密码表单
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordChange {
    pub current: String,
    pub new: String,
    pub confirm: String,
}

impl PasswordChange {
    pub fn validate(&self) -> HelpdeskResult<ChangePasswordRequest> {
        if self.current.is_empty() {
            return Err(HelpdeskError::invalid("current password", "is required"));
        }
        if self.new.chars().count() < MIN_PASSWORD_LEN {
            return Err(HelpdeskError::invalid(
                "new password",
                format!("must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        if self.new != self.confirm {
            return Err(HelpdeskError::invalid("confirm password", "does not match"));
        }
        if self.new == self.current {
            return Err(HelpdeskError::invalid(
                "new password",
                "must differ from the current one",
            ));
        }
        Ok(ChangePasswordRequest {
            old_password: self.current.clone(),
            new_password: self.new.clone(),
        })
    }
}
