//! 路由访问控制
//!
//! 纯函数：输入当前用户与允许的角色集合，输出放行 / 拒绝决策。
//! 重定向等副作用由路由服务负责，这里从不导航。

use std::fmt;

use helpdesk_shared::{Role, User};

use crate::auth::AuthStatus;

/// 角色集合（位集合，可在 const 上下文中构造）
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const EMPTY: RoleSet = RoleSet(0);
    pub const ALL: RoleSet = RoleSet::of(&Role::ALL);

    const fn bit(role: Role) -> u8 {
        match role {
            Role::Admin => 1 << 0,
            Role::It => 1 << 1,
            Role::Head => 1 << 2,
            Role::Employee => 1 << 3,
        }
    }

    pub const fn of(roles: &[Role]) -> RoleSet {
        let mut set = RoleSet::EMPTY;
        let mut i = 0;
        while i < roles.len() {
            set = set.with(roles[i]);
            i += 1;
        }
        set
    }

    pub const fn with(self, role: Role) -> RoleSet {
        RoleSet(self.0 | Self::bit(role))
    }

    pub const fn contains(self, role: Role) -> bool {
        self.0 & Self::bit(role) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |r| self.contains(*r))
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        iter.into_iter().fold(RoleSet::EMPTY, RoleSet::with)
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// 访问决策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// 未登录（或会话无效）
    DenyUnauthenticated,
    /// 已登录但角色不在允许列表中
    DenyForbidden,
    /// 会话仍在解析中，视图应显示中性的加载状态
    Pending,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// 核心守卫逻辑
pub fn authorize(user: Option<&User>, allowed: RoleSet) -> Decision {
    match user {
        None => Decision::DenyUnauthenticated,
        Some(user) if !allowed.contains(user.role) => Decision::DenyForbidden,
        Some(_) => Decision::Allow,
    }
}

impl AuthStatus {
    /// 基于会话状态做决策；解析中返回 `Pending`
    pub fn authorize(&self, allowed: RoleSet) -> Decision {
        match self {
            AuthStatus::Pending => Decision::Pending,
            other => authorize(other.user(), allowed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: "u1".into(),
            name: "Test User".into(),
            email: "test@corp.example".into(),
            contact: String::new(),
            department: "IT".into(),
            reporting_to: None,
            role,
        }
    }

    #[test]
    fn test_no_user_is_unauthenticated_for_any_roles() {
        for allowed in [RoleSet::EMPTY, RoleSet::ALL, RoleSet::of(&[Role::Admin])] {
            assert_eq!(authorize(None, allowed), Decision::DenyUnauthenticated);
        }
    }

    #[test]
    fn test_role_outside_allow_list_is_forbidden() {
        let employee = user(Role::Employee);
        assert_eq!(
            authorize(Some(&employee), RoleSet::of(&[Role::Admin])),
            Decision::DenyForbidden
        );
    }

    #[test]
    fn test_role_inside_allow_list_is_allowed() {
        let admin = user(Role::Admin);
        assert_eq!(
            authorize(Some(&admin), RoleSet::of(&[Role::Admin, Role::It])),
            Decision::Allow
        );
    }

    #[test]
    fn test_pending_session_yields_pending() {
        assert_eq!(AuthStatus::Pending.authorize(RoleSet::ALL), Decision::Pending);
        assert_eq!(
            AuthStatus::Anonymous.authorize(RoleSet::ALL),
            Decision::DenyUnauthenticated
        );
        assert_eq!(
            AuthStatus::Authenticated(user(Role::Head)).authorize(RoleSet::of(&[Role::Head])),
            Decision::Allow
        );
    }

    #[test]
    fn test_role_set_operations() {
        const STAFF: RoleSet = RoleSet::EMPTY.with(Role::It).with(Role::Admin);
        assert!(STAFF.contains(Role::It));
        assert!(!STAFF.contains(Role::Employee));
        assert_eq!(STAFF, [Role::Admin, Role::It].into_iter().collect());
        assert_eq!(RoleSet::ALL.iter().count(), 4);
        assert!(RoleSet::EMPTY.is_empty());
        assert_eq!(format!("{:?}", STAFF), "{Admin, It}");
    }
}
