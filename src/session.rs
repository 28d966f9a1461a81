//! 会话存储
//!
//! 只持久化一个不透明的 bearer token。浏览器端实现基于 `localStorage`，
//! 这里提供抽象接口与内存实现（测试及非浏览器环境使用）。

use std::cell::RefCell;
use std::rc::Rc;

/// 会话令牌存储接口
pub trait SessionStore {
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: &str);
    fn clear(&self);
}

/// 内存中的会话存储，克隆后共享同一份令牌
#[derive(Clone, Default, Debug)]
pub struct MemorySessionStore {
    token: Rc<RefCell<Option<String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        store.set_token(token);
        store
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    fn set_token(&self, token: &str) {
        *self.token.borrow_mut() = Some(token.to_string());
    }

    fn clear(&self) {
        self.token.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_token() {
        let store = MemorySessionStore::new();
        let other = store.clone();
        store.set_token("abc");
        assert_eq!(other.token().as_deref(), Some("abc"));
        other.clear();
        assert_eq!(store.token(), None);
    }
}
