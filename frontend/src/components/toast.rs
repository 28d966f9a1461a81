//! 全局通知提示
//!
//! 任意组件通过 `use_notifier()` 发出提示，3 秒后自动消失。

use std::time::Duration;

use helpdesk::HelpdeskError;
use leptos::prelude::*;

use crate::auth::AuthContext;

const DISMISS_AFTER: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub is_error: bool,
    /// 用于判断定时器触发时提示是否已被替换
    seq: u64,
}

#[derive(Clone, Copy)]
pub struct Notifier {
    current: RwSignal<Option<Notification>>,
    counter: StoredValue<u64>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            current: RwSignal::new(None),
            counter: StoredValue::new(0),
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message.into(), false);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("[Toast] {}", message);
        self.show(message, true);
    }

    /// 请求失败的统一处理：401 使会话过期，其余错误带上下文提示
    pub fn report(&self, auth: &AuthContext, context: &str, err: &HelpdeskError) {
        if auth.handle_error(err) {
            self.error("Your session has expired. Please sign in again.");
        } else {
            self.error(format!("{}: {}", context, err));
        }
    }

    fn show(&self, message: String, is_error: bool) {
        self.counter.update_value(|c| *c += 1);
        let seq = self.counter.get_value();
        self.current.set(Some(Notification {
            message,
            is_error,
            seq,
        }));

        let current = self.current;
        set_timeout(
            move || {
                if current.with_untracked(|n| n.as_ref().is_some_and(|n| n.seq == seq)) {
                    current.set(None);
                }
            },
            DISMISS_AFTER,
        );
    }
}

pub fn use_notifier() -> Notifier {
    use_context::<Notifier>().expect("Notifier should be provided")
}

#[component]
pub fn Toast() -> impl IntoView {
    let notifier = use_notifier();
    let current = notifier.current;

    move || {
        current.get().map(|n| {
            let class = if n.is_error {
                "alert alert-error shadow-lg"
            } else {
                "alert alert-success shadow-lg"
            };
            view! {
                <div class="toast toast-top toast-end z-50">
                    <div class=class>
                        <span>{n.message}</span>
                    </div>
                </div>
            }
        })
    }
}
