//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 验证 -> 处理 -> 加载"的导航流程。
//!
//! 访问决策来自 `AppRoute::access`；路由服务只负责执行重定向。

use helpdesk::{AuthStatus, Decision};
use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::AppRoute;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

fn write_history(path: &str, use_push: bool) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return;
    };
    let result = if use_push {
        history.push_state_with_url(&JsValue::NULL, "", Some(path))
    } else {
        history.replace_state_with_url(&JsValue::NULL, "", Some(path))
    };
    if result.is_err() {
        log::warn!("[Router] failed to update history for {}", path);
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 通过注入会话状态信号实现与认证系统的解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    /// 因未登录被拦截的目标，登录后返回
    return_to: RwSignal<Option<AppRoute>>,
    /// 会话状态（注入的信号，实现解耦）
    auth: Signal<AuthStatus>,
}

impl RouterService {
    fn new(auth: Signal<AuthStatus>) -> Self {
        let initial_route = AppRoute::from_path(&current_path());
        let (current_route, set_route) = signal(initial_route);

        Self {
            current_route,
            set_route,
            return_to: RwSignal::new(None),
            auth,
        }
    }

    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// 当前路由针对当前会话的访问决策（响应式）
    pub fn decision(&self) -> Decision {
        let status = self.auth.get();
        self.current_route.with(|route| route.access(&status))
    }

    /// **核心方法：导航与守卫**
    ///
    /// 流程：请求 -> 验证(Guard) -> 处理 -> 加载
    pub fn navigate(&self, path: &str) {
        self.go(AppRoute::from_path(path));
    }

    pub fn go(&self, route: AppRoute) {
        self.navigate_to_route(route, true);
    }

    /// 守卫：决定目标路由实际应落在哪里
    ///
    /// 只处理需要跳转的情况；`Pending` 与 `DenyForbidden` 原样放行，
    /// 由出口组件渲染加载 / 无权限视图。
    fn guard(&self, target: AppRoute) -> AppRoute {
        let status = self.auth.get_untracked();
        match target.access(&status) {
            Decision::DenyUnauthenticated => {
                log::info!("[Router] {} requires sign-in, redirecting to login", target);
                self.return_to.set(Some(target));
                AppRoute::auth_failure_redirect()
            }
            _ if status.is_authenticated() && target.should_redirect_when_authenticated() => {
                self.return_to
                    .try_update(Option::take)
                    .flatten()
                    .unwrap_or_else(AppRoute::auth_success_redirect)
            }
            _ => target,
        }
    }

    /// 导航到指定路由
    ///
    /// `use_push` 为 true 时使用 pushState，否则使用 replaceState。
    fn navigate_to_route(&self, target: AppRoute, use_push: bool) {
        let route = self.guard(target);
        write_history(&route.to_path(), use_push);
        self.set_route.set(route);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let router = *self;

        let closure = Closure::<dyn Fn()>::new(move || {
            let target = AppRoute::from_path(&current_path());
            // popstate 时也执行守卫逻辑，地址栏已经变化，只能替换
            router.navigate_to_route(target, false);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 会话状态变化时重新评估当前路由
    ///
    /// 覆盖启动时的会话解析完成、登录、注销以及会话过期。
    fn setup_auth_redirect(&self) {
        let router = *self;

        Effect::new(move |_| {
            let status = router.auth.get();
            if status.is_pending() {
                return;
            }
            let route = router.current_route.get_untracked();
            let needs_redirect = matches!(route.access(&status), Decision::DenyUnauthenticated)
                || (status.is_authenticated() && route.should_redirect_when_authenticated());
            if needs_redirect {
                log::info!("[Router] session changed, leaving {}", route);
                router.navigate_to_route(route, false);
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(auth: Signal<AuthStatus>) -> RouterService {
    let router = RouterService::new(auth);

    router.init_popstate_listener();
    router.setup_auth_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 会话状态信号
    auth: Signal<AuthStatus>,
    children: Children,
) -> impl IntoView {
    provide_router(auth);

    children()
}

/// 路由出口组件
///
/// 根据当前路由与访问决策渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由及其访问决策，返回对应视图
    matcher: fn(AppRoute, Decision) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let decision = router.decision();
        let current = router.current_route().get();
        matcher(current, decision)
    }
}

/// 站内链接：拦截点击并通过路由服务导航
#[component]
pub fn Link(
    route: AppRoute,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();
    let href = route.to_path();

    let on_click = move |ev: web_sys::MouseEvent| {
        if ev.ctrl_key() || ev.meta_key() || ev.shift_key() {
            return;
        }
        ev.prevent_default();
        router.go(route.clone());
    };

    view! {
        <a href=href class=class on:click=on_click>
            {children()}
        </a>
    }
}
