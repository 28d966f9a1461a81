//! 通用状态页：会话解析中、无权限、未找到

use leptos::prelude::*;

use crate::components::icons::ShieldAlert;
use crate::web::route::AppRoute;
use crate::web::router::Link;

#[component]
pub fn LoadingScreen() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center min-h-screen">
            <span class="loading loading-spinner loading-lg text-primary"></span>
        </div>
    }
}

#[component]
pub fn ForbiddenPage() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center py-24">
            <div class="text-center space-y-4">
                <ShieldAlert attr:class="h-16 w-16 mx-auto text-warning" />
                <h1 class="text-3xl font-bold">"Access denied"</h1>
                <p class="text-base-content/70">"Your role does not allow access to this page."</p>
                <Link route=AppRoute::Dashboard class="btn btn-primary">"Go to my tickets"</Link>
            </div>
        </div>
    }
}

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <div class="text-center">
                <h1 class="text-6xl font-bold text-error">"404"</h1>
                <p class="text-xl mt-4">"Page not found"</p>
                <Link route=AppRoute::Dashboard class="btn btn-ghost mt-6">"Back to the helpdesk"</Link>
            </div>
        </div>
    }
}
