use leptos::prelude::*;

use crate::components::navbar::Navbar;

/// 已登录页面的外壳：导航栏 + 内容区
#[component]
pub fn Shell(children: Children) -> impl IntoView {
    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-7xl mx-auto space-y-8">
                <Navbar />
                {children()}
            </div>
        </div>
    }
}
