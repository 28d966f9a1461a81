use crate::auth::{logout, use_auth};
use crate::components::icons::{LifeBuoy, LogOut};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use leptos::prelude::*;

/// 顶部导航栏：只显示当前用户有权访问的链接
#[component]
pub fn Navbar() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();

    let links = move || AppRoute::nav_links(&auth.status.get());
    let is_active = move |route: &AppRoute| router.current_route().with(|current| current == route);

    view! {
        <div class="navbar bg-base-100 rounded-box shadow-xl">
            <div class="flex-1 gap-2">
                <LifeBuoy attr:class="text-primary h-6 w-6" />
                <Link route=AppRoute::Dashboard class="btn btn-ghost text-xl">"IT Helpdesk"</Link>
                <ul class="menu menu-horizontal px-1 hidden md:flex">
                    <For
                        each=links
                        key=|route| route.to_path()
                        children=move |route| {
                            let title = route.title();
                            let for_class = route.clone();
                            view! {
                                <li class=move || if is_active(&for_class) { "font-semibold text-primary" } else { "" }>
                                    <Link route=route>{title}</Link>
                                </li>
                            }
                        }
                    />
                </ul>
            </div>
            <div class="flex-none gap-2">
                {move || auth.user().map(|user| view! {
                    <div class="dropdown dropdown-end">
                        <div tabindex="0" role="button" class="btn btn-ghost gap-2">
                            <span>{user.name.clone()}</span>
                            <span class="badge badge-neutral">{user.role.label()}</span>
                        </div>
                        <ul tabindex="0" class="dropdown-content z-[1] menu p-2 shadow bg-base-200 rounded-box w-52">
                            <li class="menu-title">{user.email.clone()}</li>
                            <li>
                                <Link route=AppRoute::ChangePassword>"Change password"</Link>
                            </li>
                            <li>
                                <a on:click=move |_| logout(&auth) class="text-error hover:bg-error/10">
                                    <LogOut attr:class="mr-2 h-4 w-4" />
                                    "Sign out"
                                </a>
                            </li>
                        </ul>
                    </div>
                })}
            </div>
        </div>
    }
}
