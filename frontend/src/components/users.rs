use crate::auth::use_auth;
use crate::components::icons::RefreshCw;
use crate::components::toast::use_notifier;
use helpdesk::shared::User;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 用户管理（仅管理员）
#[component]
pub fn UsersPage() -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();

    let (users, set_users) = signal(Vec::<User>::new());
    let (loading, set_loading) = signal(true);

    let load_users = move || {
        set_loading.set(true);
        let api = auth.api();
        spawn_local(async move {
            match api.users().await {
                Ok(data) => set_users.set(data),
                Err(e) => notifier.report(&auth, "Failed to load users", &e),
            }
            set_loading.set(false);
        });
    };

    load_users();

    // id -> 姓名，用于显示汇报对象
    let manager_name = move |id: &str| {
        users.with(|list| {
            list.iter()
                .find(|u| u.id == id)
                .map(|u| u.name.clone())
                .unwrap_or_else(|| id.to_string())
        })
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <div class="flex items-center justify-between p-6 pb-2">
                    <div>
                        <h3 class="card-title">"Users"</h3>
                        <p class="text-base-content/70 text-sm">
                            {move || format!("{} accounts", users.with(Vec::len))}
                        </p>
                    </div>
                    <button
                        on:click=move |_| load_users()
                        disabled=move || loading.get()
                        class="btn btn-ghost btn-circle"
                    >
                        <RefreshCw attr:class=move || if loading.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                    </button>
                </div>

                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"Name"</th>
                                <th>"Role"</th>
                                <th class="hidden md:table-cell">"Department"</th>
                                <th class="hidden md:table-cell">"Contact"</th>
                                <th class="hidden md:table-cell">"Reports to"</th>
                            </tr>
                        </thead>
                        <tbody>
                            <For
                                each=move || users.get()
                                key=|u| u.id.clone()
                                children=move |user| {
                                    let reports_to = user.reporting_to.clone();
                                    view! {
                                        <tr>
                                            <td>
                                                <div class="font-bold">{user.name}</div>
                                                <div class="text-sm opacity-60">{user.email}</div>
                                            </td>
                                            <td><span class="badge badge-outline">{user.role.label()}</span></td>
                                            <td class="hidden md:table-cell">{user.department}</td>
                                            <td class="hidden md:table-cell">{user.contact}</td>
                                            <td class="hidden md:table-cell">
                                                {move || reports_to.as_deref().map(manager_name).unwrap_or_else(|| "-".to_string())}
                                            </td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                </div>
            </div>
        </div>
    }
}
