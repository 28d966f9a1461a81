use crate::auth::{change_password, use_auth};
use crate::components::toast::use_notifier;
use helpdesk::auth::MIN_PASSWORD_LEN;
use helpdesk::{ErrorKind, PasswordChange};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn ChangePasswordPage() -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();

    let current = RwSignal::new(String::new());
    let new = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let (submitting, set_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let change = PasswordChange {
            current: current.get_untracked(),
            new: new.get_untracked(),
            confirm: confirm.get_untracked(),
        };
        // 先在本地校验，避免无效请求
        if let Err(e) = change.validate() {
            set_error_msg.set(Some(e.to_string()));
            return;
        }

        set_error_msg.set(None);
        set_submitting.set(true);
        spawn_local(async move {
            match change_password(&auth, change).await {
                Ok(()) => {
                    notifier.success("Password updated");
                    current.set(String::new());
                    new.set(String::new());
                    confirm.set(String::new());
                }
                Err(e) if e.kind() == ErrorKind::Validation || e.status_code() == Some(400) => {
                    set_error_msg.set(Some(e.to_string()));
                }
                Err(e) => notifier.report(&auth, "Failed to change password", &e),
            }
            set_submitting.set(false);
        });
    };

    let field = move |id: &'static str, label: &'static str, value: RwSignal<String>, autocomplete: &'static str| {
        view! {
            <div class="form-control">
                <label class="label" for=id>
                    <span class="label-text">{label}</span>
                </label>
                <input
                    id=id
                    type="password"
                    autocomplete=autocomplete
                    class="input input-bordered"
                    on:input=move |ev| value.set(event_target_value(&ev))
                    prop:value=move || value.get()
                    required
                />
            </div>
        }
    };

    view! {
        <div class="card bg-base-100 shadow-xl max-w-md mx-auto">
            <form class="card-body" on:submit=on_submit>
                <h3 class="card-title">"Change password"</h3>
                <p class="text-sm text-base-content/60">
                    {format!("Use at least {} characters.", MIN_PASSWORD_LEN)}
                </p>
                {move || error_msg.get().map(|msg| view! {
                    <div role="alert" class="alert alert-error text-sm py-2">
                        <span>{msg}</span>
                    </div>
                })}
                {field("current-password", "Current password", current, "current-password")}
                {field("new-password", "New password", new, "new-password")}
                {field("confirm-password", "Confirm new password", confirm, "new-password")}
                <div class="form-control mt-6">
                    <button class="btn btn-primary" disabled=move || submitting.get()>
                        {move || if submitting.get() {
                            view! { <span class="loading loading-spinner"></span> "Saving..." }.into_any()
                        } else {
                            "Update password".into_any()
                        }}
                    </button>
                </div>
            </form>
        </div>
    }
}
