//! 新建工单页
//!
//! 工单类型切换会重新开始级联选择；提交前的全部校验在核心库中完成。

mod cascade_fields;
mod form_state;

use helpdesk::shared::{Priority, Role, TicketType, User};
use helpdesk::{CascadeLevel, ErrorKind, HelpdeskError, submit_ticket};
use leptos::prelude::*;
use leptos::task::spawn_local;

use self::cascade_fields::CascadeFields;
use self::form_state::FormState;
use crate::auth::use_auth;
use crate::components::toast::use_notifier;
use crate::web::route::AppRoute;
use crate::web::router::use_router;

#[component]
pub fn NewTicketPage() -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();
    let router = use_router();

    let state = FormState::new();
    let (submitting, set_submitting) = signal(false);
    let (colleagues, set_colleagues) = signal(Vec::<User>::new());
    let is_admin = move || auth.user().is_some_and(|u| u.role == Role::Admin);

    let on_error = Callback::new(move |e: HelpdeskError| {
        notifier.report(&auth, "Could not load options", &e);
    });
    let on_choose = Callback::new(move |(level, id): (CascadeLevel, String)| {
        state.choose(level, id, auth.api(), on_error);
    });
    let on_retry = Callback::new(move |level: CascadeLevel| {
        state.retry(level, auth.api(), on_error);
    });

    state.start(auth.api(), on_error);

    // 管理员可代他人提交
    if is_admin() {
        let api = auth.api();
        spawn_local(async move {
            match api.users().await {
                Ok(users) => set_colleagues.set(users),
                Err(e) => notifier.report(&auth, "Failed to load users", &e),
            }
        });
    }

    let on_type_change = move |ticket_type: TicketType| {
        if state.ticket_type.get_untracked() != ticket_type {
            state.ticket_type.set(ticket_type);
            state.start(auth.api(), on_error);
        }
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        set_submitting.set(true);

        let draft = state.to_draft();
        let cascade = state.cascade.get_untracked();
        let api = auth.api();
        spawn_local(async move {
            let result = submit_ticket(&api, draft, &cascade).await;
            set_submitting.set(false);
            match result {
                Ok(res) => {
                    notifier.success(format!("Ticket #{} created", res.ticket_no));
                    state.reset();
                    router.go(AppRoute::Dashboard);
                }
                Err(e) if e.kind() == ErrorKind::Validation => notifier.error(e.to_string()),
                Err(e) => notifier.report(&auth, "Failed to create ticket", &e),
            }
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <form class="card-body gap-4" on:submit=on_submit>
                <h3 class="card-title">"Raise a ticket"</h3>

                <div class="flex gap-6">
                    {[TicketType::Incident, TicketType::Service]
                        .into_iter()
                        .map(|ticket_type| view! {
                            <label class="label cursor-pointer gap-2">
                                <input
                                    type="radio"
                                    name="ticket-type"
                                    class="radio radio-primary"
                                    prop:checked=move || state.ticket_type.get() == ticket_type
                                    on:change=move |_| on_type_change(ticket_type)
                                />
                                <span class="label-text">{ticket_type.as_str()}</span>
                            </label>
                        })
                        .collect_view()}
                </div>
                <p class="text-sm text-base-content/60">
                    {move || if state.ticket_type.get().requires_approval() {
                        "Service requests need approval from your department head and the IT head."
                    } else {
                        "Incidents go straight to the IT queue."
                    }}
                </p>

                <CascadeFields state=state on_choose=on_choose on_retry=on_retry />

                <div class="form-control">
                    <label class="label" for="query">
                        <span class="label-text">"Describe the issue"</span>
                    </label>
                    <textarea
                        id="query"
                        required
                        rows="4"
                        class="textarea textarea-bordered w-full"
                        on:input=move |ev| state.query.set(event_target_value(&ev))
                        prop:value=move || state.query.get()
                    ></textarea>
                </div>

                <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                    <div class="form-control">
                        <label class="label" for="priority">
                            <span class="label-text">"Priority"</span>
                        </label>
                        <select
                            id="priority"
                            class="select select-bordered w-full"
                            on:change=move |ev| {
                                if let Some(p) = Priority::parse(&event_target_value(&ev)) {
                                    state.priority.set(p);
                                }
                            }
                        >
                            {Priority::ALL
                                .into_iter()
                                .map(|p| view! {
                                    <option value=p.as_str() selected=move || state.priority.get() == p>
                                        {p.as_str()}
                                    </option>
                                })
                                .collect_view()}
                        </select>
                    </div>
                    <div class="form-control">
                        <label class="label" for="attachment">
                            <span class="label-text">"Attachment reference (optional)"</span>
                        </label>
                        <input
                            id="attachment"
                            type="text"
                            class="input input-bordered w-full"
                            on:input=move |ev| state.attachment_id.set(event_target_value(&ev))
                            prop:value=move || state.attachment_id.get()
                        />
                    </div>
                </div>

                <Show when=is_admin>
                    <div class="form-control">
                        <label class="label" for="on-behalf-of">
                            <span class="label-text">"Raise on behalf of"</span>
                        </label>
                        <select
                            id="on-behalf-of"
                            class="select select-bordered w-full"
                            on:change=move |ev| state.on_behalf_of.set(event_target_value(&ev))
                        >
                            <option value="">"Myself"</option>
                            <For
                                each=move || colleagues.get()
                                key=|u| u.id.clone()
                                children=move |user| view! {
                                    <option value=user.id>{user.name} " <" {user.email} ">"</option>
                                }
                            />
                        </select>
                    </div>
                </Show>

                <div class="card-actions justify-end mt-2">
                    <button
                        type="submit"
                        class="btn btn-primary"
                        disabled=move || submitting.get() || state.any_loading()
                    >
                        {move || if submitting.get() {
                            view! { <span class="loading loading-spinner"></span> "Submitting..." }.into_any()
                        } else {
                            "Submit ticket".into_any()
                        }}
                    </button>
                </div>
            </form>
        </div>
    }
}
