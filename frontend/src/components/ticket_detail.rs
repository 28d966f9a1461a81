//! 工单详情与审批面板

use helpdesk::shared::{Ticket, TicketAction};
use helpdesk::{ActionForm, ErrorKind, TicketStage, available_actions};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::components::ticket_table::{priority_badge, stage_badge};
use crate::components::toast::use_notifier;
use crate::web::route::AppRoute;
use crate::web::router::Link;

fn action_label(action: TicketAction) -> &'static str {
    match action {
        TicketAction::Approve => "Approve",
        TicketAction::Reject => "Reject",
        TicketAction::Resolve => "Mark resolved",
    }
}

fn action_button(action: TicketAction) -> &'static str {
    match action {
        TicketAction::Approve | TicketAction::Resolve => "btn btn-success",
        TicketAction::Reject => "btn btn-error btn-outline",
    }
}

fn past_tense(action: TicketAction) -> &'static str {
    match action {
        TicketAction::Approve => "approved",
        TicketAction::Reject => "rejected",
        TicketAction::Resolve => "resolved",
    }
}

fn stamp(value: Option<chrono::DateTime<chrono::Utc>>) -> String {
    value
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[component]
pub fn TicketDetailPage(ticket_id: String) -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();

    let (ticket, set_ticket) = signal(Option::<Ticket>::None);
    let (loading, set_loading) = signal(true);
    let id = StoredValue::new(ticket_id);

    let load_ticket = move || {
        set_loading.set(true);
        let api = auth.api();
        let id = id.get_value();
        spawn_local(async move {
            match api.ticket(&id).await {
                Ok(t) => set_ticket.set(Some(t)),
                Err(e) => notifier.report(&auth, "Failed to load ticket", &e),
            }
            set_loading.set(false);
        });
    };

    load_ticket();

    let on_done = Callback::new(move |()| load_ticket());

    view! {
        <div class="space-y-6">
            <Link route=AppRoute::Dashboard class="btn btn-ghost btn-sm">"← Back to my tickets"</Link>
            {move || match ticket.get() {
                None if loading.get() => view! {
                    <div class="flex justify-center py-16">
                        <span class="loading loading-spinner loading-lg text-primary"></span>
                    </div>
                }
                .into_any(),
                None => view! {
                    <div class="alert">"This ticket could not be loaded."</div>
                }
                .into_any(),
                Some(t) => view! { <TicketCard ticket=t on_done=on_done /> }.into_any(),
            }}
        </div>
    }
}

#[component]
fn TicketCard(ticket: Ticket, on_done: Callback<()>) -> impl IntoView {
    let auth = use_auth();
    let stage = TicketStage::of(&ticket);
    let actions = auth
        .user()
        .map(|user| available_actions(&ticket, &user))
        .unwrap_or_default();

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <div class="flex flex-wrap items-center justify-between gap-2">
                    <h2 class="card-title">
                        "Ticket #" {ticket.sequence_no}
                        <span class="badge badge-neutral">{ticket.ticket_type.as_str()}</span>
                    </h2>
                    <div class="flex gap-2">
                        <span class=priority_badge(ticket.priority)>{ticket.priority.as_str()}</span>
                        <span class=stage_badge(stage)>{stage.label()}</span>
                    </div>
                </div>

                <div class="text-sm opacity-70">
                    {ticket.category.clone()} " / " {ticket.sub_category.clone()} " / " {ticket.item.clone()}
                </div>
                <p class="whitespace-pre-wrap py-2">{ticket.query.clone()}</p>

                <div class="overflow-x-auto">
                    <table class="table table-sm">
                        <tbody>
                            <tr><th>"Raised"</th><td>{stamp(Some(ticket.created_at))}</td></tr>
                            <tr><th>"Attachment"</th><td>{ticket.attachment_id.clone().unwrap_or_else(|| "-".to_string())}</td></tr>
                            <tr><th>"Manager approved"</th><td>{stamp(ticket.head_approved_at)}</td></tr>
                            <tr><th>"Manager rejected"</th><td>{stamp(ticket.head_rejected_at)}</td></tr>
                            <tr><th>"IT head approved"</th><td>{stamp(ticket.it_head_approved_at)}</td></tr>
                            <tr><th>"IT head rejected"</th><td>{stamp(ticket.it_head_rejected_at)}</td></tr>
                            <tr><th>"Resolved"</th><td>{stamp(ticket.resolved_at)}</td></tr>
                        </tbody>
                    </table>
                </div>

                {ticket.remark.clone().map(|remark| view! {
                    <div class="alert">
                        <span class="font-bold">"Remark: "</span>
                        <span>{remark}</span>
                    </div>
                })}

                {(!actions.is_empty()).then(|| view! {
                    <ActionPanel ticket_id=ticket.id.clone() actions=actions on_done=on_done />
                })}
            </div>
        </div>
    }
}

/// 审批 / 处理面板
#[component]
fn ActionPanel(ticket_id: String, actions: Vec<TicketAction>, on_done: Callback<()>) -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();

    let (remark, set_remark) = signal(String::new());
    let (busy, set_busy) = signal(false);
    let ticket_id = StoredValue::new(ticket_id);

    let run_action = move |action: TicketAction| {
        if busy.get_untracked() {
            return;
        }
        let form = ActionForm {
            action,
            remark: remark.get_untracked(),
        };
        let req = match form.into_request(&ticket_id.get_value()) {
            Ok(req) => req,
            Err(e) => {
                notifier.error(e.to_string());
                return;
            }
        };

        set_busy.set(true);
        let api = auth.api();
        spawn_local(async move {
            match api.act_on_ticket(&req).await {
                Ok(()) => {
                    notifier.success(format!("Ticket {}", past_tense(action)));
                    set_remark.set(String::new());
                    on_done.run(());
                }
                Err(e) if e.kind() == ErrorKind::Validation => notifier.error(e.to_string()),
                Err(e) => notifier.report(&auth, "Action failed", &e),
            }
            set_busy.set(false);
        });
    };

    view! {
        <div class="divider">"Actions"</div>
        <div class="form-control">
            <label class="label" for="remark">
                <span class="label-text">"Remark"</span>
                <span class="label-text-alt">"Required to reject or resolve"</span>
            </label>
            <textarea
                id="remark"
                rows="3"
                class="textarea textarea-bordered w-full"
                on:input=move |ev| set_remark.set(event_target_value(&ev))
                prop:value=remark
            ></textarea>
        </div>
        <div class="card-actions justify-end mt-2">
            {actions
                .into_iter()
                .map(|action| view! {
                    <button
                        class=action_button(action)
                        disabled=move || busy.get()
                        on:click=move |_| run_action(action)
                    >
                        {action_label(action)}
                    </button>
                })
                .collect_view()}
        </div>
    }
}
