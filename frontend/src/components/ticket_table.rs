//! 工单列表表格
//!
//! 仪表盘、审批与处理队列共用。

use helpdesk::TicketStage;
use helpdesk::shared::{Priority, Ticket};
use leptos::prelude::*;

use crate::web::route::AppRoute;
use crate::web::router::Link;

pub fn stage_badge(stage: TicketStage) -> &'static str {
    match stage {
        TicketStage::AwaitingManager | TicketStage::AwaitingItHead => "badge badge-warning",
        TicketStage::Open => "badge badge-info",
        TicketStage::Rejected => "badge badge-error",
        TicketStage::Resolved => "badge badge-success",
    }
}

pub fn priority_badge(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "badge badge-ghost",
        Priority::Medium => "badge badge-accent badge-outline",
        Priority::High => "badge badge-error badge-outline",
    }
}

#[component]
pub fn TicketTable(
    tickets: ReadSignal<Vec<Ticket>>,
    loading: ReadSignal<bool>,
    /// 列表为空时的提示
    empty_message: &'static str,
) -> impl IntoView {
    let is_empty = move || tickets.with(Vec::is_empty);

    view! {
        <div class="overflow-x-auto w-full">
            <table class="table table-zebra w-full">
                <thead>
                    <tr>
                        <th>"#"</th>
                        <th>"Type"</th>
                        <th>"Issue"</th>
                        <th class="hidden md:table-cell">"Priority"</th>
                        <th>"Status"</th>
                        <th class="hidden md:table-cell">"Raised"</th>
                    </tr>
                </thead>
                <tbody>
                    <Show when=move || is_empty() && !loading.get()>
                        <tr>
                            <td colspan="6" class="text-center py-8 text-base-content/50">
                                {empty_message}
                            </td>
                        </tr>
                    </Show>
                    <Show when=move || is_empty() && loading.get()>
                        <tr>
                            <td colspan="6" class="text-center py-8 text-base-content/50">
                                <span class="loading loading-spinner loading-md"></span> " Loading..."
                            </td>
                        </tr>
                    </Show>
                    <For
                        each=move || tickets.get()
                        key=|t| t.id.clone()
                        children=move |ticket| {
                            let stage = TicketStage::of(&ticket);
                            let raised = ticket.created_at.format("%Y-%m-%d %H:%M").to_string();
                            view! {
                                <tr>
                                    <td class="font-mono">
                                        <Link route=AppRoute::TicketDetail(ticket.id.clone()) class="link link-primary">
                                            {ticket.sequence_no}
                                        </Link>
                                    </td>
                                    <td>{ticket.ticket_type.as_str()}</td>
                                    <td>
                                        <div class="font-bold">{ticket.item.clone()}</div>
                                        <div class="text-sm opacity-60">
                                            {ticket.category.clone()} " / " {ticket.sub_category.clone()}
                                        </div>
                                    </td>
                                    <td class="hidden md:table-cell">
                                        <span class=priority_badge(ticket.priority)>{ticket.priority.as_str()}</span>
                                    </td>
                                    <td>
                                        <span class=stage_badge(stage)>{stage.label()}</span>
                                    </td>
                                    <td class="hidden md:table-cell text-sm opacity-70">{raised}</td>
                                </tr>
                            }
                        }
                    />
                </tbody>
            </table>
        </div>
    }
}
