use crate::auth::use_auth;
use crate::components::icons::{Plus, RefreshCw};
use crate::components::ticket_table::TicketTable;
use crate::components::toast::use_notifier;
use crate::web::route::AppRoute;
use crate::web::router::Link;
use helpdesk::shared::{Ticket, TicketListView};
use leptos::prelude::*;
use leptos::task::spawn_local;

fn heading(list: TicketListView) -> (&'static str, &'static str, &'static str) {
    match list {
        TicketListView::Raised => (
            "My tickets",
            "Requests and incidents you have raised.",
            "You have not raised any tickets yet.",
        ),
        TicketListView::Approvals => (
            "Pending approvals",
            "Service requests waiting for your decision.",
            "Nothing is waiting for your approval.",
        ),
        TicketListView::Queue => (
            "IT queue",
            "Open tickets ready to be worked on.",
            "The queue is empty.",
        ),
        TicketListView::All => ("All tickets", "Every ticket in the system.", "No tickets found."),
    }
}

/// 工单列表页：按视角加载并展示工单
#[component]
pub fn TicketListPage(list: TicketListView) -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();
    let (title, subtitle, empty_message) = heading(list);

    let (tickets, set_tickets) = signal(Vec::<Ticket>::new());
    let (loading, set_loading) = signal(true);

    let load_tickets = move || {
        set_loading.set(true);
        let api = auth.api();
        spawn_local(async move {
            match api.tickets(list).await {
                Ok(data) => set_tickets.set(data),
                Err(e) => notifier.report(&auth, "Failed to load tickets", &e),
            }
            set_loading.set(false);
        });
    };

    // 初始加载
    load_tickets();

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <div class="flex items-center justify-between p-6 pb-2">
                    <div>
                        <h3 class="card-title">{title}</h3>
                        <p class="text-base-content/70 text-sm">{subtitle}</p>
                    </div>
                    <div class="flex gap-2">
                        <Show when=move || list == TicketListView::Raised>
                            <Link route=AppRoute::NewTicket class="btn btn-primary btn-sm gap-2">
                                <Plus attr:class="h-4 w-4" /> "New ticket"
                            </Link>
                        </Show>
                        <button
                            on:click=move |_| load_tickets()
                            disabled=move || loading.get()
                            class="btn btn-ghost btn-circle"
                        >
                            <RefreshCw attr:class=move || if loading.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                        </button>
                    </div>
                </div>

                <TicketTable tickets=tickets loading=loading empty_message=empty_message />
            </div>
        </div>
    }
}
