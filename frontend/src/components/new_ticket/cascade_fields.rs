//! 级联下拉框组件
//!
//! 分类 → 子分类 → 条目；某一级加载中或上级未选择时禁用。

use helpdesk::{CascadeLevel, CascadeState};
use leptos::prelude::*;

use super::form_state::FormState;

fn level_label(level: CascadeLevel) -> &'static str {
    match level {
        CascadeLevel::Category => "Category",
        CascadeLevel::Subcategory => "Sub-category",
        CascadeLevel::Item => "Item",
    }
}

#[component]
fn CascadeSelect(
    level: CascadeLevel,
    cascade: RwSignal<CascadeState>,
    on_choose: Callback<(CascadeLevel, String)>,
    on_retry: Callback<CascadeLevel>,
) -> impl IntoView {
    let id = format!("cascade-{}", level.as_str());
    let options = move || cascade.with(|c| c.options(level).to_vec());
    let selected = move || cascade.with(|c| c.selected(level).unwrap_or_default().to_string());
    let loading = move || cascade.with(|c| c.is_loading(level));
    let error = move || cascade.with(|c| c.error(level).map(str::to_string));
    let parent_missing = move || {
        level
            .parent()
            .is_some_and(|parent| cascade.with(|c| c.selected(parent).is_none()))
    };

    let placeholder = move || {
        if loading() {
            "Loading...".to_string()
        } else if let Some(parent) = level.parent().filter(|_| parent_missing()) {
            format!("Select a {} first", parent)
        } else {
            format!("Select {}", level_label(level).to_lowercase())
        }
    };

    view! {
        <div class="form-control">
            <label class="label" for=id.clone()>
                <span class="label-text">{level_label(level)}</span>
            </label>
            <select
                id=id
                required
                class="select select-bordered w-full"
                disabled=move || loading() || parent_missing()
                on:change=move |ev| on_choose.run((level, event_target_value(&ev)))
                prop:value=selected
            >
                <option value="" selected=move || selected().is_empty()>{placeholder}</option>
                <For
                    each=options
                    key=|node| node.id.clone()
                    children=move |node| {
                        let value = node.id.clone();
                        view! {
                            <option value=node.id selected=move || selected() == value>
                                {node.label}
                            </option>
                        }
                    }
                />
            </select>
            {move || error().map(|msg| view! {
                <label class="label">
                    <span class="label-text-alt text-error">{msg}</span>
                    <button type="button" class="btn btn-link btn-xs" on:click=move |_| on_retry.run(level)>
                        "Retry"
                    </button>
                </label>
            })}
        </div>
    }
}

/// 三级级联选择
#[component]
pub fn CascadeFields(
    state: FormState,
    on_choose: Callback<(CascadeLevel, String)>,
    on_retry: Callback<CascadeLevel>,
) -> impl IntoView {
    view! {
        <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
            {CascadeLevel::ALL
                .into_iter()
                .map(|level| view! {
                    <CascadeSelect level=level cascade=state.cascade on_choose=on_choose on_retry=on_retry />
                })
                .collect_view()}
        </div>
    }
}
