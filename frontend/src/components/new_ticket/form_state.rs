//! 表单状态管理模块
//!
//! 将零散的 signal 整合为 `FormState` 结构体，负责：
//! - 数据的持有与重置
//! - 驱动级联选择状态机（发起取数并写回结果）
//! - 数据到工单草稿的转换

use helpdesk::shared::{Priority, TicketType};
use helpdesk::{CascadeLevel, CascadeState, CatalogSource, FetchRequest, HelpdeskError, TicketDraft};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::WebApi;

/// 表单状态结构体
///
/// 使用 `RwSignal` 因为它实现了 `Copy` trait，非常适合作为 Props 在组件间传递。
#[derive(Clone, Copy)]
pub struct FormState {
    pub ticket_type: RwSignal<TicketType>,
    pub priority: RwSignal<Priority>,
    pub query: RwSignal<String>,
    pub attachment_id: RwSignal<String>,
    /// 代他人提交时选择的用户 id，空串表示本人
    pub on_behalf_of: RwSignal<String>,
    pub cascade: RwSignal<CascadeState>,
}

impl FormState {
    pub fn new() -> Self {
        Self {
            ticket_type: RwSignal::new(TicketType::default()),
            priority: RwSignal::new(Priority::default()),
            query: RwSignal::new(String::new()),
            attachment_id: RwSignal::new(String::new()),
            on_behalf_of: RwSignal::new(String::new()),
            cascade: RwSignal::new(CascadeState::new()),
        }
    }

    /// 重置表单到初始状态；进行中的取数随之失效
    pub fn reset(&self) {
        self.ticket_type.set(TicketType::default());
        self.priority.set(Priority::default());
        self.query.set(String::new());
        self.attachment_id.set(String::new());
        self.on_behalf_of.set(String::new());
        self.cascade.update(CascadeState::reset);
    }

    /// 将表单状态转换为工单草稿（空白的可选字段在校验时被丢弃）
    pub fn to_draft(&self) -> TicketDraft {
        TicketDraft {
            ticket_type: self.ticket_type.get_untracked(),
            priority: self.priority.get_untracked(),
            query: self.query.get_untracked(),
            attachment_id: Some(self.attachment_id.get_untracked()),
            on_behalf_of: Some(self.on_behalf_of.get_untracked()),
        }
    }

    pub fn any_loading(&self) -> bool {
        self.cascade.with(|c| {
            let flags = c.loading_flags();
            flags.categories || flags.subcategories || flags.items
        })
    }

    /// 按当前工单类型重新开始级联选择
    pub fn start(&self, api: WebApi, on_error: Callback<HelpdeskError>) {
        let ticket_type = self.ticket_type.get_untracked();
        if let Some(req) = self.cascade.try_update(|c| c.initialize(ticket_type)) {
            self.fetch(api, req, on_error);
        }
    }

    /// 选择某一级的选项；需要拉取下一级时自动发起
    pub fn choose(
        &self,
        level: CascadeLevel,
        id: String,
        api: WebApi,
        on_error: Callback<HelpdeskError>,
    ) {
        let outcome = self.cascade.try_update(|c| match level {
            CascadeLevel::Category => c.select_category(&id),
            CascadeLevel::Subcategory => c.select_subcategory(&id),
            CascadeLevel::Item => c.select_item(&id).map(|_| None),
        });
        match outcome {
            Some(Ok(Some(req))) => self.fetch(api, req, on_error),
            Some(Err(e)) => on_error.run(e),
            _ => {}
        }
    }

    pub fn retry(&self, level: CascadeLevel, api: WebApi, on_error: Callback<HelpdeskError>) {
        if let Some(Some(req)) = self.cascade.try_update(|c| c.retry(level)) {
            self.fetch(api, req, on_error);
        }
    }

    /// 后台执行一次取数并写回；过期响应被状态机静默丢弃
    fn fetch(&self, api: WebApi, req: FetchRequest, on_error: Callback<HelpdeskError>) {
        let cascade = self.cascade;
        spawn_local(async move {
            let result = api.fetch_options(&req).await;
            if let Some(Err(e)) = cascade.try_update(|c| c.apply(&req, result)) {
                on_error.run(e);
            }
        });
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}
