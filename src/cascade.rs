//! 级联选择解析器（分类 → 子分类 → 条目）
//!
//! 分两层：
//! - `CascadeState`：纯状态机，不做任何 I/O。选择操作返回需要执行的 `FetchRequest`，
//!   调用方取回数据后通过 `apply` 写回。可以直接放进 Leptos 的 signal 中驱动。
//! - `SelectionResolver`：持有 `CatalogSource` 的异步驱动器。
//!
//! 过期响应的丢弃依赖单调递增的 generation：每一级记录自己正在等待的 generation，
//! 只有完全匹配的响应才会被写回。

use std::cell::RefCell;
use std::fmt;

use helpdesk_shared::{CategoryNode, TicketType};

use crate::error::{HelpdeskError, HelpdeskResult};

#[cfg(test)]
mod tests;

// =========================================================
// 级别与状态
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CascadeLevel {
    Category,
    Subcategory,
    Item,
}

impl CascadeLevel {
    pub const ALL: [CascadeLevel; 3] = [
        CascadeLevel::Category,
        CascadeLevel::Subcategory,
        CascadeLevel::Item,
    ];

    fn index(self) -> usize {
        match self {
            CascadeLevel::Category => 0,
            CascadeLevel::Subcategory => 1,
            CascadeLevel::Item => 2,
        }
    }

    pub fn parent(self) -> Option<Self> {
        match self {
            CascadeLevel::Category => None,
            CascadeLevel::Subcategory => Some(CascadeLevel::Category),
            CascadeLevel::Item => Some(CascadeLevel::Subcategory),
        }
    }

    pub fn child(self) -> Option<Self> {
        match self {
            CascadeLevel::Category => Some(CascadeLevel::Subcategory),
            CascadeLevel::Subcategory => Some(CascadeLevel::Item),
            CascadeLevel::Item => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CascadeLevel::Category => "category",
            CascadeLevel::Subcategory => "subcategory",
            CascadeLevel::Item => "item",
        }
    }
}

impl fmt::Display for CascadeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个级别的加载状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LevelStatus {
    /// 上级未选择
    #[default]
    Idle,
    /// 请求进行中，对应的下拉框应禁用
    Loading,
    Loaded,
    /// 请求失败，重新选择上级即可重试
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadingFlags {
    pub categories: bool,
    pub subcategories: bool,
    pub items: bool,
}

/// 提交工单所需的标签（后端保存的是可读标签而非 id）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionLabels {
    pub category: String,
    pub subcategory: String,
    pub item: String,
}

/// 一次需要执行的选项拉取
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub level: CascadeLevel,
    pub ticket_type: TicketType,
    /// 上级选中的 id；分类级别为空
    pub parent_id: String,
    pub generation: u64,
}

/// 选项数据来源
#[async_trait::async_trait(?Send)]
pub trait CatalogSource {
    async fn fetch_options(&self, request: &FetchRequest) -> HelpdeskResult<Vec<CategoryNode>>;
}

// =========================================================
// 纯状态机
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct LevelSlot {
    selected: Option<String>,
    options: Vec<CategoryNode>,
    status: LevelStatus,
    awaiting: Option<u64>,
}

impl LevelSlot {
    fn find(&self, id: &str) -> Option<&CategoryNode> {
        self.options.iter().find(|node| node.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CascadeState {
    ticket_type: Option<TicketType>,
    levels: [LevelSlot; 3],
    next_generation: u64,
}

impl CascadeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置工单类型并开始拉取一级分类
    pub fn initialize(&mut self, ticket_type: TicketType) -> FetchRequest {
        self.clear_from(CascadeLevel::Category);
        self.ticket_type = Some(ticket_type);
        self.begin_fetch(CascadeLevel::Category, ticket_type, "")
    }

    pub fn select_category(&mut self, id: &str) -> HelpdeskResult<Option<FetchRequest>> {
        self.select(CascadeLevel::Category, id)
    }

    pub fn select_subcategory(&mut self, id: &str) -> HelpdeskResult<Option<FetchRequest>> {
        self.select(CascadeLevel::Subcategory, id)
    }

    pub fn select_item(&mut self, id: &str) -> HelpdeskResult<()> {
        self.select(CascadeLevel::Item, id).map(|_| ())
    }

    /// 重新拉取某一级（用于 `Error` 状态下的重试）
    ///
    /// 上级未选择时返回 `None`。
    pub fn retry(&mut self, level: CascadeLevel) -> Option<FetchRequest> {
        let ticket_type = self.ticket_type?;
        let parent_id = match level.parent() {
            Some(parent) => self.slot(parent).selected.clone()?,
            None => String::new(),
        };
        self.clear_from(level);
        Some(self.begin_fetch(level, ticket_type, &parent_id))
    }

    /// 写回一次拉取的结果
    ///
    /// - `Ok(true)`：已应用
    /// - `Ok(false)`：响应已过期，被丢弃
    /// - `Err(e)`：响应有效但请求失败，该级别进入 `Error`
    pub fn apply(
        &mut self,
        request: &FetchRequest,
        result: HelpdeskResult<Vec<CategoryNode>>,
    ) -> HelpdeskResult<bool> {
        if !self.is_current(request) {
            log::debug!(
                "[Cascade] discarding stale {} response (parent '{}', generation {})",
                request.level,
                request.parent_id,
                request.generation
            );
            return Ok(false);
        }

        let slot = self.slot_mut(request.level);
        slot.awaiting = None;
        match result {
            Ok(options) => {
                slot.options = options;
                slot.status = LevelStatus::Loaded;
                Ok(true)
            }
            Err(e) => {
                slot.options.clear();
                slot.status = LevelStatus::Error(e.to_string());
                Err(e)
            }
        }
    }

    /// 解析三个级别的标签
    ///
    /// 任一级别的选中 id 在当前已加载选项中找不到时，返回 `IncompleteSelection`。
    pub fn selection(&self) -> HelpdeskResult<SelectionLabels> {
        Ok(SelectionLabels {
            category: self.resolved_label(CascadeLevel::Category)?,
            subcategory: self.resolved_label(CascadeLevel::Subcategory)?,
            item: self.resolved_label(CascadeLevel::Item)?,
        })
    }

    fn resolved_label(&self, level: CascadeLevel) -> HelpdeskResult<String> {
        let slot = self.slot(level);
        slot.selected
            .as_deref()
            .and_then(|id| slot.find(id))
            .map(|node| node.label.clone())
            .ok_or(HelpdeskError::IncompleteSelection { level })
    }

    /// 清空全部级别与工单类型，所有进行中的请求随之失效
    pub fn reset(&mut self) {
        *self = Self {
            next_generation: self.next_generation,
            ..Self::default()
        };
    }

    // --- Accessors ---

    pub fn ticket_type(&self) -> Option<TicketType> {
        self.ticket_type
    }

    pub fn selected(&self, level: CascadeLevel) -> Option<&str> {
        self.slot(level).selected.as_deref()
    }

    pub fn options(&self, level: CascadeLevel) -> &[CategoryNode] {
        &self.slot(level).options
    }

    pub fn status(&self, level: CascadeLevel) -> &LevelStatus {
        &self.slot(level).status
    }

    pub fn is_loading(&self, level: CascadeLevel) -> bool {
        self.slot(level).status == LevelStatus::Loading
    }

    pub fn error(&self, level: CascadeLevel) -> Option<&str> {
        match &self.slot(level).status {
            LevelStatus::Error(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn loading_flags(&self) -> LoadingFlags {
        LoadingFlags {
            categories: self.is_loading(CascadeLevel::Category),
            subcategories: self.is_loading(CascadeLevel::Subcategory),
            items: self.is_loading(CascadeLevel::Item),
        }
    }

    // --- Internals ---

    fn slot(&self, level: CascadeLevel) -> &LevelSlot {
        &self.levels[level.index()]
    }

    fn slot_mut(&mut self, level: CascadeLevel) -> &mut LevelSlot {
        &mut self.levels[level.index()]
    }

    fn select(&mut self, level: CascadeLevel, id: &str) -> HelpdeskResult<Option<FetchRequest>> {
        let id = id.trim();
        if !id.is_empty() && self.slot(level).find(id).is_none() {
            return Err(HelpdeskError::UnknownOption {
                level,
                id: id.to_string(),
            });
        }

        // 下游级别必须在新请求返回之前同步清空
        if let Some(child) = level.child() {
            self.clear_from(child);
        }
        self.slot_mut(level).selected = (!id.is_empty()).then(|| id.to_string());

        match (level.child(), self.ticket_type) {
            (Some(child), Some(ticket_type)) if !id.is_empty() => {
                Ok(Some(self.begin_fetch(child, ticket_type, id)))
            }
            _ => Ok(None),
        }
    }

    fn clear_from(&mut self, level: CascadeLevel) {
        for slot in &mut self.levels[level.index()..] {
            *slot = LevelSlot::default();
        }
    }

    fn begin_fetch(
        &mut self,
        level: CascadeLevel,
        ticket_type: TicketType,
        parent_id: &str,
    ) -> FetchRequest {
        self.next_generation += 1;
        let generation = self.next_generation;

        let slot = self.slot_mut(level);
        slot.options.clear();
        slot.status = LevelStatus::Loading;
        slot.awaiting = Some(generation);

        FetchRequest {
            level,
            ticket_type,
            parent_id: parent_id.to_string(),
            generation,
        }
    }

    fn is_current(&self, request: &FetchRequest) -> bool {
        if self.ticket_type != Some(request.ticket_type) {
            return false;
        }
        if self.slot(request.level).awaiting != Some(request.generation) {
            return false;
        }
        match request.level.parent() {
            Some(parent) => self.selected(parent) == Some(request.parent_id.as_str()),
            None => true,
        }
    }
}

// =========================================================
// 异步驱动器
// =========================================================

/// 持有数据源的级联选择解析器
///
/// 所有方法都接收 `&self`，允许多个选择操作并发进行（单线程）；
/// 借用只在同步段内持有，不跨越 `.await`。
pub struct SelectionResolver<S> {
    source: S,
    state: RefCell<CascadeState>,
}

impl<S: CatalogSource> SelectionResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: RefCell::new(CascadeState::new()),
        }
    }

    /// 当前状态的快照
    pub fn state(&self) -> CascadeState {
        self.state.borrow().clone()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&CascadeState) -> R) -> R {
        f(&self.state.borrow())
    }

    pub async fn initialize(&self, ticket_type: TicketType) -> HelpdeskResult<()> {
        let request = self.state.borrow_mut().initialize(ticket_type);
        self.run(request).await
    }

    pub async fn select_category(&self, id: &str) -> HelpdeskResult<()> {
        let request = self.state.borrow_mut().select_category(id)?;
        match request {
            Some(request) => self.run(request).await,
            None => Ok(()),
        }
    }

    pub async fn select_subcategory(&self, id: &str) -> HelpdeskResult<()> {
        let request = self.state.borrow_mut().select_subcategory(id)?;
        match request {
            Some(request) => self.run(request).await,
            None => Ok(()),
        }
    }

    pub fn select_item(&self, id: &str) -> HelpdeskResult<()> {
        self.state.borrow_mut().select_item(id)
    }

    pub async fn retry(&self, level: CascadeLevel) -> HelpdeskResult<()> {
        let request = self.state.borrow_mut().retry(level);
        match request {
            Some(request) => self.run(request).await,
            None => Ok(()),
        }
    }

    pub fn selection(&self) -> HelpdeskResult<SelectionLabels> {
        self.state.borrow().selection()
    }

    pub fn reset(&self) {
        self.state.borrow_mut().reset();
    }

    async fn run(&self, request: FetchRequest) -> HelpdeskResult<()> {
        let result = self.source.fetch_options(&request).await;
        self.state.borrow_mut().apply(&request, result).map(|_| ())
    }
}
