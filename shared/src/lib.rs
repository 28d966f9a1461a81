use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod id;
pub mod protocol;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer ";

// =========================================================
// 用户与角色 (Users & Roles)
// =========================================================

/// 用户角色
///
/// 决定路由与功能的可见性。线上格式为小写字符串。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    It,
    Head,
    Employee,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::It, Role::Head, Role::Employee];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::It => "it",
            Role::Head => "head",
            Role::Employee => "employee",
        }
    }

    /// 用于界面显示的名称
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::It => "IT Staff",
            Role::Head => "Department Head",
            Role::Employee => "Employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 当前登录用户的资料（`GET /user/basic`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub department: String,
    #[serde(default, deserialize_with = "id::option::deserialize")]
    pub reporting_to: Option<String>,
    pub role: Role,
}

// =========================================================
// 工单 (Tickets)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TicketType {
    #[default]
    Incident,
    Service,
}

impl TicketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketType::Incident => "Incident",
            TicketType::Service => "Service",
        }
    }

    /// Service 工单需要经过两级审批
    pub fn requires_approval(&self) -> bool {
        matches!(self, TicketType::Service)
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 三级分类树中的一个节点（分类 / 子分类 / 条目）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub label: String,
}

impl CategoryNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// 工单完整记录（`GET /tickets/{id}`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub sequence_no: u64,
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub query: String,
    pub priority: Priority,
    pub category: String,
    pub sub_category: String,
    pub item: String,
    #[serde(default, deserialize_with = "id::option::deserialize")]
    pub attachment_id: Option<String>,
    #[serde(deserialize_with = "id::deserialize")]
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub head_approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub head_rejected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub it_head_approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub it_head_rejected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub remark: Option<String>,
}

/// 审批 / 处理动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketAction {
    Approve,
    Reject,
    Resolve,
}

impl TicketAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketAction::Approve => "approve",
            TicketAction::Reject => "reject",
            TicketAction::Resolve => "resolve",
        }
    }

    /// 驳回和关闭必须附带备注
    pub fn requires_remark(&self) -> bool {
        matches!(self, TicketAction::Reject | TicketAction::Resolve)
    }
}

impl fmt::Display for TicketAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 工单列表的视角
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketListView {
    /// 我提交的工单
    #[default]
    Raised,
    /// 等待我审批的工单
    Approvals,
    /// IT 处理队列
    Queue,
    /// 全部（管理员）
    All,
}

impl TicketListView {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketListView::Raised => "raised",
            TicketListView::Approvals => "approvals",
            TicketListView::Queue => "queue",
            TicketListView::All => "all",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_node_accepts_numeric_ids() {
        let nodes: Vec<CategoryNode> =
            serde_json::from_value(json!([{ "id": 1, "label": "Network" }, { "id": "2", "label": "Hardware" }]))
                .unwrap();
        assert_eq!(nodes[0], CategoryNode::new("1", "Network"));
        assert_eq!(nodes[1], CategoryNode::new("2", "Hardware"));
    }

    #[test]
    fn test_user_wire_format() {
        let user: User = serde_json::from_value(json!({
            "id": 7,
            "name": "Asha",
            "email": "asha@corp.example",
            "contact": "555-0100",
            "department": "Finance",
            "reportingTo": null,
            "role": "head"
        }))
        .unwrap();
        assert_eq!(user.id, "7");
        assert_eq!(user.role, Role::Head);
        assert_eq!(user.reporting_to, None);
    }

    #[test]
    fn test_ticket_optional_stamps_default_to_none() {
        let ticket: Ticket = serde_json::from_value(json!({
            "id": "t-1",
            "sequenceNo": 42,
            "type": "Service",
            "query": "Need a new laptop",
            "priority": "High",
            "category": "Hardware",
            "subCategory": "Laptop",
            "item": "New laptop",
            "createdBy": 7,
            "createdAt": "2026-01-05T09:30:00Z"
        }))
        .unwrap();
        assert_eq!(ticket.ticket_type, TicketType::Service);
        assert_eq!(ticket.created_by, "7");
        assert!(ticket.head_approved_at.is_none());
        assert!(ticket.attachment_id.is_none());
    }

    #[test]
    fn test_role_rejects_unknown_strings() {
        assert!(serde_json::from_value::<Role>(json!("superuser")).is_err());
        assert_eq!(serde_json::to_value(Role::It).unwrap(), json!("it"));
    }
}
