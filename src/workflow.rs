//! 审批流程
//!
//! Service 工单依次经过部门负责人（L1）与 IT 负责人（L2）审批后才进入处理；
//! Incident 工单直接进入 IT 处理队列。

use std::fmt;

use helpdesk_shared::protocol::TicketActionRequest;
use helpdesk_shared::{Role, Ticket, TicketAction, User};

use crate::error::{HelpdeskError, HelpdeskResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketStage {
    /// 等待部门负责人审批（L1）
    AwaitingManager,
    /// 等待 IT 负责人审批（L2）
    AwaitingItHead,
    /// 等待 IT 处理
    Open,
    Rejected,
    Resolved,
}

impl TicketStage {
    pub fn of(ticket: &Ticket) -> Self {
        if ticket.resolved_at.is_some() {
            return TicketStage::Resolved;
        }
        if ticket.head_rejected_at.is_some() || ticket.it_head_rejected_at.is_some() {
            return TicketStage::Rejected;
        }
        if !ticket.ticket_type.requires_approval() {
            return TicketStage::Open;
        }
        match (ticket.head_approved_at, ticket.it_head_approved_at) {
            (None, _) => TicketStage::AwaitingManager,
            (Some(_), None) => TicketStage::AwaitingItHead,
            (Some(_), Some(_)) => TicketStage::Open,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStage::Rejected | TicketStage::Resolved)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TicketStage::AwaitingManager => "Awaiting manager approval",
            TicketStage::AwaitingItHead => "Awaiting IT head approval",
            TicketStage::Open => "Open",
            TicketStage::Rejected => "Rejected",
            TicketStage::Resolved => "Resolved",
        }
    }
}

impl fmt::Display for TicketStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 当前用户可以对该工单执行的动作
pub fn available_actions(ticket: &Ticket, user: &User) -> Vec<TicketAction> {
    if ticket.created_by == user.id && user.role != Role::Admin {
        return Vec::new();
    }

    let stage = TicketStage::of(ticket);
    let may_act = match stage {
        TicketStage::AwaitingManager => matches!(user.role, Role::Head | Role::Admin),
        TicketStage::AwaitingItHead | TicketStage::Open => {
            matches!(user.role, Role::It | Role::Admin)
        }
        TicketStage::Rejected | TicketStage::Resolved => false,
    };
    if !may_act {
        return Vec::new();
    }

    match stage {
        TicketStage::Open => vec![TicketAction::Resolve],
        _ => vec![TicketAction::Approve, TicketAction::Reject],
    }
}

/// 审批 / 处理表单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionForm {
    pub action: TicketAction,
    pub remark: String,
}

impl ActionForm {
    pub fn new(action: TicketAction) -> Self {
        Self {
            action,
            remark: String::new(),
        }
    }

    pub fn into_request(self, ticket_id: &str) -> HelpdeskResult<TicketActionRequest> {
        let remark = self.remark.trim();
        if remark.is_empty() && self.action.requires_remark() {
            return Err(HelpdeskError::invalid(
                "remark",
                format!("is required to {} a ticket", self.action),
            ));
        }
        Ok(TicketActionRequest {
            ticket_id: ticket_id.to_string(),
            action: self.action,
            remark: (!remark.is_empty()).then(|| remark.to_string()),
        })
    }
}
