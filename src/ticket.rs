//! 工单草稿与提交
//!
//! 所有本地校验都在发起网络请求之前完成。

use helpdesk_shared::protocol::{CreateTicketRequest, CreateTicketResponse};
use helpdesk_shared::{Priority, TicketType};

use crate::api::HelpdeskApi;
use crate::cascade::{CascadeState, SelectionLabels};
use crate::error::{HelpdeskError, HelpdeskResult};
use crate::request::HttpClient;
use crate::session::SessionStore;

/// 工单创建表单中除级联选择外的字段
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketDraft {
    pub ticket_type: TicketType,
    pub priority: Priority,
    pub query: String,
    pub attachment_id: Option<String>,
    /// 代他人提交时的用户 id
    pub on_behalf_of: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl TicketDraft {
    pub fn new(ticket_type: TicketType) -> Self {
        Self {
            ticket_type,
            ..Self::default()
        }
    }

    pub fn into_request(self, selection: SelectionLabels) -> HelpdeskResult<CreateTicketRequest> {
        let query = self.query.trim();
        if query.is_empty() {
            return Err(HelpdeskError::invalid("query", "please describe the issue"));
        }

        Ok(CreateTicketRequest {
            query: query.to_string(),
            priority: self.priority,
            category: selection.category,
            sub_category: selection.subcategory,
            item: selection.item,
            ticket_type: self.ticket_type,
            attachment_id: non_blank(&self.attachment_id),
            user_id: non_blank(&self.on_behalf_of),
        })
    }
}

/// 校验并构造创建请求；任何校验失败都不会触发网络调用
pub fn prepare_ticket(
    draft: TicketDraft,
    cascade: &CascadeState,
) -> HelpdeskResult<CreateTicketRequest> {
    let selection = cascade.selection()?;
    if cascade.ticket_type() != Some(draft.ticket_type) {
        return Err(HelpdeskError::invalid(
            "type",
            "ticket type changed, please reselect the category",
        ));
    }
    draft.into_request(selection)
}

pub async fn submit_ticket<C: HttpClient, S: SessionStore>(
    api: &HelpdeskApi<C, S>,
    draft: TicketDraft,
    cascade: &CascadeState,
) -> HelpdeskResult<CreateTicketResponse> {
    let req = prepare_ticket(draft, cascade)?;
    let res = api.create_ticket(&req).await?;
    log::info!("[Ticket] created ticket #{}", res.ticket_no);
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::CascadeLevel;
    use crate::config::ClientConfig;
    use crate::request::MockHttpClient;
    use crate::session::MemorySessionStore;
    use helpdesk_shared::CategoryNode;
    use serde_json::json;

    const BASE: &str = "http://helpdesk.test";

    fn complete_cascade() -> CascadeState {
        let mut state = CascadeState::new();
        let req = state.initialize(TicketType::Incident);
        state
            .apply(&req, Ok(vec![CategoryNode::new("1", "Network")]))
            .unwrap();
        let req = state.select_category("1").unwrap().unwrap();
        state.apply(&req, Ok(vec![CategoryNode::new("10", "VPN")])).unwrap();
        let req = state.select_subcategory("10").unwrap().unwrap();
        state
            .apply(&req, Ok(vec![CategoryNode::new("100", "VPN not connecting")]))
            .unwrap();
        state.select_item("100").unwrap();
        state
    }

    fn draft(query: &str) -> TicketDraft {
        TicketDraft {
            query: query.into(),
            priority: Priority::High,
            attachment_id: Some("  ".into()),
            ..TicketDraft::new(TicketType::Incident)
        }
    }

    #[test]
    fn test_blank_query_rejected() {
        let err = prepare_ticket(draft("   "), &complete_cascade()).unwrap_err();
        assert!(matches!(err, HelpdeskError::Invalid { field: "query", .. }));
    }

    #[test]
    fn test_request_uses_labels_and_trims() {
        let req = prepare_ticket(draft("  Cannot reach intranet  "), &complete_cascade()).unwrap();
        assert_eq!(req.query, "Cannot reach intranet");
        assert_eq!(req.category, "Network");
        assert_eq!(req.sub_category, "VPN");
        assert_eq!(req.item, "VPN not connecting");
        assert_eq!(req.attachment_id, None);
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let mut d = draft("Need access");
        d.ticket_type = TicketType::Service;
        let err = prepare_ticket(d, &complete_cascade()).unwrap_err();
        assert!(matches!(err, HelpdeskError::Invalid { field: "type", .. }));
    }

    #[tokio::test]
    async fn test_incomplete_selection_blocks_submit() {
        let client = MockHttpClient::new();
        let api = HelpdeskApi::new(
            ClientConfig::new(BASE),
            client.clone(),
            MemorySessionStore::with_token("t"),
        );
        let mut cascade = complete_cascade();
        cascade.select_subcategory("").unwrap();

        let err = submit_ticket(&api, draft("VPN down"), &cascade)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            HelpdeskError::IncompleteSelection {
                level: CascadeLevel::Subcategory
            }
        );
        assert_eq!(client.request_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_posts_ticket() {
        let client = MockHttpClient::new();
        let api = HelpdeskApi::new(
            ClientConfig::new(BASE),
            client.clone(),
            MemorySessionStore::with_token("t"),
        );
        client.mock_response(&format!("{}/tickets/create", BASE), 200, json!({ "ticketNo": 1042 }));

        let res = submit_ticket(&api, draft("VPN down"), &complete_cascade())
            .await
            .unwrap();
        assert_eq!(res.ticket_no, "1042");

        let body: serde_json::Value =
            serde_json::from_str(client.last_request().unwrap().body.as_deref().unwrap()).unwrap();
        assert_eq!(body["subCategory"], json!("VPN"));
        assert_eq!(body["type"], json!("Incident"));
        assert_eq!(body["priority"], json!("High"));
    }
}
