//! 错误类型
//!
//! 与 `ErrorKind` 分离的设计：变体承载具体信息，`kind()` 给出语义分类，
//! 视图层据此决定是弹出提示、退出登录还是标记表单字段。

use std::time::Duration;

use thiserror::Error;

use crate::cascade::CascadeLevel;

/// 错误的语义分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 网络 / 传输 / 服务端错误：非致命，以通知形式展示
    Network,
    /// 401：令牌失效，需清除会话
    Authentication,
    /// 本地校验失败：阻止提交，不发起网络请求
    Validation,
}

/// Errors surfaced by the helpdesk client core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HelpdeskError {
    /// The request could not be sent or the connection failed.
    #[error("network error: {0}")]
    Transport(String),

    /// No response within the configured timeout.
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The server rejected the bearer token (HTTP 401).
    #[error("session expired, please sign in again")]
    Unauthorized,

    /// Any other non-success status.
    #[error("server responded with {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or reason text.
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request body could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(String),

    /// A cascade level has no selected option that resolves to a loaded entry.
    #[error("please select a {level}")]
    IncompleteSelection {
        /// First level that failed to resolve.
        level: CascadeLevel,
    },

    /// The chosen id is not among the options currently loaded for the level.
    #[error("'{id}' is not a valid {level}")]
    UnknownOption {
        /// Level the selection was made on.
        level: CascadeLevel,
        /// Offending id.
        id: String,
    },

    /// A form field failed local validation.
    #[error("{field}: {message}")]
    Invalid {
        /// Field name as shown to the user.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

impl HelpdeskError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            HelpdeskError::Unauthorized => ErrorKind::Authentication,
            HelpdeskError::IncompleteSelection { .. }
            | HelpdeskError::UnknownOption { .. }
            | HelpdeskError::Invalid { .. } => ErrorKind::Validation,
            HelpdeskError::Transport(_)
            | HelpdeskError::Timeout(_)
            | HelpdeskError::Status { .. }
            | HelpdeskError::Decode(_)
            | HelpdeskError::Encode(_) => ErrorKind::Network,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, HelpdeskError::Unauthorized)
    }

    /// HTTP 状态码（仅服务端返回的错误才有）
    pub fn status_code(&self) -> Option<u16> {
        match self {
            HelpdeskError::Unauthorized => Some(401),
            HelpdeskError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type HelpdeskResult<T> = std::result::Result<T, HelpdeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_follow_taxonomy() {
        assert_eq!(HelpdeskError::Unauthorized.kind(), ErrorKind::Authentication);
        assert_eq!(
            HelpdeskError::Timeout(Duration::from_secs(15)).kind(),
            ErrorKind::Network
        );
        assert_eq!(
            HelpdeskError::IncompleteSelection {
                level: CascadeLevel::Item
            }
            .kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            HelpdeskError::Timeout(Duration::from_secs(15)).to_string(),
            "request timed out after 15s"
        );
        assert_eq!(
            HelpdeskError::IncompleteSelection {
                level: CascadeLevel::Subcategory
            }
            .to_string(),
            "please select a subcategory"
        );
        assert_eq!(
            HelpdeskError::Status {
                status: 500,
                message: "boom".into()
            }
            .status_code(),
            Some(500)
        );
    }
}
