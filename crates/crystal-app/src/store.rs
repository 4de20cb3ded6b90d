// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Record, RecordId};

/// Failure talking to the persistence collaborator. Both kinds are
/// recoverable: callers report them and keep their last good state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("cannot reach {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("server error{}: {message}", status_suffix(.status))]
    Server { status: Option<u16>, message: String },
}

impl StoreError {
    pub fn transport(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    pub fn server(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" ({code})")).unwrap_or_default()
}

/// Body of a delete response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeleteAck {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl DeleteAck {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// A `success: false` body is a server-side refusal.
    pub fn into_result(self) -> Result<Option<String>, StoreError> {
        if self.success {
            Ok(self.message)
        } else {
            Err(StoreError::server(
                None,
                self.message
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| "delete rejected".to_owned()),
            ))
        }
    }
}

/// One collection on the persistence collaborator.
pub trait RecordStore {
    fn list_records(&mut self) -> Result<Vec<Record>, StoreError>;
    fn delete_record(&mut self, id: &RecordId) -> Result<DeleteAck, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::{DeleteAck, StoreError};

    #[test]
    fn server_error_message_includes_status_when_known() {
        let error = StoreError::server(Some(500), "database unavailable");
        assert_eq!(error.to_string(), "server error (500): database unavailable");

        let error = StoreError::server(None, "delete rejected");
        assert_eq!(error.to_string(), "server error: delete rejected");
    }

    #[test]
    fn rejected_ack_becomes_server_error() {
        let ack = DeleteAck {
            success: false,
            message: Some("user has open orders".to_owned()),
        };
        let error = ack.into_result().expect_err("rejection should fail");
        assert!(!error.is_transport());
        assert!(error.to_string().contains("user has open orders"));
    }

    #[test]
    fn rejected_ack_without_message_gets_generic_text() {
        let ack = DeleteAck {
            success: false,
            message: None,
        };
        let error = ack.into_result().expect_err("rejection should fail");
        assert!(error.to_string().contains("delete rejected"));
    }
}
