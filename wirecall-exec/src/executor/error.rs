use wirecall_core::BindError;

use crate::classify::ProtocolError;
use crate::filter::FilterError;
use crate::transport::TransportError;

/// How a command failed once it reached a terminal state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecError {
    /// Arguments rejected locally, before anything was spawned.
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("request filter failed: {0}")]
    Filter(#[from] FilterError),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("command cancelled")]
    Cancelled,
    #[error("command task panicked: {0}")]
    Panicked(String),
}

impl ExecError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ExecError::Protocol(p) => Some(p.status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ExecError::Transport(_))
    }
}
