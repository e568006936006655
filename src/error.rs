// src/error.rs
use crate::core::types::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NumeralError {
    #[error("document has no body element to watch")]
    MissingBody,

    #[error("field watcher is already running")]
    WatcherAlreadyRunning,

    #[error("invalid selector `{pattern}`: {reason}")]
    InvalidSelector { pattern: String, reason: String },

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("cannot insert node {child} under {parent}")]
    InvalidHierarchy { parent: NodeId, child: NodeId },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NumeralError>;
