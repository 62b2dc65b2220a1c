use offline_cache_sdk::{ControlMessage, WorkerState};
use serde::{Deserialize, Serialize};

/// Worker status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDto {
    pub state: WorkerState,
    pub cache_name: String,
    pub clients_claimed: bool,
    pub generations: Vec<String>,
}

/// Reply to a posted control message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAckDto {
    /// Recognised message, absent when the payload was ignored
    pub message: Option<ControlMessage>,
    pub state: WorkerState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDto {
    pub error: String,
}
