use crate::domain::climate::Community;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AttemptFailure {
    Transport(String),
    Status(u16),
    InvalidBody(String),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Transport(e) => write!(f, "transport error: {e}"),
            AttemptFailure::Status(s) => write!(f, "HTTP status {s}"),
            AttemptFailure::InvalidBody(e) => write!(f, "unexpected body: {e}"),
        }
    }
}

/// What happened on one parameter-set request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptDiagnostic {
    pub target: String,
    pub parameters: String,
    pub status: Option<u16>,
    pub excerpt: String,
    pub failure: AttemptFailure,
}

/// Every parameter set failed. Only the final attempt is carried.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchFailure {
    pub community: Community,
    pub attempts: usize,
    pub last: AttemptDiagnostic,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "climate fetch failed (community={}, attempts={}): {} [target={}]",
            self.community, self.attempts, self.last.failure, self.last.target
        )
    }
}

impl std::error::Error for FetchFailure {}
