use serde::{Deserialize, Serialize};

/// Result of a server action as seen by the caller.
///
/// Transport problems are not represented here; they surface as
/// `Err(CondoError)` from the action itself.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome<T> {
    Success { data: Option<T> },
    Failure { error: String },
}

impl<T> ActionOutcome<T> {
    pub fn success(data: T) -> Self {
        Self::Success { data: Some(data) }
    }

    pub fn done() -> Self {
        Self::Success { data: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure { error } => Some(error),
            Self::Success { .. } => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> ActionOutcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success { data } => ActionOutcome::Success { data: data.map(f) },
            Self::Failure { error } => ActionOutcome::Failure { error },
        }
    }
}

/// Wire form: `{"success": true, "data": ...}` or `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> From<ActionOutcome<T>> for ActionResponse<T> {
    fn from(outcome: ActionOutcome<T>) -> Self {
        match outcome {
            ActionOutcome::Success { data } => Self {
                success: true,
                data,
                error: None,
            },
            ActionOutcome::Failure { error } => Self {
                success: false,
                data: None,
                error: Some(error),
            },
        }
    }
}

impl<T> From<ActionResponse<T>> for ActionOutcome<T> {
    fn from(response: ActionResponse<T>) -> Self {
        if response.success {
            Self::Success {
                data: response.data,
            }
        } else {
            Self::Failure {
                error: response
                    .error
                    .unwrap_or_else(|| "action failed without an error message".to_string()),
            }
        }
    }
}
