use std::fmt;

/// Lifecycle state reported by CloudFormation for a stack
///
/// Only the states the deploy loop reacts to get a dedicated variant. Anything
/// else (rollbacks, deletes, review states) is carried verbatim in `Other` and
/// treated as still settling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackStatus {
    CreateInProgress,
    CreateComplete,
    CreateFailed,
    UpdateInProgress,
    UpdateComplete,
    UpdateFailed,
    Other(String),
}

impl StackStatus {
    /// The stack settled successfully
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::CreateComplete | Self::UpdateComplete)
    }

    /// The stack settled in a failure state
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::CreateFailed | Self::UpdateFailed)
    }

    /// No further polling is useful once a stack reports a terminal state
    pub fn is_terminal(&self) -> bool {
        self.is_complete() || self.is_failed()
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::CreateInProgress => "CREATE_IN_PROGRESS",
            Self::CreateComplete => "CREATE_COMPLETE",
            Self::CreateFailed => "CREATE_FAILED",
            Self::UpdateInProgress => "UPDATE_IN_PROGRESS",
            Self::UpdateComplete => "UPDATE_COMPLETE",
            Self::UpdateFailed => "UPDATE_FAILED",
            Self::Other(status) => status,
        }
    }
}

impl From<&str> for StackStatus {
    fn from(value: &str) -> Self {
        match value {
            "CREATE_IN_PROGRESS" => Self::CreateInProgress,
            "CREATE_COMPLETE" => Self::CreateComplete,
            "CREATE_FAILED" => Self::CreateFailed,
            "UPDATE_IN_PROGRESS" => Self::UpdateInProgress,
            "UPDATE_COMPLETE" => Self::UpdateComplete,
            "UPDATE_FAILED" => Self::UpdateFailed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_lifecycle_statuses() {
        assert_eq!(
            StackStatus::from("CREATE_COMPLETE"),
            StackStatus::CreateComplete
        );
        assert_eq!(StackStatus::from("UPDATE_FAILED"), StackStatus::UpdateFailed);
    }

    #[test]
    fn unknown_status_is_carried_verbatim() {
        let status = StackStatus::from("ROLLBACK_IN_PROGRESS");

        assert_eq!(
            status,
            StackStatus::Other("ROLLBACK_IN_PROGRESS".to_string())
        );
        assert!(!status.is_terminal());
    }

    #[test]
    fn only_complete_and_failed_are_terminal() {
        assert!(StackStatus::CreateComplete.is_complete());
        assert!(StackStatus::UpdateComplete.is_complete());
        assert!(StackStatus::CreateFailed.is_failed());
        assert!(StackStatus::UpdateFailed.is_failed());
        assert!(!StackStatus::CreateInProgress.is_terminal());
        assert!(!StackStatus::UpdateInProgress.is_terminal());
    }

    #[test]
    fn display_matches_wire_format() {
        assert_eq!(
            StackStatus::CreateInProgress.to_string(),
            "CREATE_IN_PROGRESS"
        );
        assert_eq!(
            StackStatus::Other("DELETE_COMPLETE".into()).to_string(),
            "DELETE_COMPLETE"
        );
    }
}
