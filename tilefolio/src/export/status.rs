//! Export lifecycle states.

use std::fmt;

/// Where the orchestrator is in its lifecycle.
///
/// `Idle -> Running -> {Completed, Cancelled, Failed}`; a finished
/// orchestrator can start another job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportState {
    #[default]
    Idle,
    Running {
        completed: usize,
        total: usize,
    },
    Completed {
        pages: usize,
    },
    Cancelled,
    Failed {
        pages: usize,
        reason: String,
    },
}

impl ExportState {
    pub fn is_running(&self) -> bool {
        matches!(self, ExportState::Running { .. })
    }
}

impl From<&ExportStatus> for ExportState {
    fn from(status: &ExportStatus) -> Self {
        match status {
            ExportStatus::Completed { pages } => ExportState::Completed { pages: *pages },
            ExportStatus::Cancelled => ExportState::Cancelled,
            ExportStatus::Failed { pages, reason } => ExportState::Failed {
                pages: *pages,
                reason: reason.clone(),
            },
        }
    }
}

/// Terminal outcome of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    /// Every cell rendered and the document saved
    Completed { pages: usize },
    /// Stopped at a cell boundary; nothing saved
    Cancelled,
    /// Stopped by an error; `pages` is what was salvaged and saved
    Failed { pages: usize, reason: String },
}

impl ExportStatus {
    /// Pages written to the output.
    pub fn pages(&self) -> usize {
        match self {
            ExportStatus::Completed { pages } | ExportStatus::Failed { pages, .. } => *pages,
            ExportStatus::Cancelled => 0,
        }
    }
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportStatus::Completed { pages } => write!(f, "completed: {} pages saved", pages),
            ExportStatus::Cancelled => write!(f, "cancelled: nothing saved"),
            ExportStatus::Failed { pages, reason } => {
                write!(f, "failed ({}): {} pages saved", reason, pages)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages() {
        assert_eq!(ExportStatus::Completed { pages: 4 }.pages(), 4);
        assert_eq!(ExportStatus::Cancelled.pages(), 0);
        assert_eq!(
            ExportStatus::Failed {
                pages: 3,
                reason: "x".into()
            }
            .pages(),
            3
        );
    }

    #[test]
    fn test_state_from_status() {
        let state = ExportState::from(&ExportStatus::Completed { pages: 2 });
        assert_eq!(state, ExportState::Completed { pages: 2 });
        assert!(!state.is_running());
        assert!(ExportState::Running {
            completed: 0,
            total: 1
        }
        .is_running());
    }
}
