use crate::infrastructure::{ReconnectTimer, TaskManager};
use std::time::Duration;

/// Lifecycle of a manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// Endpoint missing or malformed; nothing will ever be attempted
    Unconfigured,
    /// Built, supervisor not yet running
    Idle,
    Connecting,
    Open,
    /// Waiting out the fixed delay before reopen number `attempt`
    Reconnecting { attempt: u32 },
    /// Reconnect budget spent
    Exhausted,
    /// `disconnect()` was called
    ShutDown,
}

impl ConnectionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Unconfigured | Self::Exhausted | Self::ShutDown)
    }
}

/// Consolidated mutable state for ConnectionManager
pub struct ManagerState {
    pub phase: ConnectionPhase,

    pub reconnect: ReconnectTimer,

    /// Cleared by `disconnect()`; never set again
    pub should_reconnect: bool,

    /// Supervisor task
    pub task_manager: TaskManager,
}

impl ManagerState {
    pub fn new(max_reconnect_attempts: u32, reconnect_interval: Duration) -> Self {
        Self {
            phase: ConnectionPhase::Idle,
            reconnect: ReconnectTimer::new(max_reconnect_attempts, reconnect_interval),
            should_reconnect: true,
            task_manager: TaskManager::new(),
        }
    }

    /// Moves to `phase` unless the manager was already shut down.
    pub fn transition(&mut self, phase: ConnectionPhase) {
        if self.phase == ConnectionPhase::ShutDown {
            return;
        }
        tracing::debug!("Connection phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}
