//! Shutdown coordination
//!
//! Waits for a termination signal, stops the background tasks, and
//! removes the registration key before the process exits. Deletion is
//! best-effort: the store's own TTL expiry is the fallback cleanup if
//! the delete cannot be issued.

use crate::store::StoreConnection;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Shutdown lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    ShuttingDown,
    Terminated,
}

impl ShutdownState {
    /// Advance to the next lifecycle state
    pub fn advance(self) -> ShutdownState {
        match self {
            ShutdownState::Running => ShutdownState::ShuttingDown,
            ShutdownState::ShuttingDown => ShutdownState::Terminated,
            ShutdownState::Terminated => ShutdownState::Terminated,
        }
    }
}

/// Termination signals that trigger the shutdown sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Interrupt,
    Terminate,
    Hangup,
    Quit,
}

impl TerminationSignal {
    /// Process exit status for this signal (the raw signal number)
    pub fn exit_code(self) -> i32 {
        match self {
            TerminationSignal::Hangup => 1,
            TerminationSignal::Interrupt => 2,
            TerminationSignal::Quit => 3,
            TerminationSignal::Terminate => 15,
        }
    }
}

/// Coordinates the shutdown sequence on a termination signal.
pub struct ShutdownCoordinator {
    store: StoreConnection,
    cancel: CancellationToken,
    state: ShutdownState,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator
    pub fn new(store: StoreConnection, cancel: CancellationToken) -> Self {
        Self {
            store,
            cancel,
            state: ShutdownState::Running,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ShutdownState {
        self.state
    }

    /// Wait for a termination signal, then deregister and return the
    /// exit code the process should report.
    ///
    /// Cancels the shared token first so the poll and renewal tasks
    /// stop before the key is deleted; a registration can no longer
    /// race the delete. Deletion failure never blocks exit.
    pub async fn run(&mut self, key: &str) -> i32 {
        let signal = wait_for_signal().await;
        info!("Received {:?} signal, shutting down", signal);

        self.state = self.state.advance();
        self.cancel.cancel();

        match self.store.delete(key).await {
            Ok(deleted) if deleted > 0 => info!("Deregistered {}", key),
            Ok(_) => warn!("Key {} was already absent at shutdown", key),
            Err(e) => error!("Failed to deregister {}: {}", key, e),
        }

        self.state = self.state.advance();
        signal.exit_code()
    }
}

/// Wait for any of SIGINT, SIGTERM, SIGHUP, SIGQUIT.
#[cfg(unix)]
async fn wait_for_signal() -> TerminationSignal {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to install SIGINT handler: {}", e);
            return std::future::pending().await;
        }
    };
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            return std::future::pending().await;
        }
    };
    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to install SIGHUP handler: {}", e);
            return std::future::pending().await;
        }
    };
    let mut quit = match signal(SignalKind::quit()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to install SIGQUIT handler: {}", e);
            return std::future::pending().await;
        }
    };

    tokio::select! {
        _ = interrupt.recv() => TerminationSignal::Interrupt,
        _ = terminate.recv() => TerminationSignal::Terminate,
        _ = hangup.recv() => TerminationSignal::Hangup,
        _ = quit.recv() => TerminationSignal::Quit,
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> TerminationSignal {
    match tokio::signal::ctrl_c().await {
        Ok(()) => TerminationSignal::Interrupt,
        Err(e) => {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_machine_transitions() {
        let state = ShutdownState::Running;
        let state = state.advance();
        assert_eq!(state, ShutdownState::ShuttingDown);
        let state = state.advance();
        assert_eq!(state, ShutdownState::Terminated);
        // Terminal state is absorbing
        assert_eq!(state.advance(), ShutdownState::Terminated);
    }

    #[test]
    fn test_exit_codes_match_signal_numbers() {
        assert_eq!(TerminationSignal::Hangup.exit_code(), 1);
        assert_eq!(TerminationSignal::Interrupt.exit_code(), 2);
        assert_eq!(TerminationSignal::Quit.exit_code(), 3);
        assert_eq!(TerminationSignal::Terminate.exit_code(), 15);
    }
}
