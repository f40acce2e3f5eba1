//! Single-flight coordination of token refresh.
//!
//! However many requests fail authorization at the same time, at most one
//! refresh call may be outstanding per client. The first failing caller
//! becomes the leader and performs the call; every later caller is queued
//! and resolved, in enqueue order, from the leader's single outcome.

use std::sync::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

/// Outcome shared with queued callers: the refreshed access token, or the
/// refresh failure rendered as a message (the underlying transport error
/// is not cloneable, the message is).
pub(crate) type RefreshOutcome = Result<String, String>;

/// Role handed to a caller entering the refresh path.
pub(crate) enum RefreshTicket {
    /// No refresh was in flight; this caller performs the refresh call.
    Leader,
    /// A refresh is already in flight; await its outcome.
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

#[derive(Default)]
struct RefreshState {
    in_progress: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Coordinator state for one client.
///
/// Invariant: `waiters` is non-empty only while `in_progress` is true; a
/// settle drains the whole queue and leaves it empty. The lock is never
/// held across an await point.
pub(crate) struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(RefreshState::default()),
        }
    }

    /// Join the current refresh episode, starting one if none is active.
    pub(crate) fn begin(&self) -> RefreshTicket {
        let mut state = self.state.lock().unwrap();
        if state.in_progress {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            debug!(queued = state.waiters.len(), "Queued behind in-flight refresh");
            RefreshTicket::Waiter(rx)
        } else {
            state.in_progress = true;
            RefreshTicket::Leader
        }
    }

    /// Resolve every queued caller, in enqueue order, with the new token.
    pub(crate) fn settle_ok(&self, access_token: &str) {
        self.settle(Ok(access_token.to_string()));
    }

    /// Reject every queued caller with the refresh failure.
    pub(crate) fn settle_err(&self, reason: &str) {
        self.settle(Err(reason.to_string()));
    }

    fn settle(&self, outcome: RefreshOutcome) {
        let waiters = {
            let mut state = self.state.lock().unwrap();
            state.in_progress = false;
            std::mem::take(&mut state.waiters)
        };
        debug!(waiters = waiters.len(), ok = outcome.is_ok(), "Refresh settled");
        for waiter in waiters {
            // A caller that went away is not an error.
            let _ = waiter.send(outcome.clone());
        }
    }

    #[cfg(test)]
    fn waiter_count(&self) -> usize {
        self.state.lock().unwrap().waiters.len()
    }

    #[cfg(test)]
    fn in_progress(&self) -> bool {
        self.state.lock().unwrap().in_progress
    }
}
