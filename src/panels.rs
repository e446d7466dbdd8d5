//! Panel view-state.
//!
//! Every dashboard region (score, rede, macro, decisões) owns an independent
//! state holder so one region's failure never blocks another. Fetch tasks
//! carry a [`CancelToken`]; a superseded search or a torn-down view cancels
//! the token and late completions are discarded instead of mutating state
//! that no longer belongs to them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Lifecycle of one panel: `Initial -> Loading -> Ready | Error`, back to
/// `Initial` when the search term is cleared externally.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelState<T> {
    Initial,
    Loading,
    Ready(T),
    Error(String),
}

impl<T> PanelState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, PanelState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PanelState::Ready(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PanelState::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Cancellation flag shared between a view and its in-flight fetch tasks.
/// Checked before every state application; cancelling is idempotent.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Observable state holder for one panel, with subscriber notification via a
/// watch channel.
#[derive(Debug, Clone)]
pub struct Panel<T> {
    tx: Arc<watch::Sender<PanelState<T>>>,
}

impl<T: Clone> Default for Panel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Panel<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PanelState::Initial);
        Self { tx: Arc::new(tx) }
    }

    /// Subscribes to state changes; the receiver sees the current state
    /// immediately.
    pub fn subscribe(&self) -> watch::Receiver<PanelState<T>> {
        self.tx.subscribe()
    }

    /// Snapshot of the current state.
    pub fn get(&self) -> PanelState<T> {
        self.tx.borrow().clone()
    }

    /// New search started: any state moves to `Loading`.
    pub fn begin(&self) {
        self.tx.send_replace(PanelState::Loading);
    }

    /// Search term cleared externally: back to `Initial`.
    pub fn clear(&self) {
        self.tx.send_replace(PanelState::Initial);
    }

    /// Applies a fetch outcome unless the token was cancelled in the
    /// meantime. Returns whether the state was actually applied.
    pub fn complete(&self, token: &CancelToken, state: PanelState<T>) -> bool {
        if token.is_cancelled() {
            tracing::debug!("Discarding completion for cancelled fetch");
            return false;
        }
        self.tx.send_replace(state);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_walks_the_search_lifecycle() {
        let panel: Panel<u32> = Panel::new();
        assert_eq!(panel.get(), PanelState::Initial);

        panel.begin();
        assert!(panel.get().is_loading());

        let token = CancelToken::new();
        assert!(panel.complete(&token, PanelState::Ready(7)));
        assert_eq!(panel.get(), PanelState::Ready(7));

        panel.begin();
        assert!(panel.complete(&token, PanelState::Error("falhou".to_string())));
        assert_eq!(panel.get().error(), Some("falhou"));

        panel.clear();
        assert_eq!(panel.get(), PanelState::Initial);
    }

    #[test]
    fn cancelled_completion_is_discarded() {
        let panel: Panel<u32> = Panel::new();
        panel.begin();

        let token = CancelToken::new();
        token.cancel();

        assert!(!panel.complete(&token, PanelState::Ready(1)));
        assert!(panel.get().is_loading());
    }

    #[tokio::test]
    async fn subscribers_observe_transitions() {
        let panel: Panel<u32> = Panel::new();
        let mut rx = panel.subscribe();

        panel.begin();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_loading());

        panel.complete(&CancelToken::new(), PanelState::Ready(3));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), PanelState::Ready(3));
    }
}
